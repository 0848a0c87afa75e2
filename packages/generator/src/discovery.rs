//! Discovery Engine
//!
//! Turns lexical candidates into the validated handler model. Each
//! candidate is resolved against the semantic model, classified per
//! marker, its attribute arguments extracted and its shape validated. A
//! failing candidate is reported and skipped; it never aborts the batch.
//! Large batches are analyzed in parallel, with a deterministic reduction
//! so both strategies produce the same model and the same diagnostic
//! order.

use crate::context::SemanticContext;
use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use crate::filter::{short_attribute_name, Candidate, CandidateClass};
use crate::model::{
    HandlerKind, HandlerModel, HandlerRecord, InterfaceImplRecord, InterfaceKind, MarkerKind,
    Scope,
};
use crate::options::EffectiveOptions;
use crate::validation::{
    check_ctor_params, check_priority_range, classify_return, validate_handler, ReturnShape,
};
use dashmap::DashMap;
use indexmap::IndexMap;
use rayon::prelude::*;
use relay_host::{
    AttrValue, AttributeDecl, Cancelled, ClassDecl, MethodDecl, MethodId, MethodSymbol, TypeRef,
};
use std::collections::HashSet;

/// Batches at or above this size are analyzed in parallel when the
/// configured parallelism allows it.
pub const PARALLEL_THRESHOLD: usize = 10;

/// Engine-local worker clamp. Distinct from the user-facing 1..=64 range:
/// once the engine decides to parallelize it never runs narrower than 2 or
/// wider than 8 workers.
pub const ENGINE_MIN_WORKERS: usize = 2;
pub const ENGINE_MAX_WORKERS: usize = 8;

/// Everything one candidate contributed, reduced in candidate order.
#[derive(Debug, Default)]
struct CandidateOutcome {
    records: Vec<HandlerRecord>,
    diagnostics: Vec<Diagnostic>,
}

pub struct DiscoveryEngine<'a> {
    context: &'a SemanticContext,
    // Response types survive repeated unwrapping across markers.
    response_memo: DashMap<MethodId, Option<TypeRef>>,
}

impl<'a> DiscoveryEngine<'a> {
    pub fn new(context: &'a SemanticContext) -> Self {
        DiscoveryEngine {
            context,
            response_memo: DashMap::new(),
        }
    }

    /// Analyze all candidates and freeze the handler model. Diagnostics
    /// are reported in candidate order, then bucket order for the global
    /// rules, regardless of the traversal strategy.
    pub fn discover(
        &self,
        candidates: &[Candidate],
        candidate_classes: &[CandidateClass],
        options: &EffectiveOptions,
        sink: &DiagnosticSink,
    ) -> Result<HandlerModel, Cancelled> {
        let outcomes = if candidates.len() >= PARALLEL_THRESHOLD && options.parallelism > 1 {
            self.analyze_parallel(candidates, options.parallelism)?
        } else {
            self.analyze_sequential(candidates)?
        };

        let mut handlers = Vec::new();
        let mut ctor_warned: HashSet<String> = HashSet::new();
        for (candidate, outcome) in candidates.iter().zip(outcomes) {
            sink.report_all(outcome.diagnostics);
            for record in outcome.records {
                if !record.is_static && ctor_warned.insert(record.declaring_type.clone()) {
                    let class = self.class_of(candidate);
                    if let Some(diagnostic) =
                        check_ctor_params(&record.declaring_type, class.ctor_param_count, &record.location)
                    {
                        sink.report(diagnostic);
                    }
                }
                handlers.push(record);
            }
        }

        self.detect_duplicates(&handlers, sink);

        let interface_impls = self.collect_interface_impls(candidate_classes);

        if !candidates.is_empty() && !self.context.has_runtime_reference() {
            sink.report(Diagnostic::format(
                DiagnosticCode::MissingRuntimeReference,
                &[],
            ));
        }
        // Pure silence only: when validation already explained why nothing
        // was discovered, the trace would be noise.
        if handlers.is_empty() && self.context.has_runtime_reference() && !sink.has_errors() {
            sink.report(Diagnostic::format(DiagnosticCode::NoHandlers, &[]));
        }

        Ok(HandlerModel {
            handlers,
            interface_impls,
        })
    }

    fn analyze_sequential(
        &self,
        candidates: &[Candidate],
    ) -> Result<Vec<CandidateOutcome>, Cancelled> {
        candidates
            .iter()
            .map(|candidate| self.analyze_candidate(candidate))
            .collect()
    }

    fn analyze_parallel(
        &self,
        candidates: &[Candidate],
        parallelism: i32,
    ) -> Result<Vec<CandidateOutcome>, Cancelled> {
        let workers = (parallelism as usize).clamp(ENGINE_MIN_WORKERS, ENGINE_MAX_WORKERS);
        let pool = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool,
            // Worker spawn failure degrades to the sequential strategy.
            Err(_) => return self.analyze_sequential(candidates),
        };
        pool.install(|| {
            candidates
                .par_iter()
                .map(|candidate| self.analyze_candidate(candidate))
                .collect()
        })
    }

    fn class_of(&self, candidate: &Candidate) -> &ClassDecl {
        &self.context.compilation().trees()[candidate.tree_index].classes[candidate.class_index]
    }

    fn method_of(&self, candidate: &Candidate) -> &MethodDecl {
        &self.class_of(candidate).methods[candidate.method_index]
    }

    fn analyze_candidate(&self, candidate: &Candidate) -> Result<CandidateOutcome, Cancelled> {
        self.context.token().checkpoint()?;
        let mut outcome = CandidateOutcome::default();
        let method = self.method_of(candidate);

        let model = match self.context.semantic_model(candidate.tree_index)? {
            Some(model) => model,
            None => return Ok(outcome),
        };
        let symbol = match model.resolve_method(method) {
            Ok(symbol) => symbol,
            Err(err) => {
                // One bad candidate never aborts the batch.
                outcome.diagnostics.push(
                    Diagnostic::format(
                        DiagnosticCode::GeneratorError,
                        &[&method.name, &err.to_string()],
                    )
                    .at(method.location.clone()),
                );
                return Ok(outcome);
            }
        };

        for &marker in &candidate.markers {
            self.analyze_marker(candidate, method, &symbol, marker, &mut outcome)?;
        }
        Ok(outcome)
    }

    fn analyze_marker(
        &self,
        candidate: &Candidate,
        method: &MethodDecl,
        symbol: &MethodSymbol,
        marker: MarkerKind,
        outcome: &mut CandidateOutcome,
    ) -> Result<(), Cancelled> {
        let kind = match marker {
            MarkerKind::Handle => {
                if matches!(classify_return(&symbol.return_type), ReturnShape::Sequence(_)) {
                    HandlerKind::Stream
                } else {
                    HandlerKind::Request
                }
            }
            MarkerKind::Notification => HandlerKind::Notification,
            MarkerKind::Pipeline => HandlerKind::Pipeline,
            MarkerKind::ExposeAsEndpoint => HandlerKind::Endpoint,
        };

        let request_predicate = self.request_predicate(kind);
        let validated = validate_handler(symbol, kind, &request_predicate);
        let fatal = validated.fatal;
        outcome.diagnostics.extend(validated.diagnostics);
        if fatal {
            return Ok(());
        }

        let attribute = method
            .attributes
            .iter()
            .find(|a| short_attribute_name(&a.name) == marker.attribute_name());
        let args = match attribute {
            Some(attribute) => self.extract_args(symbol, attribute, outcome),
            None => ExtractedArgs::default(),
        };

        let request_type = match symbol.value_parameters().next() {
            Some(param) => param.ty.clone(),
            // Guarded by the fatal missing-parameter rule above.
            None => return Ok(()),
        };
        let response_type = self.response_type(candidate.method_id, symbol, kind);

        if let Some(diagnostic) = check_priority_range(symbol, args.priority) {
            outcome.diagnostics.push(diagnostic);
        }

        outcome.records.push(HandlerRecord {
            kind,
            declaring_type: symbol.containing_type.clone(),
            method_name: symbol.name.clone(),
            request_type,
            response_type,
            name: args.name,
            priority: args.priority,
            order: match kind {
                HandlerKind::Pipeline => Some(args.order),
                _ => None,
            },
            scope: match kind {
                HandlerKind::Pipeline => Some(args.scope),
                _ => None,
            },
            route: match kind {
                HandlerKind::Endpoint => args.route,
                _ => None,
            },
            location: symbol.location.clone(),
            is_static: symbol.is_static,
            accessibility: symbol.accessibility,
        });
        Ok(())
    }

    /// The structural predicate handed to the validation rules: whether a
    /// parameter type is admissible as the request of the given kind.
    fn request_predicate(&self, kind: HandlerKind) -> impl Fn(&TypeRef) -> bool + '_ {
        let interface = match kind {
            HandlerKind::Request => Some("IRequest"),
            HandlerKind::Stream => Some("IStreamRequest"),
            // Notifications, pipelines and endpoints take any payload type.
            _ => None,
        };
        let context = self.context;
        move |ty: &TypeRef| -> bool {
            let Some(interface) = interface else {
                return true;
            };
            match context.find_type(&ty.name) {
                Ok(Some(symbol)) => symbol.implements_interface(interface).is_some(),
                _ => false,
            }
        }
    }

    /// Memoized unwrapping of the response type from the return type.
    fn response_type(
        &self,
        method_id: MethodId,
        symbol: &MethodSymbol,
        kind: HandlerKind,
    ) -> Option<TypeRef> {
        match kind {
            HandlerKind::Notification => None,
            _ => self
                .response_memo
                .entry(method_id)
                .or_insert_with(|| match classify_return(&symbol.return_type) {
                    ReturnShape::AsyncValue(ty) | ReturnShape::Sequence(ty) => Some(ty),
                    _ => None,
                })
                .clone(),
        }
    }

    fn extract_args(
        &self,
        symbol: &MethodSymbol,
        attribute: &AttributeDecl,
        outcome: &mut CandidateOutcome,
    ) -> ExtractedArgs {
        let mut args = ExtractedArgs::default();
        if let Some(AttrValue::Str(name)) = attribute.find_arg("name") {
            let trimmed = name.trim();
            if !trimmed.is_empty() {
                args.name = Some(trimmed.to_string());
            }
        }
        args.priority = self.extract_int(symbol, attribute, "priority", outcome);
        args.order = self.extract_int(symbol, attribute, "order", outcome);
        match attribute.find_arg("scope") {
            Some(AttrValue::Ident(name)) | Some(AttrValue::Str(name)) => {
                match Scope::from_ident(name) {
                    Some(scope) => args.scope = scope,
                    None => outcome.diagnostics.push(
                        Diagnostic::format(
                            DiagnosticCode::InvalidScope,
                            &[&display_name(symbol), name],
                        )
                        .at(symbol.location.clone()),
                    ),
                }
            }
            Some(AttrValue::Int(value)) => match Scope::from_int(*value) {
                Some(scope) => args.scope = scope,
                None => outcome.diagnostics.push(
                    Diagnostic::format(
                        DiagnosticCode::InvalidScope,
                        &[&display_name(symbol), &value.to_string()],
                    )
                    .at(symbol.location.clone()),
                ),
            },
            None => {}
        }
        if let Some(AttrValue::Str(route)) = attribute.find_arg("route") {
            let trimmed = route.trim();
            if !trimmed.is_empty() {
                args.route = Some(trimmed.to_string());
            }
        }
        args
    }

    fn extract_int(
        &self,
        symbol: &MethodSymbol,
        attribute: &AttributeDecl,
        arg_name: &str,
        outcome: &mut CandidateOutcome,
    ) -> i32 {
        match attribute.find_arg(arg_name) {
            Some(AttrValue::Int(value)) => *value as i32,
            Some(AttrValue::Str(text)) | Some(AttrValue::Ident(text)) => {
                outcome.diagnostics.push(
                    Diagnostic::format(
                        DiagnosticCode::InvalidPriority,
                        &[&display_name(symbol), arg_name, text],
                    )
                    .at(symbol.location.clone()),
                );
                0
            }
            None => 0,
        }
    }

    /// Bucket handlers and report collisions. Buckets iterate in
    /// first-seen order; members in discovery order.
    fn detect_duplicates(&self, handlers: &[HandlerRecord], sink: &DiagnosticSink) {
        let mut request_buckets: IndexMap<(String, Option<String>), Vec<&HandlerRecord>> =
            IndexMap::new();
        for handler in handlers {
            if matches!(handler.kind, HandlerKind::Request | HandlerKind::Stream) {
                request_buckets
                    .entry((handler.request_type.to_string(), handler.name.clone()))
                    .or_default()
                    .push(handler);
            }
        }
        for ((request_type, name), bucket) in &request_buckets {
            if bucket.len() < 2 {
                continue;
            }
            for handler in bucket {
                let diagnostic = match name {
                    None => Diagnostic::format(
                        DiagnosticCode::DuplicateHandler,
                        &[request_type, &handler.display_name()],
                    ),
                    Some(name) => Diagnostic::format(
                        DiagnosticCode::NamedHandlerConflict,
                        &[request_type, &handler.display_name(), name],
                    ),
                };
                sink.report(diagnostic.at(handler.location.clone()));
            }
        }

        let mut pipeline_buckets: IndexMap<(String, i32, Scope), Vec<&HandlerRecord>> =
            IndexMap::new();
        for handler in handlers {
            if handler.kind == HandlerKind::Pipeline {
                pipeline_buckets
                    .entry((
                        handler.declaring_type.clone(),
                        handler.order.unwrap_or(0),
                        handler.scope.unwrap_or(Scope::All),
                    ))
                    .or_default()
                    .push(handler);
            }
        }
        for ((_, order, scope), bucket) in &pipeline_buckets {
            if bucket.len() < 2 {
                continue;
            }
            for handler in bucket {
                sink.report(
                    Diagnostic::format(
                        DiagnosticCode::DuplicatePipelineOrder,
                        &[
                            &handler.display_name(),
                            &order.to_string(),
                            &scope.to_string(),
                        ],
                    )
                    .at(handler.location.clone()),
                );
            }
        }
    }

    /// Structural interface implementations, independent of markers.
    fn collect_interface_impls(
        &self,
        candidate_classes: &[CandidateClass],
    ) -> Vec<InterfaceImplRecord> {
        let mut impls = Vec::new();
        for candidate in candidate_classes {
            let class =
                &self.context.compilation().trees()[candidate.tree_index].classes[candidate.class_index];
            for base in &class.base_list {
                let parsed = TypeRef::parse(base);
                let Some(kind) = InterfaceKind::from_interface_name(parsed.short_name()) else {
                    continue;
                };
                let Some(request_type) = parsed.args.first().cloned() else {
                    continue;
                };
                let response_type = match kind {
                    InterfaceKind::Notification => None,
                    _ => parsed.args.get(1).cloned(),
                };
                impls.push(InterfaceImplRecord {
                    implementing_type: class.fqn(),
                    interface_kind: kind,
                    request_type,
                    response_type,
                });
            }
        }
        impls
    }
}

fn display_name(symbol: &MethodSymbol) -> String {
    format!("{}.{}", symbol.containing_type, symbol.name)
}

/// Attribute arguments after extraction, with defaults applied.
#[derive(Debug)]
struct ExtractedArgs {
    name: Option<String>,
    priority: i32,
    order: i32,
    scope: Scope,
    route: Option<String>,
}

impl Default for ExtractedArgs {
    fn default() -> Self {
        ExtractedArgs {
            name: None,
            priority: 0,
            order: 0,
            scope: Scope::All,
            route: None,
        }
    }
}
