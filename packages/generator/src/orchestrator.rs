//! Pipeline Orchestrator
//!
//! Top-level coordination: validate options, scan every tree, discover
//! and validate the handler model, select the applicable emitters and run
//! them with per-emitter error isolation. Recoverable emitter faults are
//! reported and replaced with fallback output; cancellation and critical
//! faults unwind the whole invocation.

use crate::context::SemanticContext;
use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use crate::discovery::{DiscoveryEngine, ENGINE_MAX_WORKERS, ENGINE_MIN_WORKERS};
use crate::emit::{all_emitters, EmitError, Emitter, FallbackEmitter};
use crate::filter::{scan_classes, scan_tree, Candidate, CandidateClass};
use crate::model::HandlerModel;
use crate::options::{EffectiveOptions, GenerationOptions};
use crate::trace::{GenerationTrace, Phase, SilentTrace};
use indexmap::IndexMap;
use rayon::prelude::*;
use relay_host::{Cancelled, CancellationToken, Compilation};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Faults that unwind a generation run. Everything else is a diagnostic.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    #[error("critical fault: {0}")]
    Critical(String),
}

/// The artifacts of one generation run. Keys are the stable output file
/// names; each enabled and applicable emitter contributes exactly one.
#[derive(Debug, Default)]
pub struct GeneratedOutput {
    pub files: IndexMap<String, String>,
}

/// Injected fault hook, used to exercise the recoverable-error path
/// without process-global state.
#[derive(Default)]
pub struct FaultPolicy {
    hook: Option<Box<dyn Fn(&str) -> Option<anyhow::Error> + Send + Sync>>,
}

impl FaultPolicy {
    /// The production policy: no injected faults.
    pub fn never() -> Self {
        Self::default()
    }

    /// Fail every emitter the hook returns an error for.
    pub fn from_fn(
        hook: impl Fn(&str) -> Option<anyhow::Error> + Send + Sync + 'static,
    ) -> Self {
        FaultPolicy {
            hook: Some(Box::new(hook)),
        }
    }

    pub fn should_fail(&self, emitter_name: &str) -> Option<anyhow::Error> {
        self.hook.as_ref().and_then(|hook| hook(emitter_name))
    }
}

pub struct RelayGenerator {
    trace: Arc<dyn GenerationTrace>,
}

impl Default for RelayGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayGenerator {
    pub fn new() -> Self {
        RelayGenerator {
            trace: Arc::new(SilentTrace),
        }
    }

    pub fn with_trace(trace: Arc<dyn GenerationTrace>) -> Self {
        RelayGenerator { trace }
    }

    /// Run the full pipeline with the built-in emitter set.
    pub fn generate(
        &self,
        compilation: Arc<Compilation>,
        options: &GenerationOptions,
        sink: &DiagnosticSink,
        token: CancellationToken,
    ) -> Result<GeneratedOutput, GenerateError> {
        self.generate_with(
            compilation,
            options,
            sink,
            token,
            &FaultPolicy::never(),
            &all_emitters(),
        )
    }

    /// Run the full pipeline with an explicit emitter set and fault
    /// policy. The entry point hosts use when they extend or probe the
    /// emitter roster.
    pub fn generate_with(
        &self,
        compilation: Arc<Compilation>,
        options: &GenerationOptions,
        sink: &DiagnosticSink,
        token: CancellationToken,
        fault_policy: &FaultPolicy,
        emitters: &[Arc<dyn Emitter>],
    ) -> Result<GeneratedOutput, GenerateError> {
        let configure_started = Instant::now();
        let effective = options.validate(sink);
        self.trace.phase_completed(
            Phase::Configure,
            configure_started.elapsed().as_millis(),
            &format!(
                "parallelism {}, namespace {}",
                effective.parallelism, effective.namespace
            ),
        );
        let context = SemanticContext::new(compilation, token.clone());

        let scan_started = Instant::now();
        let (candidates, candidate_classes) = self.scan(&context, &token)?;
        self.trace.phase_completed(
            Phase::Scan,
            scan_started.elapsed().as_millis(),
            &format!("{} candidate method(s)", candidates.len()),
        );

        let discover_started = Instant::now();
        let engine = DiscoveryEngine::new(&context);
        let model = engine.discover(&candidates, &candidate_classes, &effective, sink)?;
        self.trace.phase_completed(
            Phase::Discover,
            discover_started.elapsed().as_millis(),
            &format!(
                "{} handler(s) in {} type(s)",
                model.handlers.len(),
                model.handler_types().len()
            ),
        );

        if effective.options.include_debug_info {
            sink.report(Diagnostic::format(
                DiagnosticCode::Info,
                &[&format!(
                    "Relay generator: {} handler(s), {} interface implementation(s)",
                    model.handlers.len(),
                    model.interface_impls.len()
                )],
            ));
        }

        let emit_started = Instant::now();
        let selected = self.select_emitters(emitters, &effective, &model);
        let files = self.run_emitters(&selected, &model, &effective, fault_policy, &token, sink)?;
        self.trace.phase_completed(
            Phase::Emit,
            emit_started.elapsed().as_millis(),
            &format!(
                "{} emitter(s) selected, {} file(s) written",
                selected.len(),
                files.len()
            ),
        );
        Ok(GeneratedOutput { files })
    }

    fn scan(
        &self,
        context: &SemanticContext,
        token: &CancellationToken,
    ) -> Result<(Vec<Candidate>, Vec<CandidateClass>), Cancelled> {
        let mut candidates = Vec::new();
        let mut candidate_classes = Vec::new();
        for (tree_index, tree) in context.compilation().trees().iter().enumerate() {
            token.checkpoint()?;
            candidates.extend(scan_tree(tree, tree_index, token)?);
            candidate_classes.extend(scan_classes(tree, tree_index, token)?);
        }
        Ok((candidates, candidate_classes))
    }

    fn select_emitters(
        &self,
        emitters: &[Arc<dyn Emitter>],
        effective: &EffectiveOptions,
        model: &HandlerModel,
    ) -> Vec<Arc<dyn Emitter>> {
        let mut selected: Vec<Arc<dyn Emitter>> = emitters
            .iter()
            .filter(|e| e.is_enabled(&effective.options) && e.can_emit(model))
            .cloned()
            .collect();
        selected.sort_by_key(|e| e.priority());
        selected
    }

    fn run_emitters(
        &self,
        selected: &[Arc<dyn Emitter>],
        model: &HandlerModel,
        effective: &EffectiveOptions,
        fault_policy: &FaultPolicy,
        token: &CancellationToken,
        sink: &DiagnosticSink,
    ) -> Result<IndexMap<String, String>, GenerateError> {
        let parallel = selected.len() > 1
            && effective.parallelism > 1
            && effective.options.enable_performance_optimizations;

        let results: Vec<Result<String, EmitError>> = if parallel {
            let workers =
                (effective.parallelism as usize).clamp(ENGINE_MIN_WORKERS, ENGINE_MAX_WORKERS);
            match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
                Ok(pool) => pool.install(|| {
                    selected
                        .par_iter()
                        .map(|e| run_one(e.as_ref(), model, effective, fault_policy, token))
                        .collect()
                }),
                Err(_) => selected
                    .iter()
                    .map(|e| run_one(e.as_ref(), model, effective, fault_policy, token))
                    .collect(),
            }
        } else {
            selected
                .iter()
                .map(|e| run_one(e.as_ref(), model, effective, fault_policy, token))
                .collect()
        };

        // Unrecoverable faults win over any fallback substitution.
        for result in &results {
            match result {
                Err(EmitError::Cancelled(cancelled)) => return Err((*cancelled).into()),
                Err(EmitError::Critical(message)) => {
                    return Err(GenerateError::Critical(message.clone()))
                }
                _ => {}
            }
        }

        let mut files = IndexMap::new();
        for (emitter, result) in selected.iter().zip(results) {
            match result {
                Ok(text) => {
                    files.insert(emitter.output_file().to_string(), text);
                }
                Err(EmitError::Recoverable(error)) => {
                    self.trace.emitter_degraded(
                        emitter.name(),
                        emitter.output_file(),
                        &error.to_string(),
                    );
                    sink.report(Diagnostic::format(
                        DiagnosticCode::GeneratorError,
                        &[emitter.name(), &error.to_string()],
                    ));
                    files.insert(
                        emitter.output_file().to_string(),
                        FallbackEmitter::emit_for(
                            emitter.as_ref(),
                            &error.to_string(),
                            model,
                            effective,
                        ),
                    );
                }
                // Handled by the propagation pass above.
                Err(EmitError::Cancelled(cancelled)) => return Err(cancelled.into()),
                Err(EmitError::Critical(message)) => return Err(GenerateError::Critical(message)),
            }
        }
        Ok(files)
    }
}

fn run_one(
    emitter: &dyn Emitter,
    model: &HandlerModel,
    effective: &EffectiveOptions,
    fault_policy: &FaultPolicy,
    token: &CancellationToken,
) -> Result<String, EmitError> {
    token.checkpoint()?;
    if let Some(error) = fault_policy.should_fail(emitter.name()) {
        return Err(EmitError::Recoverable(error));
    }
    let text = emitter.emit(model, effective)?;
    if text.trim().is_empty() {
        return Err(EmitError::Recoverable(anyhow::anyhow!(
            "emitter produced empty output"
        )));
    }
    Ok(text)
}
