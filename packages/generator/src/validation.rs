//! Validation Rules
//!
//! Stateless shape checks over resolved handler methods. Each rule pairs a
//! predicate with a catalog diagnostic; discovery invokes the battery per
//! handler and reports every violation at the method's location. A fatal
//! outcome means classification is impossible and no record is produced;
//! everything else keeps the record alongside its diagnostics.

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::model::HandlerKind;
use relay_host::{MethodSymbol, TypeRef};

/// Recommended priority magnitude. Beyond this the ordering tables still
/// work but get a performance warning.
pub const PRIORITY_RECOMMENDED_MAX: i32 = 1000;

/// Constructor width beyond which service resolution gets a warning.
pub const CTOR_PARAM_CONCERN_THRESHOLD: usize = 8;

/// Canonical shape of a handler return type.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnShape {
    /// `Task<T>` or `ValueTask<T>`.
    AsyncValue(TypeRef),
    /// `Task` or `ValueTask`.
    AsyncVoid,
    /// `void`.
    SyncVoid,
    /// `IAsyncEnumerable<T>`.
    Sequence(TypeRef),
    Other,
}

pub fn classify_return(ty: &TypeRef) -> ReturnShape {
    match (ty.short_name(), ty.args.len()) {
        ("Task" | "ValueTask", 1) => ReturnShape::AsyncValue(ty.args[0].clone()),
        ("Task" | "ValueTask", 0) => ReturnShape::AsyncVoid,
        ("IAsyncEnumerable", 1) => ReturnShape::Sequence(ty.args[0].clone()),
        _ if ty.is_void() => ReturnShape::SyncVoid,
        _ => ReturnShape::Other,
    }
}

/// Outcome of validating one handler.
#[derive(Debug, Default)]
pub struct Validated {
    pub diagnostics: Vec<Diagnostic>,
    pub fatal: bool,
}

impl Validated {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn fatal(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
        self.fatal = true;
    }
}

fn display_name(symbol: &MethodSymbol) -> String {
    format!("{}.{}", symbol.containing_type, symbol.name)
}

/// Validate a handler method against the rules of its kind. The request
/// predicate answers whether a parameter type is admissible as the request
/// for this kind (structural interface check, supplied by discovery).
pub fn validate_handler(
    symbol: &MethodSymbol,
    kind: HandlerKind,
    is_request_type: &dyn Fn(&TypeRef) -> bool,
) -> Validated {
    let mut outcome = Validated::default();
    check_accessibility(symbol, &mut outcome);
    match kind {
        HandlerKind::Request => validate_request(symbol, is_request_type, &mut outcome),
        HandlerKind::Stream => validate_stream(symbol, is_request_type, &mut outcome),
        HandlerKind::Notification => validate_notification(symbol, &mut outcome),
        HandlerKind::Pipeline => validate_pipeline(symbol, &mut outcome),
        HandlerKind::Endpoint => validate_endpoint(symbol, &mut outcome),
    }
    outcome
}

fn check_accessibility(symbol: &MethodSymbol, outcome: &mut Validated) {
    if !symbol.accessibility.is_reachable() {
        outcome.fatal(
            Diagnostic::format(
                DiagnosticCode::InaccessibleHandler,
                &[&display_name(symbol)],
            )
            .at(symbol.location.clone()),
        );
    }
}

fn check_cancellation_convention(symbol: &MethodSymbol, outcome: &mut Validated) {
    if !symbol.has_cancellation_parameter() {
        outcome.report(
            Diagnostic::format(
                DiagnosticCode::MissingCancellationParameter,
                &[&display_name(symbol)],
            )
            .at(symbol.location.clone()),
        );
    }
}

fn validate_request(
    symbol: &MethodSymbol,
    is_request_type: &dyn Fn(&TypeRef) -> bool,
    outcome: &mut Validated,
) {
    let value_params: Vec<_> = symbol.value_parameters().collect();
    match value_params.first() {
        None => {
            outcome.fatal(
                Diagnostic::format(
                    DiagnosticCode::MissingRequestParameter,
                    &[&display_name(symbol)],
                )
                .at(symbol.location.clone()),
            );
            return;
        }
        Some(first) if !is_request_type(&first.ty) => {
            outcome.fatal(
                Diagnostic::format(
                    DiagnosticCode::InvalidRequestParameterType,
                    &[&display_name(symbol), &first.ty.to_string()],
                )
                .at(symbol.location.clone()),
            );
        }
        Some(_) => {}
    }
    if value_params.len() > 1 {
        outcome.report(
            Diagnostic::format(
                DiagnosticCode::InvalidHandlerSignature,
                &[
                    &display_name(symbol),
                    "request handlers take exactly one request parameter",
                ],
            )
            .at(symbol.location.clone()),
        );
    }
    match classify_return(&symbol.return_type) {
        ReturnShape::AsyncValue(_) | ReturnShape::AsyncVoid | ReturnShape::SyncVoid => {}
        _ => {
            outcome.report(
                Diagnostic::format(
                    DiagnosticCode::InvalidReturnType,
                    &[&display_name(symbol), &symbol.return_type.to_string()],
                )
                .at(symbol.location.clone()),
            );
        }
    }
    check_cancellation_convention(symbol, outcome);
}

fn validate_stream(
    symbol: &MethodSymbol,
    is_request_type: &dyn Fn(&TypeRef) -> bool,
    outcome: &mut Validated,
) {
    let value_params: Vec<_> = symbol.value_parameters().collect();
    match value_params.first() {
        None => {
            outcome.fatal(
                Diagnostic::format(
                    DiagnosticCode::MissingRequestParameter,
                    &[&display_name(symbol)],
                )
                .at(symbol.location.clone()),
            );
            return;
        }
        Some(first) if !is_request_type(&first.ty) => {
            outcome.fatal(
                Diagnostic::format(
                    DiagnosticCode::InvalidRequestParameterType,
                    &[&display_name(symbol), &first.ty.to_string()],
                )
                .at(symbol.location.clone()),
            );
        }
        Some(_) => {}
    }
    if !matches!(classify_return(&symbol.return_type), ReturnShape::Sequence(_)) {
        outcome.report(
            Diagnostic::format(
                DiagnosticCode::InvalidStreamReturnType,
                &[&display_name(symbol), &symbol.return_type.to_string()],
            )
            .at(symbol.location.clone()),
        );
    }
    check_cancellation_convention(symbol, outcome);
}

fn validate_notification(symbol: &MethodSymbol, outcome: &mut Validated) {
    let value_params: Vec<_> = symbol.value_parameters().collect();
    if value_params.is_empty() {
        outcome.fatal(
            Diagnostic::format(
                DiagnosticCode::NotificationMissingParameter,
                &[&display_name(symbol)],
            )
            .at(symbol.location.clone()),
        );
        return;
    }
    if value_params.len() > 1 {
        outcome.report(
            Diagnostic::format(
                DiagnosticCode::InvalidHandlerSignature,
                &[
                    &display_name(symbol),
                    "notification handlers take exactly one notification parameter",
                ],
            )
            .at(symbol.location.clone()),
        );
    }
    match classify_return(&symbol.return_type) {
        ReturnShape::AsyncVoid | ReturnShape::SyncVoid => {}
        _ => {
            outcome.report(
                Diagnostic::format(
                    DiagnosticCode::InvalidNotificationReturnType,
                    &[&display_name(symbol), &symbol.return_type.to_string()],
                )
                .at(symbol.location.clone()),
            );
        }
    }
    check_cancellation_convention(symbol, outcome);
}

/// Whether a type is an admissible next-step delegate inside a pipeline:
/// `RequestHandlerDelegate<T>`, `StreamHandlerDelegate<T>`, or a nullary
/// `Func<>` returning an admissible async type.
fn is_next_delegate(ty: &TypeRef) -> bool {
    match (ty.short_name(), ty.args.len()) {
        ("RequestHandlerDelegate" | "StreamHandlerDelegate", 0 | 1) => true,
        ("Func", 1) => matches!(
            classify_return(&ty.args[0]),
            ReturnShape::AsyncValue(_) | ReturnShape::AsyncVoid | ReturnShape::Sequence(_)
        ),
        _ => false,
    }
}

fn validate_pipeline(symbol: &MethodSymbol, outcome: &mut Validated) {
    let params = &symbol.parameters;
    if symbol.value_parameters().next().is_none() {
        outcome.fatal(
            Diagnostic::format(
                DiagnosticCode::MissingRequestParameter,
                &[&display_name(symbol)],
            )
            .at(symbol.location.clone()),
        );
        return;
    }
    if params.len() < 2 {
        outcome.fatal(
            Diagnostic::format(
                DiagnosticCode::InvalidHandlerSignature,
                &[
                    &display_name(symbol),
                    "pipelines take at least a request and a next delegate",
                ],
            )
            .at(symbol.location.clone()),
        );
        return;
    }
    if params.len() == 3 {
        // Canonical form: (request, next, cancellation).
        if !is_next_delegate(&params[1].ty) {
            outcome.report(
                Diagnostic::format(
                    DiagnosticCode::InvalidHandlerSignature,
                    &[
                        &display_name(symbol),
                        "second pipeline parameter must be a handler delegate",
                    ],
                )
                .at(symbol.location.clone()),
            );
        }
    }
    match params.last() {
        Some(last) if last.is_cancellation() => {}
        _ => {
            outcome.report(
                Diagnostic::format(
                    DiagnosticCode::InvalidHandlerSignature,
                    &[
                        &display_name(symbol),
                        "last pipeline parameter must be a CancellationToken",
                    ],
                )
                .at(symbol.location.clone()),
            );
        }
    }
    match classify_return(&symbol.return_type) {
        ReturnShape::AsyncValue(_) | ReturnShape::AsyncVoid | ReturnShape::Sequence(_) => {}
        _ => {
            outcome.report(
                Diagnostic::format(
                    DiagnosticCode::InvalidReturnType,
                    &[&display_name(symbol), &symbol.return_type.to_string()],
                )
                .at(symbol.location.clone()),
            );
        }
    }
}

fn validate_endpoint(symbol: &MethodSymbol, outcome: &mut Validated) {
    if symbol.value_parameters().next().is_none() {
        outcome.fatal(
            Diagnostic::format(
                DiagnosticCode::MissingRequestParameter,
                &[&display_name(symbol)],
            )
            .at(symbol.location.clone()),
        );
        return;
    }
    if symbol.parameters.len() != 1 {
        outcome.report(
            Diagnostic::format(
                DiagnosticCode::InvalidHandlerSignature,
                &[
                    &display_name(symbol),
                    "endpoint methods take exactly the request parameter",
                ],
            )
            .at(symbol.location.clone()),
        );
    }
}

/// Priority magnitude sanity check, warning only.
pub fn check_priority_range(symbol: &MethodSymbol, priority: i32) -> Option<Diagnostic> {
    if priority.abs() > PRIORITY_RECOMMENDED_MAX {
        Some(
            Diagnostic::format(
                DiagnosticCode::PriorityOutOfRange,
                &[&display_name(symbol), &priority.to_string()],
            )
            .at(symbol.location.clone()),
        )
    } else {
        None
    }
}

/// Constructor width concern for a handler's declaring type.
pub fn check_ctor_params(
    type_fqn: &str,
    ctor_param_count: usize,
    location: &relay_host::SourceLocation,
) -> Option<Diagnostic> {
    if ctor_param_count > CTOR_PARAM_CONCERN_THRESHOLD {
        Some(
            Diagnostic::format(
                DiagnosticCode::ConstructorParameterConcern,
                &[type_fqn, &ctor_param_count.to_string()],
            )
            .at(location.clone()),
        )
    } else {
        None
    }
}
