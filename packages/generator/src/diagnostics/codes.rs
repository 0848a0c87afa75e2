//! Diagnostic Codes
//!
//! The closed catalog of generator diagnostics. Ids are stable strings the
//! host surfaces to users; never renumber or reuse them.

use super::{Category, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// A recoverable generator failure, reported from catch sites. The
    /// batch continues; only the failing unit is skipped or degraded.
    GeneratorError,

    /// The overall shape of a handler method is not one the dispatch
    /// runtime can call.
    InvalidHandlerSignature,

    /// Two or more unnamed handlers accept the same request type.
    DuplicateHandler,

    /// Handler markers are present but the compilation does not reference
    /// the Relay runtime library.
    MissingRuntimeReference,

    /// Two or more handlers for one request type collide on the same name.
    NamedHandlerConflict,

    /// Priority magnitude is outside the recommended range; dispatch still
    /// works but ordering tables grow degenerate.
    PriorityOutOfRange,

    /// Handler is declared `private`; generated code cannot reach it.
    InaccessibleHandler,

    /// The handler's declaring type takes an unusually wide constructor,
    /// which strains service resolution.
    ConstructorParameterConcern,

    /// Request handler return type is not an admissible async singleton.
    InvalidReturnType,

    /// Stream handler return type is not the lazy sequence type.
    InvalidStreamReturnType,

    /// Notification handler return type is neither async-void nor void.
    InvalidNotificationReturnType,

    /// Handler declares no request parameter at all.
    MissingRequestParameter,

    /// The first value parameter is not a request type.
    InvalidRequestParameterType,

    /// Handler takes no cancellation token; it cannot observe host stops.
    MissingCancellationParameter,

    /// Notification handler declares no notification parameter.
    NotificationMissingParameter,

    /// Informational trace.
    Info,

    /// Debug trace.
    Debug,

    /// The scan found marker candidates but discovery produced no records.
    NoHandlers,

    /// The generation options contradict themselves.
    ConfigConflict,

    /// A pipeline scope argument is not a member of the scope enum.
    InvalidScope,

    /// Two pipelines in one containing type share an order within a scope.
    DuplicatePipelineOrder,

    /// A priority or order argument is not an integer literal.
    InvalidPriority,
}

impl DiagnosticCode {
    /// Stable identifier surfaced to the host.
    pub fn id(self) -> &'static str {
        match self {
            DiagnosticCode::GeneratorError => "RELAY_GEN_001",
            DiagnosticCode::InvalidHandlerSignature => "RELAY_GEN_002",
            DiagnosticCode::DuplicateHandler => "RELAY_GEN_003",
            DiagnosticCode::MissingRuntimeReference => "RELAY_GEN_004",
            DiagnosticCode::NamedHandlerConflict => "RELAY_GEN_005",
            DiagnosticCode::PriorityOutOfRange => "RELAY_GEN_102",
            DiagnosticCode::InaccessibleHandler => "RELAY_GEN_106",
            DiagnosticCode::ConstructorParameterConcern => "RELAY_GEN_109",
            DiagnosticCode::InvalidReturnType => "RELAY_GEN_202",
            DiagnosticCode::InvalidStreamReturnType => "RELAY_GEN_203",
            DiagnosticCode::InvalidNotificationReturnType => "RELAY_GEN_204",
            DiagnosticCode::MissingRequestParameter => "RELAY_GEN_205",
            DiagnosticCode::InvalidRequestParameterType => "RELAY_GEN_206",
            DiagnosticCode::MissingCancellationParameter => "RELAY_GEN_207",
            DiagnosticCode::NotificationMissingParameter => "RELAY_GEN_208",
            DiagnosticCode::Info => "RELAY_GEN_Info",
            DiagnosticCode::Debug => "RELAY_GEN_Debug",
            DiagnosticCode::NoHandlers => "RELAY_GEN_NoHandlers",
            DiagnosticCode::ConfigConflict => "RELAY_GEN_ConfigConflict",
            DiagnosticCode::InvalidScope => "RELAY_GEN_InvalidScope",
            DiagnosticCode::DuplicatePipelineOrder => "RELAY_GEN_DuplicatePipelineOrder",
            DiagnosticCode::InvalidPriority => "RELAY_GEN_InvalidPriority",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            DiagnosticCode::GeneratorError
            | DiagnosticCode::InvalidHandlerSignature
            | DiagnosticCode::DuplicateHandler
            | DiagnosticCode::MissingRuntimeReference
            | DiagnosticCode::NamedHandlerConflict
            | DiagnosticCode::InaccessibleHandler
            | DiagnosticCode::InvalidReturnType
            | DiagnosticCode::InvalidStreamReturnType
            | DiagnosticCode::InvalidNotificationReturnType
            | DiagnosticCode::MissingRequestParameter
            | DiagnosticCode::InvalidRequestParameterType
            | DiagnosticCode::NotificationMissingParameter
            | DiagnosticCode::ConfigConflict
            | DiagnosticCode::InvalidScope
            | DiagnosticCode::DuplicatePipelineOrder
            | DiagnosticCode::InvalidPriority => Severity::Error,

            DiagnosticCode::PriorityOutOfRange
            | DiagnosticCode::ConstructorParameterConcern
            | DiagnosticCode::MissingCancellationParameter
            | DiagnosticCode::NoHandlers => Severity::Warning,

            DiagnosticCode::Info | DiagnosticCode::Debug => Severity::Info,
        }
    }

    pub fn category(self) -> Category {
        match self {
            DiagnosticCode::GeneratorError | DiagnosticCode::Info | DiagnosticCode::Debug => {
                Category::Generator
            }
            DiagnosticCode::PriorityOutOfRange | DiagnosticCode::ConstructorParameterConcern => {
                Category::Performance
            }
            DiagnosticCode::ConfigConflict => Category::Configuration,
            _ => Category::Usage,
        }
    }

    /// Message template with `{n}` placeholders; see
    /// [`super::Diagnostic::format`].
    pub fn message_template(self) -> &'static str {
        match self {
            DiagnosticCode::GeneratorError => "Generator error while processing `{0}`: {1}",
            DiagnosticCode::InvalidHandlerSignature => "Handler `{0}` has an invalid signature: {1}",
            DiagnosticCode::DuplicateHandler => {
                "Duplicate handler for request type `{0}`: `{1}` conflicts with another unnamed handler"
            }
            DiagnosticCode::MissingRuntimeReference => {
                "Relay markers are used but the compilation does not reference the Relay runtime"
            }
            DiagnosticCode::NamedHandlerConflict => {
                "Handler name conflict for request type `{0}`: `{1}` collides on name `{2}`"
            }
            DiagnosticCode::PriorityOutOfRange => {
                "Handler `{0}` declares priority {1}, outside the recommended range -1000..=1000"
            }
            DiagnosticCode::InaccessibleHandler => {
                "Handler `{0}` is private; generated code cannot invoke it"
            }
            DiagnosticCode::ConstructorParameterConcern => {
                "Type `{0}` takes {1} constructor parameters; resolving it per dispatch is costly"
            }
            DiagnosticCode::InvalidReturnType => {
                "Handler `{0}` returns `{1}`; expected Task<T>, ValueTask<T>, Task, ValueTask or void"
            }
            DiagnosticCode::InvalidStreamReturnType => {
                "Stream handler `{0}` returns `{1}`; expected IAsyncEnumerable<T>"
            }
            DiagnosticCode::InvalidNotificationReturnType => {
                "Notification handler `{0}` returns `{1}`; expected Task, ValueTask or void"
            }
            DiagnosticCode::MissingRequestParameter => "Handler `{0}` declares no request parameter",
            DiagnosticCode::InvalidRequestParameterType => {
                "Handler `{0}` takes `{1}`, which is not a request type"
            }
            DiagnosticCode::MissingCancellationParameter => {
                "Handler `{0}` takes no CancellationToken and cannot observe cancellation"
            }
            DiagnosticCode::NotificationMissingParameter => {
                "Notification handler `{0}` declares no notification parameter"
            }
            DiagnosticCode::Info => "{0}",
            DiagnosticCode::Debug => "{0}",
            DiagnosticCode::NoHandlers => {
                "No Relay handlers were discovered in this compilation"
            }
            DiagnosticCode::ConfigConflict => "Invalid generator configuration: {0}",
            DiagnosticCode::InvalidScope => {
                "Pipeline `{0}` declares scope `{1}`, which is not a pipeline scope"
            }
            DiagnosticCode::DuplicatePipelineOrder => {
                "Pipeline `{0}` reuses order {1} in scope {2} of its containing type"
            }
            DiagnosticCode::InvalidPriority => {
                "Handler `{0}` declares `{1}` = `{2}`, which is not an integer"
            }
        }
    }
}
