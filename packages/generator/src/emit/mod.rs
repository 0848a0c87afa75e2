//! Code Emitters
//!
//! Interchangeable generators over one frozen handler model. Every
//! emitter exposes the same capability set: a name, a fixed output file,
//! a priority, an applicability test and the emission itself. The
//! orchestrator never interprets emitted text; the only contract is a
//! non-empty string whenever `can_emit` holds.

mod dispatcher;
mod endpoint_metadata;
mod fallback;
mod handler_registry;
mod notification;
mod pipeline_registry;
mod registration;
mod writer;

pub use dispatcher::DispatcherEmitter;
pub use endpoint_metadata::EndpointMetadataEmitter;
pub use fallback::FallbackEmitter;
pub use handler_registry::HandlerRegistryEmitter;
pub use notification::NotificationDispatcherEmitter;
pub use pipeline_registry::PipelineRegistryEmitter;
pub use registration::RegistrationEmitter;
pub use writer::SourceWriter;

use crate::model::HandlerModel;
use crate::options::{EffectiveOptions, GenerationOptions};
use crate::version::VERSION;
use relay_host::{Cancelled, TypeRef};
use std::sync::Arc;
use thiserror::Error;

/// Failure of a single emitter.
#[derive(Debug, Error)]
pub enum EmitError {
    /// Recoverable; the orchestrator substitutes fallback output for this
    /// emitter's file and continues.
    #[error("emitter fault: {0}")]
    Recoverable(#[from] anyhow::Error),

    /// Propagated unconditionally.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    /// Out-of-memory class failures. Propagated unconditionally.
    #[error("critical fault: {0}")]
    Critical(String),
}

/// The uniform emitter capability set.
pub trait Emitter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Relative output path, stable across runs.
    fn output_file(&self) -> &'static str;

    /// Execution order, ascending, 0..=100.
    fn priority(&self) -> u8;

    /// Whether the user-facing switch for this emitter is on.
    fn is_enabled(&self, options: &GenerationOptions) -> bool;

    /// Whether the model gives this emitter anything to say.
    fn can_emit(&self, model: &HandlerModel) -> bool;

    fn emit(&self, model: &HandlerModel, options: &EffectiveOptions) -> Result<String, EmitError>;
}

/// Every known emitter, in priority order.
pub fn all_emitters() -> Vec<Arc<dyn Emitter>> {
    vec![
        Arc::new(RegistrationEmitter),
        Arc::new(HandlerRegistryEmitter),
        Arc::new(DispatcherEmitter),
        Arc::new(NotificationDispatcherEmitter),
        Arc::new(PipelineRegistryEmitter),
        Arc::new(EndpointMetadataEmitter),
    ]
}

/// Compose a generated identifier fragment from a type name. Each of
/// `.`, `<`, `>`, `,`, `[`, `]` and the arity backtick becomes `_`;
/// alphanumerics and `_` pass through, ordering is preserved. Nested and
/// generic types stay stable and unique under this mapping.
pub fn sanitize_type_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// C# builtin type keywords that never take a `global::` prefix.
const BUILTIN_TYPES: &[&str] = &[
    "bool", "byte", "sbyte", "char", "decimal", "double", "float", "int", "uint", "long", "ulong",
    "short", "ushort", "object", "string", "void",
];

/// Spell a type reference in generated C#, fully qualified.
pub fn cs_type(ty: &TypeRef) -> String {
    let base = if BUILTIN_TYPES.contains(&ty.name.as_str()) {
        ty.name.clone()
    } else {
        format!("global::{}", ty.name)
    };
    if ty.args.is_empty() {
        base
    } else {
        let args: Vec<String> = ty.args.iter().map(cs_type).collect();
        format!("{}<{}>", base, args.join(", "))
    }
}

/// Common artifact header: auto-generated marker, generator version and
/// the nullable context directive when enabled.
pub(crate) fn write_header(writer: &mut SourceWriter, options: &EffectiveOptions) {
    writer.println("// <auto-generated/>");
    writer.println(&format!(
        "// Generated by the Relay generator v{}. Edits will be overwritten.",
        VERSION
    ));
    if options.options.enable_nullable_context {
        writer.println("#nullable enable");
    }
    writer.blank();
}

/// Doc summary line, honoring the documentation switch.
pub(crate) fn write_doc_summary(writer: &mut SourceWriter, options: &EffectiveOptions, text: &str) {
    if options.options.include_documentation {
        writer.println(&format!("/// <summary>{}</summary>", text));
    }
}

/// The inlining attribute dispatch methods carry when the switch is on.
pub(crate) const AGGRESSIVE_INLINING: &str =
    "[global::System.Runtime.CompilerServices.MethodImpl(global::System.Runtime.CompilerServices.MethodImplOptions.AggressiveInlining)]";
