//! Fallback Emitter
//!
//! Produces a degraded-but-compilable replacement for exactly one failed
//! emitter's output file: a base registration, a minimal type list and a
//! dispatcher stub that throws with the original failure text. Invoked
//! only for recoverable faults; cancellation and critical faults never
//! reach it.

use super::{cs_type, sanitize_type_name, write_header, Emitter, SourceWriter};
use crate::model::HandlerModel;
use crate::options::EffectiveOptions;
use relay_host::TypeRef;

pub struct FallbackEmitter;

impl FallbackEmitter {
    /// Replacement text for the failed emitter's file.
    pub fn emit_for(
        failed: &dyn Emitter,
        error: &str,
        model: &HandlerModel,
        options: &EffectiveOptions,
    ) -> String {
        let class_suffix = sanitize_type_name(failed.name());
        let error_text = error.replace('"', "'");

        let mut w = SourceWriter::new();
        write_header(&mut w, options);
        w.println("using Microsoft.Extensions.DependencyInjection;");
        w.blank();
        w.open_block(&format!("namespace {}", options.namespace));
        w.println(&format!(
            "// Degraded output: the {} emitter failed ({}).",
            failed.name(),
            error_text
        ));
        w.open_block(&format!("public static class RelayFallbackFor{}", class_suffix));
        w.open_block(&format!(
            "public static IServiceCollection AddRelayFallback{}(this IServiceCollection services)",
            class_suffix
        ));
        for type_fqn in model.handler_types() {
            w.println(&format!(
                "services.AddScoped<{}>();",
                cs_type(&TypeRef::new(type_fqn))
            ));
        }
        w.println("return services;");
        w.close_block();
        w.blank();
        w.open_block("public static readonly string[] HandlerTypes =");
        for type_fqn in model.handler_types() {
            w.println(&format!("\"{}\",", type_fqn));
        }
        w.close_block_with(";");
        w.blank();
        w.open_block(&format!(
            "public static global::System.Threading.Tasks.Task<TResponse> Dispatch{}<TResponse>(global::Relay.IRequest<TResponse> request, global::System.Threading.CancellationToken cancellationToken = default)",
            class_suffix
        ));
        w.println(&format!(
            "throw new global::System.NotSupportedException(\"{} was not generated: {}\");",
            failed.output_file(),
            error_text
        ));
        w.close_block();
        w.close_block();
        w.close_block();
        w.to_source()
    }
}
