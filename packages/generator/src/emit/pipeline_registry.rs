//! Pipeline Registry Emitter
//!
//! Emits the ordered pipeline tables, one list per dispatch scope. The
//! ordering key is the declared order ascending, then declaration order;
//! pipelines scoped `All` participate in every list.

use super::{cs_type, write_doc_summary, write_header, EmitError, Emitter, SourceWriter};
use crate::model::{HandlerModel, HandlerRecord, Scope};
use crate::options::{EffectiveOptions, GenerationOptions};
use relay_host::TypeRef;

pub struct PipelineRegistryEmitter;

impl Emitter for PipelineRegistryEmitter {
    fn name(&self) -> &'static str {
        "PipelineRegistry"
    }

    fn output_file(&self) -> &'static str {
        "PipelineRegistry.g.cs"
    }

    fn priority(&self) -> u8 {
        50
    }

    fn is_enabled(&self, options: &GenerationOptions) -> bool {
        options.enable_pipeline_registry
    }

    fn can_emit(&self, model: &HandlerModel) -> bool {
        model.pipelines().next().is_some()
    }

    fn emit(&self, model: &HandlerModel, options: &EffectiveOptions) -> Result<String, EmitError> {
        let mut w = SourceWriter::new();
        write_header(&mut w, options);
        w.open_block(&format!("namespace {}", options.namespace));
        write_doc_summary(
            &mut w,
            options,
            "Ordered pipeline behavior tables per dispatch scope.",
        );
        w.open_block("public static class PipelineRegistry");
        w.println(
            "public readonly record struct PipelineStep(global::System.Type BehaviorType, string MethodName, int Order);",
        );
        for (scope, field) in [
            (Scope::Requests, "RequestPipelines"),
            (Scope::Streams, "StreamPipelines"),
            (Scope::Notifications, "NotificationPipelines"),
        ] {
            emit_scope_table(&mut w, options, model, scope, field);
        }
        w.close_block();
        w.close_block();
        Ok(w.to_source())
    }
}

fn emit_scope_table(
    w: &mut SourceWriter,
    options: &EffectiveOptions,
    model: &HandlerModel,
    scope: Scope,
    field: &str,
) {
    let mut steps: Vec<(usize, &HandlerRecord)> = model
        .pipelines()
        .enumerate()
        .filter(|(_, p)| p.scope.unwrap_or(Scope::All).covers(scope))
        .collect();
    // Stable on declaration order for equal orders.
    steps.sort_by_key(|(index, p)| (p.order.unwrap_or(0), *index));

    w.blank();
    write_doc_summary(
        w,
        options,
        &format!("Pipelines participating in {} dispatch.", scope),
    );
    if steps.is_empty() {
        w.println(&format!(
            "public static readonly PipelineStep[] {} = global::System.Array.Empty<PipelineStep>();",
            field
        ));
        return;
    }
    w.open_block(&format!("public static readonly PipelineStep[] {} =", field));
    for (_, step) in &steps {
        w.println(&format!(
            "new PipelineStep(typeof({}), \"{}\", {}),",
            cs_type(&TypeRef::new(&step.declaring_type)),
            step.method_name,
            step.order.unwrap_or(0)
        ));
    }
    w.close_block_with(";");
}
