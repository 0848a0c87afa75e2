//! Handler Registry Emitter
//!
//! Emits the minimal reflective registry: one descriptor per handler
//! record plus one per structural interface implementation. The registry
//! is the safety net the runtime falls back to when a specialized
//! dispatch path is unavailable.

use super::{cs_type, write_doc_summary, write_header, EmitError, Emitter, SourceWriter};
use crate::model::{HandlerKind, HandlerModel, InterfaceKind};
use crate::options::{EffectiveOptions, GenerationOptions};
use relay_host::TypeRef;

pub struct HandlerRegistryEmitter;

impl Emitter for HandlerRegistryEmitter {
    fn name(&self) -> &'static str {
        "HandlerRegistry"
    }

    fn output_file(&self) -> &'static str {
        "HandlerRegistry.g.cs"
    }

    fn priority(&self) -> u8 {
        20
    }

    fn is_enabled(&self, options: &GenerationOptions) -> bool {
        options.enable_handler_registry
    }

    fn can_emit(&self, _model: &HandlerModel) -> bool {
        true
    }

    fn emit(&self, model: &HandlerModel, options: &EffectiveOptions) -> Result<String, EmitError> {
        let mut w = SourceWriter::new();
        write_header(&mut w, options);
        w.open_block(&format!("namespace {}", options.namespace));
        write_doc_summary(
            &mut w,
            options,
            "Reflective registry of every discovered handler.",
        );
        w.open_block("public static class HandlerRegistry");
        w.println(
            "public readonly record struct HandlerDescriptor(string Kind, global::System.Type RequestType, global::System.Type HandlerType, string MethodName, string Name, bool IsStatic);",
        );
        w.blank();
        if model.handlers.is_empty() && model.interface_impls.is_empty() {
            w.println(
                "public static readonly HandlerDescriptor[] Handlers = global::System.Array.Empty<HandlerDescriptor>();",
            );
        } else {
            w.open_block("public static readonly HandlerDescriptor[] Handlers =");
            for handler in &model.handlers {
                w.println(&format!(
                    "new HandlerDescriptor(\"{}\", typeof({}), typeof({}), \"{}\", \"{}\", {}),",
                    kind_name(handler.kind),
                    cs_type(&handler.request_type),
                    cs_type(&TypeRef::new(&handler.declaring_type)),
                    handler.method_name,
                    handler.name.as_deref().unwrap_or_default(),
                    handler.is_static
                ));
            }
            for implementation in &model.interface_impls {
                w.println(&format!(
                    "new HandlerDescriptor(\"{}\", typeof({}), typeof({}), \"Handle\", \"\", false),",
                    interface_kind_name(implementation.interface_kind),
                    cs_type(&implementation.request_type),
                    cs_type(&TypeRef::new(&implementation.implementing_type))
                ));
            }
            w.close_block_with(";");
        }
        w.close_block();
        w.close_block();
        Ok(w.to_source())
    }
}

fn kind_name(kind: HandlerKind) -> &'static str {
    match kind {
        HandlerKind::Request => "Request",
        HandlerKind::Stream => "Stream",
        HandlerKind::Notification => "Notification",
        HandlerKind::Pipeline => "Pipeline",
        HandlerKind::Endpoint => "Endpoint",
    }
}

fn interface_kind_name(kind: InterfaceKind) -> &'static str {
    match kind {
        InterfaceKind::Request => "Request",
        InterfaceKind::Notification => "Notification",
        InterfaceKind::Stream => "Stream",
    }
}
