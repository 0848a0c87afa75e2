//! DI Registration Emitter
//!
//! Emits the service-collection extension that registers the root
//! dispatcher as a singleton and every discovered handler type as scoped.
//! Always applicable: the base registration compiles even for an empty
//! model.

use super::{cs_type, write_doc_summary, write_header, EmitError, Emitter, SourceWriter};
use crate::model::{HandlerModel, HandlerRecord};
use crate::options::{EffectiveOptions, GenerationOptions};
use relay_host::TypeRef;

pub struct RegistrationEmitter;

impl Emitter for RegistrationEmitter {
    fn name(&self) -> &'static str {
        "RelayRegistration"
    }

    fn output_file(&self) -> &'static str {
        "RelayRegistration.g.cs"
    }

    fn priority(&self) -> u8 {
        10
    }

    fn is_enabled(&self, options: &GenerationOptions) -> bool {
        options.enable_di
    }

    fn can_emit(&self, _model: &HandlerModel) -> bool {
        true
    }

    fn emit(&self, model: &HandlerModel, options: &EffectiveOptions) -> Result<String, EmitError> {
        let mut w = SourceWriter::new();
        write_header(&mut w, options);
        w.println("using Microsoft.Extensions.DependencyInjection;");
        w.blank();
        w.open_block(&format!("namespace {}", options.namespace));
        write_doc_summary(
            &mut w,
            options,
            "Registers the Relay dispatcher and all discovered handlers.",
        );
        w.open_block("public static class RelayRegistration");
        write_doc_summary(
            &mut w,
            options,
            "Adds the generated dispatcher singleton and scoped handler registrations.",
        );
        w.open_block(
            "public static IServiceCollection AddRelayGenerated(this IServiceCollection services)",
        );
        if options.options.include_debug_info {
            w.println(&format!(
                "// {} handler(s) across {} type(s).",
                model.handlers.len(),
                model.handler_types().len()
            ));
        }
        w.println(
            "services.AddSingleton<global::Relay.IRelay, OptimizedRequestDispatcher>();",
        );

        for type_fqn in model.handler_types() {
            if instance_records(model, type_fqn).next().is_none() {
                // Static-only handler types need no service registration.
                continue;
            }
            let ty = cs_type(&TypeRef::new(type_fqn));
            w.println(&format!("services.AddScoped<{}>();", ty));
            if options.options.enable_keyed_services {
                for record in instance_records(model, type_fqn) {
                    if let Some(name) = &record.name {
                        w.println(&format!(
                            "services.AddKeyedScoped<{}>(\"{}\");",
                            ty, name
                        ));
                    }
                }
            }
        }
        w.println("return services;");
        w.close_block();
        w.close_block();
        w.close_block();
        Ok(w.to_source())
    }
}

fn instance_records<'m>(
    model: &'m HandlerModel,
    type_fqn: &'m str,
) -> impl Iterator<Item = &'m HandlerRecord> {
    model
        .handlers
        .iter()
        .filter(move |h| h.declaring_type == type_fqn && !h.is_static)
}
