//! Endpoint Metadata Emitter
//!
//! Emits the static route table for handlers exposed as endpoints:
//! `(route, request type, handler method)` triples. Endpoints without an
//! explicit route get one derived from the request type name.

use super::{cs_type, write_doc_summary, write_header, EmitError, Emitter, SourceWriter};
use crate::model::{HandlerModel, HandlerRecord};
use crate::options::{EffectiveOptions, GenerationOptions};

pub struct EndpointMetadataEmitter;

impl Emitter for EndpointMetadataEmitter {
    fn name(&self) -> &'static str {
        "EndpointMetadata"
    }

    fn output_file(&self) -> &'static str {
        "EndpointMetadata.g.cs"
    }

    fn priority(&self) -> u8 {
        60
    }

    fn is_enabled(&self, options: &GenerationOptions) -> bool {
        options.enable_endpoint_metadata
    }

    fn can_emit(&self, model: &HandlerModel) -> bool {
        model.endpoints().next().is_some()
    }

    fn emit(&self, model: &HandlerModel, options: &EffectiveOptions) -> Result<String, EmitError> {
        let mut w = SourceWriter::new();
        write_header(&mut w, options);
        w.open_block(&format!("namespace {}", options.namespace));
        write_doc_summary(&mut w, options, "Route metadata for exposed endpoints.");
        w.open_block("public static class EndpointMetadata");
        w.println(
            "public readonly record struct EndpointDescriptor(string Route, global::System.Type RequestType, string HandlerMethod);",
        );
        w.blank();
        w.open_block("public static readonly EndpointDescriptor[] Endpoints =");
        for endpoint in model.endpoints() {
            w.println(&format!(
                "new EndpointDescriptor(\"{}\", typeof({}), \"{}\"),",
                route_of(endpoint),
                cs_type(&endpoint.request_type),
                endpoint.display_name()
            ));
        }
        w.close_block_with(";");
        w.close_block();
        w.close_block();
        Ok(w.to_source())
    }
}

fn route_of(endpoint: &HandlerRecord) -> String {
    match &endpoint.route {
        Some(route) => route.clone(),
        None => format!("/{}", endpoint.request_type.short_name().to_lowercase()),
    }
}
