//! Optimized Dispatcher Emitter
//!
//! Emits the request dispatcher: a structural type switch keyed by
//! request-type identity, one specialized dispatch path per request type.
//! Static handlers are called directly; instance handlers resolve through
//! the injected service provider. When several handlers accept one
//! request type, selection runs over the handler name and an unknown name
//! throws at dispatch time.

use super::{
    cs_type, sanitize_type_name, write_doc_summary, write_header, EmitError, Emitter,
    SourceWriter, AGGRESSIVE_INLINING,
};
use crate::model::{HandlerKind, HandlerModel, HandlerRecord};
use crate::options::{EffectiveOptions, GenerationOptions};
use indexmap::IndexMap;

pub struct DispatcherEmitter;

impl Emitter for DispatcherEmitter {
    fn name(&self) -> &'static str {
        "OptimizedRequestDispatcher"
    }

    fn output_file(&self) -> &'static str {
        "OptimizedRequestDispatcher.g.cs"
    }

    fn priority(&self) -> u8 {
        30
    }

    fn is_enabled(&self, options: &GenerationOptions) -> bool {
        options.enable_optimized_dispatcher
    }

    fn can_emit(&self, model: &HandlerModel) -> bool {
        !model.handlers.is_empty()
    }

    fn emit(&self, model: &HandlerModel, options: &EffectiveOptions) -> Result<String, EmitError> {
        let typed = buckets_of(model, |h| {
            h.kind == HandlerKind::Request && h.response_type.is_some()
        });
        let void = buckets_of(model, |h| {
            h.kind == HandlerKind::Request && h.response_type.is_none()
        });
        let streams = buckets_of(model, |h| h.kind == HandlerKind::Stream);

        let mut w = SourceWriter::new();
        write_header(&mut w, options);
        w.println("using Microsoft.Extensions.DependencyInjection;");
        w.blank();
        w.open_block(&format!("namespace {}", options.namespace));
        write_doc_summary(
            &mut w,
            options,
            "Dispatches requests to their handlers through a compile-time type switch.",
        );
        w.open_block("public sealed class OptimizedRequestDispatcher : global::Relay.IRelay");
        w.println("private readonly global::System.IServiceProvider _services;");
        w.blank();
        w.open_block("public OptimizedRequestDispatcher(global::System.IServiceProvider services)");
        w.println("_services = services;");
        w.close_block();

        let name_param = if options.options.enable_nullable_context {
            "string?"
        } else {
            "string"
        };

        emit_send_typed(&mut w, options, &typed, name_param);
        emit_send_void(&mut w, options, &void, name_param);
        emit_create_stream(&mut w, options, &streams, name_param);

        for (request_type, bucket) in typed.iter().chain(void.iter()).chain(streams.iter()) {
            emit_dispatch_method(&mut w, options, request_type, bucket, name_param);
        }

        w.close_block();
        w.close_block();
        Ok(w.to_source())
    }
}

type Buckets<'m> = IndexMap<String, Vec<&'m HandlerRecord>>;

fn buckets_of(model: &HandlerModel, select: impl Fn(&HandlerRecord) -> bool) -> Buckets<'_> {
    let mut buckets: Buckets = IndexMap::new();
    for handler in model.handlers.iter().filter(|h| select(h)) {
        buckets
            .entry(handler.request_type.to_string())
            .or_default()
            .push(handler);
    }
    buckets
}

fn inlining(w: &mut SourceWriter, options: &EffectiveOptions) {
    if options.options.use_aggressive_inlining {
        w.println(AGGRESSIVE_INLINING);
    }
}

fn dispatch_method_name(request_type: &str) -> String {
    format!("Dispatch_{}", sanitize_type_name(request_type))
}

fn emit_send_typed(
    w: &mut SourceWriter,
    options: &EffectiveOptions,
    buckets: &Buckets,
    name_param: &str,
) {
    w.blank();
    inlining(w, options);
    w.open_block(
        "public global::System.Threading.Tasks.Task<TResponse> Send<TResponse>(global::Relay.IRequest<TResponse> request, global::System.Threading.CancellationToken cancellationToken = default)",
    );
    w.println("return Send(request, null, cancellationToken);");
    w.close_block();
    w.blank();
    inlining(w, options);
    w.open_block(&format!(
        "public global::System.Threading.Tasks.Task<TResponse> Send<TResponse>(global::Relay.IRequest<TResponse> request, {} name, global::System.Threading.CancellationToken cancellationToken = default)",
        name_param
    ));
    w.open_block("return request switch");
    for (request_type, bucket) in buckets {
        let arm_type = cs_type(&bucket[0].request_type);
        w.println(&format!(
            "{} typed => (global::System.Threading.Tasks.Task<TResponse>)(object){}(typed, name, cancellationToken),",
            arm_type,
            dispatch_method_name(request_type)
        ));
    }
    w.println(
        "_ => throw new global::System.InvalidOperationException($\"No handler is registered for request type {request.GetType()}.\"),",
    );
    w.close_block_with(";");
    w.close_block();
}

fn emit_send_void(
    w: &mut SourceWriter,
    options: &EffectiveOptions,
    buckets: &Buckets,
    name_param: &str,
) {
    w.blank();
    inlining(w, options);
    w.open_block(
        "public global::System.Threading.Tasks.Task Send(global::Relay.IRequest request, global::System.Threading.CancellationToken cancellationToken = default)",
    );
    w.println("return Send(request, null, cancellationToken);");
    w.close_block();
    w.blank();
    inlining(w, options);
    w.open_block(&format!(
        "public global::System.Threading.Tasks.Task Send(global::Relay.IRequest request, {} name, global::System.Threading.CancellationToken cancellationToken = default)",
        name_param
    ));
    w.open_block("return request switch");
    for (request_type, bucket) in buckets {
        let arm_type = cs_type(&bucket[0].request_type);
        w.println(&format!(
            "{} typed => {}(typed, name, cancellationToken),",
            arm_type,
            dispatch_method_name(request_type)
        ));
    }
    w.println(
        "_ => throw new global::System.InvalidOperationException($\"No handler is registered for request type {request.GetType()}.\"),",
    );
    w.close_block_with(";");
    w.close_block();
}

fn emit_create_stream(
    w: &mut SourceWriter,
    options: &EffectiveOptions,
    buckets: &Buckets,
    name_param: &str,
) {
    w.blank();
    inlining(w, options);
    w.open_block(
        "public global::System.Collections.Generic.IAsyncEnumerable<TResponse> CreateStream<TResponse>(global::Relay.IStreamRequest<TResponse> request, global::System.Threading.CancellationToken cancellationToken = default)",
    );
    w.println("return CreateStream(request, null, cancellationToken);");
    w.close_block();
    w.blank();
    inlining(w, options);
    w.open_block(&format!(
        "public global::System.Collections.Generic.IAsyncEnumerable<TResponse> CreateStream<TResponse>(global::Relay.IStreamRequest<TResponse> request, {} name, global::System.Threading.CancellationToken cancellationToken = default)",
        name_param
    ));
    w.open_block("return request switch");
    for (request_type, bucket) in buckets {
        let arm_type = cs_type(&bucket[0].request_type);
        w.println(&format!(
            "{} typed => (global::System.Collections.Generic.IAsyncEnumerable<TResponse>)(object){}(typed, name, cancellationToken),",
            arm_type,
            dispatch_method_name(request_type)
        ));
    }
    w.println(
        "_ => throw new global::System.InvalidOperationException($\"No stream handler is registered for request type {request.GetType()}.\"),",
    );
    w.close_block_with(";");
    w.close_block();
}

/// The handler invocation expression for one record.
fn invocation(record: &HandlerRecord, options: &EffectiveOptions) -> String {
    let declaring = cs_type(&relay_host::TypeRef::new(&record.declaring_type));
    if record.is_static {
        format!(
            "{}.{}(request, cancellationToken)",
            declaring, record.method_name
        )
    } else if options.options.enable_keyed_services && record.name.is_some() {
        format!(
            "_services.GetRequiredKeyedService<{}>(\"{}\").{}(request, cancellationToken)",
            declaring,
            record.name.as_deref().unwrap_or_default(),
            record.method_name
        )
    } else {
        format!(
            "_services.GetRequiredService<{}>().{}(request, cancellationToken)",
            declaring, record.method_name
        )
    }
}

fn emit_dispatch_method(
    w: &mut SourceWriter,
    options: &EffectiveOptions,
    request_type: &str,
    bucket: &[&HandlerRecord],
    name_param: &str,
) {
    let request_cs = cs_type(&bucket[0].request_type);
    let return_type = match (&bucket[0].kind, &bucket[0].response_type) {
        (HandlerKind::Stream, Some(resp)) => format!(
            "global::System.Collections.Generic.IAsyncEnumerable<{}>",
            cs_type(resp)
        ),
        (_, Some(resp)) => format!("global::System.Threading.Tasks.Task<{}>", cs_type(resp)),
        _ => "global::System.Threading.Tasks.Task".to_string(),
    };

    w.blank();
    inlining(w, options);
    w.open_block(&format!(
        "private {} {}({} request, {} name, global::System.Threading.CancellationToken cancellationToken)",
        return_type,
        dispatch_method_name(request_type),
        request_cs,
        name_param
    ));

    let unnamed: Vec<_> = bucket.iter().filter(|h| h.name.is_none()).collect();
    let named: Vec<_> = bucket.iter().filter(|h| h.name.is_some()).collect();

    if named.is_empty() && unnamed.len() == 1 {
        w.println(&format!("return {};", invocation(unnamed[0], options)));
    } else {
        w.open_block("return name switch");
        match unnamed.as_slice() {
            [] => {
                w.println(&format!(
                    "null or \"\" => throw new global::System.InvalidOperationException(\"No unnamed handler is registered for {}.\"),",
                    request_type
                ));
            }
            [only] => {
                w.println(&format!(
                    "null or \"\" => {},",
                    invocation(only, options)
                ));
            }
            many => {
                let competitors: Vec<String> =
                    many.iter().map(|h| h.display_name()).collect();
                w.println(&format!(
                    "null or \"\" => throw new global::System.InvalidOperationException(\"Ambiguous handlers for {}: {}.\"),",
                    request_type,
                    competitors.join(", ")
                ));
            }
        }
        for record in &named {
            w.println(&format!(
                "\"{}\" => {},",
                record.name.as_deref().unwrap_or_default(),
                invocation(record, options)
            ));
        }
        w.println(&format!(
            "_ => throw new global::System.InvalidOperationException($\"No handler named '{{name}}' is registered for {}.\"),",
            request_type
        ));
        w.close_block_with(";");
    }
    w.close_block();
}
