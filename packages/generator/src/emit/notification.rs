//! Notification Dispatcher Emitter
//!
//! Emits the fan-out dispatcher: one publish overload per notification
//! type, starting every handler as an independent task and awaiting them
//! all. Observation order across handlers is unspecified.

use super::{cs_type, write_doc_summary, write_header, EmitError, Emitter, SourceWriter};
use crate::model::{HandlerModel, HandlerRecord};
use crate::options::{EffectiveOptions, GenerationOptions};
use indexmap::IndexMap;
use relay_host::TypeRef;

pub struct NotificationDispatcherEmitter;

impl Emitter for NotificationDispatcherEmitter {
    fn name(&self) -> &'static str {
        "NotificationDispatcher"
    }

    fn output_file(&self) -> &'static str {
        "NotificationDispatcher.g.cs"
    }

    fn priority(&self) -> u8 {
        40
    }

    fn is_enabled(&self, options: &GenerationOptions) -> bool {
        options.enable_notification_dispatcher
    }

    fn can_emit(&self, model: &HandlerModel) -> bool {
        model.notification_handlers().next().is_some()
    }

    fn emit(&self, model: &HandlerModel, options: &EffectiveOptions) -> Result<String, EmitError> {
        let mut buckets: IndexMap<String, Vec<&HandlerRecord>> = IndexMap::new();
        for handler in model.notification_handlers() {
            buckets
                .entry(handler.request_type.to_string())
                .or_default()
                .push(handler);
        }

        let mut w = SourceWriter::new();
        write_header(&mut w, options);
        w.println("using Microsoft.Extensions.DependencyInjection;");
        w.blank();
        w.open_block(&format!("namespace {}", options.namespace));
        write_doc_summary(
            &mut w,
            options,
            "Publishes notifications to every registered handler concurrently.",
        );
        w.open_block("public static class NotificationDispatcher");
        for bucket in buckets.values() {
            emit_publish(&mut w, options, bucket);
        }
        w.close_block();
        w.close_block();
        Ok(w.to_source())
    }
}

fn emit_publish(w: &mut SourceWriter, options: &EffectiveOptions, bucket: &[&HandlerRecord]) {
    let notification_cs = cs_type(&bucket[0].request_type);
    w.blank();
    write_doc_summary(
        w,
        options,
        &format!("Dispatches {} to all of its handlers.", bucket[0].request_type),
    );
    w.open_block(&format!(
        "public static global::System.Threading.Tasks.Task PublishAsync({} notification, global::System.IServiceProvider services, global::System.Threading.CancellationToken cancellationToken = default)",
        notification_cs
    ));
    w.println(&format!(
        "var tasks = new global::System.Threading.Tasks.Task[{}];",
        bucket.len()
    ));
    for (index, record) in bucket.iter().enumerate() {
        let declaring = cs_type(&TypeRef::new(&record.declaring_type));
        let call = if record.is_static {
            format!(
                "{}.{}(notification, cancellationToken)",
                declaring, record.method_name
            )
        } else {
            format!(
                "services.GetRequiredService<{}>().{}(notification, cancellationToken)",
                declaring, record.method_name
            )
        };
        w.println(&format!("tasks[{}] = {};", index, call));
    }
    w.println("return global::System.Threading.Tasks.Task.WhenAll(tasks);");
    w.close_block();
}
