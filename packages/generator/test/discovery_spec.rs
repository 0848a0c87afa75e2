//! Discovery Engine Tests
//!
//! Classification, attribute extraction, duplicate detection, fault
//! isolation and strategy equivalence.

mod support;

use relay_generator::{HandlerKind, Scope};
use relay_host::{
    Accessibility, AttributeDecl, ClassDecl, CompilationBuilder, MethodDecl, ParsedTree,
};
use std::sync::Arc;
use support::{
    default_effective, discover, handle_async, handler_class, parallel_effective,
    sequential_effective, single_handler_compilation,
};

#[test]
fn should_discover_a_single_request_handler() {
    let (model, diagnostics) = discover(single_handler_compilation(), &default_effective());
    assert_eq!(model.handlers.len(), 1);
    let record = &model.handlers[0];
    assert_eq!(record.kind, HandlerKind::Request);
    assert_eq!(record.declaring_type, "Orders.CreateOrderHandler");
    assert_eq!(record.method_name, "HandleAsync");
    assert_eq!(record.request_type.name, "Orders.CreateOrder");
    assert_eq!(record.response_type.as_ref().unwrap().name, "string");
    assert_eq!(record.name, None);
    assert_eq!(record.priority, 0);
    assert!(!record.is_static);
    assert!(diagnostics.is_empty());
}

#[test]
fn should_classify_a_lazy_sequence_return_as_stream() {
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(ParsedTree::new("stream.cs").with_class(handler_class(
                "Search",
                "QueryHandler",
                MethodDecl::new("StreamAsync")
                    .with_attribute(AttributeDecl::new("Handle"))
                    .with_param("request", "Search.Query")
                    .with_cancellation_param()
                    .with_return("IAsyncEnumerable<Search.Row>"),
            )))
            .with_stream_request_type("Search.Query", "Search.Row")
            .build(),
    );
    let (model, diagnostics) = discover(compilation, &default_effective());
    assert_eq!(model.handlers.len(), 1);
    assert_eq!(model.handlers[0].kind, HandlerKind::Stream);
    assert_eq!(
        model.handlers[0].response_type.as_ref().unwrap().name,
        "Search.Row"
    );
    assert!(diagnostics.is_empty());
}

#[test]
fn should_classify_notification_handlers() {
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(ParsedTree::new("events.cs").with_class(handler_class(
                "Events",
                "Auditor",
                MethodDecl::new("OnOrderCreated")
                    .with_attribute(AttributeDecl::new("Notification"))
                    .with_param("notification", "Events.OrderCreated")
                    .with_cancellation_param()
                    .with_return("Task"),
            )))
            .with_notification_type("Events.OrderCreated")
            .build(),
    );
    let (model, diagnostics) = discover(compilation, &default_effective());
    assert_eq!(model.handlers.len(), 1);
    let record = &model.handlers[0];
    assert_eq!(record.kind, HandlerKind::Notification);
    assert!(record.response_type.is_none());
    assert!(diagnostics.is_empty());
}

#[test]
fn should_extract_pipeline_order_and_scope() {
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(ParsedTree::new("pipeline.cs").with_class(handler_class(
                "App",
                "Logging",
                MethodDecl::new("InvokeAsync")
                    .with_attribute(
                        AttributeDecl::new("Pipeline")
                            .with_arg_int("order", -5)
                            .with_arg_ident("scope", "Requests"),
                    )
                    .with_param("request", "App.AnyRequest")
                    .with_param("next", "RequestHandlerDelegate<string>")
                    .with_cancellation_param()
                    .with_return("Task<string>"),
            )))
            .build(),
    );
    let (model, diagnostics) = discover(compilation, &default_effective());
    assert_eq!(model.handlers.len(), 1);
    let record = &model.handlers[0];
    assert_eq!(record.kind, HandlerKind::Pipeline);
    assert_eq!(record.order, Some(-5));
    assert_eq!(record.scope, Some(Scope::Requests));
    assert!(diagnostics.is_empty());
}

#[test]
fn should_produce_one_record_per_marker() {
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(ParsedTree::new("dual.cs").with_class(handler_class(
                "Orders",
                "CreateOrderHandler",
                MethodDecl::new("HandleAsync")
                    .with_attribute(AttributeDecl::new("Handle"))
                    .with_attribute(
                        AttributeDecl::new("ExposeAsEndpoint").with_arg_str("route", "/orders"),
                    )
                    .with_param("request", "Orders.CreateOrder")
                    .with_cancellation_param()
                    .with_return("Task<string>"),
            )))
            .with_request_type("Orders.CreateOrder", "string")
            .build(),
    );
    let (model, _) = discover(compilation, &default_effective());
    assert_eq!(model.handlers.len(), 2);
    assert_eq!(model.handlers[0].kind, HandlerKind::Request);
    assert_eq!(model.handlers[1].kind, HandlerKind::Endpoint);
    assert_eq!(model.handlers[1].route.as_deref(), Some("/orders"));
}

#[test]
fn should_treat_blank_names_as_absent() {
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(ParsedTree::new("named.cs").with_class(handler_class(
                "Orders",
                "CreateOrderHandler",
                MethodDecl::new("HandleAsync")
                    .with_attribute(AttributeDecl::new("Handle").with_arg_str("name", "   "))
                    .with_param("request", "Orders.CreateOrder")
                    .with_cancellation_param()
                    .with_return("Task<string>"),
            )))
            .with_request_type("Orders.CreateOrder", "string")
            .build(),
    );
    let (model, _) = discover(compilation, &default_effective());
    assert_eq!(model.handlers[0].name, None);
}

#[test]
fn should_reject_non_integer_priority_literals() {
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(ParsedTree::new("named.cs").with_class(handler_class(
                "Orders",
                "CreateOrderHandler",
                MethodDecl::new("HandleAsync")
                    .with_attribute(AttributeDecl::new("Handle").with_arg_str("priority", "high"))
                    .with_param("request", "Orders.CreateOrder")
                    .with_cancellation_param()
                    .with_return("Task<string>"),
            )))
            .with_request_type("Orders.CreateOrder", "string")
            .build(),
    );
    let (model, diagnostics) = discover(compilation, &default_effective());
    assert_eq!(model.handlers[0].priority, 0);
    assert!(diagnostics
        .iter()
        .any(|d| d.id == "RELAY_GEN_InvalidPriority"));
}

#[test]
fn should_reject_unknown_scopes() {
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(ParsedTree::new("pipe.cs").with_class(handler_class(
                "App",
                "Behavior",
                MethodDecl::new("InvokeAsync")
                    .with_attribute(AttributeDecl::new("Pipeline").with_arg_ident("scope", "Everything"))
                    .with_param("request", "App.AnyRequest")
                    .with_param("next", "RequestHandlerDelegate<string>")
                    .with_cancellation_param()
                    .with_return("Task<string>"),
            )))
            .build(),
    );
    let (model, diagnostics) = discover(compilation, &default_effective());
    assert!(diagnostics.iter().any(|d| d.id == "RELAY_GEN_InvalidScope"));
    // The record survives with the default scope.
    assert_eq!(model.handlers[0].scope, Some(Scope::All));
}

#[test]
fn should_report_each_unnamed_duplicate() {
    // A bucket of two unnamed handlers yields two 003 diagnostics.
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(
                ParsedTree::new("dup.cs")
                    .with_class(handler_class(
                        "Orders",
                        "FirstHandler",
                        handle_async("Orders.CreateOrder"),
                    ))
                    .with_class(handler_class(
                        "Orders",
                        "SecondHandler",
                        handle_async("Orders.CreateOrder"),
                    )),
            )
            .with_request_type("Orders.CreateOrder", "string")
            .build(),
    );
    let (model, diagnostics) = discover(compilation, &default_effective());
    assert_eq!(model.handlers.len(), 2);
    assert_eq!(
        diagnostics
            .iter()
            .filter(|d| d.id == "RELAY_GEN_003")
            .count(),
        2
    );
}

#[test]
fn should_report_named_conflicts_with_their_own_code() {
    let named = |class: &str| {
        handler_class(
            "Orders",
            class,
            MethodDecl::new("HandleAsync")
                .with_attribute(AttributeDecl::new("Handle").with_arg_str("name", "primary"))
                .with_param("request", "Orders.CreateOrder")
                .with_cancellation_param()
                .with_return("Task<string>"),
        )
    };
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(
                ParsedTree::new("dup.cs")
                    .with_class(named("FirstHandler"))
                    .with_class(named("SecondHandler")),
            )
            .with_request_type("Orders.CreateOrder", "string")
            .build(),
    );
    let (_, diagnostics) = discover(compilation, &default_effective());
    assert_eq!(
        diagnostics
            .iter()
            .filter(|d| d.id == "RELAY_GEN_005")
            .count(),
        2
    );
}

#[test]
fn should_allow_distinctly_named_handlers_for_one_request() {
    let named = |class: &str, name: &str| {
        handler_class(
            "Orders",
            class,
            MethodDecl::new("HandleAsync")
                .with_attribute(AttributeDecl::new("Handle").with_arg_str("name", name))
                .with_param("request", "Orders.CreateOrder")
                .with_cancellation_param()
                .with_return("Task<string>"),
        )
    };
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(
                ParsedTree::new("named.cs")
                    .with_class(named("FirstHandler", "primary"))
                    .with_class(named("SecondHandler", "audit")),
            )
            .with_request_type("Orders.CreateOrder", "string")
            .build(),
    );
    let (model, diagnostics) = discover(compilation, &default_effective());
    assert_eq!(model.handlers.len(), 2);
    assert!(diagnostics.is_empty());
}

fn pipeline_method(order: i64, scope: &str) -> MethodDecl {
    MethodDecl::new(format!("Invoke{}{}", scope, order.unsigned_abs()))
        .with_attribute(
            AttributeDecl::new("Pipeline")
                .with_arg_int("order", order)
                .with_arg_ident("scope", scope),
        )
        .with_param("request", "App.AnyRequest")
        .with_param("next", "RequestHandlerDelegate<string>")
        .with_cancellation_param()
        .with_return("Task<string>")
}

#[test]
fn should_report_pipeline_order_collisions_within_a_scope() {
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(ParsedTree::new("pipes.cs").with_class(
                ClassDecl::new("App", "Behaviors")
                    .with_method(pipeline_method(1, "Requests"))
                    .with_method(
                        pipeline_method(1, "Requests").with_static(false),
                    ),
            ))
            .build(),
    );
    let (_, diagnostics) = discover(compilation, &default_effective());
    assert_eq!(
        diagnostics
            .iter()
            .filter(|d| d.id == "RELAY_GEN_DuplicatePipelineOrder")
            .count(),
        2
    );
}

#[test]
fn should_allow_equal_orders_in_distinct_scopes() {
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(ParsedTree::new("pipes.cs").with_class(
                ClassDecl::new("App", "Behaviors")
                    .with_method(pipeline_method(1, "Requests"))
                    .with_method(pipeline_method(1, "Notifications")),
            ))
            .build(),
    );
    let (_, diagnostics) = discover(compilation, &default_effective());
    assert!(!diagnostics
        .iter()
        .any(|d| d.id == "RELAY_GEN_DuplicatePipelineOrder"));
}

#[test]
fn should_isolate_a_failing_candidate_and_continue() {
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(
                ParsedTree::new("mixed.cs")
                    .with_class(handler_class(
                        "Orders",
                        "BrokenHandler",
                        handle_async("Orders.CreateOrder"),
                    ))
                    .with_class(handler_class(
                        "Orders",
                        "WorkingHandler",
                        MethodDecl::new("HandleAsync")
                            .with_attribute(AttributeDecl::new("Handle"))
                            .with_param("request", "Orders.CancelOrder")
                            .with_cancellation_param()
                            .with_return("Task<string>"),
                    )),
            )
            .with_request_type("Orders.CreateOrder", "string")
            .with_request_type("Orders.CancelOrder", "string")
            .with_poisoned_method("Orders.BrokenHandler", "HandleAsync")
            .build(),
    );
    let (model, diagnostics) = discover(compilation, &default_effective());
    assert_eq!(model.handlers.len(), 1);
    assert_eq!(model.handlers[0].declaring_type, "Orders.WorkingHandler");
    assert_eq!(
        diagnostics
            .iter()
            .filter(|d| d.id == "RELAY_GEN_001")
            .count(),
        1
    );
}

#[test]
fn should_drop_records_whose_first_parameter_is_not_a_request() {
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(ParsedTree::new("bad.cs").with_class(handler_class(
                "Orders",
                "StringHandler",
                MethodDecl::new("HandleAsync")
                    .with_attribute(AttributeDecl::new("Handle"))
                    .with_param("request", "string")
                    .with_cancellation_param()
                    .with_return("Task<string>"),
            )))
            .build(),
    );
    let (model, diagnostics) = discover(compilation, &default_effective());
    assert!(model.handlers.is_empty());
    assert_eq!(
        diagnostics
            .iter()
            .filter(|d| d.id == "RELAY_GEN_206")
            .count(),
        1
    );
}

#[test]
fn should_report_a_missing_runtime_reference() {
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_tree(ParsedTree::new("handlers.cs").with_class(handler_class(
                "Orders",
                "CreateOrderHandler",
                handle_async("Orders.CreateOrder"),
            )))
            .with_request_type("Orders.CreateOrder", "string")
            .build(),
    );
    let (_, diagnostics) = discover(compilation, &default_effective());
    assert!(diagnostics.iter().any(|d| d.id == "RELAY_GEN_004"));
}

#[test]
fn should_report_no_handlers_when_the_runtime_is_referenced() {
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(ParsedTree::new("empty.cs"))
            .build(),
    );
    let (model, diagnostics) = discover(compilation, &default_effective());
    assert!(model.handlers.is_empty());
    assert!(diagnostics.iter().any(|d| d.id == "RELAY_GEN_NoHandlers"));
}

#[test]
fn should_warn_on_wide_handler_constructors() {
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(
                ParsedTree::new("wide.cs").with_class(
                    handler_class(
                        "Orders",
                        "WideHandler",
                        handle_async("Orders.CreateOrder"),
                    )
                    .with_ctor_params(11),
                ),
            )
            .with_request_type("Orders.CreateOrder", "string")
            .build(),
    );
    let (_, diagnostics) = discover(compilation, &default_effective());
    assert!(diagnostics.iter().any(|d| d.id == "RELAY_GEN_109"));
}

#[test]
fn should_record_interface_implementations() {
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(ParsedTree::new("impls.cs").with_class(
                ClassDecl::new("Orders", "StructuralHandler")
                    .with_base("Relay.IRequestHandler<Orders.CreateOrder, string>"),
            ))
            .build(),
    );
    let (model, _) = discover(compilation, &default_effective());
    assert_eq!(model.interface_impls.len(), 1);
    let implementation = &model.interface_impls[0];
    assert_eq!(implementation.implementing_type, "Orders.StructuralHandler");
    assert_eq!(implementation.request_type.name, "Orders.CreateOrder");
    assert_eq!(implementation.response_type.as_ref().unwrap().name, "string");
}

fn many_handlers_compilation() -> Arc<relay_host::Compilation> {
    let mut builder = CompilationBuilder::new().with_reference("Relay");
    let mut tree = ParsedTree::new("many.cs");
    for i in 0..24 {
        let request = format!("App.Request{}", i);
        tree = tree.with_class(handler_class(
            "App",
            &format!("Handler{}", i),
            handle_async(&request),
        ));
        builder = builder.with_request_type(&request, "string");
    }
    Arc::new(builder.with_tree(tree).build())
}

#[test]
fn should_produce_the_same_model_sequentially_and_in_parallel() {
    let (sequential_model, sequential_diags) =
        discover(many_handlers_compilation(), &sequential_effective());
    let (parallel_model, parallel_diags) =
        discover(many_handlers_compilation(), &parallel_effective(8));
    assert_eq!(sequential_model, parallel_model);
    assert_eq!(sequential_diags, parallel_diags);
    assert_eq!(parallel_model.handlers.len(), 24);
}

#[test]
fn should_keep_discovery_order_deterministic_in_parallel_runs() {
    let (first, _) = discover(many_handlers_compilation(), &parallel_effective(8));
    let (second, _) = discover(many_handlers_compilation(), &parallel_effective(8));
    assert_eq!(first, second);
}

#[test]
fn should_keep_static_handlers_static_in_the_model() {
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(ParsedTree::new("static.cs").with_class(handler_class(
                "Orders",
                "StaticHandler",
                handle_async("Orders.CreateOrder").with_static(true),
            )))
            .with_request_type("Orders.CreateOrder", "string")
            .build(),
    );
    let (model, _) = discover(compilation, &default_effective());
    assert!(model.handlers[0].is_static);
}

#[test]
fn should_reject_private_handlers() {
    let compilation = Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(ParsedTree::new("private.cs").with_class(handler_class(
                "Orders",
                "HiddenHandler",
                handle_async("Orders.CreateOrder").with_accessibility(Accessibility::Private),
            )))
            .with_request_type("Orders.CreateOrder", "string")
            .build(),
    );
    let (model, diagnostics) = discover(compilation, &default_effective());
    assert!(model.handlers.is_empty());
    assert!(diagnostics.iter().any(|d| d.id == "RELAY_GEN_106"));
}
