//! Shared fixtures for the generator specs.
#![allow(dead_code)]

use relay_generator::{
    scan_classes, scan_tree, Diagnostic, DiagnosticSink, DiscoveryEngine, EffectiveOptions,
    GenerationOptions, HandlerKind, HandlerModel, HandlerRecord, Scope, SemanticContext,
};
use relay_host::{
    Accessibility, AttributeDecl, CancellationToken, ClassDecl, Compilation, CompilationBuilder,
    MethodDecl, ParsedTree, SourceLocation, TypeRef,
};
use std::sync::Arc;

/// A request handler method in the conventional shape:
/// `Task<string> HandleAsync(Orders.CreateOrder, CancellationToken)`.
pub fn handle_async(request_type: &str) -> MethodDecl {
    MethodDecl::new("HandleAsync")
        .with_attribute(AttributeDecl::new("Handle"))
        .with_param("request", request_type)
        .with_cancellation_param()
        .with_return("Task<string>")
}

pub fn handler_class(namespace: &str, name: &str, method: MethodDecl) -> ClassDecl {
    ClassDecl::new(namespace, name).with_method(method)
}

/// One tree, one class, one valid request handler, runtime referenced.
pub fn single_handler_compilation() -> Arc<Compilation> {
    Arc::new(
        CompilationBuilder::new()
            .with_reference("Relay")
            .with_tree(ParsedTree::new("handlers.cs").with_class(handler_class(
                "Orders",
                "CreateOrderHandler",
                handle_async("Orders.CreateOrder"),
            )))
            .with_request_type("Orders.CreateOrder", "string")
            .build(),
    )
}

pub fn context_of(compilation: Arc<Compilation>) -> SemanticContext {
    SemanticContext::new(compilation, CancellationToken::new())
}

pub fn context_with_token(
    compilation: Arc<Compilation>,
    token: CancellationToken,
) -> SemanticContext {
    SemanticContext::new(compilation, token)
}

pub fn default_effective() -> EffectiveOptions {
    EffectiveOptions::defaults()
}

/// Effective options with parallelism forced to 1, for strictly
/// sequential discovery in tests that care about strategy.
pub fn sequential_effective() -> EffectiveOptions {
    let sink = DiagnosticSink::new();
    GenerationOptions {
        max_degree_of_parallelism: 1,
        ..GenerationOptions::default()
    }
    .validate(&sink)
}

pub fn parallel_effective(parallelism: i32) -> EffectiveOptions {
    let sink = DiagnosticSink::new();
    GenerationOptions {
        max_degree_of_parallelism: parallelism,
        ..GenerationOptions::default()
    }
    .validate(&sink)
}

/// A handler record in the conventional request shape, for emitter tests
/// that build models by hand.
pub fn request_record(declaring_type: &str, request_type: &str, response: &str) -> HandlerRecord {
    HandlerRecord {
        kind: HandlerKind::Request,
        declaring_type: declaring_type.to_string(),
        method_name: "HandleAsync".to_string(),
        request_type: TypeRef::parse(request_type),
        response_type: Some(TypeRef::parse(response)),
        name: None,
        priority: 0,
        order: None,
        scope: None,
        route: None,
        location: SourceLocation::new("handlers.cs", 1, 1),
        is_static: false,
        accessibility: Accessibility::Public,
    }
}

pub fn notification_record(declaring_type: &str, notification_type: &str) -> HandlerRecord {
    HandlerRecord {
        kind: HandlerKind::Notification,
        response_type: None,
        request_type: TypeRef::parse(notification_type),
        method_name: "HandleNotificationAsync".to_string(),
        ..request_record(declaring_type, notification_type, "void")
    }
}

pub fn pipeline_record(declaring_type: &str, order: i32, scope: Scope) -> HandlerRecord {
    HandlerRecord {
        kind: HandlerKind::Pipeline,
        order: Some(order),
        scope: Some(scope),
        response_type: None,
        method_name: "InvokeAsync".to_string(),
        ..request_record(declaring_type, "App.AnyRequest", "void")
    }
}

pub fn endpoint_record(declaring_type: &str, request_type: &str, route: Option<&str>) -> HandlerRecord {
    HandlerRecord {
        kind: HandlerKind::Endpoint,
        route: route.map(str::to_string),
        response_type: None,
        ..request_record(declaring_type, request_type, "void")
    }
}

pub fn model_of(handlers: Vec<HandlerRecord>) -> HandlerModel {
    HandlerModel {
        handlers,
        interface_impls: Vec::new(),
    }
}

/// Scan every tree and run discovery, returning the frozen model and the
/// diagnostics it reported.
pub fn discover(
    compilation: Arc<Compilation>,
    effective: &EffectiveOptions,
) -> (HandlerModel, Vec<Diagnostic>) {
    let token = CancellationToken::new();
    let context = SemanticContext::new(compilation, token.clone());
    let mut candidates = Vec::new();
    let mut candidate_classes = Vec::new();
    for (tree_index, tree) in context.compilation().trees().iter().enumerate() {
        candidates.extend(scan_tree(tree, tree_index, &token).unwrap());
        candidate_classes.extend(scan_classes(tree, tree_index, &token).unwrap());
    }
    let sink = DiagnosticSink::new();
    let engine = DiscoveryEngine::new(&context);
    let model = engine
        .discover(&candidates, &candidate_classes, effective, &sink)
        .unwrap();
    (model, sink.snapshot())
}
