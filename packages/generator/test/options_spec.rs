//! Generation Options Tests
//!
//! Defaults, key/value intake, clamping and conflict detection.

use relay_generator::{DiagnosticSink, GenerationOptions};
use std::collections::HashMap;

#[test]
fn should_default_to_everything_enabled() {
    let options = GenerationOptions::default();
    assert_eq!(options.max_degree_of_parallelism, 4);
    assert_eq!(options.assembly_name, "Relay.Generated");
    assert!(options.custom_namespace.is_none());
    assert!(options.enable_di);
    assert!(options.enable_handler_registry);
    assert!(options.enable_optimized_dispatcher);
    assert!(options.enable_notification_dispatcher);
    assert!(options.enable_pipeline_registry);
    assert!(options.enable_endpoint_metadata);
    assert!(!options.include_debug_info);
    assert!(options.include_documentation);
    assert!(options.enable_nullable_context);
    assert!(options.use_aggressive_inlining);
    assert!(options.enable_keyed_services);
}

#[test]
fn should_accept_in_range_parallelism_without_diagnostics() {
    let sink = DiagnosticSink::new();
    let effective = GenerationOptions {
        max_degree_of_parallelism: 16,
        ..GenerationOptions::default()
    }
    .validate(&sink);
    assert_eq!(effective.parallelism, 16);
    assert!(sink.is_empty());
}

#[test]
fn should_clamp_excessive_parallelism_and_report() {
    // Out-of-range parallelism is clamped and diagnosed.
    let sink = DiagnosticSink::new();
    let effective = GenerationOptions {
        max_degree_of_parallelism: 100,
        ..GenerationOptions::default()
    }
    .validate(&sink);
    assert_eq!(effective.parallelism, 64);
    assert_eq!(sink.count_of("RELAY_GEN_ConfigConflict"), 1);
}

#[test]
fn should_clamp_zero_parallelism_to_sequential() {
    let sink = DiagnosticSink::new();
    let effective = GenerationOptions {
        max_degree_of_parallelism: 0,
        ..GenerationOptions::default()
    }
    .validate(&sink);
    assert_eq!(effective.parallelism, 1);
    assert_eq!(sink.count_of("RELAY_GEN_ConfigConflict"), 1);
}

#[test]
fn should_accept_a_dotted_custom_namespace() {
    let sink = DiagnosticSink::new();
    let effective = GenerationOptions {
        custom_namespace: Some("My.Company.Dispatch".to_string()),
        ..GenerationOptions::default()
    }
    .validate(&sink);
    assert_eq!(effective.namespace, "My.Company.Dispatch");
    assert!(sink.is_empty());
}

#[test]
fn should_reject_a_malformed_namespace_and_fall_back() {
    let sink = DiagnosticSink::new();
    let effective = GenerationOptions {
        custom_namespace: Some("123Invalid".to_string()),
        ..GenerationOptions::default()
    }
    .validate(&sink);
    assert_eq!(effective.namespace, "Relay.Generated");
    assert_eq!(sink.count_of("RELAY_GEN_ConfigConflict"), 1);
}

#[test]
fn should_reject_namespace_segments_starting_with_digits() {
    let sink = DiagnosticSink::new();
    GenerationOptions {
        custom_namespace: Some("Good.1Bad".to_string()),
        ..GenerationOptions::default()
    }
    .validate(&sink);
    assert_eq!(sink.count_of("RELAY_GEN_ConfigConflict"), 1);
}

#[test]
fn should_report_when_every_emitter_is_disabled() {
    let sink = DiagnosticSink::new();
    GenerationOptions {
        enable_di: false,
        enable_handler_registry: false,
        enable_optimized_dispatcher: false,
        enable_notification_dispatcher: false,
        enable_pipeline_registry: false,
        enable_endpoint_metadata: false,
        ..GenerationOptions::default()
    }
    .validate(&sink);
    assert_eq!(sink.count_of("RELAY_GEN_ConfigConflict"), 1);
}

#[test]
fn should_accumulate_every_configuration_conflict() {
    let sink = DiagnosticSink::new();
    let effective = GenerationOptions {
        max_degree_of_parallelism: 0,
        custom_namespace: Some("123Invalid".to_string()),
        enable_di: false,
        enable_handler_registry: false,
        enable_optimized_dispatcher: false,
        enable_notification_dispatcher: false,
        enable_pipeline_registry: false,
        enable_endpoint_metadata: false,
        ..GenerationOptions::default()
    }
    .validate(&sink);
    assert_eq!(sink.count_of("RELAY_GEN_ConfigConflict"), 3);
    assert_eq!(effective.parallelism, 1);
}

#[test]
fn should_parse_key_value_properties() {
    let mut properties = HashMap::new();
    properties.insert(
        "relay_generator.max_degree_of_parallelism".to_string(),
        "8".to_string(),
    );
    properties.insert(
        "relay_generator.custom_namespace".to_string(),
        "App.Generated".to_string(),
    );
    properties.insert(
        "relay_generator.enable_endpoint_metadata".to_string(),
        "false".to_string(),
    );
    properties.insert(
        "relay_generator.include_debug_info".to_string(),
        "True".to_string(),
    );
    let options = GenerationOptions::from_key_values(&properties);
    assert_eq!(options.max_degree_of_parallelism, 8);
    assert_eq!(options.custom_namespace.as_deref(), Some("App.Generated"));
    assert!(!options.enable_endpoint_metadata);
    assert!(options.include_debug_info);
}

#[test]
fn should_ignore_unknown_keys_and_bad_values() {
    let mut properties = HashMap::new();
    properties.insert("relay_generator.unknown_key".to_string(), "1".to_string());
    properties.insert(
        "relay_generator.max_degree_of_parallelism".to_string(),
        "lots".to_string(),
    );
    properties.insert("relay_generator.enable_di".to_string(), "maybe".to_string());
    let options = GenerationOptions::from_key_values(&properties);
    assert_eq!(options, GenerationOptions::default());
}

#[test]
fn should_round_trip_through_serde() {
    let options = GenerationOptions {
        max_degree_of_parallelism: 2,
        custom_namespace: Some("X.Y".to_string()),
        ..GenerationOptions::default()
    };
    let json = serde_json::to_string(&options).unwrap();
    let back: GenerationOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, options);
}

#[test]
fn should_fill_missing_fields_with_defaults_when_deserializing() {
    let back: GenerationOptions = serde_json::from_str("{\"enable_di\": false}").unwrap();
    assert!(!back.enable_di);
    assert!(back.enable_handler_registry);
    assert_eq!(back.max_degree_of_parallelism, 4);
}
