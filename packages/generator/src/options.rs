//! Generation Options
//!
//! User-facing configuration. Validation reports configuration
//! diagnostics but never fails: out-of-range values are clamped to the
//! nearest valid value and generation proceeds with the effective set.

use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User-facing parallelism bounds. 1 means strictly sequential.
pub const MIN_PARALLELISM: i32 = 1;
pub const MAX_PARALLELISM: i32 = 64;
pub const DEFAULT_PARALLELISM: i32 = 4;

/// Default namespace of emitted artifacts.
pub const DEFAULT_ASSEMBLY_NAME: &str = "Relay.Generated";

/// Dotted identifier: segments of `[A-Za-z_][A-Za-z0-9_]*`.
static NAMESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub max_degree_of_parallelism: i32,
    pub custom_namespace: Option<String>,
    pub assembly_name: String,

    pub enable_di: bool,
    pub enable_handler_registry: bool,
    pub enable_optimized_dispatcher: bool,
    pub enable_notification_dispatcher: bool,
    pub enable_pipeline_registry: bool,
    pub enable_endpoint_metadata: bool,

    pub include_debug_info: bool,
    pub include_documentation: bool,
    pub enable_nullable_context: bool,
    pub use_aggressive_inlining: bool,
    pub enable_performance_optimizations: bool,
    pub enable_keyed_services: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        GenerationOptions {
            max_degree_of_parallelism: DEFAULT_PARALLELISM,
            custom_namespace: None,
            assembly_name: DEFAULT_ASSEMBLY_NAME.to_string(),
            enable_di: true,
            enable_handler_registry: true,
            enable_optimized_dispatcher: true,
            enable_notification_dispatcher: true,
            enable_pipeline_registry: true,
            enable_endpoint_metadata: true,
            include_debug_info: false,
            include_documentation: true,
            enable_nullable_context: true,
            use_aggressive_inlining: true,
            enable_performance_optimizations: true,
            enable_keyed_services: true,
        }
    }
}

impl GenerationOptions {
    /// Parse options from build-property style key/value pairs. Keys may
    /// carry the `relay_generator.` prefix; unknown keys and unparsable
    /// values are ignored, build systems forward everything they have.
    pub fn from_key_values(properties: &HashMap<String, String>) -> Self {
        let mut options = GenerationOptions::default();
        for (key, value) in properties {
            let key = key.strip_prefix("relay_generator.").unwrap_or(key);
            match key {
                "max_degree_of_parallelism" => {
                    if let Ok(v) = value.trim().parse::<i32>() {
                        options.max_degree_of_parallelism = v;
                    }
                }
                "custom_namespace" => {
                    if !value.trim().is_empty() {
                        options.custom_namespace = Some(value.trim().to_string());
                    }
                }
                "assembly_name" => {
                    if !value.trim().is_empty() {
                        options.assembly_name = value.trim().to_string();
                    }
                }
                _ => {
                    if let Some(flag) = options.flag_mut(key) {
                        if let Ok(v) = value.trim().to_ascii_lowercase().parse::<bool>() {
                            *flag = v;
                        }
                    }
                }
            }
        }
        options
    }

    fn flag_mut(&mut self, key: &str) -> Option<&mut bool> {
        let flag = match key {
            "enable_di" => &mut self.enable_di,
            "enable_handler_registry" => &mut self.enable_handler_registry,
            "enable_optimized_dispatcher" => &mut self.enable_optimized_dispatcher,
            "enable_notification_dispatcher" => &mut self.enable_notification_dispatcher,
            "enable_pipeline_registry" => &mut self.enable_pipeline_registry,
            "enable_endpoint_metadata" => &mut self.enable_endpoint_metadata,
            "include_debug_info" => &mut self.include_debug_info,
            "include_documentation" => &mut self.include_documentation,
            "enable_nullable_context" => &mut self.enable_nullable_context,
            "use_aggressive_inlining" => &mut self.use_aggressive_inlining,
            "enable_performance_optimizations" => &mut self.enable_performance_optimizations,
            "enable_keyed_services" => &mut self.enable_keyed_services,
            _ => return None,
        };
        Some(flag)
    }

    pub fn any_emitter_enabled(&self) -> bool {
        self.enable_di
            || self.enable_handler_registry
            || self.enable_optimized_dispatcher
            || self.enable_notification_dispatcher
            || self.enable_pipeline_registry
            || self.enable_endpoint_metadata
    }

    /// Validate and produce the effective set used downstream. Reports
    /// configuration diagnostics; never rejects the run.
    pub fn validate(&self, sink: &DiagnosticSink) -> EffectiveOptions {
        let parallelism =
            if !(MIN_PARALLELISM..=MAX_PARALLELISM).contains(&self.max_degree_of_parallelism) {
                sink.report(Diagnostic::format(
                    DiagnosticCode::ConfigConflict,
                    &[&format!(
                        "max_degree_of_parallelism {} is outside {}..={}",
                        self.max_degree_of_parallelism, MIN_PARALLELISM, MAX_PARALLELISM
                    )],
                ));
                self.max_degree_of_parallelism
                    .clamp(MIN_PARALLELISM, MAX_PARALLELISM)
            } else {
                self.max_degree_of_parallelism
            };

        let mut namespace = self.assembly_name.clone();
        match &self.custom_namespace {
            Some(custom) if NAMESPACE_RE.is_match(custom) => {
                namespace = custom.clone();
            }
            Some(custom) => {
                sink.report(Diagnostic::format(
                    DiagnosticCode::ConfigConflict,
                    &[&format!("custom_namespace `{}` is not a dotted identifier", custom)],
                ));
            }
            None => {}
        }

        if !self.any_emitter_enabled() {
            sink.report(Diagnostic::format(
                DiagnosticCode::ConfigConflict,
                &["all emitters are disabled; nothing would be generated"],
            ));
        }

        EffectiveOptions {
            options: self.clone(),
            parallelism,
            namespace,
        }
    }
}

/// Options after validation and clamping, as emitters and the engine see
/// them.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveOptions {
    pub options: GenerationOptions,
    pub parallelism: i32,
    pub namespace: String,
}

impl EffectiveOptions {
    /// Effective options from the defaults, for tests and simple hosts.
    pub fn defaults() -> Self {
        let sink = DiagnosticSink::new();
        GenerationOptions::default().validate(&sink)
    }
}
