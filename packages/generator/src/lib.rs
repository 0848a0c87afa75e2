//! Relay Generator
//!
//! Compile-time analysis and code generation for the Relay dispatch
//! runtime. The host compiler hands over parsed trees plus a semantic
//! model; the generator lexically filters candidate methods, resolves and
//! classifies them into a handler model, validates their shapes against
//! the protocol rules, and runs a set of emitters that produce the
//! registration, dispatch and metadata artifacts. Structured diagnostics
//! flow back to the host through an append-only sink.

pub mod context;
pub mod diagnostics;
pub mod discovery;
pub mod emit;
pub mod filter;
pub mod model;
pub mod options;
pub mod orchestrator;
pub mod trace;
pub mod validation;
mod version;

pub use context::SemanticContext;
pub use diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Severity};
pub use discovery::DiscoveryEngine;
pub use filter::{scan_classes, scan_tree, Candidate, CandidateClass};
pub use model::{HandlerKind, HandlerModel, HandlerRecord, InterfaceImplRecord, MarkerKind, Scope};
pub use options::{EffectiveOptions, GenerationOptions};
pub use orchestrator::{FaultPolicy, GenerateError, GeneratedOutput, RelayGenerator};
pub use trace::{ConsoleTrace, GenerationTrace, Phase, SilentTrace};
pub use version::VERSION;
