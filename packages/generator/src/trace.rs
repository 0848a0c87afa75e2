//! Generation Trace
//!
//! Progress reporting for one generation run. The orchestrator announces
//! phase boundaries with their timings and every degraded emitter; hosts
//! inject the observer they want. No global state, and trace output is
//! distinct from the diagnostic surface: diagnostics describe the user's
//! code, the trace describes the generator itself.

use crate::diagnostics::Severity;
use std::fmt;

/// The pipeline phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Option validation and clamping.
    Configure,
    /// Lexical candidate scan over the trees.
    Scan,
    /// Semantic discovery and validation.
    Discover,
    /// Emitter selection and execution.
    Emit,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Configure => "configure",
            Phase::Scan => "scan",
            Phase::Discover => "discover",
            Phase::Emit => "emit",
        };
        f.write_str(name)
    }
}

/// Observer for the orchestrator's progress.
pub trait GenerationTrace: Sync {
    /// A phase finished. `detail` summarizes what it produced
    /// ("14 candidate method(s)", "5 handler(s) in 3 type(s)").
    fn phase_completed(&self, phase: Phase, elapsed_ms: u128, detail: &str);

    /// A recoverable emitter fault was replaced by fallback output.
    fn emitter_degraded(&self, emitter: &str, output_file: &str, error: &str);
}

/// Trace that reports nothing, the default for headless hosts.
#[derive(Debug, Default)]
pub struct SilentTrace;

impl SilentTrace {
    pub fn new() -> Self {
        Self
    }
}

impl GenerationTrace for SilentTrace {
    fn phase_completed(&self, _phase: Phase, _elapsed_ms: u128, _detail: &str) {}

    fn emitter_degraded(&self, _emitter: &str, _output_file: &str, _error: &str) {}
}

/// Trace that writes structured lines to stderr.
#[derive(Debug)]
pub struct ConsoleTrace {
    minimum: Severity,
}

impl ConsoleTrace {
    pub fn new(minimum: Severity) -> Self {
        Self { minimum }
    }

    /// Phase completions included.
    pub fn verbose() -> Self {
        Self::new(Severity::Info)
    }
}

impl GenerationTrace for ConsoleTrace {
    fn phase_completed(&self, phase: Phase, elapsed_ms: u128, detail: &str) {
        if self.minimum <= Severity::Info {
            eprintln!("relay-gen: {} ({} ms): {}", phase, elapsed_ms, detail);
        }
    }

    fn emitter_degraded(&self, emitter: &str, output_file: &str, error: &str) {
        if self.minimum <= Severity::Warning {
            eprintln!(
                "relay-gen: emitter {} degraded, {} replaced by fallback output: {}",
                emitter, output_file, error
            );
        }
    }
}
