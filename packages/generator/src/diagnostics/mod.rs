//! Diagnostics
//!
//! Structured diagnostics handed back to the host. Every diagnostic is
//! built from a descriptor in the closed catalog of [`DiagnosticCode`];
//! the sink collects them append-only and thread-safe.

mod codes;
mod sink;

pub use codes::DiagnosticCode;
pub use sink::DiagnosticSink;

use relay_host::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Diagnostic category, for host-side grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Usage,
    Performance,
    Configuration,
    Generator,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Usage => "Usage",
            Category::Performance => "Performance",
            Category::Configuration => "Configuration",
            Category::Generator => "RelayGenerator",
        };
        f.write_str(name)
    }
}

/// A single reported diagnostic. Serialize-only: diagnostics flow out to
/// the host, never back in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub id: &'static str,
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    /// Instantiate the code's message template with positional arguments.
    /// Arguments are substituted verbatim; a `None`-like hole is the
    /// caller's responsibility to spell (convention: `void`).
    pub fn format(code: DiagnosticCode, args: &[&str]) -> Self {
        let mut message = code.message_template().to_string();
        for (i, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{}}}", i), arg);
        }
        Diagnostic {
            id: code.id(),
            severity: code.severity(),
            category: code.category(),
            message,
            location: None,
        }
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " ({})", loc)?;
        }
        Ok(())
    }
}
