//! Source Locations
//!
//! Positions reported back to the host alongside diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position inside a source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        SourceLocation {
            file: file.into(),
            line,
            column,
        }
    }

    /// A location for declarations synthesized by builders without positions.
    pub fn unknown(file: impl Into<String>) -> Self {
        SourceLocation::new(file, 0, 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
