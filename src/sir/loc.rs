//! Source locations attached to every node of the tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Location of a node in the stencil description it came from.
///
/// Programs assembled through the builder shortcuts leave this at the
/// default `0:0`, which stands for "unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// 1-based line, or 0 when unknown.
    pub line: i32,
    /// 1-based column, or 0 when unknown.
    pub column: i32,
}

impl SourceLocation {
    /// Creates a location from a line and a column.
    pub fn new(line: i32, column: i32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
