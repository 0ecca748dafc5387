//! Document-relative build failures.
//!
//! A [`Diagnostic`](super::Diagnostic) is relative to a virtual file. Once
//! the enclosing code block's location is known it becomes a
//! [`BlockFailure`], positioned in the documentation source itself.

use std::fmt;

/// Where a failure points in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureLocation {
    /// A specific position, both 1-based.
    At {
        /// 1-based document line.
        line: usize,
        /// 1-based column.
        column: usize,
    },
    /// The whole code block, starting at this 1-based line.
    Block {
        /// 1-based line of the opening fence.
        start_line: usize,
    },
}

/// A diagnostic mapped back to the documentation source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFailure {
    /// Documentation source path.
    pub document: String,
    /// Virtual file the diagnostic was reported in.
    pub virtual_file: String,
    /// Location in the document.
    pub location: FailureLocation,
    /// Zero-based line inside the virtual file, if positioned.
    pub file_line: Option<usize>,
    /// Flattened message.
    pub message: String,
    /// Source of the virtual file, for excerpts.
    pub source: String,
}

impl BlockFailure {
    /// Whether the failure points at a specific line.
    pub fn is_positioned(&self) -> bool {
        matches!(self.location, FailureLocation::At { .. })
    }
}

impl fmt::Display for BlockFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            FailureLocation::At { line, column } => {
                write!(f, "{}:{line}:{column} — {}", self.document, self.message)
            }
            FailureLocation::Block { start_line } => {
                write!(f, "{}:{start_line}: {}", self.document, self.message)
            }
        }
    }
}
