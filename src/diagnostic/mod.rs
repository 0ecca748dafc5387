//! Diagnostics: position mapping, document-relative failures, formatting.

mod error;
mod failure;
mod format;
mod info;

pub use error::CompileError;
pub use failure::{BlockFailure, FailureLocation};
pub use format::{excerpt, format_failure, format_failures, DiagnosticOptions};
pub use info::{Diagnostic, DiagnosticSummary, LineIndex};

// Raw service-side types, for convenience.
pub use crate::service::{DiagnosticCategory, MessageChain, RawDiagnostic};
