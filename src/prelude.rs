//! Prelude module for convenient imports.
//!
//! ```ignore
//! use snippet_batch::prelude::*;
//! ```

// Blocks
pub use crate::block::{transpile_block, transpile_document, BlockOutcome, BlockOutput, CodeBlock};

// Compilation
pub use crate::compile::{Compiler, TranspiledFile, TranspiledFiles};
pub use crate::registry::CompilerRegistry;

// Configuration
pub use crate::config::CompilerSettings;
pub use crate::host::{ExternalResolution, PackageId};
pub use crate::options::CompilerOptions;

// Service contract
pub use crate::service::{EmitOutput, HostError, LanguageService, RawDiagnostic, ServiceHost};

// Diagnostics
pub use crate::diagnostic::{
    format_failures, BlockFailure, CompileError, Diagnostic, DiagnosticOptions, FailureLocation,
};

// Snippets
pub use crate::snippet::{split_files, VirtualFile, VirtualFiles};
