//! # snippet-batch
//!
//! Batch compilation of TypeScript code blocks embedded in documentation.
//!
//! Each code block becomes a small multi-file project of *virtual files*.
//! The files are compiled on top of the real project (its `tsconfig.json`,
//! its `node_modules`, its own sources) by a long-lived, incremental
//! compiler, and every diagnostic is mapped back to the document line it
//! came from:
//!
//! - **Splitting**: `// file: name.ts [noEmit]` directives split a block
//!   into files under `<document>/codeBlock_<n>/`
//! - **Overlay host**: virtual files shadow the disk; module resolution
//!   knows about external redirects, snippet-relative imports and ordinary
//!   Node-style lookup
//! - **Incremental driver**: one compiler per configuration, reused across
//!   all blocks; unchanged files keep their version and are not re-analyzed
//! - **Diagnostics**: line-accurate through emit, reported in document
//!   coordinates with a source excerpt
//!
//! ## Note
//!
//! Type-checking and emitting are delegated to a [`LanguageService`]
//! implementation supplied by the caller. This crate decides *what* is
//! compiled and *where* errors belong.
//!
//! ## Quick Start
//!
//! ```ignore
//! use snippet_batch::prelude::*;
//!
//! let settings = CompilerSettings::from_tsconfig("docs/tsconfig.json");
//! let mut registry = CompilerRegistry::new(|options: &CompilerOptions| TsService::new(options));
//! let compiler = registry.compiler(&settings)?;
//!
//! let block = CodeBlock::new("ts", "let x: string = 5", 12);
//! let outcome = transpile_block(compiler, &settings, "docs/intro.md", 1, &block)?;
//! if let BlockOutcome::Transpiled(output) = outcome {
//!     eprint!("{}", format_failures(&output.failures, &DiagnosticOptions::default()));
//! }
//! ```
//!
//! ## Modules
//!
//! - [`snippet`]: splitting and reassembling code blocks
//! - [`host`]: overlay file system and module resolution
//! - [`service`]: the contract with the compiler service
//! - [`compile`]: the incremental driver
//! - [`registry`]: one compiler per configuration
//! - [`block`]: code block orchestration
//! - [`diagnostic`]: position mapping and failure reports
//! - [`config`] / [`options`]: settings and `tsconfig.json` loading

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod block;
pub mod compile;
pub mod config;
pub mod diagnostic;
pub mod host;
pub mod options;
pub mod prelude;
pub mod registry;
pub mod service;
pub mod snippet;

#[cfg(test)]
mod testing;

// =============================================================================
// High-Level API
// =============================================================================

pub use block::{
    transpile_block, transpile_document, BlockOutcome, BlockOutput, BlockTags, CodeBlock,
};
pub use compile::{Compiler, TranspiledFile, TranspiledFiles};
pub use registry::CompilerRegistry;

// =============================================================================
// Diagnostics
// =============================================================================

pub use diagnostic::{
    // Error type
    CompileError,
    // Mapped diagnostics
    Diagnostic, BlockFailure, FailureLocation, DiagnosticSummary,
    // Formatting
    DiagnosticOptions, format_failure, format_failures,
};

// =============================================================================
// Infrastructure
// =============================================================================

pub use config::{CompilerSettings, PostProcessor, SettingsBuilder, SettingsId};
pub use host::{CompilationHost, ExternalResolution, PackageId};
pub use options::CompilerOptions;
pub use service::{HostError, LanguageService, ServiceFactory, ServiceHost};
pub use snippet::{rearrange_files, split_files, VirtualFile, VirtualFiles};
