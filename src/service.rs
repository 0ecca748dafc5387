//! Contract between the compilation host and the compiler service.
//!
//! ```text
//! Compiler (driver)
//!     │  emit_output / *_diagnostics(file)
//!     ▼
//! LanguageService  (type-checker + emitter, external)
//!     │  script_file_names / script_version / read_file / resolve_module_names
//!     ▼
//! ServiceHost  (CompilationHost: overlay + disk + resolution rules)
//! ```
//!
//! The service decides what to re-analyze from [`ServiceHost::script_version`]:
//! an unchanged version means the file's previous analysis may be reused.

use std::sync::Arc;

use thiserror::Error;

use crate::host::{ModuleResolutionHost, ResolvedModule};
use crate::options::CompilerOptions;

// =============================================================================
// Host side
// =============================================================================

/// Fatal host failure raised while the service is running.
///
/// Services must propagate it unchanged; it aborts the compile request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// A configured external resolution points at nothing.
    #[error("external resolution for `{module}` not found at {resolved_path}")]
    ExternalResolution {
        /// Module name as imported.
        module: String,
        /// Configured replacement path.
        resolved_path: String,
    },
}

/// Everything a [`LanguageService`] may ask of its environment.
pub trait ServiceHost: ModuleResolutionHost {
    /// Parsed compiler options.
    fn compilation_settings(&self) -> &CompilerOptions;

    /// Files to type-check in the current request.
    fn script_file_names(&self) -> &[String];

    /// Version token; unchanged token means unchanged file.
    fn script_version(&self, file_name: &str) -> String;

    /// Current text of a file.
    fn script_snapshot(&self, file_name: &str) -> Option<Arc<str>> {
        self.read_file(file_name)
    }

    /// Resolve the imports of `containing_file`, one entry per name.
    fn resolve_module_names(
        &self,
        module_names: &[&str],
        containing_file: &str,
    ) -> Result<Vec<Option<ResolvedModule>>, HostError>;
}

// =============================================================================
// Service side
// =============================================================================

/// One emitted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    /// Output file name.
    pub name: String,
    /// Emitted text.
    pub text: String,
}

/// Result of emitting a single source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitOutput {
    /// Emitted files; the JavaScript output comes first.
    pub output_files: Vec<OutputFile>,
    /// Emit was skipped (e.g. because of `noEmitOnError`).
    pub emit_skipped: bool,
}

impl EmitOutput {
    /// Text of the primary output file.
    pub fn primary_text(&self) -> Option<&str> {
        self.output_files.first().map(|f| f.text.as_str())
    }
}

/// Diagnostic category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// Error.
    #[default]
    Error,
    /// Warning.
    Warning,
    /// Suggestion.
    Suggestion,
    /// Informational message.
    Message,
}

/// Diagnostic message, possibly with nested detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageChain {
    /// Single message.
    Text(String),
    /// Message with elaborations.
    Chain {
        /// Head message.
        text: String,
        /// Nested elaborations.
        next: Vec<MessageChain>,
    },
}

impl MessageChain {
    /// Flatten into one string, nested parts on indented lines.
    pub fn flatten(&self, new_line: &str) -> String {
        let mut out = String::new();
        self.flatten_into(&mut out, new_line, 0);
        out
    }

    fn flatten_into(&self, out: &mut String, new_line: &str, indent: usize) {
        if indent > 0 {
            out.push_str(new_line);
            out.push_str(&"  ".repeat(indent));
        }
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Chain { text, next } => {
                out.push_str(text);
                for child in next {
                    child.flatten_into(out, new_line, indent + 1);
                }
            }
        }
    }
}

impl From<&str> for MessageChain {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for MessageChain {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// A diagnostic as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDiagnostic {
    /// File the diagnostic belongs to, if any.
    pub file: Option<String>,
    /// Byte offset into the file text.
    pub start: Option<usize>,
    /// Length in bytes of the reported range.
    pub length: Option<usize>,
    /// Category.
    pub category: DiagnosticCategory,
    /// Numeric diagnostic code.
    pub code: u32,
    /// Message.
    pub message: MessageChain,
}

impl RawDiagnostic {
    /// A positioned error.
    pub fn at(
        file: impl Into<String>,
        start: usize,
        length: usize,
        code: u32,
        message: impl Into<MessageChain>,
    ) -> Self {
        Self {
            file: Some(file.into()),
            start: Some(start),
            length: Some(length),
            category: DiagnosticCategory::Error,
            code,
            message: message.into(),
        }
    }

    /// A file-less error (e.g. invalid compiler options).
    pub fn global(code: u32, message: impl Into<MessageChain>) -> Self {
        Self {
            file: None,
            start: None,
            length: None,
            category: DiagnosticCategory::Error,
            code,
            message: message.into(),
        }
    }
}

/// An incremental type-checker and emitter.
///
/// Implementations keep analysis state between calls and consult
/// [`ServiceHost::script_version`] to decide what to recompute. Any
/// [`HostError`] returned by the host must be propagated.
pub trait LanguageService {
    /// Emit output for one file.
    fn emit_output(
        &mut self,
        host: &dyn ServiceHost,
        file_name: &str,
    ) -> Result<EmitOutput, HostError>;

    /// Diagnostics about the compiler options themselves.
    fn compiler_options_diagnostics(
        &mut self,
        host: &dyn ServiceHost,
    ) -> Result<Vec<RawDiagnostic>, HostError>;

    /// Parse errors in one file.
    fn syntactic_diagnostics(
        &mut self,
        host: &dyn ServiceHost,
        file_name: &str,
    ) -> Result<Vec<RawDiagnostic>, HostError>;

    /// Type errors in one file.
    fn semantic_diagnostics(
        &mut self,
        host: &dyn ServiceHost,
        file_name: &str,
    ) -> Result<Vec<RawDiagnostic>, HostError>;
}

/// Creates a [`LanguageService`] for a set of compiler options.
pub trait ServiceFactory {
    /// Service type produced.
    type Service: LanguageService;

    /// Create a fresh service.
    fn create(&self, options: &CompilerOptions) -> Self::Service;
}

impl<S, F> ServiceFactory for F
where
    S: LanguageService,
    F: Fn(&CompilerOptions) -> S,
{
    type Service = S;

    fn create(&self, options: &CompilerOptions) -> S {
        self(options)
    }
}
