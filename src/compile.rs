//! Incremental compilation of snippet files.
//!
//! A [`Compiler`] owns one [`CompilationHost`] and one long-lived
//! [`LanguageService`]. Each [`Compiler::compile`] call swaps the active file
//! set, so the service only re-analyzes what actually changed since the
//! previous snippet.
//!
//! # Blank-line placeholders
//!
//! Compilers may drop or move blank lines when emitting. Before compilation
//! every empty line is replaced with [`NEWLINE_PLACEHOLDER`], a comment the
//! emitter keeps in place; the marker is stripped from the emitted text
//! afterwards. Line numbers of diagnostics therefore match the snippet
//! text exactly.
//!
//! # Example
//!
//! ```ignore
//! let mut compiler = Compiler::from_settings(&settings, &factory)?;
//! let files = split_files(block, "/docs/intro.md/codeBlock_1");
//! for (path, file) in compiler.compile(&files)? {
//!     for diagnostic in &file.diagnostics {
//!         eprintln!("{path}: {diagnostic}");
//!     }
//! }
//! ```

use std::time::Instant;

use indexmap::IndexMap;

use crate::config::CompilerSettings;
use crate::diagnostic::{CompileError, Diagnostic};
use crate::host::{CompilationHost, ModuleResolutionHost};
use crate::service::{LanguageService, RawDiagnostic, ServiceFactory};
use crate::snippet::{VirtualFile, VirtualFiles};

/// Marker substituted for empty lines during compilation.
pub const NEWLINE_PLACEHOLDER: &str = "//__NEWLINE__";

// =============================================================================
// Result Types
// =============================================================================

/// A virtual file after compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspiledFile {
    /// Same path as the input file.
    pub path: String,
    /// Emitted code (empty if nothing was emitted).
    pub code: String,
    /// Copied from the input file.
    pub skip: bool,
    /// Options, syntax and type diagnostics for this file.
    pub diagnostics: Vec<Diagnostic>,
}

impl TranspiledFile {
    /// Whether the compiler reported anything for this file.
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// The emitted code as a virtual file, for post-processing.
    pub fn to_virtual(&self) -> VirtualFile {
        VirtualFile {
            path: self.path.clone(),
            code: self.code.clone(),
            skip: self.skip,
        }
    }
}

/// Transpiled files keyed by path, in input order.
pub type TranspiledFiles = IndexMap<String, TranspiledFile>;

/// Emitted code of all files as virtual files.
pub fn emitted_files(files: &TranspiledFiles) -> VirtualFiles {
    files
        .iter()
        .map(|(path, file)| (path.clone(), file.to_virtual()))
        .collect()
}

// =============================================================================
// Compiler
// =============================================================================

/// Long-lived compiler for one configuration.
///
/// Not shareable between concurrent requests: [`compile`](Self::compile)
/// takes `&mut self`.
pub struct Compiler<S> {
    host: CompilationHost,
    service: S,
}

impl<S: LanguageService> Compiler<S> {
    /// Assemble a compiler from a host and a service.
    pub fn new(host: CompilationHost, service: S) -> Self {
        Self { host, service }
    }

    /// Load the settings' options and create host and service.
    pub fn from_settings<F>(settings: &CompilerSettings, factory: &F) -> Result<Self, CompileError>
    where
        F: ServiceFactory<Service = S>,
    {
        let options = settings.load_options()?;
        tracing::debug!(
            settings = ?settings.id(),
            strict = options.strict(),
            base_url = ?options.base_url(),
            paths = options.paths().len(),
            "creating compiler"
        );
        let service = factory.create(&options);
        let host = CompilationHost::builder(options)
            .externals(settings.external_resolutions().clone())
            .build();
        Ok(Self::new(host, service))
    }

    /// The compilation host.
    pub fn host(&self) -> &CompilationHost {
        &self.host
    }

    /// The compiler service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Compile one snippet's files.
    ///
    /// Type and syntax errors are returned per file; only host failures
    /// (such as a broken external resolution) abort the request.
    pub fn compile(&mut self, files: &VirtualFiles) -> Result<TranspiledFiles, CompileError> {
        let started = Instant::now();

        self.host.set_script_file_names(std::iter::empty::<&str>());
        for (path, file) in files {
            self.host.write_file(path, &preserve_blank_lines(&file.code));
        }
        self.host.set_script_file_names(files.keys());

        let mut transpiled = TranspiledFiles::with_capacity(files.len());
        for (path, file) in files {
            let emit = self.service.emit_output(&self.host, path)?;
            let code = emit.primary_text().map(restore_blank_lines).unwrap_or_default();

            let mut raw = self.service.compiler_options_diagnostics(&self.host)?;
            raw.extend(self.service.syntactic_diagnostics(&self.host, path)?);
            raw.extend(self.service.semantic_diagnostics(&self.host, path)?);
            let diagnostics = raw.iter().map(|d| self.map_diagnostic(d)).collect();

            transpiled.insert(
                path.clone(),
                TranspiledFile {
                    path: path.clone(),
                    code,
                    skip: file.skip,
                    diagnostics,
                },
            );
        }

        tracing::debug!(
            files = files.len(),
            diagnostics = transpiled.values().map(|f| f.diagnostics.len()).sum::<usize>(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "compiled snippet"
        );
        Ok(transpiled)
    }

    /// Resolve offsets against the text the compiler saw.
    fn map_diagnostic(&self, raw: &RawDiagnostic) -> Diagnostic {
        match raw.file.as_deref().and_then(|file| self.host.read_file(file)) {
            Some(text) => Diagnostic::from_raw(raw, &text),
            None => Diagnostic::Positionless {
                message: raw.message.flatten("\n"),
            },
        }
    }
}

// =============================================================================
// Placeholder Transform
// =============================================================================

/// Replace every empty line with [`NEWLINE_PLACEHOLDER`].
///
/// Line count and line order are unchanged.
pub fn preserve_blank_lines(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    for line in code.split_inclusive('\n') {
        let body = line.strip_suffix('\n').unwrap_or(line);
        let body = body.strip_suffix('\r').unwrap_or(body);
        if body.is_empty() {
            out.push_str(NEWLINE_PLACEHOLDER);
        }
        out.push_str(line);
    }
    out
}

/// Remove placeholders from emitted code.
pub fn restore_blank_lines(emitted: &str) -> String {
    emitted.replace(NEWLINE_PLACEHOLDER, "")
}
