//! Documentation code blocks: from fenced source to typed/compiled variants.
//!
//! ```text
//! CodeBlock ──► split_files ──► Compiler::compile ──► post-process ──► rearrange
//!                                      │
//!                                      └─► diagnostics ──► BlockFailure (document line/column)
//! ```
//!
//! Every code block of a document is counted, transpiled or not, so the
//! `codeBlock_<n>` folder of a block stays stable when other blocks change
//! language or tags.

use crate::compile::{emitted_files, Compiler, TranspiledFiles};
use crate::config::CompilerSettings;
use crate::diagnostic::{BlockFailure, CompileError, FailureLocation};
use crate::service::LanguageService;
use crate::snippet::{file_start_lines, rearrange_files, split_files_with_default, VirtualFiles};

/// Tag that leaves a block untouched.
pub const NO_TRANSPILE_TAG: &str = "no-transpile";

/// A fenced code block from a documentation source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Fence language (`ts`, `tsx`, ...).
    pub lang: String,
    /// Text after the language on the fence line.
    pub meta: Option<String>,
    /// Block contents.
    pub value: String,
    /// 1-based document line of the opening fence.
    pub start_line: usize,
}

impl CodeBlock {
    /// Create a block without meta.
    pub fn new(lang: impl Into<String>, value: impl Into<String>, start_line: usize) -> Self {
        Self {
            lang: lang.into(),
            meta: None,
            value: value.into(),
            start_line,
        }
    }

    /// Set the fence meta.
    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }

    /// Default file name for text without a directive, if the language is
    /// compiled at all.
    fn default_file_name(&self) -> Option<&'static str> {
        match self.lang.as_str() {
            "ts" => Some("index.ts"),
            "tsx" => Some("index.tsx"),
            _ => None,
        }
    }
}

/// Space-separated tags from a fence's meta.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockTags<'a>(Vec<&'a str>);

impl<'a> BlockTags<'a> {
    /// Parse tags; a missing meta has none.
    pub fn parse(meta: Option<&'a str>) -> Self {
        Self(meta.map(|m| m.split_whitespace().collect()).unwrap_or_default())
    }

    /// Whether a tag is present.
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| *t == tag)
    }

    /// Whether the block opts out of compilation.
    pub fn no_transpile(&self) -> bool {
        self.contains(NO_TRANSPILE_TAG)
    }
}

/// Rendered variants of a compiled block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockOutput {
    /// Virtual folder of the block.
    pub folder: String,
    /// Typed variant, as written.
    pub typed: String,
    /// Compiled variant.
    pub compiled: String,
    /// Diagnostics mapped into the document.
    pub failures: Vec<BlockFailure>,
}

impl BlockOutput {
    /// Whether the block compiled without diagnostics.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// What happened to one code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    /// Not a compiled language, or tagged `no-transpile`.
    Skipped,
    /// Compiled.
    Transpiled(BlockOutput),
}

impl BlockOutcome {
    /// The output, if compiled.
    pub fn output(&self) -> Option<&BlockOutput> {
        match self {
            Self::Skipped => None,
            Self::Transpiled(output) => Some(output),
        }
    }
}

/// Virtual folder of the `index`-th (1-based) code block of a document.
pub fn block_folder(settings: &CompilerSettings, document: &str, index: usize) -> String {
    format!("{}/codeBlock_{index}", settings.virtual_root(document))
}

/// Compile one code block of `document`.
///
/// `index` is the 1-based position of the block among all code blocks of
/// the document.
pub fn transpile_block<S: LanguageService>(
    compiler: &mut Compiler<S>,
    settings: &CompilerSettings,
    document: &str,
    index: usize,
    block: &CodeBlock,
) -> Result<BlockOutcome, CompileError> {
    let Some(default_name) = block.default_file_name() else {
        return Ok(BlockOutcome::Skipped);
    };
    if BlockTags::parse(block.meta.as_deref()).no_transpile() {
        tracing::debug!(document, index, "code block tagged no-transpile");
        return Ok(BlockOutcome::Skipped);
    }

    let folder = block_folder(settings, document, index);
    let files = split_files_with_default(&block.value, &folder, default_name);
    let transpiled = compiler.compile(&files)?;

    let failures = block_failures(document, block, &folder, default_name, &files, &transpiled);
    if !failures.is_empty() {
        tracing::debug!(
            document,
            folder = %folder,
            failures = failures.len(),
            "code block failed to type-check"
        );
    }

    let typed = settings.process_typed(&files, document);
    let compiled = settings.process_transpiled(&emitted_files(&transpiled), document);
    let typed = rearrange_files(typed.values(), &folder);
    let compiled = rearrange_files(compiled.values(), &folder);

    Ok(BlockOutcome::Transpiled(BlockOutput {
        folder,
        typed,
        compiled,
        failures,
    }))
}

/// Compile all code blocks of a document, numbering them in order.
pub fn transpile_document<S: LanguageService>(
    compiler: &mut Compiler<S>,
    settings: &CompilerSettings,
    document: &str,
    blocks: &[CodeBlock],
) -> Result<Vec<BlockOutcome>, CompileError> {
    blocks
        .iter()
        .enumerate()
        .map(|(i, block)| transpile_block(compiler, settings, document, i + 1, block))
        .collect()
}

fn block_failures(
    document: &str,
    block: &CodeBlock,
    folder: &str,
    default_name: &str,
    files: &VirtualFiles,
    transpiled: &TranspiledFiles,
) -> Vec<BlockFailure> {
    let starts = file_start_lines(&block.value, folder, default_name);
    let mut failures = Vec::new();

    for (path, file) in transpiled {
        let source = files.get(path).map(|f| f.code.clone()).unwrap_or_default();
        let offset = starts.get(path).copied().unwrap_or_default();

        for diagnostic in &file.diagnostics {
            let (location, file_line) = match diagnostic.position() {
                Some((line, character)) => (
                    FailureLocation::At {
                        line: block.start_line + 1 + offset + line,
                        column: character + 1,
                    },
                    Some(line),
                ),
                None => (
                    FailureLocation::Block {
                        start_line: block.start_line,
                    },
                    None,
                ),
            };
            failures.push(BlockFailure {
                document: document.to_owned(),
                virtual_file: path.clone(),
                location,
                file_line,
                message: diagnostic.message().to_owned(),
                source: source.clone(),
            });
        }
    }

    failures
}
