//! Failure report formatting.

use std::fmt::Write;

use super::failure::{BlockFailure, FailureLocation};

// ============================================================================
// Options
// ============================================================================

/// Options for controlling failure formatting.
///
/// # Example
///
/// ```ignore
/// // Default: colored, with a source excerpt
/// let opts = DiagnosticOptions::default();
///
/// // Plain text for logs and CI
/// let opts = DiagnosticOptions::plain();
///
/// // One line per failure
/// let opts = DiagnosticOptions::short();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticOptions {
    /// Whether to use ANSI colors in output.
    pub colored: bool,
    /// Whether to include a numbered source excerpt.
    pub snippets: bool,
    /// Lines shown before the failing line.
    pub context_before: usize,
    /// Lines shown after the failing line.
    pub context_after: usize,
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        Self {
            colored: true,
            snippets: true,
            context_before: 5,
            context_after: 6,
        }
    }
}

impl DiagnosticOptions {
    /// Plain text output (no ANSI colors).
    pub fn plain() -> Self {
        Self {
            colored: false,
            ..Self::default()
        }
    }

    /// Single-line output without excerpts.
    pub fn short() -> Self {
        Self {
            colored: false,
            snippets: false,
            ..Self::default()
        }
    }

    /// Set whether to use colors.
    pub fn with_colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Set whether to include source excerpts.
    pub fn with_snippets(mut self, snippets: bool) -> Self {
        self.snippets = snippets;
        self
    }

    /// Set the excerpt context.
    pub fn with_context(mut self, before: usize, after: usize) -> Self {
        self.context_before = before;
        self.context_after = after;
        self
    }
}

// ============================================================================
// Coloring
// ============================================================================

#[cfg(feature = "colored-diagnostics")]
fn paint_error(text: &str) -> String {
    use owo_colors::OwoColorize;
    text.red().bold().to_string()
}

#[cfg(feature = "colored-diagnostics")]
fn paint_gutter(text: &str) -> String {
    use owo_colors::OwoColorize;
    text.cyan().to_string()
}

#[cfg(not(feature = "colored-diagnostics"))]
fn paint_error(text: &str) -> String {
    text.to_owned()
}

#[cfg(not(feature = "colored-diagnostics"))]
fn paint_gutter(text: &str) -> String {
    text.to_owned()
}

fn paint(options: &DiagnosticOptions, text: &str, painter: fn(&str) -> String) -> String {
    if options.colored {
        painter(text)
    } else {
        text.to_owned()
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Numbered excerpt of `source` around zero-based `line`.
///
/// Line numbers are 1-based; the failing line is marked with `>`.
pub fn excerpt(source: &str, line: usize, options: &DiagnosticOptions) -> String {
    let first = line.saturating_sub(options.context_before);
    let last = line + options.context_after;

    let mut out = String::new();
    for (index, text) in source.lines().enumerate() {
        if index < first || index > last {
            continue;
        }
        let marker = if index == line { ">" } else { " " };
        let gutter = format!("{marker}{:>4} |", index + 1);
        let _ = writeln!(out, "{} {text}", paint(options, &gutter, paint_gutter));
    }
    out
}

/// Format one failure.
pub fn format_failure(failure: &BlockFailure, options: &DiagnosticOptions) -> String {
    let mut out = String::new();
    let label = paint(options, "error", paint_error);

    let _ = writeln!(out, "{label}: {}", failure.message);
    match failure.location {
        FailureLocation::At { line, column } => {
            let _ = writeln!(out, "  --> {}:{line}:{column}", failure.document);
        }
        FailureLocation::Block { start_line } => {
            let _ = writeln!(out, "  --> {}:{start_line} (code block)", failure.document);
        }
    }
    let _ = writeln!(out, "  in {}", failure.virtual_file);

    if options.snippets
        && let Some(line) = failure.file_line
    {
        out.push('\n');
        out.push_str(&excerpt(&failure.source, line, options));
    }

    out
}

/// Format several failures, separated by blank lines.
pub fn format_failures(failures: &[BlockFailure], options: &DiagnosticOptions) -> String {
    if !options.snippets {
        return failures
            .iter()
            .map(|f| format!("{f}\n"))
            .collect();
    }

    failures
        .iter()
        .map(|f| format_failure(f, options))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MESSAGE: &str =
        "Argument of type 'number' is not assignable to parameter of type 'string'.";

    fn failure() -> BlockFailure {
        BlockFailure {
            document: "docs/api.md".into(),
            virtual_file: "docs/api.md/codeBlock_2/b.ts".into(),
            location: FailureLocation::At { line: 12, column: 3 },
            file_line: Some(1),
            message: MESSAGE.into(),
            source: "import { f } from './a'\nf(5)\n".into(),
        }
    }

    #[test]
    fn test_excerpt_window() {
        let source = (1..=20).map(|i| format!("line{i}")).collect::<Vec<_>>().join("\n");
        let text = excerpt(&source, 9, &DiagnosticOptions::plain().with_context(1, 1));
        assert_eq!(text, "    9 | line9\n>  10 | line10\n   11 | line11\n");
    }

    #[test]
    fn test_format_plain() {
        let text = format_failure(&failure(), &DiagnosticOptions::plain());
        assert_eq!(
            text,
            format!(
                "error: {MESSAGE}\n  --> docs/api.md:12:3\n  in docs/api.md/codeBlock_2/b.ts\n\n\
                 \x20   1 | import {{ f }} from './a'\n>   2 | f(5)\n"
            )
        );
    }

    #[test]
    fn test_format_short() {
        let text = format_failures(&[failure()], &DiagnosticOptions::short());
        assert_eq!(
            text,
            format!("docs/api.md:12:3 — {MESSAGE}\n")
        );
    }

    #[test]
    fn test_block_failure_has_no_excerpt() {
        let mut f = failure();
        f.location = FailureLocation::Block { start_line: 10 };
        f.file_line = None;
        let text = format_failure(&f, &DiagnosticOptions::plain());
        assert!(text.contains("docs/api.md:10 (code block)"));
        assert!(!text.contains(" | "));
    }
}
