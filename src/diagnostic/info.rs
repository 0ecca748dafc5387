//! Position-resolved diagnostics.
//!
//! Raw diagnostics carry byte offsets into the compiled virtual file. They are
//! resolved to zero-based line/character pairs while the text is still at
//! hand, so callers never need the compiler again to report them.

use std::fmt;

use crate::service::RawDiagnostic;

// ============================================================================
// Diagnostic
// ============================================================================

/// A compiler diagnostic for one virtual file.
///
/// `line` and `character` are zero-based and relative to the virtual file;
/// `character` counts Unicode scalar values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Diagnostic pointing at a source location.
    Positioned {
        /// Zero-based line.
        line: usize,
        /// Zero-based column.
        character: usize,
        /// Flattened message.
        message: String,
    },
    /// Diagnostic without a location (e.g. invalid compiler options).
    Positionless {
        /// Flattened message.
        message: String,
    },
}

impl Diagnostic {
    /// Resolve a raw diagnostic against the text it was reported on.
    pub fn from_raw(raw: &RawDiagnostic, text: &str) -> Self {
        let message = raw.message.flatten("\n");
        match (&raw.file, raw.start) {
            (Some(_), Some(start)) => {
                let (line, character) = LineIndex::new(text).line_and_character(start);
                Self::Positioned {
                    line,
                    character,
                    message,
                }
            }
            _ => Self::Positionless { message },
        }
    }

    /// The message text.
    pub fn message(&self) -> &str {
        match self {
            Self::Positioned { message, .. } | Self::Positionless { message } => message,
        }
    }

    /// Zero-based `(line, character)`, if positioned.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Self::Positioned {
                line, character, ..
            } => Some((*line, *character)),
            Self::Positionless { .. } => None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positioned {
                line,
                character,
                message,
            } => write!(f, "{}:{}: {message}", line + 1, character + 1),
            Self::Positionless { message } => f.write_str(message),
        }
    }
}

// ============================================================================
// LineIndex
// ============================================================================

/// Byte offsets of line starts.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    /// Index the line starts of `text`.
    pub fn new(text: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { text, starts }
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Zero-based line and character of a byte offset.
    ///
    /// Offsets past the end clamp to the end; offsets inside a multi-byte
    /// character count that character as not yet reached.
    pub fn line_and_character(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let line = self.starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.starts[line];
        let character = self.text[line_start..]
            .char_indices()
            .take_while(|(i, _)| line_start + i < offset)
            .count();
        (line, character)
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Summary of diagnostic counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticSummary {
    /// Diagnostics with a position.
    pub positioned: usize,
    /// Diagnostics without a position.
    pub positionless: usize,
}

impl DiagnosticSummary {
    /// Count diagnostics.
    pub fn from_diagnostics<'a, I>(diagnostics: I) -> Self
    where
        I: IntoIterator<Item = &'a Diagnostic>,
    {
        let mut summary = Self::default();
        for diagnostic in diagnostics {
            match diagnostic {
                Diagnostic::Positioned { .. } => summary.positioned += 1,
                Diagnostic::Positionless { .. } => summary.positionless += 1,
            }
        }
        summary
    }

    /// Total number of diagnostics.
    pub fn total(&self) -> usize {
        self.positioned + self.positionless
    }

    /// Whether there are no diagnostics at all.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for DiagnosticSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.total() {
            0 => write!(f, "no diagnostics"),
            1 => write!(f, "1 error"),
            n => write!(f, "{n} errors"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MessageChain;

    #[test]
    fn test_line_index() {
        let text = "let a = 1\n\nlet b: string = 5\n";
        let index = LineIndex::new(text);

        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_and_character(0), (0, 0));
        assert_eq!(index.line_and_character(10), (1, 0));
        assert_eq!(index.line_and_character(15), (2, 4));
        assert_eq!(index.line_and_character(999), (3, 0));
    }

    #[test]
    fn test_line_index_counts_chars() {
        let text = "const s = 'ü'; x";
        let offset = text.find('x').unwrap();
        assert_eq!(LineIndex::new(text).line_and_character(offset), (0, 15));
    }

    #[test]
    fn test_from_raw_positioned_at_zero() {
        let raw = RawDiagnostic::at("/v/a.ts", 0, 3, 2304, "Cannot find name 'foo'.");
        assert_eq!(
            Diagnostic::from_raw(&raw, "foo()"),
            Diagnostic::Positioned {
                line: 0,
                character: 0,
                message: "Cannot find name 'foo'.".into(),
            }
        );
    }

    #[test]
    fn test_from_raw_positionless() {
        let raw = RawDiagnostic::global(5023, MessageChain::Chain {
            text: "Unknown compiler option 'bogus'.".into(),
            next: vec!["Did you mean 'strict'?".into()],
        });
        let diagnostic = Diagnostic::from_raw(&raw, "");
        assert_eq!(diagnostic.position(), None);
        assert_eq!(
            diagnostic.message(),
            "Unknown compiler option 'bogus'.\n  Did you mean 'strict'?"
        );
    }

    #[test]
    fn test_display_and_summary() {
        let diagnostics = [
            Diagnostic::Positioned {
                line: 2,
                character: 4,
                message: "boom".into(),
            },
            Diagnostic::Positionless {
                message: "config".into(),
            },
        ];
        assert_eq!(diagnostics[0].to_string(), "3:5: boom");
        assert_eq!(diagnostics[1].to_string(), "config");

        let summary = DiagnosticSummary::from_diagnostics(&diagnostics);
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.to_string(), "2 errors");
        assert!(DiagnosticSummary::default().is_empty());
    }
}
