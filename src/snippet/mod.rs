//! Code block splitting and reassembly.
//!
//! A single documentation code block may describe several files:
//!
//! ```text
//! // file: reducer.ts noEmit
//! export type State = { value: number }
//! // file: index.ts
//! import type { State } from './reducer'
//! ```
//!
//! [`split_files`] turns that text into ordered [`VirtualFile`]s under a
//! per-block folder, [`rearrange_files`] turns (compiled) files back into
//! display text.

mod post;
mod rearrange;
mod split;

use indexmap::IndexMap;

pub use post::{post_process_transpiled, post_process_typed, strip_ts_directives, to_js_file_name};
pub use rearrange::rearrange_files;
pub use split::{
    file_start_lines, split_files, split_files_with_default, DEFAULT_FILE_NAME, DIRECTIVE,
    NO_EMIT_FLAG,
};

/// A source file synthesized from a code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFile {
    /// Synthetic path: `<block folder>/<declared name>`.
    pub path: String,
    /// Source text.
    pub code: String,
    /// Type-checked, but left out of rendered output.
    pub skip: bool,
}

impl VirtualFile {
    /// Create a rendered (non-skipped) file.
    pub fn new(path: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
            skip: false,
        }
    }

    /// Mark the file as type-check only.
    pub fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }
}

/// Virtual files keyed by path, in order of appearance.
pub type VirtualFiles = IndexMap<String, VirtualFile>;
