//! `// file:` directive parsing.

use indexmap::IndexMap;

use super::{VirtualFile, VirtualFiles};

/// Prefix of a file directive line.
pub const DIRECTIVE: &str = "// file: ";

/// Flag marking a file as type-check only.
pub const NO_EMIT_FLAG: &str = "noEmit";

/// Name of the file holding text that precedes any directive.
pub const DEFAULT_FILE_NAME: &str = "index.ts";

/// A directive line found in the block text.
struct Directive<'a> {
    /// Byte offset of the directive line start.
    line_start: usize,
    /// Byte offset where the file body starts (after the line break).
    body_start: usize,
    name: &'a str,
    flags: Vec<&'a str>,
}

/// Split a code block into virtual files under `folder`.
///
/// Text before the first directive (or the whole block when there is no
/// directive) lands in [`DEFAULT_FILE_NAME`].
pub fn split_files(text: &str, folder: &str) -> VirtualFiles {
    split_files_with_default(text, folder, DEFAULT_FILE_NAME)
}

/// Like [`split_files`], with a custom name for the default file
/// (e.g. `index.tsx` for `tsx` blocks).
pub fn split_files_with_default(text: &str, folder: &str, default_name: &str) -> VirtualFiles {
    let directives = find_directives(text);
    let mut files = VirtualFiles::new();

    let preamble_end = directives.first().map_or(text.len(), |d| d.line_start);
    let preamble = &text[..preamble_end];
    if directives.is_empty() || !preamble.trim().is_empty() {
        insert(&mut files, folder, default_name, preamble, false);
    }

    for (i, directive) in directives.iter().enumerate() {
        let end = directives.get(i + 1).map_or(text.len(), |next| next.line_start);
        let start = directive.body_start.min(end);

        let mut skip = false;
        for flag in &directive.flags {
            if *flag == NO_EMIT_FLAG {
                skip = true;
            } else {
                tracing::debug!(
                    file = directive.name,
                    flag,
                    "ignoring unknown file directive flag"
                );
            }
        }

        insert(&mut files, folder, directive.name, &text[start..end], skip);
    }

    files
}

/// Zero-based line in `text` where each file's body starts, keyed like the
/// output of [`split_files_with_default`].
pub fn file_start_lines(text: &str, folder: &str, default_name: &str) -> IndexMap<String, usize> {
    let mut starts = IndexMap::new();
    let directives = find_directives(text);

    let preamble_end = directives.first().map_or(text.len(), |d| d.line_start);
    if directives.is_empty() || !text[..preamble_end].trim().is_empty() {
        starts.insert(format!("{folder}/{default_name}"), 0);
    }
    for directive in &directives {
        let line = text[..directive.body_start].matches('\n').count();
        starts.insert(format!("{folder}/{}", directive.name), line);
    }

    starts
}

fn insert(files: &mut VirtualFiles, folder: &str, name: &str, code: &str, skip: bool) {
    let path = format!("{folder}/{name}");
    let file = VirtualFile {
        path: path.clone(),
        code: code.to_owned(),
        skip,
    };
    files.insert(path, file);
}

/// Locate every directive line, in order.
fn find_directives(text: &str) -> Vec<Directive<'_>> {
    let mut directives = Vec::new();
    let mut offset = 0;

    for raw_line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += raw_line.len();

        let line = raw_line.strip_suffix('\n').unwrap_or(raw_line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some((name, flags)) = parse_directive(line) {
            directives.push(Directive {
                line_start,
                body_start: offset,
                name,
                flags,
            });
        }
    }

    directives
}

/// Parse `// file: <name>[ <flags>]`.
///
/// Names may contain path separators, dots and hyphens; anything after the
/// first space following the name is the flag list.
fn parse_directive(line: &str) -> Option<(&str, Vec<&str>)> {
    let rest = line.strip_prefix(DIRECTIVE)?;
    let name_len = rest
        .find(|c: char| !is_name_char(c))
        .unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }

    let (name, tail) = rest.split_at(name_len);
    if tail.trim().is_empty() {
        return Some((name, Vec::new()));
    }

    let flags = tail.strip_prefix(' ')?;
    Some((name, flags.split_whitespace().collect()))
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/')
}
