//! Reassembly of virtual files into a single code block.

use super::split::DIRECTIVE;
use super::VirtualFile;

/// Join files back into code block text.
///
/// Skipped files are dropped. A single remaining file is returned verbatim;
/// several files are each prefixed with a `// file:` directive relative to
/// `folder`, trimmed, and separated by two blank lines.
pub fn rearrange_files<'a, I>(files: I, folder: &str) -> String
where
    I: IntoIterator<Item = &'a VirtualFile>,
{
    let visible: Vec<&VirtualFile> = files.into_iter().filter(|file| !file.skip).collect();

    if let [only] = visible.as_slice() {
        return only.code.clone();
    }

    let prefix = format!("{folder}/");
    visible
        .iter()
        .map(|file| {
            let name = file.path.strip_prefix(&prefix).unwrap_or(&file.path);
            format!("{DIRECTIVE}{name}\n{}", file.code.trim())
        })
        .collect::<Vec<_>>()
        .join("\n\n\n")
}
