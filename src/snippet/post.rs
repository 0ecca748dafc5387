//! Default post-processing for the two rendered variants.

use super::{VirtualFile, VirtualFiles};

const TS_DIRECTIVES: [&str; 2] = ["// @ts-ignore", "// @ts-expect-error"];

/// Post-process the typed variant: trim each file.
pub fn post_process_typed(files: &VirtualFiles) -> VirtualFiles {
    files
        .iter()
        .map(|(path, file)| {
            let file = VirtualFile {
                code: file.code.trim().to_owned(),
                ..file.clone()
            };
            (path.clone(), file)
        })
        .collect()
}

/// Post-process the compiled variant.
///
/// Removes `@ts-ignore` / `@ts-expect-error` comments (meaningless without
/// types), trims each file and renames `.ts`/`.tsx` paths to `.js`/`.jsx`.
pub fn post_process_transpiled(files: &VirtualFiles) -> VirtualFiles {
    files
        .values()
        .map(|file| {
            let path = to_js_file_name(&file.path);
            let file = VirtualFile {
                path: path.clone(),
                code: strip_ts_directives(&file.code).trim().to_owned(),
                skip: file.skip,
            };
            (path, file)
        })
        .collect()
}

/// Remove TypeScript directive comments.
///
/// A comment on its own line is removed together with the line break and
/// indentation preceding it; a trailing comment after code only loses the
/// comment itself.
pub fn strip_ts_directives(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut rest = code;

    while let Some(pos) = find_ts_directive(rest) {
        let (before, after) = rest.split_at(pos);
        let code_end = before.trim_end().len();
        let keep = match before[code_end..].find('\n') {
            Some(newline) => &before[..code_end + newline],
            None => before,
        };
        out.push_str(keep);

        let line_end = after.find('\n').unwrap_or(after.len());
        rest = &after[line_end..];
    }

    out.push_str(rest);
    out
}

fn find_ts_directive(code: &str) -> Option<usize> {
    TS_DIRECTIVES.iter().filter_map(|d| code.find(d)).min()
}

/// Map a TypeScript file name to its emitted JavaScript name.
pub fn to_js_file_name(path: &str) -> String {
    if let Some(stem) = path.strip_suffix(".tsx") {
        format!("{stem}.jsx")
    } else if let Some(stem) = path.strip_suffix(".ts") {
        format!("{stem}.js")
    } else {
        path.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_own_line_directive() {
        let code = "const a = 1\n  // @ts-ignore\n  foo(a)\n";
        assert_eq!(strip_ts_directives(code), "const a = 1\n  foo(a)\n");
    }

    #[test]
    fn test_strip_directive_with_blank_lines_before() {
        let code = "a()\n\n// @ts-expect-error wrong on purpose\nb()";
        assert_eq!(strip_ts_directives(code), "a()\nb()");
    }

    #[test]
    fn test_strip_trailing_directive() {
        let code = "call() // @ts-ignore\nnext()";
        assert_eq!(strip_ts_directives(code), "call() \nnext()");
    }

    #[test]
    fn test_strip_leading_directive() {
        assert_eq!(strip_ts_directives("// @ts-ignore\nx()"), "\nx()");
    }

    #[test]
    fn test_js_file_names() {
        assert_eq!(to_js_file_name("/f/codeBlock_1/index.ts"), "/f/codeBlock_1/index.js");
        assert_eq!(to_js_file_name("/f/codeBlock_1/App.tsx"), "/f/codeBlock_1/App.jsx");
        assert_eq!(to_js_file_name("/f/codeBlock_1/data.json"), "/f/codeBlock_1/data.json");
    }

    #[test]
    fn test_post_process_transpiled() {
        let mut files = VirtualFiles::new();
        files.insert(
            "/f/a.ts".into(),
            VirtualFile::new("/f/a.ts", "\n// @ts-ignore\nlet a = f()\n"),
        );

        let processed = post_process_transpiled(&files);
        let file = &processed["/f/a.js"];
        assert_eq!(file.path, "/f/a.js");
        assert_eq!(file.code, "let a = f()");
    }

    #[test]
    fn test_post_process_typed_keeps_paths() {
        let mut files = VirtualFiles::new();
        files.insert("/f/a.ts".into(), VirtualFile::new("/f/a.ts", "  let a = 1\n\n").skipped());

        let processed = post_process_typed(&files);
        assert_eq!(processed["/f/a.ts"].code, "let a = 1");
        assert!(processed["/f/a.ts"].skip);
    }
}
