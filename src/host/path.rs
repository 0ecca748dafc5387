//! Path utilities.
//!
//! Compiler file names are `/`-separated strings. Virtual folders never exist
//! on disk, so normalization is purely lexical.

/// Normalize a file name lexically.
///
/// Converts `\` to `/`, collapses repeated separators and resolves `.` and
/// `..` segments. A leading `/` is preserved.
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let absolute = path.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_owned()
    } else {
        joined
    }
}

/// Directory part of a file name (`"/a/b.ts"` → `"/a"`).
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(i) => &path[..i],
        None => ".",
    }
}

/// Join a relative specifier onto a directory and normalize.
pub fn join(dir: &str, relative: &str) -> String {
    if relative.starts_with('/') {
        normalize_path(relative)
    } else {
        normalize_path(&format!("{dir}/{relative}"))
    }
}

/// Whether a module specifier is relative (`./x`, `../x`, `.`, `..`).
pub fn is_relative_specifier(name: &str) -> bool {
    name == "." || name == ".." || name.starts_with("./") || name.starts_with("../")
}
