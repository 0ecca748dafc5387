//! Versioned in-memory files layered over the real file system.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::path::normalize_path;

/// One virtual file.
#[derive(Debug, Clone)]
pub struct OverlayEntry {
    /// Current text.
    pub contents: Arc<str>,
    /// Bumped only when `contents` actually changes.
    pub version: u64,
}

/// Virtual files keyed by normalized path.
///
/// The version is what the compiler uses to decide whether a file must be
/// re-analyzed, so writing identical text keeps the version unchanged.
#[derive(Debug, Default)]
pub struct Overlay {
    entries: FxHashMap<String, OverlayEntry>,
}

impl Overlay {
    /// Create an empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a file, returning its (possibly unchanged) version.
    pub fn write(&mut self, path: &str, contents: &str) -> u64 {
        let path = normalize_path(path);
        match self.entries.get_mut(&path) {
            Some(entry) if &*entry.contents == contents => entry.version,
            Some(entry) => {
                entry.contents = contents.into();
                entry.version += 1;
                entry.version
            }
            None => {
                self.entries.insert(
                    path,
                    OverlayEntry {
                        contents: contents.into(),
                        version: 1,
                    },
                );
                1
            }
        }
    }

    /// Look up a file.
    pub fn get(&self, path: &str) -> Option<&OverlayEntry> {
        self.entries.get(&normalize_path(path))
    }

    /// Whether a file is present.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Number of virtual files ever written.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no file has been written.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_write_is_version_one() {
        let mut overlay = Overlay::new();
        assert_eq!(overlay.write("/docs/a.md/codeBlock_1/index.ts", "let a = 1"), 1);
        assert!(overlay.contains("/docs/a.md/codeBlock_1/index.ts"));
    }

    #[test]
    fn test_version_bumps_only_on_change() {
        let mut overlay = Overlay::new();
        overlay.write("/v/a.ts", "one");
        assert_eq!(overlay.write("/v/a.ts", "one"), 1);
        assert_eq!(overlay.write("/v/a.ts", "two"), 2);
        assert_eq!(overlay.write("/v/a.ts", "two"), 2);
        assert_eq!(overlay.write("/v/a.ts", "one"), 3);
        assert_eq!(&*overlay.get("/v/a.ts").unwrap().contents, "one");
    }

    #[test]
    fn test_paths_are_normalized() {
        let mut overlay = Overlay::new();
        overlay.write("/v/./sub/../a.ts", "x");
        assert!(overlay.contains("/v/a.ts"));
        assert_eq!(overlay.len(), 1);
    }
}
