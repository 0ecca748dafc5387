//! Real file system access and the disk read cache.
//!
//! ```text
//! CompilationHost::read_file(path)
//!     │
//!     ├─► Overlay hit → virtual contents
//!     │
//!     └─► DiskCache::read(fs, path)
//!             ├─► cached → shared Arc<str>
//!             └─► FileSystem::read_to_string → cache on success
//! ```
//!
//! Disk contents are assumed not to change during a documentation build, so
//! successful reads are cached for the lifetime of the host. Failed reads are
//! not cached.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

// =============================================================================
// FileSystem
// =============================================================================

/// Capability to query the real file system.
///
/// Paths are `/`-separated file names as used by the compiler.
pub trait FileSystem: Send + Sync {
    /// Whether a regular file exists at `path`.
    fn file_exists(&self, path: &str) -> bool;

    /// Whether a directory exists at `path`.
    fn directory_exists(&self, path: &str) -> bool;

    /// Read a file as UTF-8 text, or `None` if it cannot be read.
    fn read_to_string(&self, path: &str) -> Option<String>;

    /// Modification time of a file, if available.
    fn modified(&self, path: &str) -> Option<DateTime<Utc>>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn file_exists(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn directory_exists(&self, path: &str) -> bool {
        Path::new(path).is_dir()
    }

    fn read_to_string(&self, path: &str) -> Option<String> {
        let bytes = fs::read(path).ok()?;
        decode_utf8(&bytes).map(str::to_owned)
    }

    fn modified(&self, path: &str) -> Option<DateTime<Utc>> {
        let time = fs::metadata(path).and_then(|m| m.modified()).ok()?;
        Some(DateTime::<Utc>::from(time))
    }
}

/// Decode bytes as UTF-8, stripping BOM if present.
pub fn decode_utf8(buf: &[u8]) -> Option<&str> {
    let buf = buf.strip_prefix(b"\xef\xbb\xbf").unwrap_or(buf);
    std::str::from_utf8(buf).ok()
}

/// Version token for a file that is not in the overlay.
///
/// Uses the modification time when available, otherwise a constant: such a
/// file is then never re-analyzed until the host is recreated.
pub fn disk_version(fs: &dyn FileSystem, path: &str) -> String {
    fs.modified(path).map_or_else(
        || UNKNOWN_VERSION.to_owned(),
        |time| time.to_rfc3339_opts(SecondsFormat::Nanos, true),
    )
}

/// Version reported for disk files without a modification time.
pub const UNKNOWN_VERSION: &str = "unknown, will not update without restart";

// =============================================================================
// DiskCache
// =============================================================================

/// Monotonic cache of successful disk reads.
#[derive(Default)]
pub struct DiskCache {
    reads: RwLock<FxHashMap<String, Arc<str>>>,
}

impl DiskCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read through the cache.
    pub fn read(&self, fs: &dyn FileSystem, path: &str) -> Option<Arc<str>> {
        if let Some(text) = self.reads.read().get(path) {
            return Some(Arc::clone(text));
        }

        let text: Arc<str> = fs.read_to_string(path)?.into();
        tracing::trace!(path, "cached disk read");
        self.reads
            .write()
            .insert(path.to_owned(), Arc::clone(&text));
        Some(text)
    }

    /// Number of cached files.
    pub fn len(&self) -> usize {
        self.reads.read().len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.reads.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn file_name(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().replace('\\', "/")
    }

    #[test]
    fn test_decode_utf8_strips_bom() {
        let mut bytes = vec![0xef, 0xbb, 0xbf];
        bytes.extend_from_slice(b"export {}");
        assert_eq!(decode_utf8(&bytes), Some("export {}"));
        assert_eq!(decode_utf8(&[0xff, 0xfe]), None);
    }

    #[test]
    fn test_real_fs() {
        let dir = TempDir::new().unwrap();
        let path = file_name(&dir, "a.ts");
        fs::write(&path, "export const a = 1").unwrap();

        assert!(RealFs.file_exists(&path));
        assert!(!RealFs.file_exists(&file_name(&dir, "missing.ts")));
        assert!(RealFs.directory_exists(&dir.path().to_string_lossy()));
        assert!(!RealFs.directory_exists(&path));
        assert_eq!(RealFs.read_to_string(&path).as_deref(), Some("export const a = 1"));
        assert!(RealFs.modified(&path).is_some());
    }

    #[test]
    fn test_disk_cache_keeps_first_read() {
        let dir = TempDir::new().unwrap();
        let path = file_name(&dir, "a.ts");
        fs::write(&path, "first").unwrap();

        let cache = DiskCache::new();
        assert_eq!(cache.read(&RealFs, &path).as_deref(), Some("first"));

        fs::write(&path, "second").unwrap();
        assert_eq!(cache.read(&RealFs, &path).as_deref(), Some("first"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_disk_cache_does_not_cache_failures() {
        let dir = TempDir::new().unwrap();
        let path = file_name(&dir, "late.ts");

        let cache = DiskCache::new();
        assert!(cache.read(&RealFs, &path).is_none());
        assert!(cache.is_empty());

        fs::write(&path, "now here").unwrap();
        assert_eq!(cache.read(&RealFs, &path).as_deref(), Some("now here"));
    }

    #[test]
    fn test_disk_version() {
        let dir = TempDir::new().unwrap();
        let path = file_name(&dir, "a.ts");
        fs::write(&path, "x").unwrap();

        assert_ne!(disk_version(&RealFs, &path), UNKNOWN_VERSION);
        assert_eq!(disk_version(&RealFs, &file_name(&dir, "nope.ts")), UNKNOWN_VERSION);
    }
}
