//! Module resolution records and the resolution cache.
//!
//! The same imports appear in many snippets, so ordinary resolution outcomes
//! are memoized per `(containing file, module name)` for the lifetime of the
//! host. Failed resolutions are memoized as well.

use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

// =============================================================================
// Records
// =============================================================================

/// Identity of a package as seen by the compiler.
///
/// Two resolutions carrying the same `PackageId` are treated as the same
/// package, even if their files live at different paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageId {
    /// Package name, e.g. `@reduxjs/toolkit`.
    pub name: String,
    /// File inside the package, e.g. `dist/index.d.ts`.
    #[serde(default)]
    pub sub_module_name: String,
    /// Package version.
    pub version: String,
}

impl PackageId {
    /// Create a package identity.
    pub fn new(
        name: impl Into<String>,
        sub_module_name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            sub_module_name: sub_module_name.into(),
            version: version.into(),
        }
    }
}

/// A configured redirect for a module name.
///
/// Typically used to resolve the documented library to its own source tree
/// instead of a published build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalResolution {
    /// Real path to resolve instead of the module name.
    pub resolved_path: String,
    /// Identity attached to every resolution of this module.
    pub package_id: PackageId,
}

/// Redirect table keyed by module name.
pub type ExternalResolutions = IndexMap<String, ExternalResolution>;

/// Kind of a resolved file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    /// `.ts`
    Ts,
    /// `.tsx`
    Tsx,
    /// `.d.ts`
    Dts,
    /// `.js`
    Js,
    /// `.jsx`
    Jsx,
    /// `.json`
    Json,
}

impl Extension {
    /// Classify a file name, longest suffix first.
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with(".d.ts") {
            Some(Self::Dts)
        } else if name.ends_with(".ts") {
            Some(Self::Ts)
        } else if name.ends_with(".tsx") {
            Some(Self::Tsx)
        } else if name.ends_with(".js") {
            Some(Self::Js)
        } else if name.ends_with(".jsx") {
            Some(Self::Jsx)
        } else if name.ends_with(".json") {
            Some(Self::Json)
        } else {
            None
        }
    }

    /// The suffix including the leading dot.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ts => ".ts",
            Self::Tsx => ".tsx",
            Self::Dts => ".d.ts",
            Self::Js => ".js",
            Self::Jsx => ".jsx",
            Self::Json => ".json",
        }
    }
}

/// Outcome of a successful module resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    /// Resolved file name.
    pub resolved_file_name: String,
    /// Kind of the resolved file.
    pub extension: Extension,
    /// Resolved from a `node_modules` folder.
    pub is_external_library_import: bool,
    /// Package identity, when the file belongs to a package.
    pub package_id: Option<PackageId>,
}

impl ResolvedModule {
    /// A project-local resolution without package identity.
    pub fn local(resolved_file_name: impl Into<String>) -> Option<Self> {
        let resolved_file_name = resolved_file_name.into();
        let extension = Extension::from_file_name(&resolved_file_name)?;
        Some(Self {
            resolved_file_name,
            extension,
            is_external_library_import: false,
            package_id: None,
        })
    }
}

// =============================================================================
// Resolver seam
// =============================================================================

/// File queries available to a module resolver.
pub trait ModuleResolutionHost {
    /// Whether a file exists.
    fn file_exists(&self, path: &str) -> bool;

    /// Whether a directory exists.
    fn directory_exists(&self, path: &str) -> bool;

    /// Read a file's text.
    fn read_file(&self, path: &str) -> Option<std::sync::Arc<str>>;
}

/// Ordinary (uncached) module resolution.
pub trait ModuleResolver: Send + Sync {
    /// Resolve `module_name` as imported from `containing_file`.
    fn resolve(
        &self,
        module_name: &str,
        containing_file: &str,
        host: &dyn ModuleResolutionHost,
    ) -> Option<ResolvedModule>;
}

// =============================================================================
// ResolutionCache
// =============================================================================

/// Cache hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    /// Lookups answered from the memo.
    pub hits: usize,
    /// Lookups that ran the resolver.
    pub misses: usize,
}

/// Memoized resolutions plus the external redirect table.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    externals: ExternalResolutions,
    memo: RwLock<FxHashMap<(String, String), Option<ResolvedModule>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl ResolutionCache {
    /// Create a cache with the given redirect table.
    pub fn new(externals: ExternalResolutions) -> Self {
        Self {
            externals,
            ..Self::default()
        }
    }

    /// Configured redirect for a module name.
    pub fn external(&self, module_name: &str) -> Option<&ExternalResolution> {
        self.externals.get(module_name)
    }

    /// The redirect table.
    pub fn externals(&self) -> &ExternalResolutions {
        &self.externals
    }

    /// Return the memoized outcome, or compute and store it.
    pub fn get_or_resolve(
        &self,
        containing_file: &str,
        module_name: &str,
        resolve: impl FnOnce() -> Option<ResolvedModule>,
    ) -> Option<ResolvedModule> {
        let key = (containing_file.to_owned(), module_name.to_owned());
        if let Some(cached) = self.memo.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(containing_file, module_name, "resolution cache hit");
            return cached.clone();
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let resolved = resolve();
        tracing::trace!(
            containing_file,
            module_name,
            resolved = resolved.as_ref().map(|r| r.resolved_file_name.as_str()),
            "resolution cache miss"
        );
        self.memo.write().insert(key, resolved.clone());
        resolved
    }

    /// Current hit/miss counters.
    pub fn stats(&self) -> ResolutionStats {
        ResolutionStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Number of memoized pairs.
    pub fn len(&self) -> usize {
        self.memo.read().len()
    }

    /// Whether nothing is memoized.
    pub fn is_empty(&self) -> bool {
        self.memo.read().is_empty()
    }
}
