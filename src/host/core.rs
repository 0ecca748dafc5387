//! `CompilationHost`: the overlay file system presented to the compiler.
//!
//! Virtual files written by the driver shadow real files at the same path.
//! Everything else is read from disk through a monotonic cache.
//!
//! # Module resolution
//!
//! Per `(module name, containing file)`, in order:
//!
//! 1. **External redirect**: the name is in the configured table. The
//!    configured path is resolved instead and the configured [`PackageId`]
//!    is attached. Not finding it is a fatal [`HostError`].
//! 2. **Snippet-relative**: a relative specifier imported from a virtual
//!    file is resolved against the snippet folder only. Never memoized,
//!    since snippet contents change from block to block.
//! 3. **Ordinary**: delegated to the [`ModuleResolver`], memoized in the
//!    [`ResolutionCache`].
//!
//! Paths are normalized before any lookup, so `/a/./b.ts` and `/a/b.ts`
//! share one overlay entry, one disk cache entry and one version.
//!
//! [`PackageId`]: super::PackageId

use std::sync::Arc;

use super::builder::HostBuilder;
use super::disk::{disk_version, DiskCache, FileSystem};
use super::node::resolve_file_or_directory;
use super::overlay::Overlay;
use super::path::{is_relative_specifier, join, normalize_path, parent_dir};
use super::resolve::{
    ExternalResolution, ModuleResolutionHost, ModuleResolver, ResolutionCache, ResolutionStats,
    ResolvedModule,
};
use crate::options::CompilerOptions;
use crate::service::{HostError, ServiceHost};

/// Merged view of virtual and real files, plus resolution rules.
pub struct CompilationHost {
    options: CompilerOptions,
    fs: Arc<dyn FileSystem>,
    resolver: Box<dyn ModuleResolver>,
    overlay: Overlay,
    script_file_names: Vec<String>,
    resolutions: ResolutionCache,
    disk: DiskCache,
}

impl CompilationHost {
    /// Create a builder.
    pub fn builder(options: CompilerOptions) -> HostBuilder {
        HostBuilder::new(options)
    }

    pub(crate) fn new(
        options: CompilerOptions,
        fs: Arc<dyn FileSystem>,
        resolver: Box<dyn ModuleResolver>,
        resolutions: ResolutionCache,
    ) -> Self {
        Self {
            options,
            fs,
            resolver,
            overlay: Overlay::new(),
            script_file_names: Vec::new(),
            resolutions,
            disk: DiskCache::new(),
        }
    }

    // =========================================================================
    // Overlay
    // =========================================================================

    /// Write a virtual file; the version changes only if the text does.
    pub fn write_file(&mut self, path: &str, contents: &str) -> u64 {
        self.overlay.write(path, contents)
    }

    /// Replace the active compilation set.
    pub fn set_script_file_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.script_file_names = names
            .into_iter()
            .map(|name| normalize_path(name.as_ref()))
            .collect();
    }

    /// Whether a path is a virtual file.
    pub fn is_virtual(&self, path: &str) -> bool {
        self.overlay.contains(path)
    }

    /// The virtual files written so far.
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Resolution cache counters.
    pub fn resolution_stats(&self) -> ResolutionStats {
        self.resolutions.stats()
    }

    /// Number of files read from disk and cached.
    pub fn cached_disk_reads(&self) -> usize {
        self.disk.len()
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    fn resolve_module_name(
        &self,
        module_name: &str,
        containing_file: &str,
    ) -> Result<Option<ResolvedModule>, HostError> {
        if let Some(external) = self.resolutions.external(module_name) {
            return self
                .resolve_external(module_name, external, containing_file)
                .map(Some);
        }

        if is_relative_specifier(module_name) && self.is_virtual(containing_file) {
            let candidate = join(parent_dir(&normalize_path(containing_file)), module_name);
            return Ok(resolve_file_or_directory(&candidate, self).and_then(ResolvedModule::local));
        }

        Ok(self
            .resolutions
            .get_or_resolve(containing_file, module_name, || {
                self.resolver.resolve(module_name, containing_file, self)
            }))
    }

    fn resolve_external(
        &self,
        module_name: &str,
        external: &ExternalResolution,
        containing_file: &str,
    ) -> Result<ResolvedModule, HostError> {
        let resolved = self
            .resolver
            .resolve(&external.resolved_path, containing_file, self)
            .ok_or_else(|| HostError::ExternalResolution {
                module: module_name.to_owned(),
                resolved_path: external.resolved_path.clone(),
            })?;

        Ok(ResolvedModule {
            is_external_library_import: false,
            package_id: Some(external.package_id.clone()),
            ..resolved
        })
    }
}

// =============================================================================
// ServiceHost Implementation
// =============================================================================

impl ModuleResolutionHost for CompilationHost {
    fn file_exists(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.overlay.contains(&path) || self.fs.file_exists(&path)
    }

    fn directory_exists(&self, path: &str) -> bool {
        let path = normalize_path(path);
        let prefix = format!("{}/", path.trim_end_matches('/'));
        self.script_file_names
            .iter()
            .any(|name| name.starts_with(&prefix))
            || self.fs.directory_exists(&path)
    }

    fn read_file(&self, path: &str) -> Option<Arc<str>> {
        let path = normalize_path(path);
        match self.overlay.get(&path) {
            Some(entry) => Some(Arc::clone(&entry.contents)),
            None => self.disk.read(self.fs.as_ref(), &path),
        }
    }
}

impl ServiceHost for CompilationHost {
    fn compilation_settings(&self) -> &CompilerOptions {
        &self.options
    }

    fn script_file_names(&self) -> &[String] {
        &self.script_file_names
    }

    fn script_version(&self, file_name: &str) -> String {
        let file_name = normalize_path(file_name);
        match self.overlay.get(&file_name) {
            Some(entry) => entry.version.to_string(),
            None => disk_version(self.fs.as_ref(), &file_name),
        }
    }

    fn resolve_module_names(
        &self,
        module_names: &[&str],
        containing_file: &str,
    ) -> Result<Vec<Option<ResolvedModule>>, HostError> {
        module_names
            .iter()
            .map(|name| self.resolve_module_name(name, containing_file))
            .collect()
    }
}
