//! Compiler settings.
//!
//! A [`CompilerSettings`] value describes one compiler configuration: the
//! `tsconfig.json` to load, the external module redirects, an optional
//! rewrite of snippet folders and the post-processing applied to the typed
//! and compiled variants of a block. Each built settings value carries a unique
//! [`SettingsId`]; the [`CompilerRegistry`](crate::CompilerRegistry) keeps one
//! compiler per id. Clones share the id.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::diagnostic::CompileError;
use crate::host::{ExternalResolution, ExternalResolutions};
use crate::options::CompilerOptions;
use crate::snippet::{post_process_transpiled, post_process_typed, VirtualFiles};

static NEXT_SETTINGS_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a settings value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SettingsId(u64);

/// Rewrites a document path before it becomes a snippet folder root.
pub type FolderRewrite = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Turns the files of one block into the files to render.
///
/// Receives the block's files and the path of the document the block
/// belongs to.
pub type PostProcessor = Arc<dyn Fn(&VirtualFiles, &str) -> VirtualFiles + Send + Sync>;

/// One compiler configuration.
#[derive(Clone)]
pub struct CompilerSettings {
    id: SettingsId,
    tsconfig: Option<PathBuf>,
    options: Option<CompilerOptions>,
    external_resolutions: ExternalResolutions,
    rewrite_folder: Option<FolderRewrite>,
    post_process_typed: Option<PostProcessor>,
    post_process_transpiled: Option<PostProcessor>,
}

impl CompilerSettings {
    /// Create a builder.
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Settings loading options from a `tsconfig.json`.
    pub fn from_tsconfig(path: impl Into<PathBuf>) -> Self {
        Self::builder().tsconfig(path).build()
    }

    /// Identity used to share compilers.
    pub fn id(&self) -> SettingsId {
        self.id
    }

    /// Configured `tsconfig.json`, if any.
    pub fn tsconfig(&self) -> Option<&Path> {
        self.tsconfig.as_deref()
    }

    /// External redirect table.
    pub fn external_resolutions(&self) -> &ExternalResolutions {
        &self.external_resolutions
    }

    /// Apply the folder rewrite, if configured.
    pub fn virtual_root(&self, document_path: &str) -> String {
        match &self.rewrite_folder {
            Some(rewrite) => rewrite(document_path),
            None => document_path.to_owned(),
        }
    }

    /// Post-process the typed variant of a block of `document`.
    ///
    /// Defaults to [`post_process_typed`].
    pub fn process_typed(&self, files: &VirtualFiles, document: &str) -> VirtualFiles {
        match &self.post_process_typed {
            Some(process) => process(files, document),
            None => post_process_typed(files),
        }
    }

    /// Post-process the compiled variant of a block of `document`.
    ///
    /// Defaults to [`post_process_transpiled`].
    pub fn process_transpiled(&self, files: &VirtualFiles, document: &str) -> VirtualFiles {
        match &self.post_process_transpiled {
            Some(process) => process(files, document),
            None => post_process_transpiled(files),
        }
    }

    /// Resolve the compiler options.
    ///
    /// Inline options win over the `tsconfig.json`; with neither, defaults
    /// are used.
    pub fn load_options(&self) -> Result<CompilerOptions, CompileError> {
        match (&self.options, &self.tsconfig) {
            (Some(options), _) => Ok(options.clone()),
            (None, Some(path)) => CompilerOptions::load(path),
            (None, None) => Ok(CompilerOptions::default()),
        }
    }
}

impl fmt::Debug for CompilerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerSettings")
            .field("id", &self.id)
            .field("tsconfig", &self.tsconfig)
            .field("options", &self.options)
            .field("external_resolutions", &self.external_resolutions)
            .field("rewrite_folder", &self.rewrite_folder.is_some())
            .field("post_process_typed", &self.post_process_typed.is_some())
            .field("post_process_transpiled", &self.post_process_transpiled.is_some())
            .finish()
    }
}

/// Builder for [`CompilerSettings`].
#[derive(Default)]
pub struct SettingsBuilder {
    tsconfig: Option<PathBuf>,
    options: Option<CompilerOptions>,
    external_resolutions: ExternalResolutions,
    rewrite_folder: Option<FolderRewrite>,
    post_process_typed: Option<PostProcessor>,
    post_process_transpiled: Option<PostProcessor>,
}

impl SettingsBuilder {
    /// Load compiler options from this `tsconfig.json`.
    pub fn tsconfig(mut self, path: impl Into<PathBuf>) -> Self {
        self.tsconfig = Some(path.into());
        self
    }

    /// Use these compiler options instead of a `tsconfig.json`.
    pub fn options(mut self, options: CompilerOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Redirect `module_name` to another path with a fixed package identity.
    ///
    /// # Example
    ///
    /// ```
    /// use snippet_batch::config::CompilerSettings;
    /// use snippet_batch::host::{ExternalResolution, PackageId};
    ///
    /// let settings = CompilerSettings::builder()
    ///     .tsconfig("docs/tsconfig.json")
    ///     .external(
    ///         "@reduxjs/toolkit",
    ///         ExternalResolution {
    ///             resolved_path: "/repo/src".into(),
    ///             package_id: PackageId::new(
    ///                 "@reduxjs/toolkit",
    ///                 "dist/typings.d.ts",
    ///                 "99.0.0",
    ///             ),
    ///         },
    ///     )
    ///     .build();
    /// assert_eq!(settings.external_resolutions().len(), 1);
    /// ```
    pub fn external(
        mut self,
        module_name: impl Into<String>,
        resolution: ExternalResolution,
    ) -> Self {
        self.external_resolutions.insert(module_name.into(), resolution);
        self
    }

    /// Replace the whole redirect table.
    pub fn externals(mut self, externals: ExternalResolutions) -> Self {
        self.external_resolutions = externals;
        self
    }

    /// Rewrite document paths before they become snippet folder roots, so
    /// resolution behaves as if snippets lived elsewhere.
    pub fn rewrite_folder<F>(mut self, rewrite: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.rewrite_folder = Some(Arc::new(rewrite));
        self
    }

    /// Replace the post-processing of the typed variant.
    pub fn post_process_typed<F>(mut self, process: F) -> Self
    where
        F: Fn(&VirtualFiles, &str) -> VirtualFiles + Send + Sync + 'static,
    {
        self.post_process_typed = Some(Arc::new(process));
        self
    }

    /// Replace the post-processing of the compiled variant.
    pub fn post_process_transpiled<F>(mut self, process: F) -> Self
    where
        F: Fn(&VirtualFiles, &str) -> VirtualFiles + Send + Sync + 'static,
    {
        self.post_process_transpiled = Some(Arc::new(process));
        self
    }

    /// Build the settings, assigning a fresh identity.
    pub fn build(self) -> CompilerSettings {
        CompilerSettings {
            id: SettingsId(NEXT_SETTINGS_ID.fetch_add(1, Ordering::Relaxed)),
            tsconfig: self.tsconfig,
            options: self.options,
            external_resolutions: self.external_resolutions,
            rewrite_folder: self.rewrite_folder,
            post_process_typed: self.post_process_typed,
            post_process_transpiled: self.post_process_transpiled,
        }
    }
}
