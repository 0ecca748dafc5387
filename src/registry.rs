//! One long-lived compiler per configuration.
//!
//! Creating a compiler means loading `tsconfig.json` and starting a fresh
//! service, so compilers are created lazily and kept until disposed. All
//! code blocks compiled with the same [`CompilerSettings`] (same
//! [`SettingsId`]) share one compiler and its incremental state.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = CompilerRegistry::new(|options: &CompilerOptions| TsService::new(options));
//! let compiler = registry.compiler(&settings)?;
//! let transpiled = compiler.compile(&files)?;
//! ```

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

use crate::compile::Compiler;
use crate::config::{CompilerSettings, SettingsId};
use crate::diagnostic::CompileError;
use crate::service::ServiceFactory;

/// Lazily created compilers keyed by settings identity.
pub struct CompilerRegistry<F: ServiceFactory> {
    factory: F,
    compilers: FxHashMap<SettingsId, Compiler<F::Service>>,
}

impl<F: ServiceFactory> CompilerRegistry<F> {
    /// Create an empty registry.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            compilers: FxHashMap::default(),
        }
    }

    /// The compiler for `settings`, created on first use.
    ///
    /// A configuration error is returned as-is and nothing is cached, so a
    /// fixed `tsconfig.json` is picked up on the next call.
    pub fn compiler(
        &mut self,
        settings: &CompilerSettings,
    ) -> Result<&mut Compiler<F::Service>, CompileError> {
        match self.compilers.entry(settings.id()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let compiler = Compiler::from_settings(settings, &self.factory)?;
                tracing::debug!(
                    id = ?settings.id(),
                    tsconfig = ?settings.tsconfig(),
                    externals = settings.external_resolutions().len(),
                    "created compiler"
                );
                Ok(entry.insert(compiler))
            }
        }
    }

    /// Whether a compiler exists for this identity.
    pub fn contains(&self, id: SettingsId) -> bool {
        self.compilers.contains_key(&id)
    }

    /// Number of live compilers.
    pub fn len(&self) -> usize {
        self.compilers.len()
    }

    /// Whether no compiler has been created yet.
    pub fn is_empty(&self) -> bool {
        self.compilers.is_empty()
    }

    /// Drop the compiler for one configuration.
    pub fn dispose(&mut self, id: SettingsId) -> bool {
        self.compilers.remove(&id).is_some()
    }

    /// Drop all compilers.
    pub fn clear(&mut self) {
        self.compilers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompilerOptions;
    use crate::snippet::split_files;
    use crate::testing::ScriptedService;
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_one_compiler_per_settings() {
        let created = Cell::new(0);
        let mut registry = CompilerRegistry::new(|_: &CompilerOptions| {
            created.set(created.get() + 1);
            ScriptedService::default()
        });

        let settings = CompilerSettings::builder().build();
        let same = settings.clone();
        let other = CompilerSettings::builder().build();

        registry.compiler(&settings).unwrap();
        registry.compiler(&same).unwrap();
        assert_eq!(created.get(), 1);

        registry.compiler(&other).unwrap();
        assert_eq!(created.get(), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_state_shared_between_blocks() {
        let mut registry = CompilerRegistry::new(|_: &CompilerOptions| ScriptedService::default());
        let settings = CompilerSettings::builder().build();
        let files = split_files("let a = 1\n", "/docs/a.md/codeBlock_1");

        registry.compiler(&settings).unwrap().compile(&files).unwrap();
        let compiler = registry.compiler(&settings).unwrap();
        compiler.compile(&files).unwrap();
        assert_eq!(compiler.service().analyses(), 1);
    }

    #[test]
    fn test_configuration_error_not_cached() {
        let dir = TempDir::new().unwrap();
        let tsconfig = dir.path().join("tsconfig.json");
        let settings = CompilerSettings::from_tsconfig(&tsconfig);
        let mut registry = CompilerRegistry::new(|_: &CompilerOptions| ScriptedService::default());

        let err = registry.compiler(&settings).err().unwrap();
        assert!(matches!(err, CompileError::NotFound(_)));
        assert!(registry.is_empty());

        fs::write(&tsconfig, "{}").unwrap();
        assert!(registry.compiler(&settings).is_ok());
        assert!(registry.contains(settings.id()));
    }

    #[test]
    fn test_dispose() {
        let mut registry = CompilerRegistry::new(|_: &CompilerOptions| ScriptedService::default());
        let settings = CompilerSettings::builder().build();
        registry.compiler(&settings).unwrap();

        assert!(registry.dispose(settings.id()));
        assert!(!registry.dispose(settings.id()));

        registry.compiler(&settings).unwrap();
        registry.clear();
        assert!(registry.is_empty());
    }
}
