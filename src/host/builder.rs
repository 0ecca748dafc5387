//! Builder pattern for `CompilationHost`.

use std::sync::Arc;

use super::core::CompilationHost;
use super::disk::{FileSystem, RealFs};
use super::node::NodeResolver;
use super::resolve::{ExternalResolutions, ModuleResolver, ResolutionCache};
use crate::options::CompilerOptions;

/// Builder for configuring [`CompilationHost`].
///
/// Use `CompilationHost::builder()` to create a builder.
///
/// ```ignore
/// let host = CompilationHost::builder(options)
///     .externals(settings.external_resolutions().clone())
///     .build();
/// ```
pub struct HostBuilder {
    options: CompilerOptions,
    fs: Arc<dyn FileSystem>,
    resolver: Option<Box<dyn ModuleResolver>>,
    externals: ExternalResolutions,
}

impl HostBuilder {
    pub(crate) fn new(options: CompilerOptions) -> Self {
        Self {
            options,
            fs: Arc::new(RealFs),
            resolver: None,
            externals: ExternalResolutions::new(),
        }
    }

    /// Use a different real file system (default: [`RealFs`]).
    pub fn file_system(mut self, fs: impl FileSystem + 'static) -> Self {
        self.fs = Arc::new(fs);
        self
    }

    /// Use a different ordinary resolver (default: [`NodeResolver`] built
    /// from the compiler options).
    pub fn resolver(mut self, resolver: impl ModuleResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Set the external redirect table.
    pub fn externals(mut self, externals: ExternalResolutions) -> Self {
        self.externals = externals;
        self
    }

    /// Build the host.
    pub fn build(self) -> CompilationHost {
        let resolver: Box<dyn ModuleResolver> = match self.resolver {
            Some(resolver) => resolver,
            None => Box::new(NodeResolver::from_options(&self.options)),
        };
        CompilationHost::new(
            self.options,
            self.fs,
            resolver,
            ResolutionCache::new(self.externals),
        )
    }
}
