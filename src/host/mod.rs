//! Compilation host: overlay file system and module resolution.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     CompilationHost                       │
//! ├───────────────────────────────────────────────────────────┤
//! │  read_file(path)                                          │
//! │     ├─► Overlay (virtual snippet files, versioned)        │
//! │     └─► DiskCache ─► FileSystem (RealFs)                  │
//! │                                                           │
//! │  resolve_module_names(names, containing)                  │
//! │     ├─► external redirect table (+ PackageId)             │
//! │     ├─► snippet-relative (virtual containing file)        │
//! │     └─► ResolutionCache ─► ModuleResolver (NodeResolver)  │
//! └───────────────────────────────────────────────────────────┘
//! ```

mod builder;
mod core;
mod disk;
mod node;
mod overlay;
mod path;
mod resolve;

pub use builder::HostBuilder;
pub use self::core::CompilationHost;
pub use disk::{decode_utf8, disk_version, DiskCache, FileSystem, RealFs, UNKNOWN_VERSION};
pub use node::NodeResolver;
pub(crate) use node::split_package_name;
pub use overlay::{Overlay, OverlayEntry};
pub use path::{is_relative_specifier, join, normalize_path, parent_dir};
pub use resolve::{
    Extension, ExternalResolution, ExternalResolutions, ModuleResolutionHost, ModuleResolver,
    PackageId, ResolutionCache, ResolutionStats, ResolvedModule,
};
