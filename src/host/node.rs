//! Node-style module resolution for TypeScript sources.
//!
//! ```text
//! "./x" | "/abs/x"      → <dir>/x{.ts,.tsx,.d.ts}  → <dir>/x/package.json types → <dir>/x/index.*
//! "pkg" | "pkg/sub"     → paths patterns → <baseUrl>/pkg → walk up: node_modules/pkg[/sub],
//!                         node_modules/@types/pkg
//! ```

use serde::Deserialize;

use super::path::{is_relative_specifier, join, normalize_path, parent_dir};
use super::resolve::{Extension, ModuleResolutionHost, ModuleResolver, PackageId, ResolvedModule};
use crate::options::CompilerOptions;

/// Extensions tried, in order, when a specifier has none.
const EXTENSIONS: [Extension; 3] = [Extension::Ts, Extension::Tsx, Extension::Dts];

/// The subset of `package.json` used for resolution.
#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    types: Option<String>,
    typings: Option<String>,
}

/// Package context while resolving inside `node_modules`.
struct PackageScope<'a> {
    root: &'a str,
    manifest: PackageJson,
}

/// One `paths` entry, with substitutions already joined to their base.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathMapping {
    pattern: String,
    substitutions: Vec<String>,
}

impl PathMapping {
    /// Text matched by `*`, or `""` for an exact pattern.
    fn matches<'n>(&self, module_name: &'n str) -> Option<&'n str> {
        match self.pattern.split_once('*') {
            None => (self.pattern == module_name).then_some(""),
            Some((prefix, suffix)) => module_name.strip_prefix(prefix)?.strip_suffix(suffix),
        }
    }

    /// Exact patterns beat any wildcard; among wildcards the longest prefix wins.
    fn specificity(&self) -> usize {
        match self.pattern.split_once('*') {
            None => usize::MAX,
            Some((prefix, _)) => prefix.len(),
        }
    }
}

/// Default [`ModuleResolver`].
///
/// Non-relative names go through the `paths` patterns, then `baseUrl`,
/// then the `node_modules` folders.
#[derive(Debug, Clone, Default)]
pub struct NodeResolver {
    base_url: Option<String>,
    paths: Vec<PathMapping>,
}

impl NodeResolver {
    /// Resolver honoring the `baseUrl` and `paths` compiler options.
    ///
    /// `paths` substitutions are relative to `baseUrl`, or to the directory
    /// of the `tsconfig.json` when `baseUrl` is absent.
    pub fn from_options(options: &CompilerOptions) -> Self {
        let base_url = options
            .base_url()
            .map(|url| normalize_path(&url.to_string_lossy()));
        let paths_base = base_url.clone().or_else(|| {
            options
                .config_dir()
                .map(|dir| normalize_path(&dir.to_string_lossy()))
        });

        let mappings = options.paths();
        let paths = match paths_base {
            Some(base) => mappings
                .into_iter()
                .map(|(pattern, targets)| PathMapping {
                    pattern,
                    substitutions: targets.iter().map(|t| join(&base, t)).collect(),
                })
                .collect(),
            None => {
                if !mappings.is_empty() {
                    tracing::debug!("ignoring `paths` without `baseUrl` or a config directory");
                }
                Vec::new()
            }
        };

        Self { base_url, paths }
    }

    fn resolve_path_mapping(
        &self,
        module_name: &str,
        host: &dyn ModuleResolutionHost,
    ) -> Option<String> {
        let (mapping, capture) = self
            .paths
            .iter()
            .filter_map(|m| m.matches(module_name).map(|capture| (m, capture)))
            .max_by_key(|(m, _)| m.specificity())?;

        mapping.substitutions.iter().find_map(|target| {
            let candidate = normalize_path(&target.replacen('*', capture, 1));
            resolve_file_or_directory(&candidate, host)
        })
    }

    fn resolve_from_base_url(
        &self,
        module_name: &str,
        host: &dyn ModuleResolutionHost,
    ) -> Option<String> {
        let base = self.base_url.as_deref()?;
        resolve_file_or_directory(&join(base, module_name), host)
    }
}

impl ModuleResolver for NodeResolver {
    fn resolve(
        &self,
        module_name: &str,
        containing_file: &str,
        host: &dyn ModuleResolutionHost,
    ) -> Option<ResolvedModule> {
        let dir = parent_dir(containing_file);

        if is_relative_specifier(module_name) || module_name.starts_with('/') {
            let candidate = join(dir, module_name);
            return resolve_file_or_directory(&candidate, host)
                .and_then(ResolvedModule::local);
        }

        let mapped = self
            .resolve_path_mapping(module_name, host)
            .or_else(|| self.resolve_from_base_url(module_name, host))
            .and_then(ResolvedModule::local);
        if mapped.is_some() {
            return mapped;
        }

        resolve_node_modules(module_name, dir, host)
    }
}

/// Try `path` as a file, then as a directory.
pub(crate) fn resolve_file_or_directory(
    path: &str,
    host: &dyn ModuleResolutionHost,
) -> Option<String> {
    resolve_file(path, host).or_else(|| resolve_directory(path, host))
}

fn resolve_file(path: &str, host: &dyn ModuleResolutionHost) -> Option<String> {
    if Extension::from_file_name(path).is_some() && host.file_exists(path) {
        return Some(path.to_owned());
    }

    // `./a.js` in TypeScript sources refers to `./a.ts`
    let stem = path
        .strip_suffix(".js")
        .or_else(|| path.strip_suffix(".jsx"))
        .unwrap_or(path);

    EXTENSIONS
        .iter()
        .map(|ext| format!("{stem}{}", ext.as_str()))
        .find(|candidate| host.file_exists(candidate))
}

fn resolve_directory(dir: &str, host: &dyn ModuleResolutionHost) -> Option<String> {
    if !host.directory_exists(dir) {
        return None;
    }

    let manifest = read_manifest(dir, host);
    if let Some(entry) = manifest.and_then(|m| m.types.or(m.typings)) {
        let entry = join(dir, &entry);
        if let Some(found) = resolve_file(&entry, host).or_else(|| resolve_index(&entry, host)) {
            return Some(found);
        }
    }

    resolve_index(dir, host)
}

fn resolve_index(dir: &str, host: &dyn ModuleResolutionHost) -> Option<String> {
    EXTENSIONS
        .iter()
        .map(|ext| format!("{dir}/index{}", ext.as_str()))
        .find(|candidate| host.file_exists(candidate))
}

fn read_manifest(dir: &str, host: &dyn ModuleResolutionHost) -> Option<PackageJson> {
    let path = format!("{dir}/package.json");
    let text = host.read_file(&path)?;
    match serde_json::from_str(&text) {
        Ok(manifest) => Some(manifest),
        Err(err) => {
            tracing::debug!(path, %err, "ignoring unreadable package.json");
            None
        }
    }
}

/// Search `node_modules` folders from `dir` upwards.
fn resolve_node_modules(
    module_name: &str,
    dir: &str,
    host: &dyn ModuleResolutionHost,
) -> Option<ResolvedModule> {
    let (package_name, sub_path) = split_package_name(module_name);
    let types_name = types_package_name(package_name);

    let mut current = normalize_path(dir);
    loop {
        let node_modules = if current == "/" {
            "/node_modules".to_owned()
        } else {
            format!("{current}/node_modules")
        };

        if host.directory_exists(&node_modules) {
            for name in [package_name, types_name.as_str()] {
                let root = format!("{node_modules}/{name}");
                let target = match sub_path {
                    Some(sub) => format!("{root}/{sub}"),
                    None => root.clone(),
                };
                if let Some(found) = resolve_file_or_directory(&target, host) {
                    let scope = PackageScope {
                        manifest: read_manifest(&root, host).unwrap_or_default(),
                        root: &root,
                    };
                    return Some(package_resolution(found, &scope));
                }
            }
        }

        if current == "/" || current == "." || !current.contains('/') {
            return None;
        }
        current = parent_dir(&current).to_owned();
    }
}

fn package_resolution(resolved_file_name: String, scope: &PackageScope<'_>) -> ResolvedModule {
    let extension = Extension::from_file_name(&resolved_file_name).unwrap_or(Extension::Dts);
    let package_id = match (&scope.manifest.name, &scope.manifest.version) {
        (Some(name), Some(version)) => {
            let sub_module_name = resolved_file_name
                .strip_prefix(scope.root)
                .map(|s| s.trim_start_matches('/'))
                .unwrap_or_default();
            Some(PackageId::new(name.as_str(), sub_module_name, version.as_str()))
        }
        _ => None,
    };

    ResolvedModule {
        resolved_file_name,
        extension,
        is_external_library_import: true,
        package_id,
    }
}

/// `"@scope/pkg/sub/path"` → `("@scope/pkg", Some("sub/path"))`.
pub(crate) fn split_package_name(module_name: &str) -> (&str, Option<&str>) {
    let name_segments = if module_name.starts_with('@') { 2 } else { 1 };
    let mut split_at = None;
    for (seen, (i, _)) in module_name.match_indices('/').enumerate() {
        if seen + 1 == name_segments {
            split_at = Some(i);
            break;
        }
    }

    match split_at {
        Some(i) => (&module_name[..i], Some(&module_name[i + 1..])),
        None => (module_name, None),
    }
}

/// `"@scope/pkg"` → `"@types/scope__pkg"`, `"pkg"` → `"@types/pkg"`.
fn types_package_name(package_name: &str) -> String {
    match package_name.strip_prefix('@') {
        Some(scoped) => format!("@types/{}", scoped.replacen('/', "__", 1)),
        None => format!("@types/{package_name}"),
    }
}
