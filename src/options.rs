//! Compiler options loaded from `tsconfig.json`.
//!
//! `tsconfig.json` is JSON with comments and trailing commas. Comments and
//! trailing commas are stripped before handing the text to `serde_json`;
//! `extends` chains are followed, child options overriding parent options
//! key by key. An `extends` target is a path relative to the extending file,
//! an absolute path, or a package found in a `node_modules` folder.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::diagnostic::CompileError;
use crate::host::split_package_name;

/// Maximum `extends` depth before a chain is considered cyclic.
const MAX_EXTENDS_DEPTH: usize = 32;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TsConfigFile {
    extends: Option<String>,
    #[serde(default)]
    compiler_options: Map<String, Value>,
}

/// Parsed `compilerOptions`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompilerOptions {
    values: Map<String, Value>,
    config_dir: Option<PathBuf>,
}

impl CompilerOptions {
    /// Options from an in-memory `compilerOptions` object.
    pub fn from_json(values: Map<String, Value>) -> Self {
        Self {
            values,
            config_dir: None,
        }
    }

    /// Load options from a `tsconfig.json`, following `extends`.
    pub fn load(path: &Path) -> Result<Self, CompileError> {
        let mut chain = Vec::new();
        let mut next = Some(path.to_path_buf());

        while let Some(current) = next.take() {
            if chain.len() == MAX_EXTENDS_DEPTH {
                return Err(CompileError::config(path, "`extends` chain too deep (cyclic?)"));
            }
            let mut config = read_config(&current)?;
            next = config
                .extends
                .as_deref()
                .map(|target| extends_path(&current, target))
                .transpose()?;
            anchor_base_url(&mut config.compiler_options, &current);
            chain.push(config.compiler_options);
        }

        // Parents first, so children override.
        let mut values = Map::new();
        for options in chain.into_iter().rev() {
            values.extend(options);
        }

        tracing::debug!(path = %path.display(), options = values.len(), "loaded compiler options");
        Ok(Self {
            values,
            config_dir: path.parent().map(Path::to_path_buf),
        })
    }

    /// Raw option value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// All raw option values.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// `strict`
    pub fn strict(&self) -> bool {
        self.get("strict").and_then(Value::as_bool).unwrap_or(false)
    }

    /// `baseUrl`, resolved against the directory of the config file that
    /// declared it.
    pub fn base_url(&self) -> Option<PathBuf> {
        let base = self.get("baseUrl").and_then(Value::as_str)?;
        Some(match &self.config_dir {
            Some(dir) => dir.join(base),
            None => PathBuf::from(base),
        })
    }

    /// `paths` patterns with their substitutions, in declaration order.
    ///
    /// Non-string substitutions are skipped.
    pub fn paths(&self) -> Vec<(String, Vec<String>)> {
        let Some(Value::Object(paths)) = self.get("paths") else {
            return Vec::new();
        };

        paths
            .iter()
            .map(|(pattern, targets)| {
                let targets = targets
                    .as_array()
                    .map(|t| t.iter().filter_map(Value::as_str).map(str::to_owned).collect())
                    .unwrap_or_default();
                (pattern.clone(), targets)
            })
            .collect()
    }

    /// Directory of the loaded config file.
    pub fn config_dir(&self) -> Option<&Path> {
        self.config_dir.as_deref()
    }
}

/// Make a relative `baseUrl` absolute against the file declaring it, so it
/// survives being inherited through `extends`.
fn anchor_base_url(options: &mut Map<String, Value>, config: &Path) {
    let Some(Value::String(base)) = options.get("baseUrl") else {
        return;
    };
    if Path::new(base).is_absolute() {
        return;
    }
    let dir = config.parent().unwrap_or_else(|| Path::new("."));
    let anchored = dir.join(base).to_string_lossy().into_owned();
    options.insert("baseUrl".to_owned(), Value::String(anchored));
}

fn read_config(path: &Path) -> Result<TsConfigFile, CompileError> {
    let text = fs::read_to_string(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => CompileError::NotFound(path.to_path_buf()),
        _ => CompileError::Io(err),
    })?;
    let stripped = strip_json_comments(&text);
    serde_json::from_str(&stripped).map_err(|err| CompileError::config(path, err.to_string()))
}

fn extends_path(from: &Path, target: &str) -> Result<PathBuf, CompileError> {
    let dir = from.parent().unwrap_or_else(|| Path::new("."));
    if target.starts_with('.') || Path::new(target).is_absolute() {
        return Ok(dir.join(with_json_extension(target)));
    }

    // `pkg` means `pkg/tsconfig.json`, `pkg/sub` means `pkg/sub.json`
    let relative = match split_package_name(target) {
        (_, None) => format!("{target}/tsconfig.json"),
        (_, Some(_)) => with_json_extension(target),
    };
    dir.ancestors()
        .map(|ancestor| ancestor.join("node_modules").join(&relative))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            CompileError::config(
                from,
                format!("`extends: \"{target}\"` not found in any node_modules folder"),
            )
        })
}

fn with_json_extension(target: &str) -> String {
    if target.ends_with(".json") {
        target.to_owned()
    } else {
        format!("{target}.json")
    }
}

/// Remove `//` and `/* */` comments and trailing commas outside strings.
pub fn strip_json_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some(&'/')) => {
                while chars.peek().is_some_and(|&n| n != '\n') {
                    chars.next();
                }
            }
            ('/', Some(&'*')) => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    // keep line structure for serde_json error positions
                    if n == '\n' {
                        out.push('\n');
                    }
                    prev = n;
                }
            }
            (']' | '}', _) => {
                let kept = out.trim_end().len();
                if out[..kept].ends_with(',') {
                    out.replace_range(kept - 1..kept, " ");
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_strip_comments() {
        let text = "{\n  // line\n  \"a\": \"http://x\", /* block\n */ \"b\": [1, 2,],\n}";
        let value: Value = serde_json::from_str(&strip_json_comments(text)).unwrap();
        assert_eq!(value["a"], "http://x");
        assert_eq!(value["b"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_strip_keeps_escaped_quotes() {
        let text = r#"{"a": "say \"//hi\"" }"#;
        let value: Value = serde_json::from_str(&strip_json_comments(text)).unwrap();
        assert_eq!(value["a"], "say \"//hi\"");
    }

    #[test]
    fn test_load_with_extends() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("tsconfig.base.json"),
            r#"{ "compilerOptions": { "strict": false, "target": "es2015", "jsx": "react" } }"#,
        )
        .unwrap();
        let child = r#"{
  // docs config
  "extends": "./tsconfig.base",
  "compilerOptions": { "strict": true, "baseUrl": ".", },
}"#;
        fs::write(dir.path().join("tsconfig.json"), child).unwrap();

        let options = CompilerOptions::load(&dir.path().join("tsconfig.json")).unwrap();
        assert!(options.strict());
        assert_eq!(options.get("target"), Some(&Value::from("es2015")));
        assert_eq!(options.get("jsx"), Some(&Value::from("react")));
        assert_eq!(options.base_url(), Some(dir.path().join(".")));
    }

    fn write(path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_package_extends() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join("node_modules/@tsconfig/node18/tsconfig.json"),
            r#"{ "compilerOptions": { "strict": true, "target": "es2022", "baseUrl": "." } }"#,
        );
        let package_dir = dir.path().join("node_modules/@tsconfig/node18");

        let targets = [
            "@tsconfig/node18/tsconfig.json",
            "@tsconfig/node18/tsconfig",
            "@tsconfig/node18",
        ];
        for target in targets {
            let path = dir.path().join("docs/tsconfig.json");
            write(&path, &format!(r#"{{ "extends": "{target}" }}"#));

            let options = CompilerOptions::load(&path).unwrap();
            assert!(options.strict(), "{target}");
            assert_eq!(options.get("target"), Some(&Value::from("es2022")));
            assert_eq!(options.base_url(), Some(package_dir.join(".")));
            assert_eq!(options.config_dir(), Some(dir.path().join("docs").as_path()));
        }
    }

    #[test]
    fn test_paths() {
        let mut values = Map::new();
        values.insert(
            "paths".into(),
            serde_json::json!({ "@lib/*": ["src/*", 3], "exact": ["lib/exact.ts"] }),
        );
        let options = CompilerOptions::from_json(values);
        assert_eq!(
            options.paths(),
            vec![
                ("@lib/*".to_owned(), vec!["src/*".to_owned()]),
                ("exact".to_owned(), vec!["lib/exact.ts".to_owned()]),
            ]
        );
        assert!(CompilerOptions::default().paths().is_empty());
    }

    #[test]
    fn test_missing_config_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = CompilerOptions::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CompileError::NotFound(_)));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tsconfig.json");
        fs::write(&path, "{ compilerOptions: }").unwrap();
        assert!(matches!(CompilerOptions::load(&path), Err(CompileError::Config { .. })));
    }

    #[test]
    fn test_cyclic_extends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tsconfig.json");
        fs::write(&path, r#"{ "extends": "./tsconfig.json" }"#).unwrap();
        assert!(matches!(CompilerOptions::load(&path), Err(CompileError::Config { .. })));
    }

    #[test]
    fn test_missing_package_extends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tsconfig.json");
        fs::write(&path, r#"{ "extends": "@tsconfig/does-not-exist" }"#).unwrap();
        assert!(matches!(CompilerOptions::load(&path), Err(CompileError::Config { .. })));
    }
}
