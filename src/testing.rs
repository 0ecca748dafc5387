//! Scripted stand-in for a TypeScript language service, for tests.
//!
//! Understands just enough TypeScript to exercise the host and the driver:
//!
//! - emit strips `: string` / `: number` annotations and drops blank lines
//! - `let|const NAME: string = <digits>` is a type error
//! - `NAME(<digits>)` is a type error when `NAME` takes a `string`, whether
//!   declared locally or imported from a resolved module
//! - unresolved imports report "Cannot find module"
//! - unbalanced parentheses are a syntax error
//! - a `bogusOption` compiler option is an options error
//!
//! Semantic results are cached per file and reused while the file's and its
//! imports' versions are unchanged.

use rustc_hash::FxHashMap;
use serde_json::{json, Map};

use crate::options::CompilerOptions;
use crate::service::{
    EmitOutput, HostError, LanguageService, OutputFile, RawDiagnostic, ServiceHost,
};
use crate::snippet::to_js_file_name;

/// Options with `strict` enabled.
pub(crate) fn strict_options() -> CompilerOptions {
    let mut values = Map::new();
    values.insert("strict".into(), json!(true));
    CompilerOptions::from_json(values)
}

struct Analysis {
    /// Versions of the file and its resolved imports when analyzed.
    versions: Vec<(String, String)>,
    diagnostics: Vec<RawDiagnostic>,
}

#[derive(Default)]
pub(crate) struct ScriptedService {
    cache: FxHashMap<String, Analysis>,
    analyses: usize,
}

impl ScriptedService {
    /// Number of semantic analyses actually performed.
    pub(crate) fn analyses(&self) -> usize {
        self.analyses
    }

    fn is_fresh(&self, host: &dyn ServiceHost, file_name: &str) -> bool {
        self.cache.get(file_name).is_some_and(|analysis| {
            analysis
                .versions
                .iter()
                .all(|(file, version)| host.script_version(file) == *version)
        })
    }

    fn analyze(&mut self, host: &dyn ServiceHost, file_name: &str) -> Result<Analysis, HostError> {
        self.analyses += 1;
        let text = host.script_snapshot(file_name).unwrap_or_default();
        let mut versions = vec![(file_name.to_owned(), host.script_version(file_name))];
        let mut diagnostics = Vec::new();
        let mut signatures = declared_signatures(&text);

        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            let line_start = offset;
            offset += line.len();

            let Some(import) = parse_import(line) else {
                continue;
            };
            let resolved = host.resolve_module_names(&[import.module], file_name)?;
            match resolved.into_iter().next().flatten() {
                Some(module) => {
                    let target = module.resolved_file_name;
                    versions.push((target.clone(), host.script_version(&target)));
                    let imported = host
                        .read_file(&target)
                        .map(|t| declared_signatures(&t))
                        .unwrap_or_default();
                    for name in import.names {
                        if let Some(param) = imported.get(name) {
                            signatures.insert(name.to_owned(), param.clone());
                        }
                    }
                }
                None => diagnostics.push(RawDiagnostic::at(
                    file_name,
                    line_start + import.module_offset,
                    import.module.len(),
                    2307,
                    format!(
                        "Cannot find module '{}' or its corresponding type declarations.",
                        import.module
                    ),
                )),
            }
        }

        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            let line_start = offset;
            offset += line.len();

            if let Some(column) = string_initialized_with_number(line) {
                diagnostics.push(RawDiagnostic::at(
                    file_name,
                    line_start + column,
                    1,
                    2322,
                    "Type 'number' is not assignable to type 'string'.",
                ));
            }
            if line.contains("function ") || line.trim_start().starts_with("import") {
                continue;
            }
            for (column, len) in numeric_string_arguments(line, &signatures) {
                diagnostics.push(RawDiagnostic::at(
                    file_name,
                    line_start + column,
                    len,
                    2345,
                    "Argument of type 'number' is not assignable to parameter of type 'string'.",
                ));
            }
        }

        Ok(Analysis { versions, diagnostics })
    }
}

impl LanguageService for ScriptedService {
    fn emit_output(
        &mut self,
        host: &dyn ServiceHost,
        file_name: &str,
    ) -> Result<EmitOutput, HostError> {
        let Some(text) = host.script_snapshot(file_name) else {
            return Ok(EmitOutput {
                output_files: Vec::new(),
                emit_skipped: true,
            });
        };

        let emitted = text
            .split_inclusive('\n')
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                line.replace(": string", "")
                    .replace(":string", "")
                    .replace(": number", "")
                    .replace(":number", "")
            })
            .collect();

        Ok(EmitOutput {
            output_files: vec![OutputFile {
                name: to_js_file_name(file_name),
                text: emitted,
            }],
            emit_skipped: false,
        })
    }

    fn compiler_options_diagnostics(
        &mut self,
        host: &dyn ServiceHost,
    ) -> Result<Vec<RawDiagnostic>, HostError> {
        Ok(host
            .compilation_settings()
            .values()
            .keys()
            .filter(|key| key.as_str() == "bogusOption")
            .map(|key| RawDiagnostic::global(5023, format!("Unknown compiler option '{key}'.")))
            .collect())
    }

    fn syntactic_diagnostics(
        &mut self,
        host: &dyn ServiceHost,
        file_name: &str,
    ) -> Result<Vec<RawDiagnostic>, HostError> {
        let text = host.script_snapshot(file_name).unwrap_or_default();
        let mut open = Vec::new();
        let mut diagnostics = Vec::new();
        for (i, c) in text.char_indices() {
            match c {
                '(' => open.push(i),
                ')' if open.pop().is_none() => {
                    let message = "Declaration or statement expected.";
                    diagnostics.push(RawDiagnostic::at(file_name, i, 1, 1128, message));
                }
                _ => {}
            }
        }
        if let Some(&unclosed) = open.last() {
            diagnostics.push(RawDiagnostic::at(file_name, unclosed, 1, 1005, "')' expected."));
        }
        Ok(diagnostics)
    }

    fn semantic_diagnostics(
        &mut self,
        host: &dyn ServiceHost,
        file_name: &str,
    ) -> Result<Vec<RawDiagnostic>, HostError> {
        if !self.is_fresh(host, file_name) {
            let analysis = self.analyze(host, file_name)?;
            self.cache.insert(file_name.to_owned(), analysis);
        }
        Ok(self
            .cache
            .get(file_name)
            .map(|analysis| analysis.diagnostics.clone())
            .unwrap_or_default())
    }
}

// =============================================================================
// Toy parsing
// =============================================================================

struct Import<'a> {
    names: Vec<&'a str>,
    module: &'a str,
    module_offset: usize,
}

/// `import { a, b } from 'mod'` or `import 'mod'`.
fn parse_import(line: &str) -> Option<Import<'_>> {
    if !line.trim_start().starts_with("import ") {
        return None;
    }
    let quote = line.find(['\'', '"'])?;
    let quote_char = line[quote..].chars().next()?;
    let module_offset = quote + 1;
    let module_len = line[module_offset..].find(quote_char)?;

    let names = match (line.find('{'), line.find('}')) {
        (Some(open), Some(close)) if open < close => line[open + 1..close]
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect(),
        _ => Vec::new(),
    };

    Some(Import {
        names,
        module: &line[module_offset..module_offset + module_len],
        module_offset,
    })
}

/// `function NAME(param: TYPE` → `NAME → TYPE`, for every declaration.
fn declared_signatures(text: &str) -> FxHashMap<String, String> {
    let mut found = FxHashMap::default();
    for (at, _) in text.match_indices("function ") {
        let rest = &text[at + "function ".len()..];
        let Some(open) = rest.find('(') else {
            continue;
        };
        let name = rest[..open].trim();
        let params = &rest[open + 1..];
        let first = params.split([',', ')']).next().unwrap_or_default();
        if let Some((_, ty)) = first.split_once(':') {
            found.insert(name.to_owned(), ty.trim().to_owned());
        }
    }
    found
}

/// Column of `NAME` in `let|const NAME: string = <digits>`.
fn string_initialized_with_number(line: &str) -> Option<usize> {
    let indent = line.len() - line.trim_start().len();
    let mut rest = line.trim_start();
    let mut column = indent;
    for keyword in ["export ", "let ", "const "] {
        if let Some(stripped) = rest.strip_prefix(keyword) {
            column += keyword.len();
            rest = stripped;
        }
    }
    if column == indent {
        return None;
    }

    let (name, tail) = rest.split_once(':')?;
    let value = tail.trim_start().strip_prefix("string")?.trim_start().strip_prefix('=')?;
    let value = value.trim().trim_end_matches(';');
    (!value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) && !name.trim().is_empty())
        .then_some(column)
}

/// `(column, len)` of numeric arguments passed to string-taking functions.
fn numeric_string_arguments(
    line: &str,
    signatures: &FxHashMap<String, String>,
) -> Vec<(usize, usize)> {
    let mut found = Vec::new();
    for (name, ty) in signatures {
        if ty != "string" {
            continue;
        }
        let call = format!("{name}(");
        for (at, _) in line.match_indices(&call) {
            let preceded_by_ident = line[..at]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '.');
            if preceded_by_ident {
                continue;
            }
            let arg_start = at + call.len();
            let Some(len) = line[arg_start..].find(')') else {
                continue;
            };
            let arg = &line[arg_start..arg_start + len];
            if !arg.is_empty() && arg.chars().all(|c| c.is_ascii_digit()) {
                found.push((arg_start, len));
            }
        }
    }
    found.sort_unstable();
    found
}
