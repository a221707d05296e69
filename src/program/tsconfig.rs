//! @dose
//! purpose: Loads tsconfig.json files for the type-resolution program: module resolution
//!     options (baseUrl, paths) and the root file set (files/include/exclude), following
//!     `extends` chains.
//!
//! when-editing:
//!     - !tsconfig is JSONC: comments and trailing commas must be stripped before serde_json
//!     - !Relative paths are resolved against the tsconfig that declares them, not the child
//!     - `paths` targets resolve against baseUrl when set, else the declaring tsconfig's dir
//!
//! invariants:
//!     - A child config overrides each field of its parent independently
//!     - An `extends` cycle is an error, never an infinite loop
//!
//! gotchas:
//!     - `extends` pointing at a package name (no leading ./) is not supported and ignored
//!     - An include entry without wildcards or extension names a directory: "src" => "src/**/*"

use globset::{Glob, GlobSet, GlobSetBuilder};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::dependency::normalize_path;

#[derive(Error, Debug)]
pub enum TsconfigError {
    #[error("Failed to read tsconfig {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid tsconfig {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Circular `extends` in tsconfig {0}")]
    ExtendsCycle(PathBuf),
}

/// Module resolution settings taken from `compilerOptions`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Absolute baseUrl, if configured
    pub base_url: Option<PathBuf>,
    /// Path mapping patterns, targets already made absolute
    pub paths: HashMap<String, Vec<PathBuf>>,
}

impl CompilerOptions {
    /// Map a bare specifier through `paths`, longest matching prefix first
    pub fn map_path(&self, specifier: &str) -> Vec<PathBuf> {
        let mut best: Option<(usize, Vec<PathBuf>)> = None;

        for (pattern, targets) in &self.paths {
            let matched = match pattern.split_once('*') {
                Some((prefix, suffix)) => {
                    if specifier.len() >= prefix.len() + suffix.len()
                        && specifier.starts_with(prefix)
                        && specifier.ends_with(suffix)
                    {
                        let wildcard = &specifier[prefix.len()..specifier.len() - suffix.len()];
                        Some((prefix.len(), wildcard))
                    } else {
                        None
                    }
                }
                None if pattern == specifier => Some((usize::MAX, "")),
                None => None,
            };

            let Some((rank, wildcard)) = matched else {
                continue;
            };
            if best.as_ref().map(|(r, _)| rank > *r).unwrap_or(true) {
                let mapped = targets
                    .iter()
                    .map(|t| PathBuf::from(t.to_string_lossy().replacen('*', wildcard, 1)))
                    .collect();
                best = Some((rank, mapped));
            }
        }

        best.map(|(_, paths)| paths).unwrap_or_default()
    }
}

/// A loaded tsconfig with its `extends` chain applied
#[derive(Debug, Clone)]
pub struct TsConfig {
    pub path: PathBuf,
    pub compiler_options: CompilerOptions,
    /// Absolute paths listed in `files`
    pub files: Vec<PathBuf>,
    /// Include patterns, relative to the tsconfig directory
    pub include: Vec<String>,
    /// Exclude patterns, relative to the tsconfig directory
    pub exclude: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawTsConfig {
    extends: Option<String>,
    compiler_options: RawCompilerOptions,
    files: Option<Vec<String>>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawCompilerOptions {
    base_url: Option<String>,
    paths: Option<HashMap<String, Vec<String>>>,
}

/// Matches a trailing comma before a closing bracket
static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",(\s*[}\]])").unwrap());

/// Strip `//` and `/* */` comments outside of string literals, then trailing commas
pub(crate) fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
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

        match (c, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }

    TRAILING_COMMA.replace_all(&out, "$1").into_owned()
}

impl TsConfig {
    /// Load a tsconfig file, applying its `extends` chain
    pub fn load(path: &Path) -> Result<Self, TsconfigError> {
        let path = normalize_path(path);
        let mut visited = Vec::new();
        Self::load_inner(&path, &mut visited)
    }

    fn load_inner(path: &Path, visited: &mut Vec<PathBuf>) -> Result<Self, TsconfigError> {
        if visited.iter().any(|p| p == path) {
            return Err(TsconfigError::ExtendsCycle(path.to_path_buf()));
        }
        visited.push(path.to_path_buf());

        let content = fs::read_to_string(path).map_err(|source| TsconfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawTsConfig =
            serde_json::from_str(&strip_jsonc(&content)).map_err(|source| TsconfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        let parent = match raw.extends.as_deref() {
            Some(ext) if ext.starts_with('.') || Path::new(ext).is_absolute() => {
                let mut parent_path = normalize_path(&dir.join(ext));
                if !parent_path.exists() && parent_path.extension() != Some(std::ffi::OsStr::new("json")) {
                    parent_path = PathBuf::from(format!("{}.json", parent_path.display()));
                }
                Some(Self::load_inner(&parent_path, visited)?)
            }
            Some(ext) => {
                tracing::warn!(
                    "Ignoring package tsconfig extends '{}' in {}",
                    ext,
                    path.display()
                );
                None
            }
            None => None,
        };

        let base_url = raw
            .compiler_options
            .base_url
            .as_ref()
            .map(|b| normalize_path(&dir.join(b)));

        let paths = raw.compiler_options.paths.map(|paths| {
            let paths_base = base_url.clone().unwrap_or_else(|| dir.clone());
            paths
                .into_iter()
                .map(|(pattern, targets)| {
                    let targets = targets
                        .iter()
                        .map(|t| normalize_path(&paths_base.join(t)))
                        .collect();
                    (pattern, targets)
                })
                .collect::<HashMap<_, _>>()
        });

        let (parent_options, parent_files, parent_include, parent_exclude) = match parent {
            Some(p) => (
                p.compiler_options,
                Some(p.files),
                Some(p.include),
                Some(p.exclude),
            ),
            None => (CompilerOptions::default(), None, None, None),
        };

        let compiler_options = CompilerOptions {
            base_url: base_url.or(parent_options.base_url),
            paths: paths.unwrap_or(parent_options.paths),
        };

        let files = raw
            .files
            .map(|files| {
                files
                    .iter()
                    .map(|f| normalize_path(&dir.join(f)))
                    .collect::<Vec<_>>()
            })
            .or(parent_files)
            .unwrap_or_default();

        // Inherited include/exclude stay relative to the parent's directory in tsc;
        // we only support them when both configs live in the same directory.
        let include = raw.include.or(parent_include).unwrap_or_else(|| {
            if files.is_empty() {
                vec!["**/*".to_string()]
            } else {
                Vec::new()
            }
        });
        let exclude = raw.exclude.or(parent_exclude).unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            compiler_options,
            files,
            include,
            exclude,
        })
    }

    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    /// Expand `files` and `include`/`exclude` into the root file list
    pub fn root_files(&self, extensions: &[&str]) -> Vec<PathBuf> {
        let mut roots = self.files.clone();

        if !self.include.is_empty() {
            let include = build_pattern_set(&self.include);
            let exclude = build_pattern_set(&self.exclude);

            for entry in WalkDir::new(self.dir())
                .into_iter()
                .filter_entry(|e| e.file_name() != "node_modules")
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if !entry.file_type().is_file() {
                    continue;
                }
                let supported = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| extensions.contains(&e))
                    .unwrap_or(false);
                if !supported {
                    continue;
                }
                let Ok(relative) = path.strip_prefix(self.dir()) else {
                    continue;
                };
                if include.is_match(relative) && !exclude.is_match(relative) {
                    roots.push(normalize_path(path));
                }
            }
        }

        roots.sort();
        roots.dedup();
        roots
    }
}

/// Compile tsconfig include/exclude entries into a GlobSet
fn build_pattern_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.trim_start_matches("./").trim_end_matches('/');
        let is_dir_like = !pattern.contains('*') && Path::new(pattern).extension().is_none();
        let expanded = if is_dir_like {
            vec![pattern.to_string(), format!("{}/**/*", pattern)]
        } else {
            vec![pattern.to_string()]
        };
        for p in expanded {
            match Glob::new(&p) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => tracing::warn!("Invalid tsconfig pattern '{}': {}", p, e),
            }
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_strip_jsonc() {
        let input = r#"{
  // line comment
  "a": "http://not-a-comment", /* block */
  "b": [1, 2,],
  "c": "quote \" // still string",
}"#;
        let value: serde_json::Value = serde_json::from_str(&strip_jsonc(input)).unwrap();
        assert_eq!(value["a"], "http://not-a-comment");
        assert_eq!(value["b"], serde_json::json!([1, 2]));
        assert_eq!(value["c"], "quote \" // still string");
    }

    #[test]
    fn test_map_path_longest_prefix() {
        let mut paths = HashMap::new();
        paths.insert("@ui/*".to_string(), vec![PathBuf::from("/repo/src/*")]);
        paths.insert(
            "@ui/utils/*".to_string(),
            vec![PathBuf::from("/repo/src/utils/*")],
        );
        paths.insert(
            "theme".to_string(),
            vec![PathBuf::from("/repo/src/theme/index")],
        );
        let options = CompilerOptions {
            base_url: None,
            paths,
        };

        assert_eq!(
            options.map_path("@ui/utils/keys"),
            vec![PathBuf::from("/repo/src/utils/keys")]
        );
        assert_eq!(
            options.map_path("@ui/components/Box"),
            vec![PathBuf::from("/repo/src/components/Box")]
        );
        assert_eq!(
            options.map_path("theme"),
            vec![PathBuf::from("/repo/src/theme/index")]
        );
        assert!(options.map_path("react").is_empty());
    }

    #[test]
    fn test_load_with_extends() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(
            root.join("tsconfig.base.json"),
            r#"{
  // shared settings
  "compilerOptions": { "baseUrl": "./src", "paths": { "@ui/*": ["components/*"] } },
  "exclude": ["**/*.test.tsx"],
}"#,
        )
        .unwrap();
        fs::write(
            root.join("tsconfig.json"),
            r#"{ "extends": "./tsconfig.base", "include": ["src"] }"#,
        )
        .unwrap();

        let config = TsConfig::load(&root.join("tsconfig.json")).unwrap();
        let root = normalize_path(root);
        assert_eq!(config.compiler_options.base_url, Some(root.join("src")));
        assert_eq!(
            config.compiler_options.map_path("@ui/Box"),
            vec![root.join("src/components/Box")]
        );
        assert_eq!(config.include, vec!["src"]);
        assert_eq!(config.exclude, vec!["**/*.test.tsx"]);
    }

    #[test]
    fn test_extends_cycle() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("a.json"),
            r#"{ "extends": "./b.json" }"#,
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("b.json"),
            r#"{ "extends": "./a.json" }"#,
        )
        .unwrap();

        let err = TsConfig::load(&temp_dir.path().join("a.json")).unwrap_err();
        assert!(matches!(err, TsconfigError::ExtendsCycle(_)));
    }

    #[test]
    fn test_root_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/components/Box")).unwrap();
        fs::create_dir_all(root.join("node_modules/react")).unwrap();
        fs::write(root.join("src/components/Box/Box.tsx"), "").unwrap();
        fs::write(root.join("src/components/Box/Box.test.tsx"), "").unwrap();
        fs::write(root.join("src/components/Box/Box.css"), "").unwrap();
        fs::write(root.join("node_modules/react/index.ts"), "").unwrap();
        fs::write(
            root.join("tsconfig.json"),
            r#"{ "include": ["src"], "exclude": ["**/*.test.tsx"] }"#,
        )
        .unwrap();

        let config = TsConfig::load(&root.join("tsconfig.json")).unwrap();
        let files = config.root_files(&["tsx", "ts"]);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/components/Box/Box.tsx"));
    }

    #[test]
    fn test_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("tsconfig.json"), "{ nope").unwrap();
        let err = TsConfig::load(&temp_dir.path().join("tsconfig.json")).unwrap_err();
        assert!(matches!(err, TsconfigError::Json { .. }));
    }
}
