//! @dose
//! purpose: Decides which files of a project are component files and finds them on disk.
//!     One ComponentFiles value answers both the batch walk of `generate` and the per-event
//!     check of `watch`, so the two can never disagree.
//!
//! when-editing:
//!     - !Include/exclude globs match paths relative to the project root, not the search path
//!     - !The output directory is never a source of component files
//!     - Excluded dependency/build directories are pruned during the walk, not filtered after
//!
//! invariants:
//!     - A file is a component file iff it has a supported extension, lies under the root
//!       outside excluded directories and the output directory, matches an include glob
//!       and matches no exclude glob
//!     - collect() returns sorted, de-duplicated absolute paths
//!
//! gotchas:
//!     - globset's `*` crosses `/`, so `*.test.tsx` excludes test files at any depth
//!     - .gitignore is honored by the walk only; a watch event for an ignored file that
//!       matches the globs is still a component file

use crate::parser::TypeScriptParser;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory names that never contain documented components
const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "lib",
    "coverage",
    "temp",
    ".cache",
    ".next",
];

/// Check if a directory name is skipped by every walk
pub fn is_excluded_dir(name: &str) -> bool {
    EXCLUDED_DIRS.contains(&name)
}

/// Selection rules for the component files of one project
#[derive(Debug, Clone)]
pub struct ComponentFiles {
    root: PathBuf,
    out_dir: PathBuf,
    include: GlobSet,
    exclude: GlobSet,
    respect_gitignore: bool,
}

impl ComponentFiles {
    /// `root` and `out_dir` are expected to be absolute
    pub fn new(root: &Path, out_dir: &Path, include: &[String], exclude: &[String]) -> Self {
        Self {
            root: root.to_path_buf(),
            out_dir: out_dir.to_path_buf(),
            include: compile(include),
            exclude: compile(exclude),
            respect_gitignore: true,
        }
    }

    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Whether a path is a component file of this project
    pub fn is_component_file(&self, path: &Path) -> bool {
        if path.starts_with(&self.out_dir) || !TypeScriptParser::new().is_supported(path) {
            return false;
        }
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };
        let in_excluded_dir = relative
            .parent()
            .map(|dir| {
                dir.components()
                    .any(|c| is_excluded_dir(&c.as_os_str().to_string_lossy()))
            })
            .unwrap_or(false);

        !in_excluded_dir && self.include.is_match(relative) && !self.exclude.is_match(relative)
    }

    /// Component files under the given paths (relative to the root; the root when empty)
    pub fn collect(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let search_paths = if paths.is_empty() {
            vec![self.root.clone()]
        } else {
            paths.iter().map(|p| self.root.join(p)).collect()
        };

        let mut files = Vec::new();
        for search_path in search_paths {
            if search_path.is_file() {
                if self.is_component_file(&search_path) {
                    files.push(search_path);
                }
            } else if search_path.is_dir() {
                files.extend(
                    self.walker(&search_path)
                        .build()
                        .filter_map(|e| e.ok())
                        .map(|e| e.into_path())
                        .filter(|p| p.is_file() && self.is_component_file(p)),
                );
            } else {
                debug!("Input path {} does not exist", search_path.display());
            }
        }

        files.sort();
        files.dedup();
        files
    }

    fn walker(&self, dir: &Path) -> WalkBuilder {
        let mut builder = WalkBuilder::new(dir);
        builder
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .require_git(false)
            .hidden(false);

        let out_dir = self.out_dir.clone();
        builder.filter_entry(move |entry| {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            !(is_dir
                && (is_excluded_dir(&entry.file_name().to_string_lossy())
                    || entry.path() == out_dir))
        });
        builder
    }
}

fn compile(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => warn!("Invalid pattern '{}': {}", pattern, e),
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "export default () => <div />;\n").unwrap();
    }

    fn relative(root: &Path, files: Vec<PathBuf>) -> Vec<String> {
        files
            .into_iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    fn project() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "src/components/Button/Button.tsx");
        touch(root, "src/components/Button/Button.test.tsx");
        touch(root, "src/components/Box/Box.tsx");
        touch(root, "src/components/Box/index.ts");
        touch(root, "src/utils/factories.tsx");
        touch(root, "node_modules/@fluentui/react/Button.tsx");
        touch(root, "dist/components/Button.tsx");
        touch(root, "componentInfo/Stale.tsx");
        temp
    }

    fn selector(root: &Path, include: &[&str], exclude: &[&str]) -> ComponentFiles {
        let strings = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        ComponentFiles::new(
            root,
            &root.join("componentInfo"),
            &strings(include),
            &strings(exclude),
        )
    }

    #[test]
    fn test_include_and_exclude_globs() {
        let temp = project();
        let files = selector(temp.path(), &["src/components/**/*.tsx"], &["*.test.tsx"])
            .collect(&[]);

        assert_eq!(
            relative(temp.path(), files),
            vec![
                "src/components/Box/Box.tsx",
                "src/components/Button/Button.tsx",
            ]
        );
    }

    #[test]
    fn test_output_and_dependency_dirs_never_match() {
        let temp = project();
        let files = selector(temp.path(), &["**/*.tsx"], &[]).collect(&[]);

        assert_eq!(
            relative(temp.path(), files),
            vec![
                "src/components/Box/Box.tsx",
                "src/components/Button/Button.test.tsx",
                "src/components/Button/Button.tsx",
                "src/utils/factories.tsx",
            ]
        );
    }

    #[test]
    fn test_globs_are_relative_to_root_for_sub_paths() {
        let temp = project();
        let files = selector(temp.path(), &["src/components/**/*.tsx"], &["**/Box/**"])
            .collect(&[PathBuf::from("src/components"), PathBuf::from("src/utils")]);

        assert_eq!(
            relative(temp.path(), files),
            vec![
                "src/components/Button/Button.test.tsx",
                "src/components/Button/Button.tsx",
            ]
        );
    }

    #[test]
    fn test_explicit_file_paths_and_overlap() {
        let temp = project();
        let selector = selector(temp.path(), &["**/*.tsx"], &[]);

        let files = selector.collect(&[
            PathBuf::from("src/components/Box/Box.tsx"),
            PathBuf::from("src/components/Box"),
            PathBuf::from("src/components/Box/index.ts"),
            PathBuf::from("src/components/Missing.tsx"),
        ]);
        assert_eq!(relative(temp.path(), files), vec!["src/components/Box/Box.tsx"]);
    }

    #[test]
    fn test_is_component_file_for_watch_events() {
        let temp = project();
        let root = temp.path();
        let selector = selector(root, &["src/**/*.tsx"], &["*.test.tsx"]);

        assert!(selector.is_component_file(&root.join("src/components/New/New.tsx")));
        assert!(!selector.is_component_file(&root.join("src/components/New/New.test.tsx")));
        assert!(!selector.is_component_file(&root.join("src/components/New/styles.css")));
        assert!(!selector.is_component_file(&root.join("src/lib/Internal.tsx")));
        assert!(!selector.is_component_file(&root.join("componentInfo/Button.tsx")));
        assert!(!selector.is_component_file(Path::new("/elsewhere/src/Button.tsx")));
    }

    #[test]
    fn test_gitignore_is_honored_unless_disabled() {
        let temp = project();
        let root = temp.path();
        fs::write(root.join(".gitignore"), "src/utils/\n").unwrap();

        let files = selector(root, &["src/**/*.tsx"], &["*.test.tsx"]).collect(&[]);
        assert!(!relative(root, files).contains(&"src/utils/factories.tsx".to_string()));

        let files = selector(root, &["src/**/*.tsx"], &["*.test.tsx"])
            .respect_gitignore(false)
            .collect(&[]);
        assert!(relative(root, files).contains(&"src/utils/factories.tsx".to_string()));
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let temp = project();
        let files = selector(temp.path(), &["src/components/**/*.tsx", "[unclosed"], &[])
            .collect(&[PathBuf::from("src/components/Box")]);
        assert_eq!(relative(temp.path(), files), vec!["src/components/Box/Box.tsx"]);
    }
}
