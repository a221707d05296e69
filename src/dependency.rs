//! @dose
//! purpose: Reverse import graph between source files plus the lexical path helpers used
//!     across the crate. Watch mode uses the graph to find every component whose props may
//!     change when a shared interface file is edited.
//!
//! when-editing:
//!     - !Keys are absolute, lexically normalized paths (see normalize_path)
//!     - !Forward and reverse maps must be updated together in add_file/remove_file
//!
//! invariants:
//!     - Forward and reverse maps always describe the same edge set
//!     - transitive_importers always contains the queried file itself
//!
//! do-not:
//!     - Never use filesystem IO for path normalization (use lexical normalization only)

use crate::program::Program;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Component, Path, PathBuf};

/// Import relationships between files of a program.
/// Maintains both forward (what a file imports) and reverse (what imports a file) lookups.
#[derive(Default, Debug)]
pub struct DependencyGraph {
    /// Reverse: maps file path to files that import it
    pub imported_by: HashMap<PathBuf, HashSet<PathBuf>>,
    /// Forward: maps file path to files it imports
    pub imports: HashMap<PathBuf, Vec<PathBuf>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from every module loaded in a program
    pub fn from_program(program: &Program) -> Self {
        let mut graph = Self::new();
        for module in program.modules() {
            graph.add_file(module.path(), module.dependencies().to_vec());
        }
        graph
    }

    /// Files that directly import the given file
    pub fn get_imported_by(&self, file_path: &Path) -> Vec<PathBuf> {
        let mut importers: Vec<PathBuf> = self
            .imported_by
            .get(file_path)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default();
        importers.sort();
        importers
    }

    /// Add a file with its resolved imports. This populates both forward and reverse maps.
    pub fn add_file(&mut self, file_path: &Path, file_imports: Vec<PathBuf>) {
        for target in &file_imports {
            self.imported_by
                .entry(target.clone())
                .or_default()
                .insert(file_path.to_path_buf());
        }
        self.imports.insert(file_path.to_path_buf(), file_imports);
    }

    /// Remove a file's outgoing edges. Incoming edges are kept: importers still
    /// reference the path and will be re-linked if the file comes back.
    pub fn remove_file(&mut self, file_path: &Path) {
        if let Some(file_imports) = self.imports.remove(file_path) {
            for target in file_imports {
                if let Some(importers) = self.imported_by.get_mut(&target) {
                    importers.remove(file_path);
                    if importers.is_empty() {
                        self.imported_by.remove(&target);
                    }
                }
            }
        }
    }

    /// Replace a file's outgoing edges
    pub fn update_file(&mut self, file_path: &Path, file_imports: Vec<PathBuf>) {
        self.remove_file(file_path);
        self.add_file(file_path, file_imports);
    }

    /// The file plus every file that reaches it through a chain of imports
    pub fn transitive_importers(&self, file_path: &Path) -> HashSet<PathBuf> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(file_path.to_path_buf());
        queue.push_back(file_path.to_path_buf());

        while let Some(current) = queue.pop_front() {
            if let Some(importers) = self.imported_by.get(&current) {
                for importer in importers {
                    if seen.insert(importer.clone()) {
                        queue.push_back(importer.clone());
                    }
                }
            }
        }

        seen
    }
}

/// Simple path normalization (resolve . and ..)
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            _ => {
                result.push(component);
            }
        }
    }
    result
}

/// Make a path absolute against the current directory, then normalize it
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize_path(path));
    }
    Ok(normalize_path(&std::env::current_dir()?.join(path)))
}

/// Normalize path separators to forward slashes for cross-platform consistency
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> PathBuf {
        PathBuf::from(s)
    }

    #[test]
    fn test_add_file_updates_both_maps() {
        let mut graph = DependencyGraph::new();
        graph.add_file(
            &p("/src/Button.tsx"),
            vec![p("/src/utils/index.ts"), p("/src/Box.tsx")],
        );

        assert_eq!(graph.imports.get(&p("/src/Button.tsx")).unwrap().len(), 2);
        assert_eq!(
            graph.get_imported_by(&p("/src/Box.tsx")),
            vec![p("/src/Button.tsx")]
        );
    }

    #[test]
    fn test_remove_file_cleans_reverse_map() {
        let mut graph = DependencyGraph::new();
        graph.add_file(&p("/src/Button.tsx"), vec![p("/src/Box.tsx")]);

        graph.remove_file(&p("/src/Button.tsx"));

        assert!(!graph.imports.contains_key(&p("/src/Button.tsx")));
        assert!(graph.get_imported_by(&p("/src/Box.tsx")).is_empty());
    }

    #[test]
    fn test_update_file_replaces_edges() {
        let mut graph = DependencyGraph::new();
        graph.add_file(&p("/src/Button.tsx"), vec![p("/src/Box.tsx")]);

        graph.update_file(&p("/src/Button.tsx"), vec![p("/src/Icon.tsx")]);

        assert!(graph.get_imported_by(&p("/src/Box.tsx")).is_empty());
        assert_eq!(
            graph.get_imported_by(&p("/src/Icon.tsx")),
            vec![p("/src/Button.tsx")]
        );
    }

    #[test]
    fn test_transitive_importers() {
        let mut graph = DependencyGraph::new();
        graph.add_file(&p("/src/utils/index.ts"), vec![p("/src/utils/common.ts")]);
        graph.add_file(&p("/src/Box.tsx"), vec![p("/src/utils/index.ts")]);
        graph.add_file(&p("/src/Button.tsx"), vec![p("/src/Box.tsx")]);
        graph.add_file(&p("/src/Icon.tsx"), vec![]);

        let affected = graph.transitive_importers(&p("/src/utils/common.ts"));

        assert!(affected.contains(&p("/src/utils/common.ts")));
        assert!(affected.contains(&p("/src/Box.tsx")));
        assert!(affected.contains(&p("/src/Button.tsx")));
        assert!(!affected.contains(&p("/src/Icon.tsx")));
    }

    #[test]
    fn test_transitive_importers_handles_cycles() {
        let mut graph = DependencyGraph::new();
        graph.add_file(&p("/a.ts"), vec![p("/b.ts")]);
        graph.add_file(&p("/b.ts"), vec![p("/a.ts")]);

        let affected = graph.transitive_importers(&p("/a.ts"));
        assert_eq!(affected.len(), 2);
    }

    #[test]
    fn test_normalize_separators() {
        assert_eq!(
            normalize_separators("src\\utils\\file.ts"),
            "src/utils/file.ts"
        );
        assert_eq!(
            normalize_separators("src/utils/file.ts"),
            "src/utils/file.ts"
        );
    }

    #[test]
    fn test_normalize_path() {
        let path = PathBuf::from("/a/b/../c/./d");
        let normalized = normalize_path(&path);
        assert_eq!(normalized, PathBuf::from("/a/c/d"));
    }

    #[test]
    fn test_absolutize_relative() {
        let abs = absolutize(Path::new("src/../Button.tsx")).unwrap();
        assert!(abs.is_absolute());
        assert!(abs.ends_with("Button.tsx"));
        assert!(!abs.to_string_lossy().contains(".."));
    }
}
