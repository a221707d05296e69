//! Location-derived metadata of a component file.

use crate::dependency::normalize_separators;
use crate::types::ComponentFileInfo;
use std::path::{Path, PathBuf};

/// Derive file metadata for an absolute component path.
///
/// `repo_root` overrides the repository root used for `repo_path`; without it the
/// nearest ancestor holding a `.git` entry is used, and failing that the path stays absolute.
pub fn get_component_file_info(abs_path: &Path, repo_root: Option<&Path>) -> ComponentFileInfo {
    let dir = abs_path.parent().unwrap_or(Path::new(""));
    let dirname = file_name_string(dir);
    let filename = file_name_string(abs_path);
    let filename_without_ext = abs_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    // "component" for src/components/Button/Button.tsx
    let component_type = dir
        .parent()
        .map(file_name_string)
        .map(|name| name.strip_suffix('s').map(str::to_string).unwrap_or(name))
        .unwrap_or_default();

    let is_parent = filename_without_ext == dirname;

    let root = repo_root
        .map(Path::to_path_buf)
        .or_else(|| find_repo_root(abs_path));
    let repo_path = root
        .as_deref()
        .and_then(|root| abs_path.strip_prefix(root).ok())
        .unwrap_or(abs_path);

    ComponentFileInfo {
        parent_display_name: (!is_parent).then(|| dirname.clone()),
        dirname,
        filename,
        filename_without_ext,
        is_parent,
        is_child: !is_parent,
        repo_path: normalize_separators(&repo_path.to_string_lossy()),
        component_type,
    }
}

/// Nearest ancestor directory containing `.git`
pub fn find_repo_root(path: &Path) -> Option<PathBuf> {
    path.ancestors()
        .skip(1)
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
