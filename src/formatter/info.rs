//! @dose
//! purpose: Serializes ComponentInfo records to the .info.json files the documentation site
//!     loads, and builds the componentMenu.json index of parent components.
//!
//! when-editing:
//!     - !Output is pretty JSON with two-space indent and a trailing newline, so rewrites of
//!       unchanged records are byte-identical (generate compares bytes)
//!     - Field order comes from the struct definitions in types::component
//!
//! invariants:
//!     - The menu lists only parent components, sorted by display name
//!     - info_file_name(x) always ends with INFO_FILE_SUFFIX

use crate::types::{ComponentInfo, ComponentMenuItem};
use serde::Serialize;
use std::path::Path;

/// Suffix of generated component info files
pub const INFO_FILE_SUFFIX: &str = ".info.json";

/// File name of the generated menu
pub const MENU_FILE_NAME: &str = "componentMenu.json";

/// Serialize any record as pretty (or single-line) JSON with a trailing newline
pub fn format_info<T: Serialize + ?Sized>(value: &T, compact: bool) -> serde_json::Result<String> {
    let mut out = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    out.push('\n');
    Ok(out)
}

/// Parse an .info.json file back into a ComponentInfo
pub fn parse_info(content: &str) -> serde_json::Result<ComponentInfo> {
    serde_json::from_str(content)
}

/// `Button` -> `Button.info.json`
pub fn info_file_name(display_name: &str) -> String {
    format!("{display_name}{INFO_FILE_SUFFIX}")
}

/// Check if a path names a generated info file
pub fn is_info_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.ends_with(INFO_FILE_SUFFIX))
        .unwrap_or(false)
}

/// Menu entries for every parent component, sorted by display name
pub fn build_component_menu<'a, I>(infos: I) -> Vec<ComponentMenuItem>
where
    I: IntoIterator<Item = &'a ComponentInfo>,
{
    let mut menu: Vec<ComponentMenuItem> = infos
        .into_iter()
        .filter(|info| info.file.is_parent)
        .map(|info| ComponentMenuItem {
            display_name: info.display_name.clone(),
            component_type: info.file.component_type.clone(),
        })
        .collect();
    menu.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    menu
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComponentFileInfo, DocBlock};
    use pretty_assertions::assert_eq;

    fn info(display_name: &str, dirname: &str) -> ComponentInfo {
        let is_parent = display_name == dirname;
        ComponentInfo {
            file: ComponentFileInfo {
                dirname: dirname.to_string(),
                filename: format!("{display_name}.tsx"),
                filename_without_ext: display_name.to_string(),
                is_parent,
                is_child: !is_parent,
                parent_display_name: (!is_parent).then(|| dirname.to_string()),
                repo_path: format!("src/components/{dirname}/{display_name}.tsx"),
                component_type: "component".to_string(),
            },
            display_name: display_name.to_string(),
            docblock: DocBlock::default(),
            props: Vec::new(),
        }
    }

    #[test]
    fn test_format_pretty_and_compact() {
        let record = info("Toolbar", "Toolbar");

        let pretty = format_info(&record, false).unwrap();
        assert!(pretty.starts_with("{\n  \"dirname\": \"Toolbar\""));
        assert!(pretty.ends_with("}\n"));

        let compact = format_info(&record, true).unwrap();
        assert_eq!(compact.lines().count(), 1);
        assert_eq!(parse_info(&compact).unwrap(), record);
    }

    #[test]
    fn test_info_file_names() {
        assert_eq!(info_file_name("ToolbarItem"), "ToolbarItem.info.json");
        assert!(is_info_file(Path::new("out/ToolbarItem.info.json")));
        assert!(!is_info_file(Path::new("out/componentMenu.json")));
    }

    #[test]
    fn test_menu_lists_sorted_parents() {
        let infos = vec![
            info("Toolbar", "Toolbar"),
            info("ToolbarItem", "Toolbar"),
            info("Avatar", "Avatar"),
        ];

        let menu = build_component_menu(&infos);
        assert_eq!(
            menu,
            vec![
                ComponentMenuItem {
                    display_name: "Avatar".to_string(),
                    component_type: "component".to_string(),
                },
                ComponentMenuItem {
                    display_name: "Toolbar".to_string(),
                    component_type: "component".to_string(),
                },
            ]
        );
        let json = format_info(&menu, false).unwrap();
        assert!(json.contains("\"displayName\": \"Avatar\""));
        assert!(json.contains("\"type\": \"component\""));
    }
}
