//! @dose
//! purpose: This module defines the records handed to the documentation site: the
//!     ComponentInfo for one component file, its sorted ComponentProp table, parsed
//!     DocBlocks and the per-prop type list. These serialize to the .info.json format.
//!
//! when-editing:
//!     - !Field names serialize in camelCase - the docs site reads them verbatim
//!     - !ComponentFileInfo is flattened into ComponentInfo, so its keys must never collide
//!     - Optional fields use skip_serializing_if to keep the JSON minimal
//!
//! invariants:
//!     - ComponentInfo.props is sorted by name
//!     - A ComponentInfo is never mutated after the extractor returns it
//!
//! do-not:
//!     - Never add a displayName field to ComponentFileInfo (the component's own wins)

use serde::{Deserialize, Serialize};

/// A single `@tag content` entry of a docblock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocTag {
    /// Tag name without the `@` (e.g., "docSiteIgnore", "deprecated")
    pub title: String,
    /// Text following the tag name, empty for bare tags
    pub content: String,
}

/// Parsed free-text comment: description plus tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocBlock {
    pub description: String,
    pub tags: Vec<DocTag>,
}

impl DocBlock {
    /// Check whether a tag with the given title is present
    pub fn has_tag(&self, title: &str) -> bool {
        self.tags.iter().any(|t| t.title == title)
    }
}

/// One member of a prop's declared type.
///
/// Unions produce one entry per member. Type references carry a `name` (and
/// `parameters` for generic arguments); predefined and literal types carry a
/// `keyword`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentPropType {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parameters: Option<Vec<ComponentPropType>>,
}

impl ComponentPropType {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Default::default()
        }
    }
}

/// A public prop that survived the visibility filters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentProp {
    pub name: String,
    pub description: String,
    pub tags: Vec<DocTag>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub default_value: Option<serde_json::Value>,
    pub types: Vec<ComponentPropType>,
    pub required: bool,
}

/// Metadata derived from a component's location on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentFileInfo {
    /// Name of the directory holding the file (e.g., "Toolbar")
    pub dirname: String,
    /// File name with extension
    pub filename: String,
    /// File name without its extension
    pub filename_without_ext: String,
    /// True when the file is named after its directory (Toolbar/Toolbar.tsx)
    pub is_parent: bool,
    /// True for every other component in the directory
    pub is_child: bool,
    /// Directory name for child components, None for parents
    pub parent_display_name: Option<String>,
    /// Forward-slash path relative to the repository root
    pub repo_path: String,
    /// Singular form of the grandparent directory (e.g., "component")
    #[serde(rename = "type")]
    pub component_type: String,
}

/// Structured description of one component's public interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInfo {
    #[serde(flatten)]
    pub file: ComponentFileInfo,
    pub display_name: String,
    pub docblock: DocBlock,
    pub props: Vec<ComponentProp>,
}

impl ComponentInfo {
    /// Look up a prop by name
    pub fn prop(&self, name: &str) -> Option<&ComponentProp> {
        self.props.iter().find(|p| p.name == name)
    }
}

/// Entry of the generated component menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMenuItem {
    pub display_name: String,
    #[serde(rename = "type")]
    pub component_type: String,
}
