//! Intermediate records produced by the prop parser, before visibility
//! filtering and type/default resolution.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The declaration a prop was inherited from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentType {
    /// Interface or type alias name (e.g., "UIComponentProps")
    pub name: String,
    /// File that declares it
    pub file_name: PathBuf,
}

/// A declared prop as seen by the prop parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropItem {
    pub name: String,
    /// Raw doc comment text, tags included
    pub description: String,
    pub required: bool,
    /// Declared type as written in source
    #[serde(rename = "type")]
    pub type_name: String,
    /// None for members of anonymous object types
    pub parent: Option<ParentType>,
}

/// One component definition found by the prop parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDoc {
    pub display_name: String,
    /// Raw doc comment of the definition, tags included
    pub description: String,
    pub file_path: PathBuf,
    /// Local binding of the definition (None for anonymous default exports)
    pub binding: Option<String>,
    /// Props in declaration order; own members first, inherited after
    pub props: Vec<PropItem>,
}

impl ComponentDoc {
    pub fn prop(&self, name: &str) -> Option<&PropItem> {
        self.props.iter().find(|p| p.name == name)
    }
}
