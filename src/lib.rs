//! @dose
//! purpose: This is the library crate root for northstar-docgen, exposing the public API for use
//!     as both a CLI tool and a library. The core entry point is get_component_info, which
//!     turns one component file into the ComponentInfo record behind a documentation prop table.
//!
//! when-editing:
//!     - !All public modules must be declared here with pub mod
//!     - !Re-exports should include commonly used types and functions
//!     - Keep the re-export list organized by module
//!
//! invariants:
//!     - The public API surface is stable - all re-exported items are public contract
//!     - Library calls never print; only the commands module writes to stdout
//!
//! do-not:
//!     - Never remove a re-export without major version bump (breaking change)
//!
//! gotchas:
//!     - The lib.rs is separate from main.rs - library consumers get lib, CLI gets main
//!     - Library callers install their own tracing subscriber; without one, logs are dropped

pub mod cli;
pub mod commands;
pub mod config;
pub mod dependency;
pub mod discovery;
pub mod docgen;
pub mod error;
pub mod formatter;
pub mod info;
pub mod parser;
pub mod program;
pub mod types;

// Re-export main types for convenience
pub use config::Config;
pub use error::{DocgenError, Result};
pub use formatter::{build_component_menu, format_info, parse_info};
pub use info::{
    get_component_info, get_component_info_with, ComponentInfoSchemaResolver,
    ComponentInfoSchemaResolverParams, GetComponentInfoOptions, DOC_SITE_IGNORE_TAG,
};
pub use parser::{ParseError, ParsedFile, TypeScriptParser};
pub use program::Program;
pub use types::{
    ComponentDoc, ComponentFileInfo, ComponentInfo, ComponentMenuItem, ComponentProp,
    ComponentPropType, DocBlock, DocTag, ParentType, PropItem,
};
