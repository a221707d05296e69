//! @dose
//! purpose: Produces the ComponentInfo record of a single-component file: runs the prop
//!     parser, enforces the one-component/default-export contract, filters props by
//!     parent interface and `@docSiteIgnore`, resolves types and static defaults, and
//!     optionally hands everything to a schema resolver for a custom record.
//!
//! when-editing:
//!     - !Check order is fixed: structural (zero/many), then default export, then props
//!     - !The base record must be identical with or without a resolver
//!     - Prop descriptions are re-parsed here; the prop parser keeps raw comment text
//!
//! invariants:
//!     - ComponentInfo.props is sorted by name
//!     - A prop is kept only if it has a parent, the parent is not ignored, and it has no
//!       docSiteIgnore tag
//!     - No partial record is ever returned
//!
//! gotchas:
//!     - NoComponent/MultipleComponents name the path as given, MissingDefaultExport
//!       names the absolute path
//!     - Without a shared Program a one-file Program is built per call (slow for batches)

mod file_info;

pub use file_info::{find_repo_root, get_component_file_info};

use crate::dependency::absolutize;
use crate::docgen::parse_with_program;
use crate::error::{DocgenError, Result};
use crate::parser::defaults::DefaultProps;
use crate::parser::docblock::parse_doc_block;
use crate::parser::types::parse_type;
use crate::parser::ParsedFile;
use crate::program::Program;
use crate::types::{ComponentDoc, ComponentInfo, ComponentProp};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tag that hides a prop from the documentation site
pub const DOC_SITE_IGNORE_TAG: &str = "docSiteIgnore";

/// Inputs of a single extraction
#[derive(Debug, Clone, Default)]
pub struct GetComponentInfoOptions<'p> {
    /// File containing a single component, relative to the current directory or absolute
    pub file_path: PathBuf,
    /// tsconfig used to build a one-file program; ignored when `program` is set
    pub tsconfig_path: Option<PathBuf>,
    /// Shared program already containing the file
    pub program: Option<&'p Program>,
    /// Props inherited from these interfaces are dropped
    pub ignored_parent_interfaces: Vec<String>,
    /// Root that `repoPath` is relative to
    pub repo_root: Option<PathBuf>,
}

impl<'p> GetComponentInfoOptions<'p> {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Default::default()
        }
    }

    pub fn with_program(mut self, program: &'p Program) -> Self {
        self.program = Some(program);
        self
    }

    pub fn with_tsconfig(mut self, tsconfig_path: impl Into<PathBuf>) -> Self {
        self.tsconfig_path = Some(tsconfig_path.into());
        self
    }

    pub fn ignore_parent_interfaces<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_parent_interfaces
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_repo_root(mut self, repo_root: impl Into<PathBuf>) -> Self {
        self.repo_root = Some(repo_root.into());
        self
    }
}

/// Everything a schema resolver can build a custom record from
#[derive(Debug)]
pub struct ComponentInfoSchemaResolverParams<'a> {
    /// Absolute path of the component file
    pub abs_path: &'a Path,
    /// The base record
    pub shared_component_info: ComponentInfo,
    /// Prop parser output for the component
    pub component_doc: &'a ComponentDoc,
    /// Parsed source of the component file
    pub component_file: &'a ParsedFile,
    /// Statically resolved default props of the component
    pub default_props: &'a DefaultProps,
}

/// Derives a custom record from the base ComponentInfo. Closures taking
/// `ComponentInfoSchemaResolverParams` implement it.
pub trait ComponentInfoSchemaResolver {
    type Output: Serialize;

    fn resolve(&self, params: ComponentInfoSchemaResolverParams<'_>) -> Self::Output;
}

impl<F, T> ComponentInfoSchemaResolver for F
where
    F: Fn(ComponentInfoSchemaResolverParams<'_>) -> T,
    T: Serialize,
{
    type Output = T;

    fn resolve(&self, params: ComponentInfoSchemaResolverParams<'_>) -> T {
        self(params)
    }
}

/// Extract the ComponentInfo of a single-component file
pub fn get_component_info(options: &GetComponentInfoOptions<'_>) -> Result<ComponentInfo> {
    get_component_info_with(options, |params: ComponentInfoSchemaResolverParams<'_>| {
        params.shared_component_info
    })
}

/// Extract the ComponentInfo of a file and pass it through a schema resolver
pub fn get_component_info_with<R: ComponentInfoSchemaResolver>(
    options: &GetComponentInfoOptions<'_>,
    resolver: R,
) -> Result<R::Output> {
    let abs_path = absolutize(&options.file_path).map_err(|source| DocgenError::Io {
        path: options.file_path.clone(),
        source,
    })?;

    let owned_program;
    let program = match options.program {
        Some(program) => program,
        None => {
            owned_program = Program::for_file(&abs_path, options.tsconfig_path.as_deref())?;
            &owned_program
        }
    };

    let mut components = parse_with_program(program, &abs_path)?;
    if components.is_empty() {
        return Err(DocgenError::NoComponent {
            path: options.file_path.clone(),
        });
    }
    if components.len() > 1 {
        return Err(DocgenError::MultipleComponents {
            path: options.file_path.clone(),
        });
    }
    let component_doc = components.remove(0);

    let module = program
        .module(&abs_path)
        .ok_or_else(|| DocgenError::NotInProgram {
            path: abs_path.clone(),
        })?;
    if !module.declarations().has_default_export {
        return Err(DocgenError::MissingDefaultExport { path: abs_path });
    }

    let component_file = module.file();
    let docblock = parse_doc_block(&component_doc.description);
    let default_props = program.default_props(
        component_file,
        component_doc.binding.as_deref().unwrap_or("default"),
    );

    let mut props = Vec::new();
    for prop_def in &component_doc.props {
        let block = parse_doc_block(&prop_def.description);
        let parent_interface = prop_def.parent.as_ref().map(|p| p.name.as_str());

        let visible_in_definition = parent_interface
            .map(|name| !options.ignored_parent_interfaces.iter().any(|i| i == name))
            .unwrap_or(false);
        let visible_in_tags = !block.has_tag(DOC_SITE_IGNORE_TAG);

        if !(visible_in_definition && visible_in_tags) {
            debug!(
                "Skipping prop {}.{} (parent: {:?})",
                component_doc.display_name, prop_def.name, parent_interface
            );
            continue;
        }

        let types = parse_type(
            component_file,
            &component_doc.display_name,
            &prop_def.name,
            prop_def,
        );

        props.push(ComponentProp {
            name: prop_def.name.clone(),
            description: block.description,
            tags: block.tags,
            default_value: default_props.get(&prop_def.name).cloned(),
            types,
            required: prop_def.required,
        });
    }

    props.sort_by(|a, b| a.name.cmp(&b.name));

    let shared_component_info = ComponentInfo {
        file: get_component_file_info(&abs_path, options.repo_root.as_deref()),
        display_name: component_doc.display_name.clone(),
        docblock,
        props,
    };

    Ok(resolver.resolve(ComponentInfoSchemaResolverParams {
        abs_path: &abs_path,
        shared_component_info,
        component_doc: &component_doc,
        component_file,
        default_props: &default_props,
    }))
}
