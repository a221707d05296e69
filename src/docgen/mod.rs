//! @dose
//! purpose: The prop parser. Given a Program and a file in it, returns one ComponentDoc per
//!     exported component definition: display name, raw doc comment and the flattened props
//!     (with requiredness, declared type text and parent interface provenance).
//!
//! when-editing:
//!     - !Returns every definition; enforcing "exactly one" is the caller's job
//!     - The `<DisplayName>Props` fallback only looks in the component's own module
//!
//! invariants:
//!     - ComponentDoc.file_path is the absolute, normalized path of the module
//!     - Props keep declaration order (own members first, inherited after)

mod props;

pub use props::{PropCollector, TypeDecl};

use crate::dependency::absolutize;
use crate::error::{DocgenError, Result};
use crate::parser::components::find_components;
use crate::parser::declarations::TypeExpr;
use crate::program::Program;
use crate::types::ComponentDoc;
use std::path::Path;
use tracing::debug;

/// Extract every component definition of `path`, resolving props through `program`
pub fn parse_with_program(program: &Program, path: &Path) -> Result<Vec<ComponentDoc>> {
    let abs = absolutize(path).map_err(|source| DocgenError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let module = program
        .module(&abs)
        .ok_or_else(|| DocgenError::NotInProgram { path: abs.clone() })?;

    let collector = PropCollector::new(program);
    let mut docs = Vec::new();

    for definition in find_components(module.file()) {
        let props_type = definition.props_type.clone().or_else(|| {
            let fallback = format!("{}Props", definition.display_name);
            module
                .declarations()
                .declares_type(&fallback)
                .then(|| TypeExpr::Reference {
                    name: fallback,
                    args: Vec::new(),
                })
        });

        let props = props_type
            .as_ref()
            .map(|expr| collector.collect(module, expr))
            .unwrap_or_default();

        debug!(
            "Found component {} in {} with {} props",
            definition.display_name,
            abs.display(),
            props.len()
        );

        docs.push(ComponentDoc {
            display_name: definition.display_name,
            description: definition.description.unwrap_or_default(),
            file_path: abs.clone(),
            binding: definition.binding,
            props,
        });
    }

    Ok(docs)
}

/// Build a single-file program and extract its component definitions
pub fn parse(path: &Path, tsconfig: Option<&Path>) -> Result<Vec<ComponentDoc>> {
    let program = Program::for_file(path, tsconfig)?;
    parse_with_program(&program, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_display_name_props_fallback() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Divider.tsx");
        fs::write(
            &path,
            r#"
export interface DividerProps {
  /** A divider can be fitted, without any space above or below it. */
  fitted?: boolean;
}

/**
 * A Divider visually segments content.
 */
const Divider = compose<'div', {}, {}, {}, {}>(Box, { displayName: 'Divider' });

export default Divider;
"#,
        )
        .unwrap();

        let docs = parse(&path, None).unwrap();
        assert_eq!(docs.len(), 1);
        let doc = &docs[0];
        assert_eq!(doc.display_name, "Divider");
        assert!(doc.description.contains("visually segments"));
        assert_eq!(doc.binding.as_deref(), Some("Divider"));
        assert_eq!(doc.props.len(), 0);

        // compose with empty object type arguments resolves to no props
        let fitted = fs::read_to_string(&path)
            .unwrap()
            .replace("compose<'div', {}, {}, {}, {}>", "compose");
        fs::write(&path, fitted).unwrap();

        let docs = parse(&path, None).unwrap();
        let fitted = docs[0].prop("fitted").unwrap();
        assert!(!fitted.required);
        assert_eq!(fitted.parent.as_ref().unwrap().name, "DividerProps");
    }

    #[test]
    fn test_file_outside_program() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("A.tsx");
        let b = temp.path().join("B.tsx");
        fs::write(&a, "export default () => <div />;\n").unwrap();
        fs::write(&b, "export default () => <div />;\n").unwrap();

        let program = Program::builder().add_root(&a).build().unwrap();
        let err = parse_with_program(&program, &b).unwrap_err();
        assert!(matches!(err, DocgenError::NotInProgram { .. }));
    }
}
