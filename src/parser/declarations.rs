//! @dose
//! purpose: Extracts the module-level type surface of a source file: imports, re-exports,
//!     interfaces and type aliases. The result is owned data (no tree-sitter nodes), so a
//!     Program can resolve props across files without holding borrows into other trees.
//!
//! when-editing:
//!     - !TypeExpr is a deliberately small model; anything it cannot express becomes Other
//!     - !Member docs are the raw `/** */` text; docblock parsing happens later
//!     - Only top-level statements are scanned (namespaces and nested blocks are ignored)
//!
//! invariants:
//!     - Union and intersection members are flattened (no nested Union inside a Union)
//!     - Member order follows source order
//!
//! gotchas:
//!     - `import React, { FC } from 'react'` yields two bindings from one statement
//!     - `export { A as B } from './x'` is a re-export, `export { A as B }` is a local alias
//!     - Property names may be string literals (`'aria-label'?: string`) and get unquoted

use crate::parser::{child_of_kind, leading_doc_comment, node_text, unquote, ParsedFile};
use std::collections::HashMap;
use std::fmt;
use tree_sitter::Node;

/// How a local name was brought into scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    /// `import { imported as local } from 'specifier'`
    Named { specifier: String, imported: String },
    /// `import local from 'specifier'`
    Default { specifier: String },
    /// `import * as local from 'specifier'`
    Namespace { specifier: String },
}

impl ImportBinding {
    pub fn specifier(&self) -> &str {
        match self {
            ImportBinding::Named { specifier, .. }
            | ImportBinding::Default { specifier }
            | ImportBinding::Namespace { specifier } => specifier,
        }
    }
}

/// What an exported name refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// A declaration (or import) of this module, by local name
    Local(String),
    /// `export { imported as exported } from 'specifier'`
    ReExport { specifier: String, imported: String },
}

/// Simplified type expression used for prop resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `Name`, `ns.Name` or `Name<Args>`
    Reference { name: String, args: Vec<TypeExpr> },
    /// Anonymous object type `{ a: string }`
    Object(Vec<MemberDecl>),
    Intersection(Vec<TypeExpr>),
    Union(Vec<TypeExpr>),
    /// String literal type, unquoted
    Literal(String),
    /// Anything else, as written
    Other(String),
}

/// A property or method signature of an interface or object type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDecl {
    pub name: String,
    pub optional: bool,
    /// Declared type as written (method signatures keep their parameter list)
    pub type_text: String,
    /// Raw doc comment, if any
    pub doc: Option<String>,
}

/// A generic parameter of an interface or alias: `TContent = React.ReactNode`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    pub default: Option<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<TypeExpr>,
    pub members: Vec<MemberDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAliasDecl {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub value: TypeExpr,
}

/// Type-level summary of one module
#[derive(Debug, Clone, Default)]
pub struct ModuleDeclarations {
    /// Local name -> import binding
    pub imports: HashMap<String, ImportBinding>,
    /// Exported name -> target
    pub exports: HashMap<String, ExportTarget>,
    /// Specifiers of `export * from '...'`
    pub star_exports: Vec<String>,
    pub interfaces: HashMap<String, InterfaceDecl>,
    pub aliases: HashMap<String, TypeAliasDecl>,
    /// Whether the module has any form of default export
    pub has_default_export: bool,
}

impl ModuleDeclarations {
    /// Every module specifier this file depends on (imports and re-exports)
    pub fn specifiers(&self) -> Vec<String> {
        let mut specs: Vec<String> = self
            .imports
            .values()
            .map(|b| b.specifier().to_string())
            .collect();
        for target in self.exports.values() {
            if let ExportTarget::ReExport { specifier, .. } = target {
                specs.push(specifier.clone());
            }
        }
        specs.extend(self.star_exports.iter().cloned());
        specs.sort();
        specs.dedup();
        specs
    }

    /// Check if a type name is declared in this module
    pub fn declares_type(&self, name: &str) -> bool {
        self.interfaces.contains_key(name) || self.aliases.contains_key(name)
    }
}

/// Extract the type-level declarations of a parsed file
pub fn extract_declarations(file: &ParsedFile) -> ModuleDeclarations {
    let source = file.source();
    let mut decls = ModuleDeclarations::default();

    for node in file.top_level() {
        match node.kind() {
            "import_statement" => collect_import(node, source, &mut decls),
            "export_statement" => collect_export(node, source, &mut decls),
            "interface_declaration" | "type_alias_declaration" => {
                collect_type_declaration(node, source, &mut decls);
            }
            _ => {}
        }
    }

    decls
}

fn collect_import(node: Node, source: &str, decls: &mut ModuleDeclarations) {
    let Some(source_node) = node.child_by_field_name("source") else {
        return;
    };
    let specifier = unquote(node_text(source_node, source)).to_string();
    let Some(clause) = child_of_kind(node, "import_clause") else {
        return;
    };

    let mut cursor = clause.walk();
    for child in clause.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => {
                decls.imports.insert(
                    node_text(child, source).to_string(),
                    ImportBinding::Default {
                        specifier: specifier.clone(),
                    },
                );
            }
            "namespace_import" => {
                if let Some(id) = child_of_kind(child, "identifier") {
                    decls.imports.insert(
                        node_text(id, source).to_string(),
                        ImportBinding::Namespace {
                            specifier: specifier.clone(),
                        },
                    );
                }
            }
            "named_imports" => {
                let mut inner = child.walk();
                for spec in child.named_children(&mut inner) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    let Some(name) = spec.child_by_field_name("name") else {
                        continue;
                    };
                    let imported = unquote(node_text(name, source)).to_string();
                    let local = spec
                        .child_by_field_name("alias")
                        .map(|a| node_text(a, source).to_string())
                        .unwrap_or_else(|| imported.clone());
                    decls.imports.insert(
                        local,
                        ImportBinding::Named {
                            specifier: specifier.clone(),
                            imported,
                        },
                    );
                }
            }
            _ => {}
        }
    }
}

fn collect_export(node: Node, source: &str, decls: &mut ModuleDeclarations) {
    let reexport_from = node
        .child_by_field_name("source")
        .map(|s| unquote(node_text(s, source)).to_string());

    if child_of_kind(node, "default").is_some() {
        decls.has_default_export = true;
    }

    if let Some(declaration) = node.child_by_field_name("declaration") {
        match declaration.kind() {
            "interface_declaration" | "type_alias_declaration" => {
                if let Some(name) = collect_type_declaration(declaration, source, decls) {
                    decls.exports.insert(name.clone(), ExportTarget::Local(name));
                }
            }
            "function_declaration" | "class_declaration" | "abstract_class_declaration"
            | "enum_declaration" => {
                if let Some(name) = declaration.child_by_field_name("name") {
                    let name = node_text(name, source).to_string();
                    decls.exports.insert(name.clone(), ExportTarget::Local(name));
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = declaration.walk();
                for declarator in declaration.named_children(&mut cursor) {
                    if declarator.kind() != "variable_declarator" {
                        continue;
                    }
                    if let Some(name) = declarator.child_by_field_name("name") {
                        let name = node_text(name, source).to_string();
                        decls.exports.insert(name.clone(), ExportTarget::Local(name));
                    }
                }
            }
            _ => {}
        }
        return;
    }

    if let Some(clause) = child_of_kind(node, "export_clause") {
        let mut cursor = clause.walk();
        for spec in clause.named_children(&mut cursor) {
            if spec.kind() != "export_specifier" {
                continue;
            }
            let Some(name) = spec.child_by_field_name("name") else {
                continue;
            };
            let local = unquote(node_text(name, source)).to_string();
            let exported = spec
                .child_by_field_name("alias")
                .map(|a| unquote(node_text(a, source)).to_string())
                .unwrap_or_else(|| local.clone());
            if exported == "default" {
                decls.has_default_export = true;
            }
            let target = match &reexport_from {
                Some(specifier) => ExportTarget::ReExport {
                    specifier: specifier.clone(),
                    imported: local,
                },
                None => ExportTarget::Local(local),
            };
            decls.exports.insert(exported, target);
        }
        return;
    }

    // `export * from './x'` (but not `export * as ns from './x'`)
    if let Some(specifier) = reexport_from {
        if child_of_kind(node, "namespace_export").is_none() {
            decls.star_exports.push(specifier);
        }
    }
}

fn collect_type_declaration(
    node: Node,
    source: &str,
    decls: &mut ModuleDeclarations,
) -> Option<String> {
    let name = node_text(node.child_by_field_name("name")?, source).to_string();
    let type_params = node
        .child_by_field_name("type_parameters")
        .map(|params| type_parameters(params, source))
        .unwrap_or_default();

    match node.kind() {
        "interface_declaration" => {
            let mut extends = Vec::new();
            if let Some(clause) = child_of_kind(node, "extends_type_clause") {
                let mut cursor = clause.walk();
                for ty in clause.named_children(&mut cursor) {
                    extends.push(TypeExpr::from_node(ty, source));
                }
            }
            let members = node
                .child_by_field_name("body")
                .map(|body| collect_members(body, source))
                .unwrap_or_default();
            decls.interfaces.insert(
                name.clone(),
                InterfaceDecl {
                    name: name.clone(),
                    type_params,
                    extends,
                    members,
                },
            );
        }
        "type_alias_declaration" => {
            let value = node
                .child_by_field_name("value")
                .map(|v| TypeExpr::from_node(v, source))
                .unwrap_or_else(|| TypeExpr::Other(String::new()));
            decls.aliases.insert(
                name.clone(),
                TypeAliasDecl {
                    name: name.clone(),
                    type_params,
                    value,
                },
            );
        }
        _ => return None,
    }

    Some(name)
}

/// Collect property/method signatures of an interface body or object type
pub(crate) fn collect_members(body: Node, source: &str) -> Vec<MemberDecl> {
    let mut members = Vec::new();
    let mut cursor = body.walk();

    for child in body.named_children(&mut cursor) {
        if !matches!(child.kind(), "property_signature" | "method_signature") {
            continue;
        }
        let Some(name_node) = child.child_by_field_name("name") else {
            continue;
        };
        let name = unquote(node_text(name_node, source)).to_string();
        let optional = child_of_kind(child, "?").is_some();

        let type_text = if child.kind() == "method_signature" {
            method_type_text(child, source)
        } else {
            child
                .child_by_field_name("type")
                .and_then(|ann| ann.named_child(0))
                .map(|t| node_text(t, source).to_string())
                .unwrap_or_else(|| "any".to_string())
        };

        members.push(MemberDecl {
            name,
            optional,
            type_text,
            doc: leading_doc_comment(child, source).map(str::to_string),
        });
    }

    members
}

/// Function type of a method signature: `onChange?(value: string): void` => `(value: string) => void`
pub(crate) fn method_type_text(method: Node, source: &str) -> String {
    let type_params = method
        .child_by_field_name("type_parameters")
        .map(|p| node_text(p, source))
        .unwrap_or_default();
    let params = method
        .child_by_field_name("parameters")
        .map(|p| node_text(p, source))
        .unwrap_or("()");
    let returns = method
        .child_by_field_name("return_type")
        .and_then(|r| r.named_child(0))
        .map(|r| node_text(r, source))
        .unwrap_or("any");
    format!("{type_params}{params} => {returns}")
}

fn type_parameters(node: Node, source: &str) -> Vec<TypeParam> {
    let mut cursor = node.walk();
    let params = node
        .named_children(&mut cursor)
        .filter(|p| p.kind() == "type_parameter")
        .filter_map(|p| {
            let name = node_text(p.child_by_field_name("name")?, source).to_string();
            let default = p
                .child_by_field_name("value")
                .and_then(|v| v.named_child(0))
                .map(|t| TypeExpr::from_node(t, source));
            Some(TypeParam { name, default })
        })
        .collect();
    params
}

/// Replace type parameter names in a type written as text. Member access (`React.T`)
/// and quoted literals are left alone.
pub fn substitute_type_text(text: &str, params: &HashMap<String, TypeExpr>) -> String {
    if params.is_empty() {
        return text.to_string();
    }

    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut prev = '\0';
    let mut chars = text.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        if let Some(q) = quote {
            if ch == q && prev != '\\' {
                quote = None;
            }
            out.push(ch);
            prev = ch;
            continue;
        }
        if matches!(ch, '\'' | '"' | '`') {
            quote = Some(ch);
            out.push(ch);
            prev = ch;
            continue;
        }
        if !is_ident(ch) || ch.is_ascii_digit() {
            out.push(ch);
            prev = ch;
            continue;
        }

        let mut end = start + ch.len_utf8();
        while let Some(&(i, next)) = chars.peek() {
            if !is_ident(next) {
                break;
            }
            end = i + next.len_utf8();
            chars.next();
        }
        let word = &text[start..end];
        match params.get(word) {
            Some(arg) if prev != '.' => out.push_str(&arg.to_string()),
            _ => out.push_str(word),
        }
        prev = word.chars().last().unwrap_or(ch);
    }

    out
}

impl TypeExpr {
    /// Build a TypeExpr from a type node (or a `type_annotation` wrapping one)
    pub fn from_node(node: Node, source: &str) -> Self {
        match node.kind() {
            "type_annotation" | "parenthesized_type" => match node.named_child(0) {
                Some(inner) => Self::from_node(inner, source),
                None => TypeExpr::Other(node_text(node, source).to_string()),
            },
            "type_identifier" | "nested_type_identifier" | "identifier" => TypeExpr::Reference {
                name: node_text(node, source).to_string(),
                args: Vec::new(),
            },
            "generic_type" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| node_text(n, source).to_string())
                    .unwrap_or_default();
                let args = node
                    .child_by_field_name("type_arguments")
                    .map(|a| type_arguments(a, source))
                    .unwrap_or_default();
                TypeExpr::Reference { name, args }
            }
            "object_type" => TypeExpr::Object(collect_members(node, source)),
            "intersection_type" => {
                let mut parts = Vec::new();
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    match Self::from_node(child, source) {
                        TypeExpr::Intersection(inner) => parts.extend(inner),
                        other => parts.push(other),
                    }
                }
                TypeExpr::Intersection(parts)
            }
            "union_type" => {
                let mut parts = Vec::new();
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    match Self::from_node(child, source) {
                        TypeExpr::Union(inner) => parts.extend(inner),
                        other => parts.push(other),
                    }
                }
                TypeExpr::Union(parts)
            }
            "literal_type" => {
                let text = node_text(node, source);
                match node.named_child(0).map(|c| c.kind()) {
                    Some("string") => TypeExpr::Literal(unquote(text).to_string()),
                    _ => TypeExpr::Other(text.to_string()),
                }
            }
            _ => TypeExpr::Other(node_text(node, source).to_string()),
        }
    }

    /// Replace references to type parameters with the arguments they were given
    pub fn substitute(&self, params: &HashMap<String, TypeExpr>) -> TypeExpr {
        if params.is_empty() {
            return self.clone();
        }
        match self {
            TypeExpr::Reference { name, args } if args.is_empty() && params.contains_key(name) => {
                params[name].clone()
            }
            TypeExpr::Reference { name, args } => TypeExpr::Reference {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(params)).collect(),
            },
            TypeExpr::Object(members) => TypeExpr::Object(
                members
                    .iter()
                    .map(|m| MemberDecl {
                        type_text: substitute_type_text(&m.type_text, params),
                        ..m.clone()
                    })
                    .collect(),
            ),
            TypeExpr::Intersection(parts) => {
                TypeExpr::Intersection(parts.iter().map(|p| p.substitute(params)).collect())
            }
            TypeExpr::Union(parts) => {
                TypeExpr::Union(parts.iter().map(|p| p.substitute(params)).collect())
            }
            TypeExpr::Literal(_) => self.clone(),
            TypeExpr::Other(text) => TypeExpr::Other(substitute_type_text(text, params)),
        }
    }

    /// String literal members of a (possibly union) key type, as used by Pick/Omit
    pub fn literal_keys(&self) -> Vec<String> {
        match self {
            TypeExpr::Literal(key) => vec![key.clone()],
            TypeExpr::Union(parts) => parts.iter().flat_map(|p| p.literal_keys()).collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Reference { name, args } if args.is_empty() => write!(f, "{name}"),
            TypeExpr::Reference { name, args } => {
                let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                write!(f, "{name}<{}>", args.join(", "))
            }
            TypeExpr::Object(members) if members.is_empty() => write!(f, "{{}}"),
            TypeExpr::Object(members) => {
                let members: Vec<String> = members
                    .iter()
                    .map(|m| {
                        let optional = if m.optional { "?" } else { "" };
                        format!("{}{optional}: {}", m.name, m.type_text)
                    })
                    .collect();
                write!(f, "{{ {} }}", members.join("; "))
            }
            TypeExpr::Intersection(parts) => {
                let parts: Vec<String> = parts
                    .iter()
                    .map(|p| match p {
                        TypeExpr::Union(_) => format!("({p})"),
                        _ => p.to_string(),
                    })
                    .collect();
                write!(f, "{}", parts.join(" & "))
            }
            TypeExpr::Union(parts) => {
                let parts: Vec<String> = parts.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(" | "))
            }
            TypeExpr::Literal(value) => write!(f, "'{value}'"),
            TypeExpr::Other(text) => write!(f, "{text}"),
        }
    }
}

/// Named children of a `type_arguments` node as TypeExprs
pub(crate) fn type_arguments(node: Node, source: &str) -> Vec<TypeExpr> {
    let mut cursor = node.walk();
    let args = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .map(|c| TypeExpr::from_node(c, source))
        .collect();
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TypeScriptParser;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn parse(source: &str) -> ModuleDeclarations {
        let file = TypeScriptParser::new()
            .parse_source(source, Path::new("Module.tsx"))
            .unwrap();
        extract_declarations(&file)
    }

    #[test]
    fn test_imports() {
        let decls = parse(
            r#"
import React, { FC, ReactNode as Node } from 'react';
import * as utils from '../../utils';
import Box, { BoxProps } from '../Box/Box';
"#,
        );

        assert_eq!(
            decls.imports.get("React"),
            Some(&ImportBinding::Default {
                specifier: "react".to_string()
            })
        );
        assert_eq!(
            decls.imports.get("Node"),
            Some(&ImportBinding::Named {
                specifier: "react".to_string(),
                imported: "ReactNode".to_string()
            })
        );
        assert_eq!(
            decls.imports.get("utils"),
            Some(&ImportBinding::Namespace {
                specifier: "../../utils".to_string()
            })
        );
        assert_eq!(
            decls.imports.get("BoxProps").map(|b| b.specifier()),
            Some("../Box/Box")
        );
        assert_eq!(
            decls.specifiers(),
            vec!["../../utils", "../Box/Box", "react"]
        );
    }

    #[test]
    fn test_exports_and_reexports() {
        let decls = parse(
            r#"
export * from './commonPropInterfaces';
export * as styles from './styles';
export { createComponent, compose as composeComponent } from './factories';
const local = 1;
export { local as renamed };
export default local;
"#,
        );

        assert_eq!(decls.star_exports, vec!["./commonPropInterfaces"]);
        assert_eq!(
            decls.exports.get("composeComponent"),
            Some(&ExportTarget::ReExport {
                specifier: "./factories".to_string(),
                imported: "compose".to_string()
            })
        );
        assert_eq!(
            decls.exports.get("renamed"),
            Some(&ExportTarget::Local("local".to_string()))
        );
        assert!(decls.has_default_export);
    }

    #[test]
    fn test_interfaces_and_members() {
        let decls = parse(
            r#"
export interface ButtonOwnProps {}

export interface ButtonProps extends UIComponentProps, ButtonOwnProps, React.HTMLAttributes<HTMLElement> {
  /** A button can appear circular. */
  circular?: boolean;

  /**
   * Called after a user's click.
   * @param event - React's original SyntheticEvent.
   */
  onClick?(event: React.MouseEvent): void;

  'aria-label': string;
  size: 'small' | 'medium' | 'large';
}
"#,
        );

        let props = decls.interfaces.get("ButtonProps").unwrap();
        assert_eq!(props.extends.len(), 3);
        assert_eq!(
            props.extends[2],
            TypeExpr::Reference {
                name: "React.HTMLAttributes".to_string(),
                args: vec![TypeExpr::Reference {
                    name: "HTMLElement".to_string(),
                    args: Vec::new()
                }]
            }
        );

        let names: Vec<_> = props.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["circular", "onClick", "aria-label", "size"]);

        assert!(props.members[0].optional);
        assert_eq!(props.members[0].type_text, "boolean");
        assert_eq!(
            props.members[0].doc.as_deref(),
            Some("/** A button can appear circular. */")
        );
        assert_eq!(props.members[1].type_text, "(event: React.MouseEvent) => void");
        assert!(props.members[1].doc.as_deref().unwrap().contains("@param"));
        assert!(!props.members[2].optional);
        assert!(props.members[2].doc.is_none());
        assert_eq!(props.members[3].type_text, "'small' | 'medium' | 'large'");

        assert!(decls.exports.contains_key("ButtonProps"));
        assert!(decls.declares_type("ButtonOwnProps"));
        assert!(!decls.has_default_export);
    }

    #[test]
    fn test_type_aliases() {
        let decls = parse(
            r#"
type Size = 'small' | 'medium';
export type ChatProps = ChatOwnProps & Omit<BoxProps, 'as' | 'content'> & { extra?: string };
"#,
        );

        assert_eq!(
            decls.aliases.get("Size").unwrap().value.literal_keys(),
            vec!["small", "medium"]
        );

        let TypeExpr::Intersection(parts) = &decls.aliases.get("ChatProps").unwrap().value else {
            panic!("Expected intersection")
        };
        assert_eq!(parts.len(), 3);
        let TypeExpr::Reference { name, args } = &parts[1] else {
            panic!("Expected reference")
        };
        assert_eq!(name, "Omit");
        assert_eq!(args[1].literal_keys(), vec!["as", "content"]);
        let TypeExpr::Object(members) = &parts[2] else {
            panic!("Expected object")
        };
        assert_eq!(members[0].name, "extra");
    }

    #[test]
    fn test_type_parameters_and_defaults() {
        let decls = parse(
            r#"
export interface ContentComponentProps<TContent = React.ReactNode> {
  content?: TContent;
}
export type ShorthandCollection<TProps, TKind = 'item'> = TProps[];
"#,
        );

        let content = decls.interfaces.get("ContentComponentProps").unwrap();
        assert_eq!(
            content.type_params,
            vec![TypeParam {
                name: "TContent".to_string(),
                default: Some(TypeExpr::Reference {
                    name: "React.ReactNode".to_string(),
                    args: Vec::new()
                }),
            }]
        );

        let collection = decls.aliases.get("ShorthandCollection").unwrap();
        let names: Vec<_> = collection.type_params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["TProps", "TKind"]);
        assert_eq!(collection.type_params[0].default, None);
        assert_eq!(
            collection.type_params[1].default,
            Some(TypeExpr::Literal("item".to_string()))
        );
    }

    #[test]
    fn test_method_signature_type_text() {
        let decls = parse(
            r#"
interface InputProps {
  onChange?(value: string): void;
  format<T>(value: T);
}
"#,
        );

        let members = &decls.interfaces.get("InputProps").unwrap().members;
        assert_eq!(members[0].type_text, "(value: string) => void");
        assert!(members[0].optional);
        assert_eq!(members[1].type_text, "<T>(value: T) => any");
    }

    #[test]
    fn test_substitute_type_text() {
        let mut params = HashMap::new();
        params.insert(
            "TContent".to_string(),
            TypeExpr::Reference {
                name: "ShorthandValue".to_string(),
                args: vec![TypeExpr::Reference {
                    name: "BoxProps".to_string(),
                    args: Vec::new(),
                }],
            },
        );
        params.insert(
            "T".to_string(),
            TypeExpr::Union(vec![
                TypeExpr::Literal("a".to_string()),
                TypeExpr::Other("number".to_string()),
            ]),
        );

        assert_eq!(
            substitute_type_text("TContent", &params),
            "ShorthandValue<BoxProps>"
        );
        assert_eq!(
            substitute_type_text("(value: T, data: TContent[]) => void", &params),
            "(value: 'a' | number, data: ShorthandValue<BoxProps>[]) => void"
        );
        assert_eq!(
            substitute_type_text("React.T | 'T' | TContentProps", &params),
            "React.T | 'T' | TContentProps"
        );
        assert_eq!(substitute_type_text("T", &HashMap::new()), "T");
    }

    #[test]
    fn test_substitute_type_expr() {
        let decls = parse("type Slot<T> = { value?: T } & Wrapper<T> & T;\n");
        let alias = decls.aliases.get("Slot").unwrap();

        let mut params = HashMap::new();
        params.insert("T".to_string(), TypeExpr::Other("number".to_string()));

        let TypeExpr::Intersection(parts) = alias.value.substitute(&params) else {
            panic!("Expected intersection")
        };
        let TypeExpr::Object(members) = &parts[0] else {
            panic!("Expected object")
        };
        assert_eq!(members[0].type_text, "number");
        assert_eq!(parts[1].to_string(), "Wrapper<number>");
        assert_eq!(parts[2], TypeExpr::Other("number".to_string()));
    }
}
