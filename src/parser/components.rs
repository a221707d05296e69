//! @dose
//! purpose: Finds the component definitions a module exports and, for each, the display
//!     name, raw doc comment and the props type expression it was declared with.
//!
//! when-editing:
//!     - !Only exported definitions count; local helpers that render JSX are ignored
//!     - !A binding exported under several names (named + default) is one definition
//!     - Factory calls are recognized by the last segment of the callee (React.memo => memo)
//!     - A call wrapping a local component (`memo(Chip)`) inherits its name, docs and
//!       props type unless the wrapper declares its own
//!
//! invariants:
//!     - Definitions are returned in source order
//!     - props_type is None only when nothing in the definition names a props type
//!
//! gotchas:
//!     - compose<'li', OwnProps, StylesProps, ParentProps, ParentStylesProps>: props are
//!       the 2nd and 4th type arguments, intersected
//!     - createComponent({ displayName, render }) carries displayName in its first argument
//!     - `(forwardRef<E, P>(...) as unknown) as X` must be unwrapped to find the call

use crate::parser::declarations::{type_arguments, TypeExpr};
use crate::parser::{child_of_kind, declaration_doc_comment, leading_doc_comment, node_text};
use crate::parser::{unquote, ParsedFile};
use std::collections::HashMap;
use tree_sitter::Node;

/// Type annotations that mark a constant as a component: `FC<Props>`
const COMPONENT_TYPES: &[&str] = &[
    "FC",
    "VFC",
    "FunctionComponent",
    "ComponentType",
    "ComponentClass",
    "ForwardRefExoticComponent",
    "NamedExoticComponent",
    "MemoExoticComponent",
];

/// Base classes of class components
const COMPONENT_CLASSES: &[&str] = &[
    "Component",
    "PureComponent",
    "UIComponent",
    "AutoControlledComponent",
];

/// Calls that produce a component from their arguments
const COMPONENT_FACTORIES: &[&str] = &[
    "compose",
    "createComponent",
    "forwardRef",
    "memo",
    "observer",
    "withSafeTypeForAs",
];

/// One exported component definition
#[derive(Debug, Clone)]
pub struct ComponentDefinition<'t> {
    /// Local binding, None for an anonymous `export default`
    pub binding: Option<String>,
    /// Local component a wrapper call is applied to: `Chip` in `memo(Chip)`
    pub wrapped: Option<String>,
    pub display_name: String,
    /// Raw doc comment preceding the definition
    pub description: Option<String>,
    /// Props type as declared, if discoverable from the definition itself
    pub props_type: Option<TypeExpr>,
    /// Names this definition is exported under ("default" included)
    pub exported_as: Vec<String>,
    /// The function, class or initializer expression
    pub node: Node<'t>,
}

/// A local value binding that might be a component
struct Candidate<'t> {
    name: Option<String>,
    /// Definition node (function/class/initializer)
    node: Node<'t>,
    /// Node whose leading comment documents the definition
    doc_anchor: Node<'t>,
    /// Type annotation on the binding (`const X: FC<P> = ...`)
    annotation: Option<Node<'t>>,
}

/// Find all exported component definitions of a parsed file
pub fn find_components(file: &ParsedFile) -> Vec<ComponentDefinition<'_>> {
    let source = file.source();
    let top = file.top_level();

    let mut candidates: Vec<Candidate> = Vec::new();
    let mut exports: HashMap<String, Vec<String>> = HashMap::new();
    let mut anonymous_default: Option<Candidate> = None;

    for statement in &top {
        match statement.kind() {
            "export_statement" => {
                if statement.child_by_field_name("source").is_some() {
                    continue;
                }
                let is_default = child_of_kind(*statement, "default").is_some();

                if let Some(declaration) = statement.child_by_field_name("declaration") {
                    for candidate in candidates_of(declaration, source) {
                        if let Some(name) = candidate.name.clone() {
                            let exported = if is_default {
                                "default".to_string()
                            } else {
                                name.clone()
                            };
                            exports.entry(name).or_default().push(exported);
                            candidates.push(candidate);
                        } else if is_default {
                            anonymous_default = Some(candidate);
                        }
                    }
                } else if let Some(value) = statement.child_by_field_name("value") {
                    let value = unwrap_expression(value);
                    if value.kind() == "identifier" {
                        exports
                            .entry(node_text(value, source).to_string())
                            .or_default()
                            .push("default".to_string());
                    } else {
                        anonymous_default = Some(Candidate {
                            name: None,
                            node: value,
                            doc_anchor: *statement,
                            annotation: None,
                        });
                    }
                } else if let Some(clause) = child_of_kind(*statement, "export_clause") {
                    let mut cursor = clause.walk();
                    for spec in clause.named_children(&mut cursor) {
                        let Some(name) = spec.child_by_field_name("name") else {
                            continue;
                        };
                        let local = node_text(name, source).to_string();
                        let exported = spec
                            .child_by_field_name("alias")
                            .map(|a| unquote(node_text(a, source)).to_string())
                            .unwrap_or_else(|| local.clone());
                        exports.entry(local).or_default().push(exported);
                    }
                }
            }
            _ => candidates.extend(candidates_of(*statement, source)),
        }
    }

    let scope = Scope {
        source,
        file,
        display_assignments: display_name_assignments(&top, source),
        locals: candidates
            .iter()
            .filter_map(|c| c.name.clone().map(|name| (name, c)))
            .collect(),
    };
    let mut definitions = Vec::new();

    for candidate in &candidates {
        let Some(name) = candidate.name.as_deref() else {
            continue;
        };
        let Some(exported_as) = exports.get(name) else {
            continue;
        };
        if let Some(def) = scope.analyze(candidate, exported_as, 0) {
            definitions.push(def);
        }
    }

    if let Some(candidate) = &anonymous_default {
        if let Some(def) = scope.analyze(candidate, &["default".to_string()], 0) {
            definitions.push(def);
        }
    }

    definitions.sort_by_key(|d| d.node.start_byte());
    definitions
}

/// Value bindings introduced by a statement
fn candidates_of<'t>(node: Node<'t>, source: &str) -> Vec<Candidate<'t>> {
    match node.kind() {
        "function_declaration" | "class_declaration" | "function_expression" | "function"
        | "class" | "arrow_function" => vec![Candidate {
            name: node
                .child_by_field_name("name")
                .map(|n| node_text(n, source).to_string()),
            node,
            doc_anchor: node,
            annotation: None,
        }],
        "lexical_declaration" | "variable_declaration" => {
            let mut out = Vec::new();
            let mut cursor = node.walk();
            for declarator in node.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                let (Some(name), Some(value)) = (
                    declarator.child_by_field_name("name"),
                    declarator.child_by_field_name("value"),
                ) else {
                    continue;
                };
                if name.kind() != "identifier" {
                    continue;
                }
                out.push(Candidate {
                    name: Some(node_text(name, source).to_string()),
                    node: value,
                    doc_anchor: node,
                    annotation: declarator.child_by_field_name("type"),
                });
            }
            out
        }
        _ => Vec::new(),
    }
}

/// How many wrapper calls are followed to the wrapped component
const MAX_WRAP_DEPTH: usize = 4;

/// Module-level lookups shared by every candidate of a file
struct Scope<'s, 't> {
    source: &'s str,
    file: &'s ParsedFile,
    display_assignments: HashMap<String, String>,
    locals: HashMap<String, &'s Candidate<'t>>,
}

impl<'s, 't> Scope<'s, 't> {
    fn analyze(
        &self,
        candidate: &Candidate<'t>,
        exported_as: &[String],
        depth: usize,
    ) -> Option<ComponentDefinition<'t>> {
        let source = self.source;
        let binding = candidate.name.clone();
        let value = unwrap_expression(candidate.node);

        let annotated_props = candidate
            .annotation
            .and_then(|ann| ann.named_child(0))
            .and_then(|ty| component_type_props(ty, source));

        let wrapped = if value.kind() == "call_expression" && depth < MAX_WRAP_DEPTH {
            self.wrapped_component(value, binding.as_deref(), depth)
        } else {
            None
        };

        let (is_component, props_type, options_display_name) = match value.kind() {
            "function_declaration" | "function_expression" | "function" | "arrow_function" => {
                let props = first_parameter_type(value, source);
                (
                    annotated_props.is_some() || contains_jsx(value),
                    annotated_props.or(props),
                    None,
                )
            }
            "class_declaration" | "class" => match class_props(value, source) {
                Some(props) => (true, props, None),
                None => (false, None, None),
            },
            "call_expression" => match factory_call(value, source) {
                Some((props, display)) => (true, annotated_props.or(props), display),
                None => (
                    annotated_props.is_some() || wrapped.is_some(),
                    annotated_props,
                    None,
                ),
            },
            _ => (annotated_props.is_some(), annotated_props, None),
        };

        if !is_component {
            return None;
        }

        let static_display = if matches!(value.kind(), "class_declaration" | "class") {
            static_display_name(value, source)
        } else {
            None
        };

        let display_name = options_display_name
            .or_else(|| {
                binding
                    .as_ref()
                    .and_then(|b| self.display_assignments.get(b).cloned())
            })
            .or(static_display)
            .or_else(|| binding.clone())
            .or_else(|| wrapped.as_ref().map(|w| w.display_name.clone()))
            .unwrap_or_else(|| {
                self.file
                    .path()
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| "default".to_string())
            });

        let description = declaration_doc_comment(candidate.doc_anchor, source)
            .or_else(|| leading_doc_comment(candidate.doc_anchor, source))
            .map(str::to_string)
            .or_else(|| wrapped.as_ref().and_then(|w| w.description.clone()));

        let props_type = props_type.or_else(|| wrapped.as_ref().and_then(|w| w.props_type.clone()));

        Some(ComponentDefinition {
            binding,
            wrapped: wrapped.and_then(|w| w.binding),
            display_name,
            description,
            props_type,
            exported_as: exported_as.to_vec(),
            node: value,
        })
    }

    /// The first local component passed to a wrapper call, looking into nested calls
    fn wrapped_component(
        &self,
        call: Node<'t>,
        binding: Option<&str>,
        depth: usize,
    ) -> Option<ComponentDefinition<'t>> {
        let args = call.child_by_field_name("arguments")?;
        let mut cursor = args.walk();
        let found = args.named_children(&mut cursor).find_map(|arg| {
            let arg = unwrap_expression(arg);
            match arg.kind() {
                "identifier" => {
                    let name = node_text(arg, self.source);
                    if Some(name) == binding {
                        return None;
                    }
                    let local = self.locals.get(name)?;
                    self.analyze(local, &[], depth + 1)
                }
                "call_expression" => self.wrapped_component(arg, binding, depth + 1),
                _ => None,
            }
        });
        found
    }
}

/// `X.displayName = '...'` assignments at the top level
fn display_name_assignments(top: &[Node], source: &str) -> HashMap<String, String> {
    let mut names = HashMap::new();
    for statement in top {
        if statement.kind() != "expression_statement" {
            continue;
        }
        let Some(assignment) = statement.named_child(0) else {
            continue;
        };
        if assignment.kind() != "assignment_expression" {
            continue;
        }
        let (Some(left), Some(right)) = (
            assignment.child_by_field_name("left"),
            assignment.child_by_field_name("right"),
        ) else {
            continue;
        };
        if left.kind() != "member_expression" || right.kind() != "string" {
            continue;
        }
        let object = left.child_by_field_name("object");
        let property = left.child_by_field_name("property");
        if let (Some(object), Some(property)) = (object, property) {
            if node_text(property, source) == "displayName" && object.kind() == "identifier" {
                names.insert(
                    node_text(object, source).to_string(),
                    unquote(node_text(right, source)).to_string(),
                );
            }
        }
    }
    names
}

fn static_display_name(class: Node, source: &str) -> Option<String> {
    let body = class.child_by_field_name("body")?;
    let mut cursor = body.walk();
    let found = body.named_children(&mut cursor).find_map(|member| {
        if member.kind() != "public_field_definition" || child_of_kind(member, "static").is_none()
        {
            return None;
        }
        let name = member.child_by_field_name("name")?;
        let value = member.child_by_field_name("value")?;
        (node_text(name, source) == "displayName" && value.kind() == "string")
            .then(|| unquote(node_text(value, source)).to_string())
    });
    found
}

/// Recognize a component factory call. Returns (props type, displayName option).
fn factory_call(call: Node, source: &str) -> Option<(Option<TypeExpr>, Option<String>)> {
    let callee = call.child_by_field_name("function")?;
    let callee_name = last_segment(node_text(callee, source));
    let type_args = call
        .child_by_field_name("type_arguments")
        .map(|a| type_arguments(a, source))
        .unwrap_or_default();
    let args = call.child_by_field_name("arguments");

    let inner_function = args.and_then(|a| {
        let mut cursor = a.walk();
        let found = a
            .named_children(&mut cursor)
            .map(unwrap_expression)
            .find(|n| matches!(n.kind(), "arrow_function" | "function_expression" | "function"));
        found
    });

    let is_factory = COMPONENT_FACTORIES.contains(&callee_name)
        || inner_function.map(contains_jsx).unwrap_or(false);
    if !is_factory {
        return None;
    }

    let props = match callee_name {
        "compose" => {
            let parts: Vec<TypeExpr> = [type_args.get(1), type_args.get(3)]
                .into_iter()
                .flatten()
                .cloned()
                .collect();
            match parts.len() {
                0 => None,
                1 => parts.into_iter().next(),
                _ => Some(TypeExpr::Intersection(parts)),
            }
        }
        "forwardRef" => type_args.get(1).cloned(),
        "withSafeTypeForAs" => type_args.get(1).cloned(),
        _ => type_args.first().cloned(),
    }
    .or_else(|| inner_function.and_then(|f| first_parameter_type(f, source)));

    let display_name = args.and_then(|a| options_display_name(a, source));

    Some((props, display_name))
}

/// `displayName: '...'` in any object literal argument
fn options_display_name(args: Node, source: &str) -> Option<String> {
    let mut cursor = args.walk();
    let found = args.named_children(&mut cursor).find_map(|arg| {
        let arg = unwrap_expression(arg);
        if arg.kind() != "object" {
            return None;
        }
        let mut inner = arg.walk();
        let name = arg.named_children(&mut inner).find_map(|pair| {
            if pair.kind() != "pair" {
                return None;
            }
            let key = pair.child_by_field_name("key")?;
            let value = pair.child_by_field_name("value")?;
            (unquote(node_text(key, source)) == "displayName" && value.kind() == "string")
                .then(|| unquote(node_text(value, source)).to_string())
        });
        name
    });
    found
}

/// Props type of a class extending a known component base
fn class_props(class: Node, source: &str) -> Option<Option<TypeExpr>> {
    let heritage = child_of_kind(class, "class_heritage")?;
    let extends = child_of_kind(heritage, "extends_clause")?;
    let base = extends.child_by_field_name("value")?;
    if !COMPONENT_CLASSES.contains(&last_segment(node_text(base, source))) {
        return None;
    }
    let props = extends
        .child_by_field_name("type_arguments")
        .and_then(|a| type_arguments(a, source).into_iter().next());
    Some(props)
}

/// First type argument of an `FC<P>`-style annotation
fn component_type_props(ty: Node, source: &str) -> Option<TypeExpr> {
    match TypeExpr::from_node(ty, source) {
        TypeExpr::Reference { name, args } if COMPONENT_TYPES.contains(&last_segment(&name)) => {
            Some(args.into_iter().next().unwrap_or(TypeExpr::Object(Vec::new())))
        }
        TypeExpr::Intersection(parts) => parts.into_iter().find_map(|p| match p {
            TypeExpr::Reference { name, args } if COMPONENT_TYPES.contains(&last_segment(&name)) => {
                args.into_iter().next()
            }
            _ => None,
        }),
        _ => None,
    }
}

/// Type annotation of a function's first parameter
fn first_parameter_type(function: Node, source: &str) -> Option<TypeExpr> {
    let params = function.child_by_field_name("parameters")?;
    let first = params.named_child(0)?;
    let annotation = first.child_by_field_name("type")?;
    Some(TypeExpr::from_node(annotation, source))
}

/// Recursively check if node or its descendants contain JSX elements
pub(crate) fn contains_jsx(node: Node) -> bool {
    if matches!(
        node.kind(),
        "jsx_element" | "jsx_self_closing_element" | "jsx_fragment"
    ) {
        return true;
    }

    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(contains_jsx);
    found
}

/// Strip parentheses and `as`/`satisfies` wrappers
fn unwrap_expression(node: Node) -> Node {
    match node.kind() {
        "parenthesized_expression" | "as_expression" | "satisfies_expression"
        | "non_null_expression" => match node.named_child(0) {
            Some(inner) => unwrap_expression(inner),
            None => node,
        },
        _ => node,
    }
}

fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
