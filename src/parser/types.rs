//! @dose
//! purpose: Maps a prop's declared type annotation to the ComponentPropType list the docs
//!     site renders. The declaration is looked up in the component file itself (parent
//!     interface first, then `<DisplayName>Props`); inherited props declared elsewhere
//!     fall back to splitting the prop parser's type text.
//!
//! invariants:
//!     - Never returns an empty list for a prop with a non-empty type text
//!     - Union members come back in source order
//!
//! gotchas:
//!     - `'small' | 'medium'` are literal_type nodes and map to keywords with quotes kept
//!     - Splitting the fallback text must ignore `|` inside `<...>`, `(...)`, `{...}`

use crate::parser::declarations::method_type_text;
use crate::parser::{child_of_kind, node_text, unquote, ParsedFile};
use crate::types::{ComponentPropType, PropItem};
use tree_sitter::Node;

/// Resolve the type list of one prop
pub fn parse_type(
    component_file: &ParsedFile,
    display_name: &str,
    prop_name: &str,
    prop_item: &PropItem,
) -> Vec<ComponentPropType> {
    let source = component_file.source();
    let mut owners: Vec<String> = Vec::new();
    if let Some(parent) = &prop_item.parent {
        owners.push(parent.name.clone());
    }
    owners.push(format!("{display_name}Props"));

    for owner in &owners {
        let Some(body) = find_type_body(component_file, owner) else {
            continue;
        };
        let Some(member) = find_member(body, source, prop_name) else {
            continue;
        };
        if member.kind() == "method_signature" {
            return vec![ComponentPropType::named(method_type_text(member, source))];
        }
        let Some(type_node) = member
            .child_by_field_name("type")
            .and_then(|ann| ann.named_child(0))
        else {
            continue;
        };
        // A generic parent instantiated with type arguments: the declared node still
        // names the parameter, the prop parser's text carries the argument
        let is_parent = prop_item.parent.as_ref().map(|p| &p.name) == Some(owner);
        let declared = node_text(type_node, source);
        if is_parent && !prop_item.type_name.is_empty() && declared != prop_item.type_name {
            break;
        }
        let types = map_type(type_node, source);
        if !types.is_empty() {
            return types;
        }
    }

    split_type_text(&prop_item.type_name)
        .into_iter()
        .map(|member| classify_type_text(&member))
        .collect()
}

/// Body (interface_body or object_type) of a top-level interface or object alias
fn find_type_body<'t>(file: &'t ParsedFile, name: &str) -> Option<Node<'t>> {
    let source = file.source();
    for statement in file.top_level() {
        let declaration = if statement.kind() == "export_statement" {
            match statement.child_by_field_name("declaration") {
                Some(d) => d,
                None => continue,
            }
        } else {
            statement
        };

        let matches_name = declaration
            .child_by_field_name("name")
            .map(|n| node_text(n, source) == name)
            .unwrap_or(false);
        if !matches_name {
            continue;
        }

        match declaration.kind() {
            "interface_declaration" => return declaration.child_by_field_name("body"),
            "type_alias_declaration" => {
                let value = declaration.child_by_field_name("value")?;
                return first_object_type(value);
            }
            _ => {}
        }
    }
    None
}

/// The object type of an alias, looking into intersections
fn first_object_type(node: Node) -> Option<Node> {
    match node.kind() {
        "object_type" => Some(node),
        "intersection_type" | "parenthesized_type" => {
            let mut cursor = node.walk();
            let found = node.named_children(&mut cursor).find_map(first_object_type);
            found
        }
        _ => None,
    }
}

/// Property or method signature named `prop_name` in a type body
fn find_member<'t>(body: Node<'t>, source: &str, prop_name: &str) -> Option<Node<'t>> {
    let mut cursor = body.walk();
    let member = body.named_children(&mut cursor).find(|m| {
        matches!(m.kind(), "property_signature" | "method_signature")
            && m.child_by_field_name("name")
                .map(|n| unquote(node_text(n, source)) == prop_name)
                .unwrap_or(false)
    });
    member
}

fn map_type(node: Node, source: &str) -> Vec<ComponentPropType> {
    match node.kind() {
        "union_type" => {
            let mut cursor = node.walk();
            let members: Vec<Node> = node.named_children(&mut cursor).collect();
            members
                .into_iter()
                .flat_map(|member| map_type(member, source))
                .collect()
        }
        "parenthesized_type" => match node.named_child(0) {
            Some(inner) => map_type(inner, source),
            None => vec![ComponentPropType::named(node_text(node, source))],
        },
        "predefined_type" | "literal_type" => {
            vec![ComponentPropType::keyword(node_text(node, source))]
        }
        "type_identifier" | "nested_type_identifier" => {
            vec![ComponentPropType::named(node_text(node, source))]
        }
        "generic_type" => {
            let name = node
                .child_by_field_name("name")
                .map(|n| node_text(n, source))
                .unwrap_or_else(|| node_text(node, source));
            let parameters = child_of_kind(node, "type_arguments").map(|args| {
                let mut cursor = args.walk();
                let params: Vec<Node> = args.named_children(&mut cursor).collect();
                params
                    .into_iter()
                    .flat_map(|param| map_type(param, source))
                    .collect::<Vec<_>>()
            });
            vec![ComponentPropType {
                name: Some(name.to_string()),
                keyword: None,
                parameters,
            }]
        }
        _ => vec![ComponentPropType::named(node_text(node, source))],
    }
}

const KEYWORDS: &[&str] = &[
    "any",
    "unknown",
    "never",
    "void",
    "undefined",
    "null",
    "boolean",
    "string",
    "number",
    "bigint",
    "symbol",
    "object",
    "true",
    "false",
];

/// Classify a bare type text the way map_type would classify its node
fn classify_type_text(text: &str) -> ComponentPropType {
    let text = strip_parens(text);
    let is_literal = text.starts_with('\'')
        || text.starts_with('"')
        || text.parse::<f64>().is_ok();
    if KEYWORDS.contains(&text) || is_literal {
        return ComponentPropType::keyword(text);
    }

    // `Name<A, B | C>` keeps its arguments as parameters
    if let Some((name, args)) = text
        .strip_suffix('>')
        .and_then(|t| t.split_once('<'))
        .filter(|(name, _)| is_type_name(name))
    {
        let parameters = split_top_level(args, ',')
            .iter()
            .flat_map(|arg| split_type_text(arg))
            .map(|member| classify_type_text(&member))
            .collect();
        return ComponentPropType {
            name: Some(name.to_string()),
            keyword: None,
            parameters: Some(parameters),
        };
    }

    ComponentPropType::named(text)
}

fn is_type_name(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.'))
}

/// `(A)` => `A`, unless the parentheses belong to a function type
fn strip_parens(text: &str) -> &str {
    match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) if split_top_level(text, '=').len() == 1 && balanced(inner) => inner.trim(),
        _ => text,
    }
}

fn balanced(text: &str) -> bool {
    let mut depth = 0i32;
    for ch in text.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}

/// Split a type text on `|` at nesting depth zero
pub(crate) fn split_type_text(text: &str) -> Vec<String> {
    split_top_level(text, '|')
}

/// Split on `separator` outside brackets and quotes; `=>` never counts as a bracket
fn split_top_level(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut current = String::new();
    let mut prev = '\0';

    for ch in text.chars() {
        match quote {
            Some(q) => {
                if ch == q && prev != '\\' {
                    quote = None;
                }
                current.push(ch);
            }
            None => match ch {
                '\'' | '"' | '`' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                '<' | '(' | '{' | '[' => {
                    depth += 1;
                    current.push(ch);
                }
                '>' if prev == '=' => current.push(ch),
                '>' | ')' | '}' | ']' => {
                    depth -= 1;
                    current.push(ch);
                }
                c if c == separator && depth == 0 => {
                    parts.push(std::mem::take(&mut current));
                }
                _ => current.push(ch),
            },
        }
        prev = ch;
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
