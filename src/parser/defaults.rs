//! @dose
//! purpose: Resolves a component's default prop values by reading its source, never by
//!     running it. Collects destructured parameter defaults, `static defaultProps` and
//!     `X.defaultProps = {...}` assignments, and maps literal expressions to JSON values.
//!
//! when-editing:
//!     - !resolve_default_props must stay a pure function of (source text, binding)
//!     - !Later sources win: wrapped component < parameter defaults < static defaultProps
//!       < assignments
//!     - The cache is keyed by the full source text, so edited files never hit stale entries
//!
//! invariants:
//!     - `undefined` never produces a default value
//!     - Non-literal expressions are kept as their source text (a JSON string)
//!
//! gotchas:
//!     - Spreads (`...Parent.defaultProps`) cannot be resolved statically and are skipped
//!     - Identifiers resolve only to top-level constants initialized with a literal
//!     - `const { size = 'medium' } = props` in the body counts as a parameter default
//!     - `memo(Chip)` / `withSafeTypeForAs<...>(Button)` carry the defaults of the local
//!       component they wrap, as the wrapper returned at runtime would

use crate::parser::{child_of_kind, node_text, unquote, ParsedFile};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tree_sitter::Node;

/// Statically resolved default values of one component, keyed by prop name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultProps {
    values: HashMap<String, Value>,
}

impl DefaultProps {
    pub fn get(&self, prop: &str) -> Option<&Value> {
        self.values.get(prop)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    fn extend_from_object(&mut self, object: Node, source: &str, consts: &HashMap<String, Value>) {
        let mut cursor = object.walk();
        for child in object.named_children(&mut cursor) {
            match child.kind() {
                "pair" => {
                    let (Some(key), Some(value)) =
                        (child.child_by_field_name("key"), child.child_by_field_name("value"))
                    else {
                        continue;
                    };
                    let Some(name) = property_key(key, source) else {
                        continue;
                    };
                    match literal_value(value, source, consts) {
                        Some(v) => {
                            self.values.insert(name, v);
                        }
                        None => {
                            self.values.remove(&name);
                        }
                    }
                }
                "shorthand_property_identifier" => {
                    let name = node_text(child, source).to_string();
                    let value = consts
                        .get(&name)
                        .cloned()
                        .unwrap_or_else(|| Value::String(name.clone()));
                    self.values.insert(name, value);
                }
                _ => {}
            }
        }
    }
}

/// How many wrapper calls are followed to the wrapped component
const MAX_WRAP_DEPTH: usize = 4;

/// Resolve the defaults of the component bound to `binding` in `file`.
///
/// Use `"default"` for an anonymous `export default` definition.
pub fn resolve_default_props(file: &ParsedFile, binding: &str) -> DefaultProps {
    let source = file.source();
    let top = file.top_level();
    let consts = literal_constants(&top, source);
    let mut defaults = DefaultProps::default();
    collect_defaults(&top, source, &consts, binding, 0, &mut defaults);
    defaults
}

fn collect_defaults(
    top: &[Node],
    source: &str,
    consts: &HashMap<String, Value>,
    binding: &str,
    depth: usize,
    defaults: &mut DefaultProps,
) {
    if let Some(definition) = find_definition(top, source, binding) {
        if depth < MAX_WRAP_DEPTH {
            for wrapped in wrapped_bindings(definition, source) {
                if wrapped != binding {
                    collect_defaults(top, source, consts, &wrapped, depth + 1, defaults);
                }
            }
        }
        if let Some(function) = component_function(definition) {
            collect_parameter_defaults(function, source, consts, defaults);
        }
        if definition.kind() == "class_declaration" || definition.kind() == "class" {
            collect_static_defaults(definition, source, consts, defaults);
        }
    }

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
        if !is_member_of(left, source, binding, "defaultProps") {
            continue;
        }
        if let Some(object) = unwrap_expression(right).filter(|n| n.kind() == "object") {
            defaults.extend_from_object(object, source, consts);
        }
    }
}

/// Local names passed to a wrapper call: `memo(Chip)`, `withSafeTypeForAs(memo(Button))`
fn wrapped_bindings(node: Node, source: &str) -> Vec<String> {
    let Some(node) = unwrap_expression(node) else {
        return Vec::new();
    };
    match node.kind() {
        "identifier" => vec![node_text(node, source).to_string()],
        "call_expression" => {
            let Some(args) = node.child_by_field_name("arguments") else {
                return Vec::new();
            };
            let mut cursor = args.walk();
            let names = args
                .named_children(&mut cursor)
                .filter(|arg| matches!(arg.kind(), "identifier" | "call_expression"))
                .flat_map(|arg| wrapped_bindings(arg, source))
                .collect();
            names
        }
        _ => Vec::new(),
    }
}

type CacheEntries = HashMap<String, HashMap<String, Arc<DefaultProps>>>;

/// Content-keyed cache in front of resolve_default_props: source text -> binding -> defaults
#[derive(Debug, Default)]
pub struct DefaultPropsCache {
    entries: Mutex<CacheEntries>,
}

impl DefaultPropsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_resolve(&self, file: &ParsedFile, binding: &str) -> Arc<DefaultProps> {
        let hit = self
            .lock()
            .get(file.source())
            .and_then(|bindings| bindings.get(binding))
            .cloned();
        if let Some(hit) = hit {
            return hit;
        }

        let resolved = Arc::new(resolve_default_props(file, binding));
        self.lock()
            .entry(file.source().to_string())
            .or_default()
            .insert(binding.to_string(), Arc::clone(&resolved));
        resolved
    }

    /// Number of cached (source, binding) entries
    pub fn len(&self) -> usize {
        self.lock().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, CacheEntries> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Top-level `const NAME = <literal>` bindings
fn literal_constants(top: &[Node], source: &str) -> HashMap<String, Value> {
    let mut consts = HashMap::new();
    let empty = HashMap::new();

    for statement in top {
        let declaration = if statement.kind() == "export_statement" {
            match statement.child_by_field_name("declaration") {
                Some(d) => d,
                None => continue,
            }
        } else {
            *statement
        };
        if declaration.kind() != "lexical_declaration" {
            continue;
        }
        let mut cursor = declaration.walk();
        for declarator in declaration.named_children(&mut cursor) {
            let (Some(name), Some(value)) = (
                declarator.child_by_field_name("name"),
                declarator.child_by_field_name("value"),
            ) else {
                continue;
            };
            if name.kind() != "identifier" || !is_literal(value) {
                continue;
            }
            if let Some(v) = literal_value(value, source, &empty) {
                consts.insert(node_text(name, source).to_string(), v);
            }
        }
    }

    consts
}

/// Locate the definition node (function, class or initializer) bound to `binding`
fn find_definition<'t>(top: &[Node<'t>], source: &str, binding: &str) -> Option<Node<'t>> {
    for statement in top {
        let (node, is_default) = if statement.kind() == "export_statement" {
            let is_default = child_of_kind(*statement, "default").is_some();
            match statement.child_by_field_name("declaration") {
                Some(d) => (d, is_default),
                None => {
                    if binding == "default" && is_default {
                        if let Some(value) = statement.child_by_field_name("value") {
                            return unwrap_expression(value);
                        }
                    }
                    continue;
                }
            }
        } else {
            (*statement, false)
        };

        match node.kind() {
            "function_declaration" | "class_declaration" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| node_text(n, source));
                if name == Some(binding) || (is_default && binding == "default" && name.is_none())
                {
                    return Some(node);
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = node.walk();
                for declarator in node.named_children(&mut cursor) {
                    let name = declarator
                        .child_by_field_name("name")
                        .map(|n| node_text(n, source));
                    if name == Some(binding) {
                        return declarator.child_by_field_name("value");
                    }
                }
            }
            _ => {}
        }
    }
    None
}

/// The function implementing a definition, looking through wrapper calls
fn component_function(node: Node) -> Option<Node> {
    match node.kind() {
        "function_declaration" | "function_expression" | "function" | "arrow_function" => {
            Some(node)
        }
        "call_expression" => {
            let args = node.child_by_field_name("arguments")?;
            let mut cursor = args.walk();
            let found = args
                .named_children(&mut cursor)
                .find_map(|arg| component_function(arg));
            found
        }
        "parenthesized_expression" | "as_expression" | "satisfies_expression" => {
            component_function(node.named_child(0)?)
        }
        _ => None,
    }
}

fn collect_parameter_defaults(
    function: Node,
    source: &str,
    consts: &HashMap<String, Value>,
    defaults: &mut DefaultProps,
) {
    let Some(params) = function.child_by_field_name("parameters") else {
        return;
    };
    let Some(first) = params.named_child(0) else {
        return;
    };
    let Some(pattern) = first.child_by_field_name("pattern") else {
        return;
    };

    match pattern.kind() {
        "object_pattern" => collect_pattern_defaults(pattern, source, consts, defaults),
        "identifier" => {
            // `const { a = 1 } = props` at the top of the body
            let props_name = node_text(pattern, source);
            let Some(body) = function.child_by_field_name("body") else {
                return;
            };
            let mut cursor = body.walk();
            for statement in body.named_children(&mut cursor) {
                if statement.kind() != "lexical_declaration" {
                    continue;
                }
                let mut inner = statement.walk();
                for declarator in statement.named_children(&mut inner) {
                    let (Some(name), Some(value)) = (
                        declarator.child_by_field_name("name"),
                        declarator.child_by_field_name("value"),
                    ) else {
                        continue;
                    };
                    if name.kind() == "object_pattern"
                        && value.kind() == "identifier"
                        && node_text(value, source) == props_name
                    {
                        collect_pattern_defaults(name, source, consts, defaults);
                    }
                }
            }
        }
        _ => {}
    }
}

fn collect_pattern_defaults(
    pattern: Node,
    source: &str,
    consts: &HashMap<String, Value>,
    defaults: &mut DefaultProps,
) {
    let mut cursor = pattern.walk();
    for child in pattern.named_children(&mut cursor) {
        let (name, value) = match child.kind() {
            "object_assignment_pattern" => {
                let (Some(left), Some(right)) =
                    (child.child_by_field_name("left"), child.child_by_field_name("right"))
                else {
                    continue;
                };
                (node_text(left, source).to_string(), right)
            }
            "pair_pattern" => {
                let (Some(key), Some(value)) =
                    (child.child_by_field_name("key"), child.child_by_field_name("value"))
                else {
                    continue;
                };
                if value.kind() != "assignment_pattern" {
                    continue;
                }
                let (Some(name), Some(right)) =
                    (property_key(key, source), value.child_by_field_name("right"))
                else {
                    continue;
                };
                (name, right)
            }
            _ => continue,
        };

        if let Some(v) = literal_value(value, source, consts) {
            defaults.values.insert(name, v);
        }
    }
}

fn collect_static_defaults(
    class: Node,
    source: &str,
    consts: &HashMap<String, Value>,
    defaults: &mut DefaultProps,
) {
    let Some(body) = class.child_by_field_name("body") else {
        return;
    };
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        if member.kind() != "public_field_definition" || child_of_kind(member, "static").is_none()
        {
            continue;
        }
        let is_default_props = member
            .child_by_field_name("name")
            .map(|n| node_text(n, source) == "defaultProps")
            .unwrap_or(false);
        if !is_default_props {
            continue;
        }
        if let Some(object) = member
            .child_by_field_name("value")
            .and_then(unwrap_expression)
            .filter(|n| n.kind() == "object")
        {
            defaults.extend_from_object(object, source, consts);
        }
    }
}

/// `binding.property` member expression check
fn is_member_of(node: Node, source: &str, binding: &str, property: &str) -> bool {
    if node.kind() != "member_expression" {
        return false;
    }
    let object = node.child_by_field_name("object").map(|n| node_text(n, source));
    let prop = node
        .child_by_field_name("property")
        .map(|n| node_text(n, source));
    object == Some(binding) && prop == Some(property)
}

/// Strip parentheses and `as`/`satisfies` wrappers
fn unwrap_expression(node: Node) -> Option<Node> {
    match node.kind() {
        "parenthesized_expression" | "as_expression" | "satisfies_expression"
        | "non_null_expression" => unwrap_expression(node.named_child(0)?),
        _ => Some(node),
    }
}

fn property_key(key: Node, source: &str) -> Option<String> {
    match key.kind() {
        "property_identifier" | "number" => Some(node_text(key, source).to_string()),
        "string" => Some(unescape(unquote(node_text(key, source)))),
        _ => None,
    }
}

/// Whether an expression is a pure literal (used for constant tracking)
fn is_literal(node: Node) -> bool {
    match node.kind() {
        "string" | "number" | "true" | "false" | "null" => true,
        "template_string" => child_of_kind(node, "template_substitution").is_none(),
        "unary_expression" => node.named_child(0).map(is_literal).unwrap_or(false),
        "array" | "object" => {
            let mut cursor = node.walk();
            let all = node.named_children(&mut cursor).all(|c| match c.kind() {
                "pair" => c.child_by_field_name("value").map(is_literal).unwrap_or(false),
                "comment" => true,
                _ => is_literal(c),
            });
            all
        }
        "parenthesized_expression" | "as_expression" | "satisfies_expression" => {
            node.named_child(0).map(is_literal).unwrap_or(false)
        }
        _ => false,
    }
}

/// Map an expression to a JSON value. None means "no default" (`undefined`).
pub fn literal_value(node: Node, source: &str, consts: &HashMap<String, Value>) -> Option<Value> {
    let text = node_text(node, source);

    let value = match node.kind() {
        "undefined" => return None,
        "string" => Value::String(unescape(unquote(text))),
        "template_string" if child_of_kind(node, "template_substitution").is_none() => {
            Value::String(unquote(text).to_string())
        }
        "number" => parse_number(text).unwrap_or_else(|| Value::String(text.to_string())),
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        "unary_expression" => {
            let operator = node.child_by_field_name("operator").map(|o| node_text(o, source));
            let argument = node.child_by_field_name("argument");
            match (operator, argument) {
                (Some("-"), Some(arg)) if arg.kind() == "number" => {
                    parse_number(&format!("-{}", node_text(arg, source)))
                        .unwrap_or_else(|| Value::String(text.to_string()))
                }
                _ => Value::String(text.to_string()),
            }
        }
        "identifier" => consts
            .get(text)
            .cloned()
            .unwrap_or_else(|| Value::String(text.to_string())),
        "array" => {
            let mut items = Vec::new();
            let mut cursor = node.walk();
            for element in node.named_children(&mut cursor) {
                match element.kind() {
                    "comment" => {}
                    "spread_element" => return Some(Value::String(text.to_string())),
                    _ => items.push(literal_value(element, source, consts).unwrap_or(Value::Null)),
                }
            }
            Value::Array(items)
        }
        "object" => {
            let mut map = Map::new();
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                match child.kind() {
                    "comment" => {}
                    "pair" => {
                        let key = child
                            .child_by_field_name("key")
                            .and_then(|k| property_key(k, source));
                        let value = child
                            .child_by_field_name("value")
                            .and_then(|v| literal_value(v, source, consts));
                        match (key, value) {
                            (Some(k), Some(v)) => {
                                map.insert(k, v);
                            }
                            (Some(_), None) => {}
                            (None, _) => return Some(Value::String(text.to_string())),
                        }
                    }
                    _ => return Some(Value::String(text.to_string())),
                }
            }
            Value::Object(map)
        }
        "parenthesized_expression" | "as_expression" | "satisfies_expression" => {
            match node.named_child(0) {
                Some(inner) => return literal_value(inner, source, consts),
                None => Value::String(text.to_string()),
            }
        }
        _ => Value::String(text.to_string()),
    };

    Some(value)
}

fn parse_number(text: &str) -> Option<Value> {
    let cleaned = text.replace('_', "");
    if let Ok(i) = cleaned.parse::<i64>() {
        return Some(Value::Number(i.into()));
    }
    if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        return i64::from_str_radix(hex, 16)
            .ok()
            .map(|i| Value::Number(i.into()));
    }
    cleaned
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

/// Resolve the common JS escape sequences of a string literal body
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
