//! @dose
//! purpose: Flattens a props type expression into the list of props a component accepts,
//!     following interface `extends`, intersections, aliases and utility types through
//!     the modules of a Program.
//!
//! when-editing:
//!     - !Merging keeps the first prop of a name: own members are pushed before inherited
//!       ones, so own declarations override
//!     - !Every lookup is bounded by MAX_DEPTH; recursive types must not hang
//!
//! invariants:
//!     - A prop's parent is the interface or alias whose body declares it
//!     - Members of an object type that is not the direct value of an alias have no parent
//!
//! gotchas:
//!     - `React.HTMLAttributes<T>` resolves through an import of 'react', which is not in
//!       the program, so it contributes nothing
//!     - Pick/Omit keys may be a literal union or an alias of one

use crate::parser::declarations::{
    substitute_type_text, ExportTarget, ImportBinding, InterfaceDecl, MemberDecl, TypeAliasDecl,
    TypeExpr, TypeParam,
};
use crate::program::{Program, SourceModule};
use crate::types::{ParentType, PropItem};
use std::collections::HashMap;
use tracing::debug;

const MAX_DEPTH: usize = 32;

/// A named type declaration found during resolution
#[derive(Debug, Clone, Copy)]
pub enum TypeDecl<'p> {
    Interface(&'p InterfaceDecl),
    Alias(&'p TypeAliasDecl),
}

/// A type argument and the module its names resolve in
#[derive(Debug, Clone)]
struct TypeArg<'p> {
    module: &'p SourceModule,
    expr: TypeExpr,
}

/// Type parameter name -> argument of the declaration being expanded
type Bindings<'p> = HashMap<String, TypeArg<'p>>;

fn substitutions(bindings: &Bindings) -> HashMap<String, TypeExpr> {
    bindings
        .iter()
        .map(|(name, arg)| (name.clone(), arg.expr.clone()))
        .collect()
}

/// Walks props types across the modules of a program
pub struct PropCollector<'p> {
    program: &'p Program,
}

impl<'p> PropCollector<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self { program }
    }

    /// All props of a type expression written in `module`
    pub fn collect(&self, module: &'p SourceModule, expr: &TypeExpr) -> Vec<PropItem> {
        self.collect_expr(module, expr, None, &Bindings::new(), 0)
    }

    fn collect_expr(
        &self,
        module: &'p SourceModule,
        expr: &TypeExpr,
        owner: Option<&str>,
        bindings: &Bindings<'p>,
        depth: usize,
    ) -> Vec<PropItem> {
        if depth > MAX_DEPTH {
            debug!("Type resolution depth exceeded in {}", module.path().display());
            return Vec::new();
        }

        match expr {
            TypeExpr::Object(members) => {
                let params = substitutions(bindings);
                members
                    .iter()
                    .map(|m| prop_item(module, m, owner, &params))
                    .collect()
            }
            TypeExpr::Intersection(parts) | TypeExpr::Union(parts) => {
                let mut out = Vec::new();
                for part in parts {
                    merge(
                        &mut out,
                        self.collect_expr(module, part, None, bindings, depth + 1),
                    );
                }
                out
            }
            TypeExpr::Reference { name, args } if args.is_empty() && bindings.contains_key(name) => {
                let arg = &bindings[name];
                self.collect_expr(arg.module, &arg.expr, owner, &Bindings::new(), depth + 1)
            }
            TypeExpr::Reference { name, args } => {
                self.collect_reference(module, name, args, bindings, depth)
            }
            TypeExpr::Literal(_) | TypeExpr::Other(_) => Vec::new(),
        }
    }

    fn collect_reference(
        &self,
        module: &'p SourceModule,
        name: &str,
        args: &[TypeExpr],
        bindings: &Bindings<'p>,
        depth: usize,
    ) -> Vec<PropItem> {
        let utility = if module.declarations().declares_type(name) {
            None
        } else {
            Some(name)
        };

        match (utility, args) {
            (Some("Partial"), [inner, ..]) => {
                let mut props = self.collect_expr(module, inner, None, bindings, depth + 1);
                props.iter_mut().for_each(|p| p.required = false);
                return props;
            }
            (Some("Required"), [inner, ..]) => {
                let mut props = self.collect_expr(module, inner, None, bindings, depth + 1);
                props.iter_mut().for_each(|p| p.required = true);
                return props;
            }
            (Some("Readonly"), [inner, ..]) => {
                return self.collect_expr(module, inner, None, bindings, depth + 1);
            }
            (Some("Pick"), [inner, keys, ..]) => {
                let keys = keys.substitute(&substitutions(bindings));
                let keys = self.literal_keys(module, &keys, depth);
                let mut props = self.collect_expr(module, inner, None, bindings, depth + 1);
                props.retain(|p| keys.contains(&p.name));
                return props;
            }
            (Some("Omit"), [inner, keys, ..]) => {
                let keys = keys.substitute(&substitutions(bindings));
                let keys = self.literal_keys(module, &keys, depth);
                let mut props = self.collect_expr(module, inner, None, bindings, depth + 1);
                props.retain(|p| !keys.contains(&p.name));
                return props;
            }
            _ => {}
        }

        let Some((decl_module, decl)) = self.resolve_type(module, name, depth) else {
            debug!("Unresolved type {} in {}", name, module.path().display());
            return Vec::new();
        };

        match decl {
            TypeDecl::Interface(interface) => {
                let bound = bind(&interface.type_params, decl_module, args, module, bindings);
                let params = substitutions(&bound);
                let mut out: Vec<PropItem> = interface
                    .members
                    .iter()
                    .map(|m| prop_item(decl_module, m, Some(interface.name.as_str()), &params))
                    .collect();
                for base in &interface.extends {
                    merge(
                        &mut out,
                        self.collect_expr(decl_module, base, None, &bound, depth + 1),
                    );
                }
                out
            }
            TypeDecl::Alias(alias) => {
                let bound = bind(&alias.type_params, decl_module, args, module, bindings);
                self.collect_expr(
                    decl_module,
                    &alias.value,
                    Some(alias.name.as_str()),
                    &bound,
                    depth + 1,
                )
            }
        }
    }

    /// Keys of a Pick/Omit key argument, looking through an alias
    fn literal_keys(&self, module: &'p SourceModule, keys: &TypeExpr, depth: usize) -> Vec<String> {
        if let TypeExpr::Reference { name, .. } = keys {
            if let Some((_, TypeDecl::Alias(alias))) = self.resolve_type(module, name, depth + 1) {
                return alias.value.literal_keys();
            }
        }
        keys.literal_keys()
    }

    /// Find the declaration a type name refers to from inside `module`
    pub fn resolve_type(
        &self,
        module: &'p SourceModule,
        name: &str,
        depth: usize,
    ) -> Option<(&'p SourceModule, TypeDecl<'p>)> {
        if depth > MAX_DEPTH {
            return None;
        }
        let decls = module.declarations();

        if let Some((namespace, member)) = name.split_once('.') {
            let target = match decls.imports.get(namespace)? {
                ImportBinding::Namespace { specifier } | ImportBinding::Default { specifier } => {
                    self.program.resolve_import(module, specifier)?
                }
                ImportBinding::Named { .. } => return None,
            };
            return self.find_exported(target, member, depth + 1);
        }

        if let Some(interface) = decls.interfaces.get(name) {
            return Some((module, TypeDecl::Interface(interface)));
        }
        if let Some(alias) = decls.aliases.get(name) {
            return Some((module, TypeDecl::Alias(alias)));
        }

        match decls.imports.get(name)? {
            ImportBinding::Named {
                specifier,
                imported,
            } => {
                let target = self.program.resolve_import(module, specifier)?;
                self.find_exported(target, imported, depth + 1)
            }
            ImportBinding::Default { specifier } => {
                let target = self.program.resolve_import(module, specifier)?;
                self.find_exported(target, "default", depth + 1)
            }
            ImportBinding::Namespace { .. } => None,
        }
    }

    /// Find a type exported from `module` under `name`
    fn find_exported(
        &self,
        module: &'p SourceModule,
        name: &str,
        depth: usize,
    ) -> Option<(&'p SourceModule, TypeDecl<'p>)> {
        if depth > MAX_DEPTH {
            return None;
        }
        let decls = module.declarations();

        match decls.exports.get(name) {
            Some(ExportTarget::Local(local)) => {
                return self.resolve_type(module, local, depth + 1);
            }
            Some(ExportTarget::ReExport {
                specifier,
                imported,
            }) => {
                let target = self.program.resolve_import(module, specifier)?;
                return self.find_exported(target, imported, depth + 1);
            }
            None => {}
        }

        if decls.declares_type(name) {
            return self.resolve_type(module, name, depth + 1);
        }

        decls.star_exports.iter().find_map(|specifier| {
            let target = self.program.resolve_import(module, specifier)?;
            self.find_exported(target, name, depth + 1)
        })
    }
}

/// Pair a declaration's type parameters with the arguments of a reference to it.
/// Missing arguments fall back to the parameter default; parameters without either
/// stay unbound and keep their name.
fn bind<'p>(
    params: &[TypeParam],
    decl_module: &'p SourceModule,
    args: &[TypeExpr],
    module: &'p SourceModule,
    outer: &Bindings<'p>,
) -> Bindings<'p> {
    let mut bound = Bindings::new();
    for (index, param) in params.iter().enumerate() {
        let arg = match (args.get(index), &param.default) {
            (Some(arg), _) => instantiate(arg, module, outer),
            (None, Some(default)) => instantiate(default, decl_module, &bound),
            (None, None) => continue,
        };
        bound.insert(param.name.clone(), arg);
    }
    bound
}

/// Resolve an argument written in `module` against the bindings in scope there
fn instantiate<'p>(
    expr: &TypeExpr,
    module: &'p SourceModule,
    bindings: &Bindings<'p>,
) -> TypeArg<'p> {
    if let TypeExpr::Reference { name, args } = expr {
        if let (true, Some(arg)) = (args.is_empty(), bindings.get(name)) {
            return arg.clone();
        }
    }
    TypeArg {
        module,
        expr: expr.substitute(&substitutions(bindings)),
    }
}

fn prop_item(
    module: &SourceModule,
    member: &MemberDecl,
    owner: Option<&str>,
    params: &HashMap<String, TypeExpr>,
) -> PropItem {
    PropItem {
        name: member.name.clone(),
        description: member.doc.clone().unwrap_or_default(),
        required: !member.optional,
        type_name: substitute_type_text(&member.type_text, params),
        parent: owner.map(|name| ParentType {
            name: name.to_string(),
            file_name: module.path().to_path_buf(),
        }),
    }
}

/// Append props whose names are not taken yet
fn merge(out: &mut Vec<PropItem>, more: Vec<PropItem>) {
    for prop in more {
        if !out.iter().any(|p| p.name == prop.name) {
            out.push(prop);
        }
    }
}
