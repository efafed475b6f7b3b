//! Scope queries over a built AST.
//!
//! Resolution is textual: a name is declared if any enclosing scope lists an
//! identifier with the same source text, or if it is a configured builtin.
//! Declarations are looked up after the whole unit is built, so textual order
//! inside a scope does not matter.

pub mod import_types;

use crate::config::model::ScopeConfig;
use crate::model::arena::Ast;
use crate::model::ast::{NodeId, NodeKind};

/// True if `name` resolves from `from` (inclusive) up to the unit root.
pub fn is_declared(ast: &Ast, source: &str, name: &str, from: NodeId, builtins: &ScopeConfig) -> bool {
    if builtins.is_builtin(name) {
        return true;
    }
    let mut cursor = ast.scope_owner(from);
    while let Some(owner) = cursor {
        if let Some(scope) = ast.scope(owner) {
            if scope.declarations.iter().any(|&d| ast.slice(d, source) == name) {
                return true;
            }
        }
        cursor = ast.parent(owner).and_then(|p| ast.scope_owner(p));
    }
    false
}

/// Used identifiers of `scope_node` that do not resolve, in registration order.
pub fn undeclared_identifiers(ast: &Ast, source: &str, scope_node: NodeId, builtins: &ScopeConfig) -> Vec<NodeId> {
    let Some(scope) = ast.scope(scope_node) else {
        return Vec::new();
    };
    scope
        .used_identifiers
        .iter()
        .copied()
        .filter(|&ident| !is_declared(ast, source, ast.slice(ident, source), ident, builtins))
        .collect()
}

/// Leftmost identifier of a receiver chain (`a` in `a.b.c`), if the chain
/// bottoms out in one.
pub fn leftmost_identifier(ast: &Ast, expr: NodeId) -> Option<NodeId> {
    let mut cursor = expr;
    loop {
        match ast.kind(cursor)? {
            NodeKind::Identifier => return Some(cursor),
            NodeKind::MemberExpression => cursor = ast.child(cursor, 0)?,
            _ => return None,
        }
    }
}

/// True if the binding `member` of property `prop` is rooted in a name
/// declared between the two (a local variable or parameter of the value block).
pub fn is_local_binding(ast: &Ast, source: &str, member: NodeId, prop: NodeId) -> bool {
    let Some(ident) = leftmost_identifier(ast, member) else {
        return false;
    };
    let name = ast.slice(ident, source);
    ast.ancestors(member)
        .take_while(|&a| a != prop)
        .filter_map(|a| ast.scope(a))
        .any(|scope| scope.declarations.iter().any(|&d| ast.slice(d, source) == name))
}
