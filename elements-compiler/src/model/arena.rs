//! Node arena.
//!
//! Owns every node of one unit. Parent links are plain indices, so upward
//! walks (`ancestors`, `nearest_ancestor_matching`) never fight the borrow
//! checker and dropping the arena drops the whole tree.

use crate::model::ast::{AstNode, Diagnostic, NodeId, NodeKind, Scope};
use crate::model::span::Span;
use serde::{Deserialize, Serialize};
use std::ops::Index;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ast {
    nodes: Vec<AstNode>,
    root: NodeId,
    /// Exported nodes (top-level declarations and root instances), in source order.
    pub exports: Vec<NodeId>,
    /// Import statements, in source order.
    pub imports: Vec<NodeId>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Ast {
    /// Creates an arena holding a single `Program` root spanning `span`.
    pub fn new(span: Span) -> Self {
        let mut ast = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            exports: Vec::new(),
            imports: Vec::new(),
            diagnostics: Vec::new(),
        };
        ast.root = ast.push(NodeKind::Program, span, None);
        ast
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&AstNode> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut AstNode> {
        self.nodes.get_mut(id.index())
    }

    /// Appends a node as the last child of `parent`.
    pub fn add_node(&mut self, kind: NodeKind, span: Span, parent: NodeId) -> NodeId {
        let id = self.push(kind, span, Some(parent));
        if let Some(p) = self.nodes.get_mut(parent.index()) {
            p.children.push(id);
        }
        id
    }

    fn push(&mut self, kind: NodeKind, span: Span, parent: Option<NodeId>) -> NodeId {
        let scope = kind.is_scope_bearing().then(Box::<Scope>::default);
        self.nodes.push(AstNode {
            kind,
            span,
            parent,
            children: Vec::new(),
            scope,
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|n| &n.kind)
    }

    pub fn kind_mut(&mut self, id: NodeId) -> Option<&mut NodeKind> {
        self.get_mut(id).map(|n| &mut n.kind)
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.get(id).map(|n| n.span).unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            ast: self,
            next: self.parent(id),
        }
    }

    /// Nearest strict ancestor whose kind satisfies `pred`.
    pub fn nearest_ancestor_matching<P>(&self, id: NodeId, mut pred: P) -> Option<NodeId>
    where
        P: FnMut(&NodeKind) -> bool,
    {
        self.ancestors(id)
            .find(|&a| self.kind(a).is_some_and(|k| pred(k)))
    }

    /// Nearest scope-bearing node, starting at `id` itself.
    pub fn scope_owner(&self, id: NodeId) -> Option<NodeId> {
        if self.get(id).is_some_and(|n| n.scope.is_some()) {
            return Some(id);
        }
        self.ancestors(id)
            .find(|&a| self.get(a).is_some_and(|n| n.scope.is_some()))
    }

    pub fn scope(&self, id: NodeId) -> Option<&Scope> {
        self.get(id).and_then(|n| n.scope.as_deref())
    }

    /// Records `ident` as a declaration in the nearest scope from `from`.
    pub fn add_declaration(&mut self, from: NodeId, ident: NodeId) {
        let Some(owner) = self.scope_owner(from) else {
            return;
        };
        if let Some(scope) = self.nodes[owner.index()].scope.as_mut() {
            scope.declarations.push(ident);
        }
    }

    /// Records `ident` as a reference in the nearest scope from `from`.
    pub fn add_used_identifier(&mut self, from: NodeId, ident: NodeId) {
        let Some(owner) = self.scope_owner(from) else {
            return;
        };
        if let Some(scope) = self.nodes[owner.index()].scope.as_mut() {
            scope.used_identifiers.push(ident);
        }
    }

    /// Source text of a node.
    pub fn slice<'s>(&self, id: NodeId, source: &'s str) -> &'s str {
        self.span(id).slice_text(source)
    }

    /// Source text of an optional node, empty when absent.
    pub fn slice_opt<'s>(&self, id: Option<NodeId>, source: &'s str) -> &'s str {
        id.map(|i| self.slice(i, source)).unwrap_or("")
    }

    /// Dotted join of several nodes' text.
    pub fn dotted(&self, ids: &[NodeId], source: &str) -> String {
        ids.iter()
            .map(|&i| self.slice(i, source))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Pre-order traversal of the subtree rooted at `id` (inclusive).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }
}

impl Index<NodeId> for Ast {
    type Output = AstNode;

    fn index(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.index()]
    }
}

pub struct Ancestors<'a> {
    ast: &'a Ast,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.ast.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_are_found_from_nested_nodes() {
        let mut ast = Ast::new(Span::new(0, 10));
        let root = ast.root();
        let stmt = ast.add_node(NodeKind::ExpressionStatement, Span::new(0, 5), root);
        let ident = ast.add_node(NodeKind::Identifier, Span::new(0, 1), stmt);

        assert_eq!(ast.scope_owner(ident), Some(root));
        ast.add_used_identifier(ident, ident);
        assert_eq!(ast.scope(root).map(|s| s.used_identifiers.clone()), Some(vec![ident]));
        assert!(ast.scope(stmt).is_none());
    }

    #[test]
    fn nearest_ancestor_excludes_self() {
        let mut ast = Ast::new(Span::new(0, 4));
        let root = ast.root();
        let outer = ast.add_node(NodeKind::MemberExpression, Span::new(0, 4), root);
        let inner = ast.add_node(NodeKind::MemberExpression, Span::new(0, 2), outer);

        let found = ast.nearest_ancestor_matching(inner, |k| matches!(k, NodeKind::MemberExpression));
        assert_eq!(found, Some(outer));
        assert_eq!(
            ast.nearest_ancestor_matching(outer, |k| matches!(k, NodeKind::MemberExpression)),
            None
        );
        assert_eq!(ast.ancestors(inner).collect::<Vec<_>>(), vec![outer, root]);
    }

    #[test]
    fn descendants_are_pre_order() {
        let mut ast = Ast::new(Span::new(0, 9));
        let root = ast.root();
        let a = ast.add_node(NodeKind::ExpressionStatement, Span::new(0, 3), root);
        let a1 = ast.add_node(NodeKind::Identifier, Span::new(0, 1), a);
        let b = ast.add_node(NodeKind::ExpressionStatement, Span::new(4, 9), root);
        assert_eq!(ast.descendants(root), vec![root, a, a1, b]);
    }
}
