//! Events, listeners, methods, typed functions, plain and arrow functions,
//! constructors and call expressions.

use super::{BuildResult, Builder};
use crate::cst::CstNode;
use crate::model::ast::{Diagnostic, FunctionData, NodeId, NodeKind, Parameter};
use tracing::warn;

/// Which member list of the owning component a callable joins.
#[derive(Clone, Copy)]
enum MemberList {
    Events,
    Listeners,
    Functions,
    None,
}

impl<'s> Builder<'s> {
    /// `event name(type a, type b)`
    pub(super) fn visit_event_declaration<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        self.visit_callable(parent, node, NodeKind::EventDeclaration(FunctionData::default()), MemberList::Events)
            .map(drop)
    }

    /// `on name(a, b) { ... }`
    pub(super) fn visit_listener_declaration<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        self.visit_callable(
            parent,
            node,
            NodeKind::ListenerDeclaration(FunctionData::default()),
            MemberList::Listeners,
        )
        .map(drop)
    }

    pub(super) fn visit_method_definition<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        self.visit_callable(parent, node, NodeKind::MethodDefinition(FunctionData::default()), MemberList::Functions)
            .map(drop)
    }

    /// `fn name(type a) { ... }`
    pub(super) fn visit_typed_function<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        self.visit_callable(
            parent,
            node,
            NodeKind::TypedFunctionDeclaration(FunctionData::default()),
            MemberList::Functions,
        )
        .map(drop)
    }

    /// Plain `function` declarations and expressions. A declared name is
    /// visible in the enclosing scope.
    pub(super) fn visit_function_declaration<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        let func = self.visit_callable(
            parent,
            node,
            NodeKind::FunctionDeclaration(FunctionData::default()),
            MemberList::None,
        )?;
        if let Some(name) = self.ast.kind(func).and_then(NodeKind::function).and_then(|f| f.name) {
            self.ast.add_declaration(parent, name);
        }
        Ok(())
    }

    /// `(a, b) => ...` or `a => ...`. Parameters live in the arrow's own scope
    /// so expression bodies see them too.
    pub(super) fn visit_arrow_function<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        let arrow = self.leaf(parent, node, NodeKind::ArrowFunction(FunctionData::default()));
        let mut after_arrow = false;
        for child in node.children() {
            match child.kind() {
                "=>" => after_arrow = true,
                "formal_parameters" if !after_arrow => {
                    let (params_node, params) = self.formal_parameters(arrow, child);
                    for p in &params {
                        self.ast.add_declaration(arrow, p.name);
                    }
                    self.with_function(arrow, |f| {
                        f.params_node = Some(params_node);
                        f.params = params;
                    });
                }
                "identifier" if !after_arrow => {
                    let name = self.leaf(arrow, child, NodeKind::Identifier);
                    self.ast.add_declaration(arrow, name);
                    self.with_function(arrow, |f| f.params.push(Parameter { type_name: None, name }));
                }
                "statement_block" if after_arrow => {
                    let body = self.wrap(arrow, child, NodeKind::StatementBlock)?;
                    self.with_function(arrow, |f| f.body = Some(body));
                }
                _ if after_arrow => self.visit(arrow, child)?,
                _ => {}
            }
        }
        Ok(())
    }

    pub(super) fn visit_constructor<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        let ctor = self.visit_callable(
            parent,
            node,
            NodeKind::ConstructorDefinition(FunctionData::default()),
            MemberList::None,
        )?;

        let Some(owner) = self.body_owner(parent) else {
            return Ok(());
        };
        let owner_span = self.ast.span(owner);
        let previous = match self.ast.kind_mut(owner) {
            Some(NodeKind::ComponentDeclaration(d)) => d.constructor.replace(ctor),
            _ => None,
        };
        if let Some(previous) = previous {
            let ignored = self.ast.span(previous);
            warn!(
                component = %owner_span.range_string(),
                ignored = %ignored.range_string(),
                "multiple constructors in one component body; keeping the last"
            );
            self.ast.diagnostics.push(Diagnostic::DuplicateConstructor {
                component: owner_span,
                ignored,
            });
        }
        Ok(())
    }

    /// Call expressions: bare-identifier arguments are references, and a
    /// `super(...)` statement of a constructor body is linked to the constructor.
    pub(super) fn visit_call_expression<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        let call = self.leaf(parent, node, NodeKind::CallExpression { is_super: false });
        for child in node.children() {
            match child.kind() {
                "arguments" => {
                    let args = self.wrap(call, child, NodeKind::Arguments)?;
                    self.register_identifier_arguments(args);
                }
                "super" => {
                    if let Some(NodeKind::CallExpression { is_super }) = self.ast.kind_mut(call) {
                        *is_super = true;
                    }
                    self.link_super_call(parent, call);
                }
                _ => self.visit(call, child)?,
            }
        }
        Ok(())
    }

    /// `ExpressionStatement` → `StatementBlock` → `ConstructorDefinition`.
    fn link_super_call(&mut self, statement: NodeId, call: NodeId) {
        if !matches!(self.kind_of(statement), Some(NodeKind::ExpressionStatement)) {
            return;
        }
        let block = self.ast.parent(statement);
        if !self.is_kind(block, |k| matches!(k, NodeKind::StatementBlock)) {
            return;
        }
        let ctor = block.and_then(|b| self.ast.parent(b));
        if !self.is_kind(ctor, |k| matches!(k, NodeKind::ConstructorDefinition(_))) {
            return;
        }
        if let Some(ctor) = ctor {
            self.with_function(ctor, |f| {
                f.super_call.get_or_insert(call);
            });
        }
    }

    /// Shared shape: optional name, a parameter list (typed or not) and an
    /// optional statement-block body whose scope pre-declares the parameters.
    fn visit_callable<N: CstNode>(
        &mut self,
        parent: NodeId,
        node: N,
        kind: NodeKind,
        list: MemberList,
    ) -> BuildResult<NodeId> {
        let func = self.leaf(parent, node, kind);
        for child in node.children() {
            match child.kind() {
                "property_identifier" | "identifier" => {
                    let has_name = self.ast.kind(func).and_then(NodeKind::function).is_some_and(|f| f.name.is_some());
                    if !has_name {
                        let name = self.leaf(func, child, NodeKind::Identifier);
                        self.with_function(func, |f| f.name = Some(name));
                    }
                }
                "formal_parameters" => {
                    let (params_node, params) = self.formal_parameters(func, child);
                    self.with_function(func, |f| {
                        f.params_node = Some(params_node);
                        f.params = params;
                    });
                }
                "formal_type_parameters" => {
                    let (params_node, params) = self.formal_type_parameters(func, child);
                    self.with_function(func, |f| {
                        f.params_node = Some(params_node);
                        f.params = params;
                    });
                }
                "statement_block" => {
                    let body = self.leaf(func, child, NodeKind::StatementBlock);
                    let params: Vec<NodeId> = self
                        .ast
                        .kind(func)
                        .and_then(NodeKind::function)
                        .map(|f| f.params.iter().map(|p| p.name).collect())
                        .unwrap_or_default();
                    for p in params {
                        self.ast.add_declaration(body, p);
                    }
                    self.with_function(func, |f| f.body = Some(body));
                    self.visit_children(body, child)?;
                }
                _ => {}
            }
        }

        let Some(owner) = self.body_owner(parent) else {
            return Ok(func);
        };
        if let Some(members) = self.ast.kind_mut(owner).and_then(NodeKind::members_mut) {
            match list {
                MemberList::Events => members.events.push(func),
                MemberList::Listeners => members.listeners.push(func),
                MemberList::Functions => members.functions.push(func),
                MemberList::None => {}
            }
        }
        Ok(func)
    }

    /// Untyped parameters: each named child is an identifier or a pattern whose
    /// first identifier names the parameter.
    fn formal_parameters<N: CstNode>(&mut self, func: NodeId, node: N) -> (NodeId, Vec<Parameter>) {
        let list = self.leaf(func, node, NodeKind::FormalParameters);
        let mut params = Vec::new();
        for child in node.named_children() {
            let ident = if child.kind() == "identifier" {
                Some(child)
            } else {
                child.children().into_iter().find(|c| c.kind() == "identifier")
            };
            if let Some(ident) = ident {
                let name = self.leaf(list, ident, NodeKind::Identifier);
                params.push(Parameter { type_name: None, name });
            }
        }
        (list, params)
    }

    /// Typed parameters, either as `formal_type_parameter` children
    /// (`type name` each) or as a flat sequence of named type/name pairs.
    fn formal_type_parameters<N: CstNode>(&mut self, func: NodeId, node: N) -> (NodeId, Vec<Parameter>) {
        let list = self.leaf(func, node, NodeKind::FormalParameters);
        let children = node.children();
        let pairs: Vec<(N, N)> = if children.iter().any(|c| c.kind() == "formal_type_parameter") {
            children
                .iter()
                .filter(|c| c.kind() == "formal_type_parameter")
                .filter_map(|c| Some((c.child(0)?, c.child(1)?)))
                .collect()
        } else {
            let named = node.named_children();
            if named.len() % 2 != 0 {
                return (list, Vec::new());
            }
            named.chunks(2).map(|pair| (pair[0], pair[1])).collect()
        };

        let params = pairs
            .into_iter()
            .map(|(ty, name)| Parameter {
                type_name: Some(self.leaf(list, ty, NodeKind::Identifier)),
                name: self.leaf(list, name, NodeKind::Identifier),
            })
            .collect();
        (list, params)
    }

    fn with_function(&mut self, func: NodeId, f: impl FnOnce(&mut FunctionData)) {
        if let Some(data) = self.ast.kind_mut(func).and_then(NodeKind::function_mut) {
            f(data);
        }
    }
}
