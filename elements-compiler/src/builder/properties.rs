//! Property declarations, property assignments and binding detection.

use super::{BuildResult, Builder};
use crate::cst::CstNode;
use crate::model::ast::{NodeId, NodeKind, PropertyValue};

impl<'s> Builder<'s> {
    /// `type name: value`
    pub(super) fn visit_property_declaration<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        let prop = self.leaf(parent, node, NodeKind::PropertyDeclaration(Box::default()));
        for child in node.children() {
            match child.kind() {
                "identifier" => {
                    let ty = self.leaf(prop, child, NodeKind::Identifier);
                    if let Some(NodeKind::PropertyDeclaration(p)) = self.ast.kind_mut(prop) {
                        p.type_name.get_or_insert(ty);
                    }
                }
                "property_identifier" => {
                    let name = self.leaf(prop, child, NodeKind::Identifier);
                    if let Some(NodeKind::PropertyDeclaration(p)) = self.ast.kind_mut(prop) {
                        p.name.get_or_insert(name);
                    }
                }
                _ => {
                    if let Some(value) = self.visit_property_value(prop, child)? {
                        if let Some(NodeKind::PropertyDeclaration(p)) = self.ast.kind_mut(prop) {
                            p.value = Some(value);
                        }
                    }
                }
            }
        }

        if let Some(owner) = self.body_owner(parent) {
            if let Some(members) = self.ast.kind_mut(owner).and_then(NodeKind::members_mut) {
                members.properties.push(prop);
            }
        }
        Ok(())
    }

    /// `a.b.c: value` where the left-hand side alternates segments and dots.
    pub(super) fn visit_property_assignment<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        let assign = self.leaf(parent, node, NodeKind::PropertyAssignment(Box::default()));

        if let Some(lhs) = node.child(0).filter(|c| c.kind() == "property_assignment_lhs") {
            let path: Vec<NodeId> = lhs
                .children()
                .into_iter()
                .step_by(2)
                .map(|segment| self.leaf(assign, segment, NodeKind::Identifier))
                .collect();
            if let Some(NodeKind::PropertyAssignment(a)) = self.ast.kind_mut(assign) {
                a.path = path;
            }
        }

        if let Some(rhs) = node.child(2) {
            if let Some(value) = self.visit_property_value(assign, rhs)? {
                if let Some(NodeKind::PropertyAssignment(a)) = self.ast.kind_mut(assign) {
                    a.value = Some(value);
                }
            }
        }

        if let Some(owner) = self.body_owner(parent) {
            if let Some(members) = self.ast.kind_mut(owner).and_then(NodeKind::members_mut) {
                members.assignments.push(assign);
            }
        }
        Ok(())
    }

    /// One of the three value forms; other children are ignored.
    fn visit_property_value<N: CstNode>(&mut self, prop: NodeId, node: N) -> BuildResult<Option<PropertyValue>> {
        let value = match node.kind() {
            "expression_statement" => PropertyValue::Expression(self.wrap(prop, node, NodeKind::BindableExpression)?),
            "statement_block" => PropertyValue::Block(self.wrap(prop, node, NodeKind::StatementBlock)?),
            "component_declaration" => PropertyValue::Component(self.visit_component_declaration(prop, node)?),
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    /// Registers the leftmost identifier as used and, inside a property value,
    /// the expression itself as a binding of that property.
    pub(super) fn visit_member_expression<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        let member = self.wrap(parent, node, NodeKind::MemberExpression)?;
        let Some(receiver) = self.ast.child(member, 0) else {
            return Ok(());
        };
        let receiver_kind = self.kind_of(receiver).cloned();
        if matches!(receiver_kind, Some(NodeKind::Identifier)) {
            self.ast.add_used_identifier(member, receiver);
        }

        let target = self.ast.ancestors(member).find(|&a| {
            self.kind_of(a).is_some_and(|k| {
                k.stops_binding_search()
                    || matches!(k, NodeKind::PropertyDeclaration(_) | NodeKind::PropertyAssignment(_))
            })
        });
        let Some(target) = target else {
            return Ok(());
        };
        if !matches!(receiver_kind, Some(NodeKind::Identifier | NodeKind::MemberExpression)) {
            return Ok(());
        }
        match self.ast.kind_mut(target) {
            Some(NodeKind::PropertyDeclaration(p)) => p.bindings.push(member),
            Some(NodeKind::PropertyAssignment(a)) => a.bindings.push(member),
            _ => {}
        }
        Ok(())
    }
}
