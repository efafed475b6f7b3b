//! Component instances become self-invoking functions bound to the instance.

use super::Generator;
use super::component::InitTarget;
use crate::model::ast::{InstanceData, NodeId, NodeKind};

impl Generator<'_> {
    /// `(function(parent){ ... return this }.bind(new Type(args))(parent))`
    ///
    /// A nested instance with an id binds to the object its owner already
    /// constructed under that id.
    pub(super) fn instance(&self, id: NodeId, inst: &InstanceData, depth: usize) -> String {
        let mut w = self.writer();
        if inst.is_root {
            if let Some(name) = inst.instance_name {
                w.push(&format!("export let {} = ", self.public_name(self.text(name))));
            }
        }
        w.indent(depth).push("(function(parent){\n");
        w.line(depth + 1, "this.setParent(parent)");

        self.initializer(
            &mut w,
            &inst.members,
            inst.body,
            InitTarget::Instance {
                id: inst.id,
                is_root: inst.is_root,
            },
            depth + 1,
        );

        for &func in &inst.members.functions {
            let Some(f) = self.ast.kind(func).and_then(NodeKind::function) else {
                continue;
            };
            let body = f.body.map(|b| self.render_children(b)).unwrap_or_else(|| "{}".into());
            let params = match self.ast.kind(func) {
                Some(NodeKind::MethodDefinition(_)) => f.params_node.map(|p| self.text(p).to_string()),
                _ => None,
            }
            .unwrap_or_else(|| format!("({})", self.param_names(&f.params)));
            w.line(depth + 1, &format!("this.{} = function{params}{body}", self.text_opt(f.name)));
        }

        w.line(depth + 1, "return this");
        let target = match inst.id {
            Some(own_id) if !inst.is_root => self.text(own_id).to_string(),
            _ => {
                let args = inst.arguments.map(|a| self.render_children(a)).unwrap_or_else(|| "()".into());
                format!("new {}{}", self.dotted(&inst.name), args)
            }
        };
        let parent = if self.binds_to_enclosing(id) { "this" } else { "null" };
        w.indent(depth).push(&format!("}}.bind({target})({parent}))"));
        w.finish()
    }

    /// Instances directly in a component body, or as the value of a property
    /// of one, receive the enclosing component as parent.
    fn binds_to_enclosing(&self, id: NodeId) -> bool {
        let is_body = |n: Option<NodeId>| matches!(n.and_then(|n| self.ast.kind(n)), Some(NodeKind::ComponentBody));
        let parent = self.ast.parent(id);
        if is_body(parent) {
            return true;
        }
        let grandparent = parent.and_then(|p| self.ast.parent(p));
        let is_property = matches!(
            grandparent.and_then(|g| self.ast.kind(g)),
            Some(NodeKind::PropertyDeclaration(_) | NodeKind::PropertyAssignment(_))
        );
        is_property && is_body(grandparent.and_then(|g| self.ast.parent(g)))
    }
}
