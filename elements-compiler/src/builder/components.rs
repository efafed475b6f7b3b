//! Component declarations, component instances and tagged components.

use super::{BuildResult, Builder};
use crate::cst::CstNode;
use crate::model::ast::{ComponentDecl, InstanceData, NodeId, NodeKind, TaggedData};

impl<'s> Builder<'s> {
    /// `component Name < Base.Type #id { ... }`
    pub(super) fn visit_component_declaration<N: CstNode>(
        &mut self,
        parent: NodeId,
        node: N,
    ) -> BuildResult<NodeId> {
        let decl = self.leaf(parent, node, NodeKind::ComponentDeclaration(Box::default()));
        if parent == self.ast.root() {
            self.ast.exports.push(decl);
        }

        for child in node.children() {
            match child.kind() {
                "identifier" => {
                    let name = self.leaf(decl, child, NodeKind::Identifier);
                    self.with_decl(decl, |d| {
                        d.name.get_or_insert(name);
                    });
                    self.ast.add_declaration(parent, name);
                }
                "component_heritage" => {
                    let heritage = self.leaf(decl, child, NodeKind::ComponentHeritage);
                    let segments: Vec<NodeId> = child
                        .children()
                        .into_iter()
                        .filter(|s| s.kind() == "identifier")
                        .map(|s| self.leaf(heritage, s, NodeKind::Identifier))
                        .collect();
                    if let Some(&first) = segments.first() {
                        self.ast.add_used_identifier(decl, first);
                    }
                    self.with_decl(decl, |d| d.heritage = segments);
                }
                "component_identifier" => {
                    if let Some(id) = self.component_identifier(decl, child) {
                        self.with_decl(decl, |d| d.id = Some(id));
                        self.ast.add_declaration(decl, id);
                    }
                }
                "component_body" => {
                    let body = self.visit_component_body(decl, child)?;
                    self.with_decl(decl, |d| d.body = Some(body));
                }
                _ => {}
            }
        }
        Ok(decl)
    }

    pub(super) fn visit_component_body<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult<NodeId> {
        self.wrap(parent, node, NodeKind::ComponentBody)
    }

    /// `Type.Name #id (args) { ... }`, optionally bound with `instance name`.
    pub(super) fn visit_component_instance<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        let is_root = self.is_root_position(parent);
        let inst = self.leaf(
            parent,
            node,
            NodeKind::ComponentInstance(Box::new(InstanceData {
                is_root,
                ..InstanceData::default()
            })),
        );
        if is_root {
            self.ast.exports.push(inst);
        }

        for child in node.children() {
            match child.kind() {
                "identifier" => {
                    let segment = self.leaf(inst, child, NodeKind::Identifier);
                    let first = self.with_instance(inst, |i| {
                        i.name.push(segment);
                        i.name.len() == 1
                    });
                    if first == Some(true) {
                        self.ast.add_used_identifier(inst, segment);
                    }
                }
                "component_body" => {
                    let body = self.visit_component_body(inst, child)?;
                    self.with_instance(inst, |i| i.body = Some(body));
                }
                "arguments" => {
                    let args = self.wrap(inst, child, NodeKind::Arguments)?;
                    self.register_identifier_arguments(args);
                    self.with_instance(inst, |i| i.arguments = Some(args));
                }
                "component_identifier" => {
                    if let Some(id) = self.component_identifier(inst, child) {
                        self.with_instance(inst, |i| i.id = Some(id));
                        self.ast.add_declaration(inst, id);
                    }
                }
                "component_instance" => {
                    if let Some(name) = self.component_identifier(inst, child) {
                        self.with_instance(inst, |i| i.instance_name = Some(name));
                    }
                }
                _ => {}
            }
        }

        // The id may also come from an `id: name` member of the body.
        let id = self.ast.kind(inst).and_then(NodeKind::component_id);
        match id {
            Some(id) if !is_root => self.expose_id_component(parent, inst, id),
            Some(_) => {}
            None => self.push_default_slot(parent, inst),
        }
        Ok(())
    }

    /// `id: name` inside a component body sets the owner's id.
    pub(super) fn visit_id_assignment<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        let Some(owner) = self.body_owner(parent) else {
            return Ok(());
        };
        let Some(id_node) = node.child(2).filter(|c| c.kind() == "identifier") else {
            return Ok(());
        };
        let id = self.leaf(owner, id_node, NodeKind::Identifier);
        match self.ast.kind_mut(owner) {
            Some(NodeKind::ComponentDeclaration(d)) => d.id = Some(id),
            Some(NodeKind::ComponentInstance(i)) => i.id = Some(id),
            _ => return Ok(()),
        }
        self.ast.add_declaration(owner, id);
        Ok(())
    }

    /// `` Tag`raw text` `` inside a component or expression.
    pub(super) fn visit_tagged_component<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        let tagged = self.leaf(parent, node, NodeKind::TaggedComponent(TaggedData::default()));
        for child in node.children() {
            match child.kind() {
                "identifier" => {
                    let tag = self.leaf(tagged, child, NodeKind::Identifier);
                    self.ast.add_used_identifier(tagged, tag);
                    if let Some(NodeKind::TaggedComponent(t)) = self.ast.kind_mut(tagged) {
                        t.tag.get_or_insert(tag);
                    }
                }
                "tagged_type_string" => {
                    let text = self.leaf(tagged, child, NodeKind::TaggedString);
                    if let Some(NodeKind::TaggedComponent(t)) = self.ast.kind_mut(tagged) {
                        t.string = Some(text);
                    }
                }
                _ => self.visit(tagged, child)?,
            }
        }
        self.push_default_slot(parent, tagged);
        Ok(())
    }

    /// Second child of `component_identifier` / `component_instance` (`#id`, `instance x`).
    fn component_identifier<N: CstNode>(&mut self, owner: NodeId, node: N) -> Option<NodeId> {
        let id = node.child(1).filter(|c| c.kind() == "identifier")?;
        Some(self.leaf(owner, id, NodeKind::Identifier))
    }

    /// Bare statement directly under the unit, or anywhere whose nearest scope is
    /// the top-level script scope.
    fn is_root_position(&self, parent: NodeId) -> bool {
        let root = self.ast.root();
        if parent == root {
            return true;
        }
        if matches!(self.kind_of(parent), Some(NodeKind::ExpressionStatement)) && self.ast.parent(parent) == Some(root) {
            return true;
        }
        let owner = self.ast.scope_owner(parent);
        self.is_kind(owner, |k| matches!(k, NodeKind::ScriptScope))
    }

    /// Registers a nested instance with an explicit id on the nearest declaration
    /// (through its body) or root instance, and declares the id there.
    fn expose_id_component(&mut self, parent: NodeId, inst: NodeId, id: NodeId) {
        let mut cursor = Some(parent);
        while let Some(p) = cursor {
            let owner = match self.kind_of(p) {
                Some(NodeKind::ComponentBody) => self
                    .ast
                    .parent(p)
                    .filter(|&o| matches!(self.kind_of(o), Some(NodeKind::ComponentDeclaration(_)))),
                Some(NodeKind::ComponentInstance(i)) if i.is_root => Some(p),
                _ => None,
            };
            if let Some(owner) = owner {
                if let Some(members) = self.ast.kind_mut(owner).and_then(NodeKind::members_mut) {
                    members.id_components.push(inst);
                }
                self.with_instance(inst, |i| i.owner = Some(owner));
                self.ast.add_declaration(owner, id);
                return;
            }
            cursor = self.ast.parent(p);
        }
    }

    fn push_default_slot(&mut self, parent: NodeId, child: NodeId) {
        let Some(owner) = self.body_owner(parent) else {
            return;
        };
        if let Some(members) = self.ast.kind_mut(owner).and_then(NodeKind::members_mut) {
            members.default_slot.push(child);
        }
    }

    /// Bare identifiers passed as call arguments are references.
    pub(super) fn register_identifier_arguments(&mut self, args: NodeId) {
        let idents: Vec<NodeId> = self
            .ast
            .children(args)
            .iter()
            .copied()
            .filter(|&c| matches!(self.kind_of(c), Some(NodeKind::Identifier)))
            .collect();
        for ident in idents {
            self.ast.add_used_identifier(args, ident);
        }
    }

    fn with_decl<R>(&mut self, decl: NodeId, f: impl FnOnce(&mut ComponentDecl) -> R) -> Option<R> {
        match self.ast.kind_mut(decl) {
            Some(NodeKind::ComponentDeclaration(d)) => Some(f(d)),
            _ => None,
        }
    }

    fn with_instance<R>(&mut self, inst: NodeId, f: impl FnOnce(&mut InstanceData) -> R) -> Option<R> {
        match self.ast.kind_mut(inst) {
            Some(NodeKind::ComponentInstance(i)) => Some(f(i)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{build, find, ident, member, prop_ident};
    use crate::cst::owned::{CstSketch, leaf, node, token};
    use crate::model::arena::Ast;
    use crate::model::ast::{NodeId, NodeKind};

    fn instance(name: &str, id: Option<&str>, body: Vec<CstSketch>) -> CstSketch {
        let mut children = vec![ident(name)];
        if let Some(id) = id {
            children.push(node("component_identifier", vec![token("#"), ident(id)]));
        }
        let mut body_children = vec![token("{")];
        body_children.extend(body);
        body_children.push(token("}"));
        children.push(node("component_body", body_children));
        node("new_component_expression", children)
    }

    fn property(ty: &str, name: &str, value: CstSketch) -> CstSketch {
        node(
            "property_declaration",
            vec![ident(ty), prop_ident(name), token(":"), node("expression_statement", vec![value])],
        )
    }

    fn decl_payload(ast: &Ast) -> (NodeId, crate::model::ast::ComponentDecl) {
        let decl = find(ast, |k| matches!(k, NodeKind::ComponentDeclaration(_)))[0];
        match ast.kind(decl) {
            Some(NodeKind::ComponentDeclaration(d)) => (decl, (**d).clone()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn declaration_registers_name_heritage_and_id() {
        let src = "component Button < ui.Rect #btn { }";
        let ast = build(
            src,
            node(
                "program",
                vec![node(
                    "component_declaration",
                    vec![
                        token("component"),
                        ident("Button"),
                        node("component_heritage", vec![token("<"), ident("ui"), token("."), ident("Rect")]),
                        node("component_identifier", vec![token("#"), ident("btn")]),
                        node("component_body", vec![token("{"), token("}")]),
                    ],
                )],
            ),
        );
        let (decl, data) = decl_payload(&ast);
        assert_eq!(ast.exports, vec![decl]);
        assert_eq!(ast.slice_opt(data.name, src), "Button");
        assert_eq!(ast.dotted(&data.heritage, src), "ui.Rect");
        assert_eq!(ast.slice_opt(data.id, src), "btn");

        let program_scope = ast.scope(ast.root()).expect("scope");
        assert_eq!(program_scope.declarations, vec![data.name.expect("name")]);
        let decl_scope = ast.scope(decl).expect("scope");
        assert_eq!(decl_scope.used_identifiers, vec![data.heritage[0]]);
        assert_eq!(decl_scope.declarations, vec![data.id.expect("id")]);
    }

    #[test]
    fn id_components_propagate_to_the_declaration() {
        // component A { Item#first { int w: 1 } Item { Item#second {} } Item {} }
        let src = "component A { Item#first { int w: 1 } Item { Item#second { } } Item { } }";
        let ast = build(
            src,
            node(
                "program",
                vec![node(
                    "component_declaration",
                    vec![
                        token("component"),
                        ident("A"),
                        node(
                            "component_body",
                            vec![
                                token("{"),
                                instance("Item", Some("first"), vec![property("int", "w", leaf("number", "1"))]),
                                instance("Item", None, vec![instance("Item", Some("second"), vec![])]),
                                instance("Item", None, vec![]),
                                token("}"),
                            ],
                        ),
                    ],
                )],
            ),
        );
        let (decl, data) = decl_payload(&ast);
        let instances = find(&ast, |k| matches!(k, NodeKind::ComponentInstance(_)));
        assert_eq!(instances.len(), 4);
        let (first, plain, second, last) = (instances[0], instances[1], instances[2], instances[3]);

        assert_eq!(data.members.id_components, vec![first, second]);
        assert_eq!(data.members.default_slot, vec![plain, last]);

        let declared: Vec<&str> = ast
            .scope(decl)
            .expect("scope")
            .declarations
            .iter()
            .map(|&d| ast.slice(d, src))
            .collect();
        assert_eq!(declared, vec!["first", "second"]);

        match ast.kind(second) {
            Some(NodeKind::ComponentInstance(i)) => {
                assert!(!i.is_root);
                assert_eq!(i.owner, Some(decl));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn root_instances_are_exported_with_bound_name() {
        let src = "instance main Window { }\nItem { }";
        let ast = build(
            src,
            node(
                "program",
                vec![
                    node(
                        "expression_statement",
                        vec![node(
                            "new_component_expression",
                            vec![
                                node("component_instance", vec![token("instance"), ident("main")]),
                                ident("Window"),
                                node("component_body", vec![token("{"), token("}")]),
                            ],
                        )],
                    ),
                    node("expression_statement", vec![instance("Item", None, vec![])]),
                ],
            ),
        );
        assert_eq!(ast.exports.len(), 2);
        match ast.kind(ast.exports[0]) {
            Some(NodeKind::ComponentInstance(i)) => {
                assert!(i.is_root);
                assert_eq!(ast.slice_opt(i.instance_name, src), "main");
                assert_eq!(ast.dotted(&i.name, src), "Window");
            }
            _ => unreachable!(),
        }
        let used: Vec<&str> = ast
            .scope(ast.exports[1])
            .expect("scope")
            .used_identifiers
            .iter()
            .map(|&u| ast.slice(u, src))
            .collect();
        assert_eq!(used, vec!["Item"]);
    }

    #[test]
    fn id_shorthand_sets_the_owner_id() {
        let src = "Item { id: root\n w: root.h }";
        let ast = build(
            src,
            node(
                "program",
                vec![node(
                    "expression_statement",
                    vec![instance(
                        "Item",
                        None,
                        vec![
                            node("identifier_property_assignment", vec![leaf("id", "id"), token(":"), ident("root")]),
                            node(
                                "property_assignment",
                                vec![
                                    node("property_assignment_lhs", vec![prop_ident("w")]),
                                    token(":"),
                                    node("expression_statement", vec![member(&["root", "h"])]),
                                ],
                            ),
                        ],
                    )],
                )],
            ),
        );
        let inst = ast.exports[0];
        match ast.kind(inst) {
            Some(NodeKind::ComponentInstance(i)) => assert_eq!(ast.slice_opt(i.id, src), "root"),
            _ => unreachable!(),
        }
        let scope = ast.scope(inst).expect("scope");
        assert_eq!(scope.declarations.len(), 1);
        assert_eq!(ast.slice(scope.declarations[0], src), "root");
    }

    #[test]
    fn tagged_components_join_the_default_slot() {
        let src = "Item { Text`hello` }";
        let ast = build(
            src,
            node(
                "program",
                vec![node(
                    "expression_statement",
                    vec![instance(
                        "Item",
                        None,
                        vec![node(
                            "new_tagged_component_expression",
                            vec![ident("Text"), leaf("tagged_type_string", "`hello`")],
                        )],
                    )],
                )],
            ),
        );
        let tagged = find(&ast, |k| matches!(k, NodeKind::TaggedComponent(_)));
        match ast.kind(ast.exports[0]) {
            Some(NodeKind::ComponentInstance(i)) => assert_eq!(i.members.default_slot, tagged),
            _ => unreachable!(),
        }
    }
}
