//! Component declarations and the member initializer shared with instances.

use super::Generator;
use super::writer::Compose;
use crate::model::ast::{ComponentDecl, ComponentMembers, NodeId, NodeKind, Parameter, PropertyValue};
use crate::scope::is_local_binding;

/// Where an initializer runs, which decides how ids and properties are registered.
#[derive(Debug, Clone, Copy)]
pub(super) enum InitTarget {
    /// `__initialize()` of a declared class.
    Declaration { id: Option<NodeId> },
    /// Body of an instance function.
    Instance { id: Option<NodeId>, is_root: bool },
}

impl Generator<'_> {
    /// `class Name extends Base{ constructor, __initialize, methods }`.
    pub(super) fn declaration(&self, id: NodeId, decl: &ComponentDecl, depth: usize) -> String {
        let mut w = self.writer();
        w.indent(depth);
        if self.ast.parent(id) == Some(self.ast.root()) {
            w.push("\nexport ");
        }
        let name = self.public_name(self.text_opt(decl.name));
        let base = if decl.heritage.is_empty() {
            self.config.default_base.clone()
        } else {
            self.dotted(&decl.heritage)
        };
        w.push(&format!("class {name} extends {base}{{\n\n"));

        self.constructor(&mut w, decl.constructor, depth + 1);

        w.line(depth + 1, "__initialize(){");
        self.initializer(&mut w, &decl.members, decl.body, InitTarget::Declaration { id: decl.id }, depth + 2);
        w.line(depth + 1, "}").newline();

        for &func in &decl.members.functions {
            match self.ast.kind(func) {
                Some(NodeKind::MethodDefinition(_)) => {
                    w.indent(depth + 1).push(&self.render_children(func)).newline();
                }
                Some(NodeKind::TypedFunctionDeclaration(f)) => {
                    let body = f.body.map(|b| self.render_children(b)).unwrap_or_else(|| "{}".into());
                    w.indent(depth + 1)
                        .push(&format!("{}({}){}", self.text_opt(f.name), self.param_names(&f.params), body))
                        .newline()
                        .newline();
                }
                _ => {}
            }
        }
        w.indent(depth).push("}");
        w.finish()
    }

    /// User parameters are kept. Without a user `super(...)` one is emitted;
    /// with one, initialization runs right after it.
    fn constructor(&self, w: &mut Compose, ctor: Option<NodeId>, depth: usize) {
        let func = ctor.and_then(|c| self.ast.kind(c)).and_then(NodeKind::function);
        let Some(func) = func else {
            w.line(depth, "constructor(){")
                .line(depth + 1, "super()")
                .line(depth + 1, "this.__initialize()")
                .line(depth, "}")
                .newline();
            return;
        };

        let params = func.params_node.map(|p| self.text(p)).unwrap_or("()");
        w.indent(depth).push(&format!("constructor{params}{{\n"));
        let body = func.body.map(|b| (b, self.ast.span(b)));
        match (func.super_call, body) {
            (Some(call), Some((body, span))) => {
                let call_span = self.ast.span(call);
                let rest = self.render_range(call_span.end_byte..span.end_byte.saturating_sub(1), self.ast.children(body), 0);
                w.indent(depth + 1).push(self.text(call)).newline();
                w.line(depth + 1, "this.__initialize()");
                w.push(&rest);
            }
            (_, Some((body, span))) => {
                let inner =
                    self.render_range(span.start_byte + 1..span.end_byte.saturating_sub(1), self.ast.children(body), 0);
                w.line(depth + 1, "super()");
                w.line(depth + 1, "this.__initialize()");
                w.push(&inner);
            }
            (_, None) => {
                w.line(depth + 1, "super()");
                w.line(depth + 1, "this.__initialize()");
            }
        }
        w.newline().line(depth, "}").newline();
    }

    /// Ids, property registration, events, listeners, property values,
    /// assignments, id-component bodies and the default slot, in that order.
    pub(super) fn initializer(
        &self,
        w: &mut Compose,
        members: &ComponentMembers,
        body: Option<NodeId>,
        target: InitTarget,
        depth: usize,
    ) {
        let rt = self.config.runtime_object.as_str();

        match target {
            InitTarget::Declaration { id } => {
                if id.is_some() || !members.id_components.is_empty() {
                    w.line(depth, "this.ids = {}").newline();
                }
                if let Some(id) = id {
                    let id = self.text(id);
                    w.line(depth, &format!("var {id} = this"));
                    w.line(depth, &format!("this.ids[\"{id}\"] = {id}")).newline();
                }
                for &child in &members.id_components {
                    if let Some((id, ctor)) = self.id_component_constructor(child) {
                        w.line(depth, &format!("var {id} = {ctor}"));
                        w.line(depth, &format!("this.ids[\"{id}\"] = {id}")).newline();
                    }
                }
                self.id_component_properties(w, members, depth);
                self.register_properties(w, members, "this", depth);
            }
            InitTarget::Instance { id, is_root } => {
                if let Some(id) = id {
                    let id = self.text(id);
                    if is_root {
                        w.line(depth, &format!("var {id} = this"));
                    }
                    w.line(depth, &format!("{rt}.assignId({id}, \"{id}\")"));
                }
                if is_root {
                    for &child in &members.id_components {
                        if let Some((id, ctor)) = self.id_component_constructor(child) {
                            w.line(depth, &format!("var {id} = {ctor}"));
                        }
                    }
                }
                if is_root || id.is_none() {
                    self.register_properties(w, members, "this", depth);
                }
                if is_root {
                    self.id_component_properties(w, members, depth);
                }
            }
        }

        for &event in &members.events {
            let Some(f) = self.ast.kind(event).and_then(NodeKind::function) else {
                continue;
            };
            let params: Vec<String> = f
                .params
                .iter()
                .map(|p| format!("['{}','{}']", self.text_opt(p.type_name), self.text(p.name)))
                .collect();
            w.line(
                depth,
                &format!("{rt}.addEvent(this, '{}', [{}])", self.text_opt(f.name), params.join(",")),
            );
        }

        for &listener in &members.listeners {
            let Some(f) = self.ast.kind(listener).and_then(NodeKind::function) else {
                continue;
            };
            let body = f.body.map(|b| self.render_children(b)).unwrap_or_else(|| "{}".into());
            w.line(
                depth,
                &format!(
                    "this.on('{}', function({}){}.bind(this));",
                    self.text_opt(f.name),
                    self.param_names(&f.params),
                    body
                ),
            );
        }

        for &prop in &members.properties {
            self.property_value(w, prop, depth);
        }
        for &assign in &members.assignments {
            self.assignment(w, assign, depth);
        }

        // Id components instantiated above still need their own bodies run.
        if let Some(body) = body {
            for &child in self.ast.children(body) {
                let has_id = matches!(self.ast.kind(child), Some(NodeKind::ComponentInstance(i)) if i.id.is_some() && !i.is_root);
                if has_id {
                    w.indent(depth).push(&self.render_node(child, depth)).newline();
                }
            }
        }

        if !members.default_slot.is_empty() {
            let items: Vec<String> = members
                .default_slot
                .iter()
                .map(|&c| self.render_node(c, depth + 1))
                .collect();
            w.line(depth, &format!("{rt}.assignDefaultProperty(this, ["));
            w.push(&items.join(",\n")).newline();
            w.line(depth, "]");
            w.line(depth, ")");
        }
    }

    /// `(id, "new Type(args)")` of an id component.
    fn id_component_constructor(&self, inst: NodeId) -> Option<(&str, String)> {
        let Some(NodeKind::ComponentInstance(data)) = self.ast.kind(inst) else {
            return None;
        };
        let id = self.text(data.id?);
        let args = data.arguments.map(|a| self.text(a)).unwrap_or("()");
        Some((id, format!("new {}{}", self.dotted(&data.name), args)))
    }

    fn id_component_properties(&self, w: &mut Compose, members: &ComponentMembers, depth: usize) {
        for &child in &members.id_components {
            let Some(NodeKind::ComponentInstance(data)) = self.ast.kind(child) else {
                continue;
            };
            let Some(id) = data.id else { continue };
            self.register_properties(w, &data.members, self.text(id), depth);
        }
    }

    fn register_properties(&self, w: &mut Compose, members: &ComponentMembers, target: &str, depth: usize) {
        let rt = self.config.runtime_object.as_str();
        for &prop in &members.properties {
            let Some(NodeKind::PropertyDeclaration(p)) = self.ast.kind(prop) else {
                continue;
            };
            let name = self.text_opt(p.name);
            w.line(
                depth,
                &format!(
                    "{rt}.addProperty({target}, '{name}', {{ type: \"{}\", notify: \"{name}Changed\" }})",
                    self.text_opt(p.type_name)
                ),
            );
        }
    }

    fn property_value(&self, w: &mut Compose, prop: NodeId, depth: usize) {
        let Some(NodeKind::PropertyDeclaration(p)) = self.ast.kind(prop) else {
            return;
        };
        let Some(value) = p.value else { return };
        let name = self.text_opt(p.name);
        let watches = self.watch_list(&p.bindings, prop);
        if watches.is_empty() {
            let text = self.plain_value(value, depth);
            w.line(depth, &format!("this.{name} = {text}"));
        } else {
            self.reactive_assignment(w, "this", name, value, &watches, depth);
        }
    }

    fn assignment(&self, w: &mut Compose, assign: NodeId, depth: usize) {
        let Some(NodeKind::PropertyAssignment(a)) = self.ast.kind(assign) else {
            return;
        };
        let (Some(value), Some((&last, parents))) = (a.value, a.path.split_last()) else {
            return;
        };
        let mut object = String::from("this");
        for &segment in parents {
            object.push('.');
            object.push_str(self.text(segment));
        }
        let watches = self.watch_list(&a.bindings, assign);
        if watches.is_empty() {
            let text = self.plain_value(value, depth);
            w.line(depth, &format!("{object}.{} = {text}", self.text(last)));
        } else {
            self.reactive_assignment(w, &object, self.text(last), value, &watches, depth);
        }
    }

    /// `Element.assignPropertyExpression(object, 'name', evaluator, [[dep, 'xChanged'], ...])`.
    fn reactive_assignment(
        &self,
        w: &mut Compose,
        object: &str,
        name: &str,
        value: PropertyValue,
        watches: &[(String, String)],
        depth: usize,
    ) {
        // The evaluator runs against the object that owns the property.
        let evaluator = match value {
            PropertyValue::Expression(e) => format!("function(){{ return {}}}.bind({object})", self.render_children(e)),
            PropertyValue::Block(b) => format!("function(){}.bind({object})", self.render_children(b)),
            PropertyValue::Component(c) => format!("function(){{ return {}}}.bind({object})", self.render_node(c, depth)),
        };
        let deps: Vec<String> = watches
            .iter()
            .map(|(object, prop)| format!("[ {object}, '{prop}Changed' ]"))
            .collect();
        w.line(depth, &format!("{}.assignPropertyExpression({object},", self.config.runtime_object));
        w.line(depth + 1, &format!("'{name}',"));
        w.line(depth + 1, &format!("{evaluator},"));
        w.line(depth + 1, "[");
        w.push(&deps.join(",\n")).newline();
        w.line(depth + 1, "]");
        w.line(depth, ")");
    }

    fn plain_value(&self, value: PropertyValue, depth: usize) -> String {
        match value {
            PropertyValue::Expression(e) => self.render_children(e),
            PropertyValue::Block(b) => format!("(function(){}())", self.render_children(b)),
            PropertyValue::Component(c) => self.render_node(c, depth),
        }
    }

    /// Deduplicated `(receiver, property)` pairs of the non-local bindings, in
    /// first-seen order.
    pub(super) fn watch_list(&self, bindings: &[NodeId], owner: NodeId) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = Vec::new();
        for &member in bindings {
            if is_local_binding(self.ast, self.source, member, owner) {
                continue;
            }
            let (Some(receiver), Some(property)) = (self.ast.child(member, 0), self.ast.child(member, 1)) else {
                continue;
            };
            let pair = (self.text(receiver).to_string(), self.text(property).to_string());
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
        pairs
    }

    pub(super) fn param_names(&self, params: &[Parameter]) -> String {
        params.iter().map(|p| self.text(p.name)).collect::<Vec<_>>().join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{body, expr, generate, property};
    use crate::builder::tests::{build, ident, member, prop_ident};
    use crate::cst::owned::{CstSketch, leaf, node, token};

    fn declaration(name: &str, id: Option<&str>, children: Vec<CstSketch>) -> CstSketch {
        let mut parts = vec![token("component"), ident(name)];
        if let Some(id) = id {
            parts.push(node("component_identifier", vec![token("#"), ident(id)]));
        }
        parts.push(body(children));
        node("program", vec![node("component_declaration", parts)])
    }

    #[test]
    fn self_rooted_bindings_become_reactive() {
        let src = "component A { int x: this.y + this.y * count }";
        let ast = build(
            src,
            declaration(
                "A",
                None,
                vec![property(
                    "int",
                    "x",
                    expr(node(
                        "binary_expression",
                        vec![
                            member(&["this", "y"]),
                            token("+"),
                            node("binary_expression", vec![member(&["this", "y"]), token("*"), ident("count")]),
                        ],
                    )),
                )],
            ),
        );
        let (_, out) = generate(&ast, src);
        assert!(out.starts_with("\nexport class A extends Element{\n\n"));
        assert!(out.contains("Element.addProperty(this, 'x', { type: \"int\", notify: \"xChanged\" })"));
        assert!(out.contains("Element.assignPropertyExpression(this,"));
        assert!(out.contains("function(){ return this.y + this.y * count}.bind(this),"));
        assert_eq!(out.matches("[ this, 'yChanged' ]").count(), 1);
        assert!(!out.contains("countChanged"));
        assert!(!out.contains("this.ids"));
    }

    #[test]
    fn path_assignment_evaluator_runs_on_the_target_object() {
        let src = "component A { anchors.left: this.w }";
        let ast = build(
            src,
            declaration(
                "A",
                None,
                vec![node(
                    "property_assignment",
                    vec![
                        node("property_assignment_lhs", vec![prop_ident("anchors"), token("."), prop_ident("left")]),
                        token(":"),
                        expr(member(&["this", "w"])),
                    ],
                )],
            ),
        );
        let (_, out) = generate(&ast, src);
        assert!(out.contains("Element.assignPropertyExpression(this.anchors,"));
        assert!(out.contains("'left',"));
        assert!(out.contains("function(){ return this.w}.bind(this.anchors),"));
        assert!(!out.contains("}.bind(this),"));
        assert!(out.contains("[ this, 'wChanged' ]"));
    }

    #[test]
    fn local_only_bindings_degrade_to_plain_assignment() {
        let src = "component A { int x: { var p = 2\n return p.v } }";
        let ast = build(
            src,
            declaration(
                "A",
                None,
                vec![property(
                    "int",
                    "x",
                    node(
                        "statement_block",
                        vec![
                            token("{"),
                            node(
                                "variable_declaration",
                                vec![
                                    token("var"),
                                    node("variable_declarator", vec![ident("p"), token("="), leaf("number", "2")]),
                                ],
                            ),
                            node("return_statement", vec![token("return"), member(&["p", "v"])]),
                            token("}"),
                        ],
                    ),
                )],
            ),
        );
        let (_, out) = generate(&ast, src);
        assert!(!out.contains("assignPropertyExpression"));
        assert!(out.contains("this.x = (function(){ var p = 2\n return p.v }())"));
    }

    #[test]
    fn id_components_are_instantiated_and_exposed() {
        let src = "component A #root { Label #title { string text: 'hi' } Item{} }";
        let ast = build(
            src,
            declaration(
                "A",
                Some("root"),
                vec![
                    node(
                        "new_component_expression",
                        vec![
                            ident("Label"),
                            node("component_identifier", vec![token("#"), ident("title")]),
                            body(vec![property("string", "text", expr(leaf("string", "'hi'")))]),
                        ],
                    ),
                    node("new_component_expression", vec![ident("Item"), body(vec![])]),
                ],
            ),
        );
        let (_, out) = generate(&ast, src);
        let expected_order = [
            "this.ids = {}",
            "var root = this",
            "this.ids[\"root\"] = root",
            "var title = new Label()",
            "this.ids[\"title\"] = title",
            "Element.addProperty(title, 'text', { type: \"string\", notify: \"textChanged\" })",
            "(function(parent){",
            "Element.assignId(title, \"title\")",
            "this.text = 'hi'",
            "}.bind(title)(this))",
            "Element.assignDefaultProperty(this, [",
            "}.bind(new Item())(this))",
        ];
        let mut from = 0;
        for piece in expected_order {
            let at = out[from..].find(piece).map(|i| i + from);
            assert!(at.is_some(), "missing `{piece}` after byte {from} in:\n{out}");
            from = at.unwrap_or(from) + piece.len();
        }
        // The id component is not re-registered on the declaration itself.
        assert!(!out.contains("Element.addProperty(this, 'text'"));
    }

    #[test]
    fn constructor_keeps_user_super_call() {
        let src = "component B { constructor(a){ super(a)\n this.k = a } }";
        let ast = build(
            src,
            declaration(
                "B",
                None,
                vec![node(
                    "constructor_definition",
                    vec![
                        token("constructor"),
                        node("formal_parameters", vec![token("("), ident("a"), token(")")]),
                        node(
                            "statement_block",
                            vec![
                                token("{"),
                                node(
                                    "expression_statement",
                                    vec![node(
                                        "call_expression",
                                        vec![leaf("super", "super"), node("arguments", vec![token("("), ident("a"), token(")")])],
                                    )],
                                ),
                                node(
                                    "expression_statement",
                                    vec![node(
                                        "assignment_expression",
                                        vec![member(&["this", "k"]), token("="), ident("a")],
                                    )],
                                ),
                                token("}"),
                            ],
                        ),
                    ],
                )],
            ),
        );
        let (_, out) = generate(&ast, src);
        assert!(out.contains("constructor(a){\n        super(a)\n        this.__initialize()\n\n this.k = a \n    }"));
        assert!(!out.contains("super()"));
    }
}
