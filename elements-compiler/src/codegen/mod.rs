//! Code generator.
//!
//! Produces a list of [`Edit`]s over the unit's source. Component
//! declarations, component instances, tagged components, imports and variable
//! declarations holding components are replaced; every other byte is kept.
//! Nested conversions are rendered by splicing the children's edits into the
//! parent's source span, so an emitted fragment never overlaps another edit.
//!
//! - `component`: class emission and the member initializer shared with instances
//! - `instance`: self-invoking instance functions
//! - `imports`: synthesized import header and module-load calls
//! - `tagged`: tagged components and text escaping

mod component;
pub mod edit;
mod imports;
mod instance;
mod tagged;
mod writer;

pub use edit::{Edit, apply_edits, check_edits, sort_edits};
pub use tagged::escape_tagged_text;

use crate::config::model::CodegenConfig;
use crate::model::arena::Ast;
use crate::model::ast::{NodeId, NodeKind};
use crate::scope::import_types::ImportTypeTable;
use std::ops::Range;
use tracing::{debug, instrument};
use writer::Compose;

pub struct Generator<'a> {
    ast: &'a Ast,
    source: &'a str,
    unit_name: &'a str,
    config: &'a CodegenConfig,
    import_types: Option<&'a ImportTypeTable>,
    /// Module path per entry of `ast.imports`, by position.
    import_paths: &'a [Option<String>],
}

impl<'a> Generator<'a> {
    pub fn new(ast: &'a Ast, source: &'a str, unit_name: &'a str, config: &'a CodegenConfig) -> Self {
        Self {
            ast,
            source,
            unit_name,
            config,
            import_types: None,
            import_paths: &[],
        }
    }

    pub fn with_import_types(mut self, table: &'a ImportTypeTable) -> Self {
        self.import_types = Some(table);
        self
    }

    pub fn with_import_paths(mut self, paths: &'a [Option<String>]) -> Self {
        self.import_paths = paths;
        self
    }

    /// All edits of the unit, in source order.
    #[instrument(level = "debug", skip_all, fields(unit = self.unit_name))]
    pub fn generate(&self) -> Vec<Edit> {
        let mut edits = Vec::new();
        if let Some(header) = self.imports_header() {
            edits.push(Edit::insert(0, header));
        }
        for (index, &import) in self.ast.imports.iter().enumerate() {
            if let Some(edit) = self.import_statement(index, import) {
                edits.push(edit);
            }
        }
        self.convert(self.ast.root(), 0, &mut edits);
        sort_edits(&mut edits);
        debug!(edits = edits.len(), "code generated");
        edits
    }

    /// Collects the edits of `id`'s subtree. Converted nodes are replaced as a
    /// whole; anything else is searched for convertible descendants.
    fn convert(&self, id: NodeId, depth: usize, out: &mut Vec<Edit>) {
        let span = self.ast.span(id);
        match self.ast.kind(id) {
            Some(NodeKind::ComponentDeclaration(decl)) => {
                out.push(Edit::replace(span, self.declaration(id, decl, depth)));
            }
            Some(NodeKind::ComponentInstance(inst)) => {
                out.push(Edit::replace(span, self.instance(id, inst, depth)));
            }
            Some(NodeKind::TaggedComponent(tagged)) => {
                out.push(Edit::replace(span, self.tagged(tagged, depth)));
            }
            Some(NodeKind::VariableDeclaration(_)) if self.holds_component(id) => {
                out.push(Edit::replace(span, self.variable_declaration(id)));
            }
            Some(NodeKind::Import(_)) => {}
            _ => {
                for &child in self.ast.children(id) {
                    self.convert(child, depth, out);
                }
            }
        }
    }

    /// Source of `id` with its descendants converted (the node itself is kept).
    fn render_children(&self, id: NodeId) -> String {
        self.render_range(self.ast.span(id).range(), self.ast.children(id), 0)
    }

    /// `id` converted as a whole.
    fn render_node(&self, id: NodeId, depth: usize) -> String {
        self.render_range(self.ast.span(id).range(), &[id], depth)
    }

    /// Source of `range` with the conversions of `roots` that fall inside it.
    fn render_range(&self, range: Range<usize>, roots: &[NodeId], depth: usize) -> String {
        let mut edits = Vec::new();
        for &root in roots {
            self.convert(root, depth, &mut edits);
        }
        edit::splice(self.source, range, &edits)
    }

    fn holds_component(&self, id: NodeId) -> bool {
        self.ast.descendants(id).into_iter().any(|d| {
            matches!(
                self.ast.kind(d),
                Some(NodeKind::ComponentInstance(_) | NodeKind::TaggedComponent(_))
            )
        })
    }

    /// `var a = ..., b` re-emitted one declarator per line.
    fn variable_declaration(&self, id: NodeId) -> String {
        let keyword = match self.ast.kind(id) {
            Some(NodeKind::VariableDeclaration(k)) => k.as_str(),
            _ => "var",
        };
        let mut out = String::new();
        for &declarator in self.ast.children(id) {
            if matches!(self.ast.kind(declarator), Some(NodeKind::VariableDeclarator)) {
                out.push('\n');
                out.push_str(keyword);
                out.push(' ');
                out.push_str(&self.render_children(declarator));
            }
        }
        let terminated = self.text(id).trim_end().ends_with(';');
        out.push_str(if terminated { "; " } else { "\n" });
        out
    }

    fn text(&self, id: NodeId) -> &'a str {
        self.ast.slice(id, self.source)
    }

    fn text_opt(&self, id: Option<NodeId>) -> &'a str {
        self.ast.slice_opt(id, self.source)
    }

    fn dotted(&self, ids: &[NodeId]) -> String {
        self.ast.dotted(ids, self.source)
    }

    /// A declaration or instance named `default` takes the unit's name.
    fn public_name(&self, name: &'a str) -> &'a str {
        if name == "default" { self.unit_name } else { name }
    }

    fn writer(&self) -> Compose {
        Compose::new(self.config.indent_width)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::builder::tests::{build, ident, prop_ident};
    use crate::config::model::ScopeConfig;
    use crate::scope::import_types::collect_import_types;
    use crate::cst::owned::{CstSketch, leaf, node, token};

    pub(crate) fn generate(ast: &Ast, src: &str) -> (Vec<Edit>, String) {
        let cfg = CodegenConfig::default();
        let edits = Generator::new(ast, src, "Unit", &cfg).generate();
        let out = apply_edits(src, &edits).expect("apply");
        (edits, out)
    }

    pub(crate) fn body(children: Vec<CstSketch>) -> CstSketch {
        let mut all = vec![token("{")];
        all.extend(children);
        all.push(token("}"));
        node("component_body", all)
    }

    pub(crate) fn property(ty: &str, name: &str, value: CstSketch) -> CstSketch {
        node("property_declaration", vec![ident(ty), prop_ident(name), token(":"), value])
    }

    pub(crate) fn expr(inner: CstSketch) -> CstSketch {
        node("expression_statement", vec![inner])
    }

    /// Edits are disjoint and in source order, and every gap between them
    /// appears verbatim in `out`.
    fn assert_gaps_verbatim(src: &str, edits: &[Edit], out: &str) {
        assert!(check_edits(edits).is_ok());
        let mut cursor = 0;
        let mut out_pos = 0;
        for e in edits {
            let gap = &src[cursor..e.range.start];
            assert_eq!(&out[out_pos..out_pos + gap.len()], gap);
            assert_eq!(&out[out_pos + gap.len()..out_pos + gap.len() + e.text.len()], e.text);
            out_pos += gap.len() + e.text.len();
            cursor = e.range.end;
        }
        assert_eq!(&out[out_pos..], &src[cursor..]);
    }

    fn import(path: &[&str], alias: Option<&str>) -> CstSketch {
        let mut segments = Vec::new();
        for (i, p) in path.iter().enumerate() {
            if i > 0 {
                segments.push(token("."));
            }
            segments.push(ident(p));
        }
        let mut parts = vec![token("import"), node("import_path", segments)];
        if let Some(alias) = alias {
            parts.push(node("import_as", vec![token("as"), ident(alias)]));
        }
        node("import_statement", parts)
    }

    #[test]
    fn mixed_unit_edits_stay_disjoint_and_keep_gaps() {
        let src = "import lib.ui as U\nimport lib.util\n// between\ncomponent A { Label #title { } Text`hi  there` }\nItem { }\n// end\n";
        let ast = build(
            src,
            node(
                "program",
                vec![
                    import(&["lib", "ui"], Some("U")),
                    import(&["lib", "util"], None),
                    leaf("comment", "// between"),
                    node(
                        "component_declaration",
                        vec![
                            token("component"),
                            ident("A"),
                            body(vec![
                                node(
                                    "new_component_expression",
                                    vec![
                                        ident("Label"),
                                        node("component_identifier", vec![token("#"), ident("title")]),
                                        body(vec![]),
                                    ],
                                ),
                                node(
                                    "new_tagged_component_expression",
                                    vec![ident("Text"), leaf("tagged_type_string", "`hi  there`")],
                                ),
                            ]),
                        ],
                    ),
                    node(
                        "expression_statement",
                        vec![node("new_component_expression", vec![ident("Item"), body(vec![])])],
                    ),
                    leaf("comment", "// end"),
                ],
            ),
        );
        let cfg = CodegenConfig::default();
        let table = collect_import_types(&ast, src, &ScopeConfig::default());
        let paths = vec![Some("lib.ui".to_string()), Some("lib.util".to_string())];
        let edits = Generator::new(&ast, src, "Unit", &cfg)
            .with_import_types(&table)
            .with_import_paths(&paths)
            .generate();
        let out = apply_edits(src, &edits).expect("apply");

        // Header insertion at 0, then two imports, the declaration and the root instance.
        assert_eq!(edits.len(), 5);
        assert!(edits[0].is_insertion() && edits[0].range.start == 0);
        assert_eq!(edits[1].range.start, 0);
        assert_gaps_verbatim(src, &edits, &out);

        assert!(out.starts_with("import {"));
        assert!(out.contains("import {Label} from '__UNRESOLVED__'\n"));

        assert!(out.contains("var U = imports.requireAs('lib.ui')\n"));
        assert!(out.contains("imports.require('lib.util')\n"));
        assert!(out.contains("// between\n"));
        assert!(out.contains("var title = new Label()"));
        assert!(out.contains("}.bind(new Text(\"hi there\"))(this))"));
        assert!(out.contains("}.bind(new Item())(null))"));
        assert!(out.ends_with("\n// end\n"));
    }

    #[test]
    fn untouched_bytes_survive_between_edits() {
        let src = "let keep = 1\ncomponent A { }\n// tail\n";
        let ast = build(
            src,
            node(
                "program",
                vec![
                    node(
                        "lexical_declaration",
                        vec![
                            token("let"),
                            node("variable_declarator", vec![ident("keep"), token("="), leaf("number", "1")]),
                        ],
                    ),
                    node(
                        "component_declaration",
                        vec![token("component"), ident("A"), body(vec![])],
                    ),
                    leaf("comment", "// tail"),
                ],
            ),
        );
        let (edits, out) = generate(&ast, src);
        assert_eq!(edits.len(), 1);
        assert_gaps_verbatim(src, &edits, &out);
        assert!(out.starts_with("let keep = 1\n"));
        assert!(out.ends_with("}\n// tail\n"));
    }

    #[test]
    fn variable_declarations_holding_components_are_rewritten() {
        let src = "function f() { var a = 1, b = Item{}; return b }";
        let ast = build(
            src,
            node(
                "program",
                vec![node(
                    "function_declaration",
                    vec![
                        token("function"),
                        ident("f"),
                        node("formal_parameters", vec![token("("), token(")")]),
                        node(
                            "statement_block",
                            vec![
                                token("{"),
                                node(
                                    "variable_declaration",
                                    vec![
                                        token("var"),
                                        node("variable_declarator", vec![ident("a"), token("="), leaf("number", "1")]),
                                        token(","),
                                        node(
                                            "variable_declarator",
                                            vec![
                                                ident("b"),
                                                token("="),
                                                node("new_component_expression", vec![ident("Item"), body(vec![])]),
                                            ],
                                        ),
                                        token(";"),
                                    ],
                                ),
                                node("return_statement", vec![token("return"), ident("b")]),
                                token("}"),
                            ],
                        ),
                    ],
                )],
            ),
        );
        let (edits, out) = generate(&ast, src);
        assert_eq!(edits.len(), 1);
        assert!(out.starts_with("function f() { \nvar a = 1\nvar b = (function(parent){"));
        assert!(out.ends_with("}.bind(new Item())(null));  return b }"));
    }
}
