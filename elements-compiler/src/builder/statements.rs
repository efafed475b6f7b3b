//! Imports, variable declarations and the remaining JS statement rules.

use super::{BuildResult, Builder};
use crate::cst::CstNode;
use crate::model::ast::{DeclarationKeyword, ImportData, NodeId, NodeKind};

impl<'s> Builder<'s> {
    /// `import .a.b as N`
    pub(super) fn visit_import<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        let import = self.leaf(parent, node, NodeKind::Import(ImportData::default()));
        self.ast.imports.push(import);

        let mut data = ImportData::default();
        for child in node.children() {
            match child.kind() {
                "import_as" => {
                    if let Some(alias) = child.child(1).filter(|c| c.kind() == "identifier") {
                        data.alias = Some(self.leaf(import, alias, NodeKind::Identifier));
                    }
                }
                "." => data.is_relative = true,
                "import_path" => {
                    let path = self.leaf(import, child, NodeKind::ImportPath);
                    data.path = child
                        .children()
                        .into_iter()
                        .filter(|s| s.kind() == "identifier")
                        .map(|s| self.leaf(path, s, NodeKind::Identifier))
                        .collect();
                }
                _ => {}
            }
        }
        if let Some(NodeKind::Import(slot)) = self.ast.kind_mut(import) {
            *slot = data;
        }
        Ok(())
    }

    /// `var|let|const a = x, b`: identifiers before `=` are declared, identifiers
    /// after it are references.
    ///
    /// A declarator owns no scope of its own; its names land in the nearest
    /// enclosing scope so later sibling statements resolve them.
    pub(super) fn visit_variable_declaration<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        let keyword = node
            .child(0)
            .and_then(|k| DeclarationKeyword::from_token(k.kind()))
            .unwrap_or(DeclarationKeyword::Var);
        let declaration = self.leaf(parent, node, NodeKind::VariableDeclaration(keyword));

        for child in node.children() {
            if child.kind() != "variable_declarator" {
                self.visit(declaration, child)?;
                continue;
            }
            let declarator = self.leaf(declaration, child, NodeKind::VariableDeclarator);
            let mut after_equals = false;
            for part in child.children() {
                match part.kind() {
                    "identifier" => {
                        let ident = self.leaf(declarator, part, NodeKind::Identifier);
                        if after_equals {
                            self.ast.add_used_identifier(declarator, ident);
                        } else {
                            self.ast.add_declaration(declarator, ident);
                        }
                    }
                    "=" => after_equals = true,
                    _ => self.visit(declarator, part)?,
                }
            }
        }
        Ok(())
    }

    /// `new Type(args)`: the constructed type is a reference.
    pub(super) fn visit_new_expression<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        let expr = self.leaf(parent, node, NodeKind::NewExpression);
        for child in node.children() {
            if child.kind() == "identifier" {
                let ident = self.leaf(expr, child, NodeKind::Identifier);
                self.ast.add_used_identifier(expr, ident);
            } else {
                self.visit(expr, child)?;
            }
        }
        Ok(())
    }

    /// The class name is declared in the enclosing scope.
    pub(super) fn visit_class_declaration<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        let class = self.wrap(parent, node, NodeKind::ClassDeclaration)?;
        let name = self
            .ast
            .children(class)
            .iter()
            .copied()
            .find(|&c| matches!(self.kind_of(c), Some(NodeKind::Identifier)));
        if let Some(name) = name {
            self.ast.add_declaration(parent, name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{build, find, ident, member, prop_ident};
    use crate::config::model::ScopeConfig;
    use crate::cst::owned::{leaf, node, token};
    use crate::model::ast::{DeclarationKeyword, NodeKind};
    use crate::scope::{is_declared, undeclared_identifiers};

    #[test]
    fn import_captures_relative_path_and_alias() {
        let src = "import .ui.controls as C";
        let ast = build(
            src,
            node(
                "program",
                vec![node(
                    "import_statement",
                    vec![
                        token("import"),
                        token("."),
                        node("import_path", vec![ident("ui"), token("."), ident("controls")]),
                        node("import_as", vec![token("as"), ident("C")]),
                    ],
                )],
            ),
        );
        assert_eq!(ast.imports.len(), 1);
        match ast.kind(ast.imports[0]) {
            Some(NodeKind::Import(data)) => {
                assert!(data.is_relative);
                assert_eq!(ast.dotted(&data.path, src), "ui.controls");
                assert_eq!(ast.slice_opt(data.alias, src), "C");
            }
            _ => unreachable!(),
        }
        let program = ast.scope(ast.root()).expect("scope");
        assert!(program.declarations.is_empty());
    }

    #[test]
    fn declarators_split_at_equals() {
        let src = "let a = b, c = new Foo()";
        let ast = build(
            src,
            node(
                "program",
                vec![node(
                    "lexical_declaration",
                    vec![
                        token("let"),
                        node("variable_declarator", vec![ident("a"), token("="), ident("b")]),
                        token(","),
                        node(
                            "variable_declarator",
                            vec![
                                ident("c"),
                                token("="),
                                node(
                                    "new_expression",
                                    vec![token("new"), ident("Foo"), node("arguments", vec![token("("), token(")")])],
                                ),
                            ],
                        ),
                    ],
                )],
            ),
        );
        let decl = find(&ast, |k| matches!(k, NodeKind::VariableDeclaration(_)))[0];
        assert_eq!(ast.kind(decl), Some(&NodeKind::VariableDeclaration(DeclarationKeyword::Let)));

        let scope = ast.scope(ast.root()).expect("scope");
        let declared: Vec<&str> = scope.declarations.iter().map(|&d| ast.slice(d, src)).collect();
        let used: Vec<&str> = scope.used_identifiers.iter().map(|&d| ast.slice(d, src)).collect();
        assert_eq!(declared, vec!["a", "c"]);
        assert_eq!(used, vec!["b", "Foo"]);
    }

    #[test]
    fn declared_names_are_visible_to_later_siblings() {
        let src = "function f() { var p = 1\n p.x }";
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
                                        node("variable_declarator", vec![ident("p"), token("="), leaf("number", "1")]),
                                    ],
                                ),
                                node("expression_statement", vec![member(&["p", "x"])]),
                                token("}"),
                            ],
                        ),
                    ],
                )],
            ),
        );
        let declarator = find(&ast, |k| matches!(k, NodeKind::VariableDeclarator))[0];
        assert!(ast.scope(declarator).is_none());

        let block = find(&ast, |k| matches!(k, NodeKind::StatementBlock))[0];
        let scope = ast.scope(block).expect("scope");
        assert_eq!(scope.declarations.len(), 1);
        assert_eq!(scope.used_identifiers.len(), 1);
        let used = scope.used_identifiers[0];
        assert_eq!(ast.slice(used, src), "p");
        assert!(is_declared(&ast, src, "p", used, &ScopeConfig::default()));
        assert!(undeclared_identifiers(&ast, src, block, &ScopeConfig::default()).is_empty());
    }

    #[test]
    fn class_name_is_declared_outside() {
        let src = "class Helper { run() { } }";
        let ast = build(
            src,
            node(
                "program",
                vec![node(
                    "class_declaration",
                    vec![
                        token("class"),
                        ident("Helper"),
                        node(
                            "class_body",
                            vec![
                                token("{"),
                                node(
                                    "method_definition",
                                    vec![
                                        prop_ident("run"),
                                        node("formal_parameters", vec![token("("), token(")")]),
                                        node("statement_block", vec![token("{"), token("}")]),
                                    ],
                                ),
                                token("}"),
                            ],
                        ),
                    ],
                )],
            ),
        );
        let scope = ast.scope(ast.root()).expect("scope");
        assert_eq!(scope.declarations.len(), 1);
        assert_eq!(ast.slice(scope.declarations[0], src), "Helper");
        assert_eq!(find(&ast, |k| matches!(k, NodeKind::MethodDefinition(_))).len(), 1);
    }
}
