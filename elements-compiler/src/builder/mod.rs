//! CST → AST builder.
//!
//! One pass over the CST. Every CST kind dispatches to a construction rule that
//! inspects only the immediate children of its node; kinds without a rule are
//! passed through, their children visited in place. Scope bookkeeping
//! (declarations, used identifiers, bindings, id components, default slots) is
//! recorded while the tree grows, since every ancestor already exists when a
//! node is created.
//!
//! Rules are split by concern:
//! - `components`: component declarations, instances, tagged components
//! - `properties`: property declarations/assignments and binding detection
//! - `functions`: events, listeners, methods, functions, constructors, calls
//! - `statements`: imports, variable declarations and plain JS wrappers

mod components;
mod functions;
mod properties;
mod statements;

use crate::cst::CstNode;
use crate::errors::SyntaxError;
use crate::model::arena::Ast;
use crate::model::ast::{NodeId, NodeKind};
use tracing::{debug, instrument};

pub(crate) type BuildResult<T = ()> = std::result::Result<T, SyntaxError>;

/// Build the AST of one unit.
///
/// Any error-marker node in the CST aborts the build; no partial tree is returned.
#[instrument(level = "debug", skip_all, fields(unit = unit_name))]
pub fn build_ast<N: CstNode>(root: N, source: &str, unit_name: &str) -> BuildResult<Ast> {
    if let Some(err) = first_error(root) {
        let point = err.start_point();
        return Err(SyntaxError {
            line: point.row,
            column: point.column,
            byte_offset: err.start_byte(),
            unit_name: unit_name.to_string(),
        });
    }

    let mut builder = Builder {
        source,
        ast: Ast::new(root.span()),
    };
    let program = builder.ast.root();
    builder.visit_children(program, root)?;

    let ast = builder.ast;
    debug!(
        nodes = ast.len(),
        exports = ast.exports.len(),
        imports = ast.imports.len(),
        diagnostics = ast.diagnostics.len(),
        "ast built"
    );
    Ok(ast)
}

/// First error node in document order.
fn first_error<N: CstNode>(root: N) -> Option<N> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() {
            return Some(node);
        }
        let children = node.children();
        stack.extend(children.into_iter().rev());
    }
    None
}

pub(crate) struct Builder<'s> {
    pub(crate) source: &'s str,
    pub(crate) ast: Ast,
}

impl<'s> Builder<'s> {
    /// Dispatch one CST node.
    pub(crate) fn visit<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        match node.kind() {
            "import_statement" => self.visit_import(parent, node),
            "identifier" | "property_identifier" | "this" => {
                self.leaf(parent, node, NodeKind::Identifier);
                Ok(())
            }
            "js_scope" => self.wrap(parent, node, NodeKind::ScriptScope).map(drop),
            "component_declaration" => self.visit_component_declaration(parent, node).map(drop),
            "component_body" => self.visit_component_body(parent, node).map(drop),
            "new_component_expression" => self.visit_component_instance(parent, node),
            "new_tagged_component_expression" => self.visit_tagged_component(parent, node),
            "tagged_type_string" => {
                self.leaf(parent, node, NodeKind::TaggedString);
                Ok(())
            }
            "property_declaration" => self.visit_property_declaration(parent, node),
            "property_assignment" => self.visit_property_assignment(parent, node),
            "identifier_property_assignment" => self.visit_id_assignment(parent, node),
            "member_expression" => self.visit_member_expression(parent, node),
            "subscript_expression" => self.wrap(parent, node, NodeKind::SubscriptExpression).map(drop),
            "event_declaration" => self.visit_event_declaration(parent, node),
            "listener_declaration" => self.visit_listener_declaration(parent, node),
            "method_definition" => self.visit_method_definition(parent, node),
            "typed_function_declaration" => self.visit_typed_function(parent, node),
            "function_declaration" | "function_expression" | "function" => {
                self.visit_function_declaration(parent, node)
            }
            "arrow_function" => self.visit_arrow_function(parent, node),
            "constructor_definition" => self.visit_constructor(parent, node),
            "call_expression" => self.visit_call_expression(parent, node),
            "arguments" => self.wrap(parent, node, NodeKind::Arguments).map(drop),
            "new_expression" => self.visit_new_expression(parent, node),
            "class_declaration" => self.visit_class_declaration(parent, node),
            "variable_declaration" | "lexical_declaration" => self.visit_variable_declaration(parent, node),
            "expression_statement" => self.wrap(parent, node, NodeKind::ExpressionStatement).map(drop),
            "return_statement" => self.wrap(parent, node, NodeKind::ReturnStatement).map(drop),
            "object" => self.wrap(parent, node, NodeKind::Object).map(drop),
            "number" => {
                self.leaf(parent, node, NodeKind::Number);
                Ok(())
            }
            _ => self.visit_children(parent, node),
        }
    }

    pub(crate) fn visit_children<N: CstNode>(&mut self, parent: NodeId, node: N) -> BuildResult {
        for child in node.children() {
            self.visit(parent, child)?;
        }
        Ok(())
    }

    /// Adds a node without visiting its CST children.
    pub(crate) fn leaf<N: CstNode>(&mut self, parent: NodeId, node: N, kind: NodeKind) -> NodeId {
        self.ast.add_node(kind, node.span(), parent)
    }

    /// Adds a node and visits its CST children under it.
    pub(crate) fn wrap<N: CstNode>(&mut self, parent: NodeId, node: N, kind: NodeKind) -> BuildResult<NodeId> {
        let id = self.leaf(parent, node, kind);
        self.visit_children(id, node)?;
        Ok(id)
    }

    pub(crate) fn kind_of(&self, id: NodeId) -> Option<&NodeKind> {
        self.ast.kind(id)
    }

    pub(crate) fn is_kind(&self, id: Option<NodeId>, pred: fn(&NodeKind) -> bool) -> bool {
        id.and_then(|i| self.kind_of(i)).is_some_and(pred)
    }

    /// Component (declaration or instance) owning a component body.
    pub(crate) fn body_owner(&self, body: NodeId) -> Option<NodeId> {
        if !self.is_kind(Some(body), |k| matches!(k, NodeKind::ComponentBody)) {
            return None;
        }
        let owner = self.ast.parent(body)?;
        self.kind_of(owner)?.members().map(|_| owner)
    }
}
