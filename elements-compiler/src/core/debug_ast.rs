//! AST debugging hook.
//!
//! [`Ast::dump`] renders one line per node, indented by depth. [`maybe_debug_ast`]
//! prints that dump for units whose name matches `ELEMENTS_DEBUG_AST`.
//!
//! # Environment
//! - `ELEMENTS_DEBUG_AST`: optional unit name suffix. Unset or empty disables the hook.

use crate::model::arena::Ast;
use crate::model::ast::{NodeId, NodeKind};
use tracing::info;

pub const DEBUG_AST_ENV: &str = "ELEMENTS_DEBUG_AST";

/// Maximum snippet size when dumping leaf text.
const MAX_SNIPPET: usize = 60;

impl Ast {
    /// `Kind (detail)[start, end]` per node, two spaces of indent per level.
    pub fn dump(&self, source: &str) -> String {
        let mut out = String::new();
        let mut stack: Vec<(NodeId, usize)> = vec![(self.root(), 0)];
        while let Some((id, depth)) = stack.pop() {
            let Some(kind) = self.kind(id) else {
                continue;
            };
            out.push_str(&"  ".repeat(depth));
            out.push_str(kind.type_name());
            if let Some(detail) = self.detail(id, kind, source) {
                out.push_str(&format!(" ({detail})"));
            }
            out.push_str(&self.span(id).range_string());
            out.push('\n');
            for &child in self.children(id).iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }

    fn detail(&self, id: NodeId, kind: &NodeKind, source: &str) -> Option<String> {
        match kind {
            NodeKind::Identifier | NodeKind::Number | NodeKind::TaggedString => {
                Some(snippet(self.slice(id, source)))
            }
            NodeKind::ComponentDeclaration(d) => Some(self.slice_opt(d.name, source).to_string()),
            NodeKind::ComponentInstance(i) => {
                let root = if i.is_root { ", root" } else { "" };
                Some(format!("{}{root}", self.dotted(&i.name, source)))
            }
            NodeKind::Import(data) => {
                let path = self.dotted(&data.path, source);
                Some(match data.alias {
                    Some(alias) => format!("{path} as {}", self.slice(alias, source)),
                    None => path,
                })
            }
            NodeKind::VariableDeclaration(keyword) => Some(keyword.as_str().to_string()),
            NodeKind::CallExpression { is_super: true } => Some("super".to_string()),
            _ => None,
        }
    }
}

/// Prints the dump of `ast` when `unit_name` ends with `ELEMENTS_DEBUG_AST`.
pub fn maybe_debug_ast(unit_name: &str, ast: &Ast, source: &str) {
    let suffix = match std::env::var(DEBUG_AST_ENV) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => return,
    };
    if !unit_name.ends_with(suffix.trim()) {
        return;
    }
    info!(unit = unit_name, "AST dump\n{}", ast.dump(source));
}

/// Escape and trim a source slice for one-line display.
fn snippet(text: &str) -> String {
    let mut t = text.replace('\n', "\\n").replace('\r', "\\r").replace('\t', "\\t");
    if let Some((cut, _)) = t.char_indices().nth(MAX_SNIPPET) {
        t.truncate(cut);
        t.push_str("...");
    }
    t
}
