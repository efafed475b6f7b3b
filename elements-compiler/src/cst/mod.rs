//! Concrete syntax tree interface.
//!
//! The builder never talks to a grammar engine directly. It walks anything that
//! implements [`CstNode`]: Tree-sitter nodes (see `ts_node`) or the owned,
//! serializable tree in [`owned`] that grammar bridges can ship as JSON.

pub mod owned;
mod ts_node;

use crate::model::span::Span;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Kind the grammar engine assigns to error-recovery nodes.
pub const ERROR_KIND: &str = "ERROR";

/// Row/column position of a node start (both 0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CstPoint {
    pub row: usize,
    pub column: usize,
}

/// Minimal read-only view of a CST node.
///
/// Only immediate children are ever requested, so implementations do not need
/// cursors or parent links.
pub trait CstNode: Copy {
    /// Grammar kind, e.g. `component_declaration` or `(`.
    fn kind(&self) -> &str;
    fn byte_range(&self) -> Range<usize>;
    fn start_point(&self) -> CstPoint;
    /// Anonymous tokens (punctuation, keywords) are not named.
    fn is_named(&self) -> bool;
    fn child_count(&self) -> usize;
    fn child(&self, index: usize) -> Option<Self>;

    fn start_byte(&self) -> usize {
        self.byte_range().start
    }

    fn end_byte(&self) -> usize {
        self.byte_range().end
    }

    fn span(&self) -> Span {
        Span::from(self.byte_range())
    }

    fn is_error(&self) -> bool {
        self.kind() == ERROR_KIND
    }

    fn children(&self) -> Vec<Self> {
        (0..self.child_count())
            .filter_map(|i| self.child(i))
            .collect()
    }

    fn named_children(&self) -> Vec<Self> {
        self.children().into_iter().filter(|c| c.is_named()).collect()
    }

    /// Source text covered by this node (empty on out-of-range offsets).
    fn text<'s>(&self, source: &'s str) -> &'s str {
        self.span().slice_text(source)
    }
}
