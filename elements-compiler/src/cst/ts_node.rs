//! Tree-sitter adapter.
//!
//! Lets a grammar compiled for Tree-sitter feed the builder directly:
//! `build_ast(tree.root_node(), &code, name, &config)`.

use super::{CstNode, CstPoint};
use std::ops::Range;
use tree_sitter::Node;

impl<'tree> CstNode for Node<'tree> {
    #[inline]
    fn kind(&self) -> &str {
        Node::kind(self)
    }

    #[inline]
    fn byte_range(&self) -> Range<usize> {
        Node::byte_range(self)
    }

    fn start_point(&self) -> CstPoint {
        let p = Node::start_position(self);
        CstPoint {
            row: p.row,
            column: p.column,
        }
    }

    #[inline]
    fn is_named(&self) -> bool {
        Node::is_named(self)
    }

    #[inline]
    fn child_count(&self) -> usize {
        Node::child_count(self)
    }

    #[inline]
    fn child(&self, index: usize) -> Option<Self> {
        Node::child(self, index)
    }

    /// Tree-sitter marks error-recovery nodes itself; missing tokens count too.
    fn is_error(&self) -> bool {
        Node::is_error(self) || Node::is_missing(self)
    }
}
