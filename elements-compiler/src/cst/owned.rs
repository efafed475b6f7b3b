//! Owned, serializable CST.
//!
//! Grammar bridges that cannot link Tree-sitter into the process ship the tree
//! as JSON instead. [`CstSketch`] lays out a nested kind/text sketch over a
//! source string, which is how fixtures are written.

use super::{CstNode, CstPoint};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedCstNode {
    pub kind: String,
    pub start_byte: usize,
    pub end_byte: usize,
    #[serde(default)]
    pub start_point: CstPoint,
    #[serde(default = "default_named")]
    pub named: bool,
    #[serde(default)]
    pub children: Vec<usize>,
}

fn default_named() -> bool {
    true
}

/// Flat node table; children refer to other entries by index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedCst {
    pub nodes: Vec<OwnedCstNode>,
    pub root: usize,
}

impl OwnedCst {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Root view. An empty table yields a zero-width `program`.
    pub fn root_node(&self) -> OwnedNode<'_> {
        OwnedNode {
            tree: self,
            index: self.root,
        }
    }

    fn push(&mut self, node: OwnedCstNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OwnedNode<'a> {
    tree: &'a OwnedCst,
    index: usize,
}

impl<'a> OwnedNode<'a> {
    fn data(&self) -> Option<&'a OwnedCstNode> {
        self.tree.nodes.get(self.index)
    }
}

impl<'a> CstNode for OwnedNode<'a> {
    fn kind(&self) -> &str {
        self.data().map(|n| n.kind.as_str()).unwrap_or("program")
    }

    fn byte_range(&self) -> Range<usize> {
        self.data().map(|n| n.start_byte..n.end_byte).unwrap_or(0..0)
    }

    fn start_point(&self) -> CstPoint {
        self.data().map(|n| n.start_point).unwrap_or_default()
    }

    fn is_named(&self) -> bool {
        self.data().map(|n| n.named).unwrap_or(true)
    }

    fn child_count(&self) -> usize {
        self.data().map(|n| n.children.len()).unwrap_or(0)
    }

    fn child(&self, index: usize) -> Option<Self> {
        let child = *self.data()?.children.get(index)?;
        (child < self.tree.nodes.len()).then_some(OwnedNode {
            tree: self.tree,
            index: child,
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SketchError {
    #[error("token {text:?} not found after byte {from}")]
    TokenNotFound { text: String, from: usize },
}

/// Nested description of a CST whose byte offsets are computed from the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CstSketch {
    Leaf {
        kind: String,
        text: String,
        named: bool,
    },
    Node {
        kind: String,
        children: Vec<CstSketch>,
    },
}

/// Named node spanning its first to last child.
pub fn node(kind: &str, children: Vec<CstSketch>) -> CstSketch {
    CstSketch::Node {
        kind: kind.to_string(),
        children,
    }
}

/// Named leaf (identifier, number, string ...).
pub fn leaf(kind: &str, text: &str) -> CstSketch {
    CstSketch::Leaf {
        kind: kind.to_string(),
        text: text.to_string(),
        named: true,
    }
}

/// Anonymous token; its kind is its text.
pub fn token(text: &str) -> CstSketch {
    CstSketch::Leaf {
        kind: text.to_string(),
        text: text.to_string(),
        named: false,
    }
}

impl CstSketch {
    /// Places every leaf at its next occurrence in `source`, left to right.
    /// The root always spans the whole source.
    pub fn layout(&self, source: &str) -> Result<OwnedCst, SketchError> {
        let mut tree = OwnedCst::default();
        let mut cursor = 0;
        let root = place(self, source, &mut cursor, &mut tree)?;
        if let Some(n) = tree.nodes.get_mut(root) {
            n.start_byte = 0;
            n.end_byte = source.len();
            n.start_point = CstPoint::default();
        }
        tree.root = root;
        Ok(tree)
    }
}

fn place(
    sketch: &CstSketch,
    source: &str,
    cursor: &mut usize,
    tree: &mut OwnedCst,
) -> Result<usize, SketchError> {
    match sketch {
        CstSketch::Leaf { kind, text, named } => {
            let start = find_token(source, *cursor, text).ok_or_else(|| SketchError::TokenNotFound {
                text: text.clone(),
                from: *cursor,
            })?;
            let end = start + text.len();
            *cursor = end;
            Ok(tree.push(OwnedCstNode {
                kind: kind.clone(),
                start_byte: start,
                end_byte: end,
                start_point: point_at(source, start),
                named: *named,
                children: Vec::new(),
            }))
        }
        CstSketch::Node { kind, children } => {
            let mut ids = Vec::with_capacity(children.len());
            for child in children {
                ids.push(place(child, source, cursor, tree)?);
            }
            let start = ids
                .first()
                .map(|&i| tree.nodes[i].start_byte)
                .unwrap_or(*cursor);
            let end = ids.last().map(|&i| tree.nodes[i].end_byte).unwrap_or(*cursor);
            Ok(tree.push(OwnedCstNode {
                kind: kind.clone(),
                start_byte: start,
                end_byte: end,
                start_point: point_at(source, start),
                named: true,
                children: ids,
            }))
        }
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Next occurrence of `text` at or after `from`. Word-like tokens must not be
/// glued to neighbouring word characters (`a` never matches inside `parent`).
fn find_token(source: &str, from: usize, text: &str) -> Option<usize> {
    let hay = source.get(from..)?;
    let bytes = source.as_bytes();
    let word_start = text.bytes().next().is_some_and(is_word_byte);
    let word_end = text.bytes().last().is_some_and(is_word_byte);
    hay.match_indices(text).map(|(i, _)| from + i).find(|&start| {
        let end = start + text.len();
        let left_ok = !word_start || start == 0 || !is_word_byte(bytes[start - 1]);
        let right_ok = !word_end || end >= bytes.len() || !is_word_byte(bytes[end]);
        left_ok && right_ok
    })
}

fn point_at(source: &str, offset: usize) -> CstPoint {
    let before = &source.as_bytes()[..offset.min(source.len())];
    let row = before.iter().filter(|&&b| b == b'\n').count();
    let column = match before.iter().rposition(|&b| b == b'\n') {
        Some(nl) => offset - nl - 1,
        None => offset,
    };
    CstPoint { row, column }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_assigns_offsets_and_points() {
        let src = "a.b\n  parent.x";
        let sketch = node(
            "program",
            vec![
                node(
                    "member_expression",
                    vec![leaf("identifier", "a"), token("."), leaf("property_identifier", "b")],
                ),
                node(
                    "member_expression",
                    vec![leaf("identifier", "parent"), token("."), leaf("property_identifier", "x")],
                ),
            ],
        );
        let cst = sketch.layout(src).expect("layout");
        let root = cst.root_node();
        assert_eq!(root.byte_range(), 0..src.len());

        let second = root.child(1).expect("second member");
        assert_eq!(second.text(src), "parent.x");
        assert_eq!(second.start_point(), CstPoint { row: 1, column: 2 });

        let dot = second.child(1).expect("dot");
        assert!(!dot.is_named());
        assert_eq!(root.named_children().len(), 2);
    }

    #[test]
    fn word_tokens_respect_boundaries() {
        assert_eq!(find_token("parent a", 0, "a"), Some(7));
        assert_eq!(find_token("x.a", 0, "."), Some(1));
    }

    #[test]
    fn missing_token_is_reported() {
        let err = node("program", vec![leaf("identifier", "zzz")])
            .layout("abc")
            .unwrap_err();
        assert_eq!(
            err,
            SketchError::TokenNotFound {
                text: "zzz".into(),
                from: 0
            }
        );
    }

    #[test]
    fn json_round_trip_keeps_structure() {
        let cst = node("program", vec![leaf("number", "42")])
            .layout("42")
            .expect("layout");
        let back = OwnedCst::from_json(&cst.to_json().expect("json")).expect("parse");
        assert_eq!(back, cst);
        assert_eq!(back.root_node().child(0).map(|n| n.kind().to_string()), Some("number".into()));
    }
}
