//! Text edits over the original source.

use crate::errors::{Error, Result};
use crate::model::span::Span;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Replace `range` of the source with `text`. An empty range is an insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub range: Range<usize>,
    pub text: String,
}

impl Edit {
    pub fn replace(span: Span, text: impl Into<String>) -> Self {
        Self {
            range: span.range(),
            text: text.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            range: at..at,
            text: text.into(),
        }
    }

    pub fn is_insertion(&self) -> bool {
        self.range.is_empty()
    }
}

/// Source order; an insertion sorts before a replacement starting at the same byte.
pub fn sort_edits(edits: &mut [Edit]) {
    edits.sort_by_key(|e| (e.range.start, e.range.end));
}

/// Fails on the first pair of sorted edits whose ranges intersect.
pub fn check_edits(edits: &[Edit]) -> Result<()> {
    for pair in edits.windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        if second.range.start < first.range.end {
            return Err(Error::OverlappingEdits {
                first: first.range.clone(),
                second: second.range.clone(),
            });
        }
    }
    Ok(())
}

/// Applies `edits` left to right. Bytes outside every range are copied verbatim.
pub fn apply_edits(source: &str, edits: &[Edit]) -> Result<String> {
    let mut sorted = edits.to_vec();
    sort_edits(&mut sorted);
    check_edits(&sorted)?;
    Ok(splice(source, 0..source.len(), &sorted))
}

/// Text of `range` with the edits that fall inside it applied.
///
/// Edits outside `range`, or overlapping an earlier one, are skipped.
pub(crate) fn splice(source: &str, range: Range<usize>, edits: &[Edit]) -> String {
    let mut sorted: Vec<&Edit> = edits
        .iter()
        .filter(|e| range.start <= e.range.start && e.range.end <= range.end)
        .collect();
    sorted.sort_by_key(|e| (e.range.start, e.range.end));

    let mut out = String::with_capacity(range.len());
    let mut cursor = range.start;
    for edit in sorted {
        if edit.range.start < cursor {
            continue;
        }
        out.push_str(Span::from(cursor..edit.range.start).slice_text(source));
        out.push_str(&edit.text);
        cursor = edit.range.end;
    }
    out.push_str(Span::from(cursor..range.end).slice_text(source));
    out
}
