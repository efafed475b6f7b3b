//! Tagged components: ``Tag`raw text` `` becomes an instance of `Tag` built
//! from the escaped text.

use super::Generator;
use crate::model::ast::TaggedData;

impl Generator<'_> {
    pub(super) fn tagged(&self, tagged: &TaggedData, depth: usize) -> String {
        let tag = self.text_opt(tagged.tag);
        let raw = self.text_opt(tagged.string);
        let text = escape_tagged_text(strip_delimiters(raw));
        let mut w = self.writer();
        w.indent(depth).push("(function(parent){\n");
        w.line(depth + 1, "this.setParent(parent)");
        w.line(depth + 1, "return this");
        w.indent(depth).push(&format!("}}.bind(new {tag}(\"{text}\"))(this))"));
        w.finish()
    }
}

/// Drops the opening and closing delimiter of the raw string.
fn strip_delimiters(raw: &str) -> &str {
    let mut chars = raw.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

/// Escapes tagged text for a double-quoted string literal.
///
/// Whitespace runs collapse to one space and trailing whitespace is dropped.
/// `\n` stays a newline escape, `\s` is a literal space, `\\` a literal
/// backslash; other escapes are copied as written. Quotes are escaped.
pub fn escape_tagged_text(raw: &str) -> String {
    let normalized: String = raw
        .chars()
        .map(|c| if matches!(c, '\r' | '\n' | '\t') { ' ' } else { c })
        .collect();
    let trimmed = normalized.trim_end();

    let mut out = String::with_capacity(trimmed.len());
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ' ' => {
                while chars.peek() == Some(&' ') {
                    chars.next();
                }
                out.push(' ');
            }
            '\\' => match chars.next() {
                Some('n') => out.push_str("\\n"),
                Some('s') => out.push(' '),
                Some('\\') => out.push_str("\\\\"),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => {}
            },
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
    out
}
