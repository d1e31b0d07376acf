//! Byte-range edits against the document source text.
//!
//! The document is never re-serialized: each write replaces (or inserts)
//! the text content of one element and every other byte is copied through.

use std::ops::Range;

/// Where the text content of an element lives in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TextSlot {
    /// The element's text node occupies this range.
    Replace(Range<usize>),
    /// Element has no text node; content starts at this offset.
    Insert(usize),
    /// Self-closing element; `range` covers the trailing `/>`.
    Expand { range: Range<usize>, name: String },
}

impl TextSlot {
    /// Locate the text slot of an element node.
    pub(crate) fn of(node: roxmltree::Node<'_, '_>, source: &str) -> Option<Self> {
        if let Some(text) = node.children().find(|child| child.is_text()) {
            return Some(TextSlot::Replace(text.range()));
        }

        let element = node.range();
        let head_end = start_tag_end(source, element.start)?;
        if source[..head_end].ends_with("/>") {
            let name = tag_name(&source[element.start..head_end]).to_string();
            Some(TextSlot::Expand {
                range: head_end - 2..head_end,
                name,
            })
        } else {
            Some(TextSlot::Insert(head_end))
        }
    }

    /// Turn the slot into an edit writing `value`, or `None` when the
    /// source already holds exactly that text.
    pub(crate) fn write(&self, source: &str, value: &str) -> Option<TextEdit> {
        let escaped = escape_text(value);
        match self {
            TextSlot::Replace(range) => {
                if source[range.clone()] == escaped {
                    None
                } else {
                    Some(TextEdit::new(range.clone(), escaped))
                }
            }
            TextSlot::Insert(at) => {
                if escaped.is_empty() {
                    None
                } else {
                    Some(TextEdit::new(*at..*at, escaped))
                }
            }
            TextSlot::Expand { range, name } => {
                if escaped.is_empty() {
                    None
                } else {
                    Some(TextEdit::new(
                        range.clone(),
                        format!(">{}</{}>", escaped, name),
                    ))
                }
            }
        }
    }
}

/// One splice: replace `range` of the source with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TextEdit {
    pub range: Range<usize>,
    pub replacement: String,
}

impl TextEdit {
    pub(crate) fn new(range: Range<usize>, replacement: String) -> Self {
        Self { range, replacement }
    }
}

/// Apply edits to `source`.
///
/// When two edits start at the same offset the later one wins. Overlapping
/// edits cannot come out of distinct leaf elements, so they are skipped.
pub(crate) fn splice(source: &str, edits: Vec<TextEdit>) -> String {
    let mut edits = edits;
    // Stable sort keeps caller order among equal starts.
    edits.sort_by_key(|edit| edit.range.start);

    let mut deduped: Vec<TextEdit> = Vec::with_capacity(edits.len());
    for edit in edits {
        match deduped.last_mut() {
            Some(last) if last.range == edit.range => *last = edit,
            Some(last) if edit.range.start < last.range.end => {
                tracing::warn!(
                    "Skipping overlapping edit at {}..{}",
                    edit.range.start,
                    edit.range.end
                );
            }
            _ => deduped.push(edit),
        }
    }

    let mut out = String::with_capacity(source.len() + 64);
    let mut cursor = 0;
    for edit in &deduped {
        out.push_str(&source[cursor..edit.range.start]);
        out.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    out.push_str(&source[cursor..]);
    out
}

/// Escape character data for an element body.
pub(crate) fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Offset just past the `>` closing the start tag beginning at `start`.
fn start_tag_end(source: &str, start: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (offset, b) in source.as_bytes()[start..].iter().enumerate() {
        match (quote, *b) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, b'"') | (None, b'\'') => quote = Some(*b),
            (None, b'>') => return Some(start + offset + 1),
            (None, _) => {}
        }
    }
    None
}

/// Qualified tag name from a start tag such as `<camera attr="1">`.
fn tag_name(head: &str) -> &str {
    let body = head.trim_start_matches('<');
    let end = body
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(body.len());
    &body[..end]
}
