//! Mention trigger detection.
//!
//! An `@` preceded by whitespace or start-of-text opens a query that runs
//! to the cursor. The query dies the moment it picks up whitespace or
//! outgrows the length cap; accepting a candidate rewrites the whole
//! trigger span to a node reference token.

use crate::tree::NodeId;

pub const TRIGGER_CHAR: char = '@';
pub const MAX_QUERY_LEN: usize = 50;

/// An in-progress mention query.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerContext {
    pub query: String,
    /// Byte offset of the `@`.
    pub start: usize,
    /// Byte offset of the cursor (end of the query).
    pub end: usize,
}

/// Detect a live trigger ending at `cursor`, scanning backward for the
/// nearest `@`.
pub fn detect(text: &str, cursor: usize) -> Option<TriggerContext> {
    let cursor = cursor.min(text.len());
    if !text.is_char_boundary(cursor) {
        return None;
    }
    let start = text[..cursor].rfind(TRIGGER_CHAR)?;

    // the trigger must sit at the start of a word
    if let Some(previous) = text[..start].chars().next_back()
        && !previous.is_whitespace()
    {
        return None;
    }

    let query = &text[start + TRIGGER_CHAR.len_utf8()..cursor];
    if query.chars().any(char::is_whitespace) || query.chars().count() > MAX_QUERY_LEN {
        return None;
    }

    Some(TriggerContext {
        query: query.to_string(),
        start,
        end: cursor,
    })
}

/// Rewrite the trigger span to a `[title](node://<id>)` token. Returns the
/// new text and the cursor position after the token.
pub fn accept(text: &str, context: &TriggerContext, title: &str, target: NodeId) -> (String, usize) {
    let token = format!("[{title}](node://{target})");
    let mut out = String::with_capacity(text.len() + token.len());
    out.push_str(&text[..context.start]);
    out.push_str(&token);
    let cursor = out.len();
    out.push_str(&text[context.end..]);
    (out, cursor)
}
