//! Splitting canonical text at a cursor while preserving open emphasis and
//! header inheritance.

use crate::markup::{self, FormatType};

/// The two halves of a split, plus where the caret belongs in the new text
/// (after the inherited header prefix and reopened markers).
#[derive(Debug, Clone, PartialEq)]
pub struct SplitResult {
    pub before: String,
    pub after: String,
    pub caret: usize,
}

/// Split `content` at a byte offset.
///
/// Opening markers with no matching close before the cursor are closed, in
/// reverse opening order, at the end of the retained text and reopened, in
/// original order, at the start of the new text. A header re-emits its `#`
/// prefix on the new half.
pub fn split_at(content: &str, offset: usize) -> SplitResult {
    let prefix_len = markup::header_prefix_len(content);
    let offset = offset.clamp(prefix_len, content.len());

    let open = unmatched_openings(&content[..offset]);

    let mut before = content[..offset].to_string();
    for spelling in open.iter().rev() {
        before.push_str(spelling);
    }

    let mut after = markup::header_prefix(markup::header_level(content));
    for spelling in &open {
        after.push_str(spelling);
    }
    let caret = after.len();
    after.push_str(&content[offset..]);

    SplitResult {
        before,
        after,
        caret,
    }
}

/// Marker spellings opened but not closed in `text`, in opening order.
///
/// An odd count of a spelling's maximal runs means its last run is an
/// unmatched opening.
fn unmatched_openings(text: &str) -> Vec<&'static str> {
    let mut open: Vec<(usize, &'static str)> = Vec::new();
    for format in FormatType::SCAN_ORDER {
        for &spelling in format.spellings() {
            let positions = run_positions(text, spelling);
            if positions.len() % 2 == 1
                && let Some(&last) = positions.last()
            {
                open.push((last, spelling));
            }
        }
    }
    open.sort_by_key(|&(pos, _)| pos);
    open.into_iter().map(|(_, spelling)| spelling).collect()
}

/// Start offsets of maximal marker runs exactly matching `spelling`.
fn run_positions(text: &str, spelling: &str) -> Vec<usize> {
    let ch = spelling.as_bytes()[0];
    let bytes = text.as_bytes();
    let mut positions = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == ch {
            let start = i;
            while i < bytes.len() && bytes[i] == ch {
                i += 1;
            }
            if i - start == spelling.len() {
                positions.push(start);
            }
        } else {
            i += 1;
        }
    }
    positions
}
