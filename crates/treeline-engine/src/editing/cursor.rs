//! Offset mapping between rendered and canonical text.
//!
//! Entering edit mode re-injects hidden syntax characters, so an offset
//! resolved against the formatted text must be translated before the raw
//! form is substituted: a header-offset adjustment followed by a
//! character-by-character alignment walk that skips canonical characters
//! with no rendered counterpart (markers, reference syntax).

use crate::markup::{self, render};

/// Translate an offset in the rendered (formatted) text into the
/// corresponding offset in the canonical text.
pub fn rendered_to_canonical(content: &str, rendered_offset: usize) -> usize {
    let rendered = render(content);
    let target = rendered_offset.min(rendered.text.len());

    let mut canonical = markup::header_prefix_len(content);
    for (index, rendered_char) in rendered.text.char_indices() {
        if index >= target {
            return canonical;
        }
        // skip canonical characters (syntax) until the rendered one aligns
        loop {
            let Some(canonical_char) = content[canonical..].chars().next() else {
                return content.len();
            };
            canonical += canonical_char.len_utf8();
            if canonical_char == rendered_char {
                break;
            }
        }
    }
    canonical
}

/// Translate a canonical offset into rendered-text coordinates. Offsets
/// that fall inside hidden syntax map to the nearest rendered boundary.
pub fn canonical_to_rendered(content: &str, canonical_offset: usize) -> usize {
    let rendered = render(content);
    let target = canonical_offset.min(content.len());

    let mut canonical = markup::header_prefix_len(content);
    for (index, rendered_char) in rendered.text.char_indices() {
        loop {
            if canonical >= target {
                return index;
            }
            let Some(canonical_char) = content[canonical..].chars().next() else {
                return index;
            };
            canonical += canonical_char.len_utf8();
            if canonical_char == rendered_char {
                break;
            }
        }
    }
    rendered.text.len()
}
