//! Display form back to canonical markup.
//!
//! The inverse of [`render`](super::render::render). Multi-attribute runs
//! are serialized before single-attribute ones: bold+italic collapses to
//! the triple marker rather than `**` plus `*`, and underline wraps
//! outermost, with the canonical spelling of each family, so the output
//! re-parses to the same display form.

use super::grammar::{self, FormatType};
use super::render::{ReferenceSpan, RenderedText, TextStyle};

impl RenderedText {
    /// Reconstruct canonical markup from this display form.
    pub fn to_canonical(&self) -> String {
        let mut out = grammar::header_prefix(self.header_level);
        let mut pos = 0;
        let mut next_span = 0;

        while pos < self.text.len() {
            let (end, style) = if next_span < self.spans.len() {
                let span = &self.spans[next_span];
                if span.range.start == pos {
                    next_span += 1;
                    (span.range.end, span.style)
                } else {
                    (span.range.start, TextStyle::default())
                }
            } else {
                (self.text.len(), TextStyle::default())
            };

            let piece = expand_references(&self.text[pos..end], pos, &self.references);
            push_wrapped(&mut out, &piece, style);
            pos = end;
        }

        out
    }
}

/// Re-emit `[title](target)` tokens for references inside one styled run.
fn expand_references(text: &str, base: usize, references: &[ReferenceSpan]) -> String {
    let mut out = String::new();
    let mut pos = 0;
    for reference in references {
        if reference.range.start < base || reference.range.end > base + text.len() {
            continue;
        }
        let start = reference.range.start - base;
        let end = reference.range.end - base;
        out.push_str(&text[pos..start]);
        out.push('[');
        out.push_str(&text[start..end]);
        out.push_str("](");
        out.push_str(&reference.target);
        out.push(')');
        pos = end;
    }
    out.push_str(&text[pos..]);
    out
}

fn push_wrapped(out: &mut String, piece: &str, style: TextStyle) {
    if piece.is_empty() {
        return;
    }
    // multi-attribute combinations first
    let marker = match (style.bold, style.italic) {
        (true, true) => FormatType::BoldItalic.canonical_spelling(),
        (true, false) => FormatType::Bold.canonical_spelling(),
        (false, true) => FormatType::Italic.canonical_spelling(),
        (false, false) => "",
    };
    let underline = if style.underline {
        FormatType::Underline.canonical_spelling()
    } else {
        ""
    };
    out.push_str(underline);
    out.push_str(marker);
    out.push_str(piece);
    out.push_str(marker);
    out.push_str(underline);
}
