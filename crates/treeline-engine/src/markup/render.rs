//! Canonical markup to display form.
//!
//! Rendering is a single left-to-right greedy scan. At each position the
//! scanner tries, in order: a node reference token, then each emphasis
//! family longest-marker-first, matching the shortest run up to the next
//! instance of the same literal marker and recursing into it so nested
//! families compose. Marker characters that open nothing fall through as
//! literal text, so malformed markup degrades instead of erroring.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use super::grammar::{self, FormatType};

/// Flattened display attributes of a rendered character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl TextStyle {
    pub fn is_plain(self) -> bool {
        !(self.bold || self.italic || self.underline)
    }

    /// This style with one more format layered on.
    pub fn with(self, format: FormatType) -> Self {
        let mut style = self;
        match format {
            FormatType::BoldItalic => {
                style.bold = true;
                style.italic = true;
            }
            FormatType::Bold => style.bold = true,
            FormatType::Italic => style.italic = true,
            FormatType::Underline => style.underline = true,
        }
        style
    }
}

/// A styled range of the rendered text. Plain runs are not recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledSpan {
    pub range: Range<usize>,
    pub style: TextStyle,
}

/// A node reference in the rendered text: the range shows the title, the
/// syntax around it is hidden.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSpan {
    pub range: Range<usize>,
    /// The full target URI, e.g. `node://<id>`.
    pub target: String,
}

/// Display form of one node's canonical content: plain text plus the span
/// metadata a surface needs to draw emphasis and references, with the
/// header prefix stripped into `header_level`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderedText {
    pub text: String,
    pub header_level: u8,
    /// Non-overlapping, sorted by start; adjacent equal styles are merged.
    pub spans: Vec<StyledSpan>,
    pub references: Vec<ReferenceSpan>,
}

impl RenderedText {
    /// The style in effect at a rendered byte offset.
    pub fn style_at(&self, offset: usize) -> TextStyle {
        self.spans
            .iter()
            .find(|span| span.range.contains(&offset))
            .map(|span| span.style)
            .unwrap_or_default()
    }
}

fn reference_regex() -> &'static Regex {
    static REFERENCE_REGEX: OnceLock<Regex> = OnceLock::new();
    REFERENCE_REGEX.get_or_init(|| {
        Regex::new(r"^\[([^\[\]\n]*)\]\(([A-Za-z][A-Za-z0-9+.-]*://[^()\s]*)\)")
            .expect("Invalid reference regex")
    })
}

/// Render canonical content to its display form.
pub fn render(content: &str) -> RenderedText {
    let header_level = grammar::header_level(content);
    let body = &content[grammar::header_prefix_len(content)..];

    let mut out = RenderedText {
        header_level,
        ..RenderedText::default()
    };
    scan_inline(body, TextStyle::default(), &mut out);
    out
}

fn scan_inline(s: &str, style: TextStyle, out: &mut RenderedText) {
    let mut pos = 0;
    while pos < s.len() {
        if let Some(caps) = reference_regex().captures(&s[pos..]) {
            let whole = caps.get(0).map(|m| m.end()).unwrap_or(0);
            let title = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let target = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let start = out.text.len();
            push_styled(out, title, style);
            out.references.push(ReferenceSpan {
                range: start..out.text.len(),
                target: target.to_string(),
            });
            pos += whole;
            continue;
        }

        if let Some((format, spelling, inner)) = try_emphasis(&s[pos..]) {
            scan_inline(inner, style.with(format), out);
            pos += spelling.len() * 2 + inner.len();
            continue;
        }

        let Some(ch) = s[pos..].chars().next() else {
            break;
        };
        let mut buf = [0u8; 4];
        push_styled(out, ch.encode_utf8(&mut buf), style);
        pos += ch.len_utf8();
    }
}

/// A balanced emphasis construct starting at the head of `s`, if any.
///
/// Longest family first; the close is the nearest following instance of the
/// same literal marker, and the enclosed run must be non-empty.
fn try_emphasis(s: &str) -> Option<(FormatType, &'static str, &str)> {
    for format in FormatType::SCAN_ORDER {
        for &spelling in format.spellings() {
            if let Some(rest) = s.strip_prefix(spelling)
                && let Some(close) = rest.find(spelling)
                && close > 0
            {
                return Some((format, spelling, &rest[..close]));
            }
        }
    }
    None
}

fn push_styled(out: &mut RenderedText, piece: &str, style: TextStyle) {
    if piece.is_empty() {
        return;
    }
    let start = out.text.len();
    out.text.push_str(piece);
    if style.is_plain() {
        return;
    }
    if let Some(last) = out.spans.last_mut()
        && last.range.end == start
        && last.style == style
    {
        last.range.end = out.text.len();
    } else {
        out.spans.push(StyledSpan {
            range: start..out.text.len(),
            style,
        });
    }
}
