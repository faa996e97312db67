//! Nested emphasis analysis and toggling over canonical text.
//!
//! Marker occurrences are maximal runs of one marker character, matched to
//! a family by exact run length, so a `***` run is claimed by bold-italic
//! and never misread as `**` plus `*`. A selection edge that falls inside a
//! run snaps to the run boundary before analysis.

use std::ops::Range;

use crate::markup::FormatType;

/// A matched opening/closing marker pair enclosing a text range.
///
/// `start` and `end` are the byte offsets of the opening and closing
/// marker in canonical text; `marker` is the literal spelling found there.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattingLayer {
    pub format: FormatType,
    pub marker: &'static str,
    pub start: usize,
    pub end: usize,
}

impl FormattingLayer {
    /// Byte offset one past the closing marker.
    pub fn outer_end(&self) -> usize {
        self.end + self.marker.len()
    }
}

/// Result of a toggle: the new canonical text and the selection translated
/// into its coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Toggle {
    pub text: String,
    pub selection: Range<usize>,
}

#[derive(Debug, Clone, Copy)]
struct MarkerRun {
    ch: u8,
    start: usize,
    len: usize,
}

impl MarkerRun {
    fn end(&self) -> usize {
        self.start + self.len
    }
}

fn marker_runs(text: &str) -> Vec<MarkerRun> {
    let bytes = text.as_bytes();
    let mut runs = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if matches!(b, b'*' | b'_' | b'~') {
            let start = i;
            while i < bytes.len() && bytes[i] == b {
                i += 1;
            }
            runs.push(MarkerRun {
                ch: b,
                start,
                len: i - start,
            });
        } else {
            i += 1;
        }
    }
    runs
}

/// Snap selection edges that fall strictly inside a marker run to the run
/// boundary. A collapsed cursor stays collapsed.
fn snap_to_runs(runs: &[MarkerRun], range: &Range<usize>) -> Range<usize> {
    if range.start == range.end {
        let mut pos = range.start;
        for run in runs {
            if run.start < pos && pos < run.end() {
                pos = run.start;
                break;
            }
        }
        return pos..pos;
    }
    let mut start = range.start;
    let mut end = range.end;
    for run in runs {
        if run.start < start && start < run.end() {
            start = run.start;
        }
        if run.start < end && end < run.end() {
            end = run.end();
        }
    }
    start..end
}

/// All formatting layers that fully enclose `range`.
///
/// For each family (longest marker first) and each spelling: scan backward
/// from the range start for the nearest unmatched opening run, forward from
/// the range end for the nearest run of the same marker, and record a layer
/// only if both exist. An opening is unmatched when an odd number of runs
/// of its spelling precede the range.
pub fn enclosing_layers(text: &str, range: Range<usize>) -> Vec<FormattingLayer> {
    let runs = marker_runs(text);
    let range = snap_to_runs(&runs, &range);
    let mut layers = Vec::new();

    for format in FormatType::SCAN_ORDER {
        for &spelling in format.spellings() {
            let ch = spelling.as_bytes()[0];
            let len = spelling.len();
            let before: Vec<&MarkerRun> = runs
                .iter()
                .filter(|run| run.ch == ch && run.len == len && run.end() <= range.start)
                .collect();
            let after = runs
                .iter()
                .find(|run| run.ch == ch && run.len == len && run.start >= range.end);

            if before.len() % 2 == 1
                && let Some(open) = before.last()
                && let Some(close) = after
            {
                layers.push(FormattingLayer {
                    format,
                    marker: spelling,
                    start: open.start,
                    end: close.start,
                });
            }
        }
    }

    layers
}

/// Toggle `format` on the selected range of canonical text.
///
/// Removal splices out exactly the matching layer's marker pair, even when
/// other layers nest inside or outside it. A bold or italic request inside
/// a bold-italic layer demotes the triple marker to the complement instead.
/// Addition places new markers outside the outermost existing layer so
/// repeated toggles of different types nest; a collapsed cursor with no
/// enclosing layer is a no-op.
pub fn toggle(text: &str, selection: Range<usize>, format: FormatType) -> Toggle {
    let runs = marker_runs(text);
    let sel = snap_to_runs(&runs, &selection);
    let layers = enclosing_layers(text, sel.clone());

    // removal: innermost enclosing layer of the requested type
    if let Some(layer) = layers
        .iter()
        .filter(|layer| layer.format == format)
        .max_by_key(|layer| layer.start)
    {
        return remove_layer(text, &sel, layer, "");
    }

    // bold/italic inside bold-italic: demote the triple marker
    if matches!(format, FormatType::Bold | FormatType::Italic)
        && let Some(layer) = layers
            .iter()
            .filter(|layer| layer.format == FormatType::BoldItalic)
            .max_by_key(|layer| layer.start)
    {
        let complement = match format {
            FormatType::Bold => FormatType::Italic,
            _ => FormatType::Bold,
        };
        return remove_layer(text, &sel, layer, complement.canonical_spelling());
    }

    if sel.start == sel.end && layers.is_empty() {
        return Toggle {
            text: text.to_string(),
            selection: sel,
        };
    }

    add_layer(text, &sel, &layers, format)
}

/// Splice out `layer`'s marker pair, substituting `replacement` (possibly
/// empty) for each side.
fn remove_layer(
    text: &str,
    sel: &Range<usize>,
    layer: &FormattingLayer,
    replacement: &str,
) -> Toggle {
    let len = layer.marker.len();
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..layer.start]);
    out.push_str(replacement);
    out.push_str(&text[layer.start + len..layer.end]);
    out.push_str(replacement);
    out.push_str(&text[layer.end + len..]);

    let delta = len - replacement.len().min(len);
    let map = |pos: usize| -> usize {
        if pos <= layer.start {
            pos
        } else if pos <= layer.start + len {
            layer.start + replacement.len()
        } else if pos <= layer.end {
            pos - delta
        } else if pos <= layer.end + len {
            layer.end - delta + replacement.len()
        } else {
            pos - 2 * delta
        }
    };

    Toggle {
        selection: map(sel.start)..map(sel.end),
        text: out,
    }
}

fn add_layer(
    text: &str,
    sel: &Range<usize>,
    layers: &[FormattingLayer],
    format: FormatType,
) -> Toggle {
    let marker = format.canonical_spelling();
    let len = marker.len();

    // outside the outermost existing layer, not around the raw selection
    let (at_open, at_close) = if layers.is_empty() {
        (sel.start, sel.end)
    } else {
        let outer_start = layers.iter().map(|layer| layer.start).min().unwrap_or(sel.start);
        let outer_end = layers
            .iter()
            .map(FormattingLayer::outer_end)
            .max()
            .unwrap_or(sel.end);
        (outer_start, outer_end)
    };

    let mut out = String::with_capacity(text.len() + 2 * len);
    out.push_str(&text[..at_open]);
    out.push_str(marker);
    out.push_str(&text[at_open..at_close]);
    out.push_str(marker);
    out.push_str(&text[at_close..]);

    let map = |pos: usize| -> usize {
        if pos < at_open {
            pos
        } else if pos <= at_close {
            pos + len
        } else {
            pos + 2 * len
        }
    };

    Toggle {
        selection: map(sel.start)..map(sel.end),
        text: out,
    }
}

/// Trim marker characters from the edges of a selection, for selections
/// that grabbed the syntax along with the word (a double-click on
/// `__word__` selects all ten characters).
pub fn shrink_selection(text: &str, selection: Range<usize>) -> Range<usize> {
    let mut start = selection.start.min(text.len());
    let mut end = selection.end.min(text.len());
    while start < end
        && let Some(ch) = text[start..].chars().next()
        && crate::markup::grammar::is_marker_char(ch)
    {
        start += ch.len_utf8();
    }
    while start < end
        && let Some(ch) = text[..end].chars().next_back()
        && crate::markup::grammar::is_marker_char(ch)
    {
        end -= ch.len_utf8();
    }
    start..end
}
