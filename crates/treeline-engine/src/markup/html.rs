//! HTML preview of the rendered form, for outer shells.

use super::render::{RenderedText, TextStyle, render};

/// Render canonical content to a self-contained HTML fragment.
///
/// Headers become `<h1>`..`<h6>`, everything else a `<p>`. Emphasis maps to
/// `<strong>`/`<em>`/`<u>` and node references to anchors. Text content is
/// escaped.
pub fn render_html(content: &str) -> String {
    let rendered = render(content);
    let body = body_html(&rendered);
    if rendered.header_level > 0 {
        let level = rendered.header_level;
        format!("<h{level}>{body}</h{level}>")
    } else {
        format!("<p>{body}</p>")
    }
}

fn body_html(rendered: &RenderedText) -> String {
    let mut out = String::new();
    let mut pos = 0;
    let mut next_span = 0;

    while pos < rendered.text.len() {
        let (end, style) = if next_span < rendered.spans.len() {
            let span = &rendered.spans[next_span];
            if span.range.start == pos {
                next_span += 1;
                (span.range.end, span.style)
            } else {
                (span.range.start, TextStyle::default())
            }
        } else {
            (rendered.text.len(), TextStyle::default())
        };

        push_tagged(&mut out, rendered, pos..end, style);
        pos = end;
    }

    out
}

fn push_tagged(
    out: &mut String,
    rendered: &RenderedText,
    range: std::ops::Range<usize>,
    style: TextStyle,
) {
    let open: &[(bool, &str)] = &[
        (style.underline, "<u>"),
        (style.bold, "<strong>"),
        (style.italic, "<em>"),
    ];
    for &(on, tag) in open {
        if on {
            out.push_str(tag);
        }
    }

    let mut pos = range.start;
    for reference in &rendered.references {
        if reference.range.start < range.start || reference.range.end > range.end {
            continue;
        }
        out.push_str(&escaped(&rendered.text[pos..reference.range.start]));
        out.push_str("<a href=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(&reference.target));
        out.push_str("\">");
        out.push_str(&escaped(
            &rendered.text[reference.range.start..reference.range.end],
        ));
        out.push_str("</a>");
        pos = reference.range.end;
    }
    out.push_str(&escaped(&rendered.text[pos..range.end]));

    for &(on, tag) in &[
        (style.italic, "</em>"),
        (style.bold, "</strong>"),
        (style.underline, "</u>"),
    ] {
        if on {
            out.push_str(tag);
        }
    }
}

fn escaped(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}
