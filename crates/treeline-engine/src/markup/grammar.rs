//! Marker families of the canonical markup grammar.
//!
//! Each semantic emphasis type carries one or more literal spellings, e.g.
//! `*` and `_` both mean italic. Scanning always tries the longest family
//! first so a `***` run is never misread as `**` followed by `*`.

/// Semantic emphasis types, each with its literal marker spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatType {
    BoldItalic,
    Bold,
    Italic,
    Underline,
}

impl FormatType {
    /// Families in scan order: longest marker first.
    pub const SCAN_ORDER: [FormatType; 4] = [
        FormatType::BoldItalic,
        FormatType::Bold,
        FormatType::Italic,
        FormatType::Underline,
    ];

    /// All literal spellings of this family, canonical spelling first.
    pub fn spellings(self) -> &'static [&'static str] {
        match self {
            FormatType::BoldItalic => &["***", "___"],
            FormatType::Bold => &["**", "__"],
            FormatType::Italic => &["*", "_"],
            FormatType::Underline => &["~"],
        }
    }

    /// The spelling used when this crate generates markers itself.
    pub fn canonical_spelling(self) -> &'static str {
        self.spellings()[0]
    }

    /// Marker length in bytes (all spellings of a family share it).
    pub fn marker_len(self) -> usize {
        self.canonical_spelling().len()
    }
}

/// True for characters that can form emphasis marker runs.
pub fn is_marker_char(c: char) -> bool {
    matches!(c, '*' | '_' | '~')
}

/// Header level 0-6 derived from a leading run of `#` followed by a space.
///
/// A run longer than six hashes, or one not followed by a space, is plain
/// content and yields level 0.
pub fn header_level(content: &str) -> u8 {
    let hashes = content.bytes().take_while(|&b| b == b'#').count();
    if (1..=6).contains(&hashes) && content.as_bytes().get(hashes) == Some(&b' ') {
        hashes as u8
    } else {
        0
    }
}

/// Byte length of the header prefix (`#` run plus the space), 0 if none.
pub fn header_prefix_len(content: &str) -> usize {
    let level = header_level(content) as usize;
    if level > 0 { level + 1 } else { 0 }
}

/// The header prefix for a given level, e.g. `"## "` for level 2.
pub fn header_prefix(level: u8) -> String {
    if level == 0 {
        String::new()
    } else {
        format!("{} ", "#".repeat(level as usize))
    }
}
