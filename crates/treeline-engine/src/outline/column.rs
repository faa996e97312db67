//! Visual column hints for cross-node vertical navigation.
//!
//! A node's horizontal character offset only lines up visually with the
//! node above or below after undoing two effects: hierarchy indentation
//! (two columns per depth step) and header font scale. The hint is the
//! visual column in root-level character cells.

const INDENT_COLUMNS: f32 = 2.0;

// index 0 is plain text, 1-6 the header sizes
const HEADER_SCALE: [f32; 7] = [1.0, 2.0, 1.5, 1.17, 1.0, 0.83, 0.67];

fn scale(header_level: u8) -> f32 {
    HEADER_SCALE[usize::from(header_level).min(6)]
}

/// Convert a character offset in a node into a visual column hint.
pub fn column_hint(depth: usize, header_level: u8, char_offset: usize) -> f32 {
    depth as f32 * INDENT_COLUMNS + char_offset as f32 * scale(header_level)
}

/// Resolve a visual column hint into a character offset of the entering
/// node, clamped to its content length.
pub fn resolve_column(hint: f32, depth: usize, header_level: u8, char_count: usize) -> usize {
    let local = (hint - depth as f32 * INDENT_COLUMNS) / scale(header_level);
    (local.round().max(0.0) as usize).min(char_count)
}
