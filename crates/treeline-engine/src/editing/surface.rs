//! The editable surface abstraction.
//!
//! A surface is whatever host widget actually holds editable text: it
//! exposes the current text, a settable selection, a point→offset
//! resolution service and the caret rectangle. The engine is the sole
//! writer of the surface's text; the host forwards input events to the
//! engine and commits surface effects between events.

use std::ops::Range;

/// A pointer coordinate in the surface's own coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Screen-space caret rectangle, used to position the mention popup.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CaretRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

pub trait EditableSurface {
    fn text(&self) -> String;
    fn set_text(&mut self, text: &str);

    /// Current selection as a byte range; a collapsed range is the caret.
    fn selection(&self) -> Range<usize>;
    fn set_selection(&mut self, selection: Range<usize>);

    /// Resolve a pointer coordinate to a byte offset in the current text.
    /// `None` means the host cannot resolve the point.
    fn offset_at_point(&self, point: Point) -> Option<usize>;

    /// The caret rectangle in screen space, if the host can provide one.
    fn caret_rect(&self) -> Option<CaretRect>;
}

/// Keys the engine handles; everything else is plain typing the surface
/// applies itself before reporting a text change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Tab,
    Escape,
    ArrowUp,
    ArrowDown,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub shift: bool,
    /// Ctrl on most platforms, Cmd on macOS.
    pub modifier: bool,
}

impl KeyEvent {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            shift: false,
            modifier: false,
        }
    }

    pub fn shifted(key: Key) -> Self {
        Self {
            key,
            shift: true,
            modifier: false,
        }
    }

    pub fn with_modifier(key: Key) -> Self {
        Self {
            key,
            shift: false,
            modifier: true,
        }
    }
}

/// An in-memory surface for tests and terminal hosts.
///
/// Geometry is a monospace grid: `offset_at_point` divides x by the cell
/// width and the caret rectangle tracks the selection end on one line.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    text: String,
    selection: Range<usize>,
    pub cell_width: f32,
    pub line_height: f32,
    /// Set to true to simulate a host without caret-from-point support.
    pub resolution_unavailable: bool,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self {
            text: String::new(),
            selection: 0..0,
            cell_width: 8.0,
            line_height: 16.0,
            resolution_unavailable: false,
        }
    }
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EditableSurface for HeadlessSurface {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        let len = self.text.len();
        self.selection = self.selection.start.min(len)..self.selection.end.min(len);
    }

    fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    fn set_selection(&mut self, selection: Range<usize>) {
        let len = self.text.len();
        self.selection = selection.start.min(len)..selection.end.min(len);
    }

    fn offset_at_point(&self, point: Point) -> Option<usize> {
        if self.resolution_unavailable {
            return None;
        }
        let column = (point.x / self.cell_width).floor().max(0.0) as usize;
        let byte = self
            .text
            .char_indices()
            .nth(column)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len());
        Some(byte)
    }

    fn caret_rect(&self) -> Option<CaretRect> {
        let column = self.text[..self.selection.end.min(self.text.len())]
            .chars()
            .count();
        Some(CaretRect {
            x: column as f32 * self.cell_width,
            y: 0.0,
            width: 1.0,
            height: self.line_height,
        })
    }
}
