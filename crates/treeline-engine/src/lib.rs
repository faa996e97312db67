pub mod editing;
pub mod events;
pub mod formatting;
pub mod markup;
pub mod outline;
pub mod tree;

// Re-export key types for easier usage
pub use editing::{
    CaretRect, EditableSurface, HeadlessSurface, Key, KeyEvent, KeyOutcome, Point, TextEngine,
};
pub use events::{ArrowDirection, EngineEvent};
pub use formatting::{FormattingLayer, Toggle, enclosing_layers, toggle};
pub use markup::{FormatType, RenderedText, TextStyle, render, render_html};
pub use outline::{CursorTarget, FocusRequest, OutlineEditor};
pub use tree::{Node, NodeId, NodeTree, NodeType, VisibleNode};
