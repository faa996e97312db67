//! Events the engine emits toward the surrounding application.
//!
//! Entry points on [`TextEngine`](crate::editing::TextEngine) return the
//! events they produced; there is no implicit reactivity; the host applies
//! structural events to the tree (usually through
//! [`OutlineEditor::handle_event`](crate::outline::OutlineEditor::handle_event))
//! and re-renders explicitly.

use crate::editing::surface::CaretRect;
use crate::tree::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ContentChanged {
        node: NodeId,
        content: String,
    },
    HeaderLevelChanged {
        node: NodeId,
        level: u8,
    },
    Focused {
        node: NodeId,
    },
    Blurred {
        node: NodeId,
    },
    /// Split-on-enter: a new sibling after `node` carrying the text that
    /// followed the cursor; `caret` is where the cursor belongs in it.
    CreateNode {
        node: NodeId,
        content: String,
        caret: usize,
    },
    /// Enter at offset 0: an empty sibling above, content untouched.
    CreateNodeAbove {
        node: NodeId,
    },
    IndentNode {
        node: NodeId,
    },
    OutdentNode {
        node: NodeId,
    },
    /// Vertical navigation leaving `node`; `char_offset` is the horizontal
    /// character offset the coordinator turns into a column hint.
    NavigateArrow {
        node: NodeId,
        direction: ArrowDirection,
        char_offset: usize,
    },
    /// Backspace at offset 0 with content: merge into the previous visible
    /// node, carrying the current canonical content.
    CombineWithPrevious {
        node: NodeId,
        content: String,
    },
    /// Backspace at offset 0 on an empty node.
    DeleteNode {
        node: NodeId,
    },
    TriggerDetected {
        node: NodeId,
        query: String,
        caret: CaretRect,
    },
    TriggerHidden {
        node: NodeId,
    },
    NodeReferenceSelected {
        node: NodeId,
        target: NodeId,
    },
}
