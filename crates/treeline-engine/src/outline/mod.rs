//! The structural editor: composes tree mutations with focus and cursor
//! requests so every structural edit lands the caret somewhere sensible.
//!
//! Structural requests arrive as [`EngineEvent`]s from the per-node text
//! engines; [`OutlineEditor::handle_event`] applies them to the tree and
//! answers with the focus the host should give next. Invalid requests
//! (indent with no eligible target, outdent at root) are silent no-ops.

use crate::events::{ArrowDirection, EngineEvent};
use crate::tree::{Node, NodeId, NodeTree, NodeType};

mod column;

pub use column::{column_hint, resolve_column};

/// Where the caret should land in a freshly focused node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorTarget {
    Start,
    End,
    /// A byte offset into the canonical content.
    Offset(usize),
}

/// A focus change the host should perform after a structural edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusRequest {
    pub node: NodeId,
    pub cursor: CursorTarget,
}

impl FocusRequest {
    fn at(node: NodeId, cursor: CursorTarget) -> Self {
        Self { node, cursor }
    }

    /// Resolve the cursor target to a byte offset in the node's content.
    pub fn offset_in(&self, tree: &NodeTree) -> usize {
        let len = tree.get(self.node).map(|n| n.content.len()).unwrap_or(0);
        match self.cursor {
            CursorTarget::Start => 0,
            CursorTarget::End => len,
            CursorTarget::Offset(offset) => offset.min(len),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutlineEditor {
    tree: NodeTree,
}

impl OutlineEditor {
    pub fn new(tree: NodeTree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    /// Apply a structural engine event to the tree.
    pub fn handle_event(&mut self, event: &EngineEvent) -> Option<FocusRequest> {
        match event {
            EngineEvent::ContentChanged { node, content } => {
                self.tree.set_content(*node, content.clone());
                None
            }
            EngineEvent::CreateNode {
                node,
                content,
                caret,
            } => self.create_node(*node, content.clone(), *caret),
            EngineEvent::CreateNodeAbove { node } => self.create_node_above(*node),
            EngineEvent::IndentNode { node } => self.indent(*node),
            EngineEvent::OutdentNode { node } => self.outdent(*node),
            EngineEvent::NavigateArrow {
                node,
                direction,
                char_offset,
            } => self.navigate(*node, *direction, *char_offset),
            EngineEvent::CombineWithPrevious { node, content } => {
                self.combine_with_previous(*node, content)
            }
            EngineEvent::DeleteNode { node } => self.delete_node(*node),
            _ => None,
        }
    }

    /// Make the node the last child of its preceding sibling. No-op when
    /// there is no preceding sibling or its type disallows children.
    pub fn indent(&mut self, id: NodeId) -> Option<FocusRequest> {
        let previous = self.tree.previous_sibling(id)?;
        if !self.tree.reparent_as_last_child(id, previous) {
            return None;
        }
        // keep the node visible under its new parent
        self.tree.set_expanded(previous, true);
        Some(FocusRequest::at(id, CursorTarget::End))
    }

    /// Make the node the next sibling of its former parent; following
    /// siblings come along as its children. No-op at root level.
    pub fn outdent(&mut self, id: NodeId) -> Option<FocusRequest> {
        if self.tree.parent(id).is_none() {
            return None;
        }
        let followers = self.tree.following_siblings(id);
        if !self.tree.reparent_as_next_sibling_of_parent(id) {
            return None;
        }
        for follower in followers {
            self.tree.reparent_as_last_child(follower, id);
        }
        self.tree.set_expanded(id, true);
        Some(FocusRequest::at(id, CursorTarget::End))
    }

    /// Append the node's content to the previous visible node and delete
    /// it; empty content degenerates to a pure delete. The caret lands at
    /// the junction.
    pub fn combine_with_previous(&mut self, id: NodeId, content: &str) -> Option<FocusRequest> {
        let previous = self.previous_visible(id)?;
        let junction = self.tree.get(previous)?.content.len();
        if !content.is_empty() {
            let merged = format!("{}{}", self.tree.get(previous)?.content, content);
            self.tree.set_content(previous, merged);
        }
        self.tree.splice_out(id);
        Some(FocusRequest::at(previous, CursorTarget::Offset(junction)))
    }

    /// Insert the trailing half of a split as a new sibling after `id`.
    ///
    /// A collapsed reference node keeps its children; an expanded one hands
    /// them to the new trailing node.
    pub fn create_node(
        &mut self,
        id: NodeId,
        content: String,
        caret: usize,
    ) -> Option<FocusRequest> {
        let reference = self.tree.get(id)?;
        let node_type = reference.node_type;
        let hand_over = reference.expanded && !reference.children.is_empty();

        let new_id = self.tree.insert_after(id, Node::new(node_type, content))?;
        if hand_over {
            let children = self.tree.get(id)?.children.clone();
            for child in children {
                self.tree.reparent_as_last_child(child, new_id);
            }
            self.tree.set_expanded(new_id, true);
        }
        Some(FocusRequest::at(new_id, CursorTarget::Offset(caret)))
    }

    /// Insert an empty sibling above `id`, leaving its content untouched.
    /// Focus stays on the original node.
    pub fn create_node_above(&mut self, id: NodeId) -> Option<FocusRequest> {
        let node_type = self.tree.get(id)?.node_type;
        self.tree.insert_before(id, Node::new(node_type, ""))?;
        Some(FocusRequest::at(id, CursorTarget::Start))
    }

    /// Delete an empty node, focusing the end of the previous visible node.
    pub fn delete_node(&mut self, id: NodeId) -> Option<FocusRequest> {
        let previous = self.previous_visible(id);
        self.tree.splice_out(id)?;
        previous.map(|node| FocusRequest::at(node, CursorTarget::End))
    }

    /// Cross-node vertical navigation. The exiting node's character offset
    /// becomes a visual column hint, resolved in the entering node by
    /// undoing indentation and header scale.
    pub fn navigate(
        &self,
        from: NodeId,
        direction: ArrowDirection,
        char_offset: usize,
    ) -> Option<FocusRequest> {
        let visible = self.tree.flatten_visible();
        let index = visible.iter().position(|v| v.id == from)?;
        let target = match direction {
            ArrowDirection::Up => visible.get(index.checked_sub(1)?)?,
            ArrowDirection::Down => visible.get(index + 1)?,
        };

        let from_node = self.tree.get(from)?;
        let target_node = self.tree.get(target.id)?;
        let hint = column_hint(
            self.tree.depth(from),
            from_node.header_level,
            char_offset,
        );
        let char_count = target_node.content.chars().count();
        let column = resolve_column(hint, target.depth, target_node.header_level, char_count);
        let offset = target_node
            .content
            .char_indices()
            .nth(column)
            .map(|(i, _)| i)
            .unwrap_or(target_node.content.len());
        Some(FocusRequest::at(target.id, CursorTarget::Offset(offset)))
    }

    fn previous_visible(&self, id: NodeId) -> Option<NodeId> {
        let visible = self.tree.flatten_visible();
        let index = visible.iter().position(|v| v.id == id)?;
        index.checked_sub(1).map(|i| visible[i].id)
    }

    /// Convenience for hosts: make a one-node outline.
    pub fn with_single_node(content: &str) -> (Self, NodeId) {
        let mut tree = NodeTree::new();
        let id = tree.push_root(Node::new(NodeType::Bullet, content));
        (Self::new(tree), id)
    }
}
