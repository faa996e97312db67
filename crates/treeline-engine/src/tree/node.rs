use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::markup;

/// Stable opaque identifier for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The closed set of node types.
///
/// Capabilities are a static table on the enum, consulted before every
/// reparenting operation rather than encoded in a type hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// The default outline bullet. Single line, may have children.
    Bullet,
    /// Free-form note text. Multiline, may have children.
    Note,
    /// Verbatim code. Multiline, never has children.
    CodeBlock,
    /// A horizontal rule. No content, no children.
    Divider,
}

impl NodeType {
    pub fn allows_children(self) -> bool {
        matches!(self, NodeType::Bullet | NodeType::Note)
    }

    /// Whether Shift+Enter may insert a literal newline.
    pub fn is_multiline(self) -> bool {
        matches!(self, NodeType::Note | NodeType::CodeBlock)
    }

    pub fn has_editable_content(self) -> bool {
        !matches!(self, NodeType::Divider)
    }
}

/// One node of the outline forest.
///
/// `content` is the canonical markup string and the single source of truth;
/// `header_level` is a cache of its `#` prefix kept consistent by
/// [`Node::set_content`]. Children are exclusively owned by the parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub node_type: NodeType,
    pub content: String,
    pub children: Vec<NodeId>,
    pub expanded: bool,
    pub header_level: u8,
}

impl Node {
    pub fn new(node_type: NodeType, content: impl Into<String>) -> Self {
        let content = content.into();
        let header_level = markup::header_level(&content);
        Self {
            id: NodeId::new(),
            node_type,
            content,
            children: Vec::new(),
            expanded: true,
            header_level,
        }
    }

    pub fn bullet(content: impl Into<String>) -> Self {
        Self::new(NodeType::Bullet, content)
    }

    /// Replace content, keeping the header-level cache consistent.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.header_level = markup::header_level(&self.content);
    }
}
