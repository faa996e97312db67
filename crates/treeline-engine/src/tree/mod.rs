//! The node forest and its primitive structural mutations.

pub mod model;
pub mod node;
pub mod text;

pub use model::{NodeTree, VisibleNode};
pub use node::{Node, NodeId, NodeType};
pub use text::{OutlineTextError, format_outline, parse_outline};
