//! Plain-text interchange for the outline: indented `- ` bullet lines.
//!
//! This is the import/export boundary only: two spaces of indentation per
//! depth step, one node per line. Storage itself lives outside the engine.

use thiserror::Error;

use super::model::NodeTree;
use super::node::{Node, NodeId};

pub const INDENT_WIDTH: usize = 2;

#[derive(Debug, Error)]
pub enum OutlineTextError {
    #[error("line {line}: indentation of {found} spaces is not a multiple of {width}")]
    RaggedIndent {
        line: usize,
        found: usize,
        width: usize,
    },

    #[error("line {line}: indent level jumps past its parent")]
    IndentJump { line: usize },
}

/// Parse an indented bullet outline into a forest.
///
/// Empty lines are skipped. A line without a `- ` marker is treated as a
/// bullet whose content is the whole trimmed line.
pub fn parse_outline(text: &str) -> Result<NodeTree, OutlineTextError> {
    let mut tree = NodeTree::new();
    // ancestors of the next node, one id per depth
    let mut stack: Vec<NodeId> = Vec::new();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = index + 1;
        let spaces = line.len() - line.trim_start_matches(' ').len();
        if spaces % INDENT_WIDTH != 0 {
            return Err(OutlineTextError::RaggedIndent {
                line: line_no,
                found: spaces,
                width: INDENT_WIDTH,
            });
        }
        let depth = spaces / INDENT_WIDTH;
        if depth > stack.len() {
            return Err(OutlineTextError::IndentJump { line: line_no });
        }
        stack.truncate(depth);

        let body = line.trim_start_matches(' ');
        let content = body.strip_prefix("- ").unwrap_or(body);
        let id = tree.push_root(Node::bullet(content));
        if let Some(&parent) = stack.last() {
            tree.reparent_as_last_child(id, parent);
        }
        stack.push(id);
    }

    Ok(tree)
}

/// Serialize the whole forest (collapsed subtrees included) back to the
/// indented bullet format.
pub fn format_outline(tree: &NodeTree) -> String {
    let mut out = String::new();
    for &root in tree.roots() {
        format_into(tree, root, 0, &mut out);
    }
    out
}

fn format_into(tree: &NodeTree, id: NodeId, depth: usize, out: &mut String) {
    if let Some(node) = tree.get(id) {
        out.push_str(&" ".repeat(depth * INDENT_WIDTH));
        out.push_str("- ");
        out.push_str(&node.content);
        out.push('\n');
        for &child in &node.children {
            format_into(tree, child, depth + 1, out);
        }
    }
}
