//! End-to-end tests driving a per-node text engine and the outline editor
//! together, the way a host wires them: engine events feed
//! `OutlineEditor::handle_event`, focus requests come back.

use treeline_engine::{
    ArrowDirection, EditableSurface, EngineEvent, HeadlessSurface, Key, KeyEvent, Node, NodeId,
    NodeTree, NodeType, OutlineEditor, TextEngine,
};

fn focused_engine(editor: &OutlineEditor, id: NodeId) -> TextEngine<HeadlessSurface> {
    let node = editor.tree().get(id).unwrap();
    let mut engine = TextEngine::new(
        id,
        node.node_type,
        node.content.clone(),
        HeadlessSurface::new(),
    );
    engine.initialize(true);
    engine.poll_deferred();
    engine
}

fn apply_all(
    editor: &mut OutlineEditor,
    events: &[EngineEvent],
) -> Option<treeline_engine::FocusRequest> {
    let mut focus = None;
    for event in events {
        if let Some(request) = editor.handle_event(event) {
            focus = Some(request);
        }
    }
    focus
}

#[test]
fn enter_after_header_creates_empty_header_sibling() {
    let (mut editor, id) = OutlineEditor::with_single_node("# Title");
    let mut engine = focused_engine(&editor, id);

    engine.surface_mut().set_selection(7..7);
    let outcome = engine.handle_key(KeyEvent::plain(Key::Enter));
    let focus = apply_all(&mut editor, &outcome.events).unwrap();

    let new_node = editor.tree().get(focus.node).unwrap();
    assert_eq!(new_node.content, "# ");
    assert_eq!(new_node.header_level, 1);
    assert_eq!(focus.offset_in(editor.tree()), 2);
    assert_eq!(editor.tree().roots().len(), 2);
    assert_eq!(editor.tree().roots()[0], id);
}

#[test]
fn split_carries_open_emphasis_into_the_new_node() {
    let (mut editor, id) = OutlineEditor::with_single_node("**bold text");
    let mut engine = focused_engine(&editor, id);

    engine.surface_mut().set_selection(6..6);
    let outcome = engine.handle_key(KeyEvent::plain(Key::Enter));
    let focus = apply_all(&mut editor, &outcome.events).unwrap();

    assert_eq!(editor.tree().get(id).unwrap().content, "**bold**");
    assert_eq!(editor.tree().get(focus.node).unwrap().content, "** text");
}

#[test]
fn enter_at_offset_zero_adds_a_sibling_above() {
    let (mut editor, id) = OutlineEditor::with_single_node("keep me");
    let mut engine = focused_engine(&editor, id);

    engine.surface_mut().set_selection(0..0);
    let outcome = engine.handle_key(KeyEvent::plain(Key::Enter));
    let focus = apply_all(&mut editor, &outcome.events).unwrap();

    // focus stays on the original node, content untouched
    assert_eq!(focus.node, id);
    assert_eq!(editor.tree().get(id).unwrap().content, "keep me");
    assert_eq!(editor.tree().roots().len(), 2);
    assert_eq!(editor.tree().roots()[1], id);
}

#[test]
fn backspace_at_start_merges_into_previous_node() {
    let mut tree = NodeTree::new();
    let first = tree.push_root(Node::bullet("first"));
    let second = tree.push_root(Node::bullet("second"));
    let mut editor = OutlineEditor::new(tree);
    let mut engine = focused_engine(&editor, second);

    engine.surface_mut().set_selection(0..0);
    let outcome = engine.handle_key(KeyEvent::plain(Key::Backspace));
    let focus = apply_all(&mut editor, &outcome.events).unwrap();

    assert_eq!(editor.tree().get(first).unwrap().content, "firstsecond");
    assert!(!editor.tree().contains(second));
    assert_eq!(focus.node, first);
    assert_eq!(focus.offset_in(editor.tree()), 5);
}

#[test]
fn tab_indents_under_previous_sibling() {
    let mut tree = NodeTree::new();
    let first = tree.push_root(Node::bullet("a"));
    let second = tree.push_root(Node::bullet("b"));
    let mut editor = OutlineEditor::new(tree);
    let mut engine = focused_engine(&editor, second);

    let outcome = engine.handle_key(KeyEvent::plain(Key::Tab));
    apply_all(&mut editor, &outcome.events);
    assert_eq!(editor.tree().parent(second), Some(first));

    let outcome = engine.handle_key(KeyEvent::shifted(Key::Tab));
    apply_all(&mut editor, &outcome.events);
    assert_eq!(editor.tree().parent(second), None);
    assert_eq!(editor.tree().roots(), &[first, second]);
}

#[test]
fn typed_content_flows_into_the_tree() {
    let (mut editor, id) = OutlineEditor::with_single_node("old");
    let mut engine = focused_engine(&editor, id);

    engine.surface_mut().set_text("# new heading");
    engine.surface_mut().set_selection(13..13);
    let events = engine.handle_text_changed();
    apply_all(&mut editor, &events);

    let node = editor.tree().get(id).unwrap();
    assert_eq!(node.content, "# new heading");
    assert_eq!(node.header_level, 1);
}

#[test]
fn mention_trigger_to_node_reference() {
    let mut tree = NodeTree::new();
    let projects = tree.push_root(Node::bullet("Projects"));
    let note = tree.push_root(Node::bullet(""));
    let mut editor = OutlineEditor::new(tree);
    let mut engine = focused_engine(&editor, note);

    engine.surface_mut().set_text("see @proj");
    engine.surface_mut().set_selection(9..9);
    let events = engine.handle_text_changed();
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::TriggerDetected { query, .. } if query == "proj"
    )));

    let events = engine.accept_reference("Projects", projects);
    apply_all(&mut editor, &events);

    let content = &editor.tree().get(note).unwrap().content;
    assert_eq!(*content, format!("see [Projects](node://{projects})"));
    // the reference renders as its title with syntax hidden
    assert_eq!(treeline_engine::render(content).text, "see Projects");
}

#[test]
fn arrow_navigation_tracks_visual_columns() {
    let mut tree = NodeTree::new();
    let header = tree.push_root(Node::bullet("# Heading"));
    let plain = tree.push_root(Node::bullet("plain text below"));
    let mut editor = OutlineEditor::new(tree);
    let mut engine = focused_engine(&editor, header);

    // leave the header from character 4; h1 glyphs are twice as wide
    engine.surface_mut().set_selection(4..4);
    let outcome = engine.handle_key(KeyEvent::plain(Key::ArrowDown));
    let focus = apply_all(&mut editor, &outcome.events).unwrap();

    assert_eq!(focus.node, plain);
    assert_eq!(focus.offset_in(editor.tree()), 8);
}

#[test]
fn arrow_up_at_the_top_changes_nothing() {
    let (mut editor, id) = OutlineEditor::with_single_node("only");
    let mut engine = focused_engine(&editor, id);

    let outcome = engine.handle_key(KeyEvent::plain(Key::ArrowUp));
    assert!(outcome.consumed);
    let focus = apply_all(&mut editor, &outcome.events);
    assert!(focus.is_none());
    assert_eq!(editor.tree().len(), 1);
}

#[test]
fn collapsed_subtree_is_skipped_when_merging() {
    let mut tree = NodeTree::new();
    let parent = tree.push_root(Node::bullet("parent"));
    let hidden = tree.push_root(Node::bullet("hidden"));
    let after = tree.push_root(Node::bullet("after"));
    tree.reparent_as_last_child(hidden, parent);
    tree.set_expanded(parent, false);
    let mut editor = OutlineEditor::new(tree);
    let mut engine = focused_engine(&editor, after);

    engine.surface_mut().set_selection(0..0);
    let outcome = engine.handle_key(KeyEvent::plain(Key::Backspace));
    let focus = apply_all(&mut editor, &outcome.events).unwrap();

    // the previous *visible* node is the collapsed parent, not its child
    assert_eq!(focus.node, parent);
    assert_eq!(editor.tree().get(parent).unwrap().content, "parentafter");
}

#[test]
fn full_editing_session_round_trip() {
    let (mut editor, id) = OutlineEditor::with_single_node("plan");
    let mut engine = focused_engine(&editor, id);

    // type bold markup, commit through blur
    engine.surface_mut().set_text("plan **today**");
    engine.surface_mut().set_selection(14..14);
    let events = engine.handle_text_changed();
    apply_all(&mut editor, &events);
    let events = engine.handle_blur();
    apply_all(&mut editor, &events);

    assert_eq!(editor.tree().get(id).unwrap().content, "plan **today**");
    assert_eq!(engine.surface().text(), "plan today");

    // focus again by pointer: offset resolves against the formatted text
    let events = engine.handle_pointer_down(treeline_engine::Point { x: 0.0, y: 0.0 });
    apply_all(&mut editor, &events);
    engine.poll_deferred();
    assert_eq!(engine.surface().text(), "plan **today**");
    assert!(engine.is_editing());
}

#[test]
fn navigate_events_do_not_mutate_the_tree() {
    let mut tree = NodeTree::new();
    let a = tree.push_root(Node::bullet("a"));
    let b = tree.push_root(Node::bullet("b"));
    let mut editor = OutlineEditor::new(tree);
    let before = editor.tree().clone();

    editor.handle_event(&EngineEvent::NavigateArrow {
        node: a,
        direction: ArrowDirection::Down,
        char_offset: 0,
    });
    assert_eq!(*editor.tree(), before);
    let _ = b;
}

#[test]
fn divider_nodes_never_gain_children_across_operations() {
    let mut tree = NodeTree::new();
    let divider = tree.push_root(Node::new(NodeType::Divider, ""));
    let below = tree.push_root(Node::bullet("text"));
    let mut editor = OutlineEditor::new(tree);

    // indent would make `below` a child of the divider; it must no-op
    let focus = editor.handle_event(&EngineEvent::IndentNode { node: below });
    assert!(focus.is_none());
    assert!(editor.tree().get(divider).unwrap().children.is_empty());
    assert_eq!(editor.tree().roots(), &[divider, below]);
}
