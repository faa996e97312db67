//! The per-node text engine.
//!
//! One engine owns one editable surface and is the sole writer of its
//! rendered content. While idle the surface shows the formatted form with
//! syntax hidden; focusing swaps in the raw canonical text. All entry
//! points run synchronously inside one input event and return the events
//! they emit; caret work that must land after the host commits surface
//! effects is parked until [`TextEngine::poll_deferred`].

use crate::editing::cursor;
use crate::editing::split;
use crate::editing::surface::{EditableSurface, Key, KeyEvent, Point};
use crate::editing::trigger;
use crate::events::{ArrowDirection, EngineEvent};
use crate::formatting;
use crate::markup::{self, FormatType};
use crate::tree::{NodeId, NodeType};

/// Transient per-focus state. Not persisted.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    pub is_editing: bool,
    /// Snapshot of canonical markup at focus time, to avoid redundant
    /// writes on blur.
    pub original_content: String,
    pub current_header_level: u8,
    /// A pointer coordinate awaiting resolution against the rendered text.
    pub pending_caret_hint: Option<Point>,
    /// Reentrancy guard: an external update arriving while set is dropped.
    updating: bool,
}

/// What a key handler did with the event.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyOutcome {
    /// True when the engine handled the key and the host must suppress the
    /// surface's default behavior.
    pub consumed: bool,
    pub events: Vec<EngineEvent>,
}

impl KeyOutcome {
    fn consumed(events: Vec<EngineEvent>) -> Self {
        Self {
            consumed: true,
            events,
        }
    }

    fn ignored() -> Self {
        Self {
            consumed: false,
            events: Vec::new(),
        }
    }
}

pub struct TextEngine<S: EditableSurface> {
    node: NodeId,
    node_type: NodeType,
    /// Canonical markup, the single source of truth.
    content: String,
    session: EditSession,
    trigger_shown: bool,
    /// Canonical caret offset waiting to be applied after the host commits.
    pending_caret: Option<usize>,
    surface: S,
}

impl<S: EditableSurface> TextEngine<S> {
    pub fn new(node: NodeId, node_type: NodeType, content: impl Into<String>, surface: S) -> Self {
        let content = content.into();
        Self {
            node,
            node_type,
            content,
            session: EditSession::default(),
            trigger_shown: false,
            pending_caret: None,
            surface,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_editing
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Show initial content: raw and focused, or formatted-only.
    pub fn initialize(&mut self, auto_focus: bool) -> Vec<EngineEvent> {
        if auto_focus {
            self.enter_edit_mode(self.content.len())
        } else {
            self.show_formatted();
            Vec::new()
        }
    }

    /// External sync path. No-ops when nothing changed or an input event is
    /// mid-flight; the in-flight keystroke's result supersedes it.
    pub fn update_content(&mut self, content: &str) {
        if self.session.updating || content == self.content {
            return;
        }
        self.content = content.to_string();
        if self.session.is_editing {
            self.session.original_content = self.content.clone();
            self.session.current_header_level = markup::header_level(&self.content);
            let selection = self.surface.selection();
            self.surface.set_text(&self.content);
            self.surface.set_selection(selection);
        } else {
            self.show_formatted();
        }
    }

    /// Focus by click. The pointer must be resolved against the rendered
    /// text before the raw form is substituted; resolving after the swap
    /// yields wrong offsets.
    pub fn handle_pointer_down(&mut self, point: Point) -> Vec<EngineEvent> {
        if self.session.is_editing {
            return Vec::new();
        }
        self.session.pending_caret_hint = Some(point);
        if self.session.updating {
            return Vec::new();
        }
        self.resolve_caret_hint()
    }

    /// Programmatic focus with a canonical caret offset.
    pub fn focus_at(&mut self, caret: usize) -> Vec<EngineEvent> {
        if self.session.is_editing {
            let caret = caret.min(self.surface.text().len());
            self.surface.set_selection(caret..caret);
            return Vec::new();
        }
        self.enter_edit_mode(caret)
    }

    /// Commit the raw text and fall back to the formatted form.
    pub fn handle_blur(&mut self) -> Vec<EngineEvent> {
        if !self.session.is_editing {
            return Vec::new();
        }
        self.session.updating = true;
        self.content = self.surface.text();
        self.session.is_editing = false;
        self.show_formatted();
        self.session.updating = false;

        let mut events = Vec::new();
        if self.trigger_shown {
            self.trigger_shown = false;
            events.push(EngineEvent::TriggerHidden { node: self.node });
        }
        if self.content != self.session.original_content {
            events.push(EngineEvent::ContentChanged {
                node: self.node,
                content: self.content.clone(),
            });
        }
        let level = markup::header_level(&self.content);
        if level != self.session.current_header_level {
            self.session.current_header_level = level;
            events.push(EngineEvent::HeaderLevelChanged {
                node: self.node,
                level,
            });
        }
        events.push(EngineEvent::Blurred { node: self.node });
        events
    }

    /// The surface's text changed through plain typing.
    pub fn handle_text_changed(&mut self) -> Vec<EngineEvent> {
        if !self.session.is_editing {
            return Vec::new();
        }
        self.session.updating = true;
        let mut events = self.capture_surface_text();

        // trigger detection runs on every edit
        let caret = self.surface.selection().end;
        match trigger::detect(&self.content, caret) {
            Some(context) => {
                self.trigger_shown = true;
                events.push(EngineEvent::TriggerDetected {
                    node: self.node,
                    query: context.query,
                    caret: self.surface.caret_rect().unwrap_or_default(),
                });
            }
            None => {
                if self.trigger_shown {
                    self.trigger_shown = false;
                    events.push(EngineEvent::TriggerHidden { node: self.node });
                }
            }
        }
        self.session.updating = false;
        events
    }

    pub fn handle_key(&mut self, event: KeyEvent) -> KeyOutcome {
        if !self.session.is_editing {
            return KeyOutcome::ignored();
        }
        match event.key {
            Key::Enter if event.shift => self.insert_newline(),
            Key::Enter => self.split_on_enter(),
            Key::Backspace => self.backspace_at_boundary(),
            Key::Tab => {
                let mut events = self.capture_surface_text();
                events.push(if event.shift {
                    EngineEvent::OutdentNode { node: self.node }
                } else {
                    EngineEvent::IndentNode { node: self.node }
                });
                KeyOutcome::consumed(events)
            }
            Key::Escape => KeyOutcome::consumed(self.handle_blur()),
            Key::ArrowUp => self.arrow(ArrowDirection::Up),
            Key::ArrowDown => self.arrow(ArrowDirection::Down),
            Key::Char(c) if event.modifier => self.toggle_shortcut(c),
            Key::Char(_) => KeyOutcome::ignored(),
        }
    }

    /// The host accepted a mention candidate: rewrite the trigger span to a
    /// node reference token.
    pub fn accept_reference(&mut self, title: &str, target: NodeId) -> Vec<EngineEvent> {
        if !self.session.is_editing {
            return Vec::new();
        }
        let text = self.surface.text();
        let caret = self.surface.selection().end;
        let Some(context) = trigger::detect(&text, caret) else {
            return Vec::new();
        };
        let (new_text, new_caret) = trigger::accept(&text, &context, title, target);
        self.content = new_text;
        self.surface.set_text(&self.content);
        self.surface.set_selection(new_caret..new_caret);
        self.trigger_shown = false;
        vec![
            EngineEvent::NodeReferenceSelected {
                node: self.node,
                target,
            },
            EngineEvent::ContentChanged {
                node: self.node,
                content: self.content.clone(),
            },
            EngineEvent::TriggerHidden { node: self.node },
        ]
    }

    /// Run caret work parked until after the host committed surface
    /// effects. Re-validated against the reentrancy guard.
    pub fn poll_deferred(&mut self) -> Vec<EngineEvent> {
        if self.session.updating {
            return Vec::new();
        }
        let events = self.resolve_caret_hint();
        if let Some(caret) = self.pending_caret.take()
            && self.session.is_editing
        {
            let caret = caret.min(self.surface.text().len());
            self.surface.set_selection(caret..caret);
        }
        events
    }

    // ============ Internals ============

    fn show_formatted(&mut self) {
        self.surface.set_text(&markup::render(&self.content).text);
    }

    fn enter_edit_mode(&mut self, caret: usize) -> Vec<EngineEvent> {
        self.session.is_editing = true;
        self.session.original_content = self.content.clone();
        self.session.current_header_level = markup::header_level(&self.content);
        self.surface.set_text(&self.content);
        self.pending_caret = Some(caret.min(self.content.len()));
        vec![EngineEvent::Focused { node: self.node }]
    }

    fn resolve_caret_hint(&mut self) -> Vec<EngineEvent> {
        let Some(point) = self.session.pending_caret_hint.take() else {
            return Vec::new();
        };
        let caret = match self.surface.offset_at_point(point) {
            Some(offset) => cursor::rendered_to_canonical(&self.content, offset),
            None => self.content.len(),
        };
        self.enter_edit_mode(caret)
    }

    /// Pull the surface's text into the canonical content.
    fn capture_surface_text(&mut self) -> Vec<EngineEvent> {
        let text = self.surface.text();
        if text == self.content {
            return Vec::new();
        }
        self.content = text;
        let mut events = vec![EngineEvent::ContentChanged {
            node: self.node,
            content: self.content.clone(),
        }];
        let level = markup::header_level(&self.content);
        if level != self.session.current_header_level {
            self.session.current_header_level = level;
            events.push(EngineEvent::HeaderLevelChanged {
                node: self.node,
                level,
            });
        }
        events
    }

    fn split_on_enter(&mut self) -> KeyOutcome {
        let mut events = self.capture_surface_text();
        let offset = self.surface.selection().start;

        if offset == 0 {
            events.push(EngineEvent::CreateNodeAbove { node: self.node });
            return KeyOutcome::consumed(events);
        }

        let result = split::split_at(&self.content, offset);
        self.content = result.before;
        self.surface.set_text(&self.content);
        events.push(EngineEvent::ContentChanged {
            node: self.node,
            content: self.content.clone(),
        });
        events.push(EngineEvent::CreateNode {
            node: self.node,
            content: result.after,
            caret: result.caret,
        });
        KeyOutcome::consumed(events)
    }

    fn insert_newline(&mut self) -> KeyOutcome {
        if !self.node_type.is_multiline() {
            // swallowed so the surface doesn't split the line itself
            return KeyOutcome::consumed(Vec::new());
        }
        let selection = self.surface.selection();
        let mut text = self.surface.text();
        text.replace_range(selection.clone(), "\n");
        self.surface.set_text(&text);
        let caret = selection.start + 1;
        self.surface.set_selection(caret..caret);
        KeyOutcome::consumed(self.capture_surface_text())
    }

    fn backspace_at_boundary(&mut self) -> KeyOutcome {
        let selection = self.surface.selection();
        if selection != (0..0) {
            return KeyOutcome::ignored();
        }
        let mut events = self.capture_surface_text();
        if self.content.is_empty() {
            events.push(EngineEvent::DeleteNode { node: self.node });
        } else {
            events.push(EngineEvent::CombineWithPrevious {
                node: self.node,
                content: self.content.clone(),
            });
        }
        KeyOutcome::consumed(events)
    }

    fn arrow(&mut self, direction: ArrowDirection) -> KeyOutcome {
        let text = self.surface.text();
        let caret = self.surface.selection().end.min(text.len());
        let line_start = text[..caret].rfind('\n').map(|i| i + 1).unwrap_or(0);

        // only cross the node boundary from the first or last line
        let at_boundary = match direction {
            ArrowDirection::Up => line_start == 0,
            ArrowDirection::Down => !text[caret..].contains('\n'),
        };
        if !at_boundary {
            return KeyOutcome::ignored();
        }

        let char_offset = text[line_start..caret].chars().count();
        KeyOutcome::consumed(vec![EngineEvent::NavigateArrow {
            node: self.node,
            direction,
            char_offset,
        }])
    }

    fn toggle_shortcut(&mut self, c: char) -> KeyOutcome {
        let format = match c.to_ascii_lowercase() {
            'b' => FormatType::Bold,
            'i' => FormatType::Italic,
            'u' => FormatType::Underline,
            _ => return KeyOutcome::ignored(),
        };
        let text = self.surface.text();
        // a double-click selection may have grabbed the markers themselves
        let selection = formatting::shrink_selection(&text, self.surface.selection());
        let result = formatting::toggle(&text, selection, format);
        self.content = result.text;
        self.surface.set_text(&self.content);
        self.surface.set_selection(result.selection);
        KeyOutcome::consumed(vec![EngineEvent::ContentChanged {
            node: self.node,
            content: self.content.clone(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::surface::HeadlessSurface;
    use pretty_assertions::assert_eq;

    fn engine(content: &str) -> TextEngine<HeadlessSurface> {
        TextEngine::new(
            NodeId::new(),
            NodeType::Bullet,
            content,
            HeadlessSurface::new(),
        )
    }

    fn editing_engine(content: &str) -> TextEngine<HeadlessSurface> {
        let mut engine = engine(content);
        engine.initialize(true);
        engine.poll_deferred();
        engine
    }

    fn type_text(engine: &mut TextEngine<HeadlessSurface>, text: &str) -> Vec<EngineEvent> {
        engine.surface_mut().set_text(text);
        let caret = text.len();
        engine.surface_mut().set_selection(caret..caret);
        engine.handle_text_changed()
    }

    // ============ Initialization and focus ============

    #[test]
    fn initialize_idle_shows_formatted_text() {
        let mut engine = engine("a **b** c");
        engine.initialize(false);
        assert_eq!(engine.surface().text(), "a b c");
        assert!(!engine.is_editing());
    }

    #[test]
    fn initialize_focused_shows_raw_text() {
        let mut engine = engine("a **b** c");
        let events = engine.initialize(true);
        assert_eq!(engine.surface().text(), "a **b** c");
        assert!(engine.is_editing());
        assert!(matches!(events[0], EngineEvent::Focused { .. }));
    }

    #[test]
    fn pointer_down_resolves_before_raw_swap() {
        // formatted "bold" shown; click after "bo" (x = 2 cells) must land
        // between "bo" and "ld" in the raw text, past the opening marker
        let mut engine = engine("**bold**");
        engine.initialize(false);
        let events = engine.handle_pointer_down(Point { x: 16.0, y: 0.0 });
        assert!(matches!(events[0], EngineEvent::Focused { .. }));
        assert_eq!(engine.surface().text(), "**bold**");

        engine.poll_deferred();
        assert_eq!(engine.surface().selection(), 4..4);
    }

    #[test]
    fn pointer_resolution_failure_falls_back_to_end() {
        let mut engine = engine("# Title");
        engine.initialize(false);
        engine.surface_mut().resolution_unavailable = true;
        engine.handle_pointer_down(Point { x: 3.0, y: 0.0 });
        engine.poll_deferred();
        assert_eq!(engine.surface().selection(), 7..7);
    }

    #[test]
    fn blur_commits_and_reformats() {
        let mut engine = editing_engine("old");
        type_text(&mut engine, "**new**");
        let events = engine.handle_blur();

        assert_eq!(engine.content(), "**new**");
        assert_eq!(engine.surface().text(), "new");
        assert!(!engine.is_editing());
        assert!(
            events
                .iter()
                .any(|e| matches!(e, EngineEvent::Blurred { .. }))
        );
    }

    #[test]
    fn blur_without_changes_only_blurs() {
        let mut engine = editing_engine("same");
        let events = engine.handle_blur();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], EngineEvent::Blurred { .. }));
    }

    // ============ External sync ============

    #[test]
    fn update_content_is_noop_for_identical_content() {
        let mut engine = engine("same");
        engine.initialize(false);
        engine.update_content("same");
        assert_eq!(engine.surface().text(), "same");
    }

    #[test]
    fn update_content_rerenders_idle_surface() {
        let mut engine = engine("old");
        engine.initialize(false);
        engine.update_content("**new**");
        assert_eq!(engine.content(), "**new**");
        assert_eq!(engine.surface().text(), "new");
    }

    #[test]
    fn update_content_keeps_raw_text_while_editing() {
        let mut engine = editing_engine("old");
        engine.update_content("**new**");
        assert_eq!(engine.surface().text(), "**new**");
    }

    // ============ Text change and triggers ============

    #[test]
    fn text_change_emits_content_changed() {
        let mut engine = editing_engine("a");
        let events = type_text(&mut engine, "ab");
        assert_eq!(
            events,
            vec![EngineEvent::ContentChanged {
                node: engine.node(),
                content: "ab".to_string(),
            }]
        );
    }

    #[test]
    fn header_level_change_is_reported() {
        let mut engine = editing_engine("Title");
        let events = type_text(&mut engine, "# Title");
        assert!(events.contains(&EngineEvent::HeaderLevelChanged {
            node: engine.node(),
            level: 1,
        }));
    }

    #[test]
    fn typing_a_trigger_reports_the_query() {
        let mut engine = editing_engine("");
        let events = type_text(&mut engine, "@proj");
        assert!(events.iter().any(|e| matches!(
            e,
            EngineEvent::TriggerDetected { query, .. } if query == "proj"
        )));
    }

    #[test]
    fn a_space_hides_the_trigger() {
        let mut engine = editing_engine("");
        type_text(&mut engine, "@proj");
        let events = type_text(&mut engine, "@proj ");
        assert!(
            events
                .iter()
                .any(|e| matches!(e, EngineEvent::TriggerHidden { .. }))
        );
    }

    #[test]
    fn trigger_hidden_is_not_repeated() {
        let mut engine = editing_engine("");
        let events = type_text(&mut engine, "plain");
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, EngineEvent::TriggerHidden { .. }))
        );
    }

    #[test]
    fn accepting_a_reference_rewrites_the_span() {
        let mut engine = editing_engine("");
        type_text(&mut engine, "see @proj");
        let target = NodeId::new();
        let events = engine.accept_reference("Projects", target);

        assert_eq!(
            engine.content(),
            format!("see [Projects](node://{target})")
        );
        assert!(events.iter().any(|e| matches!(
            e,
            EngineEvent::NodeReferenceSelected { target: t, .. } if *t == target
        )));
    }

    // ============ Keyboard surface ============

    #[test]
    fn enter_splits_and_requests_a_new_node() {
        let mut engine = editing_engine("# Title");
        engine.surface_mut().set_selection(7..7);
        let outcome = engine.handle_key(KeyEvent::plain(Key::Enter));

        assert!(outcome.consumed);
        assert_eq!(engine.content(), "# Title");
        assert!(outcome.events.contains(&EngineEvent::CreateNode {
            node: engine.node(),
            content: "# ".to_string(),
            caret: 2,
        }));
    }

    #[test]
    fn enter_with_open_emphasis_carries_it_over() {
        let mut engine = editing_engine("**bold text");
        engine.surface_mut().set_selection(6..6);
        let outcome = engine.handle_key(KeyEvent::plain(Key::Enter));

        assert_eq!(engine.content(), "**bold**");
        assert!(outcome.events.contains(&EngineEvent::CreateNode {
            node: engine.node(),
            content: "** text".to_string(),
            caret: 2,
        }));
    }

    #[test]
    fn enter_at_offset_zero_creates_a_sibling_above() {
        let mut engine = editing_engine("keep me");
        engine.surface_mut().set_selection(0..0);
        let outcome = engine.handle_key(KeyEvent::plain(Key::Enter));

        assert_eq!(engine.content(), "keep me");
        assert_eq!(
            outcome.events,
            vec![EngineEvent::CreateNodeAbove {
                node: engine.node()
            }]
        );
    }

    #[test]
    fn shift_enter_inserts_newline_in_multiline_nodes() {
        let mut engine = TextEngine::new(
            NodeId::new(),
            NodeType::Note,
            "ab",
            HeadlessSurface::new(),
        );
        engine.initialize(true);
        engine.poll_deferred();
        engine.surface_mut().set_selection(1..1);
        let outcome = engine.handle_key(KeyEvent::shifted(Key::Enter));

        assert!(outcome.consumed);
        assert_eq!(engine.content(), "a\nb");
    }

    #[test]
    fn shift_enter_is_swallowed_for_single_line_nodes() {
        let mut engine = editing_engine("ab");
        let outcome = engine.handle_key(KeyEvent::shifted(Key::Enter));
        assert!(outcome.consumed);
        assert_eq!(engine.content(), "ab");
    }

    #[test]
    fn backspace_at_start_merges_with_previous() {
        let mut engine = editing_engine("tail");
        engine.surface_mut().set_selection(0..0);
        let outcome = engine.handle_key(KeyEvent::plain(Key::Backspace));

        assert!(outcome.consumed);
        assert_eq!(
            outcome.events,
            vec![EngineEvent::CombineWithPrevious {
                node: engine.node(),
                content: "tail".to_string(),
            }]
        );
    }

    #[test]
    fn backspace_on_empty_node_deletes_it() {
        let mut engine = editing_engine("");
        let outcome = engine.handle_key(KeyEvent::plain(Key::Backspace));
        assert_eq!(
            outcome.events,
            vec![EngineEvent::DeleteNode {
                node: engine.node()
            }]
        );
    }

    #[test]
    fn backspace_mid_text_is_left_to_the_surface() {
        let mut engine = editing_engine("text");
        engine.surface_mut().set_selection(2..2);
        let outcome = engine.handle_key(KeyEvent::plain(Key::Backspace));
        assert!(!outcome.consumed);
        assert!(outcome.events.is_empty());
    }

    #[test]
    fn tab_requests_indent_and_shift_tab_outdent() {
        let mut engine = editing_engine("x");
        let indent = engine.handle_key(KeyEvent::plain(Key::Tab));
        assert_eq!(
            indent.events,
            vec![EngineEvent::IndentNode {
                node: engine.node()
            }]
        );
        let outdent = engine.handle_key(KeyEvent::shifted(Key::Tab));
        assert_eq!(
            outdent.events,
            vec![EngineEvent::OutdentNode {
                node: engine.node()
            }]
        );
    }

    #[test]
    fn arrows_report_the_column_as_char_offset() {
        let mut engine = editing_engine("hello");
        engine.surface_mut().set_selection(3..3);
        let outcome = engine.handle_key(KeyEvent::plain(Key::ArrowUp));
        assert_eq!(
            outcome.events,
            vec![EngineEvent::NavigateArrow {
                node: engine.node(),
                direction: ArrowDirection::Up,
                char_offset: 3,
            }]
        );
    }

    #[test]
    fn arrow_down_inside_multiline_text_stays_local() {
        let mut engine = TextEngine::new(
            NodeId::new(),
            NodeType::Note,
            "line one\nline two",
            HeadlessSurface::new(),
        );
        engine.initialize(true);
        engine.poll_deferred();
        engine.surface_mut().set_selection(2..2);
        let outcome = engine.handle_key(KeyEvent::plain(Key::ArrowDown));
        assert!(!outcome.consumed);

        // from the last line it crosses the boundary
        engine.surface_mut().set_selection(12..12);
        let outcome = engine.handle_key(KeyEvent::plain(Key::ArrowDown));
        assert!(outcome.consumed);
    }

    #[test]
    fn escape_blurs() {
        let mut engine = editing_engine("x");
        let outcome = engine.handle_key(KeyEvent::plain(Key::Escape));
        assert!(outcome.consumed);
        assert!(!engine.is_editing());
    }

    // ============ Toggle shortcuts ============

    #[test]
    fn ctrl_b_removes_the_enclosing_bold_layer() {
        let mut engine = editing_engine("You are **great**");
        engine.surface_mut().set_selection(15..15);
        let outcome = engine.handle_key(KeyEvent::with_modifier(Key::Char('b')));

        assert_eq!(engine.content(), "You are great");
        assert!(outcome.consumed);
    }

    #[test]
    fn ctrl_b_wraps_a_plain_selection() {
        let mut engine = editing_engine("hello world");
        engine.surface_mut().set_selection(0..5);
        engine.handle_key(KeyEvent::with_modifier(Key::Char('b')));

        assert_eq!(engine.content(), "**hello** world");
        assert_eq!(engine.surface().selection(), 2..7);
    }

    #[test]
    fn double_click_selection_with_markers_still_toggles_off() {
        let mut engine = editing_engine("__word__");
        engine.surface_mut().set_selection(0..8);
        engine.handle_key(KeyEvent::with_modifier(Key::Char('b')));

        assert_eq!(engine.content(), "word");
        assert_eq!(engine.surface().selection(), 0..4);
    }

    #[test]
    fn ctrl_u_then_ctrl_u_round_trips() {
        let mut engine = editing_engine("plain");
        engine.surface_mut().set_selection(0..5);
        engine.handle_key(KeyEvent::with_modifier(Key::Char('u')));
        assert_eq!(engine.content(), "~plain~");
        engine.handle_key(KeyEvent::with_modifier(Key::Char('u')));
        assert_eq!(engine.content(), "plain");
    }

    #[test]
    fn unmodified_characters_are_ignored() {
        let mut engine = editing_engine("x");
        let outcome = engine.handle_key(KeyEvent::plain(Key::Char('b')));
        assert!(!outcome.consumed);
    }

    #[test]
    fn keys_do_nothing_while_idle() {
        let mut engine = engine("x");
        engine.initialize(false);
        let outcome = engine.handle_key(KeyEvent::plain(Key::Enter));
        assert!(!outcome.consumed);
        assert!(outcome.events.is_empty());
    }
}
