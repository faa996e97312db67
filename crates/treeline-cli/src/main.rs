use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::{env, io::stdout, path::PathBuf, process};
use treeline_config::Config;
use treeline_engine::{
    EditableSurface, EngineEvent, FocusRequest, HeadlessSurface, Key, KeyEvent as EngineKeyEvent, NodeId,
    OutlineEditor, Point, TextEngine, VisibleNode, markup,
    tree::{self, Node},
};

struct App {
    editor: OutlineEditor,
    outline_path: PathBuf,
    autosave: bool,
    visible: Vec<VisibleNode>,
    list_state: ListState,
    engine: Option<TextEngine<HeadlessSurface>>,
    trigger_query: Option<String>,
    status: String,
}

impl App {
    fn new(outline_path: PathBuf, autosave: bool) -> Result<Self> {
        let source = std::fs::read_to_string(&outline_path).unwrap_or_default();
        let mut tree = tree::parse_outline(&source)?;
        if tree.is_empty() {
            tree.push_root(Node::bullet(""));
        }

        let editor = OutlineEditor::new(tree);
        let mut app = Self {
            editor,
            outline_path,
            autosave,
            visible: Vec::new(),
            list_state: ListState::default(),
            engine: None,
            trigger_query: None,
            status: String::new(),
        };
        app.refresh_visible();
        app.list_state.select(Some(0));
        Ok(app)
    }

    fn refresh_visible(&mut self) {
        self.visible = self.editor.tree().flatten_visible();
        if self.visible.is_empty() {
            self.editor.tree_mut().push_root(Node::bullet(""));
            self.visible = self.editor.tree().flatten_visible();
        }
        if let Some(selected) = self.list_state.selected()
            && selected >= self.visible.len()
        {
            self.list_state.select(Some(self.visible.len() - 1));
        }
    }

    fn selected_node(&self) -> Option<NodeId> {
        self.visible
            .get(self.list_state.selected()?)
            .map(|v| v.id)
    }

    fn next_node(&mut self) {
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % self.visible.len(),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    fn previous_node(&mut self) {
        let i = match self.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.visible.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Route engine events through the outline editor and chase the focus
    /// request it answers with.
    fn apply_engine_events(&mut self, events: Vec<EngineEvent>) {
        let mut focus = None;
        for event in &events {
            match event {
                EngineEvent::TriggerDetected { query, .. } => {
                    self.trigger_query = Some(query.clone());
                }
                EngineEvent::TriggerHidden { .. } => self.trigger_query = None,
                _ => {}
            }
            if let Some(request) = self.editor.handle_event(event) {
                focus = Some(request);
            }
        }
        self.refresh_visible();
        if let Some(request) = focus {
            self.focus_node(request);
        }
    }

    fn focus_node(&mut self, request: FocusRequest) {
        let offset = request.offset_in(self.editor.tree());
        if let Some(engine) = self.engine.as_mut()
            && engine.node() == request.node
        {
            engine.focus_at(offset);
        } else {
            self.start_editing_at(request.node, offset);
        }
        if let Some(index) = self.visible.iter().position(|v| v.id == request.node) {
            self.list_state.select(Some(index));
        }
    }

    fn start_editing_at(&mut self, id: NodeId, offset: usize) {
        let Some(node) = self.editor.tree().get(id) else {
            return;
        };
        let mut engine = TextEngine::new(
            id,
            node.node_type,
            node.content.clone(),
            HeadlessSurface::new(),
        );
        engine.initialize(true);
        engine.poll_deferred();
        engine.focus_at(offset);
        self.engine = Some(engine);
    }

    fn start_editing_by_click(&mut self, id: NodeId, column: usize) {
        let Some(node) = self.editor.tree().get(id) else {
            return;
        };
        let mut engine = TextEngine::new(
            id,
            node.node_type,
            node.content.clone(),
            HeadlessSurface::new(),
        );
        // show the formatted text first so the click resolves against it
        engine.initialize(false);
        let cell = engine.surface().cell_width;
        let events = engine.handle_pointer_down(Point {
            x: column as f32 * cell,
            y: 0.0,
        });
        engine.poll_deferred();
        self.engine = Some(engine);
        self.apply_engine_events(events);
    }

    fn stop_editing(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            let events = engine.handle_blur();
            self.apply_engine_events(events);
            if self.autosave
                && let Err(e) = self.save()
            {
                self.status = format!("Save failed: {e}");
            }
        }
    }

    fn save(&mut self) -> Result<()> {
        let text = tree::format_outline(self.editor.tree());
        std::fs::write(&self.outline_path, text)?;
        self.status = format!("Saved {}", self.outline_path.display());
        Ok(())
    }

    /// Accept the current mention query against the first node whose
    /// rendered text matches it.
    fn accept_trigger(&mut self) {
        let Some(query) = self.trigger_query.clone() else {
            return;
        };
        let lowered = query.to_lowercase();
        let candidate = self
            .editor
            .tree()
            .flatten_visible()
            .iter()
            .map(|v| v.id)
            .find(|&id| {
                self.editor
                    .tree()
                    .get(id)
                    .map(|n| {
                        markup::render(&n.content)
                            .text
                            .to_lowercase()
                            .contains(&lowered)
                    })
                    .unwrap_or(false)
            });

        if let Some(target) = candidate
            && let Some(node) = self.editor.tree().get(target)
        {
            let title = markup::render(&node.content).text;
            if let Some(engine) = self.engine.as_mut() {
                let events = engine.accept_reference(&title, target);
                self.apply_engine_events(events);
            }
        } else {
            self.status = format!("No node matches @{query}");
        }
    }

    fn handle_edit_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        let shift = modifiers.contains(KeyModifiers::SHIFT);

        if ctrl && code == KeyCode::Char('l') {
            self.accept_trigger();
            return;
        }

        let engine_event = match code {
            KeyCode::Enter => Some(EngineKeyEvent {
                key: Key::Enter,
                shift,
                modifier: ctrl,
            }),
            KeyCode::Backspace => Some(EngineKeyEvent::plain(Key::Backspace)),
            KeyCode::Tab => Some(EngineKeyEvent::plain(Key::Tab)),
            KeyCode::BackTab => Some(EngineKeyEvent::shifted(Key::Tab)),
            KeyCode::Esc => Some(EngineKeyEvent::plain(Key::Escape)),
            KeyCode::Up => Some(EngineKeyEvent::plain(Key::ArrowUp)),
            KeyCode::Down => Some(EngineKeyEvent::plain(Key::ArrowDown)),
            KeyCode::Char(c) if ctrl => Some(EngineKeyEvent::with_modifier(Key::Char(c))),
            _ => None,
        };

        if let Some(event) = engine_event {
            let escape = event.key == Key::Escape;
            let Some(engine) = self.engine.as_mut() else {
                return;
            };
            let outcome = engine.handle_key(event);
            if escape {
                self.engine = None;
            }
            let consumed = outcome.consumed;
            self.apply_engine_events(outcome.events);
            if consumed || escape {
                if escape && self.autosave {
                    let _ = self.save();
                }
                return;
            }
        }

        // plain typing and deletion the surface applies itself
        match code {
            KeyCode::Char(c) if !ctrl => self.insert_char(c),
            KeyCode::Backspace => self.delete_backward(),
            KeyCode::Left => self.move_caret(-1),
            KeyCode::Right => self.move_caret(1),
            _ => {}
        }
    }

    fn insert_char(&mut self, c: char) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let selection = engine.surface().selection();
        let mut text = engine.surface().text();
        text.replace_range(selection.clone(), &c.to_string());
        engine.surface_mut().set_text(&text);
        let caret = selection.start + c.len_utf8();
        engine.surface_mut().set_selection(caret..caret);
        let events = engine.handle_text_changed();
        self.apply_engine_events(events);
    }

    fn delete_backward(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let selection = engine.surface().selection();
        let mut text = engine.surface().text();
        let (start, end) = if selection.start == selection.end {
            let prev = text[..selection.start]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
            (prev, selection.start)
        } else {
            (selection.start, selection.end)
        };
        text.replace_range(start..end, "");
        engine.surface_mut().set_text(&text);
        engine.surface_mut().set_selection(start..start);
        let events = engine.handle_text_changed();
        self.apply_engine_events(events);
    }

    fn move_caret(&mut self, delta: i32) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let text = engine.surface().text();
        let caret = engine.surface().selection().end;
        let new_caret = if delta < 0 {
            text[..caret]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0)
        } else {
            text[caret..]
                .chars()
                .next()
                .map(|ch| caret + ch.len_utf8())
                .unwrap_or(caret)
        };
        engine.surface_mut().set_selection(new_caret..new_caret);
    }

    fn handle_browse_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Down | KeyCode::Char('j') => self.next_node(),
            KeyCode::Up | KeyCode::Char('k') => self.previous_node(),
            KeyCode::Char(' ') => {
                if let Some(id) = self.selected_node() {
                    self.editor.tree_mut().toggle_expanded(id);
                    self.refresh_visible();
                }
            }
            KeyCode::Char('s') => {
                if let Err(e) = self.save() {
                    self.status = format!("Save failed: {e}");
                }
            }
            KeyCode::Enter | KeyCode::Char('i') => {
                if let Some(id) = self.selected_node() {
                    let end = self
                        .editor
                        .tree()
                        .get(id)
                        .map(|n| n.content.len())
                        .unwrap_or(0);
                    self.start_editing_at(id, end);
                }
            }
            _ => {}
        }
        false
    }
}

fn main() -> Result<()> {
    // Determine outline path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    if args.len() == 3 && args[1] == "--export-html" {
        return export_html(&args[2]);
    }

    let outline_path;
    let mut autosave = true;

    if args.len() == 2 {
        outline_path = PathBuf::from(&args[1]);
    } else if args.len() == 1 {
        match Config::load() {
            Ok(Some(config)) => {
                outline_path = config.outline_path;
                autosave = config.autosave_on_blur;
            }
            Ok(None) => {
                eprintln!("Error: No outline path provided and no config file found");
                eprintln!("Usage: {} <outline-file>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: Failed to load config file: {e}");
                eprintln!("Usage: {} <outline-file>", args[0]);
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [outline-file]", args[0]);
        process::exit(1);
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(outline_path, autosave)?;
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Print the visible outline as HTML, one element per node.
fn export_html(path: &str) -> Result<()> {
    let source = std::fs::read_to_string(path)?;
    let tree = tree::parse_outline(&source)?;
    for entry in tree.flatten_visible() {
        if let Some(node) = tree.get(entry.id) {
            println!(
                "{}{}",
                "  ".repeat(entry.depth),
                treeline_engine::render_html(&node.content)
            );
        }
    }
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        match event::read()? {
            Event::Key(key) => {
                if app.engine.is_some() {
                    app.handle_edit_key(key.code, key.modifiers);
                } else if app.handle_browse_key(key.code) {
                    app.stop_editing();
                    if app.autosave {
                        let _ = app.save();
                    }
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => {
                if let crossterm::event::MouseEventKind::Down(_) = mouse.kind {
                    handle_click(app, mouse.row, mouse.column);
                }
            }
            _ => {}
        }
    }
}

/// A click focuses the node under the pointer, resolving the column against
/// its formatted text.
fn handle_click(app: &mut App, row: u16, column: u16) {
    // rows: one border line above the list
    let index = match (row as usize).checked_sub(1) {
        Some(i) if i < app.visible.len() => i,
        _ => return,
    };
    let entry = app.visible[index];

    app.stop_editing();
    // columns: border + indentation + bullet glyph
    let prefix = 1 + entry.depth * 2 + 2;
    let text_column = (column as usize).saturating_sub(prefix);
    app.list_state.select(Some(index));
    app.start_editing_by_click(entry.id, text_column);
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)].as_ref())
        .split(f.area());

    let items: Vec<ListItem> = app
        .visible
        .iter()
        .map(|entry| outline_line(app, entry))
        .map(|line| ListItem::new(vec![line]))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Outline"))
        .highlight_style(Style::default().bg(Color::DarkGray));
    f.render_stateful_widget(list, chunks[0], &mut app.list_state);

    let help = if app.engine.is_some() {
        match &app.trigger_query {
            Some(query) => format!("@{query} | Ctrl+L: link to node | Esc: done"),
            None => {
                "Esc: done | Enter: split | Tab/S-Tab: indent | Ctrl+B/I/U: format".to_string()
            }
        }
    } else {
        "q: Quit | j/k: Move | Enter/i: Edit | Space: Fold | s: Save".to_string()
    };
    let status = if app.status.is_empty() {
        help
    } else {
        format!("{} | {}", app.status, help)
    };
    f.render_widget(Paragraph::new(Line::from(status)), chunks[1]);
}

/// One outline row: indentation, bullet, then either the formatted spans or
/// the raw markup with a caret while editing.
fn outline_line<'a>(app: &App, entry: &VisibleNode) -> Line<'a> {
    let Some(node) = app.editor.tree().get(entry.id) else {
        return Line::from("");
    };
    let mut spans = vec![Span::raw("  ".repeat(entry.depth))];

    let collapsed = !node.expanded && !node.children.is_empty();
    spans.push(Span::styled(
        if collapsed { "▸ " } else { "• " },
        Style::default().fg(Color::DarkGray),
    ));

    let editing = app
        .engine
        .as_ref()
        .filter(|engine| engine.node() == entry.id);
    if let Some(engine) = editing {
        let text = engine.surface().text();
        let caret = engine.surface().selection().end.min(text.len());
        spans.push(Span::raw(text[..caret].to_string()));
        spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(text[caret..].to_string()));
        return Line::from(spans);
    }

    let rendered = markup::render(&node.content);
    let base = if rendered.header_level > 0 {
        Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan)
    } else {
        Style::default()
    };

    let mut pos = 0;
    let mut next_span = 0;
    while pos < rendered.text.len() {
        let (end, style) = if next_span < rendered.spans.len() {
            let span = &rendered.spans[next_span];
            if span.range.start == pos {
                next_span += 1;
                (span.range.end, span.style)
            } else {
                (span.range.start, treeline_engine::TextStyle::default())
            }
        } else {
            (rendered.text.len(), treeline_engine::TextStyle::default())
        };

        let mut styled = base;
        if style.bold {
            styled = styled.add_modifier(Modifier::BOLD);
        }
        if style.italic {
            styled = styled.add_modifier(Modifier::ITALIC);
        }
        if style.underline {
            styled = styled.add_modifier(Modifier::UNDERLINED);
        }
        if rendered
            .references
            .iter()
            .any(|r| r.range.start <= pos && pos < r.range.end)
        {
            styled = styled.fg(Color::Blue).add_modifier(Modifier::UNDERLINED);
        }
        spans.push(Span::styled(rendered.text[pos..end].to_string(), styled));
        pos = end;
    }

    if rendered.text.is_empty() && node.content.is_empty() {
        spans.push(Span::styled(
            "…",
            Style::default().fg(Color::DarkGray),
        ));
    }

    Line::from(spans)
}
