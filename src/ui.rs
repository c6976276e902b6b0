use chrono::NaiveDate;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use tracing::{debug, error};

use crate::dispatch::{self, Action};
use crate::error::TrackerError;
use crate::form::{Field, FormState};
use crate::render::{ClickTarget, Control};
use crate::storage::Storage;
use crate::tracker::{Tracker, CLEAR_PROMPT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Form,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    Action(Action),
    ClearAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Confirm { message: String, pending: Pending },
    Alert(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App<S> {
    pub tracker: Tracker<S>,
    pub form: FormState,
    pub focus: Focus,
    pub list_state: ListState,
    pub modal: Option<Modal>,
    list_area: Rect,
    form_area: Rect,
    today: fn() -> NaiveDate,
}

impl<S: Storage> App<S> {
    pub fn new(mut tracker: Tracker<S>, today: fn() -> NaiveDate) -> Self {
        tracker.render_all();
        let mut app = Self {
            tracker,
            form: FormState::new(today()),
            focus: Focus::Form,
            list_state: ListState::default(),
            modal: None,
            list_area: Rect::default(),
            form_area: Rect::default(),
            today,
        };
        app.after_change();
        app
    }

    pub fn handle_event(&mut self, event: Event) -> Flow {
        let flow = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                Flow::Continue
            }
            _ => Flow::Continue,
        };
        self.after_change();
        flow
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }
        if let Some(modal) = self.modal.take() {
            self.handle_modal_key(modal, key.code);
            return Flow::Continue;
        }
        match self.focus {
            Focus::Form => self.handle_form_key(key.code),
            Focus::List => return self.handle_list_key(key.code),
        }
        Flow::Continue
    }

    fn handle_modal_key(&mut self, modal: Modal, code: KeyCode) {
        match modal {
            Modal::Alert(_) => {}
            Modal::Confirm { message, pending } => match code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => self.run(pending),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    debug!(?pending, "declined");
                }
                _ => self.modal = Some(Modal::Confirm { message, pending }),
            },
        }
    }

    fn handle_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Tab => self.focus = Focus::List,
            KeyCode::Enter => self.submit(),
            KeyCode::Esc => self.tracker.cancel_edit(&mut self.form),
            KeyCode::Up => self.form.focus = self.form.focus.prev(),
            KeyCode::Down => self.form.focus = self.form.focus.next(),
            KeyCode::Left if self.form.focus == Field::Category => self.form.cycle_category(false),
            KeyCode::Right if self.form.focus == Field::Category => self.form.cycle_category(true),
            KeyCode::Backspace => {
                if let Some(text) = self.form.focused_text_mut() {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = self.form.focused_text_mut() {
                    text.push(c);
                }
            }
            _ => {}
        }
    }

    fn handle_list_key(&mut self, code: KeyCode) -> Flow {
        let len = self.tracker.renderer().rows().len();
        match code {
            KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Tab => self.focus = Focus::Form,
            KeyCode::Up => {
                if let Some(i) = self.list_state.selected() {
                    self.list_state.select(Some(i.saturating_sub(1)));
                }
            }
            KeyCode::Down => {
                if let Some(i) = self.list_state.selected() {
                    if i + 1 < len {
                        self.list_state.select(Some(i + 1));
                    }
                }
            }
            KeyCode::Char('c') | KeyCode::Char(' ') => self.click_selected(Control::Complete),
            KeyCode::Char('e') => self.click_selected(Control::Edit),
            KeyCode::Char('d') | KeyCode::Delete => self.click_selected(Control::Delete),
            KeyCode::Char('X') => {
                self.modal = Some(Modal::Confirm {
                    message: CLEAR_PROMPT.to_string(),
                    pending: Pending::ClearAll,
                });
            }
            _ => {}
        }
        Flow::Continue
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.modal.is_some() || mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if contains(self.form_area, mouse.column, mouse.row) {
            self.focus = Focus::Form;
            return;
        }
        if !contains(self.list_area, mouse.column, mouse.row) {
            return;
        }
        self.focus = Focus::List;
        let target = self.tracker.renderer().hit_test(
            self.list_area,
            self.list_state.offset(),
            mouse.column,
            mouse.row,
        );
        if let Some(id) = target.task_id {
            let index = self.tracker.renderer().rows().iter().position(|r| r.id == id);
            self.list_state.select(index);
        }
        self.click(target);
    }

    fn click_selected(&mut self, control: Control) {
        let rows = self.tracker.renderer().rows();
        let task_id = self
            .list_state
            .selected()
            .and_then(|i| rows.get(i))
            .map(|r| r.id);
        self.click(ClickTarget {
            task_id,
            control: Some(control),
        });
    }

    fn click(&mut self, target: ClickTarget) {
        match dispatch::resolve(self.tracker.store(), target) {
            Ok(Some(action)) => match action.confirmation() {
                Some(message) => {
                    self.modal = Some(Modal::Confirm {
                        message: message.to_string(),
                        pending: Pending::Action(action),
                    });
                }
                None => self.run(Pending::Action(action)),
            },
            Ok(None) => {}
            Err(err) => self.alert(err.to_string()),
        }
    }

    fn run(&mut self, pending: Pending) {
        let result = match pending {
            Pending::Action(action) => self.tracker.perform(action, &mut self.form).map(|done| {
                if done && matches!(action, Action::Edit(_)) {
                    self.focus = Focus::Form;
                }
            }),
            Pending::ClearAll => self.tracker.clear_confirmed(&mut self.form),
        };
        if let Err(err) = result {
            error!(error = %err, ?pending, "action failed");
            self.alert(err.to_string());
        }
    }

    fn submit(&mut self) {
        match self.tracker.submit_new_task(&mut self.form, (self.today)()) {
            Ok(_) => {}
            Err(TrackerError::Validation(err)) => self.alert(err.to_string()),
            Err(err) => {
                error!(error = %err, "submit failed");
                self.alert(err.to_string());
            }
        }
    }

    fn alert(&mut self, message: String) {
        self.modal = Some(Modal::Alert(message));
    }

    fn after_change(&mut self) {
        if self.modal.is_none() {
            if let Some(notice) = self.tracker.take_notice() {
                self.alert(notice);
            }
        }
        let len = self.tracker.renderer().rows().len();
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(0)),
            Some(_) => {}
        }
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

pub fn draw<S: Storage>(f: &mut Frame, app: &mut App<S>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(rows[0]);

    draw_form(f, app, panes[0]);
    draw_list(f, app, panes[1]);

    let hints = match app.focus {
        Focus::Form => "Enter submit · ↑/↓ field · ←/→ category · Esc cancel edit · Tab list",
        Focus::List => "c complete · e edit · d delete · X clear all · Tab form · q quit",
    };
    f.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
        rows[1],
    );

    if let Some(modal) = &app.modal {
        draw_modal(f, modal);
    }
}

fn draw_form<S: Storage>(f: &mut Frame, app: &mut App<S>, area: Rect) {
    app.form_area = area;
    let form = &app.form;
    let title = if form.editing.is_some() {
        "Edit task"
    } else {
        "New task"
    };

    let field_line = |field: Field, label: &str, value: String| {
        let focused = app.focus == Focus::Form && form.focus == field;
        let mut value_style = Style::default().fg(Color::White);
        if focused {
            value_style = value_style.add_modifier(Modifier::UNDERLINED);
        }
        Line::from(vec![
            Span::styled(
                format!("{label:<12}"),
                focus_style(focused).add_modifier(Modifier::BOLD),
            ),
            Span::styled(value, value_style),
        ])
    };

    let lines = vec![
        field_line(Field::Title, "Title", form.title.clone()),
        field_line(Field::Description, "Description", form.description.clone()),
        field_line(
            Field::Category,
            "Category",
            format!("< {} >", form.category_label()),
        ),
        field_line(Field::Deadline, "Deadline", form.deadline.clone()),
    ];

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(focus_style(app.focus == Focus::Form));
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_list<S: Storage>(f: &mut Frame, app: &mut App<S>, area: Rect) {
    let renderer = app.tracker.renderer();
    let block = Block::default()
        .title(format!("Tasks ({})", renderer.rows().len()))
        .borders(Borders::ALL)
        .border_style(focus_style(app.focus == Focus::List));
    app.list_area = block.inner(area);

    let list = List::new(renderer.list_items(app.list_state.selected()))
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    f.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_modal(f: &mut Frame, modal: &Modal) {
    let (title, body) = match modal {
        Modal::Confirm { message, .. } => ("Confirm", format!("{message}\n\n[y]es / [n]o")),
        Modal::Alert(message) => ("Alert", format!("{message}\n\npress any key")),
    };
    let [area] = Layout::horizontal([Constraint::Length(50)])
        .flex(Flex::Center)
        .areas(f.area());
    let [area] = Layout::vertical([Constraint::Length(6)])
        .flex(Flex::Center)
        .areas(area);

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(body)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            ),
        area,
    );
}

pub fn run_app<B: Backend, S: Storage>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;
        if app.handle_event(event::read()?) == Flow::Quit {
            return Ok(());
        }
    }
}
