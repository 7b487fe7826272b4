// tui.rs

use crate::app::{App, AuthField, Screen, SetupStep};
use crate::entities::{ITEM_EMOJIS, PROJECT_EMOJIS};
use crate::filter::{Urgency, classify_task, project_urgency};
use crate::notify::NoticeKind;
use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    Terminal,
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use std::{io, time::Duration};
use textwrap::wrap;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum InputMode {
    Normal,
    AddingProjectName,
    PickingProjectEmoji,
    EditingProjectName,
    AddingTaskTitle,
    AddingTaskDeadline,
    PickingTaskEmoji,
    EditingTaskTitle,
    EditingTaskDeadline,
    AddingPlanContent,
    PickingPlanEmoji,
    EditingPlanContent,
    Searching,
    FilterStart,
    FilterEnd,
}

fn cycle_emoji_str(current: &str, set: &[&str], forward: bool) -> String {
    let pos = set.iter().position(|e| *e == current);
    let next = match (pos, forward) {
        (Some(i), true) => set[(i + 1) % set.len()],
        (Some(i), false) => set[(i + set.len() - 1) % set.len()],
        (None, true) => set[0],
        (None, false) => set[set.len() - 1],
    };
    next.to_string()
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()>
where
    std::io::Error: From<<B as Backend>::Error>,
{
    let mut mode = InputMode::Normal;
    // Scratch buffer for the planner date-bound inputs.
    let mut filter_input = String::new();

    loop {
        terminal.draw(|f| ui(f, app, mode, &filter_input))?;

        if crossterm::event::poll(Duration::from_millis(100))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                match app.screen {
                    Screen::Setup => match key.code {
                        KeyCode::Enter => app.submit_setup(),
                        KeyCode::Esc => return Ok(()),
                        KeyCode::Char(c) => app.input_setup.push(c),
                        KeyCode::Backspace => {
                            app.input_setup.pop();
                        }
                        _ => {}
                    },
                    Screen::SignIn => match key.code {
                        KeyCode::Enter => app.sign_in(),
                        KeyCode::Char('r') | KeyCode::Char('R')
                            if key.modifiers.contains(KeyModifiers::CONTROL) =>
                        {
                            app.sign_up();
                        }
                        KeyCode::Tab => {
                            app.auth_field = match app.auth_field {
                                AuthField::Email => AuthField::Password,
                                AuthField::Password => AuthField::Email,
                            };
                        }
                        KeyCode::Esc => return Ok(()),
                        KeyCode::Char(c) => match app.auth_field {
                            AuthField::Email => app.input_email.push(c),
                            AuthField::Password => app.input_password.push(c),
                        },
                        KeyCode::Backspace => {
                            match app.auth_field {
                                AuthField::Email => app.input_email.pop(),
                                AuthField::Password => app.input_password.pop(),
                            };
                        }
                        _ => {}
                    },
                    Screen::Projects => match mode {
                        InputMode::Normal => match key.code {
                            KeyCode::Char('q') => return Ok(()),
                            KeyCode::Char('2') => app.enter_planner(),
                            KeyCode::Char('g') => app.refresh_projects(),
                            KeyCode::Char('a') => {
                                app.projects.input_name.clear();
                                app.projects.new_emoji = None;
                                mode = InputMode::AddingProjectName;
                            }
                            KeyCode::Char('e') => {
                                app.begin_project_edit();
                                if !app.projects.edit.is_idle() {
                                    mode = InputMode::EditingProjectName;
                                }
                            }
                            // Delete selected project (Shift+R only)
                            KeyCode::Char('r') | KeyCode::Char('R')
                                if key.modifiers.contains(KeyModifiers::SHIFT) =>
                            {
                                app.delete_project();
                            }
                            KeyCode::Char('u') => app.projects.cycle_owner_filter(),
                            KeyCode::Down => {
                                let len = app.projects.visible().len();
                                if app.projects.selected < len.saturating_sub(1) {
                                    app.projects.selected += 1;
                                }
                            }
                            KeyCode::Up => {
                                if app.projects.selected > 0 {
                                    app.projects.selected -= 1;
                                }
                            }
                            KeyCode::Enter => app.open_selected_project(),
                            _ => {}
                        },
                        InputMode::AddingProjectName => match key.code {
                            KeyCode::Enter => mode = InputMode::PickingProjectEmoji,
                            KeyCode::Esc => {
                                app.projects.input_name.clear();
                                mode = InputMode::Normal;
                            }
                            KeyCode::Char(c) => app.projects.input_name.push(c),
                            KeyCode::Backspace => {
                                app.projects.input_name.pop();
                            }
                            _ => {}
                        },
                        InputMode::PickingProjectEmoji => match key.code {
                            KeyCode::Enter => {
                                app.add_project();
                                mode = InputMode::Normal;
                            }
                            KeyCode::Esc => {
                                app.projects.input_name.clear();
                                app.projects.new_emoji = None;
                                mode = InputMode::Normal;
                            }
                            KeyCode::Right => app.projects.cycle_new_emoji(true),
                            KeyCode::Left => app.projects.cycle_new_emoji(false),
                            _ => {}
                        },
                        InputMode::EditingProjectName => match key.code {
                            KeyCode::Enter => {
                                app.save_project_edit();
                                mode = InputMode::Normal;
                            }
                            KeyCode::Esc => {
                                app.projects.edit.cancel();
                                mode = InputMode::Normal;
                            }
                            KeyCode::Right => {
                                if let Some(draft) = app.projects.edit.draft_mut() {
                                    draft.emoji =
                                        cycle_emoji_str(&draft.emoji, &PROJECT_EMOJIS, true);
                                }
                            }
                            KeyCode::Left => {
                                if let Some(draft) = app.projects.edit.draft_mut() {
                                    draft.emoji =
                                        cycle_emoji_str(&draft.emoji, &PROJECT_EMOJIS, false);
                                }
                            }
                            KeyCode::Char(c) => {
                                if let Some(draft) = app.projects.edit.draft_mut() {
                                    draft.name.push(c);
                                }
                            }
                            KeyCode::Backspace => {
                                if let Some(draft) = app.projects.edit.draft_mut() {
                                    draft.name.pop();
                                }
                            }
                            _ => {}
                        },
                        _ => mode = InputMode::Normal,
                    },
                    Screen::Tasks => match mode {
                        InputMode::Normal => match key.code {
                            KeyCode::Char('q') => return Ok(()),
                            KeyCode::Esc | KeyCode::Char('1') => {
                                app.tasks = None;
                                app.screen = Screen::Projects;
                            }
                            KeyCode::Char('2') => {
                                app.tasks = None;
                                app.enter_planner();
                            }
                            KeyCode::Char('g') => app.refresh_tasks(),
                            KeyCode::Char('a') => {
                                if let Some(page) = app.tasks.as_mut() {
                                    page.input_title.clear();
                                    page.input_deadline.clear();
                                    page.new_emoji = None;
                                }
                                mode = InputMode::AddingTaskTitle;
                            }
                            KeyCode::Char('e') => {
                                app.begin_task_edit();
                                if app.tasks.as_ref().is_some_and(|p| !p.edit.is_idle()) {
                                    mode = InputMode::EditingTaskTitle;
                                }
                            }
                            KeyCode::Char('d') => app.toggle_task(),
                            KeyCode::Char('r') | KeyCode::Char('R')
                                if key.modifiers.contains(KeyModifiers::SHIFT) =>
                            {
                                app.delete_task();
                            }
                            KeyCode::Char('?') => {
                                if let Some(page) = app.tasks.as_mut() {
                                    page.search_query.clear();
                                    page.selected = 0;
                                }
                                mode = InputMode::Searching;
                            }
                            KeyCode::Down => {
                                if let Some(page) = app.tasks.as_mut() {
                                    if page.selected < page.visible().len().saturating_sub(1) {
                                        page.selected += 1;
                                    }
                                }
                            }
                            KeyCode::Up => {
                                if let Some(page) = app.tasks.as_mut() {
                                    if page.selected > 0 {
                                        page.selected -= 1;
                                    }
                                }
                            }
                            _ => {}
                        },
                        InputMode::AddingTaskTitle => match key.code {
                            KeyCode::Enter => mode = InputMode::AddingTaskDeadline,
                            KeyCode::Esc => mode = InputMode::Normal,
                            KeyCode::Char(c) => {
                                if let Some(page) = app.tasks.as_mut() {
                                    page.input_title.push(c);
                                }
                            }
                            KeyCode::Backspace => {
                                if let Some(page) = app.tasks.as_mut() {
                                    page.input_title.pop();
                                }
                            }
                            _ => {}
                        },
                        InputMode::AddingTaskDeadline => match key.code {
                            KeyCode::Enter => mode = InputMode::PickingTaskEmoji,
                            KeyCode::Esc => mode = InputMode::Normal,
                            KeyCode::Char(c) => {
                                if let Some(page) = app.tasks.as_mut() {
                                    page.input_deadline.push(c);
                                }
                            }
                            KeyCode::Backspace => {
                                if let Some(page) = app.tasks.as_mut() {
                                    page.input_deadline.pop();
                                }
                            }
                            _ => {}
                        },
                        InputMode::PickingTaskEmoji => match key.code {
                            KeyCode::Enter => {
                                app.add_task();
                                mode = InputMode::Normal;
                            }
                            KeyCode::Esc => mode = InputMode::Normal,
                            KeyCode::Right => {
                                if let Some(page) = app.tasks.as_mut() {
                                    page.cycle_new_emoji(true);
                                }
                            }
                            KeyCode::Left => {
                                if let Some(page) = app.tasks.as_mut() {
                                    page.cycle_new_emoji(false);
                                }
                            }
                            _ => {}
                        },
                        InputMode::EditingTaskTitle => match key.code {
                            KeyCode::Enter => mode = InputMode::EditingTaskDeadline,
                            KeyCode::Esc => {
                                if let Some(page) = app.tasks.as_mut() {
                                    page.edit.cancel();
                                }
                                mode = InputMode::Normal;
                            }
                            KeyCode::Right => {
                                if let Some(draft) =
                                    app.tasks.as_mut().and_then(|p| p.edit.draft_mut())
                                {
                                    draft.emoji = cycle_emoji_str(&draft.emoji, &ITEM_EMOJIS, true);
                                }
                            }
                            KeyCode::Left => {
                                if let Some(draft) =
                                    app.tasks.as_mut().and_then(|p| p.edit.draft_mut())
                                {
                                    draft.emoji =
                                        cycle_emoji_str(&draft.emoji, &ITEM_EMOJIS, false);
                                }
                            }
                            KeyCode::Char(c) => {
                                if let Some(draft) =
                                    app.tasks.as_mut().and_then(|p| p.edit.draft_mut())
                                {
                                    draft.title.push(c);
                                }
                            }
                            KeyCode::Backspace => {
                                if let Some(draft) =
                                    app.tasks.as_mut().and_then(|p| p.edit.draft_mut())
                                {
                                    draft.title.pop();
                                }
                            }
                            _ => {}
                        },
                        InputMode::EditingTaskDeadline => match key.code {
                            KeyCode::Enter => {
                                app.save_task_edit();
                                mode = InputMode::Normal;
                            }
                            KeyCode::Esc => {
                                if let Some(page) = app.tasks.as_mut() {
                                    page.edit.cancel();
                                    page.input_deadline.clear();
                                }
                                mode = InputMode::Normal;
                            }
                            KeyCode::Char(c) => {
                                if let Some(page) = app.tasks.as_mut() {
                                    page.input_deadline.push(c);
                                }
                            }
                            KeyCode::Backspace => {
                                if let Some(page) = app.tasks.as_mut() {
                                    page.input_deadline.pop();
                                }
                            }
                            _ => {}
                        },
                        InputMode::Searching => match key.code {
                            KeyCode::Enter | KeyCode::Esc => mode = InputMode::Normal,
                            KeyCode::Char(c) => {
                                if let Some(page) = app.tasks.as_mut() {
                                    page.search_query.push(c);
                                    page.selected = 0;
                                }
                            }
                            KeyCode::Backspace => {
                                if let Some(page) = app.tasks.as_mut() {
                                    page.search_query.pop();
                                    page.selected = 0;
                                }
                            }
                            _ => {}
                        },
                        _ => mode = InputMode::Normal,
                    },
                    Screen::Planner => match mode {
                        InputMode::Normal => match key.code {
                            KeyCode::Char('q') => return Ok(()),
                            KeyCode::Char('1') => app.enter_projects(),
                            KeyCode::Char('g') => app.refresh_planner(),
                            KeyCode::Char('a') => {
                                app.planner.input_content.clear();
                                app.planner.new_emoji = None;
                                mode = InputMode::AddingPlanContent;
                            }
                            KeyCode::Char('e') => {
                                app.begin_planner_edit();
                                if !app.planner.edit.is_idle() {
                                    mode = InputMode::EditingPlanContent;
                                }
                            }
                            KeyCode::Char('r') | KeyCode::Char('R')
                                if key.modifiers.contains(KeyModifiers::SHIFT) =>
                            {
                                app.delete_planner_entry();
                            }
                            KeyCode::Char('u') => app.planner.cycle_owner_filter(),
                            KeyCode::Char('/') => {
                                app.planner.filters.search.clear();
                                app.planner.selected = 0;
                                mode = InputMode::Searching;
                            }
                            KeyCode::Char('[') => {
                                filter_input = app
                                    .planner
                                    .filters
                                    .range
                                    .start
                                    .map(|d| d.format("%Y-%m-%d").to_string())
                                    .unwrap_or_default();
                                mode = InputMode::FilterStart;
                            }
                            KeyCode::Char(']') => {
                                filter_input = app
                                    .planner
                                    .filters
                                    .range
                                    .end
                                    .map(|d| d.format("%Y-%m-%d").to_string())
                                    .unwrap_or_default();
                                mode = InputMode::FilterEnd;
                            }
                            KeyCode::Char('x') => app.planner.reset_filters(),
                            KeyCode::Down => {
                                let len = app.planner.visible().len();
                                if app.planner.selected < len.saturating_sub(1) {
                                    app.planner.selected += 1;
                                }
                            }
                            KeyCode::Up => {
                                if app.planner.selected > 0 {
                                    app.planner.selected -= 1;
                                }
                            }
                            _ => {}
                        },
                        InputMode::AddingPlanContent => match key.code {
                            KeyCode::Enter => mode = InputMode::PickingPlanEmoji,
                            KeyCode::Esc => {
                                app.planner.input_content.clear();
                                mode = InputMode::Normal;
                            }
                            KeyCode::Char(c) => app.planner.input_content.push(c),
                            KeyCode::Backspace => {
                                app.planner.input_content.pop();
                            }
                            _ => {}
                        },
                        InputMode::PickingPlanEmoji => match key.code {
                            KeyCode::Enter => {
                                app.add_planner_entry();
                                mode = InputMode::Normal;
                            }
                            KeyCode::Esc => {
                                app.planner.input_content.clear();
                                app.planner.new_emoji = None;
                                mode = InputMode::Normal;
                            }
                            KeyCode::Right => app.planner.cycle_new_emoji(true),
                            KeyCode::Left => app.planner.cycle_new_emoji(false),
                            _ => {}
                        },
                        InputMode::EditingPlanContent => match key.code {
                            KeyCode::Enter => {
                                app.save_planner_edit();
                                mode = InputMode::Normal;
                            }
                            KeyCode::Esc => {
                                app.planner.edit.cancel();
                                mode = InputMode::Normal;
                            }
                            KeyCode::Right => {
                                if let Some(draft) = app.planner.edit.draft_mut() {
                                    draft.emoji = cycle_emoji_str(&draft.emoji, &ITEM_EMOJIS, true);
                                }
                            }
                            KeyCode::Left => {
                                if let Some(draft) = app.planner.edit.draft_mut() {
                                    draft.emoji =
                                        cycle_emoji_str(&draft.emoji, &ITEM_EMOJIS, false);
                                }
                            }
                            KeyCode::Char(c) => {
                                if let Some(draft) = app.planner.edit.draft_mut() {
                                    draft.content.push(c);
                                }
                            }
                            KeyCode::Backspace => {
                                if let Some(draft) = app.planner.edit.draft_mut() {
                                    draft.content.pop();
                                }
                            }
                            _ => {}
                        },
                        InputMode::Searching => match key.code {
                            KeyCode::Enter | KeyCode::Esc => mode = InputMode::Normal,
                            KeyCode::Char(c) => {
                                app.planner.filters.search.push(c);
                                app.planner.selected = 0;
                            }
                            KeyCode::Backspace => {
                                app.planner.filters.search.pop();
                                app.planner.selected = 0;
                            }
                            _ => {}
                        },
                        InputMode::FilterStart | InputMode::FilterEnd => match key.code {
                            KeyCode::Enter => {
                                match parse_filter_date(&filter_input) {
                                    Ok(date) => {
                                        if mode == InputMode::FilterStart {
                                            app.planner.filters.range.start = date;
                                        } else {
                                            app.planner.filters.range.end = date;
                                        }
                                        app.planner.selected = 0;
                                        mode = InputMode::Normal;
                                    }
                                    Err(msg) => app.notices.error(msg),
                                }
                                filter_input.clear();
                            }
                            KeyCode::Esc => {
                                filter_input.clear();
                                mode = InputMode::Normal;
                            }
                            KeyCode::Char(c) => filter_input.push(c),
                            KeyCode::Backspace => {
                                filter_input.pop();
                            }
                            _ => {}
                        },
                        _ => mode = InputMode::Normal,
                    },
                }
            }
        }
    }
}

/// Empty input clears the bound.
fn parse_filter_date(input: &str) -> Result<Option<NaiveDate>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("not a date: {} (use YYYY-MM-DD)", input))
}

fn urgency_color(urgency: Urgency) -> Color {
    match urgency {
        Urgency::Completed => Color::Green,
        Urgency::Imminent => Color::Red,
        Urgency::Elevated => Color::Magenta,
        Urgency::Normal | Urgency::NoDeadline => Color::Blue,
    }
}

fn ui(f: &mut ratatui::Frame<'_>, app: &App, mode: InputMode, filter_input: &str) {
    match app.screen {
        Screen::Setup => ui_setup(f, app),
        Screen::SignIn => ui_sign_in(f, app),
        Screen::Projects => ui_projects(f, app, mode),
        Screen::Tasks => ui_tasks(f, app, mode),
        Screen::Planner => ui_planner(f, app, mode, filter_input),
    }
    ui_notice(f, app);
}

fn input_box(f: &mut ratatui::Frame<'_>, area: ratatui::layout::Rect, title: &str, value: &str) {
    let caret = "|";
    let text = if value.is_empty() {
        caret.to_string()
    } else {
        format!("{}{}", value, caret)
    };
    let widget = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string()),
        )
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .wrap(Wrap { trim: true });
    f.render_widget(widget, area);
}

fn emoji_box(
    f: &mut ratatui::Frame<'_>,
    area: ratatui::layout::Rect,
    title: &str,
    set: &[&str],
    picked: Option<usize>,
) {
    let on = Style::default().fg(Color::White).bg(Color::Blue);
    let mut spans: Vec<Span> = Vec::new();
    spans.push(if picked.is_none() {
        Span::styled(" (none) ", on)
    } else {
        Span::raw(" (none) ")
    });
    for (i, emoji) in set.iter().enumerate() {
        let cell = format!(" {} ", emoji);
        spans.push(if picked == Some(i) {
            Span::styled(cell, on)
        } else {
            Span::raw(cell)
        });
    }
    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_string()),
    );
    f.render_widget(widget, area);
}

fn ui_setup(f: &mut ratatui::Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(f.area());

    let title = Paragraph::new(Line::from(Span::styled(
        "🌈 MyTodo setup 🥰",
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let b = Style::default().add_modifier(Modifier::BOLD);
    let help = Paragraph::new(Line::from(vec![
        Span::raw("Press "),
        Span::styled("Enter", b),
        Span::raw(" to continue, "),
        Span::styled("Esc", b),
        Span::raw(" to quit"),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[1]);

    let box_title = match app.setup_step {
        SetupStep::Url => "Backend URL",
        SetupStep::AnonKey => "Anon Key",
    };
    input_box(f, chunks[2], box_title, &app.input_setup);
}

fn ui_sign_in(f: &mut ratatui::Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(f.area());

    let title = Paragraph::new(Line::from(Span::styled(
        "🌈 Sign in 🥰",
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let b = Style::default().add_modifier(Modifier::BOLD);
    let help = Paragraph::new(Line::from(vec![
        Span::styled("Tab", b),
        Span::raw(" switch field, "),
        Span::styled("Enter", b),
        Span::raw(" sign in, "),
        Span::raw("Ctrl+"),
        Span::styled("r", b),
        Span::raw(" sign up, "),
        Span::styled("Esc", b),
        Span::raw(" quit"),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[1]);

    let email_title = if app.auth_field == AuthField::Email {
        "Email (active)"
    } else {
        "Email"
    };
    input_box(f, chunks[2], email_title, &app.input_email);

    let password_title = if app.auth_field == AuthField::Password {
        "Password (active)"
    } else {
        "Password"
    };
    let masked: String = "*".repeat(app.input_password.chars().count());
    input_box(f, chunks[3], password_title, &masked);
}

fn tabs_line(active: Screen) -> Line<'static> {
    let on = Style::default()
        .fg(Color::White)
        .bg(Color::Blue)
        .add_modifier(Modifier::BOLD);
    let off = Style::default();
    let projects_on = matches!(active, Screen::Projects | Screen::Tasks);
    Line::from(vec![
        Span::styled(" Projects ", if projects_on { on } else { off }),
        Span::raw(" "),
        Span::styled(" Planner ", if active == Screen::Planner { on } else { off }),
    ])
}

fn ui_projects(f: &mut ratatui::Frame<'_>, app: &App, mode: InputMode) {
    let needs_input = !matches!(mode, InputMode::Normal);
    let mut constraints = vec![
        Constraint::Length(1), // tabs
        Constraint::Length(3), // title
        Constraint::Length(3), // help
        Constraint::Min(1),    // list
    ];
    if needs_input {
        constraints.push(Constraint::Length(3));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(constraints)
        .split(f.area());

    f.render_widget(Paragraph::new(tabs_line(Screen::Projects)), chunks[0]);

    let who = app
        .session
        .as_ref()
        .map(|s| s.email().to_string())
        .unwrap_or_default();
    let mut title_text = format!("🌈 Projects 🥰  {}", who);
    if let crate::filter::OwnerFilter::User(id) = &app.projects.owner_filter {
        let label = app
            .projects
            .users
            .iter()
            .find(|u| &u.id == id)
            .map(|u| u.email_or_unknown().to_string())
            .unwrap_or_else(|| id.clone());
        title_text.push_str(&format!("  [owner: {}]", label));
    }
    let title = Paragraph::new(Line::from(Span::styled(
        title_text,
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[1]);

    let b = Style::default().add_modifier(Modifier::BOLD);
    let help = Paragraph::new(vec![
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("a", b),
            Span::raw(" add, "),
            Span::styled("e", b),
            Span::raw(" edit, "),
            Span::styled("Enter", b),
            Span::raw(" open, "),
            Span::raw("Shift+"),
            Span::styled("R", b),
            Span::raw(" delete, "),
            Span::styled("u", b),
            Span::raw(" owner filter"),
        ]),
        Line::from(vec![
            Span::styled("g", b),
            Span::raw(" refresh, "),
            Span::styled("2", b),
            Span::raw(" planner, "),
            Span::styled("q", b),
            Span::raw(" quit"),
        ]),
    ])
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[2]);

    let today = Local::now().date_naive();
    let inner_width = chunks[3].width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = app
        .projects
        .visible()
        .iter()
        .map(|p| {
            let color = urgency_color(project_urgency(&p.tasks, today));
            let open = p.tasks.iter().filter(|t| !t.completed).count();
            let mut text = String::new();
            if !p.emoji.is_empty() {
                text.push_str(&p.emoji);
                text.push(' ');
            }
            text.push_str(&p.name);
            text.push_str(&format!("  ({} open)", open));
            if !p.user_email.is_empty() {
                text.push_str(&format!("  [{}]", p.user_email));
            }
            let lines: Vec<Line> = wrap(&text, inner_width.max(1))
                .iter()
                .map(|w| Line::from(Span::styled(w.to_string(), Style::default().fg(color))))
                .collect();
            ListItem::new(lines)
        })
        .collect();

    let mut state = ratatui::widgets::ListState::default();
    if !items.is_empty() {
        state.select(Some(app.projects.selected.min(items.len() - 1)));
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Projects"))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, chunks[3], &mut state);

    if needs_input {
        let last = chunks.len() - 1;
        match mode {
            InputMode::AddingProjectName => {
                input_box(f, chunks[last], "Project Name", &app.projects.input_name);
            }
            InputMode::PickingProjectEmoji => {
                emoji_box(
                    f,
                    chunks[last],
                    "Emoji (Left/Right, Enter to save)",
                    &PROJECT_EMOJIS,
                    app.projects.new_emoji,
                );
            }
            InputMode::EditingProjectName => {
                if let Some(draft) = app.projects.edit.draft() {
                    let title = format!("Edit Project (emoji {} via Left/Right)", draft.emoji);
                    input_box(f, chunks[last], &title, &draft.name);
                }
            }
            _ => {}
        }
    }
}

fn ui_tasks(f: &mut ratatui::Frame<'_>, app: &App, mode: InputMode) {
    let Some(page) = app.tasks.as_ref() else {
        return;
    };
    let needs_input = !matches!(mode, InputMode::Normal);
    let mut constraints = vec![
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(1),
    ];
    if needs_input {
        constraints.push(Constraint::Length(3));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(constraints)
        .split(f.area());

    f.render_widget(Paragraph::new(tabs_line(Screen::Tasks)), chunks[0]);

    let title = Paragraph::new(Line::from(Span::styled(
        format!("🌈 {} 🥰", page.project_name),
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[1]);

    let b = Style::default().add_modifier(Modifier::BOLD);
    let help = Paragraph::new(vec![
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("a", b),
            Span::raw(" add, "),
            Span::styled("e", b),
            Span::raw(" edit, "),
            Span::styled("d", b),
            Span::raw(" done, "),
            Span::raw("Shift+"),
            Span::styled("R", b),
            Span::raw(" delete, "),
            Span::styled("?", b),
            Span::raw(" search"),
        ]),
        Line::from(vec![
            Span::styled("g", b),
            Span::raw(" refresh, "),
            Span::styled("Esc", b),
            Span::raw(" back, "),
            Span::styled("q", b),
            Span::raw(" quit"),
        ]),
    ])
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[2]);

    let today = Local::now().date_naive();
    let inner_width = chunks[3].width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = page
        .visible()
        .iter()
        .map(|t| {
            let color = urgency_color(classify_task(t, today));
            let status = if t.completed { "[x]" } else { "[ ]" };
            let mut text = format!("{} ", status);
            if !t.emoji.is_empty() {
                text.push_str(&t.emoji);
                text.push(' ');
            }
            text.push_str(&t.title);
            if let Some(deadline) = t.deadline {
                text.push_str(&format!(" (Due: {})", deadline.format("%Y-%m-%d")));
            }
            if !t.user_email.is_empty() {
                text.push_str(&format!("  [{}]", t.user_email));
            }
            let lines: Vec<Line> = wrap(&text, inner_width.max(1))
                .iter()
                .map(|w| Line::from(Span::styled(w.to_string(), Style::default().fg(color))))
                .collect();
            ListItem::new(lines)
        })
        .collect();

    let mut state = ratatui::widgets::ListState::default();
    if !items.is_empty() {
        state.select(Some(page.selected.min(items.len() - 1)));
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Todos"))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, chunks[3], &mut state);

    if needs_input {
        let last = chunks.len() - 1;
        match mode {
            InputMode::AddingTaskTitle => input_box(f, chunks[last], "Title", &page.input_title),
            InputMode::AddingTaskDeadline | InputMode::EditingTaskDeadline => input_box(
                f,
                chunks[last],
                "Due (YYYY-MM-DD, today, tomorrow, empty for none)",
                &page.input_deadline,
            ),
            InputMode::PickingTaskEmoji => emoji_box(
                f,
                chunks[last],
                "Emoji (Left/Right, Enter to save)",
                &ITEM_EMOJIS,
                page.new_emoji,
            ),
            InputMode::EditingTaskTitle => {
                if let Some(draft) = page.edit.draft() {
                    let title = format!("Edit Title (emoji {} via Left/Right)", draft.emoji);
                    input_box(f, chunks[last], &title, &draft.title);
                }
            }
            InputMode::Searching => input_box(f, chunks[last], "Search", &page.search_query),
            _ => {}
        }
    }
}

fn ui_planner(f: &mut ratatui::Frame<'_>, app: &App, mode: InputMode, filter_input: &str) {
    let needs_input = !matches!(mode, InputMode::Normal);
    let mut constraints = vec![
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(1),
    ];
    if needs_input {
        constraints.push(Constraint::Length(3));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(constraints)
        .split(f.area());

    f.render_widget(Paragraph::new(tabs_line(Screen::Planner)), chunks[0]);

    let mut title_text = "🌈 Daily planner 🥰".to_string();
    if let crate::filter::OwnerFilter::User(id) = &app.planner.filters.owner {
        let label = app
            .planner
            .users
            .iter()
            .find(|u| &u.id == id)
            .map(|u| u.email_or_unknown().to_string())
            .unwrap_or_else(|| id.clone());
        title_text.push_str(&format!("  [owner: {}]", label));
    }
    if !app.planner.filters.range.is_unbounded() {
        let fmt = |d: Option<NaiveDate>| {
            d.map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "..".to_string())
        };
        title_text.push_str(&format!(
            "  [{} to {}]",
            fmt(app.planner.filters.range.start),
            fmt(app.planner.filters.range.end)
        ));
    }
    let title = Paragraph::new(Line::from(Span::styled(
        title_text,
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[1]);

    let b = Style::default().add_modifier(Modifier::BOLD);
    let help = Paragraph::new(vec![
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("a", b),
            Span::raw(" add today's plan, "),
            Span::styled("e", b),
            Span::raw(" edit, "),
            Span::raw("Shift+"),
            Span::styled("R", b),
            Span::raw(" delete, "),
            Span::styled("/", b),
            Span::raw(" search"),
        ]),
        Line::from(vec![
            Span::styled("u", b),
            Span::raw(" owner, "),
            Span::styled("[", b),
            Span::raw(" from, "),
            Span::styled("]", b),
            Span::raw(" to, "),
            Span::styled("x", b),
            Span::raw(" clear filters, "),
            Span::styled("g", b),
            Span::raw(" refresh, "),
            Span::styled("1", b),
            Span::raw(" projects, "),
            Span::styled("q", b),
            Span::raw(" quit"),
        ]),
    ])
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[2]);

    let inner_width = chunks[3].width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = app
        .planner
        .visible()
        .iter()
        .map(|e| {
            let mut text = format!("{} {} {}", e.date.format("%Y-%m-%d"), e.emoji, e.content);
            if !e.user_email.is_empty() {
                text.push_str(&format!("  [{}]", e.user_email));
            }
            let lines: Vec<Line> = wrap(&text, inner_width.max(1))
                .iter()
                .map(|w| {
                    Line::from(Span::styled(w.to_string(), Style::default().fg(Color::Cyan)))
                })
                .collect();
            ListItem::new(lines)
        })
        .collect();

    let mut state = ratatui::widgets::ListState::default();
    if !items.is_empty() {
        state.select(Some(app.planner.selected.min(items.len() - 1)));
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Entries"))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, chunks[3], &mut state);

    if needs_input {
        let last = chunks.len() - 1;
        match mode {
            InputMode::AddingPlanContent => {
                input_box(f, chunks[last], "Today's Plan", &app.planner.input_content);
            }
            InputMode::PickingPlanEmoji => emoji_box(
                f,
                chunks[last],
                "Emoji (Left/Right, Enter to save)",
                &ITEM_EMOJIS,
                app.planner.new_emoji,
            ),
            InputMode::EditingPlanContent => {
                if let Some(draft) = app.planner.edit.draft() {
                    let title = format!("Edit Plan (emoji {} via Left/Right)", draft.emoji);
                    input_box(f, chunks[last], &title, &draft.content);
                }
            }
            InputMode::Searching => {
                input_box(f, chunks[last], "Search", &app.planner.filters.search);
            }
            InputMode::FilterStart => {
                input_box(f, chunks[last], "From (YYYY-MM-DD, empty clears)", filter_input);
            }
            InputMode::FilterEnd => {
                input_box(f, chunks[last], "To (YYYY-MM-DD, empty clears)", filter_input);
            }
            _ => {}
        }
    }
}

// Most recent notice, one line above the bottom edge.
fn ui_notice(f: &mut ratatui::Frame<'_>, app: &App) {
    let Some(notice) = app.notices.last() else {
        return;
    };
    let color = match notice.kind {
        NoticeKind::Success => Color::Green,
        NoticeKind::Error => Color::Red,
    };
    let size = f.area();
    let widget = Paragraph::new(notice.body.as_str())
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    let area = ratatui::layout::Rect {
        x: size.x,
        y: size.height.saturating_sub(2),
        width: size.width,
        height: 1,
    };
    f.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emoji_cycling_wraps_both_ways() {
        let set = ["📝", "🔨", "📅"];
        assert_eq!(cycle_emoji_str("📝", &set, true), "🔨");
        assert_eq!(cycle_emoji_str("📅", &set, true), "📝");
        assert_eq!(cycle_emoji_str("📝", &set, false), "📅");
        assert_eq!(cycle_emoji_str("", &set, true), "📝");
    }

    #[test]
    fn filter_date_input_accepts_iso_or_empty() {
        assert_eq!(parse_filter_date("  ").unwrap(), None);
        assert_eq!(
            parse_filter_date("2026-08-24").unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 24)
        );
        assert!(parse_filter_date("yesterday").is_err());
    }

    #[test]
    fn completed_tasks_render_green_and_imminent_red() {
        assert_eq!(urgency_color(Urgency::Completed), Color::Green);
        assert_eq!(urgency_color(Urgency::Imminent), Color::Red);
        assert_eq!(urgency_color(Urgency::Elevated), Color::Magenta);
        assert_eq!(urgency_color(Urgency::NoDeadline), Color::Blue);
    }
}
