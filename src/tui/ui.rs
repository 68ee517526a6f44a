use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::widgets::{admin, login, quiz, results, video};
use super::{App, LoginField};
use crate::models::{phase_state, PhaseState, Step, PHASES};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title + progress
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Message
            Constraint::Length(1), // Help bar
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_message(f, app, chunks[2]);
    draw_help_bar(f, app, chunks[3]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let session = app.controller.session();
    let step = session.step;

    let mut spans = Vec::new();
    if step.phase().is_some() {
        for (i, phase) in PHASES.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" › ", Style::default().fg(Color::DarkGray)));
            }
            let style = match phase_state(step, *phase) {
                PhaseState::Active => Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
                PhaseState::Completed => Style::default().fg(Color::Green),
                PhaseState::Pending => Style::default().fg(Color::DarkGray),
            };
            spans.push(Span::styled(phase.label(), style));
        }
    }

    let title = if session.is_logged_in() {
        format!(
            " Learning Management System | Welcome, {} ({}) ",
            session.username,
            session.role.label()
        )
    } else {
        " Learning Management System ".to_string()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    match app.step() {
        Step::Login => login::draw(f, app, area),
        Step::Admin => admin::draw(f, app, area),
        Step::PreTest | Step::PostTest => quiz::draw(f, app, area),
        Step::PreTestResults | Step::Results => results::draw(f, app, area),
        Step::Video => video::draw(f, app, area),
    }
}

fn draw_message(f: &mut Frame, app: &App, area: Rect) {
    if let Some(message) = &app.message {
        let paragraph = Paragraph::new(Span::styled(
            format!(" {}", message),
            Style::default().fg(Color::Red),
        ));
        f.render_widget(paragraph, area);
    }
}

fn key(k: &'static str) -> Span<'static> {
    Span::styled(k, Style::default().fg(Color::Cyan))
}

fn draw_help_bar(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = match app.step() {
        Step::Login => {
            let mut spans = vec![
                key("Tab"),
                Span::raw(" Field  "),
                key("<CR>"),
                Span::raw(" Login  "),
            ];
            if app.login.field == LoginField::Role {
                spans.extend(vec![key("Space"), Span::raw(" Toggle role  ")]);
            }
            spans
        }
        Step::Admin if app.admin.is_editing() => vec![
            key("Tab"),
            Span::raw(" Field  "),
            key("F1-F4"),
            Span::raw(" Correct  "),
            key("<CR>"),
            Span::raw(" Save  "),
            key("<Esc>"),
            Span::raw(" Cancel  "),
        ],
        Step::Admin => vec![
            key("j/k"),
            Span::raw(" Nav  "),
            key("g/G"),
            Span::raw(" Top/Bot  "),
            key("e/<CR>"),
            Span::raw(" Edit  "),
        ],
        Step::PreTest | Step::PostTest => vec![
            key("1-4"),
            Span::raw(" Answer  "),
            key("h/l"),
            Span::raw(" Prev/Next  "),
            key("g/G"),
            Span::raw(" First/Last  "),
            key("s"),
            Span::raw(" Submit  "),
        ],
        Step::PreTestResults => vec![key("<CR>"), Span::raw(" Proceed to Video  ")],
        Step::Video => {
            let mut spans = vec![key("Space"), Span::raw(" Play/Pause  ")];
            if app.controller.session().video_completed {
                spans.extend(vec![key("<CR>"), Span::raw(" Proceed to Post-Test  ")]);
            }
            spans
        }
        Step::Results => vec![key("r"), Span::raw(" Start Over  ")],
    };

    if app.controller.session().is_logged_in() {
        spans.extend(vec![key("^l"), Span::raw(" Logout  ")]);
    }
    spans.extend(vec![key("^r"), Span::raw(" Reset  ")]);
    if app.is_typing() {
        spans.extend(vec![key("^c"), Span::raw(" Quit")]);
    } else {
        spans.extend(vec![key("q"), Span::raw(" Quit")]);
    }

    let help = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));

    f.render_widget(help, area);
}
