use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::models::UserRole;
use crate::tui::{App, LoginField};

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(50),
            Constraint::Percentage(25),
        ])
        .split(area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(10), Constraint::Min(0)])
        .split(columns[1]);

    let form = &app.login;
    let hint = match form.role {
        UserRole::Admin => "Hint: admin / admin123",
        UserRole::User => "Any username & password works for User",
    };
    let masked = "*".repeat(form.password.chars().count());

    let text = vec![
        Line::from(vec![
            label("Role:     ", form.field == LoginField::Role),
            role_span(UserRole::User, form.role),
            Span::raw("  "),
            role_span(UserRole::Admin, form.role),
        ]),
        Line::from(""),
        Line::from(vec![
            label("Username: ", form.field == LoginField::Username),
            input(&form.username, form.field == LoginField::Username),
        ]),
        Line::from(vec![
            label("Password: ", form.field == LoginField::Password),
            input(&masked, form.field == LoginField::Password),
        ]),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
    ];

    let title = match form.role {
        UserRole::Admin => " Login as Admin ",
        UserRole::User => " Login as User ",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(Color::Cyan));

    f.render_widget(Paragraph::new(text).block(block), rows[1]);
}

fn label(text: &'static str, focused: bool) -> Span<'static> {
    let style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Span::styled(text, style)
}

fn input(value: &str, focused: bool) -> Span<'static> {
    let text = if focused {
        format!("{}█", value)
    } else {
        value.to_string()
    };
    Span::styled(text, Style::default().fg(Color::White))
}

fn role_span(role: UserRole, current: UserRole) -> Span<'static> {
    if role == current {
        Span::styled(
            format!("[{}]", role.label()),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            format!(" {} ", role.label()),
            Style::default().fg(Color::DarkGray),
        )
    }
}
