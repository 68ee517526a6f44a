use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Source + state
            Constraint::Length(3), // Gauge
            Constraint::Min(0),    // Instructions
        ])
        .split(area);

    let gate = &app.gate;
    let (state, color) = if gate.is_completed() {
        ("Completed", Color::Green)
    } else if gate.is_playing() {
        ("Playing", Color::Cyan)
    } else {
        ("Paused", Color::Yellow)
    };

    let header = vec![
        Line::from(vec![
            Span::styled("Source: ", Style::default().fg(Color::Gray)),
            Span::styled(gate.source(), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::styled("State: ", Style::default().fg(Color::Gray)),
            Span::styled(state, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ]),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Instructional Video ")
        .title_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(header).block(block), chunks[0]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(color))
        .ratio(gate.progress())
        .label(format!(
            "{} / {}",
            format_time(gate.elapsed()),
            format_time(gate.limit())
        ));
    f.render_widget(gauge, chunks[1]);

    let status = if gate.is_completed() {
        Span::styled(
            "✓ Video completed! You can now proceed to the Post-Test.",
            Style::default().fg(Color::Green),
        )
    } else {
        Span::styled("Video in progress...", Style::default().fg(Color::Yellow))
    };
    let instructions = vec![
        Line::from("Watch the video completely to unlock the Post-Test."),
        Line::from(status),
    ];
    f.render_widget(Paragraph::new(instructions), chunks[2]);
}

fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
