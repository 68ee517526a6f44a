use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::Step;
use crate::quiz::Quiz;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let title = match app.step() {
        Step::PostTest => " Post-Test ",
        _ => " Pre-Test ",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(Color::Cyan));

    let Some(quiz) = app.controller.session().active_quiz() else {
        f.render_widget(Paragraph::new("No quiz in progress").block(block), area);
        return;
    };
    if quiz.is_loading() {
        f.render_widget(Paragraph::new("Loading questions...").block(block), area);
        return;
    }

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Dots
            Constraint::Min(0),    // Question
            Constraint::Length(1), // Footer
        ])
        .split(inner);

    draw_dots(f, quiz, chunks[0]);
    draw_question(f, quiz, chunks[1]);
    draw_footer(f, quiz, chunks[2]);
}

fn draw_dots(f: &mut Frame, quiz: &Quiz, area: Rect) {
    let spans: Vec<Span> = quiz
        .questions()
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let glyph = if quiz.answer_for(q.id).is_some() { "●" } else { "○" };
            let style = if i == quiz.current_index() {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(format!("{} ", glyph), style)
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_question(f: &mut Frame, quiz: &Quiz, area: Rect) {
    let Some(q) = quiz.current_question() else {
        return;
    };
    let selected = quiz.answer_for(q.id);

    let mut text = vec![
        Line::from(Span::styled(
            format!("Question {}", quiz.current_index() + 1),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            q.text.as_str(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (i, option) in q.options.iter().enumerate() {
        let marker = if selected == Some(i) { "(•)" } else { "( )" };
        let style = if selected == Some(i) {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };
        text.push(Line::from(Span::styled(
            format!("{} {}. {}", marker, i + 1, option),
            style,
        )));
    }

    let status = if selected.is_some() {
        Span::styled("✓ Answered", Style::default().fg(Color::Green))
    } else {
        Span::styled("Not answered", Style::default().fg(Color::Yellow))
    };
    text.push(Line::from(""));
    text.push(Line::from(status));

    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), area);
}

fn draw_footer(f: &mut Frame, quiz: &Quiz, area: Rect) {
    let total = quiz.questions().len();
    let line = if quiz.all_answered() {
        Span::styled(
            "All questions answered! Ready to submit.",
            Style::default().fg(Color::Green),
        )
    } else {
        Span::styled(
            format!(
                "Please answer all questions before submitting ({}/{} answered)",
                quiz.answered_count(),
                total
            ),
            Style::default().fg(Color::Yellow),
        )
    };
    f.render_widget(Paragraph::new(line), area);
}
