use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::truncate;
use crate::models::{ScoreChange, Step};
use crate::quiz::Quiz;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let session = app.controller.session();

    if app.step() == Step::PreTestResults {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(area);
        draw_card(f, "Pre-Test Score", &session.pre_test, chunks[0]);
        let prompt = Paragraph::new("Press <CR> to proceed to the video →")
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(prompt, chunks[1]);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    draw_card(f, "Pre-Test Score", &session.pre_test, cards[0]);
    draw_card(f, "Post-Test Score", &session.post_test, cards[1]);

    let change = ScoreChange::between(session.pre_test.score(), session.post_test.score());
    let color = match change {
        ScoreChange::Improved(_) => Color::Green,
        ScoreChange::Declined(_) => Color::Red,
        ScoreChange::Unchanged | ScoreChange::Pending => Color::Yellow,
    };
    let summary = Paragraph::new(Span::styled(change.message(), Style::default().fg(color)))
        .block(Block::default().borders(Borders::ALL).title(" Quiz Results "));
    f.render_widget(summary, chunks[1]);
}

fn draw_card(f: &mut Frame, title: &str, quiz: &Quiz, area: Rect) {
    let mut text = vec![
        Line::from(Span::styled(
            format!("{}%", quiz.score().unwrap_or(0)),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "{} / {} correct",
            quiz.correct_count(),
            quiz.questions().len()
        )),
        Line::from(""),
    ];

    for q in quiz.questions() {
        let answer = quiz.answer_for(q.id);
        let (mark, color) = if q.is_correct(answer) {
            ("✓", Color::Green)
        } else {
            ("✗", Color::Red)
        };
        text.push(Line::from(vec![
            Span::styled(format!("{} ", mark), Style::default().fg(color)),
            Span::raw(truncate(&q.text, 50)),
        ]));
        if !q.is_correct(answer) {
            text.push(Line::from(Span::styled(
                format!("    correct: {}", q.correct_option()),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), area);
}
