use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::truncate;
use crate::admin::{EditBuffer, EditField};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    draw_pool(f, app, chunks[0]);
    match app.admin.buffer() {
        Some(buf) => draw_editor(f, buf, chunks[1]),
        None => draw_preview(f, app, chunks[1]),
    }
}

fn draw_pool(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .controller
        .session()
        .question_pool
        .iter()
        .map(|q| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>3}. ", q.id), Style::default().fg(Color::DarkGray)),
                Span::styled(truncate(&q.text, 40), Style::default().fg(Color::White)),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Question Pool ")
        .title_style(Style::default().fg(Color::Cyan));

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.admin.selected));

    f.render_stateful_widget(list, area, &mut state);
}

fn draw_preview(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Question ")
        .title_style(Style::default().fg(Color::Yellow));

    let Some(q) = app.controller.session().question_pool.get(app.admin.selected) else {
        f.render_widget(Paragraph::new("No questions").block(block), area);
        return;
    };

    let mut text = vec![
        Line::from(Span::styled(
            q.text.as_str(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (i, option) in q.options.iter().enumerate() {
        let style = if i == q.correct_answer {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        };
        let mark = if i == q.correct_answer { " ✓" } else { "" };
        text.push(Line::from(Span::styled(
            format!("{}. {}{}", i + 1, option, mark),
            style,
        )));
    }

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_editor(f: &mut Frame, buf: &EditBuffer, area: Rect) {
    let field_style = |field: EditField| {
        if buf.field == field {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        }
    };
    let cursor = |field: EditField| if buf.field == field { "█" } else { "" };

    let mut text = vec![
        Line::from(Span::styled("Question:", field_style(EditField::Text))),
        Line::from(format!("{}{}", buf.text, cursor(EditField::Text))),
        Line::from(""),
    ];
    for (i, option) in buf.options.iter().enumerate() {
        let field = EditField::Option(i);
        let correct = if i == buf.correct_answer {
            Span::styled(" (correct)", Style::default().fg(Color::Green))
        } else {
            Span::raw("")
        };
        text.push(Line::from(vec![
            Span::styled(format!("Option {}: ", i + 1), field_style(field)),
            Span::raw(format!("{}{}", option, cursor(field))),
            correct,
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Editing #{} ", buf.id))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
