use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Row, Table},
};

use common::QueueInfo;

use super::{truncate_to_width, THEME_ACCENT, THEME_PRIMARY, THEME_TEXT, THEME_WARNING};

pub fn draw_queues(f: &mut ratatui::Frame<'_>, area: Rect, queues: &[QueueInfo], limit: usize) {
    let cols = ["Name", "VHost", "Messages", "Consumers"];
    let header = Row::new(cols.iter().map(|h| {
        Line::from(*h).style(
            Style::default()
                .fg(THEME_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let name_width = (area.width as usize * 40 / 100).saturating_sub(1);
    let rows: Vec<Row> = queues
        .iter()
        .take(limit)
        .map(|q| {
            let backlog = if q.messages > 0 {
                Style::default().fg(THEME_ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(THEME_PRIMARY)
            };
            Row::new(vec![
                Line::from(truncate_to_width(&q.name, name_width)).style(Style::default().fg(THEME_TEXT)),
                Line::from(q.vhost.clone()).style(Style::default().fg(THEME_WARNING)),
                Line::from(q.messages.to_string()).style(backlog),
                Line::from(q.consumers.to_string()).style(Style::default().fg(THEME_PRIMARY)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(36),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(THEME_ACCENT))
            .title(format!(" Queues ({}) ", queues.len()))
            .title_style(Style::default().fg(THEME_TEXT).add_modifier(Modifier::BOLD)),
    );

    f.render_widget(table, area);
}
