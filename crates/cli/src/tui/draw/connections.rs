use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Row, Table},
};

use common::ConnectionInfo;

use super::{THEME_ERROR, THEME_PRIMARY, THEME_SUCCESS, THEME_TEXT, THEME_WARNING};

pub fn draw_connections(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    connections: &[ConnectionInfo],
    limit: usize,
) {
    let cols = ["User", "VHost", "Protocol", "Peer (host:port)", "State"];
    let header = Row::new(cols.iter().map(|h| {
        Line::from(*h).style(
            Style::default()
                .fg(THEME_SUCCESS)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows: Vec<Row> = connections
        .iter()
        .take(limit)
        .map(|c| {
            let (dot, color) = if c.is_running() {
                ("●", THEME_SUCCESS)
            } else {
                ("○", THEME_ERROR)
            };
            Row::new(vec![
                Line::from(c.user.clone()).style(Style::default().fg(THEME_TEXT)),
                Line::from(c.vhost.clone()).style(Style::default().fg(THEME_WARNING)),
                Line::from(c.protocol.clone().unwrap_or_else(|| "N/A".into()))
                    .style(Style::default().fg(THEME_PRIMARY)),
                Line::from(c.peer()).style(Style::default().fg(THEME_PRIMARY)),
                Line::from(dot).style(Style::default().fg(color)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(25),
            Constraint::Percentage(20),
            Constraint::Length(15),
            Constraint::Percentage(30),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(THEME_PRIMARY))
            .title(format!(" Active connections ({}) ", connections.len()))
            .title_style(Style::default().fg(THEME_TEXT).add_modifier(Modifier::BOLD)),
    );

    f.render_widget(table, area);
}
