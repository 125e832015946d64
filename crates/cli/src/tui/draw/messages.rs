use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Row, Table, Wrap},
};

use common::MessageBuffer;

use super::{
    format_bytes, truncate_to_width, THEME_ACCENT, THEME_MUTED, THEME_PRIMARY, THEME_TEXT,
    THEME_WARNING,
};

pub fn draw_messages(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    monitored: Option<&str>,
    buffer: &MessageBuffer,
) {
    let Some(vhost) = monitored else {
        let hint = vec![
            Line::from(Span::styled(
                "ℹ️  Message monitoring is not active",
                Style::default().fg(THEME_WARNING),
            )),
            Line::from(Span::styled(
                "Press \"m\" to choose a vHost to monitor",
                Style::default().fg(THEME_MUTED),
            )),
        ];
        let p = Paragraph::new(hint)
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
            .wrap(Wrap { trim: true });
        f.render_widget(p, area);
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME_WARNING))
        .title(format!(" Recent messages (vHost: {vhost}) "))
        .title_style(Style::default().fg(THEME_TEXT).add_modifier(Modifier::BOLD));

    if buffer.is_empty() {
        let p = Paragraph::new("No message intercepted yet (waiting...)")
            .style(Style::default().fg(THEME_MUTED))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let cols = ["Time", "Routing key", "Exchange", "Size", "Payload"];
    let header = Row::new(cols.iter().map(|h| {
        Line::from(*h).style(
            Style::default()
                .fg(THEME_WARNING)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let visible = area.height.saturating_sub(3) as usize;
    let payload_width = (area.width as usize).saturating_sub(10 + 30 + 24 + 12 + 8);
    let rows: Vec<Row> = buffer
        .messages()
        .take(visible)
        .map(|m| {
            Row::new(vec![
                Line::from(m.received_at.format("%H:%M:%S").to_string())
                    .style(Style::default().fg(THEME_MUTED)),
                Line::from(m.routing_key.clone()).style(Style::default().fg(THEME_PRIMARY)),
                Line::from(m.exchange_label().to_string()).style(Style::default().fg(THEME_ACCENT)),
                Line::from(format_bytes(m.size_bytes)).style(Style::default().fg(THEME_TEXT)),
                Line::from(truncate_to_width(&m.payload.preview(), payload_width))
                    .style(Style::default().fg(THEME_MUTED)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(30),
            Constraint::Length(24),
            Constraint::Length(12),
            Constraint::Min(8),
        ],
    )
    .header(header)
    .block(block);

    f.render_widget(table, area);
}
