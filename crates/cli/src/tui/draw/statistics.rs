use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::tui::state::AppState;

use super::{humanize_duration, THEME_MUTED, THEME_PRIMARY, THEME_TEXT};

pub fn draw_statistics(f: &mut ratatui::Frame<'_>, area: Rect, app: &AppState) {
    let stats = app.buffer.statistics();
    let uptime = (chrono::Local::now() - stats.start_time)
        .to_std()
        .unwrap_or_default();

    let mut left = vec![
        metric("vHosts available", app.topology.vhosts.len().to_string()),
        metric("Total queues", app.topology.queues.len().to_string()),
        metric("Session uptime", humanize_duration(uptime)),
    ];
    let mut right = Vec::new();
    if app.session.is_active() {
        left.push(metric("Messages intercepted", stats.total_messages.to_string()));
        left.push(metric("Active connections", app.topology.connections.len().to_string()));
        left.push(metric(
            "Messages in memory",
            format!("{}/{}", app.buffer.len(), app.buffer.max_messages()),
        ));
        right.push(Line::from(Span::styled(
            "Top routing keys",
            Style::default().fg(THEME_MUTED).add_modifier(Modifier::BOLD),
        )));
        for (key, count) in stats.top_routing_keys(3) {
            right.push(metric(key, count.to_string()));
        }
        right.push(Line::from(Span::styled(
            "Messages per vHost",
            Style::default().fg(THEME_MUTED).add_modifier(Modifier::BOLD),
        )));
        for (vhost, count) in stats.top_vhosts(2) {
            right.push(metric(vhost, count.to_string()));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME_PRIMARY))
        .title(" Statistics ")
        .title_style(Style::default().fg(THEME_TEXT).add_modifier(Modifier::BOLD));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);
    f.render_widget(Paragraph::new(left), cols[0]);
    f.render_widget(Paragraph::new(right), cols[1]);
}

fn metric(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<28}"), Style::default().fg(THEME_TEXT)),
        Span::styled(value, Style::default().fg(THEME_PRIMARY)),
    ])
}
