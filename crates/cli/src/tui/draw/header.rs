use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::tui::state::{AppState, View};

use super::{THEME_ACCENT, THEME_MUTED, THEME_PRIMARY, THEME_SUCCESS, THEME_TEXT};

pub fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let title = match app.view {
        View::Dashboard => " Connection monitor for ",
        View::VhostMenu => " Select the vHost to monitor │ ",
    };
    let mut spans = vec![
        Span::styled(title, Style::default().fg(THEME_TEXT).add_modifier(Modifier::BOLD)),
        Span::styled("Rabbit", Style::default().fg(THEME_ACCENT).add_modifier(Modifier::BOLD)),
        Span::styled("MQ", Style::default().fg(THEME_TEXT).add_modifier(Modifier::BOLD)),
        Span::styled(format!(" │ {} ", app.broker_host), Style::default().fg(THEME_MUTED)),
    ];
    match app.session.monitored_vhost() {
        Some(vhost) => spans.push(Span::styled(
            format!("│ monitoring {vhost} "),
            Style::default().fg(THEME_SUCCESS),
        )),
        None => spans.push(Span::styled("│ idle ", Style::default().fg(THEME_MUTED))),
    }

    // Avoid setting a background; some terminals render unknown colors as bright red.
    f.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

    let rule = Block::default()
        .borders(Borders::BOTTOM)
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(THEME_PRIMARY));
    f.render_widget(rule, chunks[1]);
}
