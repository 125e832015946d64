use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::tui::state::{AppState, View};

use super::{THEME_MUTED, THEME_PRIMARY, THEME_SURFACE};

pub fn draw_footer(f: &mut ratatui::Frame<'_>, area: Rect, app: &AppState) {
    let shortcuts: Vec<(&str, &str)> = match (app.view, app.session.is_active()) {
        (View::VhostMenu, _) => vec![("0-9", "Type number"), ("Enter", "Confirm"), ("Ctrl+C", "Exit")],
        (View::Dashboard, true) => vec![("s", "Stop monitoring"), ("q/Ctrl+C", "Exit")],
        (View::Dashboard, false) => vec![("m", "Monitor vHost"), ("q/Ctrl+C", "Exit")],
    };

    let mut help_text: Vec<Span> = shortcuts
        .iter()
        .enumerate()
        .flat_map(|(i, (key, desc))| {
            let mut spans = vec![
                Span::styled(
                    key.to_string(),
                    Style::default()
                        .fg(THEME_PRIMARY)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" {}", desc), Style::default().fg(THEME_MUTED)),
            ];
            if i < shortcuts.len() - 1 {
                spans.push(Span::styled("  │  ", Style::default().fg(THEME_MUTED)));
            }
            spans
        })
        .collect();

    if let Some(at) = app.last_refresh {
        help_text.push(Span::styled(
            format!("    last update {}", at.format("%H:%M:%S")),
            Style::default().fg(THEME_MUTED),
        ));
    }

    let footer_block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(THEME_MUTED))
        .style(Style::default().bg(THEME_SURFACE));

    let footer_para = Paragraph::new(Line::from(help_text))
        .alignment(Alignment::Center)
        .block(footer_block)
        .wrap(Wrap { trim: true });

    f.render_widget(footer_para, area);
}
