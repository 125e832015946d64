use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use common::TopologySnapshot;

use super::{truncate_to_width, THEME_ACCENT, THEME_MUTED, THEME_PRIMARY, THEME_TEXT, THEME_WARNING};

const MENU_COLUMNS: usize = 3;

pub fn draw_vhost_menu(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    topology: &TopologySnapshot,
    pending: Option<&str>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME_ACCENT))
        .title(" Available vHosts ")
        .title_style(Style::default().fg(THEME_TEXT).add_modifier(Modifier::BOLD));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(inner);

    if topology.vhosts.is_empty() {
        let p = Paragraph::new(Line::from(Span::styled(
            "No vHost available. Press Enter to go back.",
            Style::default().fg(THEME_WARNING),
        )));
        f.render_widget(p, rows[0]);
        return;
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
        .split(rows[0]);

    // Fill column-major so numbering reads top to bottom.
    let per_column = topology.vhosts.len().div_ceil(MENU_COLUMNS);
    let cell_width = (cols[0].width as usize).saturating_sub(1);
    for (col, rect) in cols.iter().enumerate() {
        let lines: Vec<Line> = topology
            .vhosts
            .iter()
            .enumerate()
            .skip(col * per_column)
            .take(per_column)
            .map(|(i, v)| {
                let queues = topology.queue_count(&v.name);
                let style = if queues > 0 {
                    Style::default().fg(THEME_TEXT).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(THEME_MUTED)
                };
                let label = format!("{:>3}. {} ({queues} queues)", i + 1, v.name);
                Line::from(Span::styled(truncate_to_width(&label, cell_width), style))
            })
            .collect();
        f.render_widget(Paragraph::new(lines), *rect);
    }

    let prompt = Line::from(vec![
        Span::styled(
            "Number of the vHost to monitor (0 to cancel): ",
            Style::default().fg(THEME_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(pending.unwrap_or_default().to_string(), Style::default().fg(THEME_TEXT)),
        Span::styled("▏", Style::default().fg(THEME_ACCENT)),
    ]);
    f.render_widget(Paragraph::new(prompt), rows[1]);
}
