use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Color,
};

use crate::tui::state::{AppState, View};

// Color scheme constants for consistent theming
pub const THEME_PRIMARY: Color = Color::Rgb(79, 172, 254); // Blue
pub const THEME_SUCCESS: Color = Color::Rgb(34, 197, 94); // Green
pub const THEME_WARNING: Color = Color::Rgb(251, 191, 36); // Yellow
pub const THEME_ERROR: Color = Color::Rgb(239, 68, 68); // Red
pub const THEME_MUTED: Color = Color::Rgb(156, 163, 175); // Gray
pub const THEME_ACCENT: Color = Color::Rgb(255, 102, 0); // RabbitMQ orange
pub const THEME_SURFACE: Color = Color::Rgb(31, 41, 55); // Lighter blue-gray
pub const THEME_TEXT: Color = Color::Rgb(243, 244, 246); // Light gray

mod connections;
mod footer;
mod format;
mod header;
mod messages;
mod overlay;
mod queues;
mod statistics;
mod vhost_menu;

pub use connections::draw_connections;
pub use footer::draw_footer;
pub use format::{format_bytes, humanize_duration, truncate_to_width};
pub use header::draw_header;
pub use messages::draw_messages;
pub use overlay::draw_overlay;
pub use queues::draw_queues;
pub use statistics::draw_statistics;
pub use vhost_menu::draw_vhost_menu;

/// Rows shown in the connection and queue tables.
const TABLE_ROWS: usize = 10;

pub fn draw_app(f: &mut ratatui::Frame<'_>, app: &AppState) {
    let area = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1), Constraint::Length(3)])
        .split(area);

    draw_header(f, chunks[0], app);
    match app.view {
        View::Dashboard => draw_dashboard(f, chunks[1], app),
        View::VhostMenu => draw_vhost_menu(f, chunks[1], &app.topology, app.input.pending_line()),
    }
    draw_footer(f, chunks[2], app);

    if let Some(msg) = app.overlay() {
        draw_overlay(f, area, msg);
    }
}

fn draw_dashboard(f: &mut ratatui::Frame<'_>, area: ratatui::layout::Rect, app: &AppState) {
    let display = &app.display;
    let topo = &app.topology;
    let monitoring = app.session.is_active();

    let mut panels: Vec<(Constraint, Panel)> = Vec::new();
    if display.show_statistics {
        let rows = if monitoring { 9 } else { 5 };
        panels.push((Constraint::Length(rows), Panel::Statistics));
    }
    if display.show_connections && !topo.connections.is_empty() {
        let rows = topo.connections.len().min(TABLE_ROWS) as u16 + 3;
        panels.push((Constraint::Length(rows), Panel::Connections));
    }
    if display.show_queues && !topo.queues.is_empty() {
        let rows = topo.queues.len().min(TABLE_ROWS) as u16 + 3;
        panels.push((Constraint::Length(rows), Panel::Queues));
    }
    if display.show_messages {
        panels.push((Constraint::Min(4), Panel::Messages));
    }
    if panels.is_empty() {
        return;
    }

    let rects = Layout::default()
        .direction(Direction::Vertical)
        .constraints(panels.iter().map(|(c, _)| *c).collect::<Vec<_>>())
        .split(area);

    for ((_, panel), rect) in panels.iter().zip(rects.iter()) {
        match panel {
            Panel::Statistics => draw_statistics(f, *rect, app),
            Panel::Connections => draw_connections(f, *rect, &topo.connections, TABLE_ROWS),
            Panel::Queues => draw_queues(f, *rect, &topo.queues, TABLE_ROWS),
            Panel::Messages => draw_messages(f, *rect, app.session.monitored_vhost(), &app.buffer),
        }
    }
}

enum Panel {
    Statistics,
    Connections,
    Queues,
    Messages,
}
