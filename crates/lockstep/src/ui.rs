//! UI rendering for the TUI

use crate::app::App;
use crate::color::UiColors;
use crate::views::render_split;
use lockstep_core::PaneSide;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const KEY_HINTS: &str = "Tab focus  ^R diff  ^T theme  ^O read-only  ^L numbers  ^Q quit ";

/// Main drawing function
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Panes
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_split(frame, app, chunks[0]);
    draw_status_bar(frame, app, chunks[1]);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let binding = app.pair.binding();
    let ui = UiColors::for_theme(binding.theme(), binding.palette());
    let base = Style::default().fg(ui.text).bg(ui.status_bg);

    let focus = match app.focus {
        PaneSide::Left => " LEFT ",
        PaneSide::Right => " RIGHT ",
    };
    let mut spans = vec![
        Span::styled(
            focus,
            Style::default()
                .fg(ui.status_bg)
                .bg(ui.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {} ", binding.theme()), base),
        Span::styled(
            format!("{} rows ", app.rows),
            Style::default().fg(ui.muted).bg(ui.status_bg),
        ),
    ];
    if app.recompute_pending() {
        spans.push(Span::styled(
            "diff pending ",
            Style::default().fg(ui.accent).bg(ui.status_bg),
        ));
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(KEY_HINTS.len() as u16)])
        .split(area);
    frame.render_widget(Paragraph::new(Line::from(spans)).style(base), chunks[0]);
    frame.render_widget(
        Paragraph::new(KEY_HINTS)
            .style(Style::default().fg(ui.muted).bg(ui.status_bg))
            .alignment(Alignment::Right),
        chunks[1],
    );
}
