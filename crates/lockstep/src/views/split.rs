//! Side-by-side panes sharing one vertical scroll offset

use crate::app::{slot, App};
use crate::color::{rgb, to_color, UiColors};
use lockstep_core::{
    DecorationClass, Document, Line as DocLine, LineDiffType, LineMark, PaneSide, Rgba, StripeCell,
    ThemeBinding, VisualRow,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Width of the line number gutter
const GUTTER_WIDTH: u16 = 6; // " 1234 "

/// Render both panes. Each pane has a one-row header above its rows.
pub fn render_split(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let body_height = area.height.saturating_sub(1) as usize;
    app.split_column = chunks[1].x;
    app.viewport_height = body_height;
    let max_top = app.total_rows().saturating_sub(body_height);
    app.scroll_top = app.scroll_top.min(max_top);

    render_pane(frame, app, PaneSide::Left, chunks[0]);
    render_pane(frame, app, PaneSide::Right, chunks[1]);
}

fn render_pane(frame: &mut Frame, app: &mut App, side: PaneSide, area: Rect) {
    let focused = app.focus == side;
    let gutter_width = if app.line_numbers { GUTTER_WIDTH } else { 0 };
    let border_width = if side == PaneSide::Left { 1 } else { 0 };

    let rows_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    let (header_area, body_area) = (rows_area[0], rows_area[1]);

    // Gutter (fixed), content (scrollable), then the divider on the left pane
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(gutter_width),
            Constraint::Min(0),
            Constraint::Length(border_width),
        ])
        .split(body_area);
    let (gutter_area, content_area, border_area) = (chunks[0], chunks[1], chunks[2]);

    let width = content_area.width as usize;
    let height = body_area.height as usize;
    if focused {
        app.content_width = width;
    }
    app.pair.pane_mut(side).set_viewport_width(content_area.width.into());
    let cursor = app.cursor(side);
    let top = app.scroll_top;

    let pair = &app.pair;
    let stripes = &mut app.stripes[slot(side)];
    let binding = pair.binding();
    let ui = UiColors::for_theme(binding.theme(), binding.palette());
    let pane = pair.pane(side);

    // Header
    let title_style = if focused {
        Style::default().fg(ui.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(ui.muted)
    };
    let mut title = vec![Span::styled(format!(" {} ", app.names[slot(side)]), title_style)];
    if pane.is_read_only() {
        title.push(Span::styled("[read-only]", Style::default().fg(ui.muted)));
    }
    frame.render_widget(
        Paragraph::new(Line::from(title)).style(Style::default().bg(ui.status_bg)),
        header_area,
    );

    let Some(doc) = pane.doc() else {
        return;
    };
    let skip = pane.scroll_left() as usize;
    let surface = binding.palette().surface_bg;

    let mut gutter_lines: Vec<Line> = Vec::with_capacity(height);
    let mut content_lines: Vec<Line> = Vec::with_capacity(height);
    for (offset, row) in pane.visual_rows().iter().skip(top).take(height).enumerate() {
        match row {
            VisualRow::Placeholder { widget } => {
                gutter_lines.push(Line::from(Span::styled(
                    " ".repeat(gutter_width as usize),
                    Style::default().bg(ui.surface),
                )));
                let cells = stripes.row(widget, width, top + offset);
                content_lines.push(stripe_line(cells, surface));
            }
            VisualRow::Text { line, kind, marks } => {
                let line_bg = line_background(binding, *kind);
                gutter_lines.push(Line::from(Span::styled(
                    format!("{:>5} ", line.index + 1),
                    Style::default().fg(ui.muted).bg(rgb(line_bg)),
                )));
                content_lines.push(text_line(
                    doc,
                    line,
                    marks,
                    skip,
                    width,
                    line_bg,
                    binding,
                    &ui,
                ));

                if focused && (line.from..=line.to).contains(&cursor) {
                    let cell = UnicodeWidthStr::width(doc.slice(line.from, cursor));
                    if cell >= skip && cell - skip < width {
                        frame.set_cursor_position((
                            content_area.x + (cell - skip) as u16,
                            content_area.y + offset as u16,
                        ));
                    }
                }
            }
        }
    }

    frame.render_widget(Paragraph::new(gutter_lines), gutter_area);
    frame.render_widget(
        Paragraph::new(content_lines).style(Style::default().bg(ui.surface)),
        content_area,
    );
    if border_width > 0 {
        let border = Block::default()
            .borders(Borders::RIGHT)
            .border_style(Style::default().fg(ui.muted).bg(ui.surface));
        frame.render_widget(border, border_area);
    }
}

/// Opaque background of a line, composited over the surface
fn line_background(binding: &ThemeBinding, kind: Option<LineDiffType>) -> Rgba {
    let surface = binding.palette().surface_bg;
    kind.and_then(DecorationClass::for_line)
        .and_then(|class| binding.style(class))
        .map_or(surface, |style| style.background.over(surface))
}

#[allow(clippy::too_many_arguments)]
fn text_line(
    doc: &Document,
    line: &DocLine,
    marks: &[LineMark],
    skip: usize,
    width: usize,
    line_bg: Rgba,
    binding: &ThemeBinding,
    ui: &UiColors,
) -> Line<'static> {
    let base = Style::default().fg(ui.text).bg(rgb(line_bg));
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_style = base;
    let (mut column, mut used) = (0usize, 0usize);

    for (index, ch) in doc.slice(line.from, line.to).chars().enumerate() {
        let (ch, w) = match ch {
            '\t' => (' ', 1),
            c => (c, c.width().unwrap_or(0)),
        };
        if column < skip {
            column += w;
            // A wide char cut by the left edge leaves blank cells
            let cut = column.saturating_sub(skip);
            if cut > 0 {
                spans.push(Span::styled(" ".repeat(cut), base));
                used += cut;
            }
            continue;
        }
        if used + w > width {
            break;
        }
        let style = mark_style(marks, index, base, line_bg, binding);
        if style != run_style && !run.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut run), run_style));
        }
        run_style = style;
        run.push(ch);
        column += w;
        used += w;
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, run_style));
    }
    // Pad so the line background spans the pane
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), base));
    }
    Line::from(spans)
}

fn mark_style(
    marks: &[LineMark],
    index: usize,
    base: Style,
    line_bg: Rgba,
    binding: &ThemeBinding,
) -> Style {
    let Some(mark) = marks.iter().find(|m| m.from <= index && index < m.to) else {
        return base;
    };
    let Some(style) = binding.style(DecorationClass::for_inline(mark.kind)) else {
        return base;
    };
    let styled = base.bg(to_color(style.background, line_bg));
    if style.strikethrough {
        styled.add_modifier(Modifier::CROSSED_OUT)
    } else {
        styled
    }
}

fn stripe_line(cells: &[StripeCell], surface: Rgba) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_style = Style::default();
    for cell in cells {
        let style = Style::default()
            .fg(to_color(cell.fg, surface))
            .bg(to_color(cell.bg, surface));
        if style != run_style && !run.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut run), run_style));
        }
        run_style = style;
        run.push(cell.symbol);
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, run_style));
    }
    Line::from(spans)
}
