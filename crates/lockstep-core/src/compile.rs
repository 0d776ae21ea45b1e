//! Diff metadata + document shape -> positioned decorations

use crate::decoration::{DecorationSet, PositionedDecoration, WidgetSide};
use crate::document::{Document, Line};
use crate::line::{DiffLineInfo, InlineDiffSegment};
use crate::placeholder::{PlaceholderPalette, PlaceholderWidget};

/// Everything one recompute needs; applied as a single unit
#[derive(Debug, Clone, PartialEq)]
pub struct DiffDecorationConfig {
    pub lines: Vec<DiffLineInfo>,
    pub palette: PlaceholderPalette,
}

impl DiffDecorationConfig {
    pub fn new(lines: Vec<DiffLineInfo>, palette: PlaceholderPalette) -> Self {
        Self { lines, palette }
    }

    pub fn compile(&self, doc: &Document) -> DecorationSet {
        DecorationSet::new(compile(&self.lines, doc, &self.palette))
    }
}

/// Build decorations for `lines` against the current document.
///
/// Never fails: entries that cannot be anchored are dropped. The result is
/// sorted by start position, ties in emission order.
pub fn compile(
    lines: &[DiffLineInfo],
    doc: &Document,
    palette: &PlaceholderPalette,
) -> Vec<PositionedDecoration> {
    let widget = PlaceholderWidget::new(*palette);
    let mut out = Vec::with_capacity(lines.len());
    let mut tail_placeholders = 0usize;
    let mut dropped = 0usize;

    for info in lines {
        if info.editor_line < 0 {
            dropped += 1;
            continue;
        }
        let index = info.editor_line as usize;
        // Rows past the last real line have no anchor of their own
        let line = match doc.line(index) {
            Some(line) => line,
            None => {
                if info.is_placeholder {
                    tail_placeholders += 1;
                } else {
                    dropped += 1;
                }
                continue;
            }
        };

        if info.is_placeholder {
            out.push(PositionedDecoration::widget(line.from, widget, WidgetSide::Before));
            continue;
        }

        out.push(PositionedDecoration::line(line.from, info.kind));
        for segment in info.inline_diffs.iter().flatten() {
            match clip_segment(segment, &line) {
                Some((from, to)) => out.push(PositionedDecoration::mark(from, to, segment.kind)),
                None => dropped += 1,
            }
        }
    }

    let doc_end = doc.len();
    for _ in 0..tail_placeholders {
        out.push(PositionedDecoration::widget(doc_end, widget, WidgetSide::After));
    }

    if dropped > 0 {
        tracing::debug!(dropped, "skipped malformed diff entries");
    }

    out.sort_by_key(|d| d.from);
    out
}

/// Absolute range of a segment clipped to its line, or `None` if nothing remains
fn clip_segment(segment: &InlineDiffSegment, line: &Line) -> Option<(usize, usize)> {
    let len = line.len() as i64;
    let from = segment.from.max(0);
    let to = segment.to.min(len);
    if from >= to {
        return None;
    }
    Some((line.from + from as usize, line.from + to as usize))
}
