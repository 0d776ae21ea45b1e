//! Reads a decoration set against its document and yields visual rows

use crate::decoration::{Decoration, DecorationSet, WidgetSide};
use crate::document::{Document, Line};
use crate::line::{InlineKind, LineDiffType};
use crate::placeholder::PlaceholderWidget;

/// Inline mark clipped to one line; offsets are relative to the line start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMark {
    pub from: usize,
    pub to: usize,
    pub kind: InlineKind,
}

/// One drawn row of a pane
#[derive(Debug, Clone, PartialEq)]
pub enum VisualRow {
    /// A real document line
    Text {
        line: Line,
        /// `None` when the line carries no line decoration at all
        kind: Option<LineDiffType>,
        marks: Vec<LineMark>,
    },
    /// Filler row with no backing text
    Placeholder { widget: PlaceholderWidget },
}

impl VisualRow {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, VisualRow::Placeholder { .. })
    }

    /// Document line behind this row, if any
    pub fn line(&self) -> Option<&Line> {
        match self {
            VisualRow::Text { line, .. } => Some(line),
            VisualRow::Placeholder { .. } => None,
        }
    }
}

#[derive(Default)]
struct LineSlot {
    before: Vec<PlaceholderWidget>,
    after: Vec<PlaceholderWidget>,
    kind: Option<LineDiffType>,
    marks: Vec<LineMark>,
}

/// Lay out every document line plus the placeholder rows around them
pub fn layout(doc: &Document, set: &DecorationSet) -> Vec<VisualRow> {
    let mut slots: Vec<LineSlot> = (0..doc.line_count())
        .map(|_| LineSlot::default())
        .collect();

    for item in set.iter() {
        let anchor = doc.line_at(item.from);
        let Some(slot) = slots.get_mut(anchor.index) else {
            continue;
        };
        match &item.decoration {
            Decoration::Line { kind } => slot.kind = Some(*kind),
            Decoration::Widget { widget, side: WidgetSide::Before } => slot.before.push(*widget),
            Decoration::Widget { widget, side: WidgetSide::After } => slot.after.push(*widget),
            Decoration::Mark { kind } => {
                // A remapped mark can span a joined line break
                let last = doc.line_at(item.to).index;
                for index in anchor.index..=last {
                    let Some(line) = doc.line(index) else {
                        break;
                    };
                    let from = item.from.max(line.from);
                    let to = item.to.min(line.to);
                    if from < to {
                        slots[index].marks.push(LineMark {
                            from: from - line.from,
                            to: to - line.from,
                            kind: *kind,
                        });
                    }
                }
            }
        }
    }

    let mut rows = Vec::with_capacity(slots.len() + set.len());
    for (index, slot) in slots.into_iter().enumerate() {
        rows.extend(slot.before.into_iter().map(|widget| VisualRow::Placeholder { widget }));
        if let Some(line) = doc.line(index) {
            rows.push(VisualRow::Text {
                line,
                kind: slot.kind,
                marks: slot.marks,
            });
        }
        rows.extend(slot.after.into_iter().map(|widget| VisualRow::Placeholder { widget }));
    }
    rows
}
