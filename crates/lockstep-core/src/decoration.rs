//! Positioned decorations and the set a pane renders from

use crate::document::{Assoc, Edit, MapMode};
use crate::line::{InlineKind, LineDiffType};
use crate::placeholder::{PlaceholderPalette, PlaceholderWidget};

/// Visual classes registered by the theme binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationClass {
    LineAdded,
    LineRemoved,
    LineModified,
    InlineAdded,
    InlineRemoved,
    Placeholder,
}

impl DecorationClass {
    pub const ALL: [DecorationClass; 6] = [
        DecorationClass::LineAdded,
        DecorationClass::LineRemoved,
        DecorationClass::LineModified,
        DecorationClass::InlineAdded,
        DecorationClass::InlineRemoved,
        DecorationClass::Placeholder,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DecorationClass::LineAdded => "diff-line-added",
            DecorationClass::LineRemoved => "diff-line-removed",
            DecorationClass::LineModified => "diff-line-modified",
            DecorationClass::InlineAdded => "diff-inline-added",
            DecorationClass::InlineRemoved => "diff-inline-removed",
            DecorationClass::Placeholder => "diff-placeholder",
        }
    }

    /// Class for a line background; unchanged lines have none
    pub fn for_line(kind: LineDiffType) -> Option<Self> {
        match kind {
            LineDiffType::Added => Some(DecorationClass::LineAdded),
            LineDiffType::Removed => Some(DecorationClass::LineRemoved),
            LineDiffType::Modified => Some(DecorationClass::LineModified),
            LineDiffType::Unchanged => None,
        }
    }

    pub fn for_inline(kind: InlineKind) -> Self {
        match kind {
            InlineKind::Added => DecorationClass::InlineAdded,
            InlineKind::Removed => DecorationClass::InlineRemoved,
        }
    }
}

/// Where a block widget sits relative to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetSide {
    /// Above the line containing the anchor
    Before,
    /// Below the line containing the anchor
    After,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decoration {
    /// Full-row background on the line starting at the anchor
    Line { kind: LineDiffType },
    /// Character range style
    Mark { kind: InlineKind },
    /// Placeholder row inserted next to the anchor's line
    Widget {
        widget: PlaceholderWidget,
        side: WidgetSide,
    },
}

impl Decoration {
    pub fn class(&self) -> Option<DecorationClass> {
        match self {
            Decoration::Line { kind } => DecorationClass::for_line(*kind),
            Decoration::Mark { kind } => Some(DecorationClass::for_inline(*kind)),
            Decoration::Widget { .. } => Some(DecorationClass::Placeholder),
        }
    }

    pub fn is_widget(&self) -> bool {
        matches!(self, Decoration::Widget { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionedDecoration {
    pub from: usize,
    /// Equal to `from` for everything but marks
    pub to: usize,
    pub decoration: Decoration,
}

impl PositionedDecoration {
    pub fn line(pos: usize, kind: LineDiffType) -> Self {
        Self {
            from: pos,
            to: pos,
            decoration: Decoration::Line { kind },
        }
    }

    pub fn mark(from: usize, to: usize, kind: InlineKind) -> Self {
        Self {
            from,
            to,
            decoration: Decoration::Mark { kind },
        }
    }

    pub fn widget(pos: usize, widget: PlaceholderWidget, side: WidgetSide) -> Self {
        Self {
            from: pos,
            to: pos,
            decoration: Decoration::Widget { widget, side },
        }
    }

    /// Rebase onto the post-edit document; `None` if the decoration was deleted.
    ///
    /// Line decorations drop when a deletion spans their anchor. A widget drops
    /// when the character on its own side is deleted, so a placeholder above a
    /// line goes away once that line is joined into the previous one. Marks
    /// shrink to the text that survives and drop only when nothing is left.
    pub fn map(&self, edit: &Edit) -> Option<Self> {
        let (from, to) = match &self.decoration {
            Decoration::Line { .. } => {
                let pos = edit.map_with(self.from, Assoc::Before, MapMode::TrackDel)?;
                (pos, pos)
            }
            Decoration::Widget { side: WidgetSide::Before, .. } => {
                let pos = edit.map_with(self.from, Assoc::Before, MapMode::TrackBefore)?;
                (pos, pos)
            }
            Decoration::Widget { side: WidgetSide::After, .. } => {
                let pos = edit.map_with(self.from, Assoc::After, MapMode::TrackAfter)?;
                (pos, pos)
            }
            Decoration::Mark { .. } => {
                let from = edit.map_with(self.from, Assoc::After, MapMode::Simple)?;
                let to = edit.map_with(self.to, Assoc::Before, MapMode::Simple)?;
                if from >= to {
                    return None;
                }
                (from, to)
            }
        };
        Some(Self {
            from,
            to,
            decoration: self.decoration.clone(),
        })
    }
}

/// Decorations sorted by start position (ties keep insertion order)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecorationSet {
    items: Vec<PositionedDecoration>,
}

impl DecorationSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(mut items: Vec<PositionedDecoration>) -> Self {
        items.sort_by_key(|d| d.from);
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PositionedDecoration> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[PositionedDecoration] {
        &self.items
    }

    /// Rebase every decoration through an edit, dropping deleted anchors
    pub fn map(&self, edit: &Edit) -> DecorationSet {
        let items: Vec<_> = self.items.iter().filter_map(|d| d.map(edit)).collect();
        let dropped = self.items.len() - items.len();
        if dropped > 0 {
            tracing::trace!(dropped, ?edit, "decorations dropped by edit");
        }
        DecorationSet::new(items)
    }

    /// Swap the colors of every placeholder widget. Returns how many changed.
    pub fn repaint(&mut self, palette: PlaceholderPalette) -> usize {
        let replacement = PlaceholderWidget::new(palette);
        let mut changed = 0;
        for item in &mut self.items {
            if let Decoration::Widget { widget, .. } = &mut item.decoration {
                if *widget != replacement {
                    *widget = replacement;
                    changed += 1;
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    fn widget() -> PlaceholderWidget {
        PlaceholderWidget::new(PlaceholderPalette {
            stripe1: Rgba::opaque(1, 1, 1),
            stripe2: Rgba::opaque(2, 2, 2),
            border: Rgba::opaque(3, 3, 3),
        })
    }

    #[test]
    fn test_new_sorts_stably() {
        let set = DecorationSet::new(vec![
            PositionedDecoration::widget(9, widget(), WidgetSide::After),
            PositionedDecoration::line(2, LineDiffType::Added),
            PositionedDecoration::mark(2, 4, InlineKind::Added),
            PositionedDecoration::line(0, LineDiffType::Removed),
        ]);
        let starts: Vec<_> = set.iter().map(|d| d.from).collect();
        assert_eq!(starts, vec![0, 2, 2, 9]);
        assert!(matches!(set.as_slice()[1].decoration, Decoration::Line { .. }));
        assert!(matches!(set.as_slice()[2].decoration, Decoration::Mark { .. }));
    }

    #[test]
    fn test_unchanged_line_has_no_class() {
        assert_eq!(
            PositionedDecoration::line(0, LineDiffType::Unchanged).decoration.class(),
            None
        );
        assert_eq!(
            PositionedDecoration::line(0, LineDiffType::Removed).decoration.class(),
            Some(DecorationClass::LineRemoved)
        );
    }

    #[test]
    fn test_map_mark_shrinks_or_drops() {
        let mark = PositionedDecoration::mark(4, 8, InlineKind::Removed);
        let before = Edit { from: 0, to: 0, inserted: 2 };
        assert_eq!(mark.map(&before).map(|d| (d.from, d.to)), Some((6, 10)));

        // Deleting the tail of the mark keeps its head
        let tail = Edit { from: 6, to: 10, inserted: 0 };
        assert_eq!(mark.map(&tail).map(|d| (d.from, d.to)), Some((4, 6)));

        let head = Edit { from: 2, to: 6, inserted: 0 };
        assert_eq!(mark.map(&head).map(|d| (d.from, d.to)), Some((2, 4)));

        // Nothing left once the whole mark is covered
        let whole = Edit { from: 3, to: 9, inserted: 1 };
        assert_eq!(mark.map(&whole), None);

        // Typing at the mark start is not absorbed into it
        let at_start = Edit { from: 4, to: 4, inserted: 1 };
        assert_eq!(mark.map(&at_start).map(|d| (d.from, d.to)), Some((5, 9)));
    }

    #[test]
    fn test_trailing_widget_follows_appended_text() {
        let w = PositionedDecoration::widget(5, widget(), WidgetSide::After);
        let append = Edit { from: 5, to: 5, inserted: 3 };
        assert_eq!(w.map(&append).map(|d| d.from), Some(8));

        let before = PositionedDecoration::widget(5, widget(), WidgetSide::Before);
        assert_eq!(before.map(&append).map(|d| d.from), Some(5));
    }

    #[test]
    fn test_leading_widget_drops_with_line_break_above() {
        let w = PositionedDecoration::widget(4, widget(), WidgetSide::Before);
        let join = Edit { from: 3, to: 4, inserted: 0 };
        assert_eq!(w.map(&join), None);

        // A line decoration at the same anchor survives the join
        let line = PositionedDecoration::line(4, LineDiffType::Added);
        assert_eq!(line.map(&join).map(|d| d.from), Some(3));

        let after_it = Edit { from: 4, to: 5, inserted: 0 };
        assert_eq!(w.map(&after_it).map(|d| d.from), Some(4));
    }

    #[test]
    fn test_repaint_counts_changes() {
        let mut set = DecorationSet::new(vec![
            PositionedDecoration::widget(0, widget(), WidgetSide::Before),
            PositionedDecoration::line(0, LineDiffType::Added),
        ]);
        let same = *widget().palette();
        assert_eq!(set.repaint(same), 0);

        let mut other = same;
        other.stripe1 = Rgba::opaque(7, 7, 7);
        assert_eq!(set.repaint(other), 1);
        assert!(matches!(
            &set.as_slice()[0].decoration,
            Decoration::Widget { widget, .. } if widget.palette().stripe1 == Rgba::opaque(7, 7, 7)
        ));
    }
}
