//! Per-pane holder of the active decoration set

use crate::compile::DiffDecorationConfig;
use crate::decoration::DecorationSet;
use crate::document::{Document, Edit};
use crate::placeholder::PlaceholderPalette;
use crate::state::Effect;

/// Owns one pane's decorations.
///
/// The set is either consistent with the pane's current document or empty.
/// Explicit recomputes replace it wholesale; document edits only rebase it.
#[derive(Debug, Clone, Default)]
pub struct DecorationStore {
    active: DecorationSet,
}

impl DecorationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decorations(&self) -> &DecorationSet {
        &self.active
    }

    /// Replace the active set with a fresh compile against `doc`
    pub fn recompute(&mut self, config: &DiffDecorationConfig, doc: &Document) {
        self.active = config.compile(doc);
        tracing::debug!(
            lines = config.lines.len(),
            decorations = self.active.len(),
            "recomputed diff decorations"
        );
    }

    /// Rebase the active set through a document edit
    pub fn remap(&mut self, edit: &Edit) {
        if self.active.is_empty() {
            return;
        }
        self.active = self.active.map(edit);
    }

    pub fn repaint(&mut self, palette: PlaceholderPalette) -> usize {
        self.active.repaint(palette)
    }

    pub fn clear(&mut self) {
        self.active = DecorationSet::empty();
    }

    /// Apply one transaction's worth of updates. `doc` is the post-change
    /// document. A recompute in the same transaction supersedes the remap.
    pub fn update(&mut self, effects: &[Effect], edit: Option<&Edit>, doc: &Document) {
        let mut recomputed = false;
        for effect in effects {
            let Effect::SetDiffDecorations(config) = effect;
            self.recompute(config, doc);
            recomputed = true;
        }
        if !recomputed {
            if let Some(edit) = edit {
                self.remap(edit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::decoration::{Decoration, WidgetSide};
    use crate::document::ChangeSpec;
    use crate::line::{DiffLineInfo, InlineDiffSegment, InlineKind, LineDiffType};

    fn palette() -> PlaceholderPalette {
        PlaceholderPalette {
            stripe1: Rgba::opaque(0xe0, 0xe0, 0xe0),
            stripe2: Rgba::opaque(0xec, 0xec, 0xec),
            border: Rgba::opaque(0xd0, 0xd0, 0xd0),
        }
    }

    fn config(lines: Vec<DiffLineInfo>) -> DiffDecorationConfig {
        DiffDecorationConfig::new(lines, palette())
    }

    fn starts(store: &DecorationStore) -> Vec<usize> {
        store.decorations().iter().map(|d| d.from).collect()
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let doc = Document::new("a\nb\nc");
        let cfg = config(vec![
            DiffLineInfo::line(1, LineDiffType::Added),
            DiffLineInfo::placeholder(3),
        ]);
        let mut store = DecorationStore::new();
        store.recompute(&cfg, &doc);
        let first = store.decorations().clone();
        store.recompute(&cfg, &doc);
        assert_eq!(store.decorations(), &first);
        assert_eq!(store.decorations().len(), 2);
    }

    #[test]
    fn test_recompute_with_no_lines_clears() {
        let doc = Document::new("a\nb");
        let mut store = DecorationStore::new();
        store.recompute(&config(vec![DiffLineInfo::line(0, LineDiffType::Removed)]), &doc);
        assert!(!store.decorations().is_empty());
        store.recompute(&config(vec![]), &doc);
        assert!(store.decorations().is_empty());
    }

    #[test]
    fn test_insert_before_shifts_and_after_keeps() {
        let mut doc = Document::new("aaa\nbbb\nccc");
        let mut store = DecorationStore::new();
        store.recompute(&config(vec![DiffLineInfo::line(1, LineDiffType::Modified)]), &doc);
        assert_eq!(starts(&store), vec![4]);

        let edit = doc.apply(&ChangeSpec::insert(1, "xyz")).unwrap();
        store.remap(&edit);
        assert_eq!(starts(&store), vec![7]);

        let edit = doc.apply(&ChangeSpec::insert(12, "!")).unwrap();
        store.remap(&edit);
        assert_eq!(starts(&store), vec![7]);
    }

    #[test]
    fn test_anchor_inside_deletion_is_dropped() {
        let mut doc = Document::new("aa\nbb\ncc");
        let mut store = DecorationStore::new();
        store.recompute(
            &config(vec![
                DiffLineInfo::line(0, LineDiffType::Added),
                DiffLineInfo::line(1, LineDiffType::Removed),
                DiffLineInfo::line(2, LineDiffType::Added),
            ]),
            &doc,
        );
        // Delete "a\nb": line 1's start (3) falls strictly inside
        let edit = doc.apply(&ChangeSpec::delete(1, 4)).unwrap();
        store.remap(&edit);
        assert_eq!(starts(&store), vec![0, 3]);
        assert_eq!(doc.line(1).unwrap().from, 3);
    }

    #[test]
    fn test_recompute_effect_wins_over_remap() {
        let mut doc = Document::new("a\nb");
        let mut store = DecorationStore::new();
        store.recompute(&config(vec![DiffLineInfo::line(1, LineDiffType::Added)]), &doc);

        let edit = doc.apply(&ChangeSpec::insert(0, "zz\n")).unwrap();
        let effects = vec![Effect::SetDiffDecorations(config(vec![DiffLineInfo::line(
            0,
            LineDiffType::Removed,
        )]))];
        store.update(&effects, Some(&edit), &doc);
        assert_eq!(starts(&store), vec![0]);
        assert!(matches!(
            store.decorations().as_slice()[0].decoration,
            Decoration::Line { kind: LineDiffType::Removed }
        ));
    }

    #[test]
    fn test_marks_follow_typing_before_them() {
        let mut doc = Document::new("let x = 1;");
        let mut store = DecorationStore::new();
        let line = DiffLineInfo::line(0, LineDiffType::Modified)
            .with_inline(vec![InlineDiffSegment::new(4, 5, InlineKind::Added)]);
        store.recompute(&config(vec![line]), &doc);

        let edit = doc.apply(&ChangeSpec::insert(0, "  ")).unwrap();
        store.update(&[], Some(&edit), &doc);
        let mark = store
            .decorations()
            .iter()
            .find(|d| matches!(d.decoration, Decoration::Mark { .. }))
            .unwrap();
        assert_eq!(doc.slice(mark.from, mark.to), "x");
    }

    fn marks(store: &DecorationStore, doc: &Document) -> Vec<String> {
        store
            .decorations()
            .iter()
            .filter(|d| matches!(d.decoration, Decoration::Mark { .. }))
            .map(|d| doc.slice(d.from, d.to).to_string())
            .collect()
    }

    #[test]
    fn test_mark_shrinks_when_its_tail_is_deleted() {
        let mut doc = Document::new("let value = 1;");
        let mut store = DecorationStore::new();
        let line = DiffLineInfo::line(0, LineDiffType::Modified)
            .with_inline(vec![InlineDiffSegment::new(4, 9, InlineKind::Added)]);
        store.recompute(&config(vec![line]), &doc);

        let edit = doc.apply(&ChangeSpec::delete(7, 12)).unwrap();
        store.remap(&edit);
        assert_eq!(doc.text(), "let val1;");
        assert_eq!(marks(&store, &doc), vec!["val"]);
    }

    #[test]
    fn test_mark_shrinks_when_its_head_is_deleted() {
        let mut doc = Document::new("let value = 1;");
        let mut store = DecorationStore::new();
        let line = DiffLineInfo::line(0, LineDiffType::Modified)
            .with_inline(vec![InlineDiffSegment::new(4, 9, InlineKind::Removed)]);
        store.recompute(&config(vec![line]), &doc);

        let edit = doc.apply(&ChangeSpec::delete(2, 6)).unwrap();
        store.remap(&edit);
        assert_eq!(doc.text(), "lelue = 1;");
        assert_eq!(marks(&store, &doc), vec!["lue"]);

        // Deleting what is left removes the mark
        let edit = doc.apply(&ChangeSpec::delete(1, 6)).unwrap();
        store.remap(&edit);
        assert!(marks(&store, &doc).is_empty());
    }

    #[test]
    fn test_joining_lines_drops_placeholder_above() {
        let mut doc = Document::new("aa
bb
cc");
        let mut store = DecorationStore::new();
        store.recompute(
            &config(vec![
                DiffLineInfo::placeholder(1),
                DiffLineInfo::line(1, LineDiffType::Added),
            ]),
            &doc,
        );
        assert!(store.decorations().iter().any(|d| d.decoration.is_widget()));

        // Backspace at the start of "bb"
        let edit = doc.apply(&ChangeSpec::delete(2, 3)).unwrap();
        store.remap(&edit);
        assert_eq!(doc.text(), "aabb
cc");
        assert!(!store.decorations().iter().any(|d| d.decoration.is_widget()));
        assert_eq!(starts(&store), vec![2]);
    }

    #[test]
    fn test_trailing_placeholder_tracks_document_end() {
        let mut doc = Document::new("a");
        let mut store = DecorationStore::new();
        store.recompute(&config(vec![DiffLineInfo::placeholder(1)]), &doc);

        let edit = doc.apply(&ChangeSpec::insert(1, "bc")).unwrap();
        store.remap(&edit);
        let widget = &store.decorations().as_slice()[0];
        assert_eq!(widget.from, doc.len());
        assert!(matches!(
            widget.decoration,
            Decoration::Widget { side: WidgetSide::After, .. }
        ));
    }

    #[test]
    fn test_clear() {
        let doc = Document::new("a");
        let mut store = DecorationStore::new();
        store.recompute(&config(vec![DiffLineInfo::line(0, LineDiffType::Added)]), &doc);
        store.clear();
        assert!(store.decorations().is_empty());
    }
}
