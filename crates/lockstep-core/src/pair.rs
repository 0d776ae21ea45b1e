//! Two panes, one theme and the scroll link between them

use std::time::{Duration, Instant};

use crate::handle::{DiffEditor, EditorHandle, EditorOptions};
use crate::line::DiffLineInfo;
use crate::rows::{project, CharDiff, DiffRow, DiffSource, PaneSide};
use crate::scroll::{ScrollSynchronizer, DEFAULT_GUARD_WINDOW};
use crate::theme::{EditorTheme, PaletteOverrides, ThemeBinding};

#[derive(Debug, Clone)]
pub struct PairOptions {
    pub theme: EditorTheme,
    pub overrides: PaletteOverrides,
    pub read_only_left: bool,
    pub read_only_right: bool,
    pub guard_window: Duration,
    /// Precomputed diff lines each pane starts with; empty for none
    pub left_lines: Vec<DiffLineInfo>,
    pub right_lines: Vec<DiffLineInfo>,
}

impl Default for PairOptions {
    fn default() -> Self {
        Self {
            theme: EditorTheme::default(),
            overrides: PaletteOverrides::default(),
            read_only_left: false,
            read_only_right: false,
            guard_window: DEFAULT_GUARD_WINDOW,
            left_lines: Vec::new(),
            right_lines: Vec::new(),
        }
    }
}

/// Owns both panes of a side-by-side diff
#[derive(Debug)]
pub struct DiffPair {
    left: DiffEditor,
    right: DiffEditor,
    binding: ThemeBinding,
    sync: ScrollSynchronizer,
}

impl DiffPair {
    pub fn new(left: &str, right: &str, options: PairOptions) -> Self {
        let binding = ThemeBinding::with_overrides(options.theme, options.overrides);
        let pane = |text: &str, read_only: bool, lines: Vec<DiffLineInfo>| {
            let editor = EditorOptions {
                read_only,
                guard_window: options.guard_window,
                palette: binding.palette().placeholder(),
            };
            DiffEditor::with_lines(text, editor, lines)
        };
        Self {
            left: pane(left, options.read_only_left, options.left_lines),
            right: pane(right, options.read_only_right, options.right_lines),
            binding,
            sync: ScrollSynchronizer::new(),
        }
    }

    pub fn pane(&self, side: PaneSide) -> &DiffEditor {
        match side {
            PaneSide::Left => &self.left,
            PaneSide::Right => &self.right,
        }
    }

    pub fn pane_mut(&mut self, side: PaneSide) -> &mut DiffEditor {
        match side {
            PaneSide::Left => &mut self.left,
            PaneSide::Right => &mut self.right,
        }
    }

    pub fn binding(&self) -> &ThemeBinding {
        &self.binding
    }

    pub fn update_decorations(&mut self, left: Vec<DiffLineInfo>, right: Vec<DiffLineInfo>) {
        self.left.update_decorations(left);
        self.right.update_decorations(right);
    }

    /// Project aligned rows onto both panes
    pub fn apply_rows(&mut self, rows: &[DiffRow], chars: &dyn CharDiff) {
        let left = project(rows, PaneSide::Left, chars);
        let right = project(rows, PaneSide::Right, chars);
        self.update_decorations(left, right);
    }

    /// Diff the panes' current contents and redecorate both. Returns the
    /// number of aligned rows.
    pub fn recompute(&mut self, source: &dyn DiffSource, chars: &dyn CharDiff) -> usize {
        let rows = source.diff_rows(&self.left.get_value(), &self.right.get_value());
        self.apply_rows(&rows, chars);
        tracing::debug!(rows = rows.len(), "diff recomputed");
        rows.len()
    }

    /// User scroll on one pane, mirrored onto the other. Returns how many
    /// offsets were forwarded.
    pub fn scroll_horizontal(&mut self, side: PaneSide, delta: i32, now: Instant) -> usize {
        self.pane_mut(side).scroll_by(delta);
        self.pump_scroll(now)
    }

    /// Deliver any pending scroll events
    pub fn pump_scroll(&mut self, now: Instant) -> usize {
        self.sync.pump(&mut self.left, &mut self.right, now)
    }

    /// Switch themes. Compiled placeholders are recolored; the diff is not
    /// recomputed. Returns whether the theme actually changed.
    pub fn set_theme(&mut self, theme: EditorTheme) -> bool {
        if !self.binding.rebind(theme) {
            return false;
        }
        let palette = self.binding.palette().placeholder();
        let repainted = self.left.set_palette(palette) + self.right.set_palette(palette);
        tracing::debug!(theme = %theme, repainted, "theme changed");
        true
    }

    pub fn destroy(&mut self) {
        self.left.destroy();
        self.right.destroy();
    }
}
