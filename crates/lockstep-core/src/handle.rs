//! Imperative facade over one diff pane

use std::fmt;
use std::time::{Duration, Instant};

use crate::compile::DiffDecorationConfig;
use crate::decoration::DecorationSet;
use crate::document::{ChangeSpec, Document};
use crate::line::DiffLineInfo;
use crate::placeholder::PlaceholderPalette;
use crate::render::{layout, VisualRow};
use crate::scroll::{ScrollGuard, ScrollPane, DEFAULT_GUARD_WINDOW};
use crate::state::{Effect, EditorState, Transaction};
use crate::theme::{self, EditorTheme};
use unicode_width::UnicodeWidthStr;

/// Operations the owning component drives a pane with.
///
/// All calls are synchronous; on a destroyed pane they do nothing.
pub trait EditorHandle {
    fn get_value(&self) -> String;
    /// Replace the whole document in one transaction
    fn set_value(&mut self, text: &str);
    /// Recompute decorations from scratch; an empty slice clears them
    fn update_decorations(&mut self, lines: Vec<DiffLineInfo>);
    /// Programmatic horizontal scroll
    fn set_scroll_left(&mut self, offset: u32);
}

#[derive(Debug, Clone, Copy)]
pub struct EditorOptions {
    pub read_only: bool,
    pub guard_window: Duration,
    pub palette: PlaceholderPalette,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            read_only: false,
            guard_window: DEFAULT_GUARD_WINDOW,
            palette: theme::resolve(EditorTheme::default()).placeholder(),
        }
    }
}

/// Everything that disappears on `destroy`
#[derive(Debug)]
struct Surface {
    state: EditorState,
    scroll_left: u32,
    /// Cells of text visible at once; unknown until the owner lays the pane out
    viewport_width: Option<u32>,
    /// Set when the offset changed and the listener has not seen it yet
    scroll_pending: bool,
    guard: ScrollGuard,
    palette: PlaceholderPalette,
}

impl Surface {
    fn max_scroll_left(&self) -> u32 {
        let Some(viewport) = self.viewport_width else {
            return u32::MAX;
        };
        let widest = self
            .state
            .doc()
            .text()
            .split('\n')
            .map(UnicodeWidthStr::width)
            .max()
            .unwrap_or(0);
        u32::try_from(widest)
            .unwrap_or(u32::MAX)
            .saturating_sub(viewport)
    }
}

type ChangeCallback = Box<dyn FnMut(&str)>;
type ScrollCallback = Box<dyn FnMut(u32)>;

/// One editable diff pane
pub struct DiffEditor {
    surface: Option<Surface>,
    on_change: Option<ChangeCallback>,
    on_horizontal_scroll: Option<ScrollCallback>,
}

impl fmt::Debug for DiffEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffEditor")
            .field("surface", &self.surface)
            .field("on_change", &self.on_change.is_some())
            .field("on_horizontal_scroll", &self.on_horizontal_scroll.is_some())
            .finish()
    }
}

impl DiffEditor {
    pub fn new(text: &str, options: EditorOptions) -> Self {
        Self {
            surface: Some(Surface {
                state: EditorState::new(text, options.read_only),
                scroll_left: 0,
                viewport_width: None,
                scroll_pending: false,
                guard: ScrollGuard::new(options.guard_window),
                palette: options.palette,
            }),
            on_change: None,
            on_horizontal_scroll: None,
        }
    }

    /// Create a pane with initial decorations already applied
    pub fn with_lines(text: &str, options: EditorOptions, lines: Vec<DiffLineInfo>) -> Self {
        let mut editor = Self::new(text, options);
        if !lines.is_empty() {
            editor.update_decorations(lines);
        }
        editor
    }

    pub fn on_change(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn on_horizontal_scroll(&mut self, callback: impl FnMut(u32) + 'static) {
        self.on_horizontal_scroll = Some(Box::new(callback));
    }

    pub fn is_destroyed(&self) -> bool {
        self.surface.is_none()
    }

    pub fn is_read_only(&self) -> bool {
        self.surface.as_ref().is_some_and(|s| s.state.is_read_only())
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        if let Some(surface) = self.surface.as_mut() {
            surface.state.set_read_only(read_only);
        }
    }

    pub fn doc(&self) -> Option<&Document> {
        self.surface.as_ref().map(|s| s.state.doc())
    }

    pub fn decorations(&self) -> Option<&DecorationSet> {
        self.surface.as_ref().map(|s| s.state.decorations())
    }

    pub fn palette(&self) -> Option<PlaceholderPalette> {
        self.surface.as_ref().map(|s| s.palette)
    }

    /// A user-originated edit. Returns whether it was applied; read-only
    /// panes and invalid ranges reject it.
    pub fn user_edit(&mut self, change: ChangeSpec) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            tracing::debug!("edit on destroyed pane ignored");
            return false;
        };
        if surface.state.is_read_only() {
            return false;
        }
        match surface.state.apply(Transaction::change(change)) {
            Ok(_) => {
                self.notify_change();
                true
            }
            Err(err) => {
                tracing::debug!(%err, "rejected edit");
                false
            }
        }
    }

    /// Palette for subsequent compiles. Already compiled placeholders are
    /// recolored in place.
    pub fn set_palette(&mut self, palette: PlaceholderPalette) -> usize {
        let Some(surface) = self.surface.as_mut() else {
            return 0;
        };
        surface.palette = palette;
        surface.state.repaint_placeholders(palette)
    }

    /// Record the visible text width. An offset past the new limit is pulled
    /// back without a scroll event.
    pub fn set_viewport_width(&mut self, width: u32) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.viewport_width = Some(width);
        surface.scroll_left = surface.scroll_left.min(surface.max_scroll_left());
    }

    /// Largest horizontal offset: the widest line minus the viewport width.
    /// Unbounded until a viewport width is known.
    pub fn max_scroll_left(&self) -> u32 {
        self.surface.as_ref().map_or(0, Surface::max_scroll_left)
    }

    /// User-driven horizontal scroll by `delta` cells
    pub fn scroll_by(&mut self, delta: i32) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let offset = surface
            .scroll_left
            .saturating_add_signed(delta)
            .min(surface.max_scroll_left());
        if offset != surface.scroll_left {
            surface.scroll_left = offset;
            surface.scroll_pending = true;
        }
    }

    pub fn set_scroll_left_at(&mut self, offset: u32, now: Instant) {
        let Some(surface) = self.surface.as_mut() else {
            tracing::debug!(offset, "scroll on destroyed pane ignored");
            return;
        };
        surface.guard.arm(now);
        let offset = offset.min(surface.max_scroll_left());
        // Like a real surface, an unchanged offset fires no scroll event
        if offset != surface.scroll_left {
            surface.scroll_left = offset;
            surface.scroll_pending = true;
        }
    }

    /// The pane's scroll listener. Reports the offset unless the guard is up.
    pub fn handle_scroll_event(&mut self, now: Instant) -> Option<u32> {
        let surface = self.surface.as_mut()?;
        if !std::mem::take(&mut surface.scroll_pending) {
            return None;
        }
        if surface.guard.is_active(now) {
            tracing::trace!(offset = surface.scroll_left, "scroll event suppressed by guard");
            return None;
        }
        let offset = surface.scroll_left;
        if let Some(callback) = self.on_horizontal_scroll.as_mut() {
            callback(offset);
        }
        Some(offset)
    }

    pub fn scroll_left(&self) -> u32 {
        self.surface.as_ref().map_or(0, |s| s.scroll_left)
    }

    /// Rows as they are drawn: text lines plus placeholder rows
    pub fn visual_rows(&self) -> Vec<VisualRow> {
        match self.surface.as_ref() {
            Some(surface) => layout(surface.state.doc(), surface.state.decorations()),
            None => Vec::new(),
        }
    }

    /// Detach listeners and drop the surface. Idempotent.
    pub fn destroy(&mut self) {
        self.on_change = None;
        self.on_horizontal_scroll = None;
        if let Some(mut surface) = self.surface.take() {
            surface.state.clear_decorations();
            tracing::debug!("pane destroyed");
        }
    }

    fn notify_change(&mut self) {
        if let (Some(surface), Some(callback)) = (self.surface.as_ref(), self.on_change.as_mut()) {
            callback(surface.state.doc().text());
        }
    }
}

impl EditorHandle for DiffEditor {
    fn get_value(&self) -> String {
        self.surface
            .as_ref()
            .map(|s| s.state.doc().text().to_string())
            .unwrap_or_default()
    }

    fn set_value(&mut self, text: &str) {
        let Some(surface) = self.surface.as_mut() else {
            tracing::debug!("set_value on destroyed pane ignored");
            return;
        };
        let len = surface.state.doc().len();
        match surface.state.apply(Transaction::change(ChangeSpec::replace(0, len, text))) {
            Ok(_) => self.notify_change(),
            Err(err) => tracing::debug!(%err, "set_value rejected"),
        }
    }

    fn update_decorations(&mut self, lines: Vec<DiffLineInfo>) {
        let Some(surface) = self.surface.as_mut() else {
            tracing::debug!("update_decorations on destroyed pane ignored");
            return;
        };
        let config = DiffDecorationConfig::new(lines, surface.palette);
        if let Err(err) = surface
            .state
            .apply(Transaction::effect(Effect::SetDiffDecorations(config)))
        {
            tracing::debug!(%err, "update_decorations rejected");
        }
    }

    fn set_scroll_left(&mut self, offset: u32) {
        self.set_scroll_left_at(offset, Instant::now());
    }
}

impl ScrollPane for DiffEditor {
    fn scroll_left(&self) -> u32 {
        DiffEditor::scroll_left(self)
    }

    fn set_scroll_left_at(&mut self, offset: u32, now: Instant) {
        DiffEditor::set_scroll_left_at(self, offset, now);
    }

    fn handle_scroll_event(&mut self, now: Instant) -> Option<u32> {
        DiffEditor::handle_scroll_event(self, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::decoration::Decoration;
    use crate::line::LineDiffType;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn editor(text: &str) -> DiffEditor {
        DiffEditor::new(text, EditorOptions::default())
    }

    #[test]
    fn test_get_and_set_value() {
        let mut pane = editor("old");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        pane.on_change(move |text| sink.borrow_mut().push(text.to_string()));

        pane.set_value("new\ntext");
        assert_eq!(pane.get_value(), "new\ntext");
        assert_eq!(*seen.borrow(), vec!["new\ntext".to_string()]);
    }

    #[test]
    fn test_update_decorations_idempotent_and_clearable() {
        let mut pane = editor("a\nb\nc");
        let lines = vec![
            DiffLineInfo::line(1, LineDiffType::Removed),
            DiffLineInfo::placeholder(3),
        ];
        pane.update_decorations(lines.clone());
        let first = pane.decorations().unwrap().clone();
        pane.update_decorations(lines);
        assert_eq!(pane.decorations().unwrap(), &first);

        pane.update_decorations(Vec::new());
        assert!(pane.decorations().unwrap().is_empty());
    }

    #[test]
    fn test_read_only_rejects_user_edits_but_not_set_value() {
        let options = EditorOptions {
            read_only: true,
            ..Default::default()
        };
        let mut pane = DiffEditor::new("abc", options);
        assert!(!pane.user_edit(ChangeSpec::insert(0, "x")));
        assert_eq!(pane.get_value(), "abc");

        pane.set_value("xyz");
        assert_eq!(pane.get_value(), "xyz");
    }

    #[test]
    fn test_user_edit_remaps_decorations() {
        let mut pane = editor("a\nb");
        pane.update_decorations(vec![DiffLineInfo::line(1, LineDiffType::Added)]);
        assert!(pane.user_edit(ChangeSpec::insert(0, "zz")));
        assert_eq!(pane.decorations().unwrap().as_slice()[0].from, 4);

        assert!(!pane.user_edit(ChangeSpec::delete(3, 99)));
    }

    #[test]
    fn test_programmatic_scroll_is_not_reported() {
        let now = Instant::now();
        let mut pane = editor("abc");
        let reported = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&reported);
        pane.on_horizontal_scroll(move |offset| sink.borrow_mut().push(offset));

        pane.set_scroll_left_at(30, now);
        assert_eq!(pane.scroll_left(), 30);
        assert_eq!(pane.handle_scroll_event(now), None);

        pane.scroll_by(5);
        assert_eq!(pane.handle_scroll_event(now + Duration::from_millis(51)), Some(35));
        assert_eq!(*reported.borrow(), vec![35]);

        pane.scroll_by(-100);
        assert_eq!(pane.scroll_left(), 0);
    }

    #[test]
    fn test_scroll_stops_at_widest_line() {
        let now = Instant::now();
        let mut pane = editor("short\n0123456789abcdef\nmid");
        pane.set_viewport_width(10);
        assert_eq!(pane.max_scroll_left(), 6);

        pane.scroll_by(4);
        pane.scroll_by(4);
        assert_eq!(pane.scroll_left(), 6);
        assert_eq!(pane.handle_scroll_event(now), Some(6));

        // Already at the limit: nothing moves, nothing is reported
        pane.scroll_by(4);
        assert_eq!(pane.handle_scroll_event(now), None);

        pane.set_scroll_left_at(100, now);
        assert_eq!(pane.scroll_left(), 6);

        // A wider viewport pulls the offset back
        pane.set_viewport_width(14);
        assert_eq!(pane.scroll_left(), 2);
        pane.set_viewport_width(40);
        assert_eq!(pane.scroll_left(), 0);
        assert_eq!(pane.max_scroll_left(), 0);
    }

    #[test]
    fn test_with_lines_decorates_up_front() {
        let pane = DiffEditor::with_lines(
            "a\nb",
            EditorOptions::default(),
            vec![
                DiffLineInfo::line(1, LineDiffType::Added),
                DiffLineInfo::placeholder(2),
            ],
        );
        let set = pane.decorations().unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0].from, 2);
        assert_eq!(pane.visual_rows().len(), 3);

        let plain = DiffEditor::with_lines("a", EditorOptions::default(), Vec::new());
        assert!(plain.decorations().unwrap().is_empty());
    }

    #[test]
    fn test_destroy_turns_calls_into_noops() {
        let now = Instant::now();
        let mut pane = editor("abc");
        pane.update_decorations(vec![DiffLineInfo::line(0, LineDiffType::Added)]);
        let calls = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&calls);
        pane.on_change(move |_| *sink.borrow_mut() += 1);

        pane.destroy();
        pane.destroy();
        assert!(pane.is_destroyed());
        assert_eq!(pane.get_value(), "");
        pane.set_value("x");
        pane.update_decorations(vec![DiffLineInfo::line(0, LineDiffType::Added)]);
        pane.set_scroll_left_at(10, now);
        assert!(!pane.user_edit(ChangeSpec::insert(0, "x")));
        assert_eq!(pane.handle_scroll_event(now), None);
        assert!(pane.visual_rows().is_empty());
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_set_palette_recolors_placeholders() {
        let mut pane = editor("a");
        pane.update_decorations(vec![
            DiffLineInfo::placeholder(0),
            DiffLineInfo::placeholder(5),
        ]);
        let mut palette = pane.palette().unwrap();
        palette.stripe2 = Rgba::opaque(1, 2, 3);
        assert_eq!(pane.set_palette(palette), 2);

        assert!(pane.decorations().unwrap().iter().all(|d| matches!(
            &d.decoration,
            Decoration::Widget { widget, .. } if widget.palette().stripe2 == Rgba::opaque(1, 2, 3)
        )));
    }
}
