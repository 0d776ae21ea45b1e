//! Application state and input handling

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use lockstep_core::{ChangeSpec, DiffPair, EditorHandle, PairOptions, PaneSide, StripeCache};
use unicode_width::UnicodeWidthStr;

use crate::upstream::{CharDiffer, LineDiffer};

/// Rows moved per mouse wheel notch
const WHEEL_ROWS: isize = 3;

#[derive(Debug, Clone)]
pub struct AppOptions {
    pub pair: PairOptions,
    pub line_numbers: bool,
    /// Columns per horizontal scroll step
    pub scroll_step: u32,
    /// Quiet period after an edit before the diff is recomputed
    pub debounce: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            pair: PairOptions::default(),
            line_numbers: true,
            scroll_step: 4,
            debounce: Duration::from_millis(200),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Motion {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

pub(crate) fn slot(side: PaneSide) -> usize {
    match side {
        PaneSide::Left => 0,
        PaneSide::Right => 1,
    }
}

/// Main application state
pub struct App {
    pub pair: DiffPair,
    /// Header titles for the left and right pane
    pub names: [String; 2],
    pub focus: PaneSide,
    /// First visible row, shared by both panes
    pub scroll_top: usize,
    /// Cursor char offset per pane
    cursors: [usize; 2],
    pub line_numbers: bool,
    pub scroll_step: u32,
    debounce: Duration,
    recompute_at: Option<Instant>,
    /// Set by the panes' change listeners
    edited: Rc<Cell<bool>>,
    lines: LineDiffer,
    chars: CharDiffer,
    /// Aligned row count of the last diff
    pub rows: usize,
    /// Filled in by the last draw
    pub viewport_height: usize,
    pub content_width: usize,
    pub split_column: u16,
    pub stripes: [StripeCache; 2],
    pub should_quit: bool,
}

impl App {
    pub fn new(names: [String; 2], left: &str, right: &str, options: AppOptions) -> Self {
        let precomputed =
            !options.pair.left_lines.is_empty() || !options.pair.right_lines.is_empty();
        let mut pair = DiffPair::new(left, right, options.pair);
        let edited = Rc::new(Cell::new(false));
        for side in [PaneSide::Left, PaneSide::Right] {
            let flag = Rc::clone(&edited);
            pair.pane_mut(side).on_change(move |_| flag.set(true));
        }

        let mut app = Self {
            pair,
            names,
            focus: PaneSide::Left,
            scroll_top: 0,
            cursors: [0, 0],
            line_numbers: options.line_numbers,
            scroll_step: options.scroll_step,
            debounce: options.debounce,
            recompute_at: None,
            edited,
            lines: LineDiffer,
            chars: CharDiffer,
            rows: 0,
            viewport_height: 24,
            content_width: 80,
            split_column: 40,
            stripes: Default::default(),
            should_quit: false,
        };
        if precomputed {
            // Precomputed lines stand in for the first diff
            app.rows = app.total_rows();
        } else {
            app.recompute();
        }
        app
    }

    pub fn recompute(&mut self) {
        self.rows = self.pair.recompute(&self.lines, &self.chars);
        self.recompute_at = None;
        self.edited.set(false);
    }

    pub fn recompute_pending(&self) -> bool {
        self.recompute_at.is_some() || self.edited.get()
    }

    /// Deliver scroll events and run a due recompute
    pub fn tick(&mut self, now: Instant) {
        self.pair.pump_scroll(now);
        if self.edited.replace(false) {
            self.recompute_at = Some(now + self.debounce);
        }
        if self.recompute_at.is_some_and(|at| now >= at) {
            self.recompute();
        }
    }

    /// Cursor of a pane, clamped to its document
    pub fn cursor(&self, side: PaneSide) -> usize {
        let len = self.pair.pane(side).doc().map_or(0, |doc| doc.len());
        self.cursors[slot(side)].min(len)
    }

    /// Visual row count of the taller pane
    pub fn total_rows(&self) -> usize {
        let left = self.pair.pane(PaneSide::Left).visual_rows().len();
        let right = self.pair.pane(PaneSide::Right).visual_rows().len();
        left.max(right)
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let step = self.scroll_step.min(i32::MAX as u32) as i32;
        let page = self.viewport_height.max(1) as isize;
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('q') if ctrl => self.should_quit = true,
            KeyCode::Char('r') if ctrl => self.recompute(),
            KeyCode::Char('t') if ctrl => self.cycle_theme(),
            KeyCode::Char('o') if ctrl => self.toggle_read_only(),
            KeyCode::Char('l') if ctrl => self.line_numbers = !self.line_numbers,
            KeyCode::Tab | KeyCode::BackTab => self.focus = self.focus.other(),
            KeyCode::Left if ctrl => self.scroll_pane(self.focus, -step, now),
            KeyCode::Right if ctrl => self.scroll_pane(self.focus, step, now),
            KeyCode::Left => self.move_cursor(Motion::Left, now),
            KeyCode::Right => self.move_cursor(Motion::Right, now),
            KeyCode::Up => self.move_cursor(Motion::Up, now),
            KeyCode::Down => self.move_cursor(Motion::Down, now),
            KeyCode::Home => self.move_cursor(Motion::Home, now),
            KeyCode::End => self.move_cursor(Motion::End, now),
            KeyCode::PageUp => self.scroll_vertical(-page),
            KeyCode::PageDown => self.scroll_vertical(page),
            KeyCode::Enter => self.insert("\n", now),
            KeyCode::Backspace => self.backspace(now),
            KeyCode::Delete => self.delete_forward(now),
            KeyCode::Char(c) if !ctrl => self.insert(c.encode_utf8(&mut [0; 4]), now),
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, event: MouseEvent, now: Instant) {
        let side = if event.column < self.split_column {
            PaneSide::Left
        } else {
            PaneSide::Right
        };
        let step = self.scroll_step.min(i32::MAX as u32) as i32;
        // Most terminals report shift+wheel as a vertical scroll with SHIFT held
        let shift = event.modifiers.contains(KeyModifiers::SHIFT);
        match event.kind {
            MouseEventKind::ScrollUp if shift => self.scroll_pane(side, -step, now),
            MouseEventKind::ScrollDown if shift => self.scroll_pane(side, step, now),
            MouseEventKind::ScrollUp => self.scroll_vertical(-WHEEL_ROWS),
            MouseEventKind::ScrollDown => self.scroll_vertical(WHEEL_ROWS),
            MouseEventKind::ScrollLeft => self.scroll_pane(side, -step, now),
            MouseEventKind::ScrollRight => self.scroll_pane(side, step, now),
            MouseEventKind::Down(MouseButton::Left) => self.focus = side,
            _ => {}
        }
    }

    /// User horizontal scroll on one pane; the other follows
    pub fn scroll_pane(&mut self, side: PaneSide, delta: i32, now: Instant) {
        let forwarded = self.pair.scroll_horizontal(side, delta, now);
        tracing::trace!(?side, delta, forwarded, "horizontal scroll");
    }

    pub fn scroll_vertical(&mut self, delta: isize) {
        let max = self.total_rows().saturating_sub(self.viewport_height);
        self.scroll_top = self.scroll_top.saturating_add_signed(delta).min(max);
    }

    fn cycle_theme(&mut self) {
        let next = self.pair.binding().theme().next();
        self.pair.set_theme(next);
    }

    fn toggle_read_only(&mut self) {
        let pane = self.pair.pane_mut(self.focus);
        let read_only = !pane.is_read_only();
        pane.set_read_only(read_only);
    }

    fn move_cursor(&mut self, motion: Motion, now: Instant) {
        let side = self.focus;
        let pos = self.cursor(side);
        let Some(doc) = self.pair.pane(side).doc() else {
            return;
        };
        let line = doc.line_at(pos);
        let column = pos - line.from;
        let next = match motion {
            Motion::Left => pos.saturating_sub(1),
            Motion::Right => (pos + 1).min(doc.len()),
            Motion::Home => line.from,
            Motion::End => line.to,
            Motion::Up => match line.index.checked_sub(1).and_then(|i| doc.line(i)) {
                Some(prev) => (prev.from + column).min(prev.to),
                None => line.from,
            },
            Motion::Down => match doc.line(line.index + 1) {
                Some(below) => (below.from + column).min(below.to),
                None => line.to,
            },
        };
        self.cursors[slot(side)] = next;
        self.reveal_cursor(now);
    }

    fn insert(&mut self, text: &str, now: Instant) {
        let side = self.focus;
        let pos = self.cursor(side);
        if self.pair.pane_mut(side).user_edit(ChangeSpec::insert(pos, text)) {
            self.cursors[slot(side)] = pos + text.chars().count();
            self.reveal_cursor(now);
        }
    }

    fn backspace(&mut self, now: Instant) {
        let side = self.focus;
        let pos = self.cursor(side);
        if pos > 0 && self.pair.pane_mut(side).user_edit(ChangeSpec::delete(pos - 1, pos)) {
            self.cursors[slot(side)] = pos - 1;
            self.reveal_cursor(now);
        }
    }

    fn delete_forward(&mut self, now: Instant) {
        let side = self.focus;
        let pos = self.cursor(side);
        if self.pair.pane_mut(side).user_edit(ChangeSpec::delete(pos, pos + 1)) {
            self.reveal_cursor(now);
        }
    }

    /// Scroll so the focused cursor is on screen
    fn reveal_cursor(&mut self, now: Instant) {
        let side = self.focus;
        let pos = self.cursor(side);
        let pane = self.pair.pane(side);
        let Some(doc) = pane.doc() else {
            return;
        };
        let line = doc.line_at(pos);
        let cell = UnicodeWidthStr::width(doc.slice(line.from, pos));
        let row = pane
            .visual_rows()
            .iter()
            .position(|r| r.line().is_some_and(|l| l.index == line.index));
        let left = pane.scroll_left() as usize;

        if let Some(row) = row {
            let height = self.viewport_height.max(1);
            if row < self.scroll_top {
                self.scroll_top = row;
            } else if row >= self.scroll_top + height {
                self.scroll_top = row + 1 - height;
            }
        }

        let width = self.content_width.max(1);
        let target = if cell < left {
            cell
        } else if cell >= left + width {
            cell + 1 - width
        } else {
            left
        };
        if target != left {
            let delta =
                (target as i64 - left as i64).clamp(i32::MIN as i64, i32::MAX as i64) as i32;
            self.scroll_pane(side, delta, now);
        }
    }
}
