//! Horizontal scroll lock-step between two panes

use std::time::{Duration, Instant};

/// Default suppression window after a programmatic scroll
pub const DEFAULT_GUARD_WINDOW: Duration = Duration::from_millis(50);

/// Rounds of event delivery before `pump` gives up
const MAX_ROUNDS: usize = 4;

/// Re-entrancy guard armed by a programmatic scroll.
///
/// While active, the pane's own scroll listener must not report the offset
/// back to its partner. Being a deadline, it needs no timer to expire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollGuard {
    window: Duration,
    until: Option<Instant>,
}

impl Default for ScrollGuard {
    fn default() -> Self {
        Self::new(DEFAULT_GUARD_WINDOW)
    }
}

impl ScrollGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            until: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn arm(&mut self, now: Instant) {
        self.until = Some(now + self.window);
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    pub fn disarm(&mut self) {
        self.until = None;
    }
}

/// A surface with a horizontal scroll listener
pub trait ScrollPane {
    fn scroll_left(&self) -> u32;

    /// Programmatic scroll; arms the receiving pane's guard
    fn set_scroll_left_at(&mut self, offset: u32, now: Instant);

    /// Deliver a pending scroll event to the pane's listener. Returns the
    /// offset to forward, or `None` if nothing is pending or the guard
    /// swallowed the event.
    fn handle_scroll_event(&mut self, now: Instant) -> Option<u32>;
}

/// Forwards user-driven horizontal scrolls from one pane to the other
#[derive(Debug, Default, Clone, Copy)]
pub struct ScrollSynchronizer {
    forwarded: u64,
}

impl ScrollSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total offsets forwarded so far
    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }

    /// Drain pending scroll events on both panes, forwarding each reported
    /// offset to the partner. Returns how many forwards happened.
    pub fn pump<P: ScrollPane + ?Sized>(
        &mut self,
        left: &mut P,
        right: &mut P,
        now: Instant,
    ) -> usize {
        let mut forwards = 0;
        for _ in 0..MAX_ROUNDS {
            let mut progressed = false;
            if let Some(offset) = left.handle_scroll_event(now) {
                right.set_scroll_left_at(offset, now);
                forwards += 1;
                progressed = true;
            }
            if let Some(offset) = right.handle_scroll_event(now) {
                left.set_scroll_left_at(offset, now);
                forwards += 1;
                progressed = true;
            }
            if !progressed {
                break;
            }
        }
        self.forwarded += forwards as u64;
        if forwards > 0 {
            tracing::trace!(forwards, "forwarded horizontal scroll");
        }
        forwards
    }
}
