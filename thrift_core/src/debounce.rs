//! # Debounce
//!
//! Deadline-based debouncing for single-threaded, event-driven callers.
//! Nothing here sleeps or spawns: the owner passes the current `Instant` in,
//! and polls on its own tick. Each owner (the store, each editable row) holds
//! its own [`Debouncer`], so pending work is never shared.
//!
//! ## Example
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use thrift_core::debounce::Debouncer;
//!
//! let mut save = Debouncer::new(Duration::from_millis(500));
//! let t0 = Instant::now();
//!
//! save.schedule(t0);
//! save.schedule(t0 + Duration::from_millis(300)); // restarts the window
//!
//! assert!(!save.poll(t0 + Duration::from_millis(600)));
//! assert!(save.poll(t0 + Duration::from_millis(800)));
//! assert!(!save.poll(t0 + Duration::from_millis(900))); // fires once
//! ```

use std::time::{Duration, Instant};

/// Window used for persistence and row saves
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// How long a "saved" indicator stays visible
pub const SAVED_INDICATOR_DURATION: Duration = Duration::from_secs(2);

/// Trailing-edge debouncer.
///
/// Every `schedule` pushes the deadline out to `now + window`. `poll` returns
/// `true` exactly once when the deadline has passed, then the debouncer is
/// idle again. `cancel` drops a pending deadline without firing.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Debouncer { window, deadline: None }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Start or restart the window at `now`
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Consume the pending deadline if it has passed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Debouncer::new(DEFAULT_DEBOUNCE)
    }
}

/// A flag that is visible for a fixed time after being shown
#[derive(Debug, Clone)]
pub struct TransientFlag {
    duration: Duration,
    visible_until: Option<Instant>,
}

impl TransientFlag {
    pub fn new(duration: Duration) -> Self {
        TransientFlag {
            duration,
            visible_until: None,
        }
    }

    pub fn show(&mut self, now: Instant) {
        self.visible_until = Some(now + self.duration);
    }

    pub fn hide(&mut self) {
        self.visible_until = None;
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.visible_until.is_some_and(|until| now < until)
    }
}

impl Default for TransientFlag {
    fn default() -> Self {
        TransientFlag::new(SAVED_INDICATOR_DURATION)
    }
}
