//! Monotonic time sources for the presence detector.
//!
//! The detector never reads the wall clock. It asks an injected [`Clock`]
//! for the current [`Timestamp`], which lets tests drive exact timings.

use cardbox_core::Timestamp;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Source of monotonic timestamps.
///
/// Successive calls to [`Clock::now`] must never go backwards.
pub trait Clock: Send + Sync {
    /// Current time on this clock.
    fn now(&self) -> Timestamp;
}

/// Clock backed by the Tokio runtime's monotonic instant.
///
/// Timestamps are measured from the moment the clock was created. Under a
/// paused Tokio runtime (`start_paused`), the clock follows virtual time.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: tokio::time::Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_offset(self.origin.elapsed())
    }
}

/// Manually driven clock for tests and replays.
///
/// Clones share the same time.
///
/// # Examples
///
/// ```
/// use cardbox_presence::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// clock.advance(Duration::from_millis(300));
/// assert_eq!(clock.now().offset(), Duration::from_millis(300));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock at its origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward, saturating at its maximum.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        // The closure always returns `Some`, so the update cannot fail
        let _ = self
            .nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |nanos| {
                Some(nanos.saturating_add(by))
            });
    }

    /// Set the clock to `at`, unless that would move it backwards.
    pub fn set(&self, at: Timestamp) {
        let at = u64::try_from(at.offset().as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_max(at, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_offset(Duration::from_nanos(self.nanos.load(Ordering::SeqCst)))
    }
}
