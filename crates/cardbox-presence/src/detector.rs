//! Presence detector: raw poll layer and debouncer driven by one clock.

use cardbox_core::TagId;
use cardbox_hardware::TagReader;
use serde::Serialize;
use tracing::trace;

use crate::clock::Clock;
use crate::config::DetectorConfig;
use crate::debouncer::{Debouncer, Decision};
use crate::poller::{PollOutcome, RawPoller};
use crate::state::{DetectorState, PresenceState};

/// Counters accumulated over the detector's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollStats {
    /// Ticks run.
    pub ticks: u64,

    /// Ticks on which the reader selected a card.
    pub raw_detections: u64,

    /// Ticks that ended in a read fault.
    pub faults: u64,

    /// Detections reported as events.
    pub events: u64,

    /// Detections the debouncer suppressed.
    pub suppressed: u64,
}

/// Debounced presence detector for one reader.
///
/// Call [`tick`](Self::tick) once per poll period. Each call reads the
/// reader once and returns at most one newly inserted tag.
pub struct PresenceDetector<R: TagReader, C: Clock> {
    poller: RawPoller<R>,
    debouncer: Debouncer,
    clock: C,
    stats: PollStats,
}

impl<R: TagReader, C: Clock> PresenceDetector<R, C> {
    /// Create a detector around an uninitialized reader.
    pub fn new(reader: R, clock: C, config: &DetectorConfig) -> Self {
        Self {
            poller: RawPoller::from_config(reader, config),
            debouncer: Debouncer::new(config.min_interval()),
            clock,
            stats: PollStats::default(),
        }
    }

    /// Bring up the reader. Returns `false` if it could not be initialized.
    pub async fn initialize(&mut self) -> bool {
        self.poller.initialize().await
    }

    /// Run one poll tick and return the newly inserted tag, if any.
    pub async fn tick(&mut self) -> Option<TagId> {
        let now = self.clock.now();
        self.stats.ticks += 1;

        let outcome = self
            .poller
            .poll_outcome(self.debouncer.state_mut(), now)
            .await;

        match &outcome {
            PollOutcome::Present(_) => self.stats.raw_detections += 1,
            PollOutcome::Fault(_) => self.stats.faults += 1,
            PollOutcome::Absent => {}
        }

        let decision = self.debouncer.evaluate(outcome.into_tag(), now);
        match &decision {
            Decision::Accepted(_) => self.stats.events += 1,
            Decision::Suppressed(..) => self.stats.suppressed += 1,
            Decision::Absent => {}
        }

        trace!("Tick {} at {}: {}", self.stats.ticks, now, self.presence());
        decision.into_event()
    }

    /// Release the reader. Safe to call repeatedly.
    pub async fn cleanup(&mut self) {
        self.poller.cleanup().await;
    }

    /// Returns `true` while the reader is initialized.
    pub fn is_initialized(&self) -> bool {
        self.poller.is_initialized()
    }

    /// Current detector state.
    pub fn state(&self) -> &DetectorState {
        self.debouncer.state()
    }

    /// Current state of the presence state machine.
    pub fn presence(&self) -> PresenceState {
        self.debouncer.presence()
    }

    /// Counters so far.
    pub fn stats(&self) -> PollStats {
        self.stats
    }
}
