//! Raw poll layer.
//!
//! Runs one request/anticollision round per tick against a [`TagReader`]
//! and reduces it to a [`PollOutcome`]. Faults never escape this layer as
//! errors: they are logged and reported as an absent tag, and the first
//! absence after a presence is recorded in the [`DetectorState`].

use cardbox_core::{TagId, Timestamp};
use cardbox_hardware::{HardwareError, TagReader};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

use crate::config::DetectorConfig;
use crate::state::DetectorState;

/// Result of one raw poll round.
#[derive(Debug)]
pub enum PollOutcome {
    /// A card was selected.
    Present(TagId),

    /// The field is empty.
    Absent,

    /// The exchange failed or ran out of time.
    Fault(HardwareError),
}

impl PollOutcome {
    /// Collapse the outcome to the signal the debouncer consumes.
    pub fn into_tag(self) -> Option<TagId> {
        match self {
            PollOutcome::Present(tag) => Some(tag),
            PollOutcome::Absent | PollOutcome::Fault(_) => None,
        }
    }

    /// Returns `true` for [`PollOutcome::Fault`].
    pub fn is_fault(&self) -> bool {
        matches!(self, PollOutcome::Fault(_))
    }
}

/// Reader wrapper producing one raw presence sample per call.
pub struct RawPoller<R: TagReader> {
    reader: R,
    anticollision_timeout: Duration,
    retry_delay: Duration,
    initialized: bool,
}

impl<R: TagReader> RawPoller<R> {
    /// Wrap an uninitialized reader.
    pub fn new(reader: R, anticollision_timeout: Duration, retry_delay: Duration) -> Self {
        Self {
            reader,
            anticollision_timeout,
            retry_delay,
            initialized: false,
        }
    }

    /// Wrap a reader using the timings of `config`.
    pub fn from_config(reader: R, config: &DetectorConfig) -> Self {
        Self::new(
            reader,
            config.anticollision_timeout(),
            config.anticollision_retry_delay(),
        )
    }

    /// Bring up the reader. Returns `false` if it could not be initialized.
    pub async fn initialize(&mut self) -> bool {
        match self.reader.initialize().await {
            Ok(()) => {
                self.initialized = true;
                info!("Tag reader initialized");
                true
            }
            Err(e) => {
                self.initialized = false;
                error!("Failed to initialize tag reader: {}", e);
                false
            }
        }
    }

    /// Release the reader.
    ///
    /// Safe to call repeatedly and before initialization. Failures are
    /// logged, never returned.
    pub async fn cleanup(&mut self) {
        match self.reader.cleanup().await {
            Ok(()) => info!("Tag reader cleaned up"),
            Err(e) => error!("Error during tag reader cleanup: {}", e),
        }
        self.initialized = false;
    }

    /// Returns `true` once [`initialize`](Self::initialize) has succeeded
    /// and until [`cleanup`](Self::cleanup).
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run one request/anticollision round.
    ///
    /// An uninitialized poller reports a fault without touching the reader.
    pub async fn read(&mut self) -> PollOutcome {
        if !self.initialized {
            return PollOutcome::Fault(HardwareError::not_initialized("tag reader"));
        }

        match self.reader.request().await {
            Ok(true) => self.select_card().await,
            Ok(false) => PollOutcome::Absent,
            Err(e) => PollOutcome::Fault(e),
        }
    }

    /// Run one round and record an absence transition in `state`.
    pub async fn poll_outcome(&mut self, state: &mut DetectorState, now: Timestamp) -> PollOutcome {
        let outcome = self.read().await;

        match &outcome {
            PollOutcome::Present(tag) => trace!("Raw poll at {}: {}", now, tag),
            PollOutcome::Absent => {
                trace!("Raw poll at {}: absent", now);
                Self::note_absence(state, now);
            }
            PollOutcome::Fault(e) => {
                if e.is_transport_fault() {
                    warn!("Tag read failed at {}, treating as absent: {}", now, e);
                } else {
                    debug!("No tag read at {}: {}", now, e);
                }
                Self::note_absence(state, now);
            }
        }

        outcome
    }

    /// Run one round and return the tag in the field, if any.
    pub async fn poll(&mut self, state: &mut DetectorState, now: Timestamp) -> Option<TagId> {
        self.poll_outcome(state, now).await.into_tag()
    }

    fn note_absence(state: &mut DetectorState, now: Timestamp) {
        if state.record_absence(now) {
            debug!("Tag removed at {}", now);
        }
    }

    /// Retry anticollision until it selects a card or the time budget runs out.
    async fn select_card(&mut self) -> PollOutcome {
        let deadline = Instant::now() + self.anticollision_timeout;
        let mut last_error = None;

        loop {
            match tokio::time::timeout_at(deadline, self.reader.anticollision()).await {
                Ok(Ok(card)) => {
                    trace!("Selected {} card {}", card.card_type.name(), card.uid_hex());
                    return match card.tag_id() {
                        Ok(tag) => PollOutcome::Present(tag),
                        Err(e) => PollOutcome::Fault(e),
                    };
                }
                Ok(Err(e)) => last_error = Some(e),
                Err(_) => break,
            }

            if self.retry_delay.is_zero() || Instant::now() + self.retry_delay >= deadline {
                break;
            }
            tokio::time::sleep(self.retry_delay).await;
        }

        if let Some(e) = last_error {
            debug!("Anticollision gave up: {}", e);
        }

        let budget_ms = u64::try_from(self.anticollision_timeout.as_millis()).unwrap_or(u64::MAX);
        PollOutcome::Fault(HardwareError::timeout(budget_ms))
    }
}
