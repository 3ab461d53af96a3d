//! Poll manager.
//!
//! Runs a [`PresenceDetector`] in its own task, ticking at the configured
//! poll period, and forwards every reported tag to consumers through a
//! bounded channel.
//!
//! ```text
//! ┌──────────┐  tick   ┌──────────────┐  TagEvent  ┌──────────────┐
//! │ Interval │────────►│ Poll Task    │───────────►│ PollHandle   │
//! └──────────┘         │ (detector)   │   (mpsc)   │ recv()       │
//!                      └──────────────┘            └──────────────┘
//!                             ▲                           │
//!                             └──────── shutdown ─────────┘
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use cardbox_hardware::mock::MockTagReader;
//! use cardbox_presence::{DetectorConfig, PollManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (reader, control) = MockTagReader::new();
//!     let mut handle = PollManager::new(reader, DetectorConfig::default())
//!         .start()
//!         .await?;
//!
//!     control.present_card(vec![0xDE, 0xAD, 0xBE, 0xEF])?;
//!     if let Some(event) = handle.recv().await {
//!         println!("Tag inserted: {}", event.tag);
//!     }
//!
//!     let stats = handle.shutdown().await?;
//!     println!("{} ticks", stats.ticks);
//!     Ok(())
//! }
//! ```

use cardbox_core::{TagId, Timestamp};
use cardbox_hardware::AnyTagReader;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::clock::{Clock, MonotonicClock};
use crate::config::DetectorConfig;
use crate::detector::{PollStats, PresenceDetector};
use crate::error::{PresenceError, Result};

/// A newly inserted tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEvent {
    /// The inserted tag.
    pub tag: TagId,

    /// Detector time of the accepted detection.
    pub at: Timestamp,

    /// Wall-clock time the event was produced.
    pub detected_at: DateTime<Utc>,
}

/// Handle for receiving tag events from a running poll task.
///
/// Dropping the handle stops the poll task and releases the reader.
pub struct PollHandle {
    /// Confirmed tag events.
    event_rx: mpsc::Receiver<TagEvent>,

    /// Signals the poll task to stop.
    shutdown_tx: Option<oneshot::Sender<()>>,

    /// The poll task.
    task: JoinHandle<PollStats>,
}

impl PollHandle {
    /// Receive the next tag event.
    ///
    /// Returns `None` once the poll task has stopped.
    pub async fn recv(&mut self) -> Option<TagEvent> {
        self.event_rx.recv().await
    }

    /// Stop polling, release the reader, and return the final counters.
    ///
    /// # Errors
    ///
    /// Returns [`PresenceError::Task`] if the poll task panicked.
    pub async fn shutdown(mut self) -> Result<PollStats> {
        if let Some(tx) = self.shutdown_tx.take() {
            // The task may already have stopped on its own
            let _ = tx.send(());
        }

        self.task
            .await
            .map_err(|e| PresenceError::Task(e.to_string()))
    }
}

/// Owns a reader until [`start`](Self::start) moves it into the poll task.
///
/// The reader is held as [`AnyTagReader`] so the spawned task has a
/// concrete, `Send` future type.
pub struct PollManager<C: Clock = MonotonicClock> {
    reader: AnyTagReader,
    clock: C,
    config: DetectorConfig,
}

impl PollManager<MonotonicClock> {
    /// Create a manager timed by the runtime's monotonic clock.
    pub fn new(reader: impl Into<AnyTagReader>, config: DetectorConfig) -> Self {
        Self::with_clock(reader, MonotonicClock::new(), config)
    }
}

impl<C: Clock + 'static> PollManager<C> {
    /// Create a manager with an explicit clock.
    pub fn with_clock(reader: impl Into<AnyTagReader>, clock: C, config: DetectorConfig) -> Self {
        Self {
            reader: reader.into(),
            clock,
            config,
        }
    }

    /// Initialize the reader and spawn the poll task.
    ///
    /// # Errors
    ///
    /// Returns [`PresenceError::Config`] for an invalid configuration and
    /// [`PresenceError::InitializationFailed`] if the reader could not be
    /// initialized. In the latter case the reader has been cleaned up.
    pub async fn start(self) -> Result<PollHandle> {
        self.config.validate()?;

        let mut detector = PresenceDetector::new(self.reader, self.clock, &self.config);
        if !detector.initialize().await {
            detector.cleanup().await;
            return Err(PresenceError::InitializationFailed(
                "tag reader could not be initialized".to_string(),
            ));
        }

        let (event_tx, event_rx) = mpsc::channel(self.config.event_channel_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(Self::poll_task(
            detector,
            self.config.poll_interval(),
            event_tx,
            shutdown_rx,
        ));

        info!(
            "Polling tag reader every {:?} (min interval {:?})",
            self.config.poll_interval(),
            self.config.min_interval()
        );

        Ok(PollHandle {
            event_rx,
            shutdown_tx: Some(shutdown_tx),
            task,
        })
    }

    async fn poll_task(
        mut detector: PresenceDetector<AnyTagReader, C>,
        period: Duration,
        event_tx: mpsc::Sender<TagEvent>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) -> PollStats {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => break,
                _ = ticker.tick() => {}
            }

            let Some(tag) = detector.tick().await else {
                continue;
            };

            // An accepted detection stamps the tick time
            let at = detector.state().last_detect_time.unwrap_or_default();
            let event = TagEvent {
                tag,
                at,
                detected_at: Utc::now(),
            };

            match event_tx.try_send(event) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(event)) => {
                    warn!("Tag event channel full, waiting for consumer");
                    tokio::select! {
                        biased;
                        _ = &mut shutdown_rx => break,
                        sent = event_tx.send(event) => {
                            if sent.is_err() {
                                debug!("Tag event receiver dropped");
                                break;
                            }
                        }
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!("Tag event receiver dropped");
                    break;
                }
            }
        }

        detector.cleanup().await;
        let stats = detector.stats();
        info!(
            "Poll loop stopped after {} ticks ({} events)",
            stats.ticks, stats.events
        );
        stats
    }
}
