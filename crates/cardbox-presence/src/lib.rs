//! Debounced tag presence detection for cardbox.
//!
//! A contactless reader polled a few times per second reports the same card
//! over and over, drops out for a tick when the card wobbles, and sometimes
//! fails a bus exchange altogether. This crate turns that signal into one
//! event per physical card insertion.
//!
//! # Layers
//!
//! - [`RawPoller`]: one request/anticollision round per tick, faults
//!   collapsed to "absent", removal time recorded.
//! - [`Debouncer`]: duplicate suppression and the minimum interval between
//!   reported detections.
//! - [`PresenceDetector`]: both layers driven by an injected [`Clock`].
//! - [`PollManager`]: runs a detector in a Tokio task and delivers
//!   [`TagEvent`]s through a bounded channel.
//!
//! # Example
//!
//! ```
//! use cardbox_core::{TagId, Timestamp};
//! use cardbox_presence::Debouncer;
//!
//! let mut debouncer = Debouncer::default();
//! let aa = TagId::new("TAG_AA").unwrap();
//! let bb = TagId::new("TAG_BB").unwrap();
//!
//! assert_eq!(debouncer.debounce(Some(aa.clone()), Timestamp::from_millis(0)), Some(aa));
//! assert_eq!(debouncer.debounce(None, Timestamp::from_millis(500)), None);
//! // Too soon after the last reported tag
//! assert_eq!(debouncer.debounce(Some(bb.clone()), Timestamp::from_millis(1500)), None);
//! assert_eq!(debouncer.debounce(Some(bb.clone()), Timestamp::from_millis(2100)), Some(bb));
//! ```

pub mod clock;
pub mod config;
pub mod debouncer;
pub mod detector;
pub mod error;
pub mod manager;
pub mod poller;
pub mod state;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::DetectorConfig;
pub use debouncer::{Debouncer, Decision, Suppression};
pub use detector::{PollStats, PresenceDetector};
pub use error::{PresenceError, Result};
pub use manager::{PollHandle, PollManager, TagEvent};
pub use poller::{PollOutcome, RawPoller};
pub use state::{DetectorState, PresenceState};
