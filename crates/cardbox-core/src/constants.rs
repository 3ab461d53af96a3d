//! Core constants for tag identification and presence detection.
//!
//! This module centralizes the values shared by the hardware layer, the
//! presence detector and the command line front end: the tag identifier
//! format and the default timing of the poll loop.
//!
//! # Tag Identifier Format
//!
//! ```text
//! TAG_DEADBEEF
//! ^^^^--------  TAG_PREFIX
//!     ^^^^^^^^  uppercase hex of the first TAG_UID_BYTES bytes of the UID
//! ```
//!
//! # Usage
//!
//! ```
//! use cardbox_core::constants::*;
//! use std::time::Duration;
//!
//! assert_eq!(TAG_PREFIX, "TAG_");
//!
//! let min_interval = Duration::from_millis(DEFAULT_MIN_INTERVAL_MS);
//! assert_eq!(min_interval.as_secs_f64(), 2.0);
//! ```

// ============================================================================
// Tag Identifiers
// ============================================================================

/// Marker prepended to every tag identifier derived from a hardware UID.
///
/// # Examples
///
/// ```
/// use cardbox_core::constants::TAG_PREFIX;
///
/// let id = format!("{TAG_PREFIX}DEADBEEF");
/// assert_eq!(id, "TAG_DEADBEEF");
/// ```
pub const TAG_PREFIX: &str = "TAG_";

/// Number of leading UID bytes that make up a tag's identity.
///
/// ISO 14443 UIDs are 4, 7 or 10 bytes long. Only the first four bytes are
/// rendered into the identifier; longer UIDs sharing a 4-byte prefix map to
/// the same tag.
pub const TAG_UID_BYTES: usize = 4;

// ============================================================================
// Presence Detection Timing
// ============================================================================

/// Default minimum interval between accepted detections (milliseconds).
///
/// Applies both to the time since the last accepted detection and to the
/// time since the last observed removal.
///
/// # Value: 2000 ms
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 2000;

/// Default period of the poll loop (milliseconds).
///
/// # Value: 200 ms
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

/// Default upper bound on the anticollision retry loop within one tick
/// (milliseconds).
///
/// Must stay below the poll period so a tick never overruns the next one.
///
/// # Value: 100 ms
pub const DEFAULT_ANTICOLLISION_TIMEOUT_MS: u64 = 100;

/// Default pause between two anticollision attempts (milliseconds).
///
/// # Value: 10 ms
pub const DEFAULT_ANTICOLLISION_RETRY_DELAY_MS: u64 = 10;

// ============================================================================
// Event Delivery
// ============================================================================

/// Default capacity of the channel carrying confirmed tag events.
///
/// # Value: 32 events
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 32;
