//! Presence detection state shared by the raw poll layer and the debouncer.
//!
//! # States
//!
//! The observable state machine has three states:
//! - `Absent`: no tag in the field since the last removal was observed
//! - `PresentUnconfirmed`: the reader sees a tag, but it was rejected by the
//!   duplicate or interval checks
//! - `Confirmed(tag)`: the tag was accepted and reported
//!
//! # Valid Transitions
//!
//! - Absent → PresentUnconfirmed → Confirmed
//! - Absent → Confirmed (first detection passes every check)
//! - Confirmed → Absent, PresentUnconfirmed → Absent (an absent raw poll)
//! - Confirmed(tag) → Confirmed(tag) (same tag still readable, no event)
//!
//! There is no terminal state; the machine runs for the reader's lifetime.

use cardbox_core::{TagId, Timestamp};
use serde::Serialize;
use std::fmt;

/// Mutable state of one presence detector.
///
/// Owned by a single detector. The raw poll layer writes the removal
/// bookkeeping (`removed`, `last_removal_time`); the debouncer writes the
/// rest, including `tag_in_field`, which follows every raw poll. A time
/// of `None` means "never", which is earlier than any timestamp the clock
/// can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorState {
    /// Tag currently considered confirmed present.
    pub last_seen_tag: Option<TagId>,

    /// Time of the last accepted detection.
    pub last_detect_time: Option<Timestamp>,

    /// Time the last tag was observed gone.
    pub last_removal_time: Option<Timestamp>,

    /// An absence was observed since the last presence.
    pub removed: bool,

    /// The last raw poll saw a tag.
    pub tag_in_field: bool,
}

impl DetectorState {
    /// Create the initial state: nothing seen, tag considered removed.
    pub fn new() -> Self {
        Self {
            last_seen_tag: None,
            last_detect_time: None,
            last_removal_time: None,
            removed: true,
            tag_in_field: false,
        }
    }

    /// Record that the field was observed empty at `now`.
    ///
    /// Only the first absence after a presence is recorded. Returns `true`
    /// when this call was that presence-to-absence transition.
    pub fn record_absence(&mut self, now: Timestamp) -> bool {
        if self.removed {
            return false;
        }

        self.removed = true;
        self.last_removal_time = Some(now);
        true
    }

    /// Current state of the presence state machine.
    pub fn presence(&self) -> PresenceState {
        match (&self.last_seen_tag, self.tag_in_field) {
            (Some(tag), _) => PresenceState::Confirmed(tag.clone()),
            (None, true) => PresenceState::PresentUnconfirmed,
            (None, false) => PresenceState::Absent,
        }
    }
}

impl Default for DetectorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Observable state of the presence state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceState {
    /// No tag in the field.
    Absent,

    /// A tag is readable but has not been reported.
    PresentUnconfirmed,

    /// The tag was reported and is still considered present.
    Confirmed(TagId),
}

impl fmt::Display for PresenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresenceState::Absent => write!(f, "Absent"),
            PresenceState::PresentUnconfirmed => write!(f, "PresentUnconfirmed"),
            PresenceState::Confirmed(tag) => write!(f, "Confirmed({})", tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = DetectorState::new();
        assert!(state.removed);
        assert!(!state.tag_in_field);
        assert_eq!(state.last_seen_tag, None);
        assert_eq!(state.last_detect_time, None);
        assert_eq!(state.last_removal_time, None);
        assert_eq!(state.presence(), PresenceState::Absent);
        assert_eq!(state, DetectorState::default());
    }

    #[test]
    fn test_record_absence_only_on_transition() {
        let mut state = DetectorState::new();

        // Already removed: nothing recorded
        assert!(!state.record_absence(Timestamp::from_millis(100)));
        assert_eq!(state.last_removal_time, None);

        state.removed = false;
        assert!(state.record_absence(Timestamp::from_millis(500)));
        assert!(state.removed);
        assert_eq!(state.last_removal_time, Some(Timestamp::from_millis(500)));

        // Subsequent absent ticks keep the first removal time
        assert!(!state.record_absence(Timestamp::from_millis(700)));
        assert_eq!(state.last_removal_time, Some(Timestamp::from_millis(500)));
    }

    #[test]
    fn test_presence_view() {
        let mut state = DetectorState::new();
        state.tag_in_field = true;
        assert_eq!(state.presence(), PresenceState::PresentUnconfirmed);

        let tag = TagId::new("TAG_DEADBEEF").unwrap();
        state.last_seen_tag = Some(tag.clone());
        assert_eq!(state.presence(), PresenceState::Confirmed(tag));

        // Removal bookkeeping alone does not change the view
        state.last_seen_tag = None;
        state.tag_in_field = false;
        state.removed = false;
        assert_eq!(state.presence(), PresenceState::Absent);
    }

    #[test]
    fn test_presence_display() {
        let tag = TagId::new("TAG_AA").unwrap();
        assert_eq!(PresenceState::Absent.to_string(), "Absent");
        assert_eq!(
            PresenceState::Confirmed(tag).to_string(),
            "Confirmed(TAG_AA)"
        );
    }
}
