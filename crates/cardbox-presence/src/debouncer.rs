//! Presence debouncer.
//!
//! Turns the per-tick raw poll signal (`Option<TagId>`) into at most one
//! "tag inserted" event per physical insertion. A detection is reported
//! only if it is not the tag already confirmed, and if at least
//! `min_interval` has passed both since the last removal and since the last
//! reported detection.
//!
//! # Examples
//!
//! ```
//! use cardbox_core::{TagId, Timestamp};
//! use cardbox_presence::Debouncer;
//! use std::time::Duration;
//!
//! let mut debouncer = Debouncer::new(Duration::from_secs(2));
//! let tag = TagId::new("TAG_DEADBEEF").unwrap();
//!
//! let first = debouncer.debounce(Some(tag.clone()), Timestamp::from_millis(0));
//! assert_eq!(first, Some(tag.clone()));
//!
//! // Still on the reader: no repeat event
//! let again = debouncer.debounce(Some(tag), Timestamp::from_millis(200));
//! assert_eq!(again, None);
//! ```

use cardbox_core::{TagId, Timestamp, constants::DEFAULT_MIN_INTERVAL_MS};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

use crate::state::{DetectorState, PresenceState};

/// Why a detected tag was not reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suppression {
    /// The tag is the one already confirmed present.
    Duplicate,

    /// Less than `min_interval` since the last observed removal.
    RecentRemoval,

    /// Less than `min_interval` since the last reported detection.
    RateLimited,
}

impl fmt::Display for Suppression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate => write!(f, "duplicate"),
            Self::RecentRemoval => write!(f, "recent removal"),
            Self::RateLimited => write!(f, "rate limited"),
        }
    }
}

/// Result of feeding one raw poll into the debouncer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The raw poll saw no tag.
    Absent,

    /// A new tag insertion; report it.
    Accepted(TagId),

    /// A tag was seen but must not be reported.
    Suppressed(TagId, Suppression),
}

impl Decision {
    /// The tag to report, if any.
    pub fn into_event(self) -> Option<TagId> {
        match self {
            Decision::Accepted(tag) => Some(tag),
            Decision::Absent | Decision::Suppressed(..) => None,
        }
    }
}

/// Debounce layer of the presence detector.
#[derive(Debug, Clone)]
pub struct Debouncer {
    min_interval: Duration,
    state: DetectorState,
}

impl Debouncer {
    /// Create a debouncer in the initial `Absent` state.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            state: DetectorState::new(),
        }
    }

    /// Feed one raw poll result taken at `now` and return the tag to report.
    ///
    /// `now` must not decrease between calls.
    pub fn debounce(&mut self, raw: Option<TagId>, now: Timestamp) -> Option<TagId> {
        self.evaluate(raw, now).into_event()
    }

    /// Like [`debounce`](Self::debounce), but explains the outcome.
    pub fn evaluate(&mut self, raw: Option<TagId>, now: Timestamp) -> Decision {
        let Some(tag) = raw else {
            // Removal bookkeeping belongs to the raw poll layer.
            self.state.last_seen_tag = None;
            self.state.tag_in_field = false;
            return Decision::Absent;
        };

        self.state.removed = false;
        self.state.tag_in_field = true;

        if self.state.last_seen_tag.as_ref() == Some(&tag) {
            return self.suppress(tag, Suppression::Duplicate, now);
        }

        // `removed` was cleared just above, so this check runs on every
        // detection, not only on one that follows an unconfirmed removal.
        if !self.state.removed && self.within_interval(self.state.last_removal_time, now) {
            return self.suppress(tag, Suppression::RecentRemoval, now);
        }

        if self.within_interval(self.state.last_detect_time, now) {
            return self.suppress(tag, Suppression::RateLimited, now);
        }

        self.state.last_seen_tag = Some(tag.clone());
        self.state.last_detect_time = Some(now);
        info!("Tag detected: {} at {}", tag, now);

        Decision::Accepted(tag)
    }

    /// Minimum interval between reported detections.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Current detector state.
    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    /// Mutable access for the raw poll layer's removal bookkeeping.
    pub fn state_mut(&mut self) -> &mut DetectorState {
        &mut self.state
    }

    /// Current state of the presence state machine.
    pub fn presence(&self) -> PresenceState {
        self.state.presence()
    }

    fn within_interval(&self, since: Option<Timestamp>, now: Timestamp) -> bool {
        since.is_some_and(|at| now.saturating_duration_since(at) < self.min_interval)
    }

    fn suppress(&self, tag: TagId, reason: Suppression, now: Timestamp) -> Decision {
        debug!("Tag {} suppressed at {}: {}", tag, now, reason);
        Decision::Suppressed(tag, reason)
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_MIN_INTERVAL_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tag(id: &str) -> TagId {
        TagId::new(id).unwrap()
    }

    fn at(secs: f64) -> Timestamp {
        Timestamp::from_secs_f64(secs)
    }

    #[test]
    fn test_default_min_interval() {
        let debouncer = Debouncer::default();
        assert_eq!(debouncer.min_interval(), Duration::from_secs(2));
        assert_eq!(debouncer.presence(), PresenceState::Absent);
    }

    #[test]
    fn test_absent_poll_returns_none() {
        let mut debouncer = Debouncer::default();
        assert_eq!(debouncer.evaluate(None, at(0.0)), Decision::Absent);
        assert!(debouncer.state().removed);
    }

    #[test]
    fn test_first_detection_accepted() {
        let mut debouncer = Debouncer::default();

        let event = debouncer.debounce(Some(tag("TAG_AA")), at(0.0));

        assert_eq!(event, Some(tag("TAG_AA")));
        assert_eq!(debouncer.state().last_detect_time, Some(at(0.0)));
        assert_eq!(debouncer.presence(), PresenceState::Confirmed(tag("TAG_AA")));
    }

    #[test]
    fn test_scenario_sequence() {
        let mut debouncer = Debouncer::new(Duration::from_secs(2));

        let inputs = [
            (None, 0.0),
            (Some("TAG_AA"), 0.3),
            (Some("TAG_AA"), 0.5),
            (None, 2.3),
            (None, 2.6),
            (Some("TAG_BB"), 3.0),
        ];

        let outputs: Vec<Option<TagId>> = inputs
            .iter()
            .map(|(raw, t)| debouncer.debounce(raw.map(tag), at(*t)))
            .collect();

        assert_eq!(
            outputs,
            vec![None, Some(tag("TAG_AA")), None, None, None, Some(tag("TAG_BB"))]
        );
    }

    #[test]
    fn test_consecutive_same_tag_reported_once() {
        let mut debouncer = Debouncer::default();

        let events: Vec<_> = (0..10u32)
            .filter_map(|i| debouncer.debounce(Some(tag("TAG_AA")), at(f64::from(i) * 0.5)))
            .collect();

        assert_eq!(events, vec![tag("TAG_AA")]);
    }

    #[test]
    fn test_duplicate_reason() {
        let mut debouncer = Debouncer::default();
        debouncer.debounce(Some(tag("TAG_AA")), at(0.0));

        // Even long after the interval, the same confirmed tag is not repeated
        assert_eq!(
            debouncer.evaluate(Some(tag("TAG_AA")), at(60.0)),
            Decision::Suppressed(tag("TAG_AA"), Suppression::Duplicate)
        );
    }

    #[rstest]
    #[case(1.5, None)]
    #[case(1.999, None)]
    #[case(2.0, Some("TAG_BB"))]
    #[case(2.1, Some("TAG_BB"))]
    fn test_rate_limit_since_last_detection(#[case] t: f64, #[case] expected: Option<&str>) {
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        assert!(debouncer.debounce(Some(tag("TAG_AA")), at(0.0)).is_some());
        assert_eq!(debouncer.debounce(None, at(0.5)), None);

        assert_eq!(debouncer.debounce(Some(tag("TAG_BB")), at(t)), expected.map(tag));
    }

    #[test]
    fn test_rate_limited_reason() {
        let mut debouncer = Debouncer::default();
        debouncer.debounce(Some(tag("TAG_AA")), at(0.0));
        debouncer.debounce(None, at(0.5));

        assert_eq!(
            debouncer.evaluate(Some(tag("TAG_BB")), at(1.5)),
            Decision::Suppressed(tag("TAG_BB"), Suppression::RateLimited)
        );
    }

    #[test]
    fn test_suppressed_detection_does_not_update_detect_time() {
        let mut debouncer = Debouncer::default();
        debouncer.debounce(Some(tag("TAG_AA")), at(0.0));
        debouncer.debounce(None, at(0.5));
        debouncer.debounce(Some(tag("TAG_BB")), at(1.5));

        assert_eq!(debouncer.state().last_detect_time, Some(at(0.0)));
        assert_eq!(debouncer.state().last_seen_tag, None);
        assert_eq!(debouncer.presence(), PresenceState::PresentUnconfirmed);

        // Interval measured from the accepted detection, not the rejected one
        assert_eq!(
            debouncer.debounce(Some(tag("TAG_BB")), at(2.1)),
            Some(tag("TAG_BB"))
        );
    }

    #[test]
    fn test_absence_resets_duplicate_suppression() {
        let mut debouncer = Debouncer::default();

        assert!(debouncer.debounce(Some(tag("TAG_AA")), at(0.0)).is_some());
        assert_eq!(debouncer.debounce(None, at(0.5)), None);
        assert_eq!(
            debouncer.debounce(Some(tag("TAG_AA")), at(2.1)),
            Some(tag("TAG_AA"))
        );
    }

    #[test]
    fn test_recent_removal_suppresses_every_detection() {
        let mut debouncer = Debouncer::default();
        debouncer.debounce(Some(tag("TAG_AA")), at(0.0));

        // Removal recorded by the raw poll layer at 3.0
        debouncer.debounce(None, at(3.0));
        assert!(debouncer.state_mut().record_absence(at(3.0)));

        // Far past the rate limit, but too close to the removal
        assert_eq!(
            debouncer.evaluate(Some(tag("TAG_BB")), at(4.0)),
            Decision::Suppressed(tag("TAG_BB"), Suppression::RecentRemoval)
        );
        // The detection cleared `removed` before the interval checks ran
        assert!(!debouncer.state().removed);

        assert_eq!(
            debouncer.debounce(Some(tag("TAG_BB")), at(5.0)),
            Some(tag("TAG_BB"))
        );
    }

    #[test]
    fn test_presence_after_absent_poll() {
        let mut debouncer = Debouncer::default();

        debouncer.debounce(Some(tag("TAG_AA")), at(0.0));
        assert_eq!(debouncer.presence(), PresenceState::Confirmed(tag("TAG_AA")));

        debouncer.debounce(None, at(0.5));
        assert_eq!(debouncer.presence(), PresenceState::Absent);

        // Seen again too soon: readable but not reported
        debouncer.debounce(Some(tag("TAG_BB")), at(1.0));
        assert_eq!(debouncer.presence(), PresenceState::PresentUnconfirmed);

        debouncer.debounce(None, at(1.2));
        assert_eq!(debouncer.presence(), PresenceState::Absent);
    }

    #[test]
    fn test_detection_clears_removed_flag_even_when_suppressed() {
        let mut debouncer = Debouncer::default();
        debouncer.debounce(Some(tag("TAG_AA")), at(0.0));
        debouncer.debounce(Some(tag("TAG_AA")), at(0.2));
        assert!(!debouncer.state().removed);
    }

    #[test]
    fn test_absent_poll_keeps_removal_bookkeeping() {
        let mut debouncer = Debouncer::default();
        debouncer.debounce(Some(tag("TAG_AA")), at(0.0));
        debouncer.debounce(None, at(1.0));

        assert!(!debouncer.state().removed);
        assert_eq!(debouncer.state().last_removal_time, None);
        assert_eq!(debouncer.state().last_seen_tag, None);
    }

    #[test]
    fn test_different_tag_without_absence() {
        let mut debouncer = Debouncer::default();
        debouncer.debounce(Some(tag("TAG_AA")), at(0.0));

        // Swapped faster than the reader could see the field empty
        assert_eq!(
            debouncer.debounce(Some(tag("TAG_BB")), at(2.5)),
            Some(tag("TAG_BB"))
        );
        assert_eq!(debouncer.presence(), PresenceState::Confirmed(tag("TAG_BB")));
    }

    #[test]
    fn test_non_monotonic_time_is_suppressed() {
        let mut debouncer = Debouncer::default();
        debouncer.debounce(Some(tag("TAG_AA")), at(5.0));
        debouncer.debounce(None, at(5.5));

        assert_eq!(debouncer.debounce(Some(tag("TAG_BB")), at(1.0)), None);
    }
}
