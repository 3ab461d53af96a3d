//! Property-based tests for the debouncer.
//!
//! Random poll sequences with non-decreasing timestamps are fed through a
//! debouncer, checking the guarantees consumers rely on.

use cardbox_core::{TagId, Timestamp};
use cardbox_presence::Debouncer;
use proptest::prelude::*;
use std::time::Duration;

const MIN_INTERVAL_MS: u64 = 2000;

/// Strategy for one raw poll: absent, or one of a few tags.
fn raw_poll() -> impl Strategy<Value = Option<u8>> {
    prop_oneof![
        1 => Just(None),
        3 => (0u8..3).prop_map(Some),
    ]
}

/// Strategy for a poll sequence: (raw poll, gap since previous poll in ms).
fn poll_sequence() -> impl Strategy<Value = Vec<(Option<u8>, u64)>> {
    prop::collection::vec((raw_poll(), 0u64..1500), 1..200)
}

fn tag(n: u8) -> TagId {
    TagId::new(format!("TAG_{:02X}", n)).unwrap()
}

/// Feed the sequence and return (time, raw, event) for every poll.
fn run(sequence: &[(Option<u8>, u64)]) -> Vec<(u64, Option<u8>, Option<TagId>)> {
    let mut debouncer = Debouncer::new(Duration::from_millis(MIN_INTERVAL_MS));
    let mut now = 0u64;

    sequence
        .iter()
        .map(|(raw, gap)| {
            now += gap;
            let event = debouncer.debounce(raw.map(tag), Timestamp::from_millis(now));
            (now, *raw, event)
        })
        .collect()
}

proptest! {
    /// Property: a tag is never reported twice without an absent poll in between.
    #[test]
    fn prop_no_duplicate_without_absence(sequence in poll_sequence()) {
        let mut last_reported: Option<TagId> = None;

        for (_, raw, event) in run(&sequence) {
            if raw.is_none() {
                last_reported = None;
            }
            if let Some(event) = event {
                prop_assert_ne!(Some(&event), last_reported.as_ref());
                last_reported = Some(event);
            }
        }
    }

    /// Property: two reported events are at least the minimum interval apart.
    #[test]
    fn prop_events_respect_min_interval(sequence in poll_sequence()) {
        let times: Vec<u64> = run(&sequence)
            .into_iter()
            .filter_map(|(t, _, event)| event.map(|_| t))
            .collect();

        for pair in times.windows(2) {
            prop_assert!(pair[1] - pair[0] >= MIN_INTERVAL_MS);
        }
    }

    /// Property: only a tag that was actually polled can be reported.
    #[test]
    fn prop_event_matches_raw_poll(sequence in poll_sequence()) {
        for (_, raw, event) in run(&sequence) {
            if let Some(event) = event {
                prop_assert_eq!(Some(event), raw.map(tag));
            }
        }
    }

    /// Property: the derived identifier keeps only the first four UID bytes.
    #[test]
    fn prop_tag_id_from_uid(uid in prop::collection::vec(any::<u8>(), 4..=10)) {
        let id = TagId::from_uid(&uid).unwrap();
        let expected = format!(
            "TAG_{:02X}{:02X}{:02X}{:02X}",
            uid[0], uid[1], uid[2], uid[3]
        );
        prop_assert_eq!(id.as_str(), expected.as_str());
    }
}
