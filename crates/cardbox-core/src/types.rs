use crate::{
    Result,
    constants::{TAG_PREFIX, TAG_UID_BYTES},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identifier of a contactless tag.
///
/// Identifiers read from hardware are built with [`TagId::from_uid`] and
/// look like `TAG_DEADBEEF`. Any other non-empty ASCII token (for example
/// the identifiers of a simulated reader) can be wrapped with [`TagId::new`].
/// Equality is byte-exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagId(String);

impl TagId {
    /// Wrap an existing identifier.
    ///
    /// # Errors
    /// Returns `Error::InvalidTagId` if the identifier is empty or holds
    /// anything other than printable, non-space ASCII.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();

        if id.is_empty() {
            return Err(Error::InvalidTagId("identifier is empty".to_string()));
        }

        if !id.chars().all(|c| c.is_ascii_graphic()) {
            return Err(Error::InvalidTagId(format!(
                "identifier must be printable ASCII without whitespace, got {id:?}"
            )));
        }

        Ok(TagId(id))
    }

    /// Build the identifier of a tag from its hardware UID.
    ///
    /// Only the first [`TAG_UID_BYTES`] bytes take part in the identity.
    ///
    /// # Errors
    /// Returns `Error::InvalidUid` if the UID is shorter than four bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardbox_core::TagId;
    ///
    /// let id = TagId::from_uid(&[0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x02, 0x03]).unwrap();
    /// assert_eq!(id.as_str(), "TAG_DEADBEEF");
    /// ```
    pub fn from_uid(uid: &[u8]) -> Result<Self> {
        if uid.len() < TAG_UID_BYTES {
            return Err(Error::InvalidUid {
                expected: TAG_UID_BYTES,
                actual: uid.len(),
            });
        }

        let hex: String = uid[..TAG_UID_BYTES]
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect();

        Ok(TagId(format!("{TAG_PREFIX}{hex}")))
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TagId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TagId::new(s)
    }
}

impl TryFrom<String> for TagId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        TagId::new(value)
    }
}

impl From<TagId> for String {
    fn from(id: TagId) -> Self {
        id.0
    }
}

/// Point on a monotonic clock, measured from the clock's origin.
///
/// Timestamps only make sense relative to other timestamps produced by the
/// same clock. They are ordered and never go backwards for a given clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(Duration);

impl Timestamp {
    /// The clock origin.
    pub const ZERO: Timestamp = Timestamp(Duration::ZERO);

    /// Create a timestamp at the given offset from the clock origin.
    #[must_use]
    pub const fn from_offset(offset: Duration) -> Self {
        Timestamp(offset)
    }

    /// Create a timestamp from milliseconds since the clock origin.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Timestamp(Duration::from_millis(millis))
    }

    /// Create a timestamp from fractional seconds since the clock origin.
    ///
    /// # Panics
    /// Panics if `secs` is negative, not finite, or overflows `Duration`.
    #[must_use]
    pub fn from_secs_f64(secs: f64) -> Self {
        Timestamp(Duration::from_secs_f64(secs))
    }

    /// Offset of this timestamp from the clock origin.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> Duration {
        self.0
    }

    /// Time elapsed from `earlier` to `self`, or zero if `earlier` is later.
    #[inline]
    #[must_use]
    pub fn saturating_duration_since(&self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.3}s", self.0.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[0xDE, 0xAD, 0xBE, 0xEF], "TAG_DEADBEEF")]
    #[case(&[0x04, 0xAB, 0xCD, 0xEF], "TAG_04ABCDEF")]
    #[case(&[0x00, 0x00, 0x00, 0x01], "TAG_00000001")]
    #[case(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07], "TAG_01020304")]
    #[case(&[0xFF; 10], "TAG_FFFFFFFF")]
    fn test_tag_id_from_uid(#[case] uid: &[u8], #[case] expected: &str) {
        let id = TagId::from_uid(uid).unwrap();
        assert_eq!(id.as_str(), expected);
    }

    #[test]
    fn test_tag_id_ignores_trailing_uid_bytes() {
        let short = TagId::from_uid(&[0x11, 0x22, 0x33, 0x44]).unwrap();
        let long = TagId::from_uid(&[0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77]).unwrap();
        assert_eq!(short, long);
    }

    #[rstest]
    #[case(&[])]
    #[case(&[0x01])]
    #[case(&[0x01, 0x02, 0x03])]
    fn test_tag_id_from_short_uid(#[case] uid: &[u8]) {
        let result = TagId::from_uid(uid);
        assert!(matches!(
            result,
            Err(Error::InvalidUid { expected: 4, actual }) if actual == uid.len()
        ));
    }

    #[rstest]
    #[case("TAG_AA")]
    #[case("MOCK_TAG_1")]
    #[case("TAG_DEADBEEF")]
    fn test_tag_id_new_valid(#[case] raw: &str) {
        let id = TagId::new(raw).unwrap();
        assert_eq!(id.as_str(), raw);
        assert_eq!(id.to_string(), raw);
    }

    #[rstest]
    #[case("")]
    #[case("TAG AA")]
    #[case("TAG_\u{e9}")]
    #[case("TAG_\u{1}")]
    #[case("TAG_AA\u{7f}")]
    #[case("TAG\tAA")]
    fn test_tag_id_new_invalid(#[case] raw: &str) {
        assert!(matches!(TagId::new(raw), Err(Error::InvalidTagId(_))));
    }

    #[test]
    fn test_tag_id_equality_is_exact() {
        let upper = TagId::new("TAG_DEADBEEF").unwrap();
        let lower = TagId::new("TAG_deadbeef").unwrap();
        assert_ne!(upper, lower);
    }

    #[test]
    fn test_tag_id_from_str() {
        let id: TagId = "TAG_CAFEBABE".parse().unwrap();
        assert_eq!(id.as_str(), "TAG_CAFEBABE");
        assert!("".parse::<TagId>().is_err());
    }

    #[test]
    fn test_tag_id_serde() {
        let id = TagId::new("TAG_DEADBEEF").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"TAG_DEADBEEF\"");

        let back: TagId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<TagId>("\"\"").is_err());
    }

    #[test]
    fn test_timestamp_ordering() {
        let a = Timestamp::from_millis(300);
        let b = Timestamp::from_secs_f64(0.5);
        assert!(a < b);
        assert_eq!(Timestamp::ZERO, Timestamp::default());
    }

    #[test]
    fn test_timestamp_duration_since() {
        let a = Timestamp::from_millis(300);
        let b = Timestamp::from_millis(3000);
        assert_eq!(b.saturating_duration_since(a), Duration::from_millis(2700));
        assert_eq!(a.saturating_duration_since(b), Duration::ZERO);
    }

    #[test]
    fn test_timestamp_display() {
        assert_eq!(Timestamp::from_millis(2300).to_string(), "2.300s");
    }
}
