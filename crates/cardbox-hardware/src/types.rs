//! Common types shared across reader implementations.

use serde::{Deserialize, Serialize};

/// Reader information.
///
/// Contains reader-specific metadata such as the bus it sits on,
/// supported protocols and maximum baud rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderInfo {
    /// Reader name (e.g., "MFRC522").
    pub name: String,

    /// List of supported protocols (e.g., ["ISO14443A"]).
    pub protocols: Vec<String>,

    /// Bus the reader is attached to (e.g., "spi0.0").
    pub bus: Option<String>,

    /// Maximum supported baud rate in bits per second.
    pub max_baud_rate: Option<u32>,
}

impl ReaderInfo {
    /// Create a new ReaderInfo.
    pub fn new(name: impl Into<String>, protocols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            protocols,
            bus: None,
            max_baud_rate: None,
        }
    }

    /// Set the bus the reader is attached to.
    pub fn with_bus(mut self, bus: impl Into<String>) -> Self {
        self.bus = Some(bus.into());
        self
    }

    /// Set the maximum baud rate.
    pub fn with_max_baud_rate(mut self, max_baud_rate: u32) -> Self {
        self.max_baud_rate = Some(max_baud_rate);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_info() {
        let info = ReaderInfo::new("MFRC522", vec!["ISO14443A".to_string()])
            .with_bus("spi0.0")
            .with_max_baud_rate(424000);

        assert_eq!(info.name, "MFRC522");
        assert_eq!(info.protocols, vec!["ISO14443A"]);
        assert_eq!(info.bus.as_deref(), Some("spi0.0"));
        assert_eq!(info.max_baud_rate, Some(424000));
    }

    #[test]
    fn test_reader_info_serialization() {
        let info = ReaderInfo::new("Mock", vec!["ISO14443A".to_string()]);
        let json = serde_json::to_string(&info).unwrap();
        let back: ReaderInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, back);
    }
}
