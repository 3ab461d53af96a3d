//! Enum wrapper for reader dispatch.
//!
//! Native `async fn` in traits (RPITIT - Rust Edition 2024) are not
//! object-safe, so `Box<dyn TagReader>` is not available. [`AnyTagReader`]
//! provides concrete type dispatch at compile time instead, which also keeps
//! the reader futures `Send` for use in spawned tasks.
//!
//! # Examples
//!
//! ```
//! use cardbox_hardware::devices::AnyTagReader;
//! use cardbox_hardware::mock::MockTagReader;
//!
//! let (reader, _handle) = MockTagReader::new();
//! let any_reader = AnyTagReader::Mock(reader);
//! ```

use crate::mock::MockTagReader;
use crate::traits::TagReader;
use crate::{CardData, ReaderInfo, Result};

/// Enum wrapper for reader dispatch.
///
/// # Examples
///
/// ```
/// use cardbox_hardware::devices::AnyTagReader;
/// use cardbox_hardware::traits::TagReader;
/// use cardbox_hardware::mock::MockTagReader;
///
/// #[tokio::main]
/// async fn main() -> cardbox_hardware::Result<()> {
///     let (reader, _handle) = MockTagReader::new();
///     let any_reader = AnyTagReader::Mock(reader);
///
///     let info = any_reader.get_reader_info().await?;
///     println!("Reader: {}", info.name);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyTagReader {
    /// Mock reader for development and testing.
    Mock(MockTagReader),
}

impl From<MockTagReader> for AnyTagReader {
    fn from(reader: MockTagReader) -> Self {
        Self::Mock(reader)
    }
}

impl TagReader for AnyTagReader {
    async fn initialize(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.initialize().await,
        }
    }

    async fn request(&mut self) -> Result<bool> {
        match self {
            Self::Mock(device) => device.request().await,
        }
    }

    async fn anticollision(&mut self) -> Result<CardData> {
        match self {
            Self::Mock(device) => device.anticollision().await,
        }
    }

    async fn cleanup(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.cleanup().await,
        }
    }

    async fn get_reader_info(&self) -> Result<ReaderInfo> {
        match self {
            Self::Mock(device) => device.get_reader_info().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_any_tag_reader_mock() {
        let (reader, _handle) = MockTagReader::new();
        let any_reader = AnyTagReader::from(reader);

        let info = any_reader.get_reader_info().await.unwrap();
        assert_eq!(info.name, "Mock Tag Reader");
    }

    #[tokio::test]
    async fn test_any_tag_reader_dispatches_exchanges() {
        let (reader, handle) = MockTagReader::new();
        let mut any_reader = AnyTagReader::Mock(reader);

        any_reader.initialize().await.unwrap();
        handle.present_card(vec![0xDE, 0xAD, 0xBE, 0xEF]).unwrap();

        assert!(any_reader.request().await.unwrap());
        let card = any_reader.anticollision().await.unwrap();
        assert_eq!(card.tag_id().unwrap().as_str(), "TAG_DEADBEEF");

        any_reader.cleanup().await.unwrap();
        assert!(!handle.is_initialized());
    }
}
