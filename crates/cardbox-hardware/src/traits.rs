//! Reader trait definitions.
//!
//! This module defines the contract between the presence detector and a
//! contactless reader sitting on a serial bus. A reader exposes the two
//! halves of an ISO 14443A selection round: a `request` probing the field
//! for a card, and an `anticollision` exchange reading the UID of the card
//! that answered. Register-level details live in the implementations.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use cardbox_core::TagId;

use crate::error::Result;
use crate::types::ReaderInfo;

/// Card type identification.
///
/// Identifies the family of the card that answered the selection, based on
/// its SAK byte.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardType {
    /// Mifare Classic 1K (1024 bytes).
    MifareClassic1K,

    /// Mifare Classic 4K (4096 bytes).
    MifareClassic4K,

    /// Mifare Ultralight / NTAG family.
    MifareUltralight,

    /// Unknown card type with its SAK byte.
    Unknown(u8),
}

impl CardType {
    /// Get a human-readable name for the card type.
    pub fn name(&self) -> &str {
        match self {
            Self::MifareClassic1K => "Mifare Classic 1K",
            Self::MifareClassic4K => "Mifare Classic 4K",
            Self::MifareUltralight => "Mifare Ultralight",
            Self::Unknown(_) => "Unknown",
        }
    }
}

/// Minimum UID length in bytes (per ISO 14443 specification).
pub const MIN_UID_LENGTH: usize = 4;

/// Maximum UID length in bytes (per ISO 14443 specification).
pub const MAX_UID_LENGTH: usize = 10;

/// Card data returned by a successful anticollision exchange.
#[derive(Debug, Clone)]
pub struct CardData {
    /// Card unique identifier (4-10 bytes).
    pub uid: Vec<u8>,

    /// Card type identification.
    pub card_type: CardType,

    /// Wall-clock time when the card was read.
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl CardData {
    /// Create new card data with the current timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID length is not within the valid range
    /// of 4-10 bytes as specified by ISO 14443.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardbox_hardware::traits::{CardData, CardType};
    ///
    /// let card = CardData::new(vec![0xDE, 0xAD, 0xBE, 0xEF], CardType::MifareClassic1K).unwrap();
    /// assert_eq!(card.tag_id().unwrap().as_str(), "TAG_DEADBEEF");
    /// ```
    pub fn new(uid: Vec<u8>, card_type: CardType) -> Result<Self> {
        let uid_len = uid.len();
        if !(MIN_UID_LENGTH..=MAX_UID_LENGTH).contains(&uid_len) {
            return Err(crate::HardwareError::invalid_data(format!(
                "Card UID length must be between {} and {} bytes, got {}",
                MIN_UID_LENGTH, MAX_UID_LENGTH, uid_len
            )));
        }

        Ok(Self {
            uid,
            card_type,
            timestamp: chrono::Utc::now(),
        })
    }

    /// Get the UID as a hexadecimal string.
    pub fn uid_hex(&self) -> String {
        self.uid.iter().map(|b| format!("{:02X}", b)).collect()
    }

    /// Derive the tag identifier from the first four UID bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID is shorter than four bytes, which
    /// cannot happen for card data built through [`CardData::new`].
    pub fn tag_id(&self) -> Result<TagId> {
        Ok(TagId::from_uid(&self.uid)?)
    }
}

/// Contactless reader abstraction.
///
/// Every method is expected to return within a short, bounded time; no
/// method may wait for a card to show up. Presence is discovered by
/// polling `request` and then `anticollision` once per tick.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future` (Edition 2024 RPITIT). Use generic parameters, or
/// [`AnyTagReader`](crate::devices::AnyTagReader) for dynamic dispatch.
///
/// # Examples
///
/// ```no_run
/// use cardbox_hardware::traits::TagReader;
/// use cardbox_hardware::error::Result;
///
/// async fn read_tag<R: TagReader>(reader: &mut R) -> Result<Option<String>> {
///     if !reader.request().await? {
///         return Ok(None);
///     }
///     let card = reader.anticollision().await?;
///     Ok(Some(card.tag_id()?.to_string()))
/// }
/// ```
pub trait TagReader: Send + Sync {
    /// Bring up the bus and the reader chip.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus or chip is unavailable.
    async fn initialize(&mut self) -> Result<()>;

    /// Probe the field for an idle card.
    ///
    /// Returns `Ok(true)` when a card answered the request, `Ok(false)`
    /// when the field is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange with the chip fails.
    async fn request(&mut self) -> Result<bool>;

    /// Run one anticollision exchange and return the selected card.
    ///
    /// A single attempt may fail transiently (collision, noise); callers
    /// retry within their own time budget.
    ///
    /// # Errors
    ///
    /// Returns an error if no card could be selected or the exchange fails.
    async fn anticollision(&mut self) -> Result<CardData>;

    /// Release the bus and pins.
    ///
    /// Must be safe to call repeatedly and on a reader that was never
    /// initialized.
    ///
    /// # Errors
    ///
    /// Returns an error if releasing a resource failed.
    async fn cleanup(&mut self) -> Result<()>;

    /// Get reader information.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs while querying
    /// reader information.
    async fn get_reader_info(&self) -> Result<ReaderInfo>;
}
