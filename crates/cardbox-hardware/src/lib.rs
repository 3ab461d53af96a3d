//! Reader abstraction layer for cardbox.
//!
//! This crate provides the trait-based abstraction over the contactless
//! reader that cardbox polls for tag presence, together with a mock reader
//! for development and testing without physical hardware.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All I/O operations are asynchronous using native `async fn`
//!   in traits (Rust 1.90 + Edition 2024 RPITIT).
//! - **Bounded**: No operation waits for a card to appear; presence is
//!   discovered by polling.
//! - **Thread-safe**: Readers are `Send + Sync` for use with Tokio.
//! - **Error-aware**: All operations return `Result<T>`; deciding which
//!   failures count as "no tag" is left to the poll layer above.
//!
//! # Reading a Tag
//!
//! ```no_run
//! use cardbox_hardware::traits::TagReader;
//! use cardbox_hardware::error::Result;
//!
//! async fn read_tag<R: TagReader>(reader: &mut R) -> Result<Option<String>> {
//!     if !reader.request().await? {
//!         return Ok(None);
//!     }
//!     let card = reader.anticollision().await?;
//!     Ok(Some(card.tag_id()?.to_string()))
//! }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] which uses the
//! [`HardwareError`] error type.

pub mod devices;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::AnyTagReader;
pub use error::{HardwareError, Result};
pub use traits::{CardData, CardType, MAX_UID_LENGTH, MIN_UID_LENGTH, TagReader};
pub use types::ReaderInfo;
