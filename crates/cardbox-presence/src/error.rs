//! Error types for the presence detector and its poll loop.

use thiserror::Error;

/// Result type alias for presence detection operations.
pub type Result<T> = std::result::Result<T, PresenceError>;

/// Errors surfaced to the caller of the poll loop.
///
/// Per-tick read faults never show up here: they are degraded to "tag
/// absent" inside the raw poll layer.
#[derive(Debug, Error)]
pub enum PresenceError {
    /// The reader could not be brought up; it must not be polled.
    #[error("Reader initialization failed: {0}")]
    InitializationFailed(String),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] cardbox_core::Error),

    /// The poll task terminated abnormally.
    #[error("Poll task failed: {0}")]
    Task(String),
}
