//! Error types for hardware operations.
//!
//! This module defines error types specific to reader operations, covering
//! failure scenarios such as bus faults, timeouts, malformed responses and
//! initialization or cleanup failures.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during reader operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device was used before a successful initialization.
    #[error("Device not initialized: {device}")]
    NotInitialized { device: String },

    /// Operation timed out after specified duration.
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Bus communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Invalid data received from device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Device initialization failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Card reading error.
    #[error("Card read error: {message}")]
    CardReadError { message: String },

    /// Releasing the bus or pins failed.
    #[error("Cleanup failed: {message}")]
    CleanupFailed { message: String },

    /// Identifier could not be derived from the card.
    #[error("Tag identifier error: {0}")]
    TagId(#[from] cardbox_core::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new not-initialized error.
    pub fn not_initialized(device: impl Into<String>) -> Self {
        Self::NotInitialized {
            device: device.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new card read error.
    pub fn card_read(message: impl Into<String>) -> Self {
        Self::CardReadError {
            message: message.into(),
        }
    }

    /// Create a new cleanup failed error.
    pub fn cleanup_failed(message: impl Into<String>) -> Self {
        Self::CleanupFailed {
            message: message.into(),
        }
    }

    /// Returns `true` for faults on the wire itself, as opposed to a card
    /// that simply could not be selected this round.
    pub fn is_transport_fault(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::CommunicationError { .. }
                | Self::InvalidData { .. }
                | Self::Io(_)
        )
    }
}
