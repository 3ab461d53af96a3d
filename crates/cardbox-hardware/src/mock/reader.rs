//! Mock contactless reader implementation for testing and development.
//!
//! This module provides a simulated reader whose field can be controlled
//! programmatically: cards can be placed and removed, and bus faults or
//! failing anticollision rounds can be injected.

use crate::{
    HardwareError, Result,
    traits::{CardData, CardType, TagReader},
    types::ReaderInfo,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Mock reader for testing and development.
///
/// The reader and its [`MockTagReaderHandle`] share the simulated field.
/// Unlike an event queue, the field is level-triggered: a presented card
/// stays readable on every poll until it is removed.
///
/// # Examples
///
/// ```
/// use cardbox_hardware::mock::MockTagReader;
/// use cardbox_hardware::traits::TagReader;
///
/// #[tokio::main]
/// async fn main() -> cardbox_hardware::Result<()> {
///     let (mut reader, handle) = MockTagReader::new();
///     reader.initialize().await?;
///
///     handle.present_card(vec![0x04, 0xAB, 0xCD, 0xEF])?;
///     assert!(reader.request().await?);
///
///     let card = reader.anticollision().await?;
///     assert_eq!(card.uid_hex(), "04ABCDEF");
///
///     handle.remove_card();
///     assert!(!reader.request().await?);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockTagReader {
    /// Shared simulated field
    state: Arc<Mutex<MockState>>,

    /// Device name
    name: String,
}

#[derive(Debug, Default)]
struct MockState {
    /// Card currently in the field
    card: Option<CardData>,

    /// Remaining request exchanges that fail with a bus fault
    pending_faults: u32,

    /// Every exchange fails with a bus fault
    persistent_fault: bool,

    /// Remaining anticollision rounds that fail before one succeeds
    failing_anticollisions: u32,

    /// Simulated duration of one anticollision round
    anticollision_delay: Duration,

    /// Next initialization attempt fails
    fail_initialize: bool,

    /// Cleanup reports an error
    fail_cleanup: bool,

    initialized: bool,
    initialize_calls: u32,
    cleanup_calls: u32,
    releases: u32,
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTagReader {
    /// Create a new mock reader with the default name.
    ///
    /// Returns a tuple of (MockTagReader, MockTagReaderHandle) where the
    /// handle controls the simulated field.
    pub fn new() -> (Self, MockTagReaderHandle) {
        Self::with_name("Mock Tag Reader".to_string())
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: String) -> (Self, MockTagReaderHandle) {
        let state = Arc::new(Mutex::new(MockState::default()));

        let reader = Self {
            state: Arc::clone(&state),
            name: name.clone(),
        };

        let handle = MockTagReaderHandle { state, name };

        (reader, handle)
    }

    fn ensure_initialized(&self, state: &MockState) -> Result<()> {
        if state.initialized {
            Ok(())
        } else {
            Err(HardwareError::not_initialized(self.name.clone()))
        }
    }
}

impl Default for MockTagReader {
    fn default() -> Self {
        Self::new().0
    }
}

impl TagReader for MockTagReader {
    async fn initialize(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.initialize_calls += 1;

        if state.fail_initialize {
            state.fail_initialize = false;
            return Err(HardwareError::initialization_failed(format!(
                "{}: bus unavailable",
                self.name
            )));
        }

        state.initialized = true;
        Ok(())
    }

    async fn request(&mut self) -> Result<bool> {
        let mut state = lock(&self.state);
        self.ensure_initialized(&state)?;

        if state.persistent_fault {
            return Err(HardwareError::communication("bus fault during request"));
        }

        if state.pending_faults > 0 {
            state.pending_faults -= 1;
            return Err(HardwareError::communication("bus fault during request"));
        }

        Ok(state.card.is_some())
    }

    async fn anticollision(&mut self) -> Result<CardData> {
        let delay = {
            let state = lock(&self.state);
            self.ensure_initialized(&state)?;
            state.anticollision_delay
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = lock(&self.state);

        if state.persistent_fault {
            return Err(HardwareError::communication(
                "bus fault during anticollision",
            ));
        }

        if state.failing_anticollisions > 0 {
            state.failing_anticollisions -= 1;
            return Err(HardwareError::card_read("collision detected"));
        }

        state
            .card
            .clone()
            .ok_or_else(|| HardwareError::card_read("no card in field"))
    }

    async fn cleanup(&mut self) -> Result<()> {
        let mut state = lock(&self.state);
        state.cleanup_calls += 1;

        if state.initialized {
            state.initialized = false;
            state.releases += 1;
        }

        if state.fail_cleanup {
            return Err(HardwareError::cleanup_failed(format!(
                "{}: pins still exported",
                self.name
            )));
        }

        Ok(())
    }

    async fn get_reader_info(&self) -> Result<ReaderInfo> {
        Ok(ReaderInfo::new(self.name.clone(), vec!["ISO14443A".to_string()])
            .with_bus("mock")
            .with_max_baud_rate(106000))
    }
}

/// Handle for controlling a mock reader.
///
/// Clones share the same simulated field as the reader they came from.
#[derive(Debug, Clone)]
pub struct MockTagReaderHandle {
    /// Shared simulated field
    state: Arc<Mutex<MockState>>,

    /// Device name
    name: String,
}

impl MockTagReaderHandle {
    /// Place a Mifare Classic 1K card with the given UID in the field.
    ///
    /// Replaces any card already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID length is outside 4-10 bytes.
    pub fn present_card(&self, uid: Vec<u8>) -> Result<()> {
        self.present(CardData::new(uid, CardType::MifareClassic1K)?);
        Ok(())
    }

    /// Place the given card in the field.
    pub fn present(&self, card: CardData) {
        debug!("{}: card {} placed", self.name, card.uid_hex());
        lock(&self.state).card = Some(card);
    }

    /// Remove the current card from the field.
    pub fn remove_card(&self) {
        if lock(&self.state).card.take().is_some() {
            debug!("{}: card removed", self.name);
        }
    }

    /// Make the next `count` request exchanges fail with a bus fault.
    pub fn inject_faults(&self, count: u32) {
        debug!("{}: next {} exchanges will fail", self.name, count);
        lock(&self.state).pending_faults = count;
    }

    /// Make every exchange fail with a bus fault until cleared.
    pub fn set_persistent_fault(&self, enabled: bool) {
        lock(&self.state).persistent_fault = enabled;
    }

    /// Make the next `count` anticollision rounds fail before one succeeds.
    pub fn fail_anticollisions(&self, count: u32) {
        lock(&self.state).failing_anticollisions = count;
    }

    /// Set how long one simulated anticollision round takes.
    pub fn set_anticollision_delay(&self, delay: Duration) {
        lock(&self.state).anticollision_delay = delay;
    }

    /// Make the next initialization attempt fail.
    pub fn fail_next_initialize(&self) {
        lock(&self.state).fail_initialize = true;
    }

    /// Make cleanup report an error.
    pub fn set_cleanup_failure(&self, enabled: bool) {
        lock(&self.state).fail_cleanup = enabled;
    }

    /// Check if a card is currently in the field.
    pub fn is_card_presented(&self) -> bool {
        lock(&self.state).card.is_some()
    }

    /// Get the UID of the card currently in the field, if any.
    pub fn current_card_uid(&self) -> Option<Vec<u8>> {
        lock(&self.state).card.as_ref().map(|card| card.uid.clone())
    }

    /// Check if the reader is initialized and holds its resources.
    pub fn is_initialized(&self) -> bool {
        lock(&self.state).initialized
    }

    /// Number of initialization attempts.
    pub fn initialize_calls(&self) -> u32 {
        lock(&self.state).initialize_calls
    }

    /// Number of cleanup calls.
    pub fn cleanup_calls(&self) -> u32 {
        lock(&self.state).cleanup_calls
    }

    /// Number of times held resources were actually released.
    pub fn releases(&self) -> u32 {
        lock(&self.state).releases
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
