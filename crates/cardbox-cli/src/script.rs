//! Line-oriented control script for the mock reader.
//!
//! | line          | effect                                |
//! |---------------|---------------------------------------|
//! | `<uid hex>`   | place a card with that UID            |
//! | `-`           | remove the card                       |
//! | `!`           | fail the next bus exchange            |
//! | `q`           | quit                                  |
//!
//! Blank lines and lines starting with `#` are ignored.

use anyhow::{Context, Result, bail};
use cardbox_hardware::MIN_UID_LENGTH;
use cardbox_hardware::mock::MockTagReaderHandle;

/// One parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    /// Place a card in the field.
    Present(Vec<u8>),
    /// Take the card out of the field.
    Remove,
    /// Inject one bus fault.
    Fault,
    /// Stop the program.
    Quit,
}

/// Parse one line. Returns `Ok(None)` for lines without a command.
pub fn parse_line(line: &str) -> Result<Option<ScriptCommand>> {
    let line = line.trim();

    let command = match line {
        "" => return Ok(None),
        _ if line.starts_with('#') => return Ok(None),
        "-" => ScriptCommand::Remove,
        "!" => ScriptCommand::Fault,
        "q" | "quit" => ScriptCommand::Quit,
        uid => {
            let digits: String = uid.chars().filter(|c| !matches!(c, ' ' | ':')).collect();
            let uid = hex::decode(&digits).with_context(|| format!("invalid UID '{}'", line))?;
            if uid.len() < MIN_UID_LENGTH {
                bail!("UID '{}' is shorter than {} bytes", line, MIN_UID_LENGTH);
            }
            ScriptCommand::Present(uid)
        }
    };

    Ok(Some(command))
}

/// Apply a command to the mock reader. Returns `false` on [`ScriptCommand::Quit`].
pub fn apply(command: ScriptCommand, control: &MockTagReaderHandle) -> Result<bool> {
    match command {
        ScriptCommand::Present(uid) => control.present_card(uid)?,
        ScriptCommand::Remove => control.remove_card(),
        ScriptCommand::Fault => control.inject_faults(1),
        ScriptCommand::Quit => return Ok(false),
    }
    Ok(true)
}
