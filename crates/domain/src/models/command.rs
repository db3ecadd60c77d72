//! Anti-theft command state machine.
//!
//! The transition rules live here as pure methods on [`DeviceCommandState`];
//! confirmation-code verification is a collaborator concern, so wipe
//! transitions receive a verdict rather than the code itself. Wiped is
//! terminal: no transition leaves it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Command state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandState {
    Unlocked,
    Locked,
    WipeRequested,
    Wiped,
}

impl CommandState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandState::Unlocked => "unlocked",
            CommandState::Locked => "locked",
            CommandState::WipeRequested => "wipeRequested",
            CommandState::Wiped => "wiped",
        }
    }
}

impl std::fmt::Display for CommandState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by command transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("PIN is required")]
    MissingPin,

    #[error("Invalid confirmation code")]
    CodeMismatch,

    #[error("Device has been wiped and accepts no further commands")]
    DeviceWiped,

    #[error("Command is not valid while device is {0}")]
    IncompatibleState(CommandState),
}

/// Per-device command state record.
///
/// `pending_confirmation_code` holds the SHA-256 hex digest of a code
/// issued by a wipe request; the plaintext is never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCommandState {
    pub device_id: String,
    pub state: CommandState,
    #[serde(skip_serializing)]
    pub pending_confirmation_code: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl DeviceCommandState {
    /// Fresh state for a device that has never received a command.
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            state: CommandState::Unlocked,
            pending_confirmation_code: None,
            updated_at: Utc::now(),
        }
    }

    /// Locks the device. The pin is opaque to this layer; only its
    /// presence is checked (verification belongs to an external
    /// secure-storage collaborator). Re-lock is a no-op success.
    pub fn lock(&mut self, pin: &str) -> Result<(), CommandError> {
        match self.state {
            CommandState::Wiped => Err(CommandError::DeviceWiped),
            CommandState::WipeRequested => {
                Err(CommandError::IncompatibleState(CommandState::WipeRequested))
            }
            CommandState::Unlocked | CommandState::Locked => {
                if pin.trim().is_empty() {
                    return Err(CommandError::MissingPin);
                }
                self.state = CommandState::Locked;
                self.updated_at = Utc::now();
                Ok(())
            }
        }
    }

    /// Records a wipe request, storing the digest of the issued
    /// confirmation code. A repeated request re-issues: the new digest
    /// replaces the old one (last-write-wins).
    pub fn request_wipe(&mut self, code_digest: String) -> Result<(), CommandError> {
        if self.state == CommandState::Wiped {
            return Err(CommandError::DeviceWiped);
        }
        self.state = CommandState::WipeRequested;
        self.pending_confirmation_code = Some(code_digest);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Applies a verified wipe. `code_matches` is the verdict from the
    /// secret/pending-code comparison; a mismatch leaves state unchanged.
    pub fn confirm_wipe(&mut self, code_matches: bool) -> Result<(), CommandError> {
        if self.state == CommandState::Wiped {
            return Err(CommandError::DeviceWiped);
        }
        if !code_matches {
            return Err(CommandError::CodeMismatch);
        }
        self.state = CommandState::Wiped;
        self.pending_confirmation_code = None;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Whether a play-sound command may be delivered. Sound does not
    /// change state, but a wiped device accepts no commands at all.
    pub fn ensure_can_play_sound(&self) -> Result<(), CommandError> {
        if self.state == CommandState::Wiped {
            return Err(CommandError::DeviceWiped);
        }
        Ok(())
    }
}
