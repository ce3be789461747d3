use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::domain::{ButtonIndex, PresenceState};

/// Rejected icon replacement. Nothing is changed when this is returned.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{state} icon not found at '{}'", path.display())]
    MissingIcon { state: PresenceState, path: PathBuf },
    #[error("{state} icon at '{}' could not be read: {source}", path.display())]
    UnreadableIcon {
        state: PresenceState,
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("device rejected image for button {button}: {reason}")]
    DeviceWrite { button: ButtonIndex, reason: String },
    #[error("device disconnected")]
    Disconnected,
    #[error("render did not complete within {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, Error)]
pub enum PresenceError {
    #[error("presence transport failure: {0}")]
    Transport(String),
    #[error("presence service refused credentials")]
    Unauthorized,
    #[error("presence service rejected update with status {status}")]
    Rejected { status: u16 },
    #[error("presence update did not complete within {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("notification could not be shown: {0}")]
    Display(String),
    #[error("notification did not complete within {0:?}")]
    TimedOut(Duration),
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
