use std::fmt;

use serde::{Deserialize, Serialize};

/// Visibility on the remote presence service. The toggle only ever moves
/// between these two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceState {
    #[default]
    Online,
    Invisible,
}

impl PresenceState {
    pub fn toggled(self) -> Self {
        match self {
            Self::Online => Self::Invisible,
            Self::Invisible => Self::Online,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Invisible => "invisible",
        }
    }
}

impl fmt::Display for PresenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ButtonIndex(pub u8);

impl fmt::Display for ButtonIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressEvent {
    pub button: ButtonIndex,
}

impl PressEvent {
    pub fn new(button: ButtonIndex) -> Self {
        Self { button }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPolicy {
    pub alerts_enabled: bool,
}

impl AlertPolicy {
    pub fn enabled() -> Self {
        Self {
            alerts_enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            alerts_enabled: false,
        }
    }
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self::enabled()
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
