use std::time::Duration;

use async_trait::async_trait;
use shared::{
    domain::{ButtonIndex, PresenceState, PressEvent},
    error::{AlertError, PresenceError, RenderError},
};
use tokio::sync::mpsc;

mod http_presence;
mod logged_presence;
mod tracing_notifier;
mod virtual_deck;

pub use http_presence::HttpPresence;
pub use logged_presence::LoggedPresence;
pub use tracing_notifier::TracingNotifier;
pub use virtual_deck::{PressSender, VirtualDeck};

/// Ordered, uncoalesced press events from a deck.
pub type PressStream = mpsc::UnboundedReceiver<PressEvent>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub timeout: Duration,
}

#[async_trait]
pub trait DeckDevice: Send + Sync {
    async fn set_button_image(&self, button: ButtonIndex, image: &[u8])
        -> Result<(), RenderError>;
    /// Hands out the press stream. Only the first call returns `Some`.
    fn take_press_events(&self) -> Option<PressStream>;
}

#[async_trait]
pub trait PresenceService: Send + Sync {
    async fn set_presence(&self, state: PresenceState) -> Result<(), PresenceError>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), AlertError>;
}
