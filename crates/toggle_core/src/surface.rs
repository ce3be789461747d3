use std::{sync::Arc, time::Duration};

use deck_integration::{DeckDevice, PressStream};
use shared::{
    domain::{ButtonIndex, PresenceState},
    error::RenderError,
};

use crate::icons::IconStore;

/// One key on the deck: where the toggle's icon is drawn and where its
/// presses come from.
#[derive(Clone)]
pub struct DeviceSurface {
    device: Arc<dyn DeckDevice>,
    button: ButtonIndex,
    timeout: Duration,
}

impl DeviceSurface {
    pub fn new(device: Arc<dyn DeckDevice>, button: ButtonIndex, timeout: Duration) -> Self {
        Self {
            device,
            button,
            timeout,
        }
    }

    pub fn button(&self) -> ButtonIndex {
        self.button
    }

    pub async fn render(&self, icons: &IconStore, state: PresenceState) -> Result<(), RenderError> {
        let image = icons.image(state);
        tokio::time::timeout(
            self.timeout,
            self.device.set_button_image(self.button, image.bytes()),
        )
        .await
        .unwrap_or(Err(RenderError::TimedOut(self.timeout)))
    }

    pub fn subscribe(&self) -> Option<PressStream> {
        self.device.take_press_events()
    }
}
