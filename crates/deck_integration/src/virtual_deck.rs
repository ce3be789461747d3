use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use shared::{
    domain::{ButtonIndex, PressEvent},
    error::RenderError,
};
use tokio::sync::mpsc;
use tracing::debug;

use crate::{DeckDevice, PressStream};

/// File-backed deck: each button's display buffer is a PNG file under
/// `render_dir`, and presses are injected through a [`PressSender`].
///
/// The press stream ends once every `PressSender` clone is dropped.
pub struct VirtualDeck {
    render_dir: PathBuf,
    connected: AtomicBool,
    press_rx: Mutex<Option<PressStream>>,
}

#[derive(Debug, Clone)]
pub struct PressSender {
    tx: mpsc::UnboundedSender<PressEvent>,
}

impl PressSender {
    /// Returns false once the deck and its stream are gone.
    pub fn press(&self, button: ButtonIndex) -> bool {
        self.tx.send(PressEvent::new(button)).is_ok()
    }
}

impl VirtualDeck {
    pub fn new(render_dir: impl Into<PathBuf>) -> (Self, PressSender) {
        let (tx, press_rx) = mpsc::unbounded_channel();
        let deck = Self {
            render_dir: render_dir.into(),
            connected: AtomicBool::new(true),
            press_rx: Mutex::new(Some(press_rx)),
        };
        (deck, PressSender { tx })
    }

    pub fn render_dir(&self) -> &Path {
        &self.render_dir
    }

    pub fn button_path(&self, button: ButtonIndex) -> PathBuf {
        self.render_dir.join(format!("button-{}.png", button.0))
    }

    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn reconnect(&self) {
        self.connected.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DeckDevice for VirtualDeck {
    async fn set_button_image(
        &self,
        button: ButtonIndex,
        image: &[u8],
    ) -> Result<(), RenderError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(RenderError::Disconnected);
        }

        let write_failed = |err: std::io::Error| RenderError::DeviceWrite {
            button,
            reason: err.to_string(),
        };
        tokio::fs::create_dir_all(&self.render_dir)
            .await
            .map_err(write_failed)?;
        let path = self.button_path(button);
        tokio::fs::write(&path, image).await.map_err(write_failed)?;
        debug!(%button, path = %path.display(), bytes = image.len(), "button image written");
        Ok(())
    }

    fn take_press_events(&self) -> Option<PressStream> {
        self.press_rx.lock().ok()?.take()
    }
}

#[cfg(test)]
#[path = "tests/virtual_deck_tests.rs"]
mod tests;
