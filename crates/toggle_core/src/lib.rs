use std::path::{Path, PathBuf};

use deck_integration::PressStream;
use shared::{
    domain::{AlertPolicy, PresenceState, PressEvent},
    error::ValidationError,
};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

mod alerts;
mod icons;
mod presence;
mod surface;

pub use alerts::{AlertSink, DEFAULT_ALERT_DISPLAY, DEFAULT_ALERT_TITLE};
pub use icons::{IconImage, IconStore};
pub use presence::PresenceClient;
pub use surface::DeviceSurface;

pub const STATUS_CHANGED_PREFIX: &str = "Steam status changed to: ";
pub const COMMAND_QUEUE_CAPACITY: usize = 64;

/// Everything that may touch controller state. Presses and configuration
/// changes travel the same queue so they are applied strictly in order.
#[derive(Debug)]
pub enum ControllerCommand {
    Press(PressEvent),
    SetIcons {
        online: PathBuf,
        invisible: PathBuf,
        reply: Option<oneshot::Sender<Result<(), ValidationError>>>,
    },
    SetAlertsEnabled(bool),
    ToggleAlerts,
}

pub fn command_channel() -> (
    mpsc::Sender<ControllerCommand>,
    mpsc::Receiver<ControllerCommand>,
) {
    mpsc::channel(COMMAND_QUEUE_CAPACITY)
}

/// Sole owner of the current presence state.
pub struct ToggleController {
    current: PresenceState,
    policy: AlertPolicy,
    icons: IconStore,
    presence: PresenceClient,
    surface: DeviceSurface,
    alerts: AlertSink,
    pending_alert: Option<JoinHandle<()>>,
}

impl ToggleController {
    pub fn new(
        icons: IconStore,
        presence: PresenceClient,
        surface: DeviceSurface,
        alerts: AlertSink,
        policy: AlertPolicy,
    ) -> Self {
        Self {
            current: PresenceState::Online,
            policy,
            icons,
            presence,
            surface,
            alerts,
            pending_alert: None,
        }
    }

    pub fn current(&self) -> PresenceState {
        self.current
    }

    pub fn alert_policy(&self) -> AlertPolicy {
        self.policy
    }

    pub fn icons(&self) -> &IconStore {
        &self.icons
    }

    pub fn take_press_events(&self) -> Option<PressStream> {
        self.surface.subscribe()
    }

    /// Flips the presence state. Collaborator failures are logged and the
    /// new state is committed regardless, so the next press always toggles
    /// from here.
    pub async fn on_press(&mut self) {
        let next = self.current.toggled();

        let (presence, render) = tokio::join!(
            self.presence.set_state(next),
            self.surface.render(&self.icons, next)
        );
        self.current = next;

        if let Err(error) = presence {
            warn!(state = %next, %error, "presence update failed; button may not match remote presence");
        }
        if let Err(error) = render {
            warn!(state = %next, button = %self.surface.button(), %error, "button render failed");
        }

        let message = format!("{STATUS_CHANGED_PREFIX}{next}");
        info!(state = %next, "{message}");
        if let Some(task) = self.alerts.spawn_notify(self.policy, message) {
            self.pending_alert = Some(task);
        }
    }

    /// Waits for the most recent alert to be shown or time out.
    pub async fn flush_alert(&mut self) {
        if let Some(task) = self.pending_alert.take() {
            if let Err(error) = task.await {
                warn!(%error, "alert task ended abnormally");
            }
        }
    }

    pub async fn set_icons(
        &mut self,
        online: impl AsRef<Path>,
        invisible: impl AsRef<Path>,
    ) -> Result<(), ValidationError> {
        self.icons.replace(online, invisible).await?;
        info!(
            online = %self.icons.image(PresenceState::Online).path().display(),
            invisible = %self.icons.image(PresenceState::Invisible).path().display(),
            "icons replaced"
        );
        Ok(())
    }

    pub fn set_alerts_enabled(&mut self, enabled: bool) {
        self.policy.alerts_enabled = enabled;
        debug!(enabled, "alert policy updated");
    }

    /// Returns the new setting.
    pub fn toggle_alerts(&mut self) -> bool {
        let enabled = !self.policy.alerts_enabled;
        self.set_alerts_enabled(enabled);
        enabled
    }

    pub async fn handle(&mut self, command: ControllerCommand) {
        match command {
            ControllerCommand::Press(event) if event.button == self.surface.button() => {
                self.on_press().await;
            }
            ControllerCommand::Press(event) => {
                debug!(button = %event.button, bound = %self.surface.button(), "ignoring press on unbound button");
            }
            ControllerCommand::SetIcons {
                online,
                invisible,
                reply,
            } => {
                let outcome = self.set_icons(&online, &invisible).await;
                if let Err(error) = &outcome {
                    warn!(%error, "icon update rejected; keeping previous icons");
                }
                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
            }
            ControllerCommand::SetAlertsEnabled(enabled) => self.set_alerts_enabled(enabled),
            ControllerCommand::ToggleAlerts => {
                self.toggle_alerts();
            }
        }
    }

    /// Processes commands one at a time until every sender is dropped, then
    /// lets the last alert finish and hands the controller back.
    pub async fn run(mut self, mut commands: mpsc::Receiver<ControllerCommand>) -> Self {
        while let Some(command) = commands.recv().await {
            self.handle(command).await;
        }
        self.flush_alert().await;
        debug!(state = %self.current, "command queue closed");
        self
    }
}

/// Feeds device presses into the command queue in arrival order. Returns
/// when the device stream ends or the controller is gone.
pub async fn forward_presses(
    mut presses: PressStream,
    commands: mpsc::Sender<ControllerCommand>,
) {
    while let Some(event) = presses.recv().await {
        if commands.send(ControllerCommand::Press(event)).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
