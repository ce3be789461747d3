use std::{sync::Arc, time::Duration};

use deck_integration::{Notification, Notifier};
use shared::{domain::AlertPolicy, error::AlertError};
use tokio::task::JoinHandle;
use tracing::warn;

pub const DEFAULT_ALERT_TITLE: &str = "Stream Deck Plugin";
pub const DEFAULT_ALERT_DISPLAY: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct AlertSink {
    notifier: Arc<dyn Notifier>,
    title: String,
    display_for: Duration,
    timeout: Duration,
}

impl AlertSink {
    pub fn new(notifier: Arc<dyn Notifier>, timeout: Duration) -> Self {
        Self {
            notifier,
            title: DEFAULT_ALERT_TITLE.to_string(),
            display_for: DEFAULT_ALERT_DISPLAY,
            timeout,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_display_duration(mut self, display_for: Duration) -> Self {
        self.display_for = display_for;
        self
    }

    /// Shows `message` when the policy allows it. Failures are logged and
    /// dropped.
    pub async fn notify(&self, policy: AlertPolicy, message: &str) {
        if !policy.alerts_enabled {
            return;
        }

        let notification = Notification {
            title: self.title.clone(),
            message: message.to_string(),
            timeout: self.display_for,
        };
        let outcome = tokio::time::timeout(self.timeout, self.notifier.notify(notification))
            .await
            .unwrap_or(Err(AlertError::TimedOut(self.timeout)));

        if let Err(error) = outcome {
            warn!(%error, "on-screen alert failed");
        }
    }

    /// Runs [`notify`](Self::notify) on its own task so a slow notifier
    /// never holds up the caller. `None` when alerts are disabled.
    pub fn spawn_notify(&self, policy: AlertPolicy, message: String) -> Option<JoinHandle<()>> {
        if !policy.alerts_enabled {
            return None;
        }
        let sink = self.clone();
        Some(tokio::spawn(async move {
            sink.notify(policy, &message).await;
        }))
    }
}
