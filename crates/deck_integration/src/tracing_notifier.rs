use async_trait::async_trait;
use shared::error::AlertError;
use tracing::info;

use crate::{Notification, Notifier};

#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), AlertError> {
        info!(
            title = %notification.title,
            timeout_secs = notification.timeout.as_secs_f32(),
            "{}",
            notification.message
        );
        Ok(())
    }
}
