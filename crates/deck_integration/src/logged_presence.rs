use async_trait::async_trait;
use shared::{domain::PresenceState, error::PresenceError};
use tracing::info;

use crate::PresenceService;

/// Stand-in used when no presence endpoint is configured.
#[derive(Debug, Default)]
pub struct LoggedPresence;

#[async_trait]
impl PresenceService for LoggedPresence {
    async fn set_presence(&self, state: PresenceState) -> Result<(), PresenceError> {
        info!(%state, "presence update (no endpoint configured)");
        Ok(())
    }
}
