use std::{sync::Arc, time::Duration};

use deck_integration::PresenceService;
use shared::{domain::PresenceState, error::PresenceError};

/// Timeout-bounded handle on the remote presence service. Holds no state.
#[derive(Clone)]
pub struct PresenceClient {
    service: Arc<dyn PresenceService>,
    timeout: Duration,
}

impl PresenceClient {
    pub fn new(service: Arc<dyn PresenceService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    pub async fn set_state(&self, state: PresenceState) -> Result<(), PresenceError> {
        tokio::time::timeout(self.timeout, self.service.set_presence(state))
            .await
            .unwrap_or(Err(PresenceError::TimedOut(self.timeout)))
    }
}
