use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use shared::{domain::PresenceState, error::PresenceError};
use tracing::debug;
use url::Url;

use crate::PresenceService;

/// Presence bridge reachable over HTTP. Each update is a single
/// `POST {"state": "..."}` against the configured endpoint.
pub struct HttpPresence {
    http: Client,
    endpoint: Url,
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct PresenceUpdate {
    state: PresenceState,
}

impl HttpPresence {
    pub fn new(endpoint: Url, token: Option<String>) -> Self {
        Self::with_client(endpoint, token, Client::new())
    }

    /// Uses a caller-built client, e.g. one with proxies or TLS roots set.
    pub fn with_client(endpoint: Url, token: Option<String>, http: Client) -> Self {
        Self {
            http,
            endpoint,
            token,
        }
    }
}

#[async_trait]
impl PresenceService for HttpPresence {
    async fn set_presence(&self, state: PresenceState) -> Result<(), PresenceError> {
        let mut request = self
            .http
            .post(self.endpoint.clone())
            .json(&PresenceUpdate { state });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| PresenceError::Transport(err.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(PresenceError::Unauthorized),
            status if !status.is_success() => Err(PresenceError::Rejected {
                status: status.as_u16(),
            }),
            status => {
                debug!(%state, %status, endpoint = %self.endpoint, "presence update accepted");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/http_presence_tests.rs"]
mod tests;
