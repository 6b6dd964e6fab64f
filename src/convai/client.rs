//! ElevenLabs API client for conversational agents.

use crate::convai::error::{Error, format_api_error};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

/// Path of the conversation WebSocket.
const CONVERSATION_PATH: &str = "/v1/convai/conversation";
/// Path of the signed URL endpoint.
const SIGNED_URL_PATH: &str = "/v1/convai/conversation/get-signed-url";

const API_KEY_HEADER: &str = "xi-api-key";

/// HTTP request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);
/// Connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct SignedUrlResponse {
    signed_url: String,
}

/// Client bound to one API key.
#[derive(Clone)]
pub struct ElevenLabs {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for ElevenLabs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabs")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl ElevenLabs {
    pub fn new(api_key: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Point the client at another endpoint (proxy, local test server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a pre-authenticated WebSocket URL for a private agent.
    pub async fn get_signed_url(&self, agent_id: &str) -> Result<String, Error> {
        let mut url = Url::parse(&format!("{}{SIGNED_URL_PATH}", self.base_url))?;
        url.query_pairs_mut().append_pair("agent_id", agent_id);

        tracing::debug!("Requesting signed URL for agent {agent_id}");
        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::Api(format_api_error(&format!("HTTP {status}: {text}"))));
        }

        let parsed: SignedUrlResponse = serde_json::from_str(&text)
            .map_err(|e| Error::Api(format!("Failed to parse signed URL response: {e}")))?;
        Ok(parsed.signed_url)
    }

    /// WebSocket URL for a public agent (no authentication).
    pub fn public_url(&self, agent_id: &str) -> Result<String, Error> {
        let mut url = Url::parse(&format!("{}{CONVERSATION_PATH}", self.base_url))?;
        let scheme = match url.scheme() {
            "https" => "wss",
            "http" => "ws",
            other => other,
        }
        .to_string();
        url.set_scheme(&scheme)
            .map_err(|()| Error::Api(format!("Cannot use scheme {scheme} for WebSocket")))?;
        url.query_pairs_mut().append_pair("agent_id", agent_id);
        Ok(url.into())
    }
}
