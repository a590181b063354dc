use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

pub const BASE_URL_ENV_VAR: &str = "JARVIS_BASE_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15_000;

/// Wire framing spoken by the streaming chat endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireApi {
    /// `event:`/`data:` blocks terminated by a blank line.
    #[default]
    FieldBlock,
    /// One JSON object per line.
    JsonLines,
}

/// Where and how to reach the chat backend.
///
/// The base URL is resolved once at construction; nothing in the client
/// reads the process environment after that, so tests can point a client
/// at a fake endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EndpointConfig {
    pub base_url: Option<String>,
    #[serde(default)]
    pub wire_api: WireApi,
    /// Timeout applied to non-streaming calls only. The streaming read
    /// loop imposes none.
    pub request_timeout_ms: Option<u64>,
}

impl EndpointConfig {
    /// Resolve the base URL from `JARVIS_BASE_URL`, falling back to the
    /// built-in default when unset or blank.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var(BASE_URL_ENV_VAR)
                .ok()
                .filter(|v| !v.trim().is_empty()),
            wire_api: WireApi::default(),
            request_timeout_ms: None,
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            wire_api: WireApi::default(),
            request_timeout_ms: None,
        }
    }

    pub fn wire_api(mut self, wire_api: WireApi) -> Self {
        self.wire_api = wire_api;
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Full URL of the streaming chat endpoint for the configured framing.
    pub fn stream_url(&self) -> String {
        let base_url = self.base_url();
        match self.wire_api {
            WireApi::FieldBlock => format!("{base_url}/chat/string"),
            WireApi::JsonLines => format!("{base_url}/chat/json"),
        }
    }

    /// Full URL of a non-streaming endpoint under the same base.
    pub fn api_url(&self, path: &str) -> String {
        format!("{base_url}{path}", base_url = self.base_url())
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS))
    }
}
