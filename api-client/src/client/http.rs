use serde::Serialize;
use serde::de::DeserializeOwned;

use jarvis_protocol::ApiEnvelope;

use crate::endpoint::EndpointConfig;
use crate::error::Error;
use crate::error::Result;

const FALLBACK_API_ERROR: &str = "request failed";

/// Unwrap the backend's uniform `{ code, message, data }` body: code 200
/// yields `data`, anything else is an error carrying `message` (or a
/// fallback string when absent).
pub fn unwrap_envelope<T>(envelope: ApiEnvelope<T>) -> Result<T> {
    if envelope.code != 200 {
        return Err(Error::Api(
            envelope
                .message
                .unwrap_or_else(|| FALLBACK_API_ERROR.to_string()),
        ));
    }
    envelope
        .data
        .ok_or_else(|| Error::Api(FALLBACK_API_ERROR.to_string()))
}

pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    config: &EndpointConfig,
    path: &str,
) -> Result<T> {
    let response = client
        .get(config.api_url(path))
        .timeout(config.request_timeout())
        .send()
        .await?;
    decode_envelope(response).await
}

pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
    client: &reqwest::Client,
    config: &EndpointConfig,
    path: &str,
    body: &B,
) -> Result<T> {
    let response = client
        .post(config.api_url(path))
        .timeout(config.request_timeout())
        .json(body)
        .send()
        .await?;
    decode_envelope(response).await
}

async fn decode_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response>".to_string());
        return Err(Error::UnexpectedStatus { status, body });
    }
    let body = response.text().await?;
    unwrap_envelope(serde_json::from_str::<ApiEnvelope<T>>(&body)?)
}
