use serde::Deserialize;
use serde::Serialize;

/// Uniform response body wrapped around every non-streaming endpoint:
/// `{ code, message, data }`, where `code == 200` carries the payload in
/// `data` and any other code carries a human-readable `message`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}
