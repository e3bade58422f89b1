use serde::Deserialize;

/// Subset of the Message resource returned by `POST /Messages.json`
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub sid: String,
    pub status: String,
    pub to: String,
    #[serde(default)]
    pub error_code: Option<i64>,
}

/// Error body Twilio returns on 4xx/5xx
#[derive(Debug, Clone, Deserialize)]
pub struct MessageErrorResponse {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
}
