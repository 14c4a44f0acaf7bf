use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound `/chat` payload. Parsed leniently so that bad input never fails extraction.
#[derive(Debug, Default)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    /// Non-JSON bodies count as `{}` and a non-string `message` counts as absent.
    pub fn from_body(body: &[u8]) -> Self {
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(|message| message.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_default();

        Self { message }
    }

    pub fn trimmed(&self) -> &str {
        self.message.trim()
    }
}

/// Every `/chat` answer, success or failure, uses this shape.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

impl ChatResponse {
    pub fn error(detail: impl std::fmt::Display) -> Self {
        Self {
            reply: format!("Error: {}", detail),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "system")]
    System,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}
