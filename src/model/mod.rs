pub mod error;

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use crate::config::UpstreamConfig;
use crate::web::models::{Message, Role};

pub use error::UpstreamError;

pub const SYSTEM_PROMPT: &str = "You are a helpful, concise assistant.";
pub const TEMPERATURE: f64 = 0.7;

/// Anything that can turn a user message into an assistant reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, user_message: &str) -> Result<String, UpstreamError>;
}

// A wrapper for the Groq chat completions API
pub struct GroqModel {
    config: UpstreamConfig,
    client: Client,
}

impl GroqModel {
    pub fn new(config: UpstreamConfig) -> Result<Self, reqwest::Error> {
        info!(
            "Using Groq endpoint {} with model {} (timeout {:?}, max_retries {}, backoff {:?})",
            config.api_url, config.model, config.request_timeout, config.max_retries, config.backoff_unit
        );

        // The client-level timeout bounds every attempt, including reading the body.
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self { config, client })
    }

    fn payload(&self, user_message: &str) -> Value {
        let messages = vec![
            Message {
                role: Role::System,
                content: SYSTEM_PROMPT.to_string(),
            },
            Message {
                role: Role::User,
                content: user_message.to_string(),
            },
        ];

        json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": TEMPERATURE,
        })
    }

    async fn send_once(&self, payload: &Value) -> Result<(StatusCode, String), reqwest::Error> {
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

#[async_trait]
impl ChatModel for GroqModel {
    async fn complete(&self, user_message: &str) -> Result<String, UpstreamError> {
        let payload = self.payload(user_message);
        debug!("Payload: {}", payload);

        let max_retries = self.config.max_retries;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let (status, body) = match self.send_once(&payload).await {
                Ok(reply) => reply,
                Err(e) => {
                    if attempt <= max_retries {
                        let delay = backoff_delay(self.config.backoff_unit, attempt);
                        warn!("Network error on attempt {}: {}; retrying in {:?}", attempt, e, delay);
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(UpstreamError::Network {
                        attempts: attempt,
                        source: e,
                    });
                }
            };

            if status == StatusCode::OK {
                let reply = extract_reply(&body)?;
                info!("Response length: {} characters (attempt {})", reply.len(), attempt);
                return Ok(reply);
            }

            if is_retryable(status) && attempt <= max_retries {
                let delay = backoff_delay(self.config.backoff_unit, attempt);
                warn!("Groq returned {} on attempt {}; retrying in {:?}", status, attempt, delay);
                tokio::time::sleep(delay).await;
                continue;
            }

            let message = extract_error_message(&body);
            return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                UpstreamError::RateLimited {
                    attempts: attempt,
                    message,
                }
            } else {
                UpstreamError::Upstream {
                    status: status.as_u16(),
                    message,
                }
            });
        }
    }
}

/// Linear backoff: the unit delay times the attempt that just failed.
pub fn backoff_delay(unit: Duration, attempt: u32) -> Duration {
    unit * attempt
}

pub fn is_retryable(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

fn extract_reply(body: &str) -> Result<String, UpstreamError> {
    let malformed = || UpstreamError::MalformedResponse {
        body: body.to_string(),
    };

    let response_json: Value = serde_json::from_str(body).map_err(|_| malformed())?;

    response_json
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(str::to_string)
        .ok_or_else(malformed)
}

// Prefer the `error.message` of the usual error envelope, then the JSON body, then raw text.
fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value
            .get("error")
            .and_then(|error| error.get("message"))
            .and_then(|message| message.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        Err(_) => body.to_string(),
    }
}
