use thiserror::Error;

/// Failures surfaced by the upstream chat client once its retry budget is spent.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Transport failure or per-attempt timeout.
    #[error("Network error calling Groq after {attempts} attempt(s): {source}")]
    Network {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// Still rate limited (429) on the last permitted attempt.
    #[error("Groq API error 429 (rate limited after {attempts} attempt(s)): {message}")]
    RateLimited { attempts: u32, message: String },

    #[error("Groq API error {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Unexpected Groq response format: {body}")]
    MalformedResponse { body: String },
}

impl UpstreamError {
    /// Status code returned by the upstream service, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Network { source, .. } => source.status().map(|s| s.as_u16()),
            UpstreamError::RateLimited { .. } => Some(429),
            UpstreamError::Upstream { status, .. } => Some(*status),
            UpstreamError::MalformedResponse { .. } => Some(200),
        }
    }
}
