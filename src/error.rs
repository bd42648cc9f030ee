use thiserror::Error;

#[derive(Debug, Error)]
pub enum PitchError {
    #[error("invalid API credential: {0}")]
    InvalidCredential(String),

    #[error("rate limit reached — try again in {seconds_remaining}s")]
    RateLimited { seconds_remaining: u64 },

    #[error("API quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("provider unavailable after {attempts} attempts: {message}")]
    ProviderUnavailable { attempts: u32, message: String },

    #[error("network failure after {attempts} attempts: {message}")]
    NetworkFailure { attempts: u32, message: String },

    #[error("retries exhausted after {attempts} attempts")]
    ExhaustedRetries { attempts: u32 },

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("no parsable JSON in model output: {excerpt}")]
    UnparsableJson { excerpt: String },

    #[error("unknown model: {model}")]
    UnknownModel { model: String },
}

impl PitchError {
    /// Returns true for transient conditions the transport engine retries
    /// internally. Everything else is terminal on the first occurrence.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::ProviderUnavailable { .. } => true,
            Self::NetworkFailure { .. } => true,
            Self::ExhaustedRetries { .. } => true,
            // 4xx, auth, parse and registry failures won't succeed on retry
            _ => false,
        }
    }

    /// Sanitized message for UI display. Never includes the credential.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredential(msg) => format!("API key problem: {msg}"),
            Self::RateLimited { seconds_remaining } => {
                format!("Too many requests — please wait {seconds_remaining} seconds")
            }
            Self::QuotaExceeded(_) => {
                "API quota exceeded — check your plan and billing".to_string()
            }
            Self::BadRequest(detail) => format!("The request was rejected: {detail}"),
            Self::ProviderUnavailable { .. } => {
                "The generation service is temporarily unavailable — try again shortly".to_string()
            }
            Self::NetworkFailure { .. } => {
                "Could not reach the generation service — check your connection".to_string()
            }
            Self::ExhaustedRetries { attempts } => {
                format!("Still rate limited after {attempts} attempts — try again later")
            }
            Self::MalformedResponse(_) => {
                "The model returned an unexpected response — try again".to_string()
            }
            Self::UnparsableJson { .. } => {
                "The model output could not be understood — try rephrasing your idea".to_string()
            }
            Self::UnknownModel { model } => format!("unknown model: {model}"),
        }
    }
}
