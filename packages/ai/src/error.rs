// ABOUTME: Error type shared by the LLM provider clients
// ABOUTME: Classifies failures into transient (retryable) and permanent

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AIServiceError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("API returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("No API key configured for {0}")]
    NoApiKey(&'static str),

    #[error("Invalid response format")]
    InvalidResponse,
}

pub type AIServiceResult<T> = Result<T, AIServiceError>;

impl AIServiceError {
    /// Map a transport error onto the transient variants where possible
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AIServiceError::Timeout
        } else if err.is_connect() {
            AIServiceError::Connection(err.to_string())
        } else {
            AIServiceError::RequestFailed(err)
        }
    }

    /// Timeouts, connection failures, rate limits and 5xx responses are worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            AIServiceError::Timeout | AIServiceError::Connection(_) => true,
            AIServiceError::Http { status, .. } => *status == 429 || *status >= 500,
            AIServiceError::RequestFailed(e) => e.is_timeout() || e.is_connect(),
            AIServiceError::ParseError(_)
            | AIServiceError::NoApiKey(_)
            | AIServiceError::InvalidResponse => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let http = |status| AIServiceError::Http {
            status,
            body: String::new(),
        };

        assert!(AIServiceError::Timeout.is_retryable());
        assert!(AIServiceError::Connection("refused".into()).is_retryable());
        assert!(http(429).is_retryable());
        assert!(http(500).is_retryable());
        assert!(http(529).is_retryable());

        assert!(!http(400).is_retryable());
        assert!(!http(401).is_retryable());
        assert!(!AIServiceError::NoApiKey("anthropic").is_retryable());
        assert!(!AIServiceError::ParseError("bad json".into()).is_retryable());
    }
}
