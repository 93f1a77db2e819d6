//! Scam detection error types
//!
//! One error enum for the whole pipeline, plus a coarse [`ErrorKind`] used by
//! callers that only care which class of failure happened.

use thiserror::Error;

/// Scam detection error
#[derive(Debug, Error)]
pub enum ScamDetectionError {
    /// No message text after normalization
    #[error("Input is empty")]
    InputEmpty,

    /// OCR produced too little text to analyze
    #[error("Extracted text too short: {len} chars (need more than {min})")]
    InsufficientText { len: usize, min: usize },

    /// Transport failure or non-success status from the assessment service
    #[error("Assessment service error: {0}")]
    Service(String),

    /// The assessment service did not answer in time
    #[error("Assessment timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The caller cancelled the assessment
    #[error("Assessment cancelled")]
    Cancelled,

    /// The service reply did not match the expected shape
    #[error("Failed to parse assessment reply: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Scam detection result type
pub type Result<T> = std::result::Result<T, ScamDetectionError>;

/// Failure classes exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InputEmpty,
    ServiceError,
    ParseError,
    Cancelled,
    Configuration,
}

impl ScamDetectionError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InputEmpty | Self::InsufficientText { .. } => ErrorKind::InputEmpty,
            Self::Service(_) | Self::Timeout { .. } => ErrorKind::ServiceError,
            Self::Parse(_) => ErrorKind::ParseError,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Configuration(_) | Self::Io(_) => ErrorKind::Configuration,
        }
    }

    /// Whether the failure came from the external assessment path.
    ///
    /// These are the failures for which a heuristic-only response is still
    /// returned to the caller.
    pub fn is_external(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ServiceError | ErrorKind::ParseError | ErrorKind::Cancelled
        )
    }
}

impl From<reqwest::Error> for ScamDetectionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::Service(format!("connection failed: {}", err))
        } else {
            Self::Service(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScamDetectionError::Service("connection refused".to_string());
        assert_eq!(err.to_string(), "Assessment service error: connection refused");

        let err = ScamDetectionError::Timeout { timeout_ms: 250 };
        assert!(err.to_string().contains("250ms"));
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(ScamDetectionError::InputEmpty.kind(), ErrorKind::InputEmpty);
        assert_eq!(
            ScamDetectionError::InsufficientText { len: 3, min: 5 }.kind(),
            ErrorKind::InputEmpty
        );
        assert_eq!(
            ScamDetectionError::Timeout { timeout_ms: 1 }.kind(),
            ErrorKind::ServiceError
        );
        assert_eq!(
            ScamDetectionError::Parse("bad json".into()).kind(),
            ErrorKind::ParseError
        );
    }

    #[test]
    fn test_is_external() {
        assert!(ScamDetectionError::Service("502".into()).is_external());
        assert!(ScamDetectionError::Parse("x".into()).is_external());
        assert!(ScamDetectionError::Cancelled.is_external());
        assert!(!ScamDetectionError::InputEmpty.is_external());
        assert!(!ScamDetectionError::Configuration("x".into()).is_external());
    }
}
