use thiserror::Error;

/// Errors surfaced by the live-score pipeline.
///
/// Collaborators produce `Transport` / `Parse`, the normalizer produces
/// `InvalidPayload`, and the service boundary re-wraps all of them as
/// `FetchFailed` so callers only ever see one kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScoreError {
    /// Upstream returned a payload without a match id.
    #[error("{0}")]
    InvalidPayload(String),

    /// Network failure, non-success status or timeout.
    #[error("{0}")]
    Transport(String),

    /// Malformed JSON or HTML.
    #[error("{0}")]
    Parse(String),

    #[error("{context}: {cause}")]
    FetchFailed { context: &'static str, cause: String },
}

impl ScoreError {
    pub const LIVE_SCORE_CONTEXT: &'static str = "Failed to fetch live score";
    pub const RECENT_MATCHES_CONTEXT: &'static str = "Failed to fetch recent matches";

    /// Wrap any error in the uniform caller-facing kind.
    pub fn fetch_failed(context: &'static str, cause: impl std::fmt::Display) -> Self {
        ScoreError::FetchFailed {
            context,
            cause: cause.to_string(),
        }
    }
}

impl From<reqwest::Error> for ScoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ScoreError::Parse(e.to_string())
        } else {
            ScoreError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ScoreError {
    fn from(e: serde_json::Error) -> Self {
        ScoreError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failed_message_carries_cause() {
        let cause = ScoreError::InvalidPayload("No match found".into());
        let err = ScoreError::fetch_failed(ScoreError::LIVE_SCORE_CONTEXT, &cause);
        assert_eq!(err.to_string(), "Failed to fetch live score: No match found");
    }

    #[test]
    fn test_json_error_maps_to_parse() {
        let e = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(ScoreError::from(e), ScoreError::Parse(_)));
    }
}
