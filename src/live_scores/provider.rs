use async_trait::async_trait;

use super::models::MatchId;
use super::raw::RawMatchPayload;
use crate::error::ScoreError;

/// Source of raw per-match payloads.
#[async_trait]
pub trait MatchFetcher: Send + Sync {
    /// Fetch and decode the payload for one match. Malformed JSON must
    /// surface as [`ScoreError::Parse`], never as a partial payload.
    async fn fetch_match(&self, id: &MatchId) -> Result<RawMatchPayload, ScoreError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Source of the identifiers of matches currently flagged live.
#[async_trait]
pub trait MatchDiscovery: Send + Sync {
    /// Ordered list of live match ids; empty when nothing is live.
    async fn live_match_ids(&self) -> Result<Vec<MatchId>, ScoreError>;
}
