use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::models::{MatchId, MatchSnapshot};
use super::provider::MatchDiscovery;
use super::service::{FetchOptions, LiveScoreService};
use crate::error::ScoreError;

/// One slot of a batch result: a snapshot, or the error that replaced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MatchResult {
    Snapshot(Arc<MatchSnapshot>),
    #[serde(rename_all = "camelCase")]
    Failed { error: String, match_id: MatchId },
}

impl MatchResult {
    pub fn is_error(&self) -> bool {
        matches!(self, MatchResult::Failed { .. })
    }
}

/// Fans out over every live match and gathers the results in discovery
/// order. A failing match becomes a [`MatchResult::Failed`] entry; only a
/// discovery failure fails the whole batch.
pub struct MatchAggregator {
    discovery: Arc<dyn MatchDiscovery>,
    service: Arc<LiveScoreService>,
}

impl MatchAggregator {
    pub fn new(discovery: Arc<dyn MatchDiscovery>, service: Arc<LiveScoreService>) -> Self {
        MatchAggregator { discovery, service }
    }

    pub async fn get_recent_matches(&self) -> Result<Vec<MatchResult>, ScoreError> {
        let ids = self
            .discovery
            .live_match_ids()
            .await
            .map_err(|e| ScoreError::fetch_failed(ScoreError::RECENT_MATCHES_CONTEXT, e))?;

        if ids.is_empty() {
            return Ok(vec![]);
        }

        let fetches = ids.into_iter().map(|id| {
            let service = Arc::clone(&self.service);
            async move {
                match service.get_live_score(&id, FetchOptions::default()).await {
                    Ok(snapshot) => MatchResult::Snapshot(snapshot),
                    Err(e) => {
                        warn!("Match {} failed: {}", id, e);
                        MatchResult::Failed {
                            error: e.to_string(),
                            match_id: id,
                        }
                    }
                }
            }
        });

        let results = futures_util::future::join_all(fetches).await;

        let failed = results.iter().filter(|r| r.is_error()).count();
        info!(
            "Fetched {} live match(es), {} failed",
            results.len(),
            failed
        );

        Ok(results)
    }
}
