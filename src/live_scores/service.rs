use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::cache::{ScoreCache, DEFAULT_TTL};
use super::models::{MatchId, MatchSnapshot};
use super::normalize::normalize;
use super::provider::MatchFetcher;
use crate::error::ScoreError;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(5_000);

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Serve from and write to the cache. Defaults to `true`.
    pub use_cache: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions { use_cache: true }
    }
}

/// Cache lookup, then fetch + normalize + cache write on a miss.
pub struct LiveScoreService {
    fetcher: Arc<dyn MatchFetcher>,
    cache: ScoreCache,
    ttl: Duration,
    fetch_timeout: Duration,
}

impl LiveScoreService {
    pub fn new(fetcher: Arc<dyn MatchFetcher>, cache: ScoreCache) -> Self {
        LiveScoreService {
            fetcher,
            cache,
            ttl: DEFAULT_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Current snapshot for one match. Any failure is reported as
    /// [`ScoreError::FetchFailed`].
    pub async fn get_live_score(
        &self,
        id: &MatchId,
        options: FetchOptions,
    ) -> Result<Arc<MatchSnapshot>, ScoreError> {
        self.fetch_snapshot(id, options)
            .await
            .map_err(|e| ScoreError::fetch_failed(ScoreError::LIVE_SCORE_CONTEXT, e))
    }

    async fn fetch_snapshot(
        &self,
        id: &MatchId,
        options: FetchOptions,
    ) -> Result<Arc<MatchSnapshot>, ScoreError> {
        if options.use_cache {
            if let Some(snapshot) = self.cache.get_fresh(id, self.ttl).await {
                debug!("Cache hit for match {}", id);
                return Ok(snapshot);
            }
        }

        debug!("Fetching match {} from {}", id, self.fetcher.name());
        let raw = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch_match(id))
            .await
            .map_err(|_| ScoreError::Transport(format!("timed out after {:?}", self.fetch_timeout)))??;

        let snapshot = Arc::new(normalize(&raw)?);

        if options.use_cache {
            self.cache.put(id.clone(), Arc::clone(&snapshot)).await;
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::live_scores::raw::RawMatchPayload;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fetcher that serves a small live payload, counts calls and fails for
    /// the ids it is told to.
    pub(crate) struct MockFetcher {
        pub calls: AtomicUsize,
        pub failing: HashSet<String>,
        pub delay: Duration,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            MockFetcher {
                calls: AtomicUsize::new(0),
                failing: HashSet::new(),
                delay: Duration::ZERO,
            }
        }

        pub fn failing(ids: &[&str]) -> Self {
            MockFetcher {
                failing: ids.iter().map(|s| s.to_string()).collect(),
                ..Self::new()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MatchFetcher for MockFetcher {
        async fn fetch_match(&self, id: &MatchId) -> Result<RawMatchPayload, ScoreError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.failing.contains(id.as_str()) {
                return Err(ScoreError::Transport("connection refused".into()));
            }
            let raw = serde_json::from_value(json!({
                "id": id.as_str(),
                "state": "inprogress",
                "status": format!("fetch #{}", n),
                "team1": { "id": "9", "name": "England", "s_name": "ENG" },
                "team2": { "id": "2", "name": "India", "s_name": "IND" },
                "score": {
                    "crr": "6.00",
                    "batting": { "id": "2", "innings": [{ "score": "60", "overs": "10", "wkts": "1" }] }
                }
            }))?;
            Ok(raw)
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    fn service(fetcher: Arc<MockFetcher>) -> LiveScoreService {
        LiveScoreService::new(fetcher, ScoreCache::new())
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_call_within_ttl_is_served_from_cache() {
        let fetcher = Arc::new(MockFetcher::new());
        let svc = service(Arc::clone(&fetcher));
        let id = MatchId::from("20307");

        let first = svc.get_live_score(&id, FetchOptions::default()).await.unwrap();
        tokio::time::advance(Duration::from_millis(10_000)).await;
        let second = svc.get_live_score(&id, FetchOptions::default()).await.unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entry_is_refetched_and_overwritten() {
        let fetcher = Arc::new(MockFetcher::new());
        let cache = ScoreCache::new();
        let svc = LiveScoreService::new(fetcher.clone(), cache.clone());
        let id = MatchId::from("20307");

        svc.get_live_score(&id, FetchOptions::default()).await.unwrap();
        tokio::time::advance(Duration::from_millis(30_001)).await;
        let refreshed = svc.get_live_score(&id, FetchOptions::default()).await.unwrap();

        assert_eq!(fetcher.calls(), 2);
        assert_eq!(refreshed.status.as_deref(), Some("fetch #2"));
        let cached = cache.get(&id).await.unwrap();
        assert_eq!(cached.snapshot.status.as_deref(), Some("fetch #2"));
    }

    #[tokio::test]
    async fn test_use_cache_false_bypasses_cache() {
        let fetcher = Arc::new(MockFetcher::new());
        let cache = ScoreCache::new();
        let svc = LiveScoreService::new(fetcher.clone(), cache.clone());
        let id = MatchId::from("1");
        let no_cache = FetchOptions { use_cache: false };

        svc.get_live_score(&id, no_cache).await.unwrap();
        svc.get_live_score(&id, no_cache).await.unwrap();

        assert_eq!(fetcher.calls(), 2);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_fetch_error_is_wrapped() {
        let fetcher = Arc::new(MockFetcher::failing(&["7"]));
        let svc = service(fetcher);

        let err = svc
            .get_live_score(&MatchId::from("7"), FetchOptions::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to fetch live score: connection refused"
        );
        assert!(matches!(err, ScoreError::FetchFailed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_a_fetch_failure() {
        let fetcher = Arc::new(MockFetcher {
            delay: Duration::from_secs(10),
            ..MockFetcher::new()
        });
        let svc = service(fetcher);

        let err = svc
            .get_live_score(&MatchId::from("1"), FetchOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to fetch live score: timed out"));
    }

    struct NoIdFetcher;

    #[async_trait]
    impl MatchFetcher for NoIdFetcher {
        async fn fetch_match(&self, _id: &MatchId) -> Result<RawMatchPayload, ScoreError> {
            Ok(serde_json::from_value(json!({ "type": "odi" }))?)
        }

        fn name(&self) -> &str {
            "no-id"
        }
    }

    #[tokio::test]
    async fn test_missing_id_is_not_cached() {
        let cache = ScoreCache::new();
        let svc = LiveScoreService::new(Arc::new(NoIdFetcher), cache.clone());

        let err = svc
            .get_live_score(&MatchId::from("404"), FetchOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch live score: No match found");
        assert_eq!(cache.len().await, 0);
    }
}
