//! In-memory snapshot cache with a fixed time-to-live.
//!
//! Entries are whole `Arc<MatchSnapshot>` values swapped under the write
//! lock, so a reader sees either the previous entry or the new one. There is
//! no eviction: staleness is only checked at read time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use super::models::{MatchId, MatchSnapshot};

pub const DEFAULT_TTL: Duration = Duration::from_millis(30_000);

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub snapshot: Arc<MatchSnapshot>,
    pub fetched_at: Instant,
}

impl CacheEntry {
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

/// Shared, cloneable handle to the snapshot cache.
#[derive(Clone, Default)]
pub struct ScoreCache {
    inner: Arc<RwLock<HashMap<MatchId, CacheEntry>>>,
}

impl ScoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: &MatchId) -> Option<CacheEntry> {
        self.inner.read().await.get(id).cloned()
    }

    /// Store a snapshot stamped with the current instant, replacing any
    /// previous entry for the same match.
    pub async fn put(&self, id: MatchId, snapshot: Arc<MatchSnapshot>) {
        let entry = CacheEntry {
            snapshot,
            fetched_at: Instant::now(),
        };
        let mut inner = self.inner.write().await;
        inner.insert(id, entry);
        debug!("ScoreCache: {} entries", inner.len());
    }

    /// Snapshot for `id` if it was fetched less than `ttl` ago.
    pub async fn get_fresh(&self, id: &MatchId, ttl: Duration) -> Option<Arc<MatchSnapshot>> {
        self.get(id)
            .await
            .filter(|entry| entry.is_fresh(ttl, Instant::now()))
            .map(|entry| entry.snapshot)
    }

    /// Number of cached matches, fresh or stale.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live_scores::normalize::normalize;
    use crate::live_scores::raw::RawMatchPayload;

    fn snapshot(id: &str, status: &str) -> Arc<MatchSnapshot> {
        let raw: RawMatchPayload = serde_json::from_value(serde_json::json!({
            "id": id,
            "state": "preview",
            "status": status
        }))
        .unwrap();
        Arc::new(normalize(&raw).unwrap())
    }

    #[test]
    fn test_is_fresh_boundary() {
        let now = Instant::now();
        let entry = CacheEntry {
            snapshot: snapshot("1", "Match starts at 10:00"),
            fetched_at: now,
        };
        assert!(entry.is_fresh(DEFAULT_TTL, now));
        assert!(entry.is_fresh(DEFAULT_TTL, now + Duration::from_millis(29_999)));
        assert!(!entry.is_fresh(DEFAULT_TTL, now + DEFAULT_TTL));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_fresh_expires_after_ttl() {
        let cache = ScoreCache::new();
        let id = MatchId::from("1");
        cache.put(id.clone(), snapshot("1", "Match starts at 10:00")).await;

        assert!(cache.get_fresh(&id, DEFAULT_TTL).await.is_some());

        tokio::time::advance(Duration::from_millis(30_001)).await;
        assert!(cache.get_fresh(&id, DEFAULT_TTL).await.is_none());
        // Stale entries stay in place until overwritten.
        assert!(cache.get(&id).await.is_some());
    }

    #[tokio::test]
    async fn test_put_replaces_whole_entry() {
        let cache = ScoreCache::new();
        let id = MatchId::from("1");
        cache.put(id.clone(), snapshot("1", "old")).await;
        cache.put(id.clone(), snapshot("1", "new")).await;

        assert_eq!(cache.len().await, 1);
        let entry = cache.get(&id).await.unwrap();
        assert_eq!(entry.snapshot.status.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_interfere() {
        let cache = ScoreCache::new();
        let writers: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    let id = i.to_string();
                    cache.put(MatchId::from(id.as_str()), snapshot(&id, "live")).await;
                })
            })
            .collect();
        for w in writers {
            w.await.unwrap();
        }

        assert_eq!(cache.len().await, 8);
        for i in 0..8 {
            let entry = cache.get(&MatchId::from(i.to_string())).await.unwrap();
            assert_eq!(entry.snapshot.id, i.to_string());
        }
    }
}
