pub mod aggregator;
pub mod cache;
pub mod cricbuzz;
pub mod models;
pub mod normalize;
pub mod provider;
pub mod raw;
pub mod service;

pub use aggregator::{MatchAggregator, MatchResult};
pub use cache::ScoreCache;
pub use cricbuzz::CricbuzzClient;
pub use models::{MatchId, MatchSnapshot};
pub use provider::{MatchDiscovery, MatchFetcher};
pub use service::{FetchOptions, LiveScoreService};
