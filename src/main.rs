use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod config;
mod dashboard;
mod error;
mod live_scores;

use config::Config;
use dashboard::AppState;
use live_scores::{CricbuzzClient, LiveScoreService, MatchAggregator, ScoreCache};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let cricbuzz = Arc::new(
        CricbuzzClient::new(
            Some(&config.cricbuzz_url),
            &config.user_agent,
            config.fetch_timeout(),
        )
        .context("Failed to build Cricbuzz client")?,
    );

    // One cache for the whole process lifetime.
    let cache = ScoreCache::new();
    let scores = Arc::new(
        LiveScoreService::new(cricbuzz.clone(), cache.clone())
            .with_ttl(config.cache_ttl())
            .with_fetch_timeout(config.fetch_timeout()),
    );
    let aggregator = Arc::new(MatchAggregator::new(cricbuzz, scores.clone()));

    info!(
        "Using {} (cache ttl={:?}, fetch timeout={:?})",
        config.cricbuzz_url,
        config.cache_ttl(),
        config.fetch_timeout()
    );

    let app = dashboard::router(AppState {
        scores,
        aggregator,
        cache,
    });
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Score API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app).await?;

    Ok(())
}
