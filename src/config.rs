use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::live_scores::cricbuzz::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};

/// Live cricket score service
#[derive(Parser, Debug, Clone)]
#[command(name = "cricket-live", version, about)]
pub struct Config {
    /// API listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    /// Cricbuzz base URL (match API and landing page)
    #[arg(long, env = "CRICBUZZ_URL", default_value = DEFAULT_BASE_URL)]
    pub cricbuzz_url: String,

    /// User-Agent sent to Cricbuzz
    #[arg(long, env = "USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// How long a fetched match snapshot is served from cache (milliseconds)
    #[arg(long, env = "CACHE_TTL_MS", default_value = "30000")]
    pub cache_ttl_ms: u64,

    /// Upper bound on a single upstream fetch (milliseconds)
    #[arg(long, env = "FETCH_TIMEOUT_MS", default_value = "5000")]
    pub fetch_timeout_ms: u64,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.cache_ttl_ms == 0 {
            anyhow::bail!("cache_ttl_ms must be positive");
        }
        if self.fetch_timeout_ms == 0 {
            anyhow::bail!("fetch_timeout_ms must be positive");
        }
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            anyhow::bail!("listen_addr is not a valid socket address: {}", self.listen_addr);
        }
        match url::Url::parse(&self.cricbuzz_url) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
            _ => anyhow::bail!("cricbuzz_url must be an absolute http(s) URL: {}", self.cricbuzz_url),
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::parse_from(std::iter::once("cricket-live").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = parse(&[]);
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_ttl(), Duration::from_millis(30_000));
        assert_eq!(config.fetch_timeout(), Duration::from_millis(5_000));
    }

    #[test]
    fn test_rejects_zero_ttl() {
        assert!(parse(&["--cache-ttl-ms", "0"]).validate().is_err());
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(parse(&["--cricbuzz-url", "ftp://example.com"]).validate().is_err());
        assert!(parse(&["--cricbuzz-url", "www.cricbuzz.com"]).validate().is_err());
    }

    #[test]
    fn test_rejects_bad_listen_addr() {
        assert!(parse(&["--listen-addr", "localhost"]).validate().is_err());
    }
}
