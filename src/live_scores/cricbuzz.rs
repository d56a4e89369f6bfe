use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::debug;

use super::models::MatchId;
use super::provider::{MatchDiscovery, MatchFetcher};
use super::raw::RawMatchPayload;
use crate::error::ScoreError;

pub const DEFAULT_BASE_URL: &str = "https://www.cricbuzz.com";
pub const DEFAULT_USER_AGENT: &str = "cricbuzz-scraper/1.0.0";

/// Block on the landing page that lists the matches currently live.
const LIVE_MATCHES_BLOCK: &str = "#hm-scag-mtch-blk";

/// Match payloads and live-match discovery backed by Cricbuzz.
pub struct CricbuzzClient {
    http: Client,
    /// Base URL for overriding in tests
    base_url: String,
}

impl CricbuzzClient {
    pub fn new(base_url: Option<&str>, user_agent: &str, timeout: Duration) -> Result<Self, ScoreError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ScoreError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(CricbuzzClient {
            http,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn match_url(&self, id: &MatchId) -> Result<String, ScoreError> {
        if !id.is_path_safe() {
            return Err(ScoreError::InvalidPayload(format!("Invalid match id: {:?}", id.as_str())));
        }
        Ok(format!("{}/match-api/{}/commentary.json", self.base_url, id))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ScoreError> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await?;

        if !resp.status().is_success() {
            return Err(ScoreError::Transport(format!("Cricbuzz error: {}", resp.status())));
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

#[async_trait]
impl MatchFetcher for CricbuzzClient {
    async fn fetch_match(&self, id: &MatchId) -> Result<RawMatchPayload, ScoreError> {
        let body = self.get_bytes(&self.match_url(id)?).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn name(&self) -> &str {
        "Cricbuzz"
    }
}

#[async_trait]
impl MatchDiscovery for CricbuzzClient {
    async fn live_match_ids(&self) -> Result<Vec<MatchId>, ScoreError> {
        let body = self.get_bytes(&format!("{}/", self.base_url)).await?;
        parse_landing_page(&body)
    }
}

/// Stray invalid bytes are replaced rather than failing discovery.
fn parse_landing_page(body: &[u8]) -> Result<Vec<MatchId>, ScoreError> {
    parse_live_match_ids(&String::from_utf8_lossy(body))
}

/// Extract live match ids from the landing page.
///
/// Layout: `#hm-scag-mtch-blk > (first child) > (first child) > match*`,
/// where each match's first child is a link like
/// `/live-cricket-scores/20307/eng-vs-ind-1st-test`. The id is the third
/// `/`-separated segment.
pub fn parse_live_match_ids(html: &str) -> Result<Vec<MatchId>, ScoreError> {
    let selector = Selector::parse(LIVE_MATCHES_BLOCK)
        .map_err(|e| ScoreError::Parse(format!("Invalid selector {}: {:?}", LIVE_MATCHES_BLOCK, e)))?;
    let document = Html::parse_document(html);

    let Some(block) = document.select(&selector).next() else {
        return Ok(vec![]);
    };
    let Some(list) = first_child_element(block).and_then(first_child_element) else {
        return Ok(vec![]);
    };

    let ids = child_elements(list)
        .filter_map(first_child_element)
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| href.split('/').nth(2))
        .filter(|id| !id.is_empty())
        .map(MatchId::from)
        .collect();

    Ok(ids)
}

fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

fn first_child_element<'a>(el: ElementRef<'a>) -> Option<ElementRef<'a>> {
    child_elements(el).next()
}
