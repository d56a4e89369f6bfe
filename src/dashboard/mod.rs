use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::live_scores::{FetchOptions, LiveScoreService, MatchAggregator, MatchId, ScoreCache};

#[derive(Clone)]
pub struct AppState {
    pub scores: Arc<LiveScoreService>,
    pub aggregator: Arc<MatchAggregator>,
    /// Same cache the score service writes to; read here for health stats.
    pub cache: ScoreCache,
}

#[derive(Debug, Deserialize)]
pub struct ScoreQuery {
    pub use_cache: Option<bool>,
}

/// Build the Axum router for the score API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/health", get(health_handler))
        .route("/api/matches", get(recent_matches_handler))
        .route("/api/matches/:id", get(live_score_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

async fn index_handler() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}

/// GET /api/health
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "cachedMatches": state.cache.len().await,
    }))
}

/// GET /api/matches
async fn recent_matches_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .aggregator
        .get_recent_matches()
        .await
        .map(Json)
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))
}

/// GET /api/matches/:id?use_cache=false
async fn live_score_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ScoreQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let id = MatchId::new(id);
    if !id.is_path_safe() {
        return Err((StatusCode::BAD_REQUEST, format!("Invalid match id: {:?}", id.as_str())));
    }
    let options = FetchOptions {
        use_cache: query.use_cache.unwrap_or(true),
    };
    state
        .scores
        .get_live_score(&id, options)
        .await
        .map(Json)
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))
}

/// Embedded single-file dashboard (HTML + CSS + JS)
const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Live Cricket Scores</title>
<style>
  :root { --bg: #0f1117; --card: #1a1d27; --border: #2a2d3a; --green: #00c896; --red: #ff4f6a; --text: #e0e0e0; --muted: #8888aa; }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { padding: 1rem 2rem; border-bottom: 1px solid var(--border); font-size: 1.4rem; font-weight: 700; }
  main { padding: 1.5rem 2rem; display: grid; grid-template-columns: repeat(auto-fill, minmax(320px, 1fr)); gap: 1rem; }
  .card { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.2rem; }
  .card .series { color: var(--muted); font-size: .8rem; text-transform: uppercase; margin-bottom: .4rem; }
  .card .innings { font-size: 1.3rem; font-weight: 700; margin: .4rem 0; }
  .card .status { color: var(--green); font-size: .9rem; }
  .card .comm { color: var(--muted); font-size: .85rem; margin-top: .6rem; }
  .card.error { border-color: var(--red); color: var(--red); }
  .empty { color: var(--muted); }
</style>
</head>
<body>
<header>Live Cricket Scores</header>
<main id="matches"><p class="empty">Loading…</p></main>
<script>
const ESCAPES = { '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' };
function esc(v) {
  return String(v ?? '').replace(/[&<>"']/g, c => ESCAPES[c]);
}
function innings(i) {
  if (!i) return '';
  return esc(`${i.shortName || i.name || i.id} ${i.score ?? '-'}/${i.wickets ?? '-'} (${i.overs ?? '-'})`);
}
function card(m) {
  if (m.error) return `<div class="card error">Match ${esc(m.matchId)}: ${esc(m.error)}</div>`;
  const d = m.score && m.score.detail;
  const last = m.score && m.score.lastBallDetail && m.score.lastBallDetail.commentary;
  return `<div class="card">
    <div class="series">${esc(m.series)} · ${esc(m.type)}</div>
    <div class="innings">${d ? innings(d.batting) : esc(m.venue && m.venue.name)}</div>
    ${d && d.bowling ? `<div>${innings(d.bowling)}</div>` : ''}
    <div class="status">${esc(m.status || m.state)}</div>
    ${last ? `<div class="comm">${esc(last)}</div>` : ''}
  </div>`;
}
async function refresh() {
  try {
    const res = await fetch('/api/matches');
    if (!res.ok) throw new Error(await res.text());
    const matches = await res.json();
    document.getElementById('matches').innerHTML = matches.length
      ? matches.map(card).join('')
      : '<p class="empty">No live matches right now.</p>';
  } catch (e) {
    document.getElementById('matches').innerHTML = `<p class="empty">${esc(e.message)}</p>`;
  }
}
refresh();
setInterval(refresh, 30000);
</script>
</body>
</html>
"#;
