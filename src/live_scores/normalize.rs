//! Pure transformation from the upstream payload to a [`MatchSnapshot`].
//!
//! No I/O happens here. The only ambient input is the wall clock, used for
//! `lastUpdated` and the score timestamp.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

use super::models::{
    BallOutcome, InningsDetail, LastBallDetail, MatchSnapshot, PlayerRef, ScoreDetail,
    ScoreSnapshot, TeamInfo, Venue,
};
use super::raw::{RawCommentary, RawInningsTeam, RawMatchPayload, RawPlayer, RawPlayerStat, RawScore, RawTeam};
use crate::error::ScoreError;

const PREVIEW_STATE: &str = "preview";
const NOT_AVAILABLE: &str = "N/A";
const OVER_BOUNDARY: &str = "|";
const DOT_BALL: &str = ".";
/// `PlayerRef` keys filled from the roster.
const RESOLVED_KEYS: [&str; 2] = ["name", "shortName"];

/// Normalize an upstream payload, stamping it with the current time.
pub fn normalize(raw: &RawMatchPayload) -> Result<MatchSnapshot, ScoreError> {
    normalize_at(raw, Utc::now())
}

pub fn normalize_at(raw: &RawMatchPayload, now: DateTime<Utc>) -> Result<MatchSnapshot, ScoreError> {
    let id = raw
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ScoreError::InvalidPayload("No match found".to_string()))?;

    let mut snapshot = MatchSnapshot {
        id,
        match_type: raw.match_type.clone(),
        series: raw.series.as_ref().and_then(|s| s.name.clone()),
        status: raw.status.clone(),
        state: raw.state.clone(),
        start_time: raw.start_time.as_ref().and_then(parse_start_time),
        venue: raw
            .venue
            .as_ref()
            .map(|v| Venue {
                name: v.name.clone(),
                location: v.location.clone(),
            })
            .unwrap_or_default(),
        last_updated: now,
        teams: None,
        score: None,
    };

    // Pre-match payloads carry no live score structure.
    if snapshot.state.as_deref() == Some(PREVIEW_STATE) {
        return Ok(snapshot);
    }

    let teams = team_info(raw.team1.as_ref(), raw.team2.as_ref());
    let score = enhanced_score(raw.score.as_ref(), &teams, &raw.players, now);
    snapshot.teams = Some(teams);
    snapshot.score = Some(score);

    Ok(snapshot)
}

/// Epoch milliseconds (number or numeric string) or RFC 3339.
fn parse_start_time(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(millis) => DateTime::<Utc>::from_timestamp_millis(millis),
                Err(_) => DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc)),
            }
        }
        _ => None,
    }
}

fn team_info(team1: Option<&RawTeam>, team2: Option<&RawTeam>) -> BTreeMap<String, TeamInfo> {
    [team1, team2]
        .into_iter()
        .flatten()
        .filter_map(|team| {
            let id = team.id.clone()?;
            Some((
                id.clone(),
                TeamInfo {
                    id,
                    name: team.name.clone(),
                    short_name: team.s_name.clone(),
                },
            ))
        })
        .collect()
}

fn enhanced_score(
    score: Option<&RawScore>,
    teams: &BTreeMap<String, TeamInfo>,
    roster: &[RawPlayer],
    now: DateTime<Utc>,
) -> ScoreSnapshot {
    let detail = score_detail(score, teams);

    let mut enhanced = ScoreSnapshot {
        run_rate: score
            .and_then(|s| non_empty(&s.crr))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        target: score.and_then(|s| non_empty(&s.target)),
        detail,
        partnership: None,
        batsmen: None,
        bowlers: None,
        last_ball_detail: None,
        timestamp: now,
    };

    // No batsman list means no ball has been bowled in the current state
    // (e.g. innings break): keep the partial score shape.
    let Some(score) = score else {
        return enhanced;
    };
    let Some(batsman) = score.batsman.as_deref() else {
        return enhanced;
    };

    let overs = enhanced
        .detail
        .batting
        .as_ref()
        .and_then(|b| b.overs.as_deref());
    let prev_overs = score.prev_overs.as_deref().unwrap_or_default().trim();

    enhanced.last_ball_detail = Some(last_ball_detail(&score.comm_lines, roster, prev_overs, overs));
    enhanced.partnership = Some(non_empty(&score.prtshp).unwrap_or_else(|| NOT_AVAILABLE.to_string()));
    enhanced.batsmen = Some(resolve_players(batsman, roster));
    enhanced.bowlers = Some(resolve_players(score.bowler.as_deref().unwrap_or_default(), roster));

    enhanced
}

fn score_detail(score: Option<&RawScore>, teams: &BTreeMap<String, TeamInfo>) -> ScoreDetail {
    let batting = score.and_then(|s| s.batting.as_ref()).map(|b| innings_detail(b, teams));
    let bowling = score.and_then(|s| s.bowling.as_ref()).map(|b| innings_detail(b, teams));

    ScoreDetail {
        current_innings: if bowling.is_some() { 2 } else { 1 },
        batting,
        bowling,
    }
}

fn innings_detail(innings: &RawInningsTeam, teams: &BTreeMap<String, TeamInfo>) -> InningsDetail {
    let id = innings.id.clone().unwrap_or_default();
    let team = teams.get(&id).cloned().unwrap_or(TeamInfo {
        id,
        name: None,
        short_name: None,
    });
    let first = innings.innings.first();

    InningsDetail {
        team,
        score: first.and_then(|i| i.score.clone()),
        overs: first.and_then(|i| i.overs.clone()),
        wickets: first.and_then(|i| i.wkts.clone()),
    }
}

/// Commentary key of the ball just completed.
///
/// Upstream tags a ball with the over it was bowled in, so a whole-number
/// `overs` ("13") refers to the sixth ball of the previous over ("12.6").
pub fn last_ball_key(overs: &str) -> Option<String> {
    let overs = overs.trim();
    if overs.contains('.') {
        return Some(overs.to_string());
    }
    let over = overs.parse::<i64>().ok()?.checked_sub(1)?;
    Some(format!("{}.6", over))
}

/// Outcome of the most recent ball in a previous-overs string.
pub fn last_ball_outcome(prev_overs: &str) -> BallOutcome {
    let tokens: Vec<&str> = prev_overs.split_whitespace().collect();
    let last = match tokens.as_slice() {
        [.., before, last] if *last == OVER_BOUNDARY => Some(*before),
        [last] if *last == OVER_BOUNDARY => None,
        [.., last] => Some(*last),
        [] => None,
    };

    match last {
        Some(DOT_BALL) => BallOutcome::Dot,
        Some(token) => BallOutcome::Token(token.to_string()),
        None => BallOutcome::Unavailable,
    }
}

fn last_ball_detail(
    comm_lines: &[RawCommentary],
    roster: &[RawPlayer],
    prev_overs: &str,
    overs: Option<&str>,
) -> LastBallDetail {
    let Some(key) = overs.and_then(last_ball_key) else {
        return LastBallDetail::default();
    };
    let Some(line) = comm_lines.iter().find(|c| c.o_no.as_deref() == Some(key.as_str())) else {
        return LastBallDetail::default();
    };

    LastBallDetail {
        batsman: Some(resolve_players(&line.batsman, roster)),
        bowler: Some(resolve_players(&line.bowler, roster)),
        events: line.all_evt.clone(),
        commentary: line.comm.clone(),
        score: Some(last_ball_outcome(prev_overs)),
    }
}

/// Build enriched copies of the participant records; unknown ids keep their
/// stats but get no names.
fn resolve_players(stats: &[RawPlayerStat], roster: &[RawPlayer]) -> Vec<PlayerRef> {
    stats
        .iter()
        .map(|stat| {
            let player = stat.id.as_deref().and_then(|id| find_player(id, roster));
            // Names always come from the roster, never from the ball record.
            let mut stats = stat.stats.clone();
            for key in RESOLVED_KEYS {
                stats.remove(key);
            }
            PlayerRef {
                id: stat.id.clone(),
                name: player.and_then(|p| p.f_name.clone()),
                short_name: player.and_then(|p| p.name.clone()),
                stats,
            }
        })
        .collect()
}

fn find_player<'a>(id: &str, roster: &'a [RawPlayer]) -> Option<&'a RawPlayer> {
    roster.iter().find(|p| p.id.as_deref() == Some(id))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|s| !s.is_empty())
}
