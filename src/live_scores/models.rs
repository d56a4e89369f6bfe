use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque key for one match on the upstream source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    pub fn new(id: impl Into<String>) -> Self {
        MatchId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Safe to use as a single URL path segment: non-empty and limited to
    /// ASCII alphanumerics, `-` and `_`.
    pub fn is_path_safe(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        MatchId(s.to_string())
    }
}

impl From<String> for MatchId {
    fn from(s: String) -> Self {
        MatchId(s)
    }
}

/// Canonical, consumer-facing view of one match.
///
/// `teams` and `score` are only populated once the match has left the
/// `preview` state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    pub id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    pub venue: Venue,
    pub last_updated: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<BTreeMap<String, TeamInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Venue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInfo {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
}

/// One batting innings: the team plus its running total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InningsDetail {
    #[serde(flatten)]
    pub team: TeamInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wickets: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDetail {
    /// 1 or 2; 2 once a bowling-side innings is reported.
    pub current_innings: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batting: Option<InningsDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bowling: Option<InningsDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSnapshot {
    /// Current run rate, or `"N/A"`.
    pub run_rate: String,
    /// Always serialized; `null` when there is no chase.
    pub target: Option<String>,
    pub detail: ScoreDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partnership: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batsmen: Option<Vec<PlayerRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bowlers: Option<Vec<PlayerRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_ball_detail: Option<LastBallDetail>,
    pub timestamp: DateTime<Utc>,
}

/// Per-ball participant with its roster names resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(flatten)]
    pub stats: Map<String, Value>,
}

/// The ball just completed. Serializes as `{}` when no commentary line
/// matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LastBallDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batsman: Option<Vec<PlayerRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bowler: Option<Vec<PlayerRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<BallOutcome>,
}

impl LastBallDetail {
    pub fn is_empty(&self) -> bool {
        *self == LastBallDetail::default()
    }
}

/// Outcome of the last ball, taken from the previous-overs string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BallOutcome {
    /// `"."` upstream; serialized as the number `0`.
    Dot,
    /// Any other token (`"4"`, `"W"`, `"1lb"`, ...), passed through.
    Token(String),
    /// Nothing recorded yet; serialized as `"-"`.
    Unavailable,
}

impl Serialize for BallOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BallOutcome::Dot => serializer.serialize_u8(0),
            BallOutcome::Token(t) => serializer.serialize_str(t),
            BallOutcome::Unavailable => serializer.serialize_str("-"),
        }
    }
}
