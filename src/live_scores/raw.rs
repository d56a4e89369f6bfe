//! Upstream (Cricbuzz) match payload as it arrives on the wire.
//!
//! Every field is optional: a match in `preview` state has no score, an
//! innings break has no batsmen, and ids/overs/scores show up either as
//! strings or as numbers depending on the endpoint. Scalars are normalized to
//! `String` here so the normalizer only ever has to check for presence.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMatchPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub match_type: Option<String>,
    #[serde(default)]
    pub series: Option<RawSeries>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: Option<String>,
    /// Epoch milliseconds (number or numeric string) or an RFC 3339 string.
    #[serde(default)]
    pub start_time: Option<Value>,
    #[serde(default)]
    pub venue: Option<RawVenue>,
    #[serde(default)]
    pub team1: Option<RawTeam>,
    #[serde(default)]
    pub team2: Option<RawTeam>,
    /// Match roster used to resolve player ids.
    #[serde(default, deserialize_with = "null_as_default")]
    pub players: Vec<RawPlayer>,
    #[serde(default)]
    pub score: Option<RawScore>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSeries {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVenue {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTeam {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub s_name: Option<String>,
}

/// Roster entry: `f_name` is the full name, `name` the scorecard name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlayer {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub f_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawScore {
    /// Current run rate
    #[serde(default, deserialize_with = "lenient_string")]
    pub crr: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub target: Option<String>,
    /// Current partnership
    #[serde(default, deserialize_with = "lenient_string")]
    pub prtshp: Option<String>,
    /// Recent ball outcomes, e.g. `"1 2 . 4 | 6 W"`
    #[serde(default, deserialize_with = "lenient_string")]
    pub prev_overs: Option<String>,
    #[serde(default)]
    pub batting: Option<RawInningsTeam>,
    #[serde(default)]
    pub bowling: Option<RawInningsTeam>,
    /// Present only once balls are being bowled.
    #[serde(default)]
    pub batsman: Option<Vec<RawPlayerStat>>,
    #[serde(default)]
    pub bowler: Option<Vec<RawPlayerStat>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comm_lines: Vec<RawCommentary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInningsTeam {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub innings: Vec<RawInnings>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInnings {
    #[serde(default, deserialize_with = "lenient_string")]
    pub score: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub overs: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub wkts: Option<String>,
}

/// Per-ball participant record. Upstream stats (`r`, `b`, `4s`, ...) are kept
/// as-is in `stats`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlayerStat {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub stats: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCommentary {
    /// Over-ball tag, e.g. `"12.6"`
    #[serde(default, deserialize_with = "lenient_string")]
    pub o_no: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub comm: Option<String>,
    #[serde(default)]
    pub all_evt: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub batsman: Vec<RawPlayerStat>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bowler: Vec<RawPlayerStat>,
}

/// Accept strings, numbers and booleans; anything else reads as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_scalars_become_strings() {
        let raw: RawMatchPayload = serde_json::from_value(json!({
            "id": 20307,
            "score": {
                "crr": 5.5,
                "batting": { "id": 2, "innings": [{ "score": 145, "overs": 12.3, "wkts": 3 }] }
            }
        }))
        .unwrap();

        assert_eq!(raw.id.as_deref(), Some("20307"));
        let score = raw.score.unwrap();
        assert_eq!(score.crr.as_deref(), Some("5.5"));
        let innings = &score.batting.unwrap().innings[0];
        assert_eq!(innings.overs.as_deref(), Some("12.3"));
        assert_eq!(innings.wkts.as_deref(), Some("3"));
    }

    #[test]
    fn test_nulls_and_missing_fields_are_tolerated() {
        let raw: RawMatchPayload = serde_json::from_value(json!({
            "id": null,
            "players": null,
            "score": { "comm_lines": null }
        }))
        .unwrap();

        assert!(raw.id.is_none());
        assert!(raw.players.is_empty());
        let score = raw.score.unwrap();
        assert!(score.comm_lines.is_empty());
        assert!(score.batsman.is_none());
    }

    #[test]
    fn test_player_stats_are_preserved() {
        let stat: RawPlayerStat =
            serde_json::from_value(json!({ "id": "7", "r": "42", "b": "30" })).unwrap();
        assert_eq!(stat.id.as_deref(), Some("7"));
        assert_eq!(stat.stats.get("r"), Some(&json!("42")));
        assert!(!stat.stats.contains_key("id"));
    }
}
