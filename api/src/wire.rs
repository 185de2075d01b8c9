//! Backend wire types: serde shapes for the tournament REST API.
//! Status fields are closed enums so an unexpected value fails decoding at the
//! boundary; structural checks happen when mapping to domain types in client.rs.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Ids: the backend emits both numeric and string ids
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

// ---------------------------------------------------------------------------
// Tournaments
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TournamentStatusWire {
    Upcoming,
    Open,
    #[serde(alias = "in_progress", alias = "ongoing")]
    InProgress,
    #[serde(alias = "completed")]
    Complete,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSummaryWire {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub title: String,
    pub status: TournamentStatusWire,
    #[serde(default)]
    pub player_count: Option<u32>,
    /// Some list endpoints embed the roster instead of a count.
    #[serde(default)]
    pub players: Option<Vec<PlayerWire>>,
    #[serde(default)]
    pub max_players: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TournamentWire {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub title: String,
    pub status: TournamentStatusWire,
    #[serde(default)]
    pub max_players: u32,
    #[serde(default)]
    pub players: Vec<PlayerWire>,
    #[serde(default)]
    pub prize_distribution: PrizeDistributionWire,
    #[serde(default)]
    pub matches: Option<Vec<MatchWire>>,
}

#[derive(Debug, Deserialize, Default, Clone, Copy)]
#[serde(default)]
pub struct PrizeDistributionWire {
    pub first: u64,
    pub second: u64,
    pub third: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlayerWire {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(alias = "username")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub registered_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatusWire {
    Pending,
    Completed,
    Bye,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchWire {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub round: u32,
    pub match_number: u32,
    #[serde(default)]
    pub players: Vec<PlayerWire>,
    pub status: MatchStatusWire,
    #[serde(default)]
    pub scores: Vec<ScoreWire>,
    #[serde(default, deserialize_with = "optional_id")]
    pub winner_id: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub next_match_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreWire {
    #[serde(deserialize_with = "id")]
    pub player_id: String,
    pub score: u32,
}

/// Body of the match result submission.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct MatchResultRequest {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub scores: Vec<ScoreWire>,
}

// ---------------------------------------------------------------------------
// Messages: success notes and error bodies share this shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct MessageWire {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl MessageWire {
    /// First non-blank of `message` and `error`, trimmed.
    pub fn text(self) -> Option<String> {
        let non_blank = |m: Option<String>| {
            m.map(|m| m.trim().to_string()).filter(|m| !m.is_empty())
        };
        non_blank(self.message).or_else(|| non_blank(self.error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_decode_to_strings() {
        let raw = r#"{"id": 42, "round": 1, "matchNumber": 2, "status": "pending",
                      "players": [{"id": "abc", "name": "Kofi"}], "nextMatchId": 7}"#;
        let m: MatchWire = serde_json::from_str(raw).unwrap();
        assert_eq!(m.id, "42");
        assert_eq!(m.players[0].id, "abc");
        assert_eq!(m.next_match_id.as_deref(), Some("7"));
        assert!(m.winner_id.is_none());
    }

    #[test]
    fn null_optional_ids_decode_as_none() {
        let raw = r#"{"id": "m1", "round": 1, "matchNumber": 1, "status": "bye",
                      "winnerId": null, "nextMatchId": null}"#;
        let m: MatchWire = serde_json::from_str(raw).unwrap();
        assert_eq!(m.status, MatchStatusWire::Bye);
        assert!(m.next_match_id.is_none());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let raw = r#"{"id": "t1", "title": "Cup", "status": "archived"}"#;
        assert!(serde_json::from_str::<TournamentWire>(raw).is_err());
    }

    #[test]
    fn status_aliases_are_accepted() {
        for (text, expected) in [
            ("\"in-progress\"", TournamentStatusWire::InProgress),
            ("\"in_progress\"", TournamentStatusWire::InProgress),
            ("\"completed\"", TournamentStatusWire::Complete),
            ("\"open\"", TournamentStatusWire::Open),
        ] {
            let status: TournamentStatusWire = serde_json::from_str(text).unwrap();
            assert_eq!(status, expected, "{text}");
        }
    }

    #[test]
    fn player_accepts_username_and_created_at() {
        let raw = r#"{"id": 3, "username": "ama", "createdAt": "2026-01-02T10:00:00Z"}"#;
        let p: PlayerWire = serde_json::from_str(raw).unwrap();
        assert_eq!(p.name, "ama");
        assert!(p.registered_at.is_some());
    }

    #[test]
    fn message_prefers_message_over_error() {
        let both: MessageWire =
            serde_json::from_str(r#"{"message": "Bracket exists", "error": "x"}"#).unwrap();
        assert_eq!(both.text().as_deref(), Some("Bracket exists"));
        let blank: MessageWire = serde_json::from_str(r#"{"message": "  "}"#).unwrap();
        assert_eq!(blank.text(), None);
    }

    #[test]
    fn blank_message_falls_through_to_error() {
        let raw = r#"{"message": " ", "error": "Bracket exists"}"#;
        let body: MessageWire = serde_json::from_str(raw).unwrap();
        assert_eq!(body.text().as_deref(), Some("Bracket exists"));
    }

    #[test]
    fn result_request_serializes_camel_case_scores() {
        let body = MatchResultRequest {
            date: "2026-10-17".into(),
            time: "18:30".into(),
            scores: vec![ScoreWire { player_id: "p1".into(), score: 3 }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["scores"][0]["playerId"], "p1");
        assert_eq!(json["time"], "18:30");
    }
}
