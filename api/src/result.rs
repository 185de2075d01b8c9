use crate::Player;
use chrono::{NaiveDate, NaiveTime};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

/// A match result ready to be sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// One entry per player, in match order.
    pub scores: Vec<PlayerScore>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerScore {
    pub player_id: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingDate,
    InvalidDate(String),
    MissingTime,
    InvalidTime(String),
    NonNumericScore { player: String },
    NoPlayers,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingDate => write!(f, "a match date is required"),
            ValidationError::InvalidDate(raw) => {
                write!(f, "invalid date {raw:?}, expected YYYY-MM-DD")
            }
            ValidationError::MissingTime => write!(f, "a match time is required"),
            ValidationError::InvalidTime(raw) => write!(f, "invalid time {raw:?}, expected HH:MM"),
            ValidationError::NonNumericScore { player } => {
                write!(f, "score for {player} must be a whole number")
            }
            ValidationError::NoPlayers => write!(f, "the match has no players to score"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl MatchResult {
    /// Validate raw form input. `scores[i]` is the text typed for `players[i]`;
    /// a missing entry counts as blank.
    pub fn parse(
        date: &str,
        time: &str,
        players: &[Player],
        scores: &[String],
    ) -> Result<Self, ValidationError> {
        let date = date.trim();
        if date.is_empty() {
            return Err(ValidationError::MissingDate);
        }
        let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map_err(|_| ValidationError::InvalidDate(date.to_string()))?;

        let time = time.trim();
        if time.is_empty() {
            return Err(ValidationError::MissingTime);
        }
        let time = TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(time, fmt).ok())
            .ok_or_else(|| ValidationError::InvalidTime(time.to_string()))?;

        if players.is_empty() {
            return Err(ValidationError::NoPlayers);
        }

        let scores = players
            .iter()
            .enumerate()
            .map(|(i, player)| {
                scores
                    .get(i)
                    .and_then(|raw| raw.trim().parse::<u32>().ok())
                    .map(|score| PlayerScore {
                        player_id: player.id.clone(),
                        score,
                    })
                    .ok_or_else(|| ValidationError::NonNumericScore {
                        player: player.name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { date, time, scores })
    }

    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn time_string(&self) -> String {
        self.time.format(TIME_FORMATS[0]).to_string()
    }

    /// Id of the higher scorer, `None` on a draw.
    pub fn leader(&self) -> Option<&str> {
        let [a, b] = self.scores.as_slice() else {
            return None;
        };
        match a.score.cmp(&b.score) {
            std::cmp::Ordering::Greater => Some(a.player_id.as_str()),
            std::cmp::Ordering::Less => Some(b.player_id.as_str()),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players() -> Vec<Player> {
        vec![Player::new("p1", "Kwame"), Player::new("p2", "Awa")]
    }

    fn scores(a: &str, b: &str) -> Vec<String> {
        vec![a.to_string(), b.to_string()]
    }

    #[test]
    fn parses_complete_form() {
        let result =
            MatchResult::parse("2026-10-17", "18:30", &players(), &scores("3", " 1 ")).unwrap();
        assert_eq!(result.date_string(), "2026-10-17");
        assert_eq!(result.time_string(), "18:30");
        assert_eq!(result.scores[1], PlayerScore { player_id: "p2".into(), score: 1 });
        assert_eq!(result.leader(), Some("p1"));
    }

    #[test]
    fn seconds_are_accepted_in_time() {
        let result =
            MatchResult::parse("2026-10-17", "09:05:00", &players(), &scores("0", "0")).unwrap();
        assert_eq!(result.time_string(), "09:05");
        assert_eq!(result.leader(), None);
    }

    #[test]
    fn missing_date_is_reported_first() {
        assert_eq!(
            MatchResult::parse("  ", "", &players(), &scores("x", "y")),
            Err(ValidationError::MissingDate)
        );
    }

    #[test]
    fn malformed_date_and_time_are_rejected() {
        assert_eq!(
            MatchResult::parse("17/10/2026", "18:30", &players(), &scores("1", "2")),
            Err(ValidationError::InvalidDate("17/10/2026".into()))
        );
        assert_eq!(
            MatchResult::parse("2026-10-17", "", &players(), &scores("1", "2")),
            Err(ValidationError::MissingTime)
        );
        assert_eq!(
            MatchResult::parse("2026-10-17", "25:00", &players(), &scores("1", "2")),
            Err(ValidationError::InvalidTime("25:00".into()))
        );
    }

    #[test]
    fn non_numeric_score_names_the_player() {
        assert_eq!(
            MatchResult::parse("2026-10-17", "18:30", &players(), &scores("2", "two")),
            Err(ValidationError::NonNumericScore { player: "Awa".into() })
        );
        assert_eq!(
            MatchResult::parse("2026-10-17", "18:30", &players(), &scores("-1", "2")),
            Err(ValidationError::NonNumericScore { player: "Kwame".into() })
        );
    }

    #[test]
    fn blank_or_missing_scores_are_non_numeric() {
        assert!(matches!(
            MatchResult::parse("2026-10-17", "18:30", &players(), &["4".to_string()]),
            Err(ValidationError::NonNumericScore { .. })
        ));
    }

    #[test]
    fn match_without_players_cannot_be_scored() {
        assert_eq!(
            MatchResult::parse("2026-10-17", "18:30", &[], &[]),
            Err(ValidationError::NoPlayers)
        );
    }
}
