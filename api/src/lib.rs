pub mod bracket;
pub mod client;
pub mod result;
pub mod wire;

use chrono::{DateTime, Utc};

/// Prefix of the ids given to synthetic players in an empty-roster bracket.
pub const PLACEHOLDER_ID_PREFIX: &str = "placeholder-";

// ---------------------------------------------------------------------------
// Domain types: validated model, independent of the backend wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tournament {
    pub id: String,
    pub title: String,
    /// Ordered by registration.
    pub players: Vec<Player>,
    pub max_players: u32,
    pub status: TournamentStatus,
    pub prizes: PrizeDistribution,
    /// Persisted bracket. `None` until the backend has generated one.
    pub matches: Option<Vec<Match>>,
}

impl Tournament {
    pub fn has_bracket(&self) -> bool {
        self.matches.as_ref().is_some_and(|m| !m.is_empty())
    }

    pub fn find_match_mut(&mut self, match_id: &str) -> Option<&mut Match> {
        self.matches
            .as_mut()?
            .iter_mut()
            .find(|m| m.id == match_id)
    }

    /// Replace a persisted match with a fresher copy from the backend.
    /// Returns false when the match is not part of this tournament.
    pub fn merge_match(&mut self, update: Match) -> bool {
        match self.find_match_mut(&update.id) {
            Some(existing) => {
                *existing = update;
                true
            }
            None => false,
        }
    }

    pub fn summary(&self) -> TournamentSummary {
        TournamentSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            status: self.status,
            player_count: self.players.len() as u32,
            max_players: self.max_players,
        }
    }
}

/// List-view projection of a tournament.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TournamentSummary {
    pub id: String,
    pub title: String,
    pub status: TournamentStatus,
    pub player_count: u32,
    pub max_players: u32,
}

impl TournamentSummary {
    pub fn is_full(&self) -> bool {
        self.max_players > 0 && self.player_count >= self.max_players
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum TournamentStatus {
    #[default]
    Upcoming,
    Open,
    InProgress,
    Complete,
}

impl TournamentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TournamentStatus::Upcoming => "Upcoming",
            TournamentStatus::Open => "Open",
            TournamentStatus::InProgress => "In progress",
            TournamentStatus::Complete => "Complete",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrizeDistribution {
    pub first: u64,
    pub second: u64,
    pub third: u64,
}

impl PrizeDistribution {
    pub fn total(&self) -> u64 {
        self.first
            .saturating_add(self.second)
            .saturating_add(self.third)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub registered_at: Option<DateTime<Utc>>,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Synthetic roster entry used to scaffold a bracket with no registrations.
    pub fn placeholder(n: usize) -> Self {
        Self::new(format!("{PLACEHOLDER_ID_PREFIX}{n}"), format!("Player {n}"))
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.starts_with(PLACEHOLDER_ID_PREFIX)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Match {
    pub id: String,
    /// 1-indexed.
    pub round: u32,
    /// 1-indexed within the round.
    pub match_number: u32,
    /// 0 to 2 entries; a slot is open while fewer than two are assigned.
    pub players: Vec<Player>,
    pub status: MatchStatus,
    /// Aligned with `players` order.
    pub score: Option<(u32, u32)>,
    pub winner_id: Option<String>,
    pub next_match_id: Option<String>,
}

impl Match {
    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    pub fn player(&self, slot: usize) -> Option<&Player> {
        self.players.get(slot)
    }

    pub fn winner(&self) -> Option<&Player> {
        let winner_id = self.winner_id.as_deref()?;
        self.players.iter().find(|p| p.id == winner_id)
    }

    pub fn has_open_slot(&self) -> bool {
        self.players.len() < 2
    }

    /// A single assigned player with no opponent. Never resolved automatically.
    pub fn is_bye(&self) -> bool {
        self.status == MatchStatus::Bye || (self.round == 1 && self.players.len() == 1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchStatus {
    #[default]
    Pending,
    Completed,
    Bye,
}

impl MatchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "PENDING",
            MatchStatus::Completed => "FINAL",
            MatchStatus::Bye => "BYE",
        }
    }
}
