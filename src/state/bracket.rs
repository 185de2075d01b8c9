use asc_api::bracket::{self, BracketError};
use asc_api::{Match, Tournament};
use log::debug;
use std::fmt;

/// Where the matches on screen came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BracketSource {
    /// Persisted by the backend.
    Persisted,
    /// Generated on this machine because the backend has no bracket yet.
    #[default]
    Local,
}

impl BracketSource {
    pub fn label(&self) -> &'static str {
        match self {
            BracketSource::Persisted => "persisted",
            BracketSource::Local => "local preview",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkWinnerError {
    NoMatchSelected,
    EmptySlot,
    /// Scaffold entries of an empty roster are not real players.
    Placeholder,
    Bracket(BracketError),
}

impl fmt::Display for MarkWinnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkWinnerError::NoMatchSelected => write!(f, "no match selected"),
            MarkWinnerError::EmptySlot => write!(f, "no player in that slot"),
            MarkWinnerError::Placeholder => write!(f, "no players registered yet"),
            MarkWinnerError::Bracket(e) => write!(f, "{e}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct BracketState {
    pub tournament: Option<Tournament>,
    /// Matches on screen: the persisted bracket or the local fallback, plus
    /// any winner projections the operator applied since the last fetch.
    pub matches: Vec<Match>,
    pub source: BracketSource,
    pub view_round: u32,
    /// Index within the viewed round, ordered by match number.
    pub selected_match: usize,
    /// Winner projections applied since the last fetch.
    pub projections: usize,
}

impl BracketState {
    /// Show a freshly fetched tournament. Local projections are discarded.
    /// The cursor survives a reload of the same tournament.
    pub fn load(&mut self, tournament: Tournament) {
        let same_tournament = self.tournament_id() == Some(tournament.id.as_str());

        if tournament.has_bracket() {
            self.matches = tournament.matches.clone().unwrap_or_default();
            self.source = BracketSource::Persisted;
        } else {
            self.matches = bracket::generate(&tournament.players);
            self.source = BracketSource::Local;
        }
        debug!(
            "bracket for {} loaded: {} matches ({})",
            tournament.id,
            self.matches.len(),
            self.source.label()
        );

        self.tournament = Some(tournament);
        self.projections = 0;
        if same_tournament {
            self.view_round = self.view_round.clamp(1, self.rounds().max(1));
            self.clamp_selection();
        } else {
            self.view_round = 1;
            self.selected_match = 0;
        }
    }

    pub fn tournament_id(&self) -> Option<&str> {
        self.tournament.as_ref().map(|t| t.id.as_str())
    }

    pub fn rounds(&self) -> u32 {
        bracket::total_rounds(&self.matches)
    }

    pub fn round_label(&self, round: u32) -> String {
        bracket::round_label(round, self.rounds())
    }

    pub fn matches_in_round(&self, round: u32) -> Vec<&Match> {
        bracket::round_matches(&self.matches, round)
    }

    pub fn selected(&self) -> Option<&Match> {
        self.matches_in_round(self.view_round)
            .get(self.selected_match)
            .copied()
    }

    /// Position of the selected match in `matches`.
    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected()?.id.clone();
        self.matches.iter().position(|m| m.id == id)
    }

    pub fn navigate_round_next(&mut self) {
        if self.view_round < self.rounds() {
            self.view_round += 1;
            self.selected_match /= 2;
            self.clamp_selection();
        }
    }

    pub fn navigate_round_prev(&mut self) {
        if self.view_round > 1 {
            self.view_round -= 1;
            self.selected_match *= 2;
            self.clamp_selection();
        }
    }

    pub fn navigate_match_down(&mut self) {
        let max = self.matches_in_round(self.view_round).len().saturating_sub(1);
        if self.selected_match < max {
            self.selected_match += 1;
        }
    }

    pub fn navigate_match_up(&mut self) {
        self.selected_match = self.selected_match.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let max = self.matches_in_round(self.view_round).len().saturating_sub(1);
        self.selected_match = self.selected_match.min(max);
    }

    /// Project the player in `slot` (0 or 1) of the selected match as its
    /// winner. Returns the winner's name.
    pub fn mark_winner(&mut self, slot: usize) -> Result<String, MarkWinnerError> {
        let selected = self.selected().ok_or(MarkWinnerError::NoMatchSelected)?;
        let match_id = selected.id.clone();
        let winner = selected.player(slot).ok_or(MarkWinnerError::EmptySlot)?;
        if winner.is_placeholder() {
            return Err(MarkWinnerError::Placeholder);
        }
        let (winner_id, winner_name) = (winner.id.clone(), winner.name.clone());

        bracket::propagate_winner(&mut self.matches, &match_id, &winner_id)
            .map_err(MarkWinnerError::Bracket)?;
        self.projections += 1;
        Ok(winner_name)
    }

    /// Apply a match the backend just returned, ahead of the full re-fetch.
    pub fn merge_match(&mut self, update: Match) {
        if let Some(t) = &mut self.tournament {
            t.merge_match(update.clone());
        }
        if let Some(existing) = self.matches.iter_mut().find(|m| m.id == update.id) {
            *existing = update;
        }
    }
}
