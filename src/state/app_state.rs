use crate::app::MenuItem;
use crate::state::bracket::BracketState;
use crate::state::notifications::Notifications;
use crate::state::result_form::ResultFormState;
use asc_api::TournamentSummary;

// ---------------------------------------------------------------------------
// Tournament list state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TournamentListState {
    pub tournaments: Vec<TournamentSummary>,
    pub selected: usize,
    /// False until the first list response arrives.
    pub loaded: bool,
}

impl TournamentListState {
    /// Replace the list. The highlighted tournament stays highlighted when it
    /// is still present.
    pub fn set(&mut self, tournaments: Vec<TournamentSummary>) {
        let keep = self.selected_id().map(str::to_string);
        self.tournaments = tournaments;
        self.loaded = true;
        self.selected = keep
            .and_then(|id| self.tournaments.iter().position(|t| t.id == id))
            .unwrap_or(0)
            .min(self.tournaments.len().saturating_sub(1));
    }

    pub fn selected(&self) -> Option<&TournamentSummary> {
        self.tournaments.get(self.selected)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected().map(|t| t.id.as_str())
    }

    /// Replace the entry with the same id by a fresher summary, e.g. one built
    /// from a full tournament fetch. Unknown ids are ignored.
    pub fn refresh_entry(&mut self, summary: TournamentSummary) {
        if let Some(entry) = self.tournaments.iter_mut().find(|t| t.id == summary.id) {
            *entry = summary;
        }
    }

    pub fn select_id(&mut self, id: &str) {
        if let Some(idx) = self.tournaments.iter().position(|t| t.id == id) {
            self.selected = idx;
        }
    }

    pub fn next(&mut self) {
        if self.selected + 1 < self.tournaments.len() {
            self.selected += 1;
        }
    }

    pub fn previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub tournaments: TournamentListState,
    pub bracket: BracketState,
    /// Open while the operator is entering a match result.
    pub result_form: Option<ResultFormState>,
    pub notifications: Notifications,
    /// Most recent failure, shown in the status line until the next success.
    pub last_error: Option<String>,
    /// Tournament whose load is in flight, to ignore stale responses.
    pub pending_tournament: Option<String>,
}
