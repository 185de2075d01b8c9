use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::bracket::BracketSource;
use crate::state::messages::{NetworkRequest, NetworkResponse, RequestKind};
use crate::state::result_form::ResultFormState;
use asc_api::Tournament;
use log::{debug, info, warn};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Tournaments,
    Bracket,
    Match,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        if let Some(level) = settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        Self {
            settings,
            state: AppState::default(),
        }
    }

    /// Requests to issue once the UI is up.
    pub fn startup_requests(&mut self) -> Vec<NetworkRequest> {
        let mut requests = vec![NetworkRequest::LoadTournaments];
        if let Some(id) = self.settings.initial_tournament.clone() {
            requests.extend(self.open_tournament(&id));
        }
        requests
    }

    // -----------------------------------------------------------------------
    // Network responses: the only way async results reach the view state
    // -----------------------------------------------------------------------

    /// Apply a backend response. Returns a follow-up request when the
    /// response invalidates what is on screen.
    pub fn on_network_response(&mut self, response: NetworkResponse) -> Option<NetworkRequest> {
        match response {
            NetworkResponse::LoadingStateChanged { .. } => None,
            NetworkResponse::TournamentsLoaded { tournaments } => {
                debug!("{} tournaments listed", tournaments.len());
                self.state.last_error = None;
                self.state.tournaments.set(tournaments);
                None
            }
            NetworkResponse::TournamentLoaded { tournament } => {
                self.on_tournament_loaded(tournament);
                None
            }
            NetworkResponse::BracketGenerated {
                tournament_id,
                message,
            } => {
                info!("bracket generated for {tournament_id}");
                self.state.last_error = None;
                self.state.notifications.info(message);
                self.refetch_if_open(&tournament_id)
            }
            NetworkResponse::ResultSubmitted {
                tournament_id,
                updated,
            } => {
                info!("result saved for match {}", updated.id);
                self.state.last_error = None;
                self.state.result_form = None;
                if self.state.bracket.tournament_id() == Some(tournament_id.as_str()) {
                    self.state.bracket.merge_match(updated);
                }
                self.state.notifications.info("Result saved");
                self.refetch_if_open(&tournament_id)
            }
            NetworkResponse::Error { kind, message } => {
                self.on_error(kind, message);
                None
            }
        }
    }

    fn on_tournament_loaded(&mut self, tournament: Tournament) {
        if let Some(pending) = &self.state.pending_tournament
            && *pending != tournament.id
        {
            debug!("dropping stale load of {}", tournament.id);
            return;
        }
        self.state.pending_tournament = None;
        self.state.last_error = None;
        self.state.tournaments.refresh_entry(tournament.summary());
        self.state.tournaments.select_id(&tournament.id);
        if self
            .state
            .result_form
            .as_ref()
            .is_some_and(|f| f.tournament_id != tournament.id)
        {
            self.state.result_form = None;
        }
        self.state.bracket.load(tournament);
    }

    fn on_error(&mut self, kind: RequestKind, message: String) {
        match kind {
            RequestKind::LoadTournament => self.state.pending_tournament = None,
            RequestKind::SubmitResult => {
                if let Some(form) = &mut self.state.result_form {
                    form.submitting = false;
                    form.error = Some(message.clone());
                }
            }
            RequestKind::LoadTournaments | RequestKind::GenerateBracket => {}
        }
        self.state.notifications.error(message.clone());
        self.state.last_error = Some(message);
    }

    fn refetch_if_open(&mut self, tournament_id: &str) -> Option<NetworkRequest> {
        if self.state.bracket.tournament_id() != Some(tournament_id) {
            return None;
        }
        self.state.pending_tournament = Some(tournament_id.to_string());
        Some(NetworkRequest::LoadTournament {
            id: tournament_id.to_string(),
        })
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Tournament list
    // -----------------------------------------------------------------------

    pub fn list_down(&mut self) {
        self.state.tournaments.next();
    }

    pub fn list_up(&mut self) {
        self.state.tournaments.previous();
    }

    pub fn open_selected_tournament(&mut self) -> Option<NetworkRequest> {
        let id = self.state.tournaments.selected_id()?.to_string();
        self.open_tournament(&id)
    }

    pub fn open_tournament(&mut self, id: &str) -> Option<NetworkRequest> {
        let id = id.trim();
        if id.is_empty() {
            return None;
        }
        if self.state.bracket.tournament_id() != Some(id) {
            self.state.result_form = None;
        }
        self.state.pending_tournament = Some(id.to_string());
        self.update_tab(MenuItem::Bracket);
        Some(NetworkRequest::LoadTournament { id: id.to_string() })
    }

    /// Re-fetch whatever the active tab shows.
    pub fn reload(&mut self) -> Option<NetworkRequest> {
        match self.state.active_tab {
            MenuItem::Tournaments | MenuItem::Help => Some(NetworkRequest::LoadTournaments),
            MenuItem::Bracket | MenuItem::Match => {
                let id = self.state.bracket.tournament_id()?.to_string();
                self.state.pending_tournament = Some(id.clone());
                Some(NetworkRequest::LoadTournament { id })
            }
        }
    }

    // -----------------------------------------------------------------------
    // Bracket: navigation delegated to BracketState
    // -----------------------------------------------------------------------

    pub fn bracket_next_round(&mut self) {
        self.state.bracket.navigate_round_next();
    }

    pub fn bracket_prev_round(&mut self) {
        self.state.bracket.navigate_round_prev();
    }

    pub fn bracket_match_down(&mut self) {
        self.state.bracket.navigate_match_down();
    }

    pub fn bracket_match_up(&mut self) {
        self.state.bracket.navigate_match_up();
    }

    /// Locally advance the player in `slot` of the selected match.
    pub fn mark_winner(&mut self, slot: usize) {
        match self.state.bracket.mark_winner(slot) {
            Ok(name) => {
                info!("projected {name} as winner");
                self.state
                    .notifications
                    .info(format!("{name} advances (not saved)"));
            }
            Err(e) => {
                warn!("winner not applied: {e}");
                self.state.notifications.error(format!("Cannot mark winner: {e}"));
            }
        }
    }

    pub fn request_generate_bracket(&mut self) -> Option<NetworkRequest> {
        let Some(id) = self.state.bracket.tournament_id().map(str::to_string) else {
            self.state.notifications.error("Open a tournament first");
            return None;
        };
        Some(NetworkRequest::GenerateBracket { id })
    }

    pub fn show_selected_match(&mut self) {
        if self.state.bracket.selected().is_some() {
            self.update_tab(MenuItem::Match);
        }
    }

    // -----------------------------------------------------------------------
    // Result form
    // -----------------------------------------------------------------------

    pub fn open_result_form(&mut self) {
        let bracket = &self.state.bracket;
        let (Some(tournament_id), Some(selected)) = (bracket.tournament_id(), bracket.selected())
        else {
            self.state.notifications.error("No match selected");
            return;
        };
        if bracket.source != BracketSource::Persisted {
            self.state
                .notifications
                .error("Generate the bracket before entering results");
            return;
        }
        let label = format!(
            "{} · Match {}",
            bracket.round_label(selected.round),
            selected.match_number
        );
        match ResultFormState::open(tournament_id, selected, label) {
            Some(form) => {
                self.state.result_form = Some(form);
                self.update_tab(MenuItem::Match);
            }
            None => self.state.notifications.error("Match has no players yet"),
        }
    }

    pub fn cancel_result_form(&mut self) {
        self.state.result_form = None;
    }

    pub fn submit_result_form(&mut self) -> Option<NetworkRequest> {
        let form = self.state.result_form.as_mut()?;
        if form.submitting {
            return None;
        }
        match form.validate() {
            Ok(result) => {
                form.submitting = true;
                form.error = None;
                Some(NetworkRequest::SubmitResult {
                    tournament_id: form.tournament_id.clone(),
                    match_id: form.match_id.clone(),
                    result,
                })
            }
            Err(e) => {
                let message = e.to_string();
                form.error = Some(message.clone());
                self.state.notifications.error(message);
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Tick: called every 250ms from the Tick event
    // -----------------------------------------------------------------------

    /// Returns true when the screen needs redrawing.
    pub fn on_tick(&mut self) -> bool {
        self.state.notifications.tick()
    }
}
