use crate::state::network::LoadingState;
use asc_api::result::MatchResult;
use asc_api::{Match, Tournament, TournamentSummary};
use crossterm::event::KeyEvent;

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadTournaments,
    LoadTournament {
        id: String,
    },
    GenerateBracket {
        id: String,
    },
    SubmitResult {
        tournament_id: String,
        match_id: String,
        result: MatchResult,
    },
}

impl NetworkRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            NetworkRequest::LoadTournaments => RequestKind::LoadTournaments,
            NetworkRequest::LoadTournament { .. } => RequestKind::LoadTournament,
            NetworkRequest::GenerateBracket { .. } => RequestKind::GenerateBracket,
            NetworkRequest::SubmitResult { .. } => RequestKind::SubmitResult,
        }
    }
}

/// Which request a failure belongs to, so the app can unwind the right
/// pending state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    LoadTournaments,
    LoadTournament,
    GenerateBracket,
    SubmitResult,
}

impl RequestKind {
    pub fn action(&self) -> &'static str {
        match self {
            RequestKind::LoadTournaments => "Loading tournaments",
            RequestKind::LoadTournament => "Loading tournament",
            RequestKind::GenerateBracket => "Generating bracket",
            RequestKind::SubmitResult => "Submitting result",
        }
    }
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged {
        loading_state: LoadingState,
    },
    TournamentsLoaded {
        tournaments: Vec<TournamentSummary>,
    },
    TournamentLoaded {
        tournament: Tournament,
    },
    BracketGenerated {
        tournament_id: String,
        message: String,
    },
    /// The backend's copy of the match after it accepted the result.
    ResultSubmitted {
        tournament_id: String,
        updated: Match,
    },
    Error {
        kind: RequestKind,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    Tick,
}
