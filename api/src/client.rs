use crate::result::{MatchResult, ValidationError};
use crate::wire::{
    MatchResultRequest, MatchStatusWire, MatchWire, MessageWire, PlayerWire, ScoreWire,
    TournamentStatusWire, TournamentSummaryWire, TournamentWire,
};
use crate::{
    Match, MatchStatus, Player, PrizeDistribution, Tournament, TournamentStatus, TournamentSummary,
};
use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Shown when the backend gives no usable message.
pub const FALLBACK_MESSAGE: &str = "Something went wrong, please try again";

/// Afrik Soccer Cup backend client.
#[derive(Debug, Clone)]
pub struct AscApi {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl Default for AscApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    Unauthorized(String),
    NotFound(String),
    /// Business-rule rejection, e.g. generating a bracket that already exists.
    Rejected(String),
    Server(StatusCode, String),
    InvalidPayload(String),
    /// The configured base URL cannot carry a path.
    InvalidUrl(String),
    Validation(ValidationError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Unauthorized(msg) => write!(f, "Not authorized: {msg}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Rejected(msg) => write!(f, "{msg}"),
            ApiError::Server(status, msg) => write!(f, "Server error ({status}): {msg}"),
            ApiError::InvalidPayload(msg) => write!(f, "Invalid response: {msg}"),
            ApiError::InvalidUrl(url) => write!(f, "Invalid backend URL: {url}"),
            ApiError::Validation(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Parsing(e, _) => Some(e),
            ApiError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl ApiError {
    /// The text an operator should see: the backend's own message when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Rejected(msg)
            | ApiError::Server(_, msg) => msg.clone(),
            ApiError::Validation(e) => e.to_string(),
            ApiError::InvalidUrl(_) => self.to_string(),
            ApiError::Network(..) | ApiError::Parsing(..) | ApiError::InvalidPayload(_) => {
                FALLBACK_MESSAGE.to_string()
            }
        }
    }
}

impl AscApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("asctui/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_tournaments(&self) -> ApiResult<Vec<TournamentSummary>> {
        let url = self.endpoint(&["tournaments"])?;
        let raw: Vec<TournamentSummaryWire> = self.send(Method::GET, &url, None).await?;
        Ok(raw.into_iter().map(map_summary).collect())
    }

    /// Fetch one tournament with its roster and, when generated, its bracket.
    pub async fn fetch_tournament(&self, tournament_id: &str) -> ApiResult<Tournament> {
        let url = self.endpoint(&["tournaments", tournament_id])?;
        let raw: TournamentWire = self.send(Method::GET, &url, None).await?;
        map_tournament(raw)
    }

    /// Ask the backend to build the authoritative bracket. Returns the
    /// backend's confirmation text.
    pub async fn generate_bracket(&self, tournament_id: &str) -> ApiResult<String> {
        let url = self.endpoint(&["tournaments", tournament_id, "generate-bracket"])?;
        let response = self.execute(self.request(Method::POST, &url), &url).await?;
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Parsing(e, url.clone()))?;
        let message = serde_json::from_str::<MessageWire>(&body)
            .ok()
            .and_then(MessageWire::text)
            .unwrap_or_else(|| "Bracket generated".to_string());
        Ok(message)
    }

    pub async fn submit_match_result(
        &self,
        tournament_id: &str,
        match_id: &str,
        result: &MatchResult,
    ) -> ApiResult<Match> {
        let url = self.endpoint(&["tournaments", tournament_id, "matches", match_id, "result"])?;
        let body = result_request(result);
        let raw: MatchWire = self.send(Method::PUT, &url, Some(&body)).await?;
        map_match(raw)
    }

    /// Base URL extended with `segments`, each percent-encoded so an id can
    /// never add path components, a query or a fragment.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<String> {
        let mut url =
            Url::parse(&self.base_url).map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.client.request(method, url).timeout(self.timeout);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&MatchResultRequest>,
    ) -> ApiResult<T> {
        let mut request = self.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request, url)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }

    async fn execute(&self, request: RequestBuilder, url: &str) -> ApiResult<Response> {
        debug!("request {url}");
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }
}

async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    let message = response
        .json::<MessageWire>()
        .await
        .ok()
        .and_then(MessageWire::text)
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
    classify_status(status, message)
}

fn classify_status(status: StatusCode, message: String) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        s if s.is_client_error() => ApiError::Rejected(message),
        s => ApiError::Server(s, message),
    }
}

fn result_request(result: &MatchResult) -> MatchResultRequest {
    MatchResultRequest {
        date: result.date_string(),
        time: result.time_string(),
        scores: result
            .scores
            .iter()
            .map(|s| ScoreWire {
                player_id: s.player_id.clone(),
                score: s.score,
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Mapping: wire types → validated domain types
// ---------------------------------------------------------------------------

fn map_tournament_status(status: TournamentStatusWire) -> TournamentStatus {
    match status {
        TournamentStatusWire::Upcoming => TournamentStatus::Upcoming,
        TournamentStatusWire::Open => TournamentStatus::Open,
        TournamentStatusWire::InProgress => TournamentStatus::InProgress,
        TournamentStatusWire::Complete => TournamentStatus::Complete,
    }
}

fn map_match_status(status: MatchStatusWire) -> MatchStatus {
    match status {
        MatchStatusWire::Pending => MatchStatus::Pending,
        MatchStatusWire::Completed => MatchStatus::Completed,
        MatchStatusWire::Bye => MatchStatus::Bye,
    }
}

fn map_summary(raw: TournamentSummaryWire) -> TournamentSummary {
    let player_count = raw
        .player_count
        .or_else(|| raw.players.as_ref().map(|p| p.len() as u32))
        .unwrap_or(0);
    TournamentSummary {
        id: raw.id,
        title: raw.title,
        status: map_tournament_status(raw.status),
        player_count,
        max_players: raw.max_players,
    }
}

fn map_player(raw: PlayerWire) -> Player {
    Player {
        id: raw.id,
        name: raw.name,
        email: raw.email.filter(|e| !e.is_empty()),
        avatar: raw.avatar.filter(|a| !a.is_empty()),
        registered_at: raw.registered_at,
    }
}

fn map_tournament(raw: TournamentWire) -> ApiResult<Tournament> {
    let matches = raw
        .matches
        .map(|list| {
            let matches = list.into_iter().map(map_match).collect::<ApiResult<Vec<_>>>()?;
            check_unique_ids(&matches)?;
            Ok::<_, ApiError>(matches)
        })
        .transpose()?;

    Ok(Tournament {
        id: raw.id,
        title: raw.title,
        players: raw.players.into_iter().map(map_player).collect(),
        max_players: raw.max_players,
        status: map_tournament_status(raw.status),
        prizes: PrizeDistribution {
            first: raw.prize_distribution.first,
            second: raw.prize_distribution.second,
            third: raw.prize_distribution.third,
        },
        matches,
    })
}

fn check_unique_ids(matches: &[Match]) -> ApiResult<()> {
    let mut seen = HashSet::with_capacity(matches.len());
    match matches.iter().find(|m| !seen.insert(m.id.as_str())) {
        Some(dup) => Err(ApiError::InvalidPayload(format!("duplicate match id {}", dup.id))),
        None => Ok(()),
    }
}

fn map_match(raw: MatchWire) -> ApiResult<Match> {
    if raw.round == 0 || raw.match_number == 0 {
        return Err(ApiError::InvalidPayload(format!(
            "match {} has round {} / number {}, both must start at 1",
            raw.id, raw.round, raw.match_number
        )));
    }
    if raw.players.len() > 2 {
        return Err(ApiError::InvalidPayload(format!(
            "match {} lists {} players",
            raw.id,
            raw.players.len()
        )));
    }

    let players: Vec<Player> = raw.players.into_iter().map(map_player).collect();

    if let Some(winner) = raw.winner_id.as_deref()
        && !players.iter().any(|p| p.id == winner)
    {
        return Err(ApiError::InvalidPayload(format!(
            "match {} names winner {winner} who is not one of its players",
            raw.id
        )));
    }

    let score = map_scores(&raw.scores, &players);

    Ok(Match {
        id: raw.id,
        round: raw.round,
        match_number: raw.match_number,
        players,
        status: map_match_status(raw.status),
        score,
        winner_id: raw.winner_id,
        next_match_id: raw.next_match_id,
    })
}

/// Align per-player scores with the match's player order. Only a complete
/// pair yields a score.
fn map_scores(scores: &[ScoreWire], players: &[Player]) -> Option<(u32, u32)> {
    let [top, bottom] = players else {
        return None;
    };
    let lookup = |player: &Player| {
        scores
            .iter()
            .find(|s| s.player_id == player.id)
            .map(|s| s.score)
    };
    Some((lookup(top)?, lookup(bottom)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_wire(json: &str) -> MatchWire {
        serde_json::from_str(json).expect("test match json")
    }

    #[test]
    fn endpoint_keeps_base_path_and_encodes_ids() {
        let api = AscApi::new("http://localhost:8000/api/");
        assert_eq!(
            api.endpoint(&["tournaments", "12"]).unwrap(),
            "http://localhost:8000/api/tournaments/12"
        );
        assert_eq!(
            api.endpoint(&["tournaments", "a/b?c#d", "generate-bracket"]).unwrap(),
            "http://localhost:8000/api/tournaments/a%2Fb%3Fc%23d/generate-bracket"
        );
    }

    #[test]
    fn unusable_base_url_is_reported() {
        let api = AscApi::new("not a url");
        assert!(matches!(api.endpoint(&["tournaments"]), Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn status_codes_map_to_error_kinds() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "x".into()),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "x".into()),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "x".into()),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::CONFLICT, "x".into()),
            ApiError::Rejected(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, "x".into()),
            ApiError::Server(StatusCode::BAD_GATEWAY, _)
        ));
    }

    #[test]
    fn user_message_is_backend_text_when_available() {
        let err = ApiError::Rejected("Bracket already generated".into());
        assert_eq!(err.user_message(), "Bracket already generated");
        let err = ApiError::InvalidPayload("bad".into());
        assert_eq!(err.user_message(), FALLBACK_MESSAGE);
    }

    #[test]
    fn match_scores_align_with_player_order() {
        let m = map_match(match_wire(
            r#"{"id": "m1", "round": 1, "matchNumber": 1, "status": "completed",
                "players": [{"id": "a", "name": "A"}, {"id": "b", "name": "B"}],
                "scores": [{"playerId": "b", "score": 1}, {"playerId": "a", "score": 4}],
                "winnerId": "a"}"#,
        ))
        .unwrap();
        assert_eq!(m.score, Some((4, 1)));
        assert_eq!(m.status, MatchStatus::Completed);
        assert_eq!(m.winner().map(|p| p.name.as_str()), Some("A"));
    }

    #[test]
    fn partial_scores_are_dropped() {
        let m = map_match(match_wire(
            r#"{"id": "m1", "round": 1, "matchNumber": 1, "status": "pending",
                "players": [{"id": "a", "name": "A"}, {"id": "b", "name": "B"}],
                "scores": [{"playerId": "a", "score": 2}]}"#,
        ))
        .unwrap();
        assert_eq!(m.score, None);
    }

    #[test]
    fn winner_outside_match_is_invalid() {
        let err = map_match(match_wire(
            r#"{"id": "m1", "round": 1, "matchNumber": 1, "status": "completed",
                "players": [{"id": "a", "name": "A"}], "winnerId": "z"}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidPayload(_)));
    }

    #[test]
    fn three_players_is_invalid() {
        let err = map_match(match_wire(
            r#"{"id": "m1", "round": 1, "matchNumber": 1, "status": "pending",
                "players": [{"id": "a", "name": "A"}, {"id": "b", "name": "B"},
                            {"id": "c", "name": "C"}]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidPayload(_)));
    }

    #[test]
    fn zero_round_is_invalid() {
        let err = map_match(match_wire(
            r#"{"id": "m1", "round": 0, "matchNumber": 1, "status": "pending"}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidPayload(_)));
    }

    #[test]
    fn tournament_maps_roster_prizes_and_bracket() {
        let raw: TournamentWire = serde_json::from_str(
            r#"{"id": 9, "title": "Afrik Cup", "status": "open", "maxPlayers": 8,
                "prizeDistribution": {"first": 50000, "second": 20000, "third": 10000},
                "players": [{"id": 1, "name": "Kofi", "email": ""}, {"id": 2, "name": "Ama"}],
                "matches": [{"id": 100, "round": 1, "matchNumber": 1, "status": "pending",
                             "players": [{"id": 1, "name": "Kofi"}, {"id": 2, "name": "Ama"}]}]}"#,
        )
        .unwrap();
        let t = map_tournament(raw).unwrap();
        assert_eq!(t.id, "9");
        assert_eq!(t.status, TournamentStatus::Open);
        assert_eq!(t.prizes.total(), 80000);
        assert_eq!(t.players[0].email, None);
        assert!(t.has_bracket());
        assert_eq!(t.summary().player_count, 2);
    }

    #[test]
    fn tournament_without_matches_has_no_bracket() {
        let raw: TournamentWire = serde_json::from_str(
            r#"{"id": "t", "title": "T", "status": "upcoming", "matches": []}"#,
        )
        .unwrap();
        let t = map_tournament(raw).unwrap();
        assert!(!t.has_bracket());
    }

    #[test]
    fn duplicate_match_ids_are_invalid() {
        let raw: TournamentWire = serde_json::from_str(
            r#"{"id": "t", "title": "T", "status": "in-progress", "matches": [
                {"id": 1, "round": 1, "matchNumber": 1, "status": "pending"},
                {"id": 1, "round": 1, "matchNumber": 2, "status": "pending"}]}"#,
        )
        .unwrap();
        assert!(matches!(map_tournament(raw), Err(ApiError::InvalidPayload(_))));
    }

    #[test]
    fn summary_counts_embedded_roster() {
        let raw: TournamentSummaryWire = serde_json::from_str(
            r#"{"id": 1, "title": "T", "status": "open", "maxPlayers": 2,
                "players": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]}"#,
        )
        .unwrap();
        let s = map_summary(raw);
        assert_eq!(s.player_count, 2);
        assert!(s.is_full());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = AscApi::new("http://example.test/api/");
        assert_eq!(api.base_url(), "http://example.test/api");
    }
}
