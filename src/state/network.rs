use crate::state::messages::{NetworkRequest, NetworkResponse};
use asc_api::client::{ApiError, AscApi};
use log::{debug, error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self {
            is_loading: false,
            spinner_char: ' ',
        }
    }
}

/// Serialises backend calls: one request in flight at a time, answered in
/// the order they were sent.
pub struct NetworkWorker {
    client: AscApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        client: AscApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let kind = request.kind();
            let result = self.handle(request).await;

            debug!("network request complete: {kind:?}");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| {
                error!("{} failed: {err}", kind.action());
                NetworkResponse::Error {
                    kind,
                    message: format!("{}: {}", kind.action(), err.user_message()),
                }
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle(&self, request: NetworkRequest) -> Result<NetworkResponse, ApiError> {
        match request {
            NetworkRequest::LoadTournaments => {
                debug!("loading tournament list");
                let tournaments = self.client.list_tournaments().await?;
                Ok(NetworkResponse::TournamentsLoaded { tournaments })
            }
            NetworkRequest::LoadTournament { id } => {
                debug!("loading tournament {id}");
                let tournament = self.client.fetch_tournament(&id).await?;
                Ok(NetworkResponse::TournamentLoaded { tournament })
            }
            NetworkRequest::GenerateBracket { id } => {
                info!("requesting bracket generation for {id}");
                let message = self.client.generate_bracket(&id).await?;
                Ok(NetworkResponse::BracketGenerated {
                    tournament_id: id,
                    message,
                })
            }
            NetworkRequest::SubmitResult {
                tournament_id,
                match_id,
                result,
            } => {
                info!("submitting result for {tournament_id}/{match_id}");
                let updated = self
                    .client
                    .submit_match_result(&tournament_id, &match_id, &result)
                    .await?;
                Ok(NetworkResponse::ResultSubmitted {
                    tournament_id,
                    updated,
                })
            }
        }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state = LoadingState {
            is_loading: true,
            spinner_char: SPINNER_CHARS[0],
        };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState {
                    is_loading: false,
                    spinner_char,
                },
            })
            .await;
    }
}
