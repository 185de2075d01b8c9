mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::PeriodicRefresher;
use asc_api::client::AscApi;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{error, info};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tokio::time::Duration;
use tui::{Terminal, backend::CrosstermBackend};

/// UI tick period; toast lifetimes are counted in these.
const TICK: Duration = Duration::from_millis(250);

#[derive(Debug, PartialEq)]
enum CliAction {
    Run { tournament: Option<String> },
    Help,
    Version,
    Invalid(String),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let tournament = match parse_cli_args(std::env::args().skip(1)) {
        CliAction::Run { tournament } => tournament,
        CliAction::Help => {
            println!("{}", usage_text());
            return Ok(());
        }
        CliAction::Version => {
            println!("asctui {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        CliAction::Invalid(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Trace)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    let mut settings = AppSettings::load();
    settings.initial_tournament = tournament.or(settings.initial_tournament);
    let client = AscApi::new(settings.api_url.clone())
        .with_token(settings.api_token.clone())
        .with_timeout(settings.timeout);
    info!("asctui {} using {}", env!("CARGO_PKG_VERSION"), client.base_url());
    let refresh_interval = settings.refresh_interval;

    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Periodic tournament list refresh, unless disabled
    let periodic_task = refresh_interval.map(|period| {
        tokio::spawn(PeriodicRefresher::new(network_req_tx.clone(), period).run())
    });

    // Tick thread: expires toasts
    let tick_tx = ui_event_tx.clone();
    let tick_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK);
        loop {
            interval.tick().await;
            if tick_tx.send(UiEvent::Tick).await.is_err() {
                break;
            }
        }
    });

    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();
    if let Some(task) = periodic_task {
        task.abort();
    }
    tick_task.abort();

    Ok(())
}

fn parse_cli_args(args: impl IntoIterator<Item = String>) -> CliAction {
    let mut args = args.into_iter();
    let mut tournament = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return CliAction::Help,
            "-V" | "--version" => return CliAction::Version,
            "-t" | "--tournament" => match args.next().filter(|id| !id.trim().is_empty()) {
                Some(id) => tournament = Some(id),
                None => return CliAction::Invalid(format!("{arg} needs a tournament id")),
            },
            _ => match arg.strip_prefix("--tournament=") {
                Some(id) if !id.trim().is_empty() => tournament = Some(id.to_string()),
                _ => return CliAction::Invalid(format!("Unknown argument: {arg}")),
            },
        }
    }

    CliAction::Run { tournament }
}

fn usage_text() -> &'static str {
    "asctui - Afrik Soccer Cup tournament console

Usage:
  asctui [--tournament <id>]
  asctui --help
  asctui --version

Environment:
  ASC_API_URL        Backend base URL (default http://localhost:8000/api)
  ASC_API_TOKEN      Bearer token sent with every request
  ASC_TIMEOUT_SECS   Per-request timeout in seconds (default 10)
  ASC_REFRESH_SECS   Tournament list refresh period, 0 disables (default 60)
  ASC_LOG_LEVEL      error, warn, info, debug or trace (default info)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let app_guard = app.lock().await;
                    draw::draw(&mut terminal, &app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    let app_guard = app.lock().await;
                    draw::draw(&mut terminal, &app_guard, loading);
                }
            }

            else => break,
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let requests = app.lock().await.startup_requests();
            for request in requests {
                let _ = network_requests.send(request).await;
            }
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
        UiEvent::Tick => app.lock().await.on_tick(),
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    if let NetworkResponse::LoadingStateChanged { loading_state } = response {
        *loading = loading_state;
        return true;
    }

    let follow_up = app.lock().await.on_network_response(response);
    if let Some(request) = follow_up
        && let Err(e) = network_requests.send(request).await
    {
        error!("Failed to queue follow-up request: {e}");
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        let event = match tokio::task::spawn_blocking(crossterm_event::read).await {
            Ok(Ok(event)) => event,
            Ok(Err(e)) => {
                error!("terminal input error: {e}");
                continue;
            }
            Err(_) => break,
        };
        let ui_event = match event {
            Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
            Event::Resize(_, _) => Some(UiEvent::Resize),
            _ => None,
        };

        if let Some(ui_event) = ui_event
            && ui_events.send(ui_event).await.is_err()
        {
            break;
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Best effort: also runs from the panic hook, so failures are ignored.
pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliAction {
        parse_cli_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn no_arguments_runs() {
        assert_eq!(parse(&[]), CliAction::Run { tournament: None });
    }

    #[test]
    fn tournament_flag_in_both_forms() {
        let expected = CliAction::Run {
            tournament: Some("abc".into()),
        };
        assert_eq!(parse(&["--tournament", "abc"]), expected);
        assert_eq!(parse(&["--tournament=abc"]), expected);
        assert_eq!(parse(&["-t", "abc"]), expected);
    }

    #[test]
    fn help_and_version() {
        assert_eq!(parse(&["--help"]), CliAction::Help);
        assert_eq!(parse(&["-V"]), CliAction::Version);
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(matches!(parse(&["--tournament"]), CliAction::Invalid(_)));
        assert!(matches!(parse(&["--colour"]), CliAction::Invalid(_)));
    }
}
