use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    if key_event.kind == KeyEventKind::Release {
        return;
    }

    let mut guard = app.lock().await;

    if let (Char('c'), KeyModifiers::CONTROL) = (key_event.code, key_event.modifiers) {
        crate::cleanup_terminal();
        std::process::exit(0);
    }

    let editing_form =
        guard.state.active_tab == MenuItem::Match && guard.state.result_form.is_some();
    let request = if editing_form {
        handle_form_keys(key_event, &mut guard)
    } else {
        handle_view_keys(key_event, &mut guard)
    };

    if let Some(request) = request {
        drop(guard);
        let _ = network_requests.send(request).await;
    }
}

/// Keys while a result form is open: everything printable goes into the
/// focused field.
fn handle_form_keys(key_event: KeyEvent, app: &mut App) -> Option<NetworkRequest> {
    let form = app.state.result_form.as_mut()?;
    match key_event.code {
        KeyCode::Esc => app.cancel_result_form(),
        KeyCode::Enter => return app.submit_result_form(),
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Backspace => form.pop_char(),
        Char(c) => form.push_char(c),
        _ => {}
    }
    None
}

fn handle_view_keys(key_event: KeyEvent, app: &mut App) -> Option<NetworkRequest> {
    match (app.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => app.update_tab(MenuItem::Tournaments),
        (_, Char('2'), _) => app.update_tab(MenuItem::Bracket),
        (_, Char('3'), _) => app.update_tab(MenuItem::Match),
        (_, Char('?'), _) => app.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => app.exit_help(),

        // Tournament list
        (MenuItem::Tournaments, Char('j') | KeyCode::Down, _) => app.list_down(),
        (MenuItem::Tournaments, Char('k') | KeyCode::Up, _) => app.list_up(),
        (MenuItem::Tournaments, KeyCode::Enter, _) => return app.open_selected_tournament(),

        // Bracket navigation
        (MenuItem::Bracket, Char('l') | KeyCode::Right, _) => app.bracket_next_round(),
        (MenuItem::Bracket, Char('h') | KeyCode::Left, _) => app.bracket_prev_round(),
        (MenuItem::Bracket, Char('j') | KeyCode::Down, _) => app.bracket_match_down(),
        (MenuItem::Bracket, Char('k') | KeyCode::Up, _) => app.bracket_match_up(),
        (MenuItem::Bracket, KeyCode::Enter, _) => app.show_selected_match(),
        (MenuItem::Bracket, KeyCode::Esc, _) => app.update_tab(MenuItem::Tournaments),

        // Bracket and match actions
        (MenuItem::Bracket | MenuItem::Match, Char('t'), _) => app.mark_winner(0),
        (MenuItem::Bracket | MenuItem::Match, Char('b'), _) => app.mark_winner(1),
        (MenuItem::Bracket | MenuItem::Match, Char('s'), _) => app.open_result_form(),
        (MenuItem::Bracket, Char('g'), _) => return app.request_generate_bracket(),
        (MenuItem::Match, KeyCode::Esc, _) => app.update_tab(MenuItem::Bracket),

        // Global
        (_, Char('R'), _) => return app.reload(),
        (_, Char('f'), _) => app.toggle_full_screen(),
        (_, Char('"'), _) => app.toggle_show_logs(),

        _ => {}
    }
    None
}
