use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::{TuiLoggerLevelOutput, TuiLoggerWidget};

use crate::app::{App, MenuItem};
use crate::components::bracket::{BracketGrid, BracketView, format_player_line};
use crate::state::bracket::BracketSource;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::state::notifications::NotificationLevel;
use crate::state::result_form::ResultFormState;
use crate::ui::layout::LayoutAreas;
use asc_api::{Match, MatchStatus, PrizeDistribution};
use log::error;

static TABS: &[&str; 3] = &["Tournaments", "Bracket", "Match"];

const HELP_TEXT: &[(&str, &str)] = &[
    ("1 / 2 / 3", "Tournaments / Bracket / Match tab"),
    ("j k  ↑ ↓", "move through tournaments or matches"),
    ("h l  ← →", "previous / next round"),
    ("Enter", "open tournament, show match"),
    ("t / b", "advance top / bottom player (local, not saved)"),
    ("g", "ask the backend to generate the bracket"),
    ("s", "enter the selected match's result"),
    ("Tab / Enter / Esc", "next field / submit / cancel in the result form"),
    ("R", "reload the current view"),
    ("\"", "toggle the log pane"),
    ("f", "toggle full screen"),
    ("q", "quit"),
];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
            draw_status(f, layout.status, app);
        }
        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        let main = layout.main;
        match app.state.active_tab {
            MenuItem::Tournaments => draw_tournaments(f, main, app),
            MenuItem::Bracket => draw_bracket(f, main, app),
            MenuItem::Match => draw_match(f, main, app),
            MenuItem::Help => draw_help(f, main),
        }

        draw_notifications(f, f.area(), app);
        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Tournaments => 0,
        MenuItem::Bracket => 1,
        MenuItem::Match => 2,
        MenuItem::Help => match app.state.previous_tab {
            MenuItem::Bracket => 1,
            MenuItem::Match => 2,
            _ => 0,
        },
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

// ---------------------------------------------------------------------------
// Tournaments tab
// ---------------------------------------------------------------------------

fn draw_tournaments(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Tournaments ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let list = &app.state.tournaments;
    if list.tournaments.is_empty() {
        let msg = match (list.loaded, app.state.last_error.as_deref()) {
            (_, Some(err)) => format!("Could not load tournaments:\n{err}\n\nPress R to retry."),
            (false, None) => "Loading tournaments...".to_string(),
            (true, None) => "No tournaments yet.".to_string(),
        };
        draw_placeholder(f, inner, &msg);
        return;
    }

    let [header, body] =
        Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);
    f.render_widget(
        Paragraph::new(vec![
            Line::from(format!(
                "  {:<32} {:<12} {:>9}",
                "Title", "Status", "Players"
            ))
            .style(Style::default().add_modifier(Modifier::BOLD)),
            Line::from("  j/k=move  Enter=open bracket  R=reload")
                .style(Style::default().fg(Color::DarkGray)),
        ]),
        header,
    );

    let visible = body.height as usize;
    let skip = list.selected.saturating_sub(visible.saturating_sub(1));
    let lines: Vec<Line> = list
        .tournaments
        .iter()
        .enumerate()
        .skip(skip)
        .take(visible)
        .map(|(idx, t)| {
            let selected = idx == list.selected;
            let marker = if selected { ">" } else { " " };
            let title: String = t.title.chars().take(32).collect();
            let players = if t.max_players > 0 {
                format!("{}/{}", t.player_count, t.max_players)
            } else {
                t.player_count.to_string()
            };
            let mut spans = vec![Span::raw(format!(
                "{marker} {title:<32} {:<12} {players:>9}",
                t.status.label()
            ))];
            if t.is_full() {
                spans.push(Span::styled(" FULL", Style::default().fg(Color::Yellow)));
            }
            let line = Line::from(spans);
            if selected {
                line.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                line
            }
        })
        .collect();
    f.render_widget(Paragraph::new(lines), body);
}

// ---------------------------------------------------------------------------
// Bracket tab
// ---------------------------------------------------------------------------

fn draw_bracket(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Bracket ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let bracket = &app.state.bracket;
    let Some(tournament) = bracket.tournament.as_ref() else {
        let msg = if app.state.pending_tournament.is_some() {
            "Loading bracket data...".to_string()
        } else if let Some(err) = app.state.last_error.as_deref() {
            format!("Bracket load failed:\n{err}")
        } else {
            "No tournament open. Pick one on the Tournaments tab.".to_string()
        };
        draw_placeholder(f, inner, &msg);
        return;
    };

    let [header, key_legend, content] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(inner);

    let source_style = match bracket.source {
        BracketSource::Persisted => Style::default().fg(Color::Green),
        BracketSource::Local => Style::default().fg(Color::Yellow),
    };
    let mut spans = vec![
        Span::styled(
            tournament.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" | {} | ", bracket.round_label(bracket.view_round))),
        Span::styled(bracket.source.label(), source_style),
    ];
    if bracket.projections > 0 {
        spans.push(Span::styled(
            format!(" | {} unsaved", bracket.projections),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(prizes) = format_prizes(&tournament.prizes) {
        spans.push(Span::raw(format!(" | {prizes}")));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), header);

    let legend = match bracket.source {
        BracketSource::Local => {
            "h/l=round  j/k=move  t/b=advance  g=generate  Enter=match  ?=help"
        }
        BracketSource::Persisted => {
            "h/l=round  j/k=move  t/b=advance  s=result  Enter=match  ?=help"
        }
    };
    f.render_widget(
        Paragraph::new(legend).style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    let grid = BracketGrid::compute(
        &bracket.matches,
        bracket.rounds(),
        bracket.view_round,
        content.width,
    );
    f.render_widget(
        BracketView {
            matches: &bracket.matches,
            grid: &grid,
            selected: bracket.selected_index(),
        },
        content,
    );
}

fn format_prizes(prizes: &PrizeDistribution) -> Option<String> {
    if prizes.total() == 0 {
        return None;
    }
    Some(format!(
        "Prizes {} / {} / {}",
        prizes.first, prizes.second, prizes.third
    ))
}

// ---------------------------------------------------------------------------
// Match tab
// ---------------------------------------------------------------------------

fn draw_match(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Match ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let bracket = &app.state.bracket;
    let Some(m) = bracket.selected() else {
        draw_placeholder(f, inner, "No match selected. Pick one on the Bracket tab.");
        return;
    };

    let form_height = app
        .state
        .result_form
        .as_ref()
        .map(|form| form.fields().len() as u16 + 4)
        .unwrap_or(0);
    let [detail, form_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(form_height)]).areas(inner);

    draw_match_detail(f, detail, m, &bracket.round_label(m.round));
    if let Some(form) = &app.state.result_form {
        draw_result_form(f, form_area, form);
    }
}

fn draw_match_detail(f: &mut Frame, area: Rect, m: &Match, round_label: &str) {
    let status_style = match m.status {
        MatchStatus::Completed => Style::default().fg(Color::Green),
        MatchStatus::Bye => Style::default().fg(Color::DarkGray),
        MatchStatus::Pending => Style::default().fg(Color::Yellow),
    };
    let width = (area.width as usize).clamp(10, 40);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{round_label} · Match {}", m.match_number),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(m.status.label(), status_style),
        ]),
        Line::from(""),
    ];
    for slot in 0..2 {
        let player = m.player(slot);
        let score = m.score.map(|(a, b)| if slot == 0 { a } else { b });
        let mut style = Style::default();
        if let (Some(p), Some(w)) = (player, m.winner_id.as_deref())
            && p.id == w
        {
            style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
        }
        lines.push(Line::styled(
            format_player_line(player, score, m.is_bye(), width),
            style,
        ));
    }
    lines.push(Line::from(""));
    if let Some(winner) = m.winner() {
        lines.push(Line::from(format!("Winner: {}", winner.name)));
    }
    match m.next_match_id.as_deref() {
        Some(next) => lines.push(Line::from(format!("Winner goes to {next}"))),
        None => lines.push(Line::from("Final match")),
    }
    lines.push(
        Line::from("t/b=advance  s=enter result  Esc=back")
            .style(Style::default().fg(Color::DarkGray)),
    );

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn draw_result_form(f: &mut Frame, area: Rect, form: &ResultFormState) {
    let title = if form.submitting {
        format!(" Result: {} (saving...) ", form.match_label)
    } else {
        format!(" Result: {} ", form.match_label)
    };
    let block = default_border(Color::Cyan).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let focused = form.focused();
    let mut lines: Vec<Line> = form
        .fields()
        .into_iter()
        .map(|field| {
            let is_focused = field == focused;
            let marker = if is_focused { ">" } else { " " };
            let cursor = if is_focused && !form.submitting { "_" } else { "" };
            let text = format!(
                "{marker} {:<24} {}{cursor}",
                form.label(field),
                form.value(field)
            );
            if is_focused {
                Line::styled(text, Style::default().add_modifier(Modifier::BOLD))
            } else {
                Line::from(text)
            }
        })
        .collect();
    match &form.error {
        Some(err) => lines.push(Line::styled(err.clone(), Style::default().fg(Color::Red))),
        None => {
            let hint = "Tab=next field  Enter=submit  Esc=cancel";
            let text = match form.outcome() {
                Some(outcome) => format!("{outcome}  |  {hint}"),
                None => hint.to_string(),
            };
            lines.push(Line::from(text).style(Style::default().fg(Color::DarkGray)));
        }
    }
    f.render_widget(Paragraph::new(lines), inner);
}

// ---------------------------------------------------------------------------
// Help, logs, overlays
// ---------------------------------------------------------------------------

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::White).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines: Vec<Line> = HELP_TEXT
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("{keys:<20}"), Style::default().fg(Color::Cyan)),
                Span::raw(*what),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from("Esc to go back").style(Style::default().fg(Color::DarkGray)));
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .output_separator(' ')
        .output_timestamp(Some("%H:%M:%S".to_string()))
        .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
        .output_target(false)
        .output_file(false)
        .output_line(false)
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::White))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(logs, area);
}

/// One-line footer: backend address, bracket source, last failure.
fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        format!(" {} ", app.settings.api_url),
        Style::default().fg(Color::DarkGray),
    )];
    if app.settings.api_token.is_none() {
        spans.push(Span::styled("(no token) ", Style::default().fg(Color::DarkGray)));
    }
    if let Some(err) = app.state.last_error.as_deref() {
        spans.push(Span::styled(format!("{ERROR_CHAR} {err}"), Style::default().fg(Color::Red)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    f.render_widget(
        Paragraph::new(msg.to_string())
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

/// Toasts stacked above the bottom-right corner, newest at the bottom.
fn draw_notifications(f: &mut Frame, area: Rect, app: &App) {
    if app.state.notifications.is_empty() {
        return;
    }
    let toasts: Vec<_> = app.state.notifications.iter().collect();
    let width = area.width.saturating_sub(4).min(60);
    let mut bottom = area.bottom().saturating_sub(1);

    for toast in toasts.iter().rev() {
        let color = match toast.level {
            NotificationLevel::Info => Color::Green,
            NotificationLevel::Error => Color::Red,
        };
        let text_width = width.saturating_sub(2).max(1) as usize;
        let rows = (toast.message.chars().count().div_ceil(text_width)).clamp(1, 3) as u16;
        let height = rows + 2;
        if bottom < area.y + height {
            break;
        }
        let rect = Rect::new(
            area.right().saturating_sub(width + 1),
            bottom - height,
            width,
            height,
        );
        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(toast.message.clone())
                .wrap(Wrap { trim: true })
                .block(default_border(color)),
            rect,
        );
        bottom -= height;
    }
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
