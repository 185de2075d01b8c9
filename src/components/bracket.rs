use asc_api::{Match, MatchStatus, Player};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::Widget;

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Rows per match cell: first-player line, status line, second-player line.
pub const MATCH_HEIGHT: u16 = 3;

/// Width of the connector zone drawn between adjacent round columns.
pub const CONNECTOR_WIDTH: u16 = 3;

/// Cell width bounds. Columns that cannot get the minimum are scrolled away.
const CELL_W_MAX: u16 = 24;
const CELL_W_MIN: u16 = 14;

/// Slot height for a column `depth` rounds right of the first visible one.
/// SH[0] = MATCH_HEIGHT; SH[d] = 2 * SH[d-1] + 1, i.e. 4 * 2^d - 1.
pub fn slot_height(depth: u32) -> u16 {
    let h = (4u32 << depth.min(13)) - 1;
    h.min(u16::MAX as u32) as u16
}

// ---------------------------------------------------------------------------
// MatchCell: pre-computed position for one match
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCell {
    /// Row of the status line (middle of the 3-row cell), origin-relative.
    pub center_row: u16,
    /// Starting x-column, origin-relative.
    pub col: u16,
    pub round: u32,
    /// Index into the caller's match slice.
    pub match_idx: usize,
}

// ---------------------------------------------------------------------------
// BracketGrid: layout engine for a window of rounds
// ---------------------------------------------------------------------------

/// Bracket layout for the rounds that fit the terminal width.
///
/// When every round does not fit, the window starts at the viewed round so
/// that later rounds collapse to the left, each column re-centred on the
/// first visible one:
///
///   depth 0: [1, 5, 9, 13, ...]  (spacing 4)
///   depth 1: [3, 11, 19, ...]    (spacing 8)
///   depth 2: [7, 23, ...]        (spacing 16)
#[derive(Debug, Clone)]
pub struct BracketGrid {
    /// Depth-major: every cell of the first visible round, then the next, ...
    pub cells: Vec<MatchCell>,
    pub first_round: u32,
    pub last_round: u32,
    pub cell_width: u16,
    pub total_height: u16,
}

impl BracketGrid {
    /// `rounds` is the total round count, `view_round` the round the operator
    /// has navigated to.
    pub fn compute(matches: &[Match], rounds: u32, view_round: u32, width: u16) -> Self {
        let stride_min = CELL_W_MIN + CONNECTOR_WIDTH;
        let max_cols = ((width + CONNECTOR_WIDTH) / stride_min).max(1) as u32;
        let visible = rounds.clamp(1, max_cols);
        let first_round = view_round.clamp(1, rounds.saturating_sub(visible) + 1);
        let last_round = first_round + visible - 1;

        let per_col = width.saturating_sub(CONNECTOR_WIDTH * (visible as u16 - 1)) / visible as u16;
        let cell_width = per_col.clamp(1, CELL_W_MAX);
        let stride = cell_width + CONNECTOR_WIDTH;

        let mut cells = Vec::new();
        for round in first_round..=last_round {
            let depth = round - first_round;
            let sh = slot_height(depth);
            let col = stride * depth as u16;

            let mut in_round: Vec<(usize, &Match)> =
                matches.iter().enumerate().filter(|(_, m)| m.round == round).collect();
            in_round.sort_by_key(|(_, m)| m.match_number);

            for (i, (match_idx, _)) in in_round.into_iter().enumerate() {
                let center_row =
                    (sh / 2).saturating_add((i as u16).saturating_mul(sh.saturating_add(1)));
                cells.push(MatchCell { center_row, col, round, match_idx });
            }
        }

        let total_height = cells
            .iter()
            .map(|c| c.center_row.saturating_add(2))
            .max()
            .unwrap_or(0);

        Self { cells, first_round, last_round, cell_width, total_height }
    }

    pub fn cells_for_round(&self, round: u32) -> impl Iterator<Item = &MatchCell> {
        self.cells.iter().filter(move |c| c.round == round)
    }

    /// Scroll offset that keeps `match_idx` in the middle of a viewport of
    /// `height` rows.
    pub fn scroll_for(&self, match_idx: Option<usize>, height: u16) -> u16 {
        let Some(cell) = match_idx.and_then(|idx| self.cells.iter().find(|c| c.match_idx == idx))
        else {
            return 0;
        };
        let max_scroll = self.total_height.saturating_sub(height);
        cell.center_row.saturating_sub(height / 2).min(max_scroll)
    }
}

// ---------------------------------------------------------------------------
// BracketView widget
// ---------------------------------------------------------------------------

pub struct BracketView<'a> {
    pub matches: &'a [Match],
    pub grid: &'a BracketGrid,
    /// Index into `matches` of the highlighted match.
    pub selected: Option<usize>,
}

impl Widget for BracketView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < CELL_W_MIN || area.height < MATCH_HEIGHT {
            return;
        }
        let scroll = self.grid.scroll_for(self.selected, area.height);

        for cell in &self.grid.cells {
            let m = &self.matches[cell.match_idx];
            let selected = self.selected == Some(cell.match_idx);
            draw_match_cell(m, cell, self.grid.cell_width, selected, area, scroll, buf);
        }

        for round in self.grid.first_round..self.grid.last_round {
            let children: Vec<&MatchCell> = self.grid.cells_for_round(round).collect();
            let parents: Vec<&MatchCell> = self.grid.cells_for_round(round + 1).collect();
            let Some(first_child) = children.first() else {
                continue;
            };
            let conn_x = area.x + first_child.col + self.grid.cell_width;

            for (j, parent) in parents.iter().enumerate() {
                let (Some(top), Some(bot)) = (children.get(2 * j), children.get(2 * j + 1)) else {
                    continue;
                };
                draw_connector(
                    top.center_row,
                    parent.center_row,
                    bot.center_row,
                    conn_x,
                    area,
                    scroll,
                    buf,
                );
            }
        }
    }
}

/// Convert a bracket-relative row to an absolute screen y, applying scroll + area bounds.
fn screen_y(bracket_row: u16, scroll: u16, area: Rect) -> Option<u16> {
    if bracket_row < scroll {
        return None;
    }
    let rel = bracket_row - scroll;
    if rel >= area.height {
        return None;
    }
    Some(area.y + rel)
}

fn draw_match_cell(
    m: &Match,
    cell: &MatchCell,
    width: u16,
    selected: bool,
    area: Rect,
    scroll: u16,
    buf: &mut Buffer,
) {
    let x = area.x + cell.col;
    if x >= area.right() {
        return;
    }
    let avail_w = area.right().saturating_sub(x).min(width);

    let base = if selected {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(Color::Gray)
    };
    let winner = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);

    let rows = [
        cell.center_row.saturating_sub(1),
        cell.center_row,
        cell.center_row.saturating_add(1),
    ];
    for (line, row) in rows.into_iter().enumerate() {
        let Some(sy) = screen_y(row, scroll, area) else {
            continue;
        };
        let (text, style) = match line {
            1 => (format_status_line(m, width as usize), if selected { base } else { dim }),
            _ => {
                let slot = line / 2;
                let player = m.player(slot);
                let score = m.score.map(|(a, b)| if slot == 0 { a } else { b });
                let style = match player {
                    Some(p) if m.winner_id.as_deref() == Some(p.id.as_str()) => winner,
                    Some(p) if p.is_placeholder() && !selected => dim,
                    Some(_) => base,
                    None if selected => base,
                    None => dim,
                };
                (format_player_line(player, score, m.is_bye(), width as usize), style)
            }
        };
        buf.set_stringn(x, sy, &text, avail_w as usize, style);
    }
}

/// `"name          sc "` padded to exactly `width` columns.
pub fn format_player_line(
    player: Option<&Player>,
    score: Option<u32>,
    bye: bool,
    width: usize,
) -> String {
    let name = match player {
        Some(p) => p.name.as_str(),
        None if bye => "(bye)",
        None => "TBD",
    };
    let score_str = match score {
        Some(s) => format!("{s:>3}"),
        None => "   ".to_string(),
    };
    let name_w = width.saturating_sub(5);
    let trimmed: String = name.chars().take(name_w).collect();
    let line = format!(" {trimmed:<name_w$}{score_str} ");
    line.chars().take(width).collect()
}

fn format_status_line(m: &Match, width: usize) -> String {
    let status = if m.is_bye() && m.status == MatchStatus::Pending {
        "BYE"
    } else {
        m.status.label()
    };
    let raw = format!(" M{} {status}", m.match_number);
    let padded = format!("{raw:<width$}");
    padded.chars().take(width).collect()
}

/// Box-drawing connector between one parent and its two feeders.
///
/// ```text
///  top  ──┐
///         │
///  parent ├──
///         │
///  bot  ──┘
/// ```
fn draw_connector(
    r_top: u16,
    r_mid: u16,
    r_bot: u16,
    x: u16,
    area: Rect,
    scroll: u16,
    buf: &mut Buffer,
) {
    let style = Style::default().fg(Color::DarkGray);
    let (col_a, col_b, col_c) = (x, x + 1, x + 2);

    let mut put = |cx: u16, row: u16, ch: char| {
        if cx < area.right()
            && let Some(sy) = screen_y(row, scroll, area)
            && let Some(cell) = buf.cell_mut((cx, sy))
        {
            cell.set_char(ch);
            cell.set_style(style);
        }
    };

    put(col_a, r_top, '─');
    put(col_b, r_top, '┐');
    for row in (r_top + 1)..r_bot {
        put(col_b, row, '│');
    }
    put(col_b, r_mid, '├');
    put(col_c, r_mid, '─');
    put(col_a, r_bot, '─');
    put(col_b, r_bot, '┘');
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
