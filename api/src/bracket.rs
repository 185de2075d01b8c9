//! Client-side single-elimination bracket.
//!
//! The backend owns the authoritative bracket. What lives here is the
//! disposable fallback shown before one exists, and the optimistic winner
//! projection an operator applies while results are being entered.

use crate::{Match, MatchStatus, Player};
use log::debug;
use std::fmt;

/// First-round size of the scaffold shown for an empty roster.
pub const PLACEHOLDER_FIRST_ROUND: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BracketError {
    MatchNotFound(String),
    WinnerNotParticipant { match_id: String, player_id: String },
    /// The successor already holds two other players.
    SuccessorFull(String),
    /// The winner cannot change because the successor match has been decided.
    SuccessorDecided(String),
}

impl fmt::Display for BracketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketError::MatchNotFound(id) => write!(f, "match {id} is not in the bracket"),
            BracketError::WinnerNotParticipant { match_id, player_id } => {
                write!(f, "winner not a participant: {player_id} does not play in match {match_id}")
            }
            BracketError::SuccessorFull(id) => {
                write!(f, "match {id} already has two players")
            }
            BracketError::SuccessorDecided(id) => {
                write!(f, "match {id} is already decided")
            }
        }
    }
}

impl std::error::Error for BracketError {}

/// Number of rounds needed for `player_count` entrants: ceil(log2(n)), at least 1.
pub fn round_count(player_count: usize) -> u32 {
    player_count.next_power_of_two().trailing_zeros().max(1)
}

/// Id given to generated matches. Never collides with backend ids in practice
/// because the local bracket is only shown when the backend has none.
pub fn local_match_id(round: u32, match_number: u32) -> String {
    format!("local-r{round}-m{match_number}")
}

/// Build the fallback bracket for an ordered roster.
///
/// Players are paired in registration order: first-round match `i` takes
/// players `2i` and `2i + 1`. A lone player is left pending, never advanced.
/// With no players, a seven-match scaffold of placeholders is returned.
pub fn generate(players: &[Player]) -> Vec<Match> {
    if players.is_empty() {
        return placeholder_bracket();
    }

    let mut matches = skeleton(round_count(players.len()));
    // First-round matches lead the skeleton and there are at least ceil(n / 2) of them.
    for (m, pair) in matches.iter_mut().zip(players.chunks(2)) {
        m.players = pair.to_vec();
    }
    matches
}

fn placeholder_bracket() -> Vec<Match> {
    let rounds = round_count(PLACEHOLDER_FIRST_ROUND * 2);
    let mut matches = skeleton(rounds);
    for (i, m) in matches.iter_mut().take(PLACEHOLDER_FIRST_ROUND).enumerate() {
        m.players = vec![Player::placeholder(2 * i + 1), Player::placeholder(2 * i + 2)];
    }
    matches
}

/// Empty matches for every round, ordered by round then match number, each
/// linked to the match its winner feeds.
fn skeleton(rounds: u32) -> Vec<Match> {
    let mut matches = Vec::with_capacity((1usize << rounds) - 1);
    for round in 1..=rounds {
        let count = 1u32 << (rounds - round);
        for match_number in 1..=count {
            let next_match_id =
                (round < rounds).then(|| local_match_id(round + 1, match_number.div_ceil(2)));
            matches.push(Match {
                id: local_match_id(round, match_number),
                round,
                match_number,
                next_match_id,
                ..Match::default()
            });
        }
    }
    matches
}

/// Mark `winner_id` as the winner of `match_id` and advance them into the
/// successor's first open slot.
///
/// Re-applying the same winner leaves the successor untouched. Picking a
/// different winner swaps them in place of the previous one, unless the
/// successor already has a winner of its own. Nothing is mutated when the
/// call is rejected.
pub fn propagate_winner(
    matches: &mut [Match],
    match_id: &str,
    winner_id: &str,
) -> Result<(), BracketError> {
    let source_idx = matches
        .iter()
        .position(|m| m.id == match_id)
        .ok_or_else(|| BracketError::MatchNotFound(match_id.to_owned()))?;

    let source = &matches[source_idx];
    let winner = source
        .players
        .iter()
        .find(|p| p.id == winner_id)
        .cloned()
        .ok_or_else(|| BracketError::WinnerNotParticipant {
            match_id: match_id.to_owned(),
            player_id: winner_id.to_owned(),
        })?;
    let previous_winner = source.winner_id.clone().filter(|id| id != winner_id);
    let next_match_id = source.next_match_id.clone();

    let successor_idx = next_match_id
        .as_deref()
        .and_then(|next| matches.iter().position(|m| m.id == next));

    let mut replace_slot = None;
    if let Some(idx) = successor_idx {
        let successor = &matches[idx];
        let decided = successor.status == MatchStatus::Completed || successor.winner_id.is_some();
        if previous_winner.is_some() && decided {
            return Err(BracketError::SuccessorDecided(successor.id.clone()));
        }
        replace_slot = previous_winner
            .as_deref()
            .and_then(|prev| successor.players.iter().position(|p| p.id == prev));
        if !successor.has_player(winner_id)
            && replace_slot.is_none()
            && !successor.has_open_slot()
        {
            return Err(BracketError::SuccessorFull(successor.id.clone()));
        }
    }

    let source = &mut matches[source_idx];
    source.status = MatchStatus::Completed;
    source.winner_id = Some(winner_id.to_owned());

    match successor_idx {
        Some(idx) => {
            let successor = &mut matches[idx];
            if !successor.has_player(winner_id) {
                match replace_slot {
                    Some(slot) => successor.players[slot] = winner,
                    None => successor.players.push(winner),
                }
            }
        }
        None => {
            if let Some(next) = next_match_id {
                debug!("successor {next} of match {match_id} is not in the bracket");
            }
        }
    }

    Ok(())
}

/// Highest round present in a match list.
pub fn total_rounds(matches: &[Match]) -> u32 {
    matches.iter().map(|m| m.round).max().unwrap_or(0)
}

/// Matches of one round, ordered by match number.
pub fn round_matches(matches: &[Match], round: u32) -> Vec<&Match> {
    let mut out: Vec<&Match> = matches.iter().filter(|m| m.round == round).collect();
    out.sort_by_key(|m| m.match_number);
    out
}

/// Display name of a round counted back from the final.
pub fn round_label(round: u32, rounds: u32) -> String {
    match rounds.saturating_sub(round) {
        0 => "Final".to_string(),
        1 => "Semi-finals".to_string(),
        2 => "Quarter-finals".to_string(),
        _ => format!("Round {round}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player::new(format!("p{i}"), format!("Player {i}")))
            .collect()
    }

    fn ids(m: &Match) -> Vec<&str> {
        m.players.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn round_count_is_ceil_log2() {
        assert_eq!(round_count(1), 1);
        assert_eq!(round_count(2), 1);
        assert_eq!(round_count(3), 2);
        assert_eq!(round_count(4), 2);
        assert_eq!(round_count(5), 3);
        assert_eq!(round_count(8), 3);
        assert_eq!(round_count(9), 4);
        assert_eq!(round_count(64), 6);
    }

    #[test]
    fn first_round_size_matches_round_count() {
        for n in 2..=40 {
            let matches = generate(&roster(n));
            let rounds = round_count(n);
            assert_eq!(total_rounds(&matches), rounds, "n = {n}");
            assert_eq!(round_matches(&matches, 1).len(), 1 << (rounds - 1), "n = {n}");
            for round in 2..=rounds {
                assert_eq!(
                    round_matches(&matches, round).len() * 2,
                    round_matches(&matches, round - 1).len(),
                    "n = {n}, round = {round}"
                );
            }
        }
    }

    #[test]
    fn five_players_pair_in_registration_order() {
        let matches = generate(&roster(5));
        let first = round_matches(&matches, 1);
        assert_eq!(total_rounds(&matches), 3);
        assert_eq!(first.len(), 4);
        assert_eq!(ids(first[0]), vec!["p0", "p1"]);
        assert_eq!(ids(first[1]), vec!["p2", "p3"]);
        assert_eq!(ids(first[2]), vec!["p4"]);
        assert!(first[3].players.is_empty());
    }

    #[test]
    fn lone_player_is_not_auto_advanced() {
        let matches = generate(&roster(5));
        let bye = &matches[2];
        assert!(bye.is_bye());
        assert_eq!(bye.status, MatchStatus::Pending);
        assert!(bye.winner_id.is_none());
        assert!(matches.iter().filter(|m| m.round > 1).all(|m| m.players.is_empty()));
    }

    #[test]
    fn empty_roster_gets_placeholder_scaffold() {
        let matches = generate(&[]);
        assert_eq!(matches.len(), 7);
        let first = round_matches(&matches, 1);
        assert_eq!(first.len(), 4);
        assert!(first.iter().all(|m| m.players.len() == 2));
        assert!(first.iter().flat_map(|m| &m.players).all(Player::is_placeholder));
        assert_eq!(round_matches(&matches, 2).len(), 2);
        assert_eq!(round_matches(&matches, 3).len(), 1);
        assert!(matches.iter().filter(|m| m.round > 1).all(|m| m.players.is_empty()));
    }

    #[test]
    fn generated_matches_are_pending_and_uniquely_identified() {
        let matches = generate(&roster(11));
        let mut seen = std::collections::HashSet::new();
        for m in &matches {
            assert_eq!(m.status, MatchStatus::Pending);
            assert!(seen.insert(m.id.clone()), "duplicate id {}", m.id);
        }
    }

    #[test]
    fn successors_link_pairs_into_next_round() {
        let matches = generate(&roster(8));
        let first = round_matches(&matches, 1);
        assert_eq!(first[0].next_match_id.as_deref(), Some("local-r2-m1"));
        assert_eq!(first[1].next_match_id.as_deref(), Some("local-r2-m1"));
        assert_eq!(first[2].next_match_id.as_deref(), Some("local-r2-m2"));
        let last = round_matches(&matches, 3);
        assert_eq!(last.len(), 1);
        assert!(last[0].next_match_id.is_none());
    }

    #[test]
    fn generation_is_deterministic() {
        let players = roster(13);
        assert_eq!(generate(&players), generate(&players));
    }

    #[test]
    fn rejects_winner_outside_match() {
        let mut matches = generate(&roster(4));
        let before = matches.clone();
        let err = propagate_winner(&mut matches, "local-r1-m1", "p2").unwrap_err();
        assert_eq!(
            err,
            BracketError::WinnerNotParticipant {
                match_id: "local-r1-m1".into(),
                player_id: "p2".into()
            }
        );
        assert!(err.to_string().starts_with("winner not a participant"));
        assert_eq!(matches, before);
    }

    #[test]
    fn rejects_unknown_match() {
        let mut matches = generate(&roster(4));
        assert_eq!(
            propagate_winner(&mut matches, "nope", "p0"),
            Err(BracketError::MatchNotFound("nope".into()))
        );
    }

    #[test]
    fn winner_joins_successor_without_displacing_opponent() {
        let mut matches = generate(&roster(4));
        propagate_winner(&mut matches, "local-r1-m2", "p3").unwrap();
        propagate_winner(&mut matches, "local-r1-m1", "p0").unwrap();

        let source = &matches[0];
        assert_eq!(source.status, MatchStatus::Completed);
        assert_eq!(source.winner().map(|p| p.id.as_str()), Some("p0"));

        let final_match = &matches[2];
        assert_eq!(ids(final_match), vec!["p3", "p0"]);
    }

    #[test]
    fn reapplying_same_winner_does_not_duplicate() {
        let mut matches = generate(&roster(4));
        propagate_winner(&mut matches, "local-r1-m1", "p1").unwrap();
        propagate_winner(&mut matches, "local-r1-m1", "p1").unwrap();
        assert_eq!(ids(&matches[2]), vec!["p1"]);
    }

    #[test]
    fn changing_winner_swaps_successor_slot() {
        let mut matches = generate(&roster(4));
        propagate_winner(&mut matches, "local-r1-m1", "p0").unwrap();
        propagate_winner(&mut matches, "local-r1-m2", "p2").unwrap();
        propagate_winner(&mut matches, "local-r1-m1", "p1").unwrap();
        assert_eq!(ids(&matches[2]), vec!["p1", "p2"]);
        assert_eq!(matches[0].winner_id.as_deref(), Some("p1"));
        assert_winners_consistent(&matches);
    }

    /// Every completed match names one of its own players, and that player
    /// reaches at most one later round.
    fn assert_winners_consistent(matches: &[Match]) {
        for m in matches.iter().filter(|m| m.status == MatchStatus::Completed) {
            let winner = m.winner().unwrap_or_else(|| panic!("{} names an outsider", m.id));
            let later = matches
                .iter()
                .filter(|n| n.round == m.round + 1 && n.has_player(&winner.id))
                .count();
            assert!(later <= 1, "{} advanced twice", winner.id);
        }
    }

    #[test]
    fn winner_change_after_decided_final_is_rejected() {
        let mut matches = generate(&roster(4));
        propagate_winner(&mut matches, "local-r1-m1", "p0").unwrap();
        propagate_winner(&mut matches, "local-r1-m2", "p2").unwrap();
        propagate_winner(&mut matches, "local-r2-m1", "p0").unwrap();
        let before = matches.clone();

        assert_eq!(
            propagate_winner(&mut matches, "local-r1-m1", "p1"),
            Err(BracketError::SuccessorDecided("local-r2-m1".into()))
        );
        assert_eq!(matches, before);
        assert_winners_consistent(&matches);
    }

    #[test]
    fn winner_change_cannot_strand_later_rounds() {
        let mut matches = generate(&roster(8));
        propagate_winner(&mut matches, "local-r1-m1", "p0").unwrap();
        propagate_winner(&mut matches, "local-r2-m1", "p0").unwrap();
        let before = matches.clone();

        let err = propagate_winner(&mut matches, "local-r1-m1", "p1").unwrap_err();
        assert_eq!(err, BracketError::SuccessorDecided("local-r2-m1".into()));
        assert_eq!(err.to_string(), "match local-r2-m1 is already decided");
        assert_eq!(matches, before);
        assert_eq!(ids(round_matches(&matches, 2)[0]), vec!["p0"]);
        assert_eq!(ids(round_matches(&matches, 3)[0]), vec!["p0"]);
        assert_winners_consistent(&matches);
    }

    #[test]
    fn same_winner_is_still_accepted_after_successor_decided() {
        let mut matches = generate(&roster(4));
        propagate_winner(&mut matches, "local-r1-m1", "p0").unwrap();
        propagate_winner(&mut matches, "local-r2-m1", "p0").unwrap();
        let before = matches.clone();
        propagate_winner(&mut matches, "local-r1-m1", "p0").unwrap();
        assert_eq!(matches, before);
    }

    #[test]
    fn full_successor_rejects_without_mutation() {
        let mut matches = generate(&roster(4));
        matches[2].players = vec![Player::new("x", "X"), Player::new("y", "Y")];
        let before = matches.clone();
        assert_eq!(
            propagate_winner(&mut matches, "local-r1-m1", "p0"),
            Err(BracketError::SuccessorFull("local-r2-m1".into()))
        );
        assert_eq!(matches, before);
    }

    #[test]
    fn missing_successor_still_completes_match() {
        let mut matches = generate(&roster(4));
        matches.truncate(2);
        propagate_winner(&mut matches, "local-r1-m1", "p0").unwrap();
        assert_eq!(matches[0].status, MatchStatus::Completed);
    }

    #[test]
    fn final_has_no_successor() {
        let mut matches = generate(&roster(2));
        assert_eq!(matches.len(), 1);
        propagate_winner(&mut matches, "local-r1-m1", "p1").unwrap();
        assert_eq!(matches[0].winner_id.as_deref(), Some("p1"));
    }

    #[test]
    fn lone_player_can_be_advanced_manually() {
        let mut matches = generate(&roster(3));
        propagate_winner(&mut matches, "local-r1-m2", "p2").unwrap();
        assert_eq!(ids(&matches[2]), vec!["p2"]);
    }

    #[test]
    fn round_labels_count_back_from_final() {
        assert_eq!(round_label(3, 3), "Final");
        assert_eq!(round_label(2, 3), "Semi-finals");
        assert_eq!(round_label(1, 3), "Quarter-finals");
        assert_eq!(round_label(1, 5), "Round 1");
    }
}
