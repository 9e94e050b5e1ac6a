//! Weighted winner selection and the history update that follows a draw.
//!
//! Each participant's weight is `ln(prior_entries + 1)` plus an arrival-order
//! bonus that falls linearly from [`MAX_ORDER_WEIGHT`] for the first responder
//! to 0 for the last one.

use crate::error::{ContestError, ContestResult};
use crate::roster::validate_usernames;
use crate::types::{History, HistoryRecord, ParticipantWeight, Username};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

/// Order bonus awarded to the first responder
pub const MAX_ORDER_WEIGHT: f64 = 10.0;

/// The winner of a draw together with the weights it was drawn from and the
/// history as it should be persisted afterwards.
#[derive(Debug, Clone)]
pub struct Selection {
    pub winner: Username,
    pub weights: Vec<ParticipantWeight>,
    pub history: History,
}

/// Log-scaled participation weight.
///
/// Note this favours participants with many prior entries.
pub fn entry_weight(prior_entries: u64) -> f64 {
    (prior_entries as f64 + 1.0).ln()
}

/// Arrival-order weight for position `index` in a roster of `roster_len`.
///
/// A single-participant roster gets 0, not the maximum.
pub fn order_weight(index: usize, roster_len: usize) -> f64 {
    let remaining = roster_len.saturating_sub(index + 1) as f64;
    let span = roster_len.saturating_sub(1).max(1) as f64;
    MAX_ORDER_WEIGHT * remaining / span
}

/// Compute the weight breakdown for every roster position
pub fn compute_weights(roster: &[Username], history: &History) -> Vec<ParticipantWeight> {
    let roster_len = roster.len();
    roster
        .iter()
        .enumerate()
        .map(|(position, username)| {
            let prior_entries = history
                .get(username)
                .map(|record| record.total_entries)
                .unwrap_or(0);
            let entry_weight = entry_weight(prior_entries);
            let order_weight = order_weight(position, roster_len);
            ParticipantWeight {
                position,
                username: username.clone(),
                prior_entries,
                entry_weight,
                order_weight,
                weight: entry_weight + order_weight,
            }
        })
        .collect()
}

/// Draw one index with probability proportional to its weight.
///
/// When every weight is zero (e.g. a lone newcomer) the draw is uniform.
pub fn draw_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> ContestResult<usize> {
    if weights.is_empty() {
        return Err(ContestError::Validation(
            "Cannot draw from an empty roster".to_string(),
        ));
    }

    if weights.iter().all(|w| *w == 0.0) {
        return Ok(rng.random_range(0..weights.len()));
    }

    let dist = WeightedIndex::new(weights.iter().copied())
        .map_err(|e| ContestError::Validation(format!("Invalid participant weights: {}", e)))?;
    Ok(dist.sample(rng))
}

/// Apply the outcome of a draw to `history`.
///
/// The winner is credited once with an entry and a win. Every other roster
/// occurrence counts as one entry, so a name listed twice gets two entries.
/// Participants outside the roster are left alone.
///
/// Fails if a counter would overflow; `history` may then be partially
/// updated, so callers apply this to a copy.
pub fn apply_outcome(
    history: &mut History,
    roster: &[Username],
    winner: &str,
) -> ContestResult<()> {
    let record = history
        .entry(winner.to_string())
        .or_insert_with(|| HistoryRecord::new(winner));
    record.total_entries = increment(record.total_entries, winner, "total_entries")?;
    record.total_wins = increment(record.total_wins, winner, "total_wins")?;

    for username in roster.iter().filter(|u| u.as_str() != winner) {
        let record = history
            .entry(username.clone())
            .or_insert_with(|| HistoryRecord::new(username.as_str()));
        record.total_entries = increment(record.total_entries, username, "total_entries")?;
    }
    Ok(())
}

fn increment(count: u64, username: &str, column: &str) -> ContestResult<u64> {
    count.checked_add(1).ok_or_else(|| {
        ContestError::Storage(format!(
            "History counter {} for '{}' cannot be incremented",
            column, username
        ))
    })
}

/// Pick a winner from `roster` and return the updated history.
///
/// `history` itself is not modified; the caller persists
/// [`Selection::history`] once it is ready to commit.
pub fn select_winner<R: Rng + ?Sized>(
    roster: &[Username],
    history: &History,
    rng: &mut R,
) -> ContestResult<Selection> {
    validate_usernames(roster)?;

    let weights = compute_weights(roster, history);
    let raw: Vec<f64> = weights.iter().map(|w| w.weight).collect();
    let winner = roster[draw_index(&raw, rng)?].clone();

    let mut updated = history.clone();
    apply_outcome(&mut updated, roster, &winner)?;

    Ok(Selection {
        winner,
        weights,
        history: updated,
    })
}
