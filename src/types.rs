use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Participant identifier as it appears in rosters and the history file
pub type Username = String;
pub type DrawId = String;

/// Column names of the persisted history table, in file order
pub const HISTORY_COLUMNS: [&str; 3] = ["username", "total_entries", "total_wins"];

/// Cumulative participation counters for one participant.
///
/// `total_wins <= total_entries` holds for every record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryRecord {
    pub username: Username,
    pub total_entries: u64,
    pub total_wins: u64,
}

impl HistoryRecord {
    pub fn new(username: impl Into<Username>) -> Self {
        Self {
            username: username.into(),
            total_entries: 0,
            total_wins: 0,
        }
    }
}

/// Full history keyed by username.
///
/// A `BTreeMap` keeps rewrites of the history file in a stable order.
pub type History = BTreeMap<Username, HistoryRecord>;

/// Weight breakdown for one roster position
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParticipantWeight {
    /// 0-based arrival position in the roster
    pub position: usize,
    pub username: Username,
    /// `total_entries` before this contest (0 for newcomers)
    pub prior_entries: u64,
    pub entry_weight: f64,
    pub order_weight: f64,
    pub weight: f64,
}

/// Result of a single draw
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawOutcome {
    pub id: DrawId,
    pub winner: Username,
    /// ISO8601 timestamp of the draw
    pub drawn_at: String,
    pub participants: usize,
    pub weights: Vec<ParticipantWeight>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub username: Username,
    pub total_entries: u64,
    pub total_wins: u64,
    pub win_rate: f64,
}

/// Summary returned after a roster upload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RosterSummary {
    pub participants: usize,
    pub usernames: Vec<Username>,
}
