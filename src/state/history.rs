use super::AppState;
use crate::error::ContestResult;
use crate::types::{HistoryRecord, LeaderboardEntry};

impl AppState {
    /// All history records, sorted by username
    pub async fn get_history(&self) -> ContestResult<Vec<HistoryRecord>> {
        Ok(self.store.load()?.into_values().collect())
    }

    /// History ranked by wins (descending), then entries (ascending), then name
    pub async fn get_leaderboard(&self) -> ContestResult<Vec<LeaderboardEntry>> {
        let mut records = self.get_history().await?;
        records.sort_by(|a, b| {
            b.total_wins
                .cmp(&a.total_wins)
                .then(a.total_entries.cmp(&b.total_entries))
                .then_with(|| a.username.cmp(&b.username))
        });

        Ok(records
            .into_iter()
            .enumerate()
            .map(|(idx, record)| LeaderboardEntry {
                rank: idx + 1,
                win_rate: if record.total_entries == 0 {
                    0.0
                } else {
                    record.total_wins as f64 / record.total_entries as f64
                },
                username: record.username,
                total_entries: record.total_entries,
                total_wins: record.total_wins,
            })
            .collect())
    }
}
