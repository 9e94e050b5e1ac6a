use super::AppState;
use crate::error::{ContestError, ContestResult};
use crate::roster::Roster;
use crate::types::RosterSummary;

impl AppState {
    /// Parse an uploaded roster CSV and make it the roster of the next draw.
    ///
    /// The history resource must already exist; a failed upload keeps the
    /// previously loaded roster.
    pub async fn load_roster(&self, csv: &[u8]) -> ContestResult<RosterSummary> {
        if !self.store.exists() {
            return Err(ContestError::NotFound(format!(
                "History file '{}' not found. Cannot proceed without it.",
                self.store.describe()
            )));
        }

        let roster = Roster::from_csv(csv)?;
        let summary = roster.summary();
        tracing::info!(
            "Roster loaded with {} participants",
            summary.participants
        );

        *self.roster.write().await = Some(roster);
        Ok(summary)
    }

    pub async fn get_roster(&self) -> Option<RosterSummary> {
        self.roster.read().await.as_ref().map(Roster::summary)
    }

    /// Forget the loaded roster
    pub async fn clear_roster(&self) -> bool {
        self.roster.write().await.take().is_some()
    }
}
