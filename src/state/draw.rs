use super::AppState;
use crate::error::{ContestError, ContestResult};
use crate::roster::Roster;
use crate::selector;
use crate::types::{DrawOutcome, ParticipantWeight};

impl AppState {
    async fn loaded_roster(&self) -> ContestResult<Roster> {
        self.roster
            .read()
            .await
            .clone()
            .ok_or_else(|| ContestError::Validation("No valid roster loaded".to_string()))
    }

    fn require_history(&self) -> ContestResult<()> {
        if self.store.exists() {
            Ok(())
        } else {
            Err(ContestError::NotFound(format!(
                "History file '{}' not found",
                self.store.describe()
            )))
        }
    }

    /// Weights the next draw would use, without drawing
    pub async fn preview_weights(&self) -> ContestResult<Vec<ParticipantWeight>> {
        let roster = self.loaded_roster().await?;
        let history = self.store.load()?;
        Ok(selector::compute_weights(roster.usernames(), &history))
    }

    /// Draw a winner from the loaded roster and persist the updated history.
    ///
    /// Nothing is written unless the whole draw succeeds, and the stored
    /// history is saved before the outcome becomes visible as the last draw.
    pub async fn pick_winner(&self) -> ContestResult<DrawOutcome> {
        let roster = self.loaded_roster().await?;

        let mut rng = self.rng.lock().await;
        self.require_history()?;
        let history = self.store.load()?;

        let selection = selector::select_winner(roster.usernames(), &history, &mut *rng)?;
        self.store.save(&selection.history)?;
        drop(rng);

        let outcome = DrawOutcome {
            id: ulid::Ulid::new().to_string(),
            winner: selection.winner,
            drawn_at: chrono::Utc::now().to_rfc3339(),
            participants: roster.len(),
            weights: selection.weights,
        };
        tracing::info!(
            "Draw {} picked '{}' out of {} participants",
            outcome.id,
            outcome.winner,
            outcome.participants
        );

        *self.last_draw.write().await = Some(outcome.clone());
        Ok(outcome)
    }

    pub async fn get_last_draw(&self) -> Option<DrawOutcome> {
        self.last_draw.read().await.clone()
    }
}
