mod draw;
mod history;
mod roster;

use crate::config::ServerConfig;
use crate::roster::Roster;
use crate::store::{CsvHistoryStore, HistoryStore};
use crate::types::DrawOutcome;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub store: Arc<dyn HistoryStore>,
    /// Roster of the upcoming draw, kept until replaced
    pub roster: Arc<RwLock<Option<Roster>>>,
    pub last_draw: Arc<RwLock<Option<DrawOutcome>>>,
    /// Draw RNG; holding this lock also serializes draws
    rng: Arc<Mutex<StdRng>>,
}

impl AppState {
    /// State backed by the CSV history file named in `config`
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(CsvHistoryStore::new(config.history_path.clone()));
        Self::with_store(config, store)
    }

    pub fn with_store(config: ServerConfig, store: Arc<dyn HistoryStore>) -> Self {
        let rng = match config.seed {
            Some(seed) => {
                tracing::info!("Using fixed draw seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            store,
            roster: Arc::new(RwLock::new(None)),
            last_draw: Arc::new(RwLock::new(None)),
            rng: Arc::new(Mutex::new(rng)),
        }
    }
}
