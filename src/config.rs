//! Server configuration loaded from the environment.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// File name of the history table when `HISTORY_PATH` is not set
pub const DEFAULT_HISTORY_FILE: &str = "ContestHistory.csv";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:6573";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Location of the history CSV
    pub history_path: PathBuf,
    pub listen_addr: SocketAddr,
    /// Fixed RNG seed for reproducible draws (None = seeded from the OS)
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
            listen_addr: default_listen_addr(),
            seed: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// - `HISTORY_PATH`: history CSV (default: `ContestHistory.csv` next to the executable)
    /// - `LISTEN_ADDR`: socket address to bind (default `127.0.0.1:6573`)
    /// - `CONTEST_SEED`: optional u64 seed for the draw RNG
    pub fn from_env() -> Self {
        let history_path = env_non_empty("HISTORY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_history_path);

        let listen_addr = match env_non_empty("LISTEN_ADDR") {
            Some(addr) => addr.parse().unwrap_or_else(|e| {
                tracing::warn!(
                    "Invalid LISTEN_ADDR '{}': {}. Falling back to {}",
                    addr,
                    e,
                    DEFAULT_LISTEN_ADDR
                );
                default_listen_addr()
            }),
            None => default_listen_addr(),
        };

        let seed = env_non_empty("CONTEST_SEED").and_then(|s| match s.parse() {
            Ok(seed) => Some(seed),
            Err(e) => {
                tracing::warn!("Ignoring invalid CONTEST_SEED '{}': {}", s, e);
                None
            }
        });

        Self {
            history_path,
            listen_addr,
            seed,
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6573))
}

/// `ContestHistory.csv` in the directory holding the running executable,
/// or the working directory if that cannot be determined
pub fn default_history_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default()
        .join(DEFAULT_HISTORY_FILE)
}
