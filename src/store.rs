//! Persistence of the contest history.
//!
//! Stores load and save the whole table at once; there are no partial
//! writes. The CSV store writes to a sibling temp file and renames it over
//! the target so a failed save leaves the previous history intact.

use crate::error::{ContestError, ContestResult};
use crate::types::{History, HistoryRecord, HISTORY_COLUMNS};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Storage backend for the contest history
pub trait HistoryStore: Send + Sync {
    /// Whether the underlying resource exists
    fn exists(&self) -> bool;

    /// Load the full history. An absent or empty resource yields an empty map.
    fn load(&self) -> ContestResult<History>;

    /// Replace the stored history with `history`
    fn save(&self, history: &History) -> ContestResult<()>;

    /// Create the resource with no rows if it is absent or empty.
    /// Returns `true` when it had to be created.
    fn ensure_initialized(&self) -> ContestResult<bool>;

    /// Human-readable location, used in log and error messages
    fn describe(&self) -> String;
}

/// History kept in a CSV file with columns `username,total_entries,total_wins`
#[derive(Debug, Clone)]
pub struct CsvHistoryStore {
    path: PathBuf,
}

impl CsvHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_blank(&self) -> ContestResult<bool> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl HistoryStore for CsvHistoryStore {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> ContestResult<History> {
        if self.is_blank()? {
            return Ok(History::new());
        }
        let file = fs::File::open(&self.path)?;
        read_history(file)
    }

    fn save(&self, history: &History) -> ContestResult<()> {
        let temp_path = self.temp_path();
        let written = fs::File::create(&temp_path)
            .map_err(ContestError::from)
            .and_then(|file| write_history(file, history))
            .and_then(|()| Ok(fs::rename(&temp_path, &self.path)?));

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            tracing::error!("Failed to write history to {}: {}", self.path.display(), e);
            return Err(e);
        }
        Ok(())
    }

    fn ensure_initialized(&self) -> ContestResult<bool> {
        if !self.is_blank()? {
            return Ok(false);
        }
        self.save(&History::new())?;
        tracing::warn!("Created a new history file at {}", self.path.display());
        Ok(true)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Parse a history table. Rows violating `total_wins <= total_entries` or
/// repeating a username are treated as malformed.
///
/// Only headers are trimmed; usernames are kept byte for byte so that a
/// saved history always loads back unchanged.
pub fn read_history<R: Read>(reader: R) -> ContestResult<History> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if let Some(missing) = HISTORY_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(ContestError::Storage(format!(
            "History file is missing the '{}' column",
            missing
        )));
    }

    let mut history = History::new();
    for (row, record) in reader.deserialize::<HistoryRecord>().enumerate() {
        let record = record.map_err(|e| {
            ContestError::Storage(format!("Malformed history row {}: {}", row + 1, e))
        })?;
        if record.username.is_empty() {
            return Err(ContestError::Storage(format!(
                "History row {} has an empty username",
                row + 1
            )));
        }
        if record.total_wins > record.total_entries {
            return Err(ContestError::Storage(format!(
                "History row {} for '{}' has more wins ({}) than entries ({})",
                row + 1,
                record.username,
                record.total_wins,
                record.total_entries
            )));
        }
        if history.contains_key(&record.username) {
            return Err(ContestError::Storage(format!(
                "History lists '{}' more than once",
                record.username
            )));
        }
        history.insert(record.username.clone(), record);
    }
    Ok(history)
}

/// Write a history table, header row included even when there are no rows
pub fn write_history<W: Write>(writer: W, history: &History) -> ContestResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(HISTORY_COLUMNS)?;
    for record in history.values() {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// In-memory history, `None` meaning "resource absent"
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    history: Mutex<Option<History>>,
    fail_saves: bool,
}

impl MemoryHistoryStore {
    /// A store whose resource does not exist yet
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `history`
    pub fn with_history(history: History) -> Self {
        Self {
            history: Mutex::new(Some(history)),
            fail_saves: false,
        }
    }

    /// A store that holds `history` but rejects every save
    pub fn read_only(history: History) -> Self {
        Self {
            history: Mutex::new(Some(history)),
            fail_saves: true,
        }
    }

    fn lock(&self) -> ContestResult<std::sync::MutexGuard<'_, Option<History>>> {
        self.history
            .lock()
            .map_err(|_| ContestError::Storage("History lock poisoned".to_string()))
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn exists(&self) -> bool {
        self.lock().map(|h| h.is_some()).unwrap_or(false)
    }

    fn load(&self) -> ContestResult<History> {
        Ok(self.lock()?.clone().unwrap_or_default())
    }

    fn save(&self, history: &History) -> ContestResult<()> {
        if self.fail_saves {
            return Err(ContestError::Storage("History store is read-only".to_string()));
        }
        *self.lock()? = Some(history.clone());
        Ok(())
    }

    fn ensure_initialized(&self) -> ContestResult<bool> {
        let mut guard = self.lock()?;
        if guard.is_some() {
            return Ok(false);
        }
        *guard = Some(History::new());
        Ok(true)
    }

    fn describe(&self) -> String {
        "in-memory history".to_string()
    }
}
