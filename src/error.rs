//! Error taxonomy shared by the selector, the stores and the HTTP layer.

/// Result type for contest operations
pub type ContestResult<T> = Result<T, ContestError>;

/// Errors that abort a contest operation.
///
/// None of these leave the persisted history partially updated: a draw is
/// computed in memory and only committed by a single successful save.
#[derive(Debug, thiserror::Error)]
pub enum ContestError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("History storage failed: {0}")]
    Storage(String),

    #[error("The uploaded roster is empty")]
    EmptyInput,
}

impl ContestError {
    /// Short machine-readable name used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            ContestError::Validation(_) => "validation",
            ContestError::NotFound(_) => "not_found",
            ContestError::Storage(_) => "storage",
            ContestError::EmptyInput => "empty_input",
        }
    }
}

impl From<std::io::Error> for ContestError {
    fn from(err: std::io::Error) -> Self {
        ContestError::Storage(err.to_string())
    }
}

impl From<csv::Error> for ContestError {
    fn from(err: csv::Error) -> Self {
        ContestError::Storage(err.to_string())
    }
}
