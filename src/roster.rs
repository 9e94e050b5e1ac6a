//! Contest rosters: the ordered participant list for one draw.
//!
//! Order is arrival order, index 0 being the first responder.

use crate::error::{ContestError, ContestResult};
use crate::types::{RosterSummary, Username};
use std::io::Read;

/// Header of the column that identifies participants
pub const USERNAME_COLUMN: &str = "username";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    usernames: Vec<Username>,
}

impl Roster {
    /// Build a roster from usernames already in arrival order
    pub fn new(usernames: Vec<Username>) -> ContestResult<Self> {
        validate_usernames(&usernames)?;
        Ok(Self { usernames })
    }

    /// Parse a roster CSV.
    ///
    /// The header row must contain a `username` column; any other columns
    /// are ignored. Rows keep their file order.
    pub fn from_csv<R: Read>(reader: R) -> ContestResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| ContestError::Validation(format!("Failed to read roster CSV: {}", e)))?
            .clone();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ContestError::EmptyInput);
        }

        let column = headers
            .iter()
            .position(|h| h == USERNAME_COLUMN)
            .ok_or_else(|| {
                ContestError::Validation(format!(
                    "CSV must contain a '{}' column",
                    USERNAME_COLUMN
                ))
            })?;

        let mut usernames = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                ContestError::Validation(format!("Failed to read roster row {}: {}", row + 1, e))
            })?;
            let username = record.get(column).unwrap_or_default();
            if username.is_empty() {
                return Err(ContestError::Validation(format!(
                    "Roster row {} has an empty username",
                    row + 1
                )));
            }
            usernames.push(username.to_string());
        }

        if usernames.is_empty() {
            return Err(ContestError::EmptyInput);
        }

        Ok(Self { usernames })
    }

    pub fn usernames(&self) -> &[Username] {
        &self.usernames
    }

    pub fn len(&self) -> usize {
        self.usernames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usernames.is_empty()
    }

    pub fn summary(&self) -> RosterSummary {
        RosterSummary {
            participants: self.usernames.len(),
            usernames: self.usernames.clone(),
        }
    }
}

/// Reject empty rosters and blank usernames
pub fn validate_usernames(usernames: &[Username]) -> ContestResult<()> {
    if usernames.is_empty() {
        return Err(ContestError::Validation(
            "Roster must contain at least one participant".to_string(),
        ));
    }
    if let Some(position) = usernames.iter().position(|u| u.trim().is_empty()) {
        return Err(ContestError::Validation(format!(
            "Roster entry {} has an empty username",
            position + 1
        )));
    }
    Ok(())
}
