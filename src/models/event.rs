//! Library event model (readings, workshops, exhibitions)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryEvent {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl std::fmt::Display for LibraryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.date.format("%Y-%m-%d"), self.title)?;
        if let Some(ref description) = self.description {
            write!(f, ": {}", description)?;
        }
        Ok(())
    }
}

/// Create event request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvent {
    pub title: String,
    /// Event date (YYYY-MM-DD)
    pub date: String,
    pub description: Option<String>,
}
