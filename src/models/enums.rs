//! Shared domain enums

use serde::{Deserialize, Serialize};

/// Circulation status of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CirculationStatus {
    #[default]
    Available,
    Borrowed,
}

impl CirculationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CirculationStatus::Available => "Available",
            CirculationStatus::Borrowed => "Borrowed",
        }
    }
}

impl std::fmt::Display for CirculationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a book leaves the shelf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutKind {
    /// Free loan
    Borrow,
    /// Paid loan, the book's rental fee is charged
    Rent,
}

impl std::fmt::Display for CheckoutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CheckoutKind::Borrow => "borrow",
            CheckoutKind::Rent => "rent",
        };
        write!(f, "{}", label)
    }
}
