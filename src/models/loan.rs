//! Loan (checkout) and fine types

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::CheckoutKind;

/// `from` moved forward by whole days, `None` when the result is out of range
pub fn add_days(from: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    Duration::try_days(days).and_then(|delta| from.checked_add_signed(delta))
}

/// Outcome of a successful borrow or rent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Checkout {
    pub isbn: String,
    pub user_id: String,
    pub kind: CheckoutKind,
    pub due_date: DateTime<Utc>,
    /// Rental fee charged, only for rentals
    pub fee: Option<Decimal>,
}

/// Fine assessed against a borrowed book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fine {
    pub isbn: String,
    pub user_id: Option<String>,
    pub due_date: DateTime<Utc>,
    pub days_overdue: i64,
    pub amount: Decimal,
    pub waived: bool,
}

impl Fine {
    pub fn is_due(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

/// Outcome of a return
#[derive(Debug, Clone, Serialize)]
pub struct ReturnReceipt {
    pub isbn: String,
    pub user_id: String,
    pub fine: Fine,
    /// User notified that the book is waiting for them
    pub next_in_queue: Option<String>,
}
