//! Report and statistics types

use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatEntry {
    /// Label
    pub label: String,
    /// Value
    pub value: i64,
}

/// Inventory summary
#[derive(Debug, Clone, Serialize)]
pub struct InventorySummary {
    pub total: i64,
    pub available: i64,
    pub borrowed: i64,
    /// Books per category, in order of first appearance
    pub by_category: Vec<StatEntry>,
    /// Share of the catalog on the shelf, 0 for an empty catalog
    pub availability_percentage: f64,
}

/// Library-wide counters
#[derive(Debug, Clone, Serialize)]
pub struct LibraryStats {
    pub books: i64,
    pub users: i64,
    /// Books currently out
    pub active_loans: i64,
    pub overdue_loans: i64,
    /// Queue entries across all books
    pub reservations: i64,
    pub ratings: i64,
    pub feedbacks: i64,
}

/// Derived indicators
#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
    /// Title and borrow count of the most borrowed book
    pub most_borrowed: Option<(String, u32)>,
    /// Name and activity count of the most active user
    pub most_active_user: Option<(String, usize)>,
    /// Mean of the averages of rated books
    pub average_rating: f64,
    pub overdue_loans: i64,
    /// Total rental fee of the books currently out
    pub rental_value_out: Decimal,
}

/// One row of the book availability heatmap
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityCell {
    pub title: String,
    pub available: bool,
    pub borrow_count: u32,
}

/// One row of the user activity heatmap
#[derive(Debug, Clone, Serialize)]
pub struct ActivityCell {
    pub name: String,
    pub activities: usize,
}

/// One line of the circulation report
#[derive(Debug, Clone, Serialize)]
pub struct ReportLine {
    pub isbn: String,
    pub title: String,
    pub status: String,
    pub borrow_count: u32,
    pub queue_length: usize,
}
