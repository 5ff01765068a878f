//! Statistics service

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::{
    models::{
        book::Book,
        report::{
            ActivityCell, Analytics, AvailabilityCell, InventorySummary, LibraryStats, ReportLine,
            StatEntry,
        },
    },
    repository::Repository,
};

fn is_overdue(book: &Book, now: DateTime<Utc>) -> bool {
    book.is_borrowed() && book.due_date().is_some_and(|due| due < now)
}

#[derive(Debug, Clone, Default)]
pub struct StatsService;

impl StatsService {
    pub fn new() -> Self {
        Self
    }

    /// Stock on the shelf versus out, per category
    pub fn inventory_summary(&self, repo: &Repository) -> InventorySummary {
        let books = repo.books.all();
        let total = books.len() as i64;
        let available = books.iter().filter(|b| !b.is_borrowed()).count() as i64;

        let mut categories: IndexMap<&str, i64> = IndexMap::new();
        for book in books {
            *categories.entry(book.category()).or_insert(0) += 1;
        }

        let availability_percentage = if total == 0 {
            0.0
        } else {
            available as f64 / total as f64 * 100.0
        };

        InventorySummary {
            total,
            available,
            borrowed: total - available,
            by_category: categories
                .into_iter()
                .map(|(label, value)| StatEntry {
                    label: label.to_string(),
                    value,
                })
                .collect(),
            availability_percentage,
        }
    }

    pub fn library_stats(&self, repo: &Repository, now: DateTime<Utc>) -> LibraryStats {
        let books = repo.books.all();
        LibraryStats {
            books: books.len() as i64,
            users: repo.users.len() as i64,
            active_loans: books.iter().filter(|b| b.is_borrowed()).count() as i64,
            overdue_loans: books.iter().filter(|b| is_overdue(b, now)).count() as i64,
            reservations: books.iter().map(|b| b.reservation_queue().len() as i64).sum(),
            ratings: books.iter().map(|b| b.ratings().len() as i64).sum(),
            feedbacks: books.iter().map(|b| b.feedbacks().len() as i64).sum(),
        }
    }

    pub fn analytics(&self, repo: &Repository, now: DateTime<Utc>) -> Analytics {
        let books = repo.books.all();

        let most_borrowed = books
            .iter()
            .filter(|b| b.borrow_count() > 0)
            .max_by_key(|b| b.borrow_count())
            .map(|b| (b.title().to_string(), b.borrow_count()));

        let most_active_user = repo
            .users
            .all()
            .iter()
            .filter(|u| !u.activity_log().is_empty())
            .max_by_key(|u| u.activity_log().len())
            .map(|u| (u.name().to_string(), u.activity_log().len()));

        let rated: Vec<f64> = books
            .iter()
            .filter(|b| !b.ratings().is_empty())
            .map(Book::average_rating)
            .collect();
        let average_rating = if rated.is_empty() {
            0.0
        } else {
            rated.iter().sum::<f64>() / rated.len() as f64
        };

        Analytics {
            most_borrowed,
            most_active_user,
            average_rating,
            overdue_loans: books.iter().filter(|b| is_overdue(b, now)).count() as i64,
            rental_value_out: books
                .iter()
                .filter(|b| b.is_borrowed())
                .map(Book::rental_fee)
                .sum::<Decimal>(),
        }
    }

    pub fn availability_heatmap(&self, repo: &Repository) -> Vec<AvailabilityCell> {
        repo.books
            .all()
            .iter()
            .map(|b| AvailabilityCell {
                title: b.title().to_string(),
                available: !b.is_borrowed(),
                borrow_count: b.borrow_count(),
            })
            .collect()
    }

    pub fn activity_heatmap(&self, repo: &Repository) -> Vec<ActivityCell> {
        repo.users
            .all()
            .iter()
            .map(|u| ActivityCell {
                name: u.name().to_string(),
                activities: u.activity_log().len(),
            })
            .collect()
    }

    /// Circulation report, one line per book in catalog order
    pub fn report(&self, repo: &Repository) -> Vec<ReportLine> {
        repo.books
            .all()
            .iter()
            .map(|b| ReportLine {
                isbn: b.isbn().to_string(),
                title: b.title().to_string(),
                status: b.status().to_string(),
                borrow_count: b.borrow_count(),
                queue_length: b.reservation_queue().len(),
            })
            .collect()
    }
}
