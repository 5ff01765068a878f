//! Circulation service: checkout, return, reservations and fines.
//!
//! Every operation locates the book and the user first and only mutates
//! once all preconditions hold, so a failed call leaves both records as
//! they were.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::{
    config::CirculationConfig,
    error::{AppError, AppResult},
    models::{
        book::{normalize_isbn, Book},
        enums::CheckoutKind,
        loan::{add_days, Checkout, Fine, ReturnReceipt},
    },
    repository::Repository,
};

/// Started days between `due` and `now`, 0 when not late
fn days_overdue(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let late = now.signed_duration_since(due);
    if late <= Duration::zero() {
        return 0;
    }
    let days = late.num_days();
    if late > Duration::days(days) {
        days + 1
    } else {
        days
    }
}

#[derive(Debug, Clone)]
pub struct CirculationService {
    loan_duration_days: i64,
    extension_days: i64,
    fine_per_day: Decimal,
}

impl CirculationService {
    pub fn new(config: &CirculationConfig) -> Self {
        Self {
            loan_duration_days: config.loan_duration_days,
            extension_days: config.extension_days,
            fine_per_day: config.fine_per_day,
        }
    }

    /// Default number of days added by `extend_due_date`
    pub fn extension_days(&self) -> i64 {
        self.extension_days
    }

    /// Lend a book for free
    pub fn borrow(&self, repo: &mut Repository, isbn: &str, user_id: &str, now: DateTime<Utc>) -> AppResult<Checkout> {
        self.checkout(repo, isbn, user_id, CheckoutKind::Borrow, now)
    }

    /// Lend a book against its rental fee
    pub fn rent(&self, repo: &mut Repository, isbn: &str, user_id: &str, now: DateTime<Utc>) -> AppResult<Checkout> {
        self.checkout(repo, isbn, user_id, CheckoutKind::Rent, now)
    }

    fn checkout(
        &self,
        repo: &mut Repository,
        isbn: &str,
        user_id: &str,
        kind: CheckoutKind,
        now: DateTime<Utc>,
    ) -> AppResult<Checkout> {
        let isbn = &normalize_isbn(isbn);
        let book = repo.books.get_mut(isbn)?;
        let user = repo.users.get_mut(user_id)?;

        if book.is_borrowed() {
            tracing::warn!("Circulation: {} refused, isbn={} is out", kind, isbn);
            return Err(AppError::InvalidState("Book is currently borrowed".to_string()));
        }
        if !user.is_membership_active(now) {
            return Err(AppError::InvalidState(format!(
                "Membership of user {} has expired",
                user_id
            )));
        }
        if let Some(head) = book.reserved_by() {
            if head != user_id {
                return Err(AppError::InvalidState(format!(
                    "Book is reserved by another user ({} waiting)",
                    book.reservation_queue().len()
                )));
            }
        }

        let due_date = add_days(now, self.loan_duration_days)
            .ok_or_else(|| AppError::Validation("Loan period is out of range".to_string()))?;

        if book.reserved_by() == Some(user_id) {
            book.remove_from_reservation_queue(user_id);
            user.fulfil_reservation(isbn);
        }

        book.set_is_borrowed(true);
        book.set_due_date(Some(due_date));
        book.set_fine_waived(false);
        book.increment_borrow_count();
        user.borrow_book(isbn);

        let fee = match kind {
            CheckoutKind::Rent => Some(book.rental_fee()),
            CheckoutKind::Borrow => None,
        };

        tracing::info!(
            "Circulation: {} isbn={} to user={} due {}",
            kind,
            isbn,
            user_id,
            due_date.format("%Y-%m-%d")
        );

        Ok(Checkout {
            isbn: isbn.to_string(),
            user_id: user_id.to_string(),
            kind,
            due_date,
            fee,
        })
    }

    /// Bring a book back. Both records change together; the fine owed at
    /// this instant is reported and the next user in line is notified.
    pub fn return_book(&self, repo: &mut Repository, isbn: &str, user_id: &str, now: DateTime<Utc>) -> AppResult<ReturnReceipt> {
        let isbn = &normalize_isbn(isbn);
        let book = repo.books.get_mut(isbn)?;
        let user = repo.users.get_mut(user_id)?;

        if !user.has_borrowed(isbn) {
            return Err(AppError::NoOp(format!(
                "User {} has not borrowed book {}",
                user_id, isbn
            )));
        }

        let fine = self.fine_for(book, Some(user_id), now)?;

        user.return_book(isbn);
        book.set_is_borrowed(false);
        book.set_due_date(None);
        book.set_fine_waived(false);

        let next_in_queue = book.reserved_by().map(str::to_string);
        let title = book.title().to_string();
        if let Some(ref next) = next_in_queue {
            if let Some(waiting) = repo.users.find_by_id_mut(next) {
                waiting.add_notification(&format!(
                    "\"{}\" (ISBN {}) is available for you to collect",
                    title, isbn
                ));
            }
        }

        if fine.is_due() {
            tracing::info!("Circulation: isbn={} returned late by {} day(s), fine {}", isbn, fine.days_overdue, fine.amount);
        } else {
            tracing::info!("Circulation: isbn={} returned by user={}", isbn, user_id);
        }

        Ok(ReturnReceipt {
            isbn: isbn.to_string(),
            user_id: user_id.to_string(),
            fine,
            next_in_queue,
        })
    }

    /// Join the book's waiting list. Returns the 1-based queue position.
    pub fn reserve(&self, repo: &mut Repository, isbn: &str, user_id: &str) -> AppResult<usize> {
        let isbn = &normalize_isbn(isbn);
        let book = repo.books.get_mut(isbn)?;
        let user = repo.users.get_mut(user_id)?;

        if book.is_queued(user_id) {
            return Err(AppError::InvalidState(format!(
                "User {} is already waiting for this book",
                user_id
            )));
        }
        if user.has_borrowed(isbn) {
            return Err(AppError::InvalidState(format!(
                "User {} already has this book",
                user_id
            )));
        }

        book.add_to_reservation_queue(user_id);
        user.reserve_book(isbn);
        let position = book.reservation_queue().len();
        tracing::info!("Circulation: user={} queued for isbn={} at position {}", user_id, isbn, position);
        Ok(position)
    }

    /// Leave the book's waiting list
    pub fn cancel_reservation(&self, repo: &mut Repository, isbn: &str, user_id: &str) -> AppResult<()> {
        let isbn = &normalize_isbn(isbn);
        let book = repo.books.get_mut(isbn)?;
        let user = repo.users.get_mut(user_id)?;

        if !book.remove_from_reservation_queue(user_id) {
            return Err(AppError::NoOp(format!(
                "User {} has no reservation for book {}",
                user_id, isbn
            )));
        }
        user.cancel_reservation(isbn);
        tracing::info!("Circulation: user={} left queue for isbn={}", user_id, isbn);
        Ok(())
    }

    /// ISBNs whose waiting list contains the user, computed from the queues
    pub fn reservations_of(&self, repo: &Repository, user_id: &str) -> AppResult<Vec<String>> {
        repo.users.get(user_id)?;
        Ok(repo
            .books
            .all()
            .iter()
            .filter(|b| b.is_queued(user_id))
            .map(|b| b.isbn().to_string())
            .collect())
    }

    /// Fine owed on a borrowed book as of `now`
    pub fn assess_fine(&self, repo: &Repository, isbn: &str, now: DateTime<Utc>) -> AppResult<Fine> {
        let isbn = &normalize_isbn(isbn);
        let book = repo.books.get(isbn)?;
        let holder = repo
            .users
            .all()
            .iter()
            .find(|u| u.has_borrowed(isbn))
            .map(|u| u.id());
        self.fine_for(book, holder, now)
    }

    fn fine_for(&self, book: &Book, user_id: Option<&str>, now: DateTime<Utc>) -> AppResult<Fine> {
        let due_date = match (book.is_borrowed(), book.due_date()) {
            (true, Some(due)) => due,
            _ => {
                return Err(AppError::InvalidState(format!(
                    "Book {} is not borrowed",
                    book.isbn()
                )))
            }
        };

        let days_overdue = days_overdue(due_date, now);
        let amount = if book.fine_waived() {
            Decimal::ZERO
        } else {
            self.fine_per_day * Decimal::from(days_overdue)
        };

        Ok(Fine {
            isbn: book.isbn().to_string(),
            user_id: user_id.map(str::to_string),
            due_date,
            days_overdue,
            amount,
            waived: book.fine_waived(),
        })
    }

    /// Cancel the fine for the current loan. The due date is kept.
    pub fn waive_fine(&self, repo: &mut Repository, isbn: &str) -> AppResult<()> {
        let book = repo.books.get_mut(isbn)?;
        if !book.is_borrowed() {
            return Err(AppError::InvalidState(format!("Book {} is not borrowed", isbn)));
        }
        book.set_fine_waived(true);
        tracing::info!("Circulation: fine waived for isbn={}", isbn);
        Ok(())
    }

    /// Push the due date of a borrowed book back by `days`
    pub fn extend_due_date(&self, repo: &mut Repository, isbn: &str, days: i64) -> AppResult<DateTime<Utc>> {
        if days <= 0 {
            return Err(AppError::Validation("Extension must be at least one day".to_string()));
        }
        let book = repo.books.get_mut(isbn)?;
        let due = match (book.is_borrowed(), book.due_date()) {
            (true, Some(due)) => due,
            _ => return Err(AppError::InvalidState(format!("Book {} is not borrowed", isbn))),
        };
        let new_due = add_days(due, days).ok_or_else(|| {
            AppError::Validation(format!("Cannot extend the due date by {} days", days))
        })?;
        book.set_due_date(Some(new_due));
        tracing::info!("Circulation: isbn={} now due {}", isbn, new_due.format("%Y-%m-%d"));
        Ok(new_due)
    }
}
