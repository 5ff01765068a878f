//! User (patron) model and related types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::loan::add_days;

/// Library member record. Books are referenced by ISBN only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    name: String,
    id: String,
    email: String,
    /// None when no expiry was ever set
    #[serde(default)]
    membership_expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    borrowed_books: Vec<String>,
    #[serde(default)]
    reserved_books: Vec<String>,
    #[serde(default)]
    wishlist: Vec<String>,
    #[serde(default)]
    activity_log: Vec<String>,
    #[serde(default)]
    notifications: Vec<String>,
}

/// Remove the first occurrence of `isbn`, reporting whether it was there
fn remove_isbn(list: &mut Vec<String>, isbn: &str) -> bool {
    match list.iter().position(|entry| entry == isbn) {
        Some(pos) => {
            list.remove(pos);
            true
        }
        None => false,
    }
}

impl User {
    pub fn new(name: &str, id: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            id: id.to_string(),
            email: email.to_string(),
            membership_expiry: None,
            borrowed_books: Vec::new(),
            reserved_books: Vec::new(),
            wishlist: Vec::new(),
            activity_log: Vec::new(),
            notifications: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn membership_expiry(&self) -> Option<DateTime<Utc>> {
        self.membership_expiry
    }

    pub fn borrowed_books(&self) -> &[String] {
        &self.borrowed_books
    }

    pub fn reserved_books(&self) -> &[String] {
        &self.reserved_books
    }

    pub fn wishlist(&self) -> &[String] {
        &self.wishlist
    }

    pub fn activity_log(&self) -> &[String] {
        &self.activity_log
    }

    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    pub fn has_borrowed(&self, isbn: &str) -> bool {
        self.borrowed_books.iter().any(|b| b == isbn)
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn set_email(&mut self, email: &str) {
        self.email = email.to_string();
    }

    pub fn set_membership_expiry(&mut self, expiry: Option<DateTime<Utc>>) {
        self.membership_expiry = expiry;
    }

    /// A user without an expiry date never lapses
    pub fn is_membership_active(&self, now: DateTime<Utc>) -> bool {
        self.membership_expiry.map_or(true, |expiry| expiry > now)
    }

    /// Push the expiry `days` past the later of now and the current expiry.
    /// Returns `None` and leaves the record alone when the date overflows.
    pub fn extend_membership(&mut self, days: i64, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let base = self.membership_expiry.filter(|e| *e > now).unwrap_or(now);
        let expiry = add_days(base, days)?;
        self.membership_expiry = Some(expiry);
        self.activity_log
            .push(format!("Membership extended until {}", expiry.format("%Y-%m-%d")));
        Some(expiry)
    }

    pub fn borrow_book(&mut self, isbn: &str) {
        self.borrowed_books.push(isbn.to_string());
        self.activity_log.push(format!("Borrowed book with ISBN: {}", isbn));
    }

    /// Returns false, without logging, when the book was not borrowed
    pub fn return_book(&mut self, isbn: &str) -> bool {
        if !remove_isbn(&mut self.borrowed_books, isbn) {
            return false;
        }
        self.activity_log.push(format!("Returned book with ISBN: {}", isbn));
        true
    }

    pub fn reserve_book(&mut self, isbn: &str) {
        self.reserved_books.push(isbn.to_string());
        self.activity_log.push(format!("Reserved book with ISBN: {}", isbn));
    }

    /// Returns false, without logging, when there was no such reservation
    pub fn cancel_reservation(&mut self, isbn: &str) -> bool {
        if !remove_isbn(&mut self.reserved_books, isbn) {
            return false;
        }
        self.activity_log
            .push(format!("Cancelled reservation for book with ISBN: {}", isbn));
        true
    }

    /// Turn a reservation into a loan once the user collects the book
    pub(crate) fn fulfil_reservation(&mut self, isbn: &str) -> bool {
        if !remove_isbn(&mut self.reserved_books, isbn) {
            return false;
        }
        self.activity_log
            .push(format!("Collected reserved book with ISBN: {}", isbn));
        true
    }

    pub fn add_to_wishlist(&mut self, isbn: &str) {
        self.wishlist.push(isbn.to_string());
        self.activity_log
            .push(format!("Added book with ISBN: {} to wishlist", isbn));
    }

    /// Returns false, without logging, when the book was not wished for
    pub fn remove_from_wishlist(&mut self, isbn: &str) -> bool {
        if !remove_isbn(&mut self.wishlist, isbn) {
            return false;
        }
        self.activity_log
            .push(format!("Removed book with ISBN: {} from wishlist", isbn));
        true
    }

    pub fn add_notification(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }

    /// Drop every trace of a book leaving the catalog
    pub(crate) fn forget_book(&mut self, isbn: &str) {
        self.wishlist.retain(|b| b != isbn);
        self.reserved_books.retain(|b| b != isbn);
    }
}

fn write_isbn_list(f: &mut fmt::Formatter<'_>, label: &str, list: &[String]) -> fmt::Result {
    if list.is_empty() {
        writeln!(f, "{}: None", label)
    } else {
        writeln!(f, "{}: {}", label, list.join(" "))
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "User Name: {}, ID: {}, Email: {}", self.name, self.id, self.email)?;
        write_isbn_list(f, "Borrowed Books", &self.borrowed_books)?;
        write_isbn_list(f, "Reserved Books", &self.reserved_books)?;
        write_isbn_list(f, "Wishlist", &self.wishlist)?;
        writeln!(f, "Notifications:")?;
        if self.notifications.is_empty() {
            writeln!(f, "No notifications.")?;
        }
        for notification in &self.notifications {
            writeln!(f, "- {}", notification)?;
        }
        writeln!(f, "Activity Log:")?;
        for entry in &self.activity_log {
            writeln!(f, "- {}", entry)?;
        }
        if let Some(expiry) = self.membership_expiry {
            write!(f, "Membership Expiry: {}", expiry.format("%Y-%m-%d"))?;
        }
        Ok(())
    }
}

/// Create user request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "User ID cannot be empty"))]
    pub id: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

impl CreateUser {
    /// Surrounding whitespace is dropped so a blank field fails validation
    pub fn new(name: &str, id: &str, email: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            id: id.trim().to_string(),
            email: email.trim().to_string(),
        }
    }
}

/// Update profile request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// Membership state as of a given instant
#[derive(Debug, Clone, Serialize)]
pub struct MembershipStatus {
    pub user_id: String,
    pub expiry: Option<DateTime<Utc>>,
    pub active: bool,
}
