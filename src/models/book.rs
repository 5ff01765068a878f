//! Book (catalog entry) model and related types

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::enums::CirculationStatus;

static ISBN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d{9}[\dXx]|\d{13})$").expect("ISBN pattern compiles"));

/// Strip separators from an ISBN ("978-2-07-040850-4" -> "9782070408504")
pub fn normalize_isbn(isbn: &str) -> String {
    isbn.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

fn validate_isbn(isbn: &str) -> Result<(), ValidationError> {
    if ISBN_PATTERN.is_match(&normalize_isbn(isbn)) {
        Ok(())
    } else {
        Err(ValidationError::new("isbn").with_message("ISBN must have 10 or 13 digits".into()))
    }
}

pub(crate) fn validate_fee(fee: &Decimal) -> Result<(), ValidationError> {
    if fee.is_sign_negative() && !fee.is_zero() {
        return Err(ValidationError::new("rental_fee").with_message("Rental fee cannot be negative".into()));
    }
    Ok(())
}

/// Full book record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    title: String,
    author: String,
    isbn: String,
    category: String,
    #[serde(default)]
    series: Option<String>,
    #[serde(default)]
    donor: Option<String>,
    #[serde(default)]
    is_borrowed: bool,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
    /// Users waiting for the book, head first
    #[serde(default)]
    reservation_queue: VecDeque<String>,
    /// Fine waiver for the current loan
    #[serde(default)]
    fine_waived: bool,
    #[serde(default)]
    rental_fee: Decimal,
    /// Score per user id
    #[serde(default)]
    ratings: IndexMap<String, u8>,
    #[serde(default)]
    feedbacks: Vec<String>,
    #[serde(default)]
    borrow_count: u32,
    #[serde(default)]
    cover_image_path: Option<String>,
}

impl Book {
    /// The ISBN is stored without separators
    pub fn new(title: &str, author: &str, isbn: &str, category: &str) -> Self {
        Self {
            title: title.to_string(),
            author: author.to_string(),
            isbn: normalize_isbn(isbn),
            category: category.to_string(),
            series: None,
            donor: None,
            is_borrowed: false,
            due_date: None,
            reservation_queue: VecDeque::new(),
            fine_waived: false,
            rental_fee: Decimal::ZERO,
            ratings: IndexMap::new(),
            feedbacks: Vec::new(),
            borrow_count: 0,
            cover_image_path: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn series(&self) -> Option<&str> {
        self.series.as_deref()
    }

    pub fn donor(&self) -> Option<&str> {
        self.donor.as_deref()
    }

    pub fn is_borrowed(&self) -> bool {
        self.is_borrowed
    }

    pub fn status(&self) -> CirculationStatus {
        if self.is_borrowed {
            CirculationStatus::Borrowed
        } else {
            CirculationStatus::Available
        }
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// User at the head of the reservation queue
    pub fn reserved_by(&self) -> Option<&str> {
        self.reservation_queue.front().map(String::as_str)
    }

    pub fn reservation_queue(&self) -> &VecDeque<String> {
        &self.reservation_queue
    }

    pub fn is_queued(&self, user_id: &str) -> bool {
        self.reservation_queue.iter().any(|id| id == user_id)
    }

    pub fn fine_waived(&self) -> bool {
        self.fine_waived
    }

    pub fn rental_fee(&self) -> Decimal {
        self.rental_fee
    }

    pub fn ratings(&self) -> &IndexMap<String, u8> {
        &self.ratings
    }

    /// Mean of all stored ratings, 0 when unrated
    pub fn average_rating(&self) -> f64 {
        if self.ratings.is_empty() {
            return 0.0;
        }
        let total: u32 = self.ratings.values().map(|&score| u32::from(score)).sum();
        f64::from(total) / self.ratings.len() as f64
    }

    pub fn feedbacks(&self) -> &[String] {
        &self.feedbacks
    }

    pub fn borrow_count(&self) -> u32 {
        self.borrow_count
    }

    pub fn cover_image_path(&self) -> Option<&str> {
        self.cover_image_path.as_deref()
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn set_author(&mut self, author: &str) {
        self.author = author.to_string();
    }

    pub fn set_category(&mut self, category: &str) {
        self.category = category.to_string();
    }

    pub fn set_series(&mut self, series: Option<String>) {
        self.series = series.filter(|s| !s.is_empty());
    }

    pub fn set_donor(&mut self, donor: Option<String>) {
        self.donor = donor.filter(|d| !d.is_empty());
    }

    pub fn set_is_borrowed(&mut self, borrowed: bool) {
        self.is_borrowed = borrowed;
    }

    pub fn set_due_date(&mut self, due_date: Option<DateTime<Utc>>) {
        self.due_date = due_date;
    }

    pub fn set_fine_waived(&mut self, waived: bool) {
        self.fine_waived = waived;
    }

    pub fn increment_borrow_count(&mut self) {
        self.borrow_count = self.borrow_count.saturating_add(1);
    }

    pub fn set_rental_fee(&mut self, fee: Decimal) {
        self.rental_fee = fee;
    }

    pub fn set_cover_image_path(&mut self, path: Option<String>) {
        self.cover_image_path = path.filter(|p| !p.is_empty());
    }

    /// Store a user's score, replacing any earlier one from the same user
    pub fn add_rating(&mut self, user_id: &str, score: u8) {
        self.ratings.insert(user_id.to_string(), score);
    }

    pub fn add_feedback(&mut self, feedback: &str) {
        self.feedbacks.push(feedback.to_string());
    }

    /// Append to the reservation queue without any checks
    pub fn add_to_reservation_queue(&mut self, user_id: &str) {
        self.reservation_queue.push_back(user_id.to_string());
    }

    /// Drop a user from the queue, returns whether they were queued
    pub fn remove_from_reservation_queue(&mut self, user_id: &str) -> bool {
        match self.reservation_queue.iter().position(|id| id == user_id) {
            Some(pos) => {
                self.reservation_queue.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Restore the lifetime checkout count, used by importers
    pub(crate) fn with_borrow_count(mut self, borrow_count: u32) -> Self {
        self.borrow_count = borrow_count;
        self
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Title: {}, Author: {}, ISBN: {}, Status: {}, Borrow Count: {}, Category: {}, Average Rating: {:.2}",
            self.title,
            self.author,
            self.isbn,
            self.status(),
            self.borrow_count,
            self.category,
            self.average_rating()
        )?;
        if let Some(user_id) = self.reserved_by() {
            write!(f, ", Reserved By: {}", user_id)?;
        }
        if let Some(due) = self.due_date {
            write!(f, ", Due Date: {}", due.format("%Y-%m-%d %H:%M"))?;
        }
        if let Some(ref donor) = self.donor {
            write!(f, ", Donated By: {}", donor)?;
        }
        if let Some(ref series) = self.series {
            write!(f, ", Series: {}", series)?;
        }
        if self.rental_fee > Decimal::ZERO {
            write!(f, ", Rental Fee: ${}", self.rental_fee)?;
        }
        if let Some(ref path) = self.cover_image_path {
            write!(f, ", Cover Image: {}", path)?;
        }
        Ok(())
    }
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author cannot be empty"))]
    pub author: String,
    #[validate(custom(function = "validate_isbn"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "Category cannot be empty"))]
    pub category: String,
    pub series: Option<String>,
    #[validate(custom(function = "validate_fee"))]
    pub rental_fee: Decimal,
}

impl CreateBook {
    pub fn new(title: &str, author: &str, isbn: &str, category: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            author: author.trim().to_string(),
            isbn: isbn.trim().to_string(),
            category: category.trim().to_string(),
            series: None,
            rental_fee: Decimal::ZERO,
        }
    }

    /// Strip surrounding whitespace so blank fields fail validation
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
            category: self.category.trim().to_string(),
            series: self.series.map(|s| s.trim().to_string()),
            rental_fee: self.rental_fee,
        }
    }

    pub fn with_rental_fee(mut self, fee: Decimal) -> Self {
        self.rental_fee = fee;
        self
    }

    pub fn with_series(mut self, series: &str) -> Self {
        self.series = Some(series.to_string());
        self
    }

    pub fn into_book(self) -> Book {
        let mut book = Book::new(&self.title, &self.author, &self.isbn, &self.category);
        book.set_series(self.series);
        book.set_rental_fee(self.rental_fee);
        book
    }
}

/// Update book request; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Author cannot be empty"))]
    pub author: Option<String>,
    #[validate(length(min = 1, message = "Category cannot be empty"))]
    pub category: Option<String>,
    pub series: Option<String>,
    /// Checked with `validate_fee` by the catalog service
    pub rental_fee: Option<Decimal>,
}

/// Advanced search filters, all conjunctive
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub available_only: bool,
    pub min_rating: Option<f64>,
}
