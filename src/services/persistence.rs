//! Persistence service: JSON snapshots and CSV import/export

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        event::LibraryEvent,
        import_report::{ImportAction, ImportReport},
        user::User,
    },
    repository::Repository,
};

const SNAPSHOT_VERSION: u32 = 1;

const BOOKS_HEADER: [&str; 10] = [
    "isbn",
    "title",
    "author",
    "category",
    "series",
    "donor",
    "rental_fee",
    "is_borrowed",
    "borrow_count",
    "cover_image_path",
];

const USERS_HEADER: [&str; 4] = ["id", "name", "email", "membership_expiry"];

/// On-disk shape of the whole library
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    saved_at: DateTime<Utc>,
    books: Vec<Book>,
    users: Vec<User>,
    #[serde(default)]
    events: Vec<LibraryEvent>,
}

/// Quote a field when it holds a separator, a quote or a line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_row(fields: &[&str]) -> String {
    let mut row = fields.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(",");
    row.push('\n');
    row
}

/// Split CSV text into records. Quoted fields may contain separators,
/// doubled quotes and line breaks. Each record carries its starting line.
fn parse_csv(content: &str) -> AppResult<Vec<(usize, Vec<String>)>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                if !(record.len() == 1 && record[0].is_empty()) {
                    records.push((record_line, std::mem::take(&mut record)));
                }
                record.clear();
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(AppError::Validation(format!(
            "Unterminated quoted field starting on line {}",
            record_line
        )));
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push((record_line, record));
    }
    Ok(records)
}

fn malformed(file: &str, line: usize, reason: &str) -> AppError {
    AppError::Validation(format!("{} line {}: {}", file, line, reason))
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PersistenceService;

impl PersistenceService {
    pub fn new() -> Self {
        Self
    }

    /// Write every book, user and event to a JSON file
    pub fn save(&self, repo: &Repository, path: &Path) -> AppResult<()> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            books: repo.books.all().to_vec(),
            users: repo.users.all().to_vec(),
            events: repo.events.all().to_vec(),
        };
        let serialized = serde_json::to_string_pretty(&snapshot)?;
        fs::write(path, serialized)?;
        tracing::info!(
            "Persistence: saved {} book(s) and {} user(s) to {}",
            snapshot.books.len(),
            snapshot.users.len(),
            path.display()
        );
        Ok(())
    }

    /// Replace the repository contents with a saved snapshot. The
    /// repository is untouched if the file cannot be read or parsed.
    pub fn load(&self, repo: &mut Repository, path: &Path) -> AppResult<()> {
        let contents = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&contents)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(AppError::Validation(format!(
                "Snapshot version {} is newer than supported version {}",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        tracing::info!(
            "Persistence: loaded {} book(s) and {} user(s) saved at {}",
            snapshot.books.len(),
            snapshot.users.len(),
            snapshot.saved_at
        );
        repo.books.replace_all(snapshot.books);
        repo.users.replace_all(snapshot.users);
        repo.events.replace_all(snapshot.events);
        Ok(())
    }

    /// Export books and users as two CSV files
    pub fn export_csv(&self, repo: &Repository, books_path: &Path, users_path: &Path) -> AppResult<()> {
        let mut books = csv_row(&BOOKS_HEADER);
        for book in repo.books.all() {
            let fee = book.rental_fee().to_string();
            let borrowed = book.is_borrowed().to_string();
            let count = book.borrow_count().to_string();
            books.push_str(&csv_row(&[
                book.isbn(),
                book.title(),
                book.author(),
                book.category(),
                book.series().unwrap_or_default(),
                book.donor().unwrap_or_default(),
                &fee,
                &borrowed,
                &count,
                book.cover_image_path().unwrap_or_default(),
            ]));
        }
        fs::write(books_path, books)?;

        let mut users = csv_row(&USERS_HEADER);
        for user in repo.users.all() {
            let expiry = user
                .membership_expiry()
                .map(|e| e.to_rfc3339())
                .unwrap_or_default();
            users.push_str(&csv_row(&[user.id(), user.name(), user.email(), &expiry]));
        }
        fs::write(users_path, users)?;

        tracing::info!(
            "Persistence: exported CSV to {} and {}",
            books_path.display(),
            users_path.display()
        );
        Ok(())
    }

    /// Import books and users from CSV. Rows whose key already exists are
    /// skipped. Nothing is added if any row is malformed.
    pub fn import_csv(
        &self,
        repo: &mut Repository,
        books_path: &Path,
        users_path: &Path,
    ) -> AppResult<(ImportReport, ImportReport)> {
        let (books, notes) = self.read_books(books_path)?;
        let users = self.read_users(users_path)?;

        let mut books_report = ImportReport::default();
        books_report.warnings.extend(notes);
        for book in books {
            if repo.books.find_by_isbn(book.isbn()).is_some() {
                books_report.warnings.push(format!("Book {} already exists", book.isbn()));
                books_report.record(ImportAction::SkippedDuplicate);
            } else {
                repo.books.add(book)?;
                books_report.record(ImportAction::Created);
            }
        }

        let mut users_report = ImportReport::default();
        for user in users {
            if repo.users.find_by_id(user.id()).is_some() {
                users_report.warnings.push(format!("User {} already exists", user.id()));
                users_report.record(ImportAction::SkippedDuplicate);
            } else {
                repo.users.add(user)?;
                users_report.record(ImportAction::Created);
            }
        }

        tracing::info!(
            "Persistence: CSV import created {} book(s), {} user(s)",
            books_report.created,
            users_report.created
        );
        Ok((books_report, users_report))
    }

    /// The CSV carries no holder or due date, so a row marked borrowed is
    /// restored to the shelf and reported
    fn read_books(&self, path: &Path) -> AppResult<(Vec<Book>, Vec<String>)> {
        let file = path.display().to_string();
        let content = fs::read_to_string(path)?;
        let mut books = Vec::new();
        let mut notes = Vec::new();

        for (line, fields) in parse_csv(&content)?.into_iter().skip(1) {
            let [isbn, title, author, category, series, donor, fee, borrowed, count, cover]: [String; 10] =
                fields
                    .try_into()
                    .map_err(|_| malformed(&file, line, "expected 10 fields"))?;

            if isbn.is_empty() || title.is_empty() {
                return Err(malformed(&file, line, "isbn and title are required"));
            }
            let fee: Decimal = fee
                .parse()
                .map_err(|_| malformed(&file, line, "invalid rental_fee"))?;
            if fee < Decimal::ZERO {
                return Err(malformed(&file, line, "negative rental_fee"));
            }
            let borrowed: bool = borrowed
                .parse()
                .map_err(|_| malformed(&file, line, "invalid is_borrowed"))?;
            let count: u32 = count
                .parse()
                .map_err(|_| malformed(&file, line, "invalid borrow_count"))?;

            let mut book = Book::new(&title, &author, &isbn, &category).with_borrow_count(count);
            if borrowed {
                notes.push(format!(
                    "Book {} was marked borrowed without a holder, imported as available",
                    book.isbn()
                ));
            }
            book.set_series(optional(&series));
            book.set_donor(optional(&donor));
            book.set_rental_fee(fee);
            book.set_cover_image_path(optional(&cover));
            books.push(book);
        }
        Ok((books, notes))
    }

    fn read_users(&self, path: &Path) -> AppResult<Vec<User>> {
        let file = path.display().to_string();
        let content = fs::read_to_string(path)?;
        let mut users = Vec::new();

        for (line, fields) in parse_csv(&content)?.into_iter().skip(1) {
            let [id, name, email, expiry]: [String; 4] = fields
                .try_into()
                .map_err(|_| malformed(&file, line, "expected 4 fields"))?;

            if id.is_empty() {
                return Err(malformed(&file, line, "id is required"));
            }
            let expiry = match optional(&expiry) {
                Some(raw) => Some(
                    DateTime::parse_from_rfc3339(&raw)
                        .map_err(|_| malformed(&file, line, "invalid membership_expiry"))?
                        .with_timezone(&Utc),
                ),
                None => None,
            };

            let mut user = User::new(&name, &id, &email);
            user.set_membership_expiry(expiry);
            users.push(user);
        }
        Ok(users)
    }
}
