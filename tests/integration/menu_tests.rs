//! Scripted sessions through the text menu

use std::io::Cursor;

use library_desk::{
    cli::{self, Console},
    config::AppConfig,
    AppState,
};

fn session(state: &mut AppState, script: &[&str]) -> String {
    let mut input = script.join("\n");
    input.push('\n');
    let mut console = Console::new(Cursor::new(input.into_bytes()), Vec::new());
    cli::run(state, &mut console).expect("menu loop");
    String::from_utf8(console.into_output()).expect("utf8 output")
}

#[test]
fn test_rent_flow_through_menu() {
    let mut state = AppState::new(AppConfig::default());
    let out = session(
        &mut state,
        &[
            "10", "Alice", "U1", "alice@example.org",
            "10", "Bob", "U2", "bob@example.org",
            "1", "Dune", "Frank Herbert", "978-0-441-01359-3", "SF", "", "3.50",
            "40", "978-0-441-01359-3", "U1",
            "40", "978-0-441-01359-3", "U2",
            "13", "978-0-441-01359-3", "U1",
            "44",
        ],
    );

    assert!(out.contains("User \"Alice\" added successfully."));
    assert!(out.contains("Book \"Dune\" added successfully."));
    assert!(out.contains("Book rented successfully. Rental Fee: $3.50."));
    assert!(out.contains("Error: Book is currently borrowed"));
    assert!(out.contains("Book returned successfully."));
    assert!(out.ends_with("Exiting the program. Goodbye!\n"));

    let book = state.repository.books.get("9780441013593").expect("book");
    assert!(!book.is_borrowed());
    assert_eq!(book.borrow_count(), 1);
    assert!(state.repository.users.get("U2").expect("user").borrowed_books().is_empty());
}

#[test]
fn test_isbn_as_typed_reaches_the_book() {
    let mut state = AppState::new(AppConfig::default());
    let out = session(
        &mut state,
        &[
            "10", "Alice", "U1", "alice@example.org",
            "1", "Dune", "Frank Herbert", "978-0-441-01359-3", "SF", "", "",
            "12", "978-0-441-01359-3", "U1",
            "13", "978-0-441-01359-3", "U1",
            "23", "978-0-441-01359-3", "U1", "5",
            "4", "978-0-441-01359-3",
            "44",
        ],
    );

    assert!(out.contains("Book borrowed successfully."));
    assert!(out.contains("Book returned successfully."));
    assert!(out.contains("Book rated successfully."));
    assert!(out.contains("Book \"Dune\" removed successfully."));
    assert!(!out.contains("Error:"));
    assert!(state.repository.books.is_empty());
}

#[test]
fn test_huge_extension_is_refused() {
    let mut state = AppState::new(AppConfig::default());
    let out = session(
        &mut state,
        &[
            "10", "Alice", "U1", "alice@example.org",
            "1", "Dune", "Frank Herbert", "9780441013593", "SF", "", "",
            "12", "9780441013593", "U1",
            "27", "9780441013593", "9223372036854775807",
            "27", "9780441013593", "100000000",
            "27", "9780441013593", "7",
            "44",
        ],
    );

    assert!(out.contains("Error: Validation error: Cannot extend the due date by 9223372036854775807 days"));
    assert!(out.contains("Error: Validation error: Cannot extend the due date by 100000000 days"));
    assert!(out.contains("Due date extended to"));
    assert!(out.ends_with("Exiting the program. Goodbye!\n"));
}

#[test]
fn test_blank_user_fields_are_refused() {
    let mut state = AppState::new(AppConfig::default());
    let out = session(
        &mut state,
        &[
            "10", "Alice", "   ", "alice@example.org",
            "10", "   ", "U1", "alice@example.org",
            "1", "  ", "Frank Herbert", "9780441013593", "SF", "", "",
            "44",
        ],
    );

    assert_eq!(out.matches("Error: Validation error").count(), 3);
    assert!(state.repository.users.is_empty());
    assert!(state.repository.books.is_empty());
}

#[test]
fn test_event_listing_after_add() {
    let mut state = AppState::new(AppConfig::default());
    let out = session(
        &mut state,
        &[
            "37", "Reading Club", "2999-01-01", "",
            "37", "Past Fair", "2000-01-01", "Old news",
            "44",
        ],
    );

    assert!(out.contains("Event \"Reading Club\" added successfully."));
    assert!(out.contains("Scheduled events: 1 (1 upcoming)"));
    assert!(out.contains("Scheduled events: 2 (1 upcoming)"));
}

#[test]
fn test_errors_do_not_end_the_session() {
    let mut state = AppState::new(AppConfig::default());
    let out = session(
        &mut state,
        &[
            "4", "0000000000",
            "1", "Emma", "Jane Austen", "12", "Classic", "", "",
            "23", "0000000000", "U1", "five",
            "5",
        ],
    );

    assert!(out.contains("Error: Not found"));
    assert!(out.contains("Error: Validation error"));
    assert!(out.contains("Invalid rating"));
    assert!(out.contains("No books found."));
    assert!(state.repository.books.is_empty());
}

#[test]
fn test_save_and_load_through_menu() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("desk.json");
    let path = path.to_str().expect("utf8 path");

    let mut state = AppState::new(AppConfig::default());
    session(
        &mut state,
        &[
            "1", "Dune", "Frank Herbert", "9780441013593", "SF", "Dune Chronicles", "",
            "8", path,
            "44",
        ],
    );

    let mut fresh = AppState::new(AppConfig::default());
    let out = session(&mut fresh, &["9", path, "44"]);
    assert!(out.contains("Loaded 1 book(s) and 0 user(s)"));
    let book = fresh.repository.books.get("9780441013593").expect("book");
    assert_eq!(book.series(), Some("Dune Chronicles"));
}

#[test]
fn test_reports_on_empty_library() {
    let mut state = AppState::new(AppConfig::default());
    let out = session(&mut state, &["41", "14", "24", "39"]);
    assert!(out.contains("Total Books: 0"));
    assert!(out.contains("Availability Percentage: 0.0%"));
    assert!(out.contains("No books in the catalog."));
    assert!(out.contains("No rated books yet."));
    assert!(out.contains("Most Borrowed Book: none yet"));
}
