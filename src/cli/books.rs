//! Catalog menu entries

use std::io::{BufRead, Write};

use rust_decimal::Decimal;

use crate::{
    error::AppResult,
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    AppState,
};

use super::Console;

const TOP_RATED_LIMIT: usize = 5;
const RECOMMENDATION_LIMIT: usize = 5;

fn show_books<R: BufRead, W: Write>(console: &mut Console<R, W>, books: &[&Book]) -> AppResult<()> {
    if books.is_empty() {
        return console.say("No books found.");
    }
    for book in books {
        console.say(book)?;
        console.say("-----------------------------")?;
    }
    Ok(())
}

fn read_new_book<R: BufRead, W: Write>(console: &mut Console<R, W>) -> AppResult<CreateBook> {
    let title = console.ask("Enter title: ")?;
    let author = console.ask("Enter author: ")?;
    let isbn = console.ask("Enter ISBN: ")?;
    let category = console.ask("Enter category: ")?;
    let series = console.ask_optional("Enter series (leave blank if none): ")?;
    let fee = console.ask_or("Enter rental fee (leave blank for 0): ", "rental fee", Decimal::ZERO)?;

    let mut request = CreateBook::new(title.trim(), author.trim(), isbn.trim(), category.trim())
        .with_rental_fee(fee);
    if let Some(series) = series {
        request = request.with_series(&series);
    }
    Ok(request)
}

/// 1. Add a Book
pub fn add_book<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let request = read_new_book(console)?;
    let book = state.services.catalog.add_book(&mut state.repository, request)?;
    console.say(format!("Book \"{}\" added successfully.", book.title()))
}

/// 2. Search by Title
pub fn search_by_title<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let title = console.ask("Enter title to search: ")?;
    let found = state.services.catalog.search_by_title(&state.repository, &title);
    show_books(console, &found)
}

/// 3. Search by Author
pub fn search_by_author<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let author = console.ask("Enter author to search: ")?;
    let found = state.services.catalog.search_by_author(&state.repository, &author);
    show_books(console, &found)
}

/// 4. Remove a Book
pub fn remove_book<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let isbn = console.ask("Enter ISBN of the book to remove: ")?;
    let book = state.services.catalog.remove_book(&mut state.repository, isbn.trim())?;
    console.say(format!("Book \"{}\" removed successfully.", book.title()))
}

/// 5. Display All Books
pub fn display_books<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let all: Vec<&Book> = state.repository.books.all().iter().collect();
    show_books(console, &all)
}

/// 6. Edit Book Details, blank answers keep the current value
pub fn edit_book<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let isbn = console.ask("Enter ISBN of the book to edit: ")?;
    state.repository.books.get(isbn.trim())?;

    let update = UpdateBook {
        title: console.ask_optional("Enter new title (leave blank to keep): ")?,
        author: console.ask_optional("Enter new author (leave blank to keep): ")?,
        category: console.ask_optional("Enter new category (leave blank to keep): ")?,
        series: console.ask_optional("Enter new series (leave blank to keep): ")?,
        rental_fee: match console.ask_optional("Enter new rental fee (leave blank to keep): ")? {
            Some(fee) => Some(super::parse(&fee, "rental fee")?),
            None => None,
        },
    };
    state.services.catalog.update_book(&mut state.repository, isbn.trim(), update)?;
    console.say("Book details updated successfully.")
}

/// 7. Sort Books by Title
pub fn sort_books<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    state.services.catalog.sort_by_title(&mut state.repository);
    console.say("Books sorted by title.")
}

/// 15. Recommend Books
pub fn recommend<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let user_id = console.ask("Enter user ID: ")?;
    let picks = state
        .services
        .catalog
        .recommend(&state.repository, user_id.trim(), RECOMMENDATION_LIMIT)?;
    console.say("\n=== Recommended Books ===")?;
    show_books(console, &picks)
}

/// 22. Search by Partial Match
pub fn search_partial<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let term = console.ask("Enter search term (title, author or ISBN): ")?;
    let found = state.services.catalog.search_partial(&state.repository, &term);
    show_books(console, &found)
}

/// 23. Rate a Book
pub fn rate_book<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let isbn = console.ask("Enter ISBN of the book to rate: ")?;
    let user_id = console.ask("Enter user ID: ")?;
    let score: u8 = console.ask_parsed("Enter rating: ", "rating")?;
    let average = state
        .services
        .catalog
        .rate(&mut state.repository, isbn.trim(), user_id.trim(), score)?;
    console.say(format!("Book rated successfully. Average rating: {:.2}", average))
}

/// 24. Display Top-Rated Books
pub fn top_rated<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let top = state.services.catalog.top_rated(&state.repository, TOP_RATED_LIMIT);
    console.say("\n=== Top-Rated Books ===")?;
    if top.is_empty() {
        return console.say("No rated books yet.");
    }
    for (rank, book) in top.iter().enumerate() {
        console.say(format!(
            "{}. {} by {} ({:.2}, {} rating(s))",
            rank + 1,
            book.title(),
            book.author(),
            book.average_rating(),
            book.ratings().len()
        ))?;
    }
    Ok(())
}

/// 25. Leave Feedback for a Book
pub fn leave_feedback<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let isbn = console.ask("Enter ISBN of the book: ")?;
    let feedback = console.ask("Enter your feedback: ")?;
    state
        .services
        .catalog
        .leave_feedback(&mut state.repository, isbn.trim(), &feedback)?;
    console.say("Feedback added successfully.")
}

/// 31. Donate a Book
pub fn donate_book<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let request = read_new_book(console)?;
    let donor = console.ask("Enter donor name: ")?;
    let book = state
        .services
        .catalog
        .donate_book(&mut state.repository, request, &donor)?;
    console.say(format!(
        "Book \"{}\" donated successfully. Thank you, {}!",
        book.title(),
        book.donor().unwrap_or_default()
    ))
}

/// 33. Advanced Search Filters, blank filters are ignored
pub fn advanced_search<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let query = BookQuery {
        title: console.ask_optional("Title contains (leave blank for any): ")?,
        author: console.ask_optional("Author contains (leave blank for any): ")?,
        category: console.ask_optional("Category (leave blank for any): ")?,
        available_only: console.confirm("Only available books? (y/n): ")?,
        min_rating: match console.ask_optional("Minimum average rating (leave blank for any): ")? {
            Some(rating) => Some(super::parse(&rating, "minimum rating")?),
            None => None,
        },
    };
    let found = state.services.catalog.advanced_search(&state.repository, &query);
    show_books(console, &found)
}

/// 43. Upload Book Cover Image
pub fn upload_cover<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let isbn = console.ask("Enter ISBN of the book to upload cover image: ")?;
    let path = console.ask("Enter file path for the cover image: ")?;
    state
        .services
        .catalog
        .set_cover_image(&mut state.repository, isbn.trim(), &path)?;
    console.say("Cover image uploaded successfully.")
}
