//! Circulation menu entries

use std::io::{BufRead, Write};

use chrono::Utc;

use crate::{error::AppResult, models::loan::Checkout, AppState};

use super::Console;

fn ask_book_and_user<R: BufRead, W: Write>(console: &mut Console<R, W>, action: &str) -> AppResult<(String, String)> {
    let isbn = console.ask(&format!("Enter ISBN of the book to {}: ", action))?;
    let user_id = console.ask("Enter user ID: ")?;
    Ok((isbn.trim().to_string(), user_id.trim().to_string()))
}

fn show_checkout<R: BufRead, W: Write>(console: &mut Console<R, W>, checkout: &Checkout) -> AppResult<()> {
    let due = checkout.due_date.format("%Y-%m-%d");
    match checkout.fee {
        Some(fee) => console.say(format!(
            "Book rented successfully. Rental Fee: ${}. Due on {}.",
            fee, due
        )),
        None => console.say(format!("Book borrowed successfully. Due on {}.", due)),
    }
}

/// 12. Borrow a Book
pub fn borrow<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let (isbn, user_id) = ask_book_and_user(console, "borrow")?;
    let checkout = state
        .services
        .circulation
        .borrow(&mut state.repository, &isbn, &user_id, Utc::now())?;
    show_checkout(console, &checkout)
}

/// 13. Return a Book
pub fn return_book<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let (isbn, user_id) = ask_book_and_user(console, "return")?;
    let receipt = state
        .services
        .circulation
        .return_book(&mut state.repository, &isbn, &user_id, Utc::now())?;

    console.say("Book returned successfully.")?;
    if receipt.fine.is_due() {
        console.say(format!(
            "Returned {} day(s) late. Fine due: ${}",
            receipt.fine.days_overdue, receipt.fine.amount
        ))?;
    }
    if let Some(next) = receipt.next_in_queue {
        console.say(format!("User {} has been notified that the book is available.", next))?;
    }
    Ok(())
}

/// 19. Reserve a Book
pub fn reserve<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let (isbn, user_id) = ask_book_and_user(console, "reserve")?;
    let position = state
        .services
        .circulation
        .reserve(&mut state.repository, &isbn, &user_id)?;
    console.say(format!("Book reserved successfully. Position in queue: {}", position))
}

/// 20. Cancel Reservation
pub fn cancel_reservation<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let (isbn, user_id) = ask_book_and_user(console, "cancel the reservation for")?;
    state
        .services
        .circulation
        .cancel_reservation(&mut state.repository, &isbn, &user_id)?;
    console.say("Reservation cancelled successfully.")
}

/// 21. Calculate Fine for Late Return
pub fn fine<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let isbn = console.ask("Enter ISBN of the book: ")?;
    let fine = state
        .services
        .circulation
        .assess_fine(&state.repository, isbn.trim(), Utc::now())?;

    console.say(format!("Due date: {}", fine.due_date.format("%Y-%m-%d")))?;
    if fine.waived {
        console.say("The fine for this loan has been waived.")
    } else if fine.days_overdue == 0 {
        console.say("The book is not overdue. No fine.")
    } else {
        console.say(format!(
            "Overdue by {} day(s). Fine: ${}",
            fine.days_overdue, fine.amount
        ))
    }
}

/// 27. Extend Due Date
pub fn extend_due_date<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let isbn = console.ask("Enter ISBN of the book: ")?;
    let default = state.services.circulation.extension_days();
    let days = console.ask_or(
        &format!("Enter number of days to extend (leave blank for {}): ", default),
        "number of days",
        default,
    )?;
    let due = state
        .services
        .circulation
        .extend_due_date(&mut state.repository, isbn.trim(), days)?;
    console.say(format!("Due date extended to {}.", due.format("%Y-%m-%d")))
}

/// 35. Add User to Reservation Queue
pub fn enqueue<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let (isbn, user_id) = ask_book_and_user(console, "queue for")?;
    let position = state
        .services
        .circulation
        .reserve(&mut state.repository, &isbn, &user_id)?;
    let queue = state.repository.books.get(&isbn)?.reservation_queue();
    console.say(format!("User added to reservation queue at position {}.", position))?;
    console.say(format!(
        "Current queue: {}",
        queue.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    ))
}

/// 38. Waive Fine
pub fn waive_fine<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let isbn = console.ask("Enter ISBN of the book: ")?;
    state
        .services
        .circulation
        .waive_fine(&mut state.repository, isbn.trim())?;
    console.say("Fine waived successfully.")
}

/// 40. Rent a Book
pub fn rent<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let (isbn, user_id) = ask_book_and_user(console, "rent")?;
    let checkout = state
        .services
        .circulation
        .rent(&mut state.repository, &isbn, &user_id, Utc::now())?;
    show_checkout(console, &checkout)
}
