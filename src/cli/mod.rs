//! Text menu over standard input/output
//!
//! Each menu entry maps to one handler in the submodules. Handlers prompt
//! through a [`Console`], call the services and print the outcome. Errors
//! are reported and the menu is shown again; only end of input or entry
//! 44 leaves the loop.

pub mod books;
pub mod circulation;
pub mod events;
pub mod stats;
pub mod storage;
pub mod users;

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::{
    error::{AppError, AppResult},
    AppState,
};

pub const MENU_ITEMS: [&str; 44] = [
    "Add a Book",
    "Search by Title",
    "Search by Author",
    "Remove a Book",
    "Display All Books",
    "Edit Book Details",
    "Sort Books by Title",
    "Save to File",
    "Load from File",
    "Add a User",
    "Display All Users",
    "Borrow a Book",
    "Return a Book",
    "Generate Report",
    "Recommend Books",
    "Display Library Statistics",
    "Export Data to CSV",
    "Import Data from CSV",
    "Reserve a Book",
    "Cancel Reservation",
    "Calculate Fine for Late Return",
    "Search by Partial Match",
    "Rate a Book",
    "Display Top-Rated Books",
    "Leave Feedback for a Book",
    "Display Book Availability Heatmap",
    "Extend Due Date",
    "Check Membership Expiry",
    "Add Book to Wishlist",
    "Remove Book from Wishlist",
    "Donate a Book",
    "Send Notification",
    "Advanced Search Filters",
    "User Dashboard",
    "Add User to Reservation Queue",
    "Update User Profile",
    "Add Library Event",
    "Waive Fine",
    "Display Library Analytics",
    "Rent a Book",
    "Display Library Inventory Summary",
    "Display User Activity Heatmap",
    "Upload Book Cover Image",
    "Exit",
];

/// What the loop does after a menu entry ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Line-oriented prompt reader and printer
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Print one line
    pub fn say(&mut self, text: impl Display) -> AppResult<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    /// Prompt and read one line without its line ending. End of input is
    /// reported as an `UnexpectedEof` I/O error.
    pub fn ask(&mut self, label: &str) -> AppResult<String> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "end of input").into());
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }

    /// Prompt for a value that may be left blank
    pub fn ask_optional(&mut self, label: &str) -> AppResult<Option<String>> {
        let answer = self.ask(label)?;
        let answer = answer.trim();
        Ok(if answer.is_empty() {
            None
        } else {
            Some(answer.to_string())
        })
    }

    /// Prompt for a value of type `T`
    pub fn ask_parsed<T: FromStr>(&mut self, label: &str, what: &str) -> AppResult<T> {
        let answer = self.ask(label)?;
        parse(&answer, what)
    }

    /// Prompt for a value of type `T`, `default` when left blank
    pub fn ask_or<T: FromStr>(&mut self, label: &str, what: &str, default: T) -> AppResult<T> {
        match self.ask_optional(label)? {
            Some(answer) => parse(&answer, what),
            None => Ok(default),
        }
    }

    /// Yes/no question, anything but `y`/`yes` is a no
    pub fn confirm(&mut self, label: &str) -> AppResult<bool> {
        let answer = self.ask(label)?;
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }
}

fn parse<T: FromStr>(raw: &str, what: &str) -> AppResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid {}: {:?}", what, raw.trim())))
}

fn is_end_of_input(err: &AppError) -> bool {
    matches!(err, AppError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
}

pub fn print_menu<R: BufRead, W: Write>(console: &mut Console<R, W>) -> AppResult<()> {
    console.say("\n=== Library Management System ===")?;
    for (index, item) in MENU_ITEMS.iter().enumerate() {
        console.say(format!("{}. {}", index + 1, item))?;
    }
    Ok(())
}

/// Run one menu entry
pub fn dispatch<R: BufRead, W: Write>(
    state: &mut AppState,
    console: &mut Console<R, W>,
    choice: u32,
) -> AppResult<Flow> {
    match choice {
        1 => books::add_book(state, console)?,
        2 => books::search_by_title(state, console)?,
        3 => books::search_by_author(state, console)?,
        4 => books::remove_book(state, console)?,
        5 => books::display_books(state, console)?,
        6 => books::edit_book(state, console)?,
        7 => books::sort_books(state, console)?,
        8 => storage::save(state, console)?,
        9 => storage::load(state, console)?,
        10 => users::add_user(state, console)?,
        11 => users::display_users(state, console)?,
        12 => circulation::borrow(state, console)?,
        13 => circulation::return_book(state, console)?,
        14 => stats::report(state, console)?,
        15 => books::recommend(state, console)?,
        16 => stats::statistics(state, console)?,
        17 => storage::export_csv(state, console)?,
        18 => storage::import_csv(state, console)?,
        19 => circulation::reserve(state, console)?,
        20 => circulation::cancel_reservation(state, console)?,
        21 => circulation::fine(state, console)?,
        22 => books::search_partial(state, console)?,
        23 => books::rate_book(state, console)?,
        24 => books::top_rated(state, console)?,
        25 => books::leave_feedback(state, console)?,
        26 => stats::availability_heatmap(state, console)?,
        27 => circulation::extend_due_date(state, console)?,
        28 => users::membership(state, console)?,
        29 => users::add_to_wishlist(state, console)?,
        30 => users::remove_from_wishlist(state, console)?,
        31 => books::donate_book(state, console)?,
        32 => users::send_notification(state, console)?,
        33 => books::advanced_search(state, console)?,
        34 => users::dashboard(state, console)?,
        35 => circulation::enqueue(state, console)?,
        36 => users::update_profile(state, console)?,
        37 => events::add_event(state, console)?,
        38 => circulation::waive_fine(state, console)?,
        39 => stats::analytics(state, console)?,
        40 => circulation::rent(state, console)?,
        41 => stats::inventory_summary(state, console)?,
        42 => stats::activity_heatmap(state, console)?,
        43 => books::upload_cover(state, console)?,
        44 => {
            console.say("Exiting the program. Goodbye!")?;
            return Ok(Flow::Exit);
        }
        _ => console.say("Invalid choice. Please try again.")?,
    }
    Ok(Flow::Continue)
}

/// Show the menu and serve choices until Exit or end of input
pub fn run<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    loop {
        print_menu(console)?;
        let answer = match console.ask("Enter your choice: ") {
            Ok(answer) => answer,
            Err(err) if is_end_of_input(&err) => break,
            Err(err) => return Err(err),
        };

        let choice = match answer.trim().parse::<u32>() {
            Ok(choice) => choice,
            Err(_) => {
                console.say("Invalid choice. Please try again.")?;
                continue;
            }
        };

        match dispatch(state, console, choice) {
            Ok(Flow::Exit) => return Ok(()),
            Ok(Flow::Continue) => {}
            Err(err) if is_end_of_input(&err) => break,
            Err(err) => {
                tracing::warn!(code = ?err.code(), "Menu entry {} failed: {}", choice, err);
                console.say(format!("Error: {}", err))?;
            }
        }
    }
    tracing::debug!("Input closed, leaving menu");
    Ok(())
}
