//! Save, load, export and import menu entries

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::{error::AppResult, AppState};

use super::Console;

fn ask_path<R: BufRead, W: Write>(console: &mut Console<R, W>, label: &str, default: &str) -> AppResult<PathBuf> {
    let answer = console.ask_optional(&format!("{} [{}]: ", label, default))?;
    Ok(PathBuf::from(answer.as_deref().unwrap_or(default)))
}

/// 8. Save to File
pub fn save<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let path = ask_path(console, "Enter filename", &state.config.storage.data_file)?;
    state.services.persistence.save(&state.repository, &path)?;
    console.say(format!("Library saved to {}.", path.display()))
}

/// 9. Load from File, replacing everything in memory
pub fn load<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let path = ask_path(console, "Enter filename", &state.config.storage.data_file)?;
    state.services.persistence.load(&mut state.repository, &path)?;
    console.say(format!(
        "Loaded {} book(s) and {} user(s) from {}.",
        state.repository.books.len(),
        state.repository.users.len(),
        path.display()
    ))
}

/// 17. Export Data to CSV
pub fn export_csv<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let books = ask_path(console, "Books CSV file", &state.config.storage.books_csv)?;
    let users = ask_path(console, "Users CSV file", &state.config.storage.users_csv)?;
    state.services.persistence.export_csv(&state.repository, &books, &users)?;
    console.say("Data exported to CSV successfully.")
}

/// 18. Import Data from CSV
pub fn import_csv<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let books = ask_path(console, "Books CSV file", &state.config.storage.books_csv)?;
    let users = ask_path(console, "Users CSV file", &state.config.storage.users_csv)?;
    let (books_report, users_report) = state
        .services
        .persistence
        .import_csv(&mut state.repository, &books, &users)?;

    console.say(format!(
        "Imported {} book(s) and {} user(s).",
        books_report.created, users_report.created
    ))?;
    for warning in books_report.warnings.iter().chain(&users_report.warnings) {
        console.say(format!("Note: {}", warning))?;
    }
    Ok(())
}
