//! Reports: statistics, analytics and heatmaps

use std::io::{BufRead, Write};

use chrono::Utc;

use crate::{error::AppResult, AppState};

use super::Console;

/// 14. Generate Report
pub fn report<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let lines = state.services.stats.report(&state.repository);
    console.say("\n=== Library Report ===")?;
    if lines.is_empty() {
        return console.say("No books in the catalog.");
    }
    for line in lines {
        console.say(format!(
            "{} | {} | {} | borrowed {} time(s) | {} waiting",
            line.isbn, line.title, line.status, line.borrow_count, line.queue_length
        ))?;
    }
    Ok(())
}

/// 16. Display Library Statistics
pub fn statistics<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let stats = state.services.stats.library_stats(&state.repository, Utc::now());
    console.say("\n=== Library Statistics ===")?;
    console.say(format!("Total Books: {}", stats.books))?;
    console.say(format!("Total Users: {}", stats.users))?;
    console.say(format!("Books Borrowed: {}", stats.active_loans))?;
    console.say(format!("Overdue Books: {}", stats.overdue_loans))?;
    console.say(format!("Reservations: {}", stats.reservations))?;
    console.say(format!("Ratings: {}", stats.ratings))?;
    console.say(format!("Feedbacks: {}", stats.feedbacks))
}

/// 26. Display Book Availability Heatmap
pub fn availability_heatmap<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    console.say("\n=== Book Availability Heatmap ===")?;
    for cell in state.services.stats.availability_heatmap(&state.repository) {
        console.say(format!(
            "{}: {} {} ({} borrow(s))",
            cell.title,
            if cell.available { "Available" } else { "Borrowed " },
            "#".repeat(cell.borrow_count as usize),
            cell.borrow_count
        ))?;
    }
    Ok(())
}

/// 39. Display Library Analytics
pub fn analytics<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let analytics = state.services.stats.analytics(&state.repository, Utc::now());
    console.say("\n=== Library Analytics ===")?;
    match analytics.most_borrowed {
        Some((title, count)) => console.say(format!("Most Borrowed Book: {} ({} times)", title, count))?,
        None => console.say("Most Borrowed Book: none yet")?,
    }
    match analytics.most_active_user {
        Some((name, count)) => console.say(format!("Most Active User: {} ({} activities)", name, count))?,
        None => console.say("Most Active User: none yet")?,
    }
    console.say(format!("Average Rating: {:.2}", analytics.average_rating))?;
    console.say(format!("Overdue Books: {}", analytics.overdue_loans))?;
    console.say(format!("Rental Value Out: ${}", analytics.rental_value_out))
}

/// 41. Display Library Inventory Summary
pub fn inventory_summary<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let summary = state.services.stats.inventory_summary(&state.repository);
    console.say("\n=== Library Inventory Summary ===")?;
    console.say(format!("Total Books: {}", summary.total))?;
    console.say(format!("Available Books: {}", summary.available))?;
    console.say(format!("Borrowed Books: {}", summary.borrowed))?;
    console.say("Categories:")?;
    for entry in &summary.by_category {
        console.say(format!("- {}: {} books", entry.label, entry.value))?;
    }
    console.say(format!(
        "Availability Percentage: {:.1}%",
        summary.availability_percentage
    ))
}

/// 42. Display User Activity Heatmap
pub fn activity_heatmap<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    console.say("\n=== User Activity Heatmap ===")?;
    for (index, cell) in state.services.stats.activity_heatmap(&state.repository).iter().enumerate() {
        console.say(format!("User {} ({}):", index + 1, cell.name))?;
        console.say(format!("{} ({} activities)", "*".repeat(cell.activities), cell.activities))?;
    }
    Ok(())
}
