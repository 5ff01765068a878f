//! Library event menu entry

use std::io::{BufRead, Write};

use chrono::Utc;

use crate::{error::AppResult, models::event::CreateEvent, AppState};

use super::Console;

/// 37. Add Library Event, then list what is coming up
pub fn add_event<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let data = CreateEvent {
        title: console.ask("Enter event title: ")?,
        date: console.ask("Enter event date (YYYY-MM-DD): ")?,
        description: console.ask_optional("Enter event description (optional): ")?,
    };
    let event = state.services.events.add_event(&mut state.repository, data)?;
    console.say(format!("Event \"{}\" added successfully.", event.title))?;

    let events = &state.services.events;
    let upcoming = events.upcoming(&state.repository, Utc::now().date_naive());
    console.say(format!(
        "Scheduled events: {} ({} upcoming)",
        events.list(&state.repository).len(),
        upcoming.len()
    ))?;
    if !upcoming.is_empty() {
        console.say("\n=== Upcoming Events ===")?;
        for event in upcoming {
            console.say(event)?;
        }
    }
    Ok(())
}
