//! User menu entries

use std::io::{BufRead, Write};

use chrono::Utc;

use crate::{
    error::AppResult,
    models::user::{CreateUser, UpdateProfile},
    AppState,
};

use super::Console;

/// 10. Add a User
pub fn add_user<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let name = console.ask("Enter name: ")?;
    let id = console.ask("Enter user ID: ")?;
    let email = console.ask("Enter email: ")?;
    let user = state.services.users.add_user(
        &mut state.repository,
        CreateUser::new(&name, &id, &email),
        Utc::now(),
    )?;
    console.say(format!("User \"{}\" added successfully.", user.name()))
}

/// 11. Display All Users
pub fn display_users<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let users = state.repository.users.all();
    if users.is_empty() {
        return console.say("No users registered.");
    }
    for user in users {
        console.say(user)?;
        console.say("-----------------------------")?;
    }
    Ok(())
}

/// 28. Check Membership Expiry, offering a renewal once expired
pub fn membership<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let id = console.ask("Enter user ID: ")?;
    let now = Utc::now();
    let status = state.services.users.membership_status(&state.repository, id.trim(), now)?;

    match status.expiry {
        Some(expiry) if status.active => {
            return console.say(format!("Membership active until {}.", expiry.format("%Y-%m-%d")))
        }
        Some(expiry) => console.say(format!("Membership expired on {}.", expiry.format("%Y-%m-%d")))?,
        None => console.say("No membership on record.")?,
    }

    if console.confirm("Renew membership? (y/n): ")? {
        let expiry = state
            .services
            .users
            .renew_membership(&mut state.repository, id.trim(), now)?;
        console.say(format!("Membership renewed until {}.", expiry.format("%Y-%m-%d")))?;
    }
    Ok(())
}

/// 29. Add Book to Wishlist
pub fn add_to_wishlist<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let id = console.ask("Enter user ID: ")?;
    let isbn = console.ask("Enter ISBN of the book to add to wishlist: ")?;
    state
        .services
        .users
        .add_to_wishlist(&mut state.repository, id.trim(), isbn.trim())?;
    console.say("Book added to wishlist.")
}

/// 30. Remove Book from Wishlist
pub fn remove_from_wishlist<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let id = console.ask("Enter user ID: ")?;
    let isbn = console.ask("Enter ISBN of the book to remove from wishlist: ")?;
    state
        .services
        .users
        .remove_from_wishlist(&mut state.repository, id.trim(), isbn.trim())?;
    console.say("Book removed from wishlist.")
}

/// 32. Send Notification, to one user or to everyone
pub fn send_notification<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let id = console.ask_optional("Enter user ID (leave blank for all users): ")?;
    let message = console.ask("Enter notification message: ")?;
    match id {
        Some(id) => {
            state.services.users.notify(&mut state.repository, &id, &message)?;
            console.say("Notification sent.")
        }
        None => {
            let reached = state.services.users.broadcast(&mut state.repository, &message)?;
            console.say(format!("Notification sent to {} user(s).", reached))
        }
    }
}

/// 34. User Dashboard
pub fn dashboard<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let id = console.ask("Enter user ID: ")?;
    let dashboard = state
        .services
        .users
        .dashboard(&state.repository, id.trim(), Utc::now())?;

    console.say(format!("\n=== Dashboard for {} ===", dashboard.user.name()))?;
    console.say(format!(
        "Membership: {}",
        if dashboard.membership_active { "active" } else { "expired" }
    ))?;

    console.say("Borrowed Books:")?;
    for book in &dashboard.borrowed {
        let due = book
            .due_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        console.say(format!("- {} (due {})", book.title(), due))?;
    }
    console.say("Reservations:")?;
    for (book, position) in &dashboard.reservations {
        console.say(format!("- {} (position {})", book.title(), position))?;
    }
    console.say("Wishlist:")?;
    for book in &dashboard.wishlist {
        console.say(format!("- {}", book.title()))?;
    }
    console.say("Notifications:")?;
    for message in dashboard.user.notifications() {
        console.say(format!("- {}", message))?;
    }
    Ok(())
}

/// 36. Update User Profile, blank answers keep the current value
pub fn update_profile<R: BufRead, W: Write>(state: &mut AppState, console: &mut Console<R, W>) -> AppResult<()> {
    let id = console.ask("Enter user ID: ")?;
    state.repository.users.get(id.trim())?;
    let update = UpdateProfile {
        name: console.ask_optional("Enter new name (leave blank to keep): ")?,
        email: console.ask_optional("Enter new email (leave blank to keep): ")?,
    };
    state
        .services
        .users
        .update_profile(&mut state.repository, id.trim(), update)?;
    console.say("Profile updated successfully.")
}
