//! Repository layer: in-memory collections owned by one context value

pub mod books;
pub mod events;
pub mod users;

/// Owns every collection of the running library. Passed explicitly to
/// each service call; there is no process-wide state.
#[derive(Debug, Default, Clone)]
pub struct Repository {
    pub books: books::BooksRepository,
    pub users: users::UsersRepository,
    pub events: events::EventsRepository,
}

impl Repository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }
}
