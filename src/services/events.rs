//! Events service

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::event::{CreateEvent, LibraryEvent},
    repository::Repository,
};

#[derive(Debug, Clone, Default)]
pub struct EventsService;

impl EventsService {
    pub fn new() -> Self {
        Self
    }

    pub fn add_event(&self, repo: &mut Repository, data: CreateEvent) -> AppResult<LibraryEvent> {
        if data.title.trim().is_empty() {
            return Err(AppError::Validation("Event title cannot be empty".to_string()));
        }
        let date = NaiveDate::parse_from_str(data.date.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::Validation("Invalid event date (use YYYY-MM-DD)".to_string()))?;

        let event = LibraryEvent {
            id: Uuid::new_v4(),
            title: data.title.trim().to_string(),
            date,
            description: data.description.filter(|d| !d.trim().is_empty()),
        };
        repo.events.add(event.clone());
        tracing::info!("Events: scheduled {:?} on {}", event.title, event.date);
        Ok(event)
    }

    pub fn list<'a>(&self, repo: &'a Repository) -> &'a [LibraryEvent] {
        repo.events.all()
    }

    /// Events on or after `today`
    pub fn upcoming<'a>(&self, repo: &'a Repository, today: NaiveDate) -> Vec<&'a LibraryEvent> {
        self.list(repo).iter().filter(|e| e.date >= today).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(title: &str, date: &str) -> CreateEvent {
        CreateEvent {
            title: title.to_string(),
            date: date.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_events_sorted_and_filtered() {
        let service = EventsService::new();
        let mut repo = Repository::new();
        service.add_event(&mut repo, event("Poetry night", "2026-11-20")).expect("add");
        service.add_event(&mut repo, event("Book fair", "2026-10-01")).expect("add");
        service.add_event(&mut repo, event("Author talk", "2026-12-05")).expect("add");

        let titles: Vec<&str> = service.list(&repo).iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Book fair", "Poetry night", "Author talk"]);

        let today = NaiveDate::from_ymd_opt(2026, 10, 16).expect("date");
        assert_eq!(service.upcoming(&repo, today).len(), 2);
    }

    #[test]
    fn test_invalid_date() {
        let service = EventsService::new();
        let mut repo = Repository::new();
        let err = service.add_event(&mut repo, event("Reading", "16/10/2026")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(service.add_event(&mut repo, event(" ", "2026-10-16")).is_err());
        assert!(service.list(&repo).is_empty());
    }
}
