//! Business logic services

pub mod catalog;
pub mod circulation;
pub mod events;
pub mod persistence;
pub mod stats;
pub mod users;

use crate::config::AppConfig;

/// Container for all services
#[derive(Debug, Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub users: users::UsersService,
    pub circulation: circulation::CirculationService,
    pub stats: stats::StatsService,
    pub events: events::EventsService,
    pub persistence: persistence::PersistenceService,
}

impl Services {
    /// Create all services from the loaded configuration
    pub fn new(config: &AppConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(&config.circulation),
            users: users::UsersService::new(&config.circulation),
            circulation: circulation::CirculationService::new(&config.circulation),
            stats: stats::StatsService::new(),
            events: events::EventsService::new(),
            persistence: persistence::PersistenceService::new(),
        }
    }
}
