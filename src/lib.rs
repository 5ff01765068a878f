//! Library Desk
//!
//! An in-memory library catalog manager: books, users, circulation,
//! reservations, fines and reports, driven from a numbered text menu.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state owned by the menu loop
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: services::Services,
    pub repository: repository::Repository,
}

impl AppState {
    /// Build services from configuration around an empty repository
    pub fn new(config: AppConfig) -> Self {
        let services = services::Services::new(&config);
        Self {
            config,
            services,
            repository: repository::Repository::new(),
        }
    }
}
