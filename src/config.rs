//! Configuration management for Library Desk

use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

/// Circulation rules
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CirculationConfig {
    /// Loan period applied on every checkout
    pub loan_duration_days: i64,
    /// Default extension when a due date is pushed back
    pub extension_days: i64,
    /// Fine charged per started day past the due date
    pub fine_per_day: Decimal,
    pub rating_min: u8,
    pub rating_max: u8,
    /// Membership length granted to new users and on renewal
    pub membership_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub data_file: String,
    pub books_csv: String,
    pub users_csv: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub circulation: CirculationConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables.
    ///
    /// `path` replaces `config/default` as the base file when given.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name(path.unwrap_or("config/default")).required(path.is_some()))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix LIBRARY_DESK_)
            .add_source(
                Environment::with_prefix("LIBRARY_DESK")
                    .separator("__")
                    .try_parsing(true),
            )
            // Override the snapshot location from LIBRARY_DATA if present
            .set_override_option("storage.data_file", env::var("LIBRARY_DATA").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for CirculationConfig {
    fn default() -> Self {
        Self {
            loan_duration_days: 14,
            extension_days: 7,
            fine_per_day: Decimal::new(25, 2),
            rating_min: 1,
            rating_max: 5,
            membership_days: 365,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: "library.json".to_string(),
            books_csv: "books.csv".to_string(),
            users_csv: "users.csv".to_string(),
        }
    }
}
