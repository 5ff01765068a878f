//! Error types for Library Desk

use thiserror::Error;

/// Stable numeric error codes reported alongside error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NoSuchEntity = 4,
    ItemNotAvailable = 7,
    Duplicate = 8,
    BadValue = 18,
    NothingToDo = 20,
    StorageFailure = 30,
    ConfigFailure = 31,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("Nothing to do: {0}")]
    NoOp(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    /// Numeric code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound(_) => ErrorCode::NoSuchEntity,
            AppError::InvalidState(_) => ErrorCode::ItemNotAvailable,
            AppError::NoOp(_) => ErrorCode::NothingToDo,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::Conflict(_) => ErrorCode::Duplicate,
            AppError::Io(_) | AppError::Serialization(_) => ErrorCode::StorageFailure,
            AppError::Config(_) => ErrorCode::ConfigFailure,
        }
    }

    /// Whether the failed operation left state untouched because it had
    /// nothing to act on, as opposed to being refused
    pub fn is_no_op(&self) -> bool {
        matches!(self, AppError::NoOp(_))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
