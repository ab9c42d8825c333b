use thiserror::Error;

/// Coarse error class, mirrored onto the wire by the RPC layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    PermissionDenied,
    Internal,
    Database,
    Runtime,
}

/// Stable, client-facing reason codes. The numeric values are part of the
/// external contract and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    LabelNotFound = 10000,
    GoalNotFound = 10003,
    InvalidDateFormat = 10004,
    EndDateBeforeStart = 10005,
    TimeOverlap = 10006,
    WorkNotFound = 10007,
    WorkForbidden = 10008,
    SubTaskNotFound = 10009,
    ZeroDuration = 10010,
    DraftNotFound = 10011,
    GoalForbidden = 10012,
    GoalLimitExceeded = 10013,
    RepeatWindowMissing = 10014,
    RepeatWindowInvalid = 10015,
}

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// A rejected request, carrying the coarse category and the exact rule that
/// was violated as first-class fields.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ValidationError {
    pub category: ErrorCategory,
    pub code: ErrorCode,
    pub message: String,
}

impl ValidationError {
    pub fn new(category: ErrorCategory, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            category,
            code,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CoreError {
    /// Shorthand used throughout the validators and services.
    pub fn validation(
        category: ErrorCategory,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Self {
        CoreError::Validation(ValidationError::new(category, code, message))
    }

    /// The validation payload, if this error is a rejected request.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            CoreError::Validation(ve) => Some(ve),
            _ => None,
        }
    }
}
