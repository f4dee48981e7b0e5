//! Error types for quire operations.
//!
//! Errors carry a structured [`ErrorCode`] so hosts can react programmatically,
//! plus an optional suggestion for resolution.

use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for quire operations.
pub type QuireResult<T> = Result<T, QuireError>;

/// Main error type for all quire operations.
#[derive(Error, Debug)]
pub enum QuireError {
    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        details: HashMap<String, String>,
        suggestion: Option<String>,
    },

    /// A selectable algorithm exists by name but has no implementation.
    #[error("Not implemented: {component} '{name}'")]
    NotImplemented {
        component: String,
        name: String,
        code: ErrorCode,
    },

    /// Item/state store operation failed.
    #[error("Store error: {message}")]
    Store {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Note/link platform operation failed.
    #[error("Platform error: {message}")]
    Platform {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValInvalidRating,
    ValInvalidConfig,

    // Scheduling (SCHED_xxx)
    SchedNotImplemented,

    // Store (STORE_xxx)
    StoreReadFailed,
    StoreWriteFailed,

    // Platform (PLAT_xxx)
    PlatLinksFailed,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidRating => "VAL_001",
            ErrorCode::ValInvalidConfig => "VAL_002",
            ErrorCode::SchedNotImplemented => "SCHED_001",
            ErrorCode::StoreReadFailed => "STORE_001",
            ErrorCode::StoreWriteFailed => "STORE_002",
            ErrorCode::PlatLinksFailed => "PLAT_001",
        }
    }
}

impl QuireError {
    /// Create an error for a rating outside 1..=4.
    pub fn invalid_rating(value: u8) -> Self {
        let mut details = HashMap::new();
        details.insert("rating".to_string(), value.to_string());
        Self::Validation {
            message: format!("rating {} is not one of 1 (Again), 2 (Hard), 3 (Good), 4 (Easy)", value),
            code: ErrorCode::ValInvalidRating,
            details,
            suggestion: Some("Use a rating between 1 and 4".to_string()),
        }
    }

    /// Create an error for an invalid configuration field.
    pub fn invalid_config(field: &str, message: impl Into<String>) -> Self {
        let mut details = HashMap::new();
        details.insert("field".to_string(), field.to_string());
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidConfig,
            details,
            suggestion: None,
        }
    }

    /// Create a not-implemented error for a scheduler.
    pub fn scheduler_not_implemented(name: impl Into<String>) -> Self {
        Self::NotImplemented {
            component: "scheduler".to_string(),
            name: name.into(),
            code: ErrorCode::SchedNotImplemented,
        }
    }

    /// Create a store read error.
    pub fn store_read(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            code: ErrorCode::StoreReadFailed,
            source: None,
        }
    }

    /// Create a store write error.
    pub fn store_write(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            code: ErrorCode::StoreWriteFailed,
            source: None,
        }
    }

    /// Create a platform error for link lookups.
    pub fn links(message: impl Into<String>) -> Self {
        Self::Platform {
            message: message.into(),
            code: ErrorCode::PlatLinksFailed,
            source: None,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::NotImplemented { code, .. } => *code,
            Self::Store { code, .. } => *code,
            Self::Platform { code, .. } => *code,
            Self::Configuration(_) | Self::Io(_) => ErrorCode::ValInvalidConfig,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::NotImplemented { .. } => Some("Select the 'fsrs' or 'topic' scheduler"),
            Self::Store { .. } => Some("Check the item store and retry the whole call"),
            Self::Platform { .. } => Some("Check the note platform and retry the whole call"),
            _ => None,
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store { .. } | Self::Platform { .. } | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_error() {
        let err = QuireError::invalid_config("cooldown", "bad cooldown");
        assert_eq!(err.code(), ErrorCode::ValInvalidConfig);
        assert!(err.to_string().contains("bad cooldown"));
    }

    #[test]
    fn test_invalid_rating_error() {
        let err = QuireError::invalid_rating(7);
        assert_eq!(err.code(), ErrorCode::ValInvalidRating);
        assert!(err.to_string().contains('7'));
        assert_eq!(err.suggestion(), Some("Use a rating between 1 and 4"));
    }

    #[test]
    fn test_not_implemented_error() {
        let err = QuireError::scheduler_not_implemented("sm2");
        assert_eq!(err.code(), ErrorCode::SchedNotImplemented);
        assert_eq!(err.to_string(), "Not implemented: scheduler 'sm2'");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_store_error_is_retryable() {
        let err = QuireError::store_write("disk full");
        assert_eq!(err.code(), ErrorCode::StoreWriteFailed);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::ValInvalidRating.as_str(), "VAL_001");
        assert_eq!(ErrorCode::SchedNotImplemented.as_str(), "SCHED_001");
        assert_eq!(ErrorCode::PlatLinksFailed.as_str(), "PLAT_001");
    }
}
