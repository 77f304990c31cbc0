//! Error types for the rating engine
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific rating scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatingError {
    #[error("Unsupported score function: {name} (expected one of: linear, exp)")]
    UnsupportedScoreFunction { name: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Match {match_id} has {size} participant(s); at least 2 are required")]
    DegenerateMatch { match_id: String, size: usize },

    #[error("Invalid place {place} for a match of size {size}")]
    InvalidPlace { place: u32, size: usize },

    #[error("No current rating for entity: {entity_id}")]
    MissingRating { entity_id: String },

    #[error("Entity {entity_id} appears more than once in match {match_id}")]
    DuplicateEntity { match_id: String, entity_id: String },

    #[error("Match {match_id} has rows dated both {first} and {second}")]
    InconsistentMatchDate {
        match_id: String,
        first: String,
        second: String,
    },

    #[error("Invalid record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    #[error("Match {match_id} has no total points for {entity_id}")]
    MissingPoints { match_id: String, entity_id: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}
