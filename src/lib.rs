//! Mars Ratings - historical multiplayer Elo for Terraforming Mars
//!
//! This crate replays the recorded history of Terraforming Mars games and
//! computes a rating trajectory per player and per corporation, for matches
//! of any number of players.

pub mod config;
pub mod dataset;
pub mod error;
pub mod rating;
pub mod report;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{RatingError, Result};
pub use types::*;

// Re-export key components
pub use rating::{
    compute_historical_ratings, HistoricalRatingEngine, MultiplayerEloCalculator, RatingHistory,
    ReplayOptions,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
