//! Multiplayer Elo rating engine
//!
//! This module provides placement scoring, the multiplayer Elo calculator,
//! the per-replay rating ledger and the historical replay engine.

pub mod calculator;
pub mod elo;
pub mod history;
pub mod ledger;
pub mod scoring;

// Re-export commonly used types
pub use calculator::RatingCalculator;
pub use elo::{expected_score, update_rating, MultiplayerEloCalculator};
pub use history::{
    compute_historical_ratings, HistoricalRatingEngine, MatchSizeFilter, RatingHistory,
    ReplayOptions,
};
pub use ledger::{RatingEntry, RatingLedger};
pub use scoring::{exp_score, linear_score, ScoreFunction};
