//! Multiplayer Elo rating system implementation
//!
//! Generalises two-player Elo to matches of any size: the expected score is
//! the pairwise win probability against every other participant, normalised
//! by the number of pairwise comparisons, and the update step is scaled by
//! `n - 1` so the effective per-opponent K stays comparable across match sizes.

use crate::config::RatingConfig;
use crate::error::{RatingError, Result};
use crate::rating::calculator::RatingCalculator;
use crate::rating::scoring::ScoreFunction;
use crate::types::{EntityId, RatingChange};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Number of pairwise comparisons in a match of `n` entities
pub fn pairwise_comparisons(n: usize) -> f64 {
    let n = n as f64;
    n * (n - 1.0) / 2.0
}

/// Probability that a player rated `rating` beats one rated `opponent`
pub fn win_probability(rating: f64, opponent: f64, scale: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent - rating) / scale))
}

/// Expected score of `entity_id` among the active ratings of one match
///
/// Only the ratings passed in take part; `n` is their count. Across all
/// participants the expected scores sum to one.
pub fn expected_score(ratings: &[(EntityId, f64)], entity_id: &str, scale: f64) -> Result<f64> {
    let n = ratings.len();
    if n < 2 {
        return Err(RatingError::DegenerateMatch {
            match_id: String::new(),
            size: n,
        }
        .into());
    }

    let own = ratings
        .iter()
        .find(|(id, _)| id == entity_id)
        .map(|(_, rating)| *rating)
        .ok_or_else(|| RatingError::MissingRating {
            entity_id: entity_id.to_string(),
        })?;

    let total: f64 = ratings
        .iter()
        .filter(|(id, _)| id != entity_id)
        .map(|(_, opponent)| win_probability(own, *opponent, scale))
        .sum();

    Ok(total / pairwise_comparisons(n))
}

/// `current + k * (n - 1) * (observed - expected)`, unclamped
pub fn update_rating(current: f64, expected: f64, observed: f64, n: usize, k: f64) -> f64 {
    current + k * (n as f64 - 1.0) * (observed - expected)
}

/// Multiplayer Elo rating calculator
#[derive(Debug, Clone)]
pub struct MultiplayerEloCalculator {
    initial_rating: f64,
    k_factor: f64,
    scale: f64,
    score_function: ScoreFunction,
}

impl Default for MultiplayerEloCalculator {
    fn default() -> Self {
        let config = RatingConfig::default();
        Self {
            initial_rating: config.initial_rating,
            k_factor: config.k_factor,
            scale: config.scale,
            score_function: ScoreFunction::Linear,
        }
    }
}

impl MultiplayerEloCalculator {
    /// Create a calculator from validated configuration
    pub fn new(config: &RatingConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            initial_rating: config.initial_rating,
            k_factor: config.k_factor,
            scale: config.scale,
            score_function: config.score_function()?,
        })
    }

    /// Default constants with a specific scoring policy
    pub fn with_score_function(score_function: ScoreFunction) -> Result<Self> {
        score_function.validate()?;

        Ok(Self {
            score_function,
            ..Self::default()
        })
    }

    /// Expected score of `entity_id` using this calculator's scale
    pub fn calculate_expected_score(
        &self,
        ratings: &[(EntityId, f64)],
        entity_id: &str,
    ) -> Result<f64> {
        expected_score(ratings, entity_id, self.scale)
    }
}

impl RatingCalculator for MultiplayerEloCalculator {
    fn calculate_rating_changes(
        &self,
        players: &[(EntityId, f64)],
        rankings: &[(EntityId, u32)],
    ) -> Result<Vec<RatingChange>> {
        let n = players.len();
        if n < 2 {
            return Err(RatingError::DegenerateMatch {
                match_id: String::new(),
                size: n,
            }
            .into());
        }

        let mut seen = HashSet::with_capacity(n);
        for (entity_id, _) in players {
            if !seen.insert(entity_id.as_str()) {
                return Err(RatingError::DuplicateEntity {
                    match_id: String::new(),
                    entity_id: entity_id.clone(),
                }
                .into());
            }
        }

        let ranking_map: HashMap<&str, u32> = rankings
            .iter()
            .map(|(entity_id, place)| (entity_id.as_str(), *place))
            .collect();

        // Every change reads from `players`, the pre-match snapshot.
        let mut rating_changes = Vec::with_capacity(n);
        for (entity_id, old_rating) in players {
            let place = *ranking_map.get(entity_id.as_str()).ok_or_else(|| {
                RatingError::InternalError {
                    message: format!("No place provided for entity {}", entity_id),
                }
            })?;

            let expected = self.calculate_expected_score(players, entity_id)?;
            let observed = self.score_function.score(place, n)?;
            let new_rating = update_rating(*old_rating, expected, observed, n, self.k_factor);

            trace!(
                "{}: place {} of {}, expected {:.4}, observed {:.4}, {:.2} -> {:.2}",
                entity_id,
                place,
                n,
                expected,
                observed,
                old_rating,
                new_rating
            );

            rating_changes.push(RatingChange {
                entity_id: entity_id.clone(),
                old_rating: *old_rating,
                new_rating,
                expected_score: expected,
                observed_score: observed,
                place,
            });
        }

        Ok(rating_changes)
    }

    fn get_initial_rating(&self) -> f64 {
        self.initial_rating
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "multiplayer_elo",
            "initial_rating": self.initial_rating,
            "k_factor": self.k_factor,
            "scale": self.scale,
            "score_function": self.score_function.name(),
        })
    }
}
