//! Rating calculator trait and implementations
//!
//! This module defines the interface the replay engine uses to turn one
//! match result into rating changes, plus a recording mock for tests.

use crate::types::{EntityId, RatingChange};

/// Trait for calculating rating changes after a match
pub trait RatingCalculator: Send + Sync {
    /// Calculate rating changes for every participant of one match
    ///
    /// # Arguments
    /// * `players` - List of (entity_id, current_rating) pairs, only the match's participants
    /// * `rankings` - List of (entity_id, place) pairs where 1 = first place
    ///
    /// # Returns
    /// One change per participant, all computed from the ratings passed in
    fn calculate_rating_changes(
        &self,
        players: &[(EntityId, f64)],
        rankings: &[(EntityId, u32)],
    ) -> crate::error::Result<Vec<RatingChange>>;

    /// Get the baseline rating for every entity
    fn get_initial_rating(&self) -> f64;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;
}

/// Mock rating calculator for testing
///
/// Records every call and shifts each participant's rating by a fixed amount
/// per place below first.
#[derive(Debug, Default)]
pub struct MockRatingCalculator {
    calculation_calls: std::sync::Mutex<Vec<(Vec<(EntityId, f64)>, Vec<(EntityId, u32)>)>>,
    step: f64,
    initial_rating: f64,
}

impl MockRatingCalculator {
    pub fn new(initial_rating: f64, step: f64) -> Self {
        Self {
            calculation_calls: std::sync::Mutex::new(Vec::new()),
            step,
            initial_rating,
        }
    }

    /// Get all calculation calls made (for testing)
    pub fn get_calculation_calls(&self) -> Vec<(Vec<(EntityId, f64)>, Vec<(EntityId, u32)>)> {
        self.calculation_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl RatingCalculator for MockRatingCalculator {
    fn calculate_rating_changes(
        &self,
        players: &[(EntityId, f64)],
        rankings: &[(EntityId, u32)],
    ) -> crate::error::Result<Vec<RatingChange>> {
        if let Ok(mut calls) = self.calculation_calls.lock() {
            calls.push((players.to_vec(), rankings.to_vec()));
        }

        Ok(players
            .iter()
            .map(|(entity_id, rating)| {
                let place = rankings
                    .iter()
                    .find(|(id, _)| id == entity_id)
                    .map(|(_, place)| *place)
                    .unwrap_or(1);

                RatingChange {
                    entity_id: entity_id.clone(),
                    old_rating: *rating,
                    new_rating: rating - self.step * (place as f64 - 1.0),
                    expected_score: 0.0,
                    observed_score: 0.0,
                    place,
                }
            })
            .collect())
    }

    fn get_initial_rating(&self) -> f64 {
        self.initial_rating
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "mock",
            "initial_rating": self.initial_rating,
            "step": self.step
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_calculator_records_calls() {
        let calculator = MockRatingCalculator::new(1000.0, 10.0);

        let players = vec![("a".to_string(), 1000.0), ("b".to_string(), 1000.0)];
        let rankings = vec![("a".to_string(), 1), ("b".to_string(), 2)];

        let changes = calculator
            .calculate_rating_changes(&players, &rankings)
            .unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].new_rating, 1000.0);
        assert_eq!(changes[1].new_rating, 990.0);

        let calls = calculator.get_calculation_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.len(), 2);
        assert_eq!(calls[0].1.len(), 2);
    }

    #[test]
    fn test_mock_calculator_config() {
        let calculator = MockRatingCalculator::new(1200.0, 5.0);
        assert_eq!(calculator.get_initial_rating(), 1200.0);
        assert_eq!(calculator.config()["type"], "mock");
    }
}
