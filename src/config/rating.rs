//! Rating system configuration

use crate::error::{RatingError, Result};
use crate::rating::scoring::{ScoreFunction, DEFAULT_EXP_ALPHA};
use serde::{Deserialize, Serialize};

/// Policy constants of the multiplayer Elo system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Baseline rating every entity starts from
    pub initial_rating: f64,
    /// Step size per pairwise comparison
    pub k_factor: f64,
    /// Logistic scale of the pairwise win probability
    pub scale: f64,
    /// Scoring policy name (`linear` or `exp`)
    pub score_function: String,
    /// Decay base for the `exp` policy
    pub exp_alpha: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            initial_rating: 1000.0,
            k_factor: 32.0,
            scale: 400.0,
            score_function: "linear".to_string(),
            exp_alpha: DEFAULT_EXP_ALPHA,
        }
    }
}

impl RatingConfig {
    /// Resolve the configured scoring policy
    pub fn score_function(&self) -> Result<ScoreFunction> {
        ScoreFunction::from_name(&self.score_function, self.exp_alpha)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.initial_rating.is_finite() {
            return Err(RatingError::ConfigurationError {
                message: "Initial rating must be finite".to_string(),
            }
            .into());
        }

        if self.k_factor <= 0.0 || self.k_factor.is_nan() {
            return Err(RatingError::ConfigurationError {
                message: "K factor must be positive".to_string(),
            }
            .into());
        }

        if self.scale <= 0.0 || self.scale.is_nan() {
            return Err(RatingError::ConfigurationError {
                message: "Rating scale must be positive".to_string(),
            }
            .into());
        }

        self.score_function()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RatingConfig::default();
        assert_eq!(config.initial_rating, 1000.0);
        assert_eq!(config.k_factor, 32.0);
        assert_eq!(config.scale, 400.0);
        assert_eq!(config.score_function().unwrap(), ScoreFunction::Linear);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_constants() {
        let mut config = RatingConfig::default();
        config.k_factor = 0.0;
        assert!(config.validate().is_err());

        let mut config = RatingConfig::default();
        config.scale = -400.0;
        assert!(config.validate().is_err());

        let mut config = RatingConfig::default();
        config.score_function = "cubic".to_string();
        assert!(config.validate().is_err());
    }
}
