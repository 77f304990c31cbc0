//! Placement scoring functions
//!
//! Turns a finishing place into an observed score in `[0, 1]`. For a fixed
//! match size the scores of places `1..=n` sum to one, which mirrors the
//! normalisation of the expected score.

use crate::error::{RatingError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default decay base of the exponential policy
pub const DEFAULT_EXP_ALPHA: f64 = 2.0;

/// Scoring policy applied to finishing places
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScoreFunction {
    /// Score falls linearly with place
    Linear,
    /// Score falls geometrically with place; `alpha` must exceed 1
    Exponential { alpha: f64 },
}

impl Default for ScoreFunction {
    fn default() -> Self {
        ScoreFunction::Linear
    }
}

impl ScoreFunction {
    /// Resolve a policy by configuration name
    ///
    /// Accepts `linear` and `exp` (or `exponential`). Anything else is a
    /// configuration error, reported before any replay work happens.
    pub fn from_name(name: &str, alpha: f64) -> Result<Self> {
        let function = match name.trim().to_lowercase().as_str() {
            "linear" => ScoreFunction::Linear,
            "exp" | "exponential" => ScoreFunction::Exponential { alpha },
            _ => {
                return Err(RatingError::UnsupportedScoreFunction {
                    name: name.to_string(),
                }
                .into())
            }
        };
        function.validate()?;
        Ok(function)
    }

    /// Validate policy parameters
    pub fn validate(&self) -> Result<()> {
        if let ScoreFunction::Exponential { alpha } = self {
            if *alpha <= 1.0 || !alpha.is_finite() {
                return Err(RatingError::ConfigurationError {
                    message: format!(
                        "Exponential alpha must be a finite value above 1, got {}",
                        alpha
                    ),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Short configuration name of the policy
    pub fn name(&self) -> &'static str {
        match self {
            ScoreFunction::Linear => "linear",
            ScoreFunction::Exponential { .. } => "exp",
        }
    }

    /// Observed score of `place` in a match of `n` entities
    pub fn score(&self, place: u32, n: usize) -> Result<f64> {
        match self {
            ScoreFunction::Linear => linear_score(place, n),
            ScoreFunction::Exponential { alpha } => exp_score(place, n, *alpha),
        }
    }
}

impl FromStr for ScoreFunction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        ScoreFunction::from_name(s, DEFAULT_EXP_ALPHA)
    }
}

impl std::fmt::Display for ScoreFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreFunction::Linear => write!(f, "linear"),
            ScoreFunction::Exponential { alpha } => write!(f, "exp(alpha={})", alpha),
        }
    }
}

fn check_domain(place: u32, n: usize) -> Result<()> {
    if n < 2 {
        return Err(RatingError::DegenerateMatch {
            match_id: String::new(),
            size: n,
        }
        .into());
    }
    if place == 0 || place as usize > n {
        return Err(RatingError::InvalidPlace { place, size: n }.into());
    }
    Ok(())
}

/// `(n - place) / (n * (n - 1) / 2)`
pub fn linear_score(place: u32, n: usize) -> Result<f64> {
    check_domain(place, n)?;

    let n = n as f64;
    Ok((n - place as f64) / (n * (n - 1.0) / 2.0))
}

/// `(alpha^(n - place) - 1) / sum_{i=1}^{n-1} (alpha^(n - i) - 1)`
pub fn exp_score(place: u32, n: usize, alpha: f64) -> Result<f64> {
    check_domain(place, n)?;

    let normaliser: f64 = (1..n).map(|i| alpha.powi((n - i) as i32) - 1.0).sum();
    Ok((alpha.powi((n - place as usize) as i32) - 1.0) / normaliser)
}
