//! Common types used throughout the rating engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifier of a rated entity (player name or corporation name)
pub type EntityId = String;

/// Opaque identifier of a match
pub type MatchId = String;

/// One row of the canonical match table: a single entity's result in a single match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: MatchId,
    pub date: NaiveDate,
    pub player: EntityId,
    /// Number of players as reported upstream; the match's row count is authoritative
    pub num_players: u32,
    /// Finishing place, 1 = best
    pub place: u32,
    pub corporation: EntityId,
    pub corporation_origin: String,
    pub total_points: Option<f64>,
}

/// Which column of the match table is being rated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityDimension {
    Player,
    Corporation,
}

impl EntityDimension {
    /// Entity this record contributes to the dimension
    pub fn entity_of<'a>(&self, record: &'a MatchRecord) -> &'a str {
        match self {
            EntityDimension::Player => &record.player,
            EntityDimension::Corporation => &record.corporation,
        }
    }
}

impl std::fmt::Display for EntityDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityDimension::Player => write!(f, "player"),
            EntityDimension::Corporation => write!(f, "corporation"),
        }
    }
}

impl FromStr for EntityDimension {
    type Err = crate::error::RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "player" | "players" => Ok(EntityDimension::Player),
            "corporation" | "corporations" | "corp" => Ok(EntityDimension::Corporation),
            other => Err(crate::error::RatingError::ConfigurationError {
                message: format!("Unknown entity dimension: {}", other),
            }),
        }
    }
}

/// One point of an entity's rating trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingHistoryRow {
    pub entity_id: EntityId,
    /// 1 is the synthetic baseline, match k (1-based) is sequence k + 1
    pub sequence_number: u32,
    pub date: NaiveDate,
    pub rating: f64,
    /// Expansion a corporation comes from; empty for players
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// Rating change information for an entity in one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub entity_id: EntityId,
    pub old_rating: f64,
    pub new_rating: f64,
    pub expected_score: f64,
    pub observed_score: f64,
    pub place: u32,
}

impl RatingChange {
    /// Signed rating delta
    pub fn delta(&self) -> f64 {
        self.new_rating - self.old_rating
    }
}
