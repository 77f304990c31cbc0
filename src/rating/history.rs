//! Historical rating replay
//!
//! Replays every match in chronological order and records a dense rating
//! trajectory: one row per (entity, match) pair, including the matches an
//! entity sat out, after a synthetic baseline row at sequence number 1.
//!
//! Filters that decide *what* is replayed (match size, corporation origin)
//! run before the roster is built. The entity inclusion filter only trims
//! the returned rows; excluded entities still take part in the replay.

use crate::dataset::{group_matches, loader::UNKNOWN_CORPORATION};
use crate::error::{RatingError, Result};
use crate::rating::calculator::RatingCalculator;
use crate::rating::elo::MultiplayerEloCalculator;
use crate::rating::ledger::{RatingEntry, RatingLedger};
use crate::rating::scoring::{ScoreFunction, DEFAULT_EXP_ALPHA};
use crate::types::{EntityDimension, EntityId, MatchId, MatchRecord, RatingHistoryRow};
use crate::utils::baseline_date;
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Restricts which matches are replayed by their size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchSizeFilter {
    #[default]
    All,
    /// Only head-to-head matches
    TwoPlayer,
    /// Every match except head-to-head ones
    Multiplayer,
}

impl MatchSizeFilter {
    pub fn admits(&self, size: usize) -> bool {
        match self {
            MatchSizeFilter::All => true,
            MatchSizeFilter::TwoPlayer => size == 2,
            MatchSizeFilter::Multiplayer => size != 2,
        }
    }
}

impl FromStr for MatchSizeFilter {
    type Err = RatingError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(MatchSizeFilter::All),
            "two-player" | "two_player" | "2p" => Ok(MatchSizeFilter::TwoPlayer),
            "multiplayer" | "non-two-player" => Ok(MatchSizeFilter::Multiplayer),
            other => Err(RatingError::ConfigurationError {
                message: format!("Unknown match size filter: {}", other),
            }),
        }
    }
}

/// Options of one replay
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayOptions {
    pub match_size: MatchSizeFilter,
    /// Corporation origins in scope; ignored for the player dimension
    pub origins: Option<BTreeSet<String>>,
    /// Entities whose rows are returned; all when `None`
    pub include: Option<BTreeSet<EntityId>>,
}

impl ReplayOptions {
    pub fn with_match_size(mut self, match_size: MatchSizeFilter) -> Self {
        self.match_size = match_size;
        self
    }

    pub fn with_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.origins = Some(origins.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_include<I, S>(mut self, include: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        self.include = Some(include.into_iter().map(Into::into).collect());
        self
    }

    fn includes(&self, entity_id: &str) -> bool {
        self.include
            .as_ref()
            .map_or(true, |include| include.contains(entity_id))
    }
}

/// One entity's result in a replayed match
#[derive(Debug, Clone, PartialEq)]
struct Participant {
    entity_id: EntityId,
    place: u32,
    origin: Option<String>,
}

/// A match as seen by one rating dimension
#[derive(Debug, Clone)]
struct ReplayMatch {
    match_id: MatchId,
    date: NaiveDate,
    participants: Vec<Participant>,
}

/// Output of a replay
#[derive(Debug, Clone, Default, Serialize)]
pub struct RatingHistory {
    /// Entity-major rows, each entity's rows in sequence order
    pub rows: Vec<RatingHistoryRow>,
    /// Rating state after the last match, for the whole roster
    pub final_ratings: BTreeMap<EntityId, RatingEntry>,
    pub matches_replayed: usize,
}

impl RatingHistory {
    /// Highest sequence number present, if any rows were emitted
    pub fn last_sequence_number(&self) -> Option<u32> {
        self.rows.iter().map(|row| row.sequence_number).max()
    }

    /// Rows of one entity in sequence order
    pub fn trajectory(&self, entity_id: &str) -> Vec<&RatingHistoryRow> {
        self.rows
            .iter()
            .filter(|row| row.entity_id == entity_id)
            .collect()
    }

    /// Rating of an entity at a sequence number
    pub fn rating_at(&self, entity_id: &str, sequence_number: u32) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.entity_id == entity_id && row.sequence_number == sequence_number)
            .map(|row| row.rating)
    }
}

/// Replays match history through a rating calculator
#[derive(Clone)]
pub struct HistoricalRatingEngine {
    calculator: Arc<dyn RatingCalculator>,
}

impl HistoricalRatingEngine {
    pub fn new(calculator: Arc<dyn RatingCalculator>) -> Self {
        Self { calculator }
    }

    /// Replay `records` for one dimension
    pub fn replay(
        &self,
        records: &[MatchRecord],
        dimension: EntityDimension,
        options: &ReplayOptions,
    ) -> Result<RatingHistory> {
        let matches = select_matches(records, dimension, options)?;
        for m in &matches {
            validate_match(m)?;
        }

        let Some(first) = matches.first() else {
            info!("No {} matches to replay", dimension);
            return Ok(RatingHistory::default());
        };

        let mut origins: HashMap<EntityId, Option<String>> = HashMap::new();
        for participant in matches.iter().flat_map(|m| &m.participants) {
            origins
                .entry(participant.entity_id.clone())
                .or_insert_with(|| participant.origin.clone());
        }

        let initial_rating = self.calculator.get_initial_rating();
        let baseline = baseline_date(first.date)?;
        let mut ledger = RatingLedger::new(origins.keys().cloned(), initial_rating);

        info!(
            "Replaying {} matches for {} {} entities (baseline {})",
            matches.len(),
            ledger.len(),
            dimension,
            baseline
        );

        let row = |entity_id: &str, sequence_number: u32, date: NaiveDate, rating: f64| {
            RatingHistoryRow {
                entity_id: entity_id.to_string(),
                sequence_number,
                date,
                rating,
                origin: origins.get(entity_id).cloned().flatten(),
            }
        };

        let mut trajectories: BTreeMap<EntityId, Vec<RatingHistoryRow>> = ledger
            .entries()
            .map(|entry| {
                let mut rows = Vec::with_capacity(matches.len() + 1);
                rows.push(row(&entry.entity_id, 1, baseline, initial_rating));
                (entry.entity_id.clone(), rows)
            })
            .collect();

        for (sequence_number, m) in (2u32..).zip(&matches) {
            let players = ledger.snapshot(m.participants.iter().map(|p| p.entity_id.as_str()))?;
            let rankings: Vec<(EntityId, u32)> = m
                .participants
                .iter()
                .map(|p| (p.entity_id.clone(), p.place))
                .collect();

            let changes = self
                .calculator
                .calculate_rating_changes(&players, &rankings)
                .with_context(|| format!("Failed to rate match {}", m.match_id))?;
            ledger.apply_changes(&changes, m.date)?;

            debug!(
                "Match {} ({}, {} entities): {}",
                m.match_id,
                m.date,
                changes.len(),
                changes
                    .iter()
                    .map(|c| format!("{} {:+.1}", c.entity_id, c.delta()))
                    .collect::<Vec<_>>()
                    .join(", ")
            );

            for entry in ledger.entries() {
                if let Some(rows) = trajectories.get_mut(&entry.entity_id) {
                    rows.push(row(&entry.entity_id, sequence_number, m.date, entry.rating));
                }
            }
        }

        let rows: Vec<RatingHistoryRow> = trajectories
            .into_iter()
            .filter(|(entity_id, _)| options.includes(entity_id))
            .flat_map(|(_, rows)| rows)
            .collect();

        info!(
            "Replay of {} {} matches finished with {} rows",
            matches.len(),
            dimension,
            rows.len()
        );

        Ok(RatingHistory {
            rows,
            final_ratings: ledger.into_entries(),
            matches_replayed: matches.len(),
        })
    }
}

/// Replay with default constants and the named scoring policy
///
/// The policy name is resolved before any match is touched.
pub fn compute_historical_ratings(
    records: &[MatchRecord],
    dimension: EntityDimension,
    score_function_name: &str,
) -> Result<RatingHistory> {
    let score_function = ScoreFunction::from_name(score_function_name, DEFAULT_EXP_ALPHA)?;
    let calculator = MultiplayerEloCalculator::with_score_function(score_function)?;

    HistoricalRatingEngine::new(Arc::new(calculator)).replay(
        records,
        dimension,
        &ReplayOptions::default(),
    )
}

fn validate_match(m: &ReplayMatch) -> Result<()> {
    let size = m.participants.len();
    if size < 2 {
        return Err(RatingError::DegenerateMatch {
            match_id: m.match_id.clone(),
            size,
        }
        .into());
    }

    let mut seen = HashSet::with_capacity(size);
    for participant in &m.participants {
        if !seen.insert(participant.entity_id.as_str()) {
            return Err(RatingError::DuplicateEntity {
                match_id: m.match_id.clone(),
                entity_id: participant.entity_id.clone(),
            }
            .into());
        }
        if participant.place == 0 || participant.place as usize > size {
            return Err(RatingError::InvalidPlace {
                place: participant.place,
                size,
            }
            .into());
        }
    }

    Ok(())
}

/// Chronological matches of one dimension after match-level filters
fn select_matches(
    records: &[MatchRecord],
    dimension: EntityDimension,
    options: &ReplayOptions,
) -> Result<Vec<ReplayMatch>> {
    let mut selected = Vec::new();

    for group in group_matches(records)? {
        if !options.match_size.admits(group.size()) {
            debug!(
                "Skipping match {} with {} entities ({:?})",
                group.match_id,
                group.size(),
                options.match_size
            );
            continue;
        }

        let mut participants: Vec<Participant> = group
            .records
            .iter()
            .map(|record| Participant {
                entity_id: dimension.entity_of(record).to_string(),
                place: record.place,
                origin: match dimension {
                    EntityDimension::Player => None,
                    EntityDimension::Corporation => Some(record.corporation_origin.clone()),
                },
            })
            .collect();

        if dimension == EntityDimension::Corporation {
            if let Some(reason) = unratable_corporations(&participants) {
                warn!("Dropping match {} from corporation ratings: {}", group.match_id, reason);
                continue;
            }

            if let Some(origins) = &options.origins {
                let before = participants.len();
                participants.retain(|p| p.origin.as_ref().is_some_and(|o| origins.contains(o)));

                if participants.len() < 2 {
                    debug!(
                        "Skipping match {}: {} of {} corporations in scope",
                        group.match_id,
                        participants.len(),
                        before
                    );
                    continue;
                }
                if participants.len() < before {
                    recompress_places(&mut participants);
                }
            }
        }

        selected.push(ReplayMatch {
            match_id: group.match_id,
            date: group.date,
            participants,
        });
    }

    Ok(selected)
}

fn unratable_corporations(participants: &[Participant]) -> Option<String> {
    let mut seen = HashSet::new();
    for participant in participants {
        if participant.entity_id.is_empty() || participant.entity_id == UNKNOWN_CORPORATION {
            return Some("unknown corporation".to_string());
        }
        if !seen.insert(participant.entity_id.as_str()) {
            return Some(format!("{} played more than once", participant.entity_id));
        }
    }
    None
}

/// Re-rank remaining participants to `1..=n`, keeping order and ties
fn recompress_places(participants: &mut [Participant]) {
    let places: Vec<u32> = participants.iter().map(|p| p.place).collect();
    for participant in participants.iter_mut() {
        let better = places.iter().filter(|&&p| p < participant.place).count();
        participant.place = better as u32 + 1;
    }
}
