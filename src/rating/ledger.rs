//! Rating state of one replay
//!
//! The ledger holds the current rating of every entity in the roster. It is
//! created once per replay with every entity at the baseline, updated once
//! per match an entity plays and dropped when the replay finishes.

use crate::error::{RatingError, Result};
use crate::types::{EntityId, RatingChange};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ledger entry for an entity's rating with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEntry {
    pub entity_id: EntityId,
    pub rating: f64,
    pub matches_played: u32,
    pub last_played: Option<NaiveDate>,
}

impl RatingEntry {
    /// Create a new rating entry at the baseline
    pub fn new(entity_id: EntityId, initial_rating: f64) -> Self {
        Self {
            entity_id,
            rating: initial_rating,
            matches_played: 0,
            last_played: None,
        }
    }

    /// Update the rating and increment matches played
    pub fn update_rating(&mut self, new_rating: f64, date: NaiveDate) {
        self.rating = new_rating;
        self.matches_played += 1;
        self.last_played = Some(date);
    }
}

/// In-memory rating state keyed by entity
#[derive(Debug, Clone, Default)]
pub struct RatingLedger {
    entries: BTreeMap<EntityId, RatingEntry>,
}

impl RatingLedger {
    /// Open a ledger with every roster entity at `initial_rating`
    pub fn new<I>(roster: I, initial_rating: f64) -> Self
    where
        I: IntoIterator<Item = EntityId>,
    {
        let entries = roster
            .into_iter()
            .map(|entity_id| (entity_id.clone(), RatingEntry::new(entity_id, initial_rating)))
            .collect();

        Self { entries }
    }

    /// Current rating of an entity
    pub fn get_rating(&self, entity_id: &str) -> Result<f64> {
        self.entries
            .get(entity_id)
            .map(|entry| entry.rating)
            .ok_or_else(|| {
                RatingError::MissingRating {
                    entity_id: entity_id.to_string(),
                }
                .into()
            })
    }

    /// Current ratings of a subset of entities, in the order given
    pub fn snapshot<'a, I>(&self, entity_ids: I) -> Result<Vec<(EntityId, f64)>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        entity_ids
            .into_iter()
            .map(|entity_id| Ok((entity_id.to_string(), self.get_rating(entity_id)?)))
            .collect()
    }

    /// Apply all changes of one match
    ///
    /// Every entity must already be in the ledger; nothing is written unless
    /// all of them are.
    pub fn apply_changes(&mut self, changes: &[RatingChange], date: NaiveDate) -> Result<()> {
        if let Some(missing) = changes
            .iter()
            .find(|change| !self.entries.contains_key(&change.entity_id))
        {
            return Err(RatingError::MissingRating {
                entity_id: missing.entity_id.clone(),
            }
            .into());
        }

        for change in changes {
            if let Some(entry) = self.entries.get_mut(&change.entity_id) {
                entry.update_rating(change.new_rating, date);
            }
        }

        Ok(())
    }

    /// Iterate entries in entity order
    pub fn entries(&self) -> impl Iterator<Item = &RatingEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the ledger, yielding the final state
    pub fn into_entries(self) -> BTreeMap<EntityId, RatingEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 5, day).unwrap()
    }

    fn change(entity_id: &str, new_rating: f64) -> RatingChange {
        RatingChange {
            entity_id: entity_id.to_string(),
            old_rating: 1000.0,
            new_rating,
            expected_score: 0.5,
            observed_score: 0.5,
            place: 1,
        }
    }

    #[test]
    fn test_new_ledger_starts_at_baseline() {
        let ledger = RatingLedger::new(vec!["b".to_string(), "a".to_string()], 1000.0);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get_rating("a").unwrap(), 1000.0);

        let ids: Vec<_> = ledger.entries().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_snapshot_and_missing() {
        let ledger = RatingLedger::new(vec!["a".to_string(), "b".to_string()], 1000.0);
        let snapshot = ledger.snapshot(["b", "a"]).unwrap();
        assert_eq!(snapshot[0].0, "b");

        assert!(ledger.snapshot(["a", "z"]).is_err());
    }

    #[test]
    fn test_apply_changes() {
        let mut ledger = RatingLedger::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            1000.0,
        );
        ledger
            .apply_changes(&[change("a", 1016.0), change("b", 984.0)], date(3))
            .unwrap();

        let entries = ledger.clone().into_entries();
        assert_eq!(entries["a"].rating, 1016.0);
        assert_eq!(entries["a"].matches_played, 1);
        assert_eq!(entries["a"].last_played, Some(date(3)));
        assert_eq!(entries["c"].rating, 1000.0);
        assert_eq!(entries["c"].matches_played, 0);
    }

    #[test]
    fn test_apply_changes_is_all_or_nothing() {
        let mut ledger = RatingLedger::new(vec!["a".to_string()], 1000.0);
        let result = ledger.apply_changes(&[change("a", 1010.0), change("ghost", 990.0)], date(1));
        assert!(result.is_err());
        assert_eq!(ledger.get_rating("a").unwrap(), 1000.0);
    }
}
