//! Match table handling
//!
//! Loading the canonical CSV export and grouping its rows into
//! chronologically ordered matches.

pub mod loader;

pub use loader::{load_records, rank_by_points, read_records, read_records_with};

use crate::error::{RatingError, Result};
use crate::types::{MatchId, MatchRecord};
use crate::utils::compare_match_ids;
use chrono::NaiveDate;
use std::collections::HashMap;

/// All rows of one match
#[derive(Debug, Clone)]
pub struct MatchGroup<'a> {
    pub match_id: MatchId,
    pub date: NaiveDate,
    pub records: Vec<&'a MatchRecord>,
}

impl MatchGroup<'_> {
    /// Number of competing entities
    pub fn size(&self) -> usize {
        self.records.len()
    }
}

/// Group rows by match and order matches by `(date, match_id)`
///
/// Rows keep their input order inside a match.
pub fn group_matches(records: &[MatchRecord]) -> Result<Vec<MatchGroup<'_>>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<MatchGroup<'_>> = Vec::new();

    for record in records {
        match index.get(record.match_id.as_str()) {
            Some(&i) => {
                let group = &mut groups[i];
                if group.date != record.date {
                    return Err(RatingError::InconsistentMatchDate {
                        match_id: record.match_id.clone(),
                        first: group.date.to_string(),
                        second: record.date.to_string(),
                    }
                    .into());
                }
                group.records.push(record);
            }
            None => {
                index.insert(record.match_id.as_str(), groups.len());
                groups.push(MatchGroup {
                    match_id: record.match_id.clone(),
                    date: record.date,
                    records: vec![record],
                });
            }
        }
    }

    groups.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| compare_match_ids(&a.match_id, &b.match_id))
    });

    Ok(groups)
}
