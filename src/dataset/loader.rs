//! CSV loader for the canonical match table
//!
//! Expected columns: `game_id, date, player, num_players, place, corporation,
//! corporation_origin, total_points`. Any other column is ignored.
//!
//! Exports rank ties by averaging (two players sharing first both get `1.5`).
//! Such tables only load with re-ranking enabled, which replaces every place
//! with its competition rank by `total_points`.

use crate::error::{RatingError, Result};
use crate::types::MatchRecord;
use crate::utils::parse_date;
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Corporation name used upstream when a sheet did not record one
pub const UNKNOWN_CORPORATION: &str = "UNKNOWN";

/// One CSV row as exported upstream
#[derive(Debug, Deserialize)]
struct RawRecord {
    game_id: String,
    date: String,
    player: String,
    #[serde(default)]
    num_players: Option<f64>,
    place: f64,
    #[serde(default)]
    corporation: Option<String>,
    #[serde(default)]
    corporation_origin: Option<String>,
    #[serde(default)]
    total_points: Option<f64>,
}

impl RawRecord {
    fn into_record(self, line: u64, rerank: bool) -> Result<MatchRecord> {
        let invalid = |reason: String| RatingError::InvalidRecord { line, reason };

        if self.game_id.is_empty() {
            return Err(invalid("empty game_id".to_string()).into());
        }
        if self.player.is_empty() {
            return Err(invalid("empty player".to_string()).into());
        }

        let date = parse_date(&self.date)
            .ok_or_else(|| invalid(format!("unparseable date '{}'", self.date)))?;

        if !self.place.is_finite() || self.place < 1.0 {
            return Err(invalid(format!("place must be at least 1, got {}", self.place)).into());
        }
        if !rerank && self.place.fract() != 0.0 {
            return Err(invalid(format!(
                "place must be an integer, got {} (tied ranks need re-ranking)",
                self.place
            ))
            .into());
        }

        let num_players = match self.num_players {
            Some(n) if n >= 0.0 && n.fract() == 0.0 => n as u32,
            Some(n) => return Err(invalid(format!("invalid num_players {}", n)).into()),
            None => 0,
        };

        let corporation = self
            .corporation
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNKNOWN_CORPORATION.to_string());

        Ok(MatchRecord {
            match_id: self.game_id,
            date,
            player: self.player,
            num_players,
            place: self.place as u32,
            corporation,
            corporation_origin: self
                .corporation_origin
                .map(|o| o.trim().to_string())
                .unwrap_or_default(),
            total_points: self.total_points,
        })
    }
}

/// Read match records from any CSV source
pub fn read_records<R: Read>(reader: R) -> Result<Vec<MatchRecord>> {
    read_records_with(reader, false)
}

/// Read match records, optionally recomputing places from `total_points`
///
/// With `rerank` the input places may be fractional average ranks; they are
/// replaced before any record is returned.
pub fn read_records_with<R: Read>(reader: R, rerank: bool) -> Result<Vec<MatchRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader
        .headers()
        .context("Failed to read CSV header")?
        .clone();

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row.context("Failed to read CSV row")?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let raw: RawRecord = row
            .deserialize(Some(&headers))
            .map_err(|e| RatingError::InvalidRecord {
                line,
                reason: e.to_string(),
            })?;
        records.push(raw.into_record(line, rerank)?);
    }

    if rerank {
        debug!("Recomputing places from total points");
        rank_by_points(&mut records)?;
    }

    warn_on_size_mismatch(&records);
    Ok(records)
}

/// Load match records from a CSV file
pub fn load_records(path: &Path, rerank: bool) -> Result<Vec<MatchRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open match table {}", path.display()))?;
    let records = read_records_with(file, rerank)
        .with_context(|| format!("Failed to parse match table {}", path.display()))?;

    info!("Loaded {} match rows from {}", records.len(), path.display());
    Ok(records)
}

fn warn_on_size_mismatch(records: &[MatchRecord]) {
    let mut counts: HashMap<&str, (u32, u32)> = HashMap::new();
    for record in records {
        let entry = counts
            .entry(record.match_id.as_str())
            .or_insert((0, record.num_players));
        entry.0 += 1;
    }

    for (match_id, (rows, reported)) in counts {
        if reported != 0 && rows != reported {
            warn!(
                "Match {} reports {} players but has {} rows; using the row count",
                match_id, reported, rows
            );
        }
    }
}

/// Recompute places inside every match from `total_points`
///
/// Competition ranking: equal totals share the best place, the next total
/// skips accordingly (1, 2, 2, 4).
pub fn rank_by_points(records: &mut [MatchRecord]) -> Result<()> {
    let mut by_match: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, record) in records.iter().enumerate() {
        by_match.entry(record.match_id.clone()).or_default().push(i);
    }

    for (match_id, indices) in by_match {
        let mut points = Vec::with_capacity(indices.len());
        for &i in &indices {
            let total = records[i].total_points.ok_or_else(|| RatingError::MissingPoints {
                match_id: match_id.clone(),
                entity_id: records[i].player.clone(),
            })?;
            points.push(total);
        }

        for (slot, &i) in indices.iter().enumerate() {
            let better = points.iter().filter(|&&p| p > points[slot]).count();
            records[i].place = better as u32 + 1;
        }
    }

    Ok(())
}
