//! Derived tables for downstream consumers
//!
//! The dense rating history is the primary output. This module derives the
//! current-ratings view and the per-player win-rate summary from it and the
//! match table, and writes any of them as CSV or JSON.

use crate::error::{RatingError, Result};
use crate::types::{EntityId, MatchRecord, RatingHistoryRow};
use crate::utils::round_rating;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Latest rating of an entity, rounded for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentRating {
    pub entity_id: EntityId,
    pub rating: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// Wins and games of one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinRate {
    pub player: EntityId,
    pub wins: u32,
    pub games: u32,
    pub win_rate: f64,
}

/// Rows at the highest sequence number, rounded, best first
pub fn current_ratings(rows: &[RatingHistoryRow]) -> Vec<CurrentRating> {
    let Some(last) = rows.iter().map(|row| row.sequence_number).max() else {
        return Vec::new();
    };

    let mut current: Vec<CurrentRating> = rows
        .iter()
        .filter(|row| row.sequence_number == last)
        .map(|row| CurrentRating {
            entity_id: row.entity_id.clone(),
            rating: round_rating(row.rating),
            origin: row.origin.clone(),
        })
        .collect();

    current.sort_by(|a, b| {
        b.rating
            .cmp(&a.rating)
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
    current
}

/// Per-player win rate, a win being a first place
pub fn win_rates(records: &[MatchRecord]) -> Vec<WinRate> {
    let mut tally: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
    for record in records {
        let entry = tally.entry(record.player.as_str()).or_default();
        entry.1 += 1;
        if record.place == 1 {
            entry.0 += 1;
        }
    }

    let mut rates: Vec<WinRate> = tally
        .into_iter()
        .map(|(player, (wins, games))| WinRate {
            player: player.to_string(),
            wins,
            games,
            win_rate: wins as f64 / games as f64,
        })
        .collect();

    rates.sort_by(|a, b| {
        b.win_rate
            .total_cmp(&a.win_rate)
            .then_with(|| a.player.cmp(&b.player))
    });
    rates
}

/// Serialization format of written tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = RatingError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(RatingError::ConfigurationError {
                message: format!("Unsupported output format: {}", other),
            }),
        }
    }
}

/// Write rows as CSV with a header line
pub fn write_csv<T: Serialize, W: Write>(rows: &[T], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write rows as a pretty-printed JSON array
pub fn write_json<T: Serialize, W: Write>(rows: &[T], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Write a table to `<dir>/<name>.<ext>` and return its path
pub fn write_table<T: Serialize>(
    dir: &Path,
    name: &str,
    format: OutputFormat,
    rows: &[T],
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let path = dir.join(format!("{}.{}", name, format.extension()));
    let file =
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    let writer = BufWriter::new(file);

    let written = match format {
        OutputFormat::Csv => write_csv(rows, writer),
        OutputFormat::Json => write_json(rows, writer),
    };
    written.with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(path)
}
