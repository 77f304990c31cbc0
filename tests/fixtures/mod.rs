//! Test fixtures for building match tables

#![allow(dead_code)]

use chrono::NaiveDate;
use mars_ratings::types::MatchRecord;

/// Builder for the rows of one match
pub struct MatchBuilder {
    match_id: String,
    date: NaiveDate,
    rows: Vec<(String, String, String, Option<f64>)>,
}

impl MatchBuilder {
    pub fn new(match_id: &str, date: NaiveDate) -> Self {
        Self {
            match_id: match_id.to_string(),
            date,
            rows: Vec::new(),
        }
    }

    /// Add the next finisher; rows are added best first
    pub fn finisher(mut self, player: &str, corporation: &str, origin: &str) -> Self {
        self.rows
            .push((player.to_string(), corporation.to_string(), origin.to_string(), None));
        self
    }

    /// Add a finisher with a point total
    pub fn scored(mut self, player: &str, corporation: &str, origin: &str, points: f64) -> Self {
        self.rows.push((
            player.to_string(),
            corporation.to_string(),
            origin.to_string(),
            Some(points),
        ));
        self
    }

    pub fn build(self) -> Vec<MatchRecord> {
        let n = self.rows.len() as u32;
        self.rows
            .into_iter()
            .enumerate()
            .map(|(i, (player, corporation, origin, points))| MatchRecord {
                match_id: self.match_id.clone(),
                date: self.date,
                player,
                num_players: n,
                place: i as u32 + 1,
                corporation,
                corporation_origin: origin,
                total_points: points,
            })
            .collect()
    }
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 9, d).expect("valid test date")
}

/// A small season: five games, four players, mixed sizes, one late joiner
pub fn season() -> Vec<MatchRecord> {
    let mut records = Vec::new();
    records.extend(
        MatchBuilder::new("1", day(1))
            .finisher("Alice", "Ecoline", "Base")
            .finisher("Bob", "Helion", "Base")
            .finisher("Carol", "Vitor", "Prelude")
            .build(),
    );
    records.extend(
        MatchBuilder::new("2", day(3))
            .finisher("Bob", "Aridor", "Colonies")
            .finisher("Alice", "Teractor", "Base")
            .build(),
    );
    records.extend(
        MatchBuilder::new("3", day(3))
            .finisher("Carol", "Ecoline", "Base")
            .finisher("Alice", "Vitor", "Prelude")
            .finisher("Bob", "Thorgate", "Base")
            .build(),
    );
    records.extend(
        MatchBuilder::new("4", day(8))
            .finisher("Dave", "Helion", "Base")
            .finisher("Carol", "Teractor", "Base")
            .finisher("Alice", "Aridor", "Colonies")
            .finisher("Bob", "Ecoline", "Base")
            .build(),
    );
    records.extend(
        MatchBuilder::new("5", day(12))
            .finisher("Alice", "Thorgate", "Base")
            .finisher("Dave", "Vitor", "Prelude")
            .build(),
    );
    records
}
