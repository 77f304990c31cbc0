//! Utility functions for the rating engine

use crate::error::{RatingError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

/// Date of the synthetic baseline: the day before the earliest match
pub fn baseline_date(earliest: NaiveDate) -> Result<NaiveDate> {
    earliest.pred_opt().ok_or_else(|| {
        RatingError::InternalError {
            message: format!("No calendar day precedes {}", earliest),
        }
        .into()
    })
}

/// Parse `YYYY-MM-DD`, tolerating a trailing time of day
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Order match identifiers numerically when both are integers, lexically otherwise
///
/// Distinct ids never compare equal: ids with the same numeric value ("01",
/// "1") fall back to their text.
pub fn compare_match_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Round a rating to the nearest integer for display
pub fn round_rating(rating: f64) -> i64 {
    rating.round() as i64
}
