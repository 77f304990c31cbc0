//! Property tests for scoring, expected scores and replay invariants

mod fixtures;

use fixtures::{day, MatchBuilder};
use mars_ratings::rating::{
    expected_score, HistoricalRatingEngine, MultiplayerEloCalculator, RatingCalculator,
    ReplayOptions, ScoreFunction,
};
use mars_ratings::types::{EntityDimension, EntityId, MatchRecord};
use proptest::prelude::*;
use std::sync::Arc;

fn entity_ratings(ratings: &[f64]) -> Vec<(EntityId, f64)> {
    ratings
        .iter()
        .enumerate()
        .map(|(i, r)| (format!("p{}", i), *r))
        .collect()
}

/// Matches drawn from a pool of six players, each match a permutation of a subset
fn history_strategy() -> impl Strategy<Value = Vec<MatchRecord>> {
    let one_match = Just((0..6usize).collect::<Vec<_>>())
        .prop_shuffle()
        .prop_flat_map(|order| (2..=5usize).prop_map(move |n| order[..n].to_vec()));

    prop::collection::vec((one_match, 1u32..28), 1..12).prop_map(|matches| {
        matches
            .into_iter()
            .enumerate()
            .flat_map(|(i, (players, d))| {
                players
                    .into_iter()
                    .fold(MatchBuilder::new(&i.to_string(), day(d)), |builder, p| {
                        builder.finisher(&format!("player{}", p), "Corp", "Base")
                    })
                    .build()
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_scores_sum_to_one(n in 2usize..12, alpha in 1.05f64..4.0) {
        for function in [ScoreFunction::Linear, ScoreFunction::Exponential { alpha }] {
            let total: f64 = (1..=n as u32).map(|place| function.score(place, n).unwrap()).sum();
            prop_assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_scores_fall_with_place(n in 2usize..12, alpha in 1.05f64..4.0) {
        for function in [ScoreFunction::Linear, ScoreFunction::Exponential { alpha }] {
            for place in 1..n as u32 {
                let here = function.score(place, n).unwrap();
                let next = function.score(place + 1, n).unwrap();
                prop_assert!(here > next);
            }
            prop_assert_eq!(function.score(n as u32, n).unwrap(), 0.0);
        }
    }

    #[test]
    fn prop_expected_scores_sum_to_one(ratings in prop::collection::vec(200.0f64..2500.0, 2..8)) {
        let active = entity_ratings(&ratings);
        let total: f64 = active
            .iter()
            .map(|(id, _)| expected_score(&active, id, 400.0).unwrap())
            .sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn prop_update_order_is_irrelevant(
        ratings in prop::collection::vec(500.0f64..1500.0, 2..6),
        seed in any::<u64>(),
    ) {
        let calculator = MultiplayerEloCalculator::default();
        let players = entity_ratings(&ratings);
        let rankings: Vec<(EntityId, u32)> = players
            .iter()
            .enumerate()
            .map(|(i, (id, _))| (id.clone(), i as u32 + 1))
            .collect();

        let forward = calculator.calculate_rating_changes(&players, &rankings).unwrap();

        let mut rotated = players.clone();
        rotated.rotate_left((seed as usize) % players.len());
        let rotated_changes = calculator.calculate_rating_changes(&rotated, &rankings).unwrap();

        for change in &forward {
            let twin = rotated_changes.iter().find(|c| c.entity_id == change.entity_id).unwrap();
            prop_assert!((twin.new_rating - change.new_rating).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_replay_invariants(records in history_strategy()) {
        let engine = HistoricalRatingEngine::new(Arc::new(MultiplayerEloCalculator::default()));
        let history = engine
            .replay(&records, EntityDimension::Player, &ReplayOptions::default())
            .unwrap();

        let matches = history.matches_replayed;
        let roster = history.final_ratings.len();
        prop_assert_eq!(history.rows.len(), roster * (matches + 1));

        let earliest = records.iter().map(|r| r.date).min().unwrap();
        for (entity_id, entry) in &history.final_ratings {
            let trajectory = history.trajectory(entity_id);
            prop_assert_eq!(trajectory[0].sequence_number, 1);
            prop_assert_eq!(trajectory[0].rating, 1000.0);
            prop_assert_eq!(trajectory[0].date, earliest.pred_opt().unwrap());
            prop_assert_eq!(trajectory.last().unwrap().rating, entry.rating);

            // rating only moves in matches the entity played
            let moves = trajectory
                .windows(2)
                .filter(|pair| pair[0].rating != pair[1].rating)
                .count() as u32;
            prop_assert!(moves <= entry.matches_played);
        }

        let total: f64 = history.final_ratings.values().map(|e| e.rating).sum();
        prop_assert!((total - 1000.0 * roster as f64).abs() < 1e-6);
    }

    #[test]
    fn prop_include_filter_does_not_change_ratings(records in history_strategy()) {
        let engine = HistoricalRatingEngine::new(Arc::new(MultiplayerEloCalculator::default()));
        let full = engine
            .replay(&records, EntityDimension::Player, &ReplayOptions::default())
            .unwrap();
        let filtered = engine
            .replay(
                &records,
                EntityDimension::Player,
                &ReplayOptions::default().with_include(["player0", "player3"]),
            )
            .unwrap();

        prop_assert!(filtered
            .rows
            .iter()
            .all(|r| r.entity_id == "player0" || r.entity_id == "player3"));
        for row in &filtered.rows {
            prop_assert_eq!(full.rating_at(&row.entity_id, row.sequence_number), Some(row.rating));
        }
        prop_assert_eq!(full.final_ratings, filtered.final_ratings);
    }
}
