//! Exercise scoring and ranking
//!
//! Exercises are ranked individually. The score rewards muscles the user has
//! trained often over the long run and subtracts short-term fatigue: the
//! cooldown of the exact movement plus the worst recent load across the
//! exercise's target muscles.

use crate::history::ExerciseHistory;
use crate::types::{round_to, ExerciseCandidate, RankedExercise};
use std::cmp::Ordering;

/// Bonus per logged session of each target muscle
const MUSCLE_FREQUENCY_WEIGHT: f64 = 0.3;

/// Scorer for feasible exercise candidates
pub struct ExerciseScorer<'a> {
    history: &'a ExerciseHistory,
}

impl<'a> ExerciseScorer<'a> {
    pub fn new(history: &'a ExerciseHistory) -> Self {
        Self { history }
    }

    pub fn score(&self, candidate: &ExerciseCandidate) -> f64 {
        // fold from +0.0: an empty f64 sum is -0.0, which total_cmp orders below 0.0
        let frequency_bonus = candidate.target_muscles.iter().fold(0.0, |bonus, muscle| {
            bonus + f64::from(self.history.muscle_frequency(muscle)) * MUSCLE_FREQUENCY_WEIGHT
        });

        let score = frequency_bonus
            - self.history.exercise_penalty(&candidate.id)
            - self.history.max_muscle_penalty(&candidate.target_muscles);

        if score.is_finite() {
            score
        } else {
            0.0
        }
    }

    /// Rank candidates by descending score and keep the first `top_k`.
    ///
    /// The sort is stable, so equal scores keep their input order.
    pub fn rank(&self, candidates: Vec<ExerciseCandidate>, top_k: usize) -> Vec<RankedExercise> {
        let mut scored: Vec<(f64, ExerciseCandidate)> = candidates
            .into_iter()
            .map(|candidate| (self.score(&candidate), candidate))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        scored
            .into_iter()
            .take(top_k)
            .enumerate()
            .map(|(position, (score, exercise))| RankedExercise {
                rank: position + 1,
                score: round_to(score, 3),
                exercise,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HistoryEvent;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn chest_exercise(id: &str, muscles: &[&str]) -> ExerciseCandidate {
        ExerciseCandidate {
            id: id.to_string(),
            name: id.replace('_', " "),
            body_part: Some("Chest".to_string()),
            target_muscles: muscles.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    fn ids(ranked: &[RankedExercise]) -> Vec<&str> {
        ranked.iter().map(|r| r.exercise.id.as_str()).collect()
    }

    #[test]
    fn test_recent_bench_press_ranks_below_fresh_alternative() {
        let pecs = vec!["Pectoralis Major Sternal".to_string()];
        let history: Vec<HistoryEvent> = [6, 20, 40]
            .into_iter()
            .map(|hours| HistoryEvent::exercise("bench_press", pecs.clone(), now() - Duration::hours(hours)))
            .collect();
        let profile = ExerciseHistory::from_events(&history, now());
        let scorer = ExerciseScorer::new(&profile);

        let candidates = vec![
            chest_exercise("bench_press", &["Pectoralis Major Sternal"]),
            chest_exercise("cable_fly", &["Pectoralis Major Clavicular"]),
        ];
        let ranked = scorer.rank(candidates, 2);

        assert_eq!(ids(&ranked), vec!["cable_fly", "bench_press"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
        assert!(ranked[1].score < ranked[0].score);
    }

    #[test]
    fn test_score_components() {
        let history = vec![
            HistoryEvent::exercise("push_up", vec!["Triceps".to_string()], now() - Duration::days(2)),
            HistoryEvent::exercise("dip", vec!["Triceps".to_string()], now() - Duration::days(30)),
        ];
        let profile = ExerciseHistory::from_events(&history, now());
        let scorer = ExerciseScorer::new(&profile);

        // Frequency 2 * 0.3, no cooldown for this id, Triceps fatigue 1.5
        let close_grip = chest_exercise("close_grip_press", &["Triceps"]);
        assert!((scorer.score(&close_grip) - (0.6 - 1.5)).abs() < 1e-9);

        // Same movement: 0.6 - 1.5 (cooldown) - 1.5 (muscle)
        let push_up = chest_exercise("push_up", &["Triceps"]);
        assert!((scorer.score(&push_up) - (0.6 - 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let profile = ExerciseHistory::default();
        let scorer = ExerciseScorer::new(&profile);
        let candidates = vec![
            chest_exercise("a", &["Pectoralis"]),
            chest_exercise("b", &[]),
            chest_exercise("c", &["Deltoid"]),
        ];

        let ranked = scorer.rank(candidates, 10);
        assert_eq!(ids(&ranked), vec!["a", "b", "c"]);
        assert!(ranked.iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn test_bodyweight_move_without_muscles_keeps_its_place() {
        let profile = ExerciseHistory::default();
        let scorer = ExerciseScorer::new(&profile);

        let plank = chest_exercise("plank", &[]);
        assert!(scorer.score(&plank).is_sign_positive());

        let ranked = scorer.rank(vec![plank, chest_exercise("fly", &["Pectoralis Major"])], 2);
        assert_eq!(ids(&ranked), vec!["plank", "fly"]);
    }

    #[test]
    fn test_top_k_truncates() {
        let profile = ExerciseHistory::default();
        let scorer = ExerciseScorer::new(&profile);
        let candidates = vec![
            chest_exercise("a", &[]),
            chest_exercise("b", &[]),
            chest_exercise("c", &[]),
        ];

        assert_eq!(scorer.rank(candidates.clone(), 2).len(), 2);
        assert!(scorer.rank(candidates, 0).is_empty());
        assert!(scorer.rank(Vec::new(), 3).is_empty());
    }
}
