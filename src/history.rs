//! History-based penalties
//!
//! Exercise history uses a step decay: the same movement or muscle trained
//! within the last day is penalized hardest and anything older than a week
//! not at all. A separate, undecayed muscle counter captures the user's
//! long-term focus areas.
//!
//! Diet history only looks back one week. A recipe logged `d` whole days ago
//! contributes `1 / (d + 1)`; older logs are skipped outright.

use crate::types::HistoryEvent;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Diet logs older than this are ignored
pub const DIET_HISTORY_WINDOW_DAYS: f64 = 7.0;

/// Step decay for exercise history given elapsed days
pub fn exercise_decay(days_ago: f64) -> f64 {
    if days_ago < 1.0 {
        2.0
    } else if days_ago < 3.0 {
        1.5
    } else if days_ago < 7.0 {
        0.5
    } else {
        0.0
    }
}

/// Fractional days between `timestamp` and `now`; future events count as now
pub fn elapsed_days(now: DateTime<Utc>, timestamp: DateTime<Utc>) -> f64 {
    let seconds = (now - timestamp).num_milliseconds() as f64 / 1000.0;
    (seconds / SECONDS_PER_DAY).max(0.0)
}

fn muscle_key(muscle: &str) -> String {
    muscle.trim().to_lowercase()
}

/// Exercise penalties and long-term muscle counts derived from history
#[derive(Debug, Clone, Default)]
pub struct ExerciseHistory {
    exercise_penalty: HashMap<String, f64>,
    muscle_penalty: HashMap<String, f64>,
    muscle_frequency: HashMap<String, u32>,
}

impl ExerciseHistory {
    /// Aggregate a history feed relative to `now`.
    ///
    /// Entries without a readable timestamp contribute nothing. Diet logs are
    /// ignored.
    pub fn from_events(history: &[HistoryEvent], now: DateTime<Utc>) -> Self {
        let mut profile = Self::default();

        for event in history.iter().filter(|e| !e.is_diet_log()) {
            let Some(timestamp) = event.timestamp else {
                continue;
            };
            let decay = exercise_decay(elapsed_days(now, timestamp));

            if let Some(id) = event.logged_exercise_id() {
                *profile.exercise_penalty.entry(id.to_string()).or_insert(0.0) += decay;
            }

            for muscle in &event.target_muscles {
                let key = muscle_key(muscle);
                if key.is_empty() {
                    continue;
                }
                *profile.muscle_frequency.entry(key.clone()).or_insert(0) += 1;
                *profile.muscle_penalty.entry(key).or_insert(0.0) += decay;
            }
        }

        profile
    }

    /// Summed decay of past sessions of this exact exercise
    pub fn exercise_penalty(&self, exercise_id: &str) -> f64 {
        self.exercise_penalty.get(exercise_id).copied().unwrap_or(0.0)
    }

    /// Summed decay of past sessions that trained this muscle
    pub fn muscle_penalty(&self, muscle: &str) -> f64 {
        self.muscle_penalty
            .get(&muscle_key(muscle))
            .copied()
            .unwrap_or(0.0)
    }

    /// Largest fatigue penalty among the given muscles (0 when empty)
    pub fn max_muscle_penalty(&self, muscles: &[String]) -> f64 {
        muscles
            .iter()
            .map(|m| self.muscle_penalty(m))
            .fold(0.0, f64::max)
    }

    /// How many logged sessions trained this muscle, regardless of age
    pub fn muscle_frequency(&self, muscle: &str) -> u32 {
        self.muscle_frequency
            .get(&muscle_key(muscle))
            .copied()
            .unwrap_or(0)
    }
}

/// Recent diet logs used to discourage repeating a recipe
#[derive(Debug, Clone, Default)]
pub struct DietHistory {
    /// (whole days elapsed, lower-cased summary)
    recent: Vec<(u32, String)>,
}

impl DietHistory {
    /// Keep diet logs from the last week that have a timestamp and a summary
    pub fn from_events(history: &[HistoryEvent], now: DateTime<Utc>) -> Self {
        let recent = history
            .iter()
            .filter(|event| event.is_diet_log())
            .filter_map(|event| {
                let days = elapsed_days(now, event.timestamp?);
                if days > DIET_HISTORY_WINDOW_DAYS {
                    return None;
                }
                let summary = event.summary.as_deref()?.to_lowercase();
                Some((days.floor() as u32, summary))
            })
            .collect();
        Self { recent }
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    /// Penalty for one recipe: sum of `1 / (days + 1)` over logs mentioning it
    pub fn recipe_penalty(&self, recipe_name: &str) -> f64 {
        let needle = recipe_name.trim().to_lowercase();
        if needle.is_empty() {
            return 0.0;
        }
        self.recent
            .iter()
            .filter(|(_, summary)| summary.contains(&needle))
            .fold(0.0, |penalty, (days, _)| penalty + 1.0 / (f64::from(*days) + 1.0))
    }

    /// Penalty for a set of recipes
    pub fn combination_penalty<'a, I>(&self, recipe_names: I) -> f64
    where
        I: IntoIterator<Item = &'a str>,
    {
        recipe_names
            .into_iter()
            .fold(0.0, |penalty, name| penalty + self.recipe_penalty(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn days_ago(days: f64) -> DateTime<Utc> {
        now() - Duration::milliseconds((days * SECONDS_PER_DAY * 1000.0) as i64)
    }

    fn muscles(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_step_decay() {
        assert_eq!(exercise_decay(0.5), 2.0);
        assert_eq!(exercise_decay(1.0), 1.5);
        assert_eq!(exercise_decay(2.9), 1.5);
        assert_eq!(exercise_decay(3.0), 0.5);
        assert_eq!(exercise_decay(6.99), 0.5);
        assert_eq!(exercise_decay(7.0), 0.0);
        assert_eq!(exercise_decay(10.0), 0.0);
    }

    #[test]
    fn test_repeated_exercise_penalty() {
        let history = vec![
            HistoryEvent::exercise("squat", muscles(&["Quadriceps"]), days_ago(0.0)),
            HistoryEvent::exercise("squat", muscles(&["Quadriceps"]), days_ago(5.0)),
        ];
        let profile = ExerciseHistory::from_events(&history, now());

        assert!((profile.exercise_penalty("squat") - 2.5).abs() < 1e-9);
        assert_eq!(profile.exercise_penalty("lunge"), 0.0);
    }

    #[test]
    fn test_muscle_penalty_and_frequency() {
        let history = vec![
            HistoryEvent::exercise("bench", muscles(&["Pectoralis Major"]), days_ago(0.5)),
            HistoryEvent::exercise("fly", muscles(&["pectoralis major", "Deltoid"]), days_ago(2.0)),
            HistoryEvent::exercise("row", muscles(&["Latissimus"]), days_ago(30.0)),
        ];
        let profile = ExerciseHistory::from_events(&history, now());

        assert!((profile.muscle_penalty("Pectoralis Major") - 3.5).abs() < 1e-9);
        assert!((profile.muscle_penalty("Deltoid") - 1.5).abs() < 1e-9);
        assert_eq!(profile.muscle_penalty("Latissimus"), 0.0);
        assert_eq!(profile.muscle_frequency("Latissimus"), 1);
        assert_eq!(profile.muscle_frequency("Pectoralis Major"), 2);

        let max = profile.max_muscle_penalty(&muscles(&["Deltoid", "Pectoralis Major"]));
        assert!((max - 3.5).abs() < 1e-9);
        assert_eq!(profile.max_muscle_penalty(&[]), 0.0);
    }

    #[test]
    fn test_missing_timestamp_contributes_nothing() {
        let history = vec![HistoryEvent {
            timestamp: None,
            exercise_id: Some("squat".to_string()),
            target_muscles: muscles(&["Quadriceps"]),
            ..Default::default()
        }];
        let profile = ExerciseHistory::from_events(&history, now());

        assert_eq!(profile.exercise_penalty("squat"), 0.0);
        assert_eq!(profile.muscle_frequency("Quadriceps"), 0);
    }

    #[test]
    fn test_short_id_spelling_counts_as_exercise() {
        let events: Vec<HistoryEvent> = serde_json::from_str(&format!(
            r#"[
                {{"id": "squat", "timestamp": "{ts}"}},
                {{"id": "log-1", "exercise_id": "lunge", "timestamp": "{ts}"}}
            ]"#,
            ts = (now() - Duration::hours(12)).to_rfc3339()
        ))
        .unwrap();
        let profile = ExerciseHistory::from_events(&events, now());

        assert!((profile.exercise_penalty("squat") - 2.0).abs() < 1e-9);
        assert!((profile.exercise_penalty("lunge") - 2.0).abs() < 1e-9);
        assert_eq!(profile.exercise_penalty("log-1"), 0.0);
    }

    #[test]
    fn test_diet_penalty_window_and_weighting() {
        let history = vec![
            HistoryEvent::diet("Lunch: Mapo Tofu with rice", days_ago(0.2)),
            HistoryEvent::diet("mapo tofu again", days_ago(2.5)),
            HistoryEvent::diet("Mapo Tofu", days_ago(9.0)),
            HistoryEvent::exercise("mapo tofu", vec![], days_ago(0.0)),
        ];
        let diet = DietHistory::from_events(&history, now());

        assert_eq!(diet.len(), 2);
        // 1/(0+1) + 1/(2+1)
        let expected = 1.0 + 1.0 / 3.0;
        assert!((diet.recipe_penalty("Mapo Tofu") - expected).abs() < 1e-9);
        assert_eq!(diet.recipe_penalty("Kung Pao Chicken"), 0.0);
        assert_eq!(diet.recipe_penalty(""), 0.0);

        let combo = diet.combination_penalty(["Mapo Tofu", "Rice"]);
        assert!((combo - (expected + 1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_future_timestamps_clamp_to_now() {
        let future = now() + Duration::hours(6);
        assert_eq!(elapsed_days(now(), future), 0.0);
        assert_eq!(exercise_decay(elapsed_days(now(), future)), 2.0);
    }
}
