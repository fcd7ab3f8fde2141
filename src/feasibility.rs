//! Equipment feasibility
//!
//! Equipment variants are folded into a parent category, and only categories
//! that are real, scarce hardware need to be owned. Everything else (body
//! weight, a bench, a wall) is assumed available. The check is a strict gate:
//! an infeasible exercise is removed before scoring, not penalized.

use crate::types::ExerciseCandidate;
use std::collections::HashSet;

/// Hardware the user must actually own
pub const REAL_EQUIPMENT: &[&str] = &[
    "Barbell",
    "Dumbbell",
    "Cable",
    "Smith",
    "Lever",
    "Suspended",
    "Sled",
    "Band Resistive",
];

/// Equipment assumed when the user never said what they have
pub const GYM_PRESET: &[&str] = REAL_EQUIPMENT;

/// Specific variants and synonyms mapped to their parent category
const EQUIPMENT_PARENT: &[(&str, &str)] = &[
    ("Lever (plate loaded)", "Lever"),
    ("Lever (selectorized)", "Lever"),
    ("Sled (plate loaded)", "Sled"),
    ("Sled (selectorized)", "Sled"),
    ("Suspension", "Suspended"),
    ("Smith Machine", "Smith"),
    ("Resistance Band", "Band Resistive"),
];

/// Parent category for an equipment tag (the tag itself if unmapped)
pub fn canonical_equipment(tag: &str) -> &str {
    let tag = tag.trim();
    EQUIPMENT_PARENT
        .iter()
        .find(|(variant, _)| variant.eq_ignore_ascii_case(tag))
        .map(|(_, parent)| *parent)
        .unwrap_or(tag)
}

fn is_real_equipment(category: &str) -> bool {
    REAL_EQUIPMENT
        .iter()
        .any(|real| real.eq_ignore_ascii_case(category))
}

/// Equipment the user owns, stored by canonical category
#[derive(Debug, Clone, Default)]
pub struct EquipmentSet {
    categories: HashSet<String>,
}

impl EquipmentSet {
    pub fn new<I, S>(owned: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let categories = owned
            .into_iter()
            .map(|tag| canonical_equipment(tag.as_ref()).to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();
        Self { categories }
    }

    /// Full commercial gym
    pub fn gym_preset() -> Self {
        Self::new(GYM_PRESET.iter().copied())
    }

    pub fn owns(&self, category: &str) -> bool {
        self.categories.contains(&category.to_lowercase())
    }

    /// Whether an exercise requiring `required` can be performed.
    ///
    /// No declared equipment means bodyweight and is always feasible.
    pub fn permits(&self, required: &[String]) -> bool {
        required.iter().all(|tag| {
            let parent = canonical_equipment(tag);
            !is_real_equipment(parent) || self.owns(parent)
        })
    }

    /// Keep only feasible exercises, preserving order
    pub fn filter(&self, candidates: Vec<ExerciseCandidate>) -> Vec<ExerciseCandidate> {
        candidates
            .into_iter()
            .filter(|candidate| self.permits(&candidate.equipment))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scarce_equipment_requires_ownership() {
        let nothing = EquipmentSet::new(Vec::<String>::new());
        assert!(!nothing.permits(&tags(&["Dumbbell"])));

        let dumbbells = EquipmentSet::new(["Dumbbell"]);
        assert!(dumbbells.permits(&tags(&["Dumbbell"])));
    }

    #[test]
    fn test_generic_equipment_always_available() {
        let nothing = EquipmentSet::new(Vec::<String>::new());
        assert!(nothing.permits(&tags(&["Body Weight"])));
        assert!(nothing.permits(&tags(&["Bench", "Wall"])));
        assert!(nothing.permits(&[]));
    }

    #[test]
    fn test_variants_fold_into_parent() {
        assert_eq!(canonical_equipment("Lever (plate loaded)"), "Lever");
        assert_eq!(canonical_equipment("Suspension"), "Suspended");
        assert_eq!(canonical_equipment("Kettlebell"), "Kettlebell");

        let lever = EquipmentSet::new(["Lever"]);
        assert!(lever.permits(&tags(&["Lever (selectorized)"])));
        assert!(!lever.permits(&tags(&["Sled (plate loaded)"])));

        let owns_variant = EquipmentSet::new(["Smith Machine"]);
        assert!(owns_variant.permits(&tags(&["Smith"])));
    }

    #[test]
    fn test_every_tag_must_be_satisfied() {
        let barbell = EquipmentSet::new(["Barbell"]);
        assert!(!barbell.permits(&tags(&["Barbell", "Cable"])));
        assert!(barbell.permits(&tags(&["Barbell", "Bench"])));
    }

    #[test]
    fn test_gym_preset_covers_real_equipment() {
        let gym = EquipmentSet::gym_preset();
        for item in REAL_EQUIPMENT {
            assert!(gym.permits(&[item.to_string()]));
        }
    }

    #[test]
    fn test_filter_preserves_order() {
        let candidates = vec![
            ExerciseCandidate {
                id: "push_up".to_string(),
                ..Default::default()
            },
            ExerciseCandidate {
                id: "db_press".to_string(),
                equipment: tags(&["Dumbbell"]),
                ..Default::default()
            },
            ExerciseCandidate {
                id: "dip".to_string(),
                equipment: tags(&["Parallel Bars"]),
                ..Default::default()
            },
        ];

        let feasible = EquipmentSet::new(Vec::<String>::new()).filter(candidates);
        let ids: Vec<&str> = feasible.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["push_up", "dip"]);
    }
}
