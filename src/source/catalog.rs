//! In-memory candidate catalog
//!
//! Holds recipe and exercise records loaded from a JSON document and applies
//! the same hard constraints the graph query would. Label comparisons are
//! case-insensitive.

use super::{CandidateSource, ExerciseQuery, RecipeQuery};
use crate::error::EngineError;
use crate::schema::{ExerciseRecord, RecipeRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Candidate records kept in memory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticCatalog {
    pub recipes: Vec<RecipeRecord>,
    pub exercises: Vec<ExerciseRecord>,
}

impl StaticCatalog {
    pub fn new(recipes: Vec<RecipeRecord>, exercises: Vec<ExerciseRecord>) -> Self {
        Self { recipes, exercises }
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.recipes.len() + self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty() && self.exercises.is_empty()
    }

    fn recipe_matches(record: &RecipeRecord, query: &RecipeQuery) -> bool {
        let meal_type = query.meal_type.trim().to_lowercase();
        let meal_ok = meal_type.is_empty()
            || record
                .meal_type
                .iter()
                .any(|label| label.to_lowercase().contains(&meal_type));

        let dish_ok = query.dish_types.is_empty()
            || query
                .dish_types
                .iter()
                .any(|dish| has_label(&record.dish_type, dish));

        let diet_ok = query
            .diet_labels
            .iter()
            .all(|label| has_label(&record.diet_labels, label));

        let caution_ok = !query
            .forbidden_cautions
            .iter()
            .any(|caution| has_label(&record.cautions, caution));

        meal_ok && dish_ok && diet_ok && caution_ok
    }

    fn exercise_matches(record: &ExerciseRecord, query: &ExerciseQuery) -> bool {
        let target = query.target_body_part.trim();
        let body_part_ok = target.is_empty()
            || record
                .body_part
                .as_deref()
                .is_some_and(|part| part.trim().eq_ignore_ascii_case(target));

        let injury_free = !query
            .injured_body_parts
            .iter()
            .any(|injured| has_label(&record.involved_body_parts, injured));

        body_part_ok && injury_free
    }
}

impl CandidateSource for StaticCatalog {
    fn fetch_recipes(&self, query: &RecipeQuery) -> Result<Vec<RecipeRecord>, EngineError> {
        let records: Vec<RecipeRecord> = self
            .recipes
            .iter()
            .filter(|record| Self::recipe_matches(record, query))
            .take(query.limit)
            .cloned()
            .collect();
        debug!(
            meal_type = %query.meal_type,
            returned = records.len(),
            "catalog recipe lookup"
        );
        Ok(records)
    }

    fn fetch_exercises(&self, query: &ExerciseQuery) -> Result<Vec<ExerciseRecord>, EngineError> {
        let records: Vec<ExerciseRecord> = self
            .exercises
            .iter()
            .filter(|record| Self::exercise_matches(record, query))
            .take(query.limit)
            .cloned()
            .collect();
        debug!(
            body_part = %query.target_body_part,
            returned = records.len(),
            "catalog exercise lookup"
        );
        Ok(records)
    }
}

fn has_label(labels: &[String], wanted: &str) -> bool {
    let wanted = wanted.trim();
    !wanted.is_empty()
        && labels
            .iter()
            .any(|label| label.trim().eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog() -> StaticCatalog {
        StaticCatalog::from_json(
            r#"{
                "recipes": [
                    {"recipe_name": "Oatmeal", "meal_type": "[breakfast]", "dish_type": ["cereals"],
                     "diet_labels": ["Balanced"]},
                    {"recipe_name": "Mapo Tofu", "meal_type": ["lunch/dinner"], "dish_type": ["main course"],
                     "diet_labels": ["High-Protein"], "cautions": ["Soy"]},
                    {"recipe_name": "Beef Stew", "meal_type": ["lunch/dinner"], "dish_type": ["Main Course"],
                     "diet_labels": ["High-Protein", "Low-Carb"]},
                    {"recipe_name": "Lemonade", "meal_type": ["lunch/dinner"], "dish_type": ["drinks"]}
                ],
                "exercises": [
                    {"id": "bench", "name": "Barbell Bench Press", "body_part": "Chest",
                     "involved_body_parts": "[Shoulder, Elbow]", "equipment": ["Barbell"]},
                    {"id": "push_up", "name": "Push-up", "body_part": "chest"},
                    {"id": "squat", "name": "Squat", "body_part": "Thighs", "involved_body_parts": ["Knee"]}
                ]
            }"#,
        )
        .unwrap()
    }

    fn recipe_names(records: &[RecipeRecord]) -> Vec<&str> {
        records
            .iter()
            .filter_map(RecipeRecord::display_name)
            .collect()
    }

    #[test]
    fn test_recipe_hard_constraints() {
        let catalog = catalog();
        let query = RecipeQuery {
            meal_type: "lunch/dinner".to_string(),
            dish_types: vec!["main course".to_string(), "salad".to_string()],
            diet_labels: vec!["high-protein".to_string()],
            forbidden_cautions: vec!["Soy".to_string()],
            limit: 10,
            ..Default::default()
        };

        let records = catalog.fetch_recipes(&query).unwrap();
        assert_eq!(recipe_names(&records), vec!["Beef Stew"]);
    }

    #[test]
    fn test_recipe_limit_keeps_order() {
        let catalog = catalog();
        let query = RecipeQuery {
            meal_type: "lunch".to_string(),
            limit: 2,
            ..Default::default()
        };

        let records = catalog.fetch_recipes(&query).unwrap();
        assert_eq!(recipe_names(&records), vec!["Mapo Tofu", "Beef Stew"]);
    }

    #[test]
    fn test_exercise_body_part_and_injury() {
        let catalog = catalog();
        let chest = ExerciseQuery {
            target_body_part: "Chest".to_string(),
            injured_body_parts: vec![],
            limit: 10,
        };
        let ids: Vec<_> = catalog
            .fetch_exercises(&chest)
            .unwrap()
            .into_iter()
            .filter_map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["bench", "push_up"]);

        let sore_shoulder = ExerciseQuery {
            injured_body_parts: vec!["shoulder".to_string()],
            ..chest
        };
        let ids: Vec<_> = catalog
            .fetch_exercises(&sore_shoulder)
            .unwrap()
            .into_iter()
            .filter_map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["push_up"]);
    }

    #[test]
    fn test_document_mixing_field_spellings_loads() {
        let catalog = StaticCatalog::from_json(
            r#"{
                "recipes": [
                    {"id": "r-1", "recipe_id": "r-1", "name": "Congee", "recipe_name": "Chicken Congee",
                     "meal_type": ["lunch/dinner"],
                     "nutrients": [{"key": "PROCNT", "name": "Protein", "quantity": 20}]}
                ]
            }"#,
        )
        .unwrap();

        let query = RecipeQuery {
            meal_type: "lunch".to_string(),
            limit: 5,
            ..Default::default()
        };
        let records = catalog.fetch_recipes(&query).unwrap();
        assert_eq!(recipe_names(&records), vec!["Chicken Congee"]);
        assert_eq!(records[0].nutrient_entries().len(), 1);
    }

    #[test]
    fn test_invalid_document_is_an_error() {
        assert!(matches!(
            StaticCatalog::from_json("{not json"),
            Err(EngineError::JsonError(_))
        ));
        assert!(StaticCatalog::from_json("{}").unwrap().is_empty());
    }
}
