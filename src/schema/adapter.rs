//! Adapter for converting graph records to typed candidates
//!
//! Records missing their identity (no id and no name) cannot be ranked or
//! reported and are dropped here; every other missing attribute is carried as
//! `None` or an empty list.

use crate::normalizer::NutrientNormalizer;
use crate::schema::record::{ExerciseRecord, RecipeRecord};
use crate::types::{ExerciseCandidate, RecipeCandidate};
use tracing::debug;

/// Adapter for converting graph records to candidates
pub struct RecordAdapter;

impl RecordAdapter {
    /// Convert one recipe record. The display name falls back to the id.
    pub fn recipe(record: &RecipeRecord) -> Option<RecipeCandidate> {
        let id = record.identifier().map(str::to_string);
        let name = record
            .display_name()
            .map(str::to_string)
            .or_else(|| id.clone())?;

        Some(RecipeCandidate {
            id,
            name,
            calories: record.calories,
            servings: record.servings,
            cuisine_type: record.cuisine_type.clone(),
            meal_type: record.meal_type.clone(),
            dish_type: record.dish_type.clone(),
            diet_labels: record.diet_labels.clone(),
            health_labels: record.health_labels.clone(),
            cautions: record.cautions.clone(),
            ingredients: NutrientNormalizer::normalize_ingredients(&record.ingredients),
            nutrients: NutrientNormalizer::normalize(record.nutrient_entries()),
        })
    }

    /// Convert one exercise record. The id falls back to the name.
    pub fn exercise(record: &ExerciseRecord) -> Option<ExerciseCandidate> {
        let id = record.id.clone().or_else(|| record.name.clone())?;
        let name = record.name.clone().unwrap_or_else(|| id.clone());

        Some(ExerciseCandidate {
            id,
            name,
            instructions: record.instructions.clone(),
            utility: record.utility.clone(),
            force: record.force.clone(),
            body_part: record.body_part.clone(),
            equipment: record.equipment.clone(),
            target_muscles: record.target_muscles.clone(),
            synergist_muscles: record.synergist_muscles.clone(),
            stabilizer_muscles: record.stabilizer_muscles.clone(),
        })
    }

    /// Convert a batch of recipe records, preserving retrieval order
    pub fn recipes(records: &[RecipeRecord]) -> Vec<RecipeCandidate> {
        let candidates: Vec<RecipeCandidate> = records.iter().filter_map(Self::recipe).collect();
        let dropped = records.len() - candidates.len();
        if dropped > 0 {
            debug!(dropped, "dropped recipe records without id or name");
        }
        candidates
    }

    /// Convert a batch of exercise records, preserving retrieval order
    pub fn exercises(records: &[ExerciseRecord]) -> Vec<ExerciseCandidate> {
        let candidates: Vec<ExerciseCandidate> =
            records.iter().filter_map(Self::exercise).collect();
        let dropped = records.len() - candidates.len();
        if dropped > 0 {
            debug!(dropped, "dropped exercise records without id or name");
        }
        candidates
    }
}
