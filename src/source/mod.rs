//! Candidate sources
//!
//! A candidate source resolves hard constraints (meal type, dish type, diet
//! labels, cautions, training body part, injuries) and returns raw records.
//! Equipment is deliberately not part of the exercise query: feasibility is
//! decided by the engine.

mod catalog;

pub use catalog::StaticCatalog;

use crate::error::EngineError;
use crate::schema::{ExerciseRecord, RecipeRecord};
use serde::{Deserialize, Serialize};

/// Hard constraints for a recipe lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeQuery {
    /// Graph meal-type label, e.g. `lunch/dinner`
    pub meal_type: String,
    /// Any of these dish types qualifies; empty means no restriction
    pub dish_types: Vec<String>,
    /// Every one of these labels is required
    pub diet_labels: Vec<String>,
    /// Preferred health labels, forwarded for sources that can rank by them
    pub health_labels: Vec<String>,
    /// None of these cautions may be present
    pub forbidden_cautions: Vec<String>,
    pub limit: usize,
}

/// Hard constraints for an exercise lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseQuery {
    pub target_body_part: String,
    /// Exercises involving any of these body parts must not be returned
    pub injured_body_parts: Vec<String>,
    pub limit: usize,
}

/// Read-only handle to the candidate store
///
/// Implementations must tolerate concurrent reads if they are shared across
/// threads; the engine never writes through this handle.
pub trait CandidateSource {
    fn fetch_recipes(&self, query: &RecipeQuery) -> Result<Vec<RecipeRecord>, EngineError>;

    fn fetch_exercises(&self, query: &ExerciseQuery) -> Result<Vec<ExerciseRecord>, EngineError>;
}

impl<T: CandidateSource + ?Sized> CandidateSource for &T {
    fn fetch_recipes(&self, query: &RecipeQuery) -> Result<Vec<RecipeRecord>, EngineError> {
        (**self).fetch_recipes(query)
    }

    fn fetch_exercises(&self, query: &ExerciseQuery) -> Result<Vec<ExerciseRecord>, EngineError> {
        (**self).fetch_exercises(query)
    }
}
