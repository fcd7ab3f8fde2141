//! Fitplan Engine - Ranking core for exercise and meal recommendations
//!
//! The engine ranks candidates that a knowledge graph has already retrieved
//! under the user's hard constraints. It is deterministic and synchronous:
//! candidate retrieval → adaptation → feasibility → scoring → diverse top-K.
//!
//! ## Modules
//!
//! - **Meal Pipeline**: energy target, combinatorial meal-plan scoring and
//!   diversity-aware selection
//! - **Exercise Pipeline**: equipment feasibility and history-aware ranking

pub mod config;
pub mod diversity;
pub mod energy;
pub mod error;
pub mod exercise;
pub mod feasibility;
pub mod history;
pub mod meal_plan;
pub mod normalizer;
pub mod pipeline;
pub mod schema;
pub mod source;
pub mod types;

pub use config::{EngineConfig, EngineLimits};
pub use error::EngineError;
pub use pipeline::{recommend_exercises, recommend_meals, Recommender};
pub use source::{CandidateSource, ExerciseQuery, RecipeQuery, StaticCatalog};

pub use types::{
    ExerciseProfile, ExerciseRecommendation, MealPlan, MealSlot, RankedExercise, UserContext,
};

/// Engine version
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name reported by tooling
pub const ENGINE_NAME: &str = "fitplan-engine";
