//! Engine configuration
//!
//! Caps and retrieval settings. Scoring weights are fixed constants in the
//! scoring modules and are not configurable.

use crate::error::EngineError;
use crate::types::MealSlot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub limits: EngineLimits,
    /// Dish types requested from the graph for each meal slot
    pub dish_types: BTreeMap<MealSlot, Vec<String>>,
}

/// Size limits applied around retrieval and enumeration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineLimits {
    /// Recipes kept before combination enumeration (bounds `C(n, 3)`)
    pub max_meal_candidates: usize,
    /// Exercises kept before scoring
    pub max_exercise_candidates: usize,
    /// `limit` forwarded to the candidate source
    pub retrieval_limit: usize,
    pub default_meal_top_k: usize,
    pub default_exercise_top_k: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_meal_candidates: 50,
            max_exercise_candidates: 200,
            retrieval_limit: 50,
            default_meal_top_k: 3,
            default_exercise_top_k: 5,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let dish_types = [
            (MealSlot::Breakfast, &["bread", "egg", "cereals"][..]),
            (MealSlot::Lunch, &["main course", "salad", "soup"][..]),
            (MealSlot::Dinner, &["main course", "salad", "soup"][..]),
            (MealSlot::Snack, &["snack", "desserts", "drinks"][..]),
            (MealSlot::Brunch, &["main course", "salad"][..]),
        ]
        .into_iter()
        .map(|(slot, dishes)| (slot, dishes.iter().map(|d| d.to_string()).collect()))
        .collect();

        Self {
            limits: EngineLimits::default(),
            dish_types,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Dish types for a slot; an unlisted slot means no dish restriction
    pub fn dish_types_for(&self, slot: MealSlot) -> &[String] {
        self.dish_types.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let limits = &self.limits;
        let checks = [
            ("max_meal_candidates", limits.max_meal_candidates),
            ("max_exercise_candidates", limits.max_exercise_candidates),
            ("retrieval_limit", limits.retrieval_limit),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(EngineError::InvalidConfig(format!(
                    "limits.{name} must be greater than zero"
                )));
            }
        }
        Ok(())
    }
}
