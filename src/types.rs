//! Core types for the Fitplan engine
//!
//! This module defines the data structures that flow through each stage of the
//! engine: the user context, typed candidates, normalized nutrient profiles and
//! the ranked plans handed back to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Biological sex used by the BMR formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

/// Self-reported activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    #[default]
    Sedentary,
    Light,
    Moderate,
    High,
    Extreme,
}

impl ActivityLevel {
    /// Multiplier applied to BMR to obtain daily expenditure
    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::High => 1.725,
            ActivityLevel::Extreme => 1.9,
        }
    }
}

/// Body composition goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    #[default]
    Maintenance,
    Bulking,
    Cutting,
}

impl Goal {
    pub fn multiplier(&self) -> f64 {
        match self {
            Goal::Maintenance => 1.0,
            Goal::Bulking => 1.12,
            Goal::Cutting => 0.85,
        }
    }
}

/// Meal slot being planned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Brunch,
}

impl MealSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snack => "snack",
            MealSlot::Brunch => "brunch",
        }
    }

    /// Share of daily energy assigned to this slot when nothing was eaten yet
    pub fn default_ratio(&self) -> f64 {
        match self {
            MealSlot::Breakfast => 0.25,
            MealSlot::Lunch => 0.35,
            MealSlot::Dinner => 0.30,
            MealSlot::Snack => 0.10,
            MealSlot::Brunch => 0.30,
        }
    }

    /// Meal-type label used by the recipe graph. Lunch recipes are stored
    /// under a combined lunch/dinner label.
    pub fn graph_meal_type(&self) -> &'static str {
        match self {
            MealSlot::Lunch => "lunch/dinner",
            other => other.as_str(),
        }
    }
}

/// User demographics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(alias = "gender")]
    pub sex: Sex,
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
    /// Used as the preferred cuisine label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
}

/// Inclusive target range for a tracked nutrient (single-serving units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientRange {
    pub low: f64,
    pub high: f64,
}

impl NutrientRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// Dietary preferences and hard restrictions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DietProfile {
    pub preferred_ingredients: Vec<String>,
    pub disliked_ingredients: Vec<String>,
    /// Required diet labels (hard constraint, resolved by the graph)
    pub diet_labels: Vec<String>,
    /// Preferred health labels (soft, scored)
    pub health_preferences: Vec<String>,
    /// Caution labels that must not appear (hard constraint, resolved by the graph)
    pub forbidden_cautions: Vec<String>,
    /// Tracked nutrients keyed by normalized nutrient key
    pub nutrient_targets: BTreeMap<String, NutrientRange>,
}

/// A meal already logged today
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl IntakeEntry {
    pub fn is_skipped(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("skipped"))
    }
}

/// What the user is planning right now
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentContext {
    #[serde(alias = "meal_time")]
    pub meal_slot: MealSlot,
    #[serde(default)]
    pub today_intake: Vec<IntakeEntry>,
}

/// A past activity or meal event
///
/// Exercise events carry an exercise id and the muscles it trained; diet
/// events carry a type tag and a free-text summary of what was eaten.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryEvent {
    #[serde(
        deserialize_with = "flexible_timestamp::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<String>,
    /// Short spelling of `exercise_id` used by some log writers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub target_muscles: Vec<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl HistoryEvent {
    /// Exercise log entry
    pub fn exercise(
        exercise_id: impl Into<String>,
        target_muscles: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp: Some(timestamp),
            exercise_id: Some(exercise_id.into()),
            id: None,
            target_muscles,
            event_type: Some("WorkoutLog".to_string()),
            summary: None,
        }
    }

    /// Diet log entry
    pub fn diet(summary: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: Some(timestamp),
            exercise_id: None,
            id: None,
            target_muscles: Vec::new(),
            event_type: Some("DietLog".to_string()),
            summary: Some(summary.into()),
        }
    }

    /// Logged exercise, preferring `exercise_id` over `id`
    pub fn logged_exercise_id(&self) -> Option<&str> {
        self.exercise_id.as_deref().or(self.id.as_deref())
    }

    /// Whether this entry records a meal (`DietLog`, `diet_log`, `meal-log`, ...)
    pub fn is_diet_log(&self) -> bool {
        self.event_type.as_deref().is_some_and(|t| {
            let tag: String = t
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .map(|c| c.to_ascii_lowercase())
                .collect();
            tag == "dietlog" || tag == "meallog"
        })
    }
}

/// Everything known about the user for a meal request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    pub demographics: Demographics,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(default, alias = "user_goal")]
    pub goal: Goal,
    #[serde(default)]
    pub diet_profile: DietProfile,
    pub current_context: CurrentContext,
    #[serde(default)]
    pub history: Vec<HistoryEvent>,
}

/// Everything known about the user for an exercise request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseProfile {
    pub target_body_part: String,
    #[serde(alias = "injury_body_part")]
    pub injured_body_parts: Vec<String>,
    /// `None` means the user never stated their equipment; an empty list
    /// means bodyweight only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_equipment: Option<Vec<String>>,
    /// Exercises whose name contains any of these are dropped
    pub exclude_keywords: Vec<String>,
    pub history: Vec<HistoryEvent>,
}

/// Normalized nutrient map: lower-case underscore key to rounded quantity.
///
/// A key that is absent means the quantity was unknown, never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutrientProfile(BTreeMap<String, f64>);

impl NutrientProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Copy of this profile with every quantity multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self(self.0.iter().map(|(k, v)| (k.clone(), v * factor)).collect())
    }

    /// Add another profile into this one, key by key
    pub fn accumulate(&mut self, other: &NutrientProfile) {
        for (key, value) in &other.0 {
            *self.0.entry(key.clone()).or_insert(0.0) += value;
        }
    }

    /// Round every quantity to `decimals` places
    pub fn rounded(&self, decimals: i32) -> Self {
        Self(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), round_to(*v, decimals)))
                .collect(),
        )
    }
}

impl FromIterator<(String, f64)> for NutrientProfile {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Normalized recipe ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    /// Left empty when the source did not state it
    pub quantity: Option<f64>,
    pub measure: String,
    pub weight_g: f64,
    pub text: String,
}

/// Recipe candidate returned by the graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeCandidate {
    pub id: Option<String>,
    pub name: String,
    pub calories: Option<f64>,
    pub servings: Option<f64>,
    pub cuisine_type: Vec<String>,
    pub meal_type: Vec<String>,
    pub dish_type: Vec<String>,
    pub diet_labels: Vec<String>,
    pub health_labels: Vec<String>,
    pub cautions: Vec<String>,
    pub ingredients: Vec<Ingredient>,
    /// Whole-recipe nutrient quantities
    pub nutrients: NutrientProfile,
}

impl RecipeCandidate {
    /// Factor converting whole-recipe quantities to one serving
    pub fn serving_factor(&self) -> f64 {
        let servings = self.servings.filter(|s| s.is_finite()).unwrap_or(1.0);
        1.0 / servings.max(1.0)
    }

    /// Calories of a single serving; unknown calories count as zero
    pub fn single_serving_calories(&self) -> f64 {
        let calories = self.calories.filter(|c| c.is_finite()).unwrap_or(0.0);
        calories * self.serving_factor()
    }
}

/// Exercise candidate returned by the graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseCandidate {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_part: Option<String>,
    pub equipment: Vec<String>,
    pub target_muscles: Vec<String>,
    pub synergist_muscles: Vec<String>,
    pub stabilizer_muscles: Vec<String>,
}

/// One recipe inside a meal plan, scaled to a single serving
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedRecipe {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
    pub recipe_name: String,
    pub servings_used_ratio: f64,
    pub calories: f64,
    pub cuisine_type: Vec<String>,
    pub dish_type: Vec<String>,
    pub ingredients: Vec<Ingredient>,
    pub nutrients: NutrientProfile,
}

/// Weighted contributions that make up a meal plan's base score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub calorie_fit: f64,
    pub protein_bonus: f64,
    pub health_labels: f64,
    pub cuisine: f64,
    pub ingredients: f64,
    pub nutrient_fit: f64,
    /// Already weighted and subtracted from the total
    pub history_penalty: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.calorie_fit
            + self.protein_bonus
            + self.health_labels
            + self.cuisine
            + self.ingredients
            + self.nutrient_fit
            - self.history_penalty
    }
}

/// A scored combination of one to three recipes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlan {
    pub meal_slot: MealSlot,
    pub target_calories: f64,
    pub actual_calories: f64,
    /// Base score before the diversity penalty
    pub score: f64,
    /// Penalty applied by the selector for overlap with earlier picks
    pub diversity_penalty: f64,
    pub breakdown: ScoreBreakdown,
    pub recipes: Vec<PlannedRecipe>,
    /// Aggregated single-serving nutrients across all recipes
    pub nutrients: NutrientProfile,
}

impl MealPlan {
    pub fn recipe_names(&self) -> Vec<&str> {
        self.recipes.iter().map(|r| r.recipe_name.as_str()).collect()
    }
}

/// An exercise with its ranking score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedExercise {
    /// 1-based position in the returned list
    pub rank: usize,
    pub score: f64,
    pub exercise: ExerciseCandidate,
}

/// Exercise ranking with request-level annotations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExerciseRecommendation {
    pub items: Vec<RankedExercise>,
    /// Set when the user's equipment was unknown and a full gym was assumed
    pub assumed_gym_equipment: bool,
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Timestamp deserializer accepting Unix seconds or ISO-8601 text.
/// Anything unreadable becomes `None`.
mod flexible_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    #[allow(dead_code)]
    enum RawTimestamp {
        Seconds(i64),
        FractionalSeconds(f64),
        Text(String),
        Other(serde_json::Value),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
        Ok(raw.and_then(|raw| match raw {
            RawTimestamp::Seconds(secs) => DateTime::from_timestamp(secs, 0),
            RawTimestamp::FractionalSeconds(secs) => from_fractional(secs),
            RawTimestamp::Text(text) => parse_text(&text),
            RawTimestamp::Other(_) => None,
        }))
    }

    fn from_fractional(secs: f64) -> Option<DateTime<Utc>> {
        if !secs.is_finite() {
            return None;
        }
        let whole = secs.floor();
        let nanos = ((secs - whole) * 1e9) as u32;
        DateTime::from_timestamp(whole as i64, nanos)
    }

    fn parse_text(text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&Utc));
        }
        // Naive ISO timestamps are taken as UTC
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        if let Ok(secs) = text.parse::<i64>() {
            return DateTime::from_timestamp(secs, 0);
        }
        text.parse::<f64>().ok().and_then(from_fractional)
    }
}
