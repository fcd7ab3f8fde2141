//! Pipeline orchestration
//!
//! This module provides the public API of the engine. It wires retrieval,
//! adaptation, feasibility, scoring and selection into two entry points.
//!
//! Meal pipeline stages:
//! 1. EnergyCalculator - Per-meal calorie target
//! 2. CandidateSource - Hard-constrained recipe lookup
//! 3. RecordAdapter - Typed, normalized candidates (deduplicated, capped)
//! 4. MealPlanScorer - Score every 1-3 recipe combination
//! 5. DiversitySelector - Greedy top-K with overlap penalty
//!
//! Exercise pipeline stages:
//! 1. CandidateSource - Body-part and injury constrained lookup
//! 2. RecordAdapter - Typed candidates, keyword exclusion
//! 3. EquipmentSet - Feasibility gate
//! 4. ExerciseScorer - History-aware ranking

use crate::config::EngineConfig;
use crate::diversity::{DiversityCandidate, DiversitySelector};
use crate::energy::EnergyCalculator;
use crate::error::EngineError;
use crate::exercise::ExerciseScorer;
use crate::feasibility::EquipmentSet;
use crate::history::{DietHistory, ExerciseHistory};
use crate::meal_plan::{combination_count, MealPlanScorer, MealScoringContext};
use crate::schema::RecordAdapter;
use crate::source::{CandidateSource, ExerciseQuery, RecipeQuery};
use crate::types::{
    ExerciseCandidate, ExerciseProfile, ExerciseRecommendation, MealPlan, RankedExercise,
    RecipeCandidate, UserContext,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

/// Recommend meal plans for the user's current meal slot.
///
/// # Arguments
/// * `user` - Demographics, preferences, today's intake and history
/// * `source` - Candidate source resolving the hard constraints
/// * `top_k` - Maximum number of plans to return
///
/// # Returns
/// Up to `top_k` pairwise distinct plans, best first. Empty when no recipe
/// survives retrieval.
///
/// # Example
/// ```ignore
/// let catalog = StaticCatalog::from_file("catalog.json")?;
/// let plans = recommend_meals(&user, &catalog, 3)?;
/// ```
pub fn recommend_meals(
    user: &UserContext,
    source: &dyn CandidateSource,
    top_k: usize,
) -> Result<Vec<MealPlan>, EngineError> {
    Recommender::new().recommend_meals_at(user, source, top_k, Utc::now())
}

/// Recommend exercises for the requested body part.
///
/// # Arguments
/// * `profile` - Target body part, injuries, equipment and history
/// * `source` - Candidate source resolving the hard constraints
/// * `top_k` - Maximum number of exercises to return
///
/// # Returns
/// Up to `top_k` feasible exercises, best first. Empty when nothing is
/// feasible.
pub fn recommend_exercises(
    profile: &ExerciseProfile,
    source: &dyn CandidateSource,
    top_k: usize,
) -> Result<Vec<RankedExercise>, EngineError> {
    Recommender::new().recommend_exercises_at(profile, source, top_k, Utc::now())
}

/// Recommendation engine with its configuration.
///
/// Holds no per-request state, so one instance can serve any number of
/// requests. The instance id tags every tracing span it opens.
pub struct Recommender {
    config: EngineConfig,
    instance_id: String,
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new()
    }
}

impl Recommender {
    /// Create a recommender with the default configuration
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a recommender with a validated configuration
    pub fn with_config(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            instance_id: Uuid::new_v4().to_string(),
        })
    }

    /// Replace the generated instance id (useful for reproducible logs)
    pub fn with_instance_id(mut self, instance_id: String) -> Self {
        self.instance_id = instance_id;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Build the recipe lookup for the user's current slot
    pub fn meal_query(&self, user: &UserContext) -> RecipeQuery {
        let slot = user.current_context.meal_slot;
        let profile = &user.diet_profile;
        RecipeQuery {
            meal_type: slot.graph_meal_type().to_string(),
            dish_types: self.config.dish_types_for(slot).to_vec(),
            diet_labels: profile.diet_labels.clone(),
            health_labels: profile.health_preferences.clone(),
            forbidden_cautions: profile.forbidden_cautions.clone(),
            limit: self.config.limits.retrieval_limit,
        }
    }

    /// Build the exercise lookup. Equipment is not part of it.
    pub fn exercise_query(&self, profile: &ExerciseProfile) -> ExerciseQuery {
        ExerciseQuery {
            target_body_part: profile.target_body_part.clone(),
            injured_body_parts: profile.injured_body_parts.clone(),
            limit: self.config.limits.retrieval_limit,
        }
    }

    /// Recommend meal plans, evaluating history relative to `now`
    pub fn recommend_meals_at(
        &self,
        user: &UserContext,
        source: &dyn CandidateSource,
        top_k: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<MealPlan>, EngineError> {
        let slot = user.current_context.meal_slot;
        let span = info_span!(
            "recommend_meals",
            instance_id = %self.instance_id,
            meal_slot = slot.as_str()
        );
        let _guard = span.enter();

        let energy = EnergyCalculator::compute(user);
        debug!(
            tdee = energy.tdee,
            meal_target = energy.meal_target,
            "computed energy target"
        );

        let records = source.fetch_recipes(&self.meal_query(user))?;
        let recipes = RecordAdapter::recipes(&records);
        let recipes = self.cap_recipes(dedupe_by_name(recipes));

        if recipes.is_empty() || top_k == 0 {
            info!(plans = 0, "no meal candidates available");
            return Ok(Vec::new());
        }

        let diet_history = DietHistory::from_events(&user.history, now);
        let context = MealScoringContext::from_user(user, energy.meal_target, &diet_history);
        let scorer = MealPlanScorer::new(context, &recipes);

        let scored = scorer.score_all();
        debug!(
            candidates = recipes.len(),
            combinations = scored.len(),
            recent_meals = diet_history.len(),
            "scored meal combinations"
        );
        debug_assert_eq!(scored.len(), combination_count(recipes.len()));

        let pool: Vec<DiversityCandidate<'_>> = scored
            .iter()
            .map(|combination| DiversityCandidate {
                base_score: combination.score,
                members: combination
                    .members
                    .iter()
                    .map(|&index| recipes[index].name.as_str())
                    .collect(),
            })
            .collect();

        let plans: Vec<MealPlan> = DiversitySelector::default()
            .select(&pool, top_k)
            .into_iter()
            .map(|selection| scorer.build_plan(&scored[selection.index], selection.penalty))
            .collect();

        info!(plans = plans.len(), "selected meal plans");
        Ok(plans)
    }

    /// Recommend exercises, evaluating history relative to `now`
    pub fn recommend_exercises_at(
        &self,
        profile: &ExerciseProfile,
        source: &dyn CandidateSource,
        top_k: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedExercise>, EngineError> {
        self.recommend_exercises_detailed(profile, source, top_k, now)
            .map(|recommendation| recommendation.items)
    }

    /// Recommend exercises and report whether a full gym was assumed
    pub fn recommend_exercises_detailed(
        &self,
        profile: &ExerciseProfile,
        source: &dyn CandidateSource,
        top_k: usize,
        now: DateTime<Utc>,
    ) -> Result<ExerciseRecommendation, EngineError> {
        let span = info_span!(
            "recommend_exercises",
            instance_id = %self.instance_id,
            body_part = %profile.target_body_part
        );
        let _guard = span.enter();

        let (equipment, assumed_gym_equipment) = match &profile.available_equipment {
            Some(owned) => (EquipmentSet::new(owned), false),
            None => {
                warn!("available equipment not stated; assuming a full gym");
                (EquipmentSet::gym_preset(), true)
            }
        };

        let records = source.fetch_exercises(&self.exercise_query(profile))?;
        let candidates = RecordAdapter::exercises(&records);
        let candidates = exclude_by_keyword(candidates, &profile.exclude_keywords);

        let retrieved = candidates.len();
        let mut feasible = equipment.filter(candidates);
        debug!(
            retrieved,
            feasible = feasible.len(),
            "applied equipment feasibility"
        );

        let cap = self.config.limits.max_exercise_candidates;
        if feasible.len() > cap {
            warn!(
                feasible = feasible.len(),
                cap, "truncating exercise candidates"
            );
            feasible.truncate(cap);
        }

        let history = ExerciseHistory::from_events(&profile.history, now);
        let items = ExerciseScorer::new(&history).rank(feasible, top_k);

        info!(exercises = items.len(), "ranked exercises");
        Ok(ExerciseRecommendation {
            items,
            assumed_gym_equipment,
        })
    }

    fn cap_recipes(&self, mut recipes: Vec<RecipeCandidate>) -> Vec<RecipeCandidate> {
        let cap = self.config.limits.max_meal_candidates;
        if recipes.len() > cap {
            warn!(
                retrieved = recipes.len(),
                cap, "truncating meal candidates before enumeration"
            );
            recipes.truncate(cap);
        }
        recipes
    }
}

/// Keep the first recipe of each name; plans are identified by recipe names
fn dedupe_by_name(recipes: Vec<RecipeCandidate>) -> Vec<RecipeCandidate> {
    let mut seen = HashSet::new();
    let before = recipes.len();
    let unique: Vec<RecipeCandidate> = recipes
        .into_iter()
        .filter(|recipe| seen.insert(recipe.name.trim().to_lowercase()))
        .collect();
    if unique.len() < before {
        debug!(
            duplicates = before - unique.len(),
            "dropped duplicate recipe names"
        );
    }
    unique
}

/// Drop exercises whose name contains any keyword (case-insensitive)
fn exclude_by_keyword(
    candidates: Vec<ExerciseCandidate>,
    keywords: &[String],
) -> Vec<ExerciseCandidate> {
    let keywords: Vec<String> = keywords
        .iter()
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect();
    if keywords.is_empty() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|candidate| {
            let name = candidate.name.to_lowercase();
            !keywords.iter().any(|keyword| name.contains(keyword.as_str()))
        })
        .collect()
}
