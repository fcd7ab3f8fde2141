//! Meal-plan scoring and combinatorial assembly
//!
//! Every combination of one to three recipes is scored as a weighted sum of
//! calorie fit, preference terms, nutrient-range fit and a diet history
//! penalty. All quantities are reduced to a single serving before they are
//! aggregated.
//!
//! Per-recipe terms are computed once up front. Combinations carry only index
//! vectors into the candidate list and a full [`MealPlan`] is materialized only
//! for the combinations that end up selected.

use crate::history::DietHistory;
use crate::types::{
    round_to, DietProfile, Goal, MealPlan, MealSlot, NutrientProfile, PlannedRecipe,
    RecipeCandidate, ScoreBreakdown, UserContext,
};
use std::collections::BTreeSet;

/// Largest number of recipes in one plan
pub const MAX_COMBINATION_SIZE: usize = 3;

const CALORIE_FIT_WEIGHT: f64 = 0.4;
const HIGH_PROTEIN_BONUS: f64 = 0.2;
const HEALTH_LABEL_WEIGHT: f64 = 0.2;
const CUISINE_WEIGHT: f64 = 0.1;
const LIKED_INGREDIENT_BONUS: f64 = 1.0;
const DISLIKED_INGREDIENT_PENALTY: f64 = 1.5;
const NUTRIENT_IN_RANGE_BONUS: f64 = 1.0;
const HISTORY_WEIGHT: f64 = 0.15;

const HIGH_PROTEIN_LABEL: &str = "High-Protein";

/// Request-level inputs shared by every combination
#[derive(Debug, Clone)]
pub struct MealScoringContext<'a> {
    pub meal_slot: MealSlot,
    pub target_calories: f64,
    pub goal: Goal,
    pub diet_profile: &'a DietProfile,
    /// Preferred cuisine (the user's nationality)
    pub cuisine: Option<&'a str>,
    pub diet_history: &'a DietHistory,
}

impl<'a> MealScoringContext<'a> {
    pub fn from_user(
        user: &'a UserContext,
        target_calories: f64,
        diet_history: &'a DietHistory,
    ) -> Self {
        Self {
            meal_slot: user.current_context.meal_slot,
            target_calories,
            goal: user.goal,
            diet_profile: &user.diet_profile,
            cuisine: user.demographics.nationality.as_deref(),
            diet_history,
        }
    }
}

/// Single-serving figures and preference terms for one recipe
#[derive(Debug, Clone)]
struct RecipeFeatures {
    calories: f64,
    nutrients: NutrientProfile,
    protein_bonus: f64,
    health_labels: f64,
    cuisine: f64,
    ingredients: f64,
    history_penalty: f64,
}

/// A scored combination, referencing recipes by index
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCombination {
    /// Indices into the scorer's recipe list, ascending
    pub members: Vec<usize>,
    pub actual_calories: f64,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Scorer over a fixed, already filtered recipe list
pub struct MealPlanScorer<'a> {
    context: MealScoringContext<'a>,
    recipes: &'a [RecipeCandidate],
    features: Vec<RecipeFeatures>,
}

impl<'a> MealPlanScorer<'a> {
    pub fn new(context: MealScoringContext<'a>, recipes: &'a [RecipeCandidate]) -> Self {
        let features = recipes
            .iter()
            .map(|recipe| recipe_features(&context, recipe))
            .collect();
        Self {
            context,
            recipes,
            features,
        }
    }

    pub fn recipes(&self) -> &'a [RecipeCandidate] {
        self.recipes
    }

    /// Score every combination of size 1 to 3.
    ///
    /// Output order is by combination size, then lexicographic by index.
    pub fn score_all(&self) -> Vec<ScoredCombination> {
        let n = self.recipes.len();
        let mut scored = Vec::with_capacity(combination_count(n));
        for size in 1..=MAX_COMBINATION_SIZE.min(n) {
            for members in IndexCombinations::new(n, size) {
                scored.push(self.score_combination(members));
            }
        }
        scored
    }

    /// Score one combination given its member indices
    pub fn score_combination(&self, members: Vec<usize>) -> ScoredCombination {
        let mut breakdown = ScoreBreakdown::default();
        let mut actual_calories = 0.0;
        let mut nutrients = NutrientProfile::new();
        let mut history_penalty = 0.0;

        for &index in &members {
            let features = &self.features[index];
            actual_calories += features.calories;
            nutrients.accumulate(&features.nutrients);
            breakdown.protein_bonus += features.protein_bonus;
            breakdown.health_labels += features.health_labels;
            breakdown.cuisine += features.cuisine;
            breakdown.ingredients += features.ingredients;
            history_penalty += features.history_penalty;
        }

        breakdown.calorie_fit = calorie_fit(actual_calories, self.context.target_calories);
        breakdown.nutrient_fit = nutrient_fit(&nutrients, self.context.diet_profile);
        breakdown.history_penalty = history_penalty * HISTORY_WEIGHT;

        ScoredCombination {
            members,
            actual_calories,
            score: finite_or_zero(breakdown.total()),
            breakdown,
        }
    }

    /// Materialize a selected combination as a plan with rounded figures
    pub fn build_plan(&self, combination: &ScoredCombination, diversity_penalty: f64) -> MealPlan {
        let mut nutrients = NutrientProfile::new();
        let recipes = combination
            .members
            .iter()
            .map(|&index| {
                let recipe = &self.recipes[index];
                let features = &self.features[index];
                nutrients.accumulate(&features.nutrients);
                PlannedRecipe {
                    recipe_id: recipe.id.clone(),
                    recipe_name: recipe.name.clone(),
                    servings_used_ratio: round_to(recipe.serving_factor(), 3),
                    calories: round_to(features.calories, 1),
                    cuisine_type: recipe.cuisine_type.clone(),
                    dish_type: recipe.dish_type.clone(),
                    ingredients: recipe.ingredients.clone(),
                    nutrients: features.nutrients.rounded(2),
                }
            })
            .collect();

        MealPlan {
            meal_slot: self.context.meal_slot,
            target_calories: round_to(self.context.target_calories, 1),
            actual_calories: round_to(combination.actual_calories, 1),
            score: round_to(combination.score, 3),
            diversity_penalty: round_to(diversity_penalty, 3),
            breakdown: rounded_breakdown(&combination.breakdown),
            recipes,
            nutrients: nutrients.rounded(2),
        }
    }
}

fn recipe_features(context: &MealScoringContext<'_>, recipe: &RecipeCandidate) -> RecipeFeatures {
    let profile = context.diet_profile;

    let protein_bonus = if context.goal == Goal::Bulking
        && contains_ignore_case(&recipe.diet_labels, HIGH_PROTEIN_LABEL)
    {
        HIGH_PROTEIN_BONUS
    } else {
        0.0
    };

    // Set overlap: a label repeated on the recipe counts once
    let labels: BTreeSet<String> = recipe
        .health_labels
        .iter()
        .map(|label| label.trim().to_ascii_lowercase())
        .filter(|label| !label.is_empty())
        .collect();
    let overlap = labels
        .iter()
        .filter(|label| contains_ignore_case(&profile.health_preferences, label))
        .count();

    let cuisine = match context.cuisine {
        Some(cuisine) if contains_ignore_case(&recipe.cuisine_type, cuisine) => CUISINE_WEIGHT,
        _ => 0.0,
    };

    let liked = referenced_count(recipe, &profile.preferred_ingredients);
    let disliked = referenced_count(recipe, &profile.disliked_ingredients);

    RecipeFeatures {
        calories: recipe.single_serving_calories(),
        nutrients: recipe.nutrients.scaled(recipe.serving_factor()),
        protein_bonus,
        health_labels: HEALTH_LABEL_WEIGHT * overlap as f64,
        cuisine,
        ingredients: LIKED_INGREDIENT_BONUS * liked as f64
            - DISLIKED_INGREDIENT_PENALTY * disliked as f64,
        history_penalty: context.diet_history.recipe_penalty(&recipe.name),
    }
}

/// Ratio match against the target; no credit once the miss reaches the target
pub fn calorie_fit(actual: f64, target: f64) -> f64 {
    let fit = 1.0 - (actual - target).abs() / target.max(1.0);
    finite_or_zero(fit.max(0.0) * CALORIE_FIT_WEIGHT)
}

/// Sum over tracked nutrients. Nutrients the plan has no figure for are skipped.
pub fn nutrient_fit(nutrients: &NutrientProfile, profile: &DietProfile) -> f64 {
    profile
        .nutrient_targets
        .iter()
        .filter_map(|(key, range)| {
            let value = nutrients.get(key)?;
            if range.contains(value) {
                Some(NUTRIENT_IN_RANGE_BONUS)
            } else {
                let distance = (value - range.low).abs().min((value - range.high).abs());
                Some(-distance / range.high.max(1.0))
            }
        })
        .fold(0.0, |fit, term| fit + finite_or_zero(term))
}

/// How many of `wanted` appear in the recipe's ingredient names or texts
fn referenced_count(recipe: &RecipeCandidate, wanted: &[String]) -> usize {
    if wanted.is_empty() {
        return 0;
    }
    let haystack: Vec<String> = recipe
        .ingredients
        .iter()
        .flat_map(|ingredient| [ingredient.name.to_lowercase(), ingredient.text.to_lowercase()])
        .filter(|text| !text.is_empty())
        .collect();

    wanted
        .iter()
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .filter(|item| haystack.iter().any(|text| text.contains(item.as_str())))
        .count()
}

fn contains_ignore_case(labels: &[String], needle: &str) -> bool {
    let needle = needle.trim();
    labels
        .iter()
        .any(|label| label.trim().eq_ignore_ascii_case(needle))
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn rounded_breakdown(breakdown: &ScoreBreakdown) -> ScoreBreakdown {
    ScoreBreakdown {
        calorie_fit: round_to(breakdown.calorie_fit, 3),
        protein_bonus: round_to(breakdown.protein_bonus, 3),
        health_labels: round_to(breakdown.health_labels, 3),
        cuisine: round_to(breakdown.cuisine, 3),
        ingredients: round_to(breakdown.ingredients, 3),
        nutrient_fit: round_to(breakdown.nutrient_fit, 3),
        history_penalty: round_to(breakdown.history_penalty, 3),
    }
}

/// Number of combinations of size 1 to 3 drawn from `n` items
pub fn combination_count(n: usize) -> usize {
    let single = n;
    let pairs = n * n.saturating_sub(1) / 2;
    let triples = n * n.saturating_sub(1) * n.saturating_sub(2) / 6;
    single + pairs + triples
}

/// Lexicographic `k`-combinations of `0..n`, drawn without replacement
#[derive(Debug, Clone)]
pub struct IndexCombinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl IndexCombinations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            done: k == 0 || k > n,
        }
    }
}

impl Iterator for IndexCombinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        let k = self.indices.len();
        match (0..k).rev().find(|&i| self.indices[i] < self.n - k + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }

        Some(current)
    }
}
