//! Raw candidate records as returned by the graph query layer
//!
//! Graph records are loosely shaped: list attributes are sometimes stored as
//! bracketed strings, numbers sometimes arrive as text, and any attribute may
//! be missing. These types accept all of that and leave interpretation to the
//! adapter and the normalizer.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Nutrient attribute attached to a recipe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawNutrient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Human label such as `Protein`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Nutrient code such as `PROCNT` or `CHOCDF`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Left raw; the normalizer decides whether it is usable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Ingredient attribute attached to a recipe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawIngredient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Recipe node with its ingredient and nutrient edges
///
/// Query variants name the same attribute differently (`recipe_id`/`id`,
/// `recipe_name`/`name`, `nutrients`/`total_nutrients`). Each spelling has its
/// own field so a record carrying both still parses; use the accessors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeRecord {
    #[serde(deserialize_with = "flexible_string", skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
    #[serde(deserialize_with = "flexible_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(deserialize_with = "flexible_string", skip_serializing_if = "Option::is_none")]
    pub recipe_name: Option<String>,
    #[serde(deserialize_with = "flexible_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(deserialize_with = "flexible_number")]
    pub calories: Option<f64>,
    #[serde(deserialize_with = "flexible_number")]
    pub servings: Option<f64>,
    #[serde(deserialize_with = "flexible_list")]
    pub cuisine_type: Vec<String>,
    #[serde(deserialize_with = "flexible_list")]
    pub meal_type: Vec<String>,
    #[serde(deserialize_with = "flexible_list")]
    pub dish_type: Vec<String>,
    #[serde(deserialize_with = "flexible_list")]
    pub diet_labels: Vec<String>,
    #[serde(deserialize_with = "flexible_list")]
    pub health_labels: Vec<String>,
    #[serde(deserialize_with = "flexible_list")]
    pub cautions: Vec<String>,
    #[serde(deserialize_with = "lenient_vec")]
    pub ingredients: Vec<RawIngredient>,
    #[serde(deserialize_with = "lenient_vec")]
    pub nutrients: Vec<RawNutrient>,
    #[serde(deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub total_nutrients: Vec<RawNutrient>,
}

impl RecipeRecord {
    pub fn identifier(&self) -> Option<&str> {
        self.recipe_id.as_deref().or(self.id.as_deref())
    }

    pub fn display_name(&self) -> Option<&str> {
        self.recipe_name.as_deref().or(self.name.as_deref())
    }

    /// `nutrients`, or `total_nutrients` when the former is empty
    pub fn nutrient_entries(&self) -> &[RawNutrient] {
        if self.nutrients.is_empty() {
            &self.total_nutrients
        } else {
            &self.nutrients
        }
    }
}

/// Exercise variant node with its equipment and muscle edges
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseRecord {
    #[serde(deserialize_with = "flexible_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "flexible_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "flexible_string")]
    pub instructions: Option<String>,
    #[serde(deserialize_with = "flexible_string")]
    pub utility: Option<String>,
    #[serde(deserialize_with = "flexible_string")]
    pub force: Option<String>,
    #[serde(deserialize_with = "flexible_string")]
    pub body_part: Option<String>,
    /// Body parts mentioned in the instructions (used for injury exclusion)
    #[serde(deserialize_with = "flexible_list")]
    pub involved_body_parts: Vec<String>,
    #[serde(deserialize_with = "flexible_list")]
    pub equipment: Vec<String>,
    #[serde(deserialize_with = "flexible_list")]
    pub target_muscles: Vec<String>,
    #[serde(deserialize_with = "flexible_list")]
    pub synergist_muscles: Vec<String>,
    #[serde(deserialize_with = "flexible_list")]
    pub stabilizer_muscles: Vec<String>,
}

/// Read a finite number from a JSON number or numeric string
pub fn parse_quantity(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Split the graph's bracketed list encoding (`"[a, b]"`) into items
pub fn split_list_text(text: &str) -> Vec<String> {
    let inner = text
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']');
    inner
        .split(',')
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn flexible_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items.iter().filter_map(value_to_text).collect(),
        Some(Value::String(text)) => split_list_text(&text),
        _ => Vec::new(),
    })
}

fn flexible_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_quantity))
}

fn flexible_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_text))
}

/// Deserialize a list, silently dropping elements of the wrong shape
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
