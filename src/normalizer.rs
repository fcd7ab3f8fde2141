//! Nutrient and ingredient normalization
//!
//! This module turns heterogeneous graph attributes into typed values:
//! - Nutrient lists become a flat key → quantity map
//! - Ingredient lists become named ingredients with optional quantities
//!
//! Missing or unparseable quantities are dropped, never zero-filled, so that
//! downstream range matching does not see spurious zero intakes.

use crate::schema::{parse_quantity, RawIngredient, RawNutrient};
use crate::types::{round_to, Ingredient, NutrientProfile};

/// Normalizer for graph nutrient and ingredient attributes
pub struct NutrientNormalizer;

impl NutrientNormalizer {
    /// Normalize a nutrient list into a [`NutrientProfile`].
    ///
    /// The key comes from `name`, then `label` (e.g. `Protein`). The nutrient
    /// code in `key` (e.g. `PROCNT`) is the last resort. Entries without a key
    /// or without a numeric quantity are skipped. Quantities are rounded to
    /// two decimals.
    pub fn normalize(nutrients: &[RawNutrient]) -> NutrientProfile {
        nutrients
            .iter()
            .filter_map(|nutrient| {
                let raw_key = first_present(&[&nutrient.name, &nutrient.label, &nutrient.key])?;
                let key = normalize_key(raw_key);
                if key.is_empty() {
                    return None;
                }
                let quantity = nutrient.quantity.as_ref().and_then(parse_quantity)?;
                Some((key, round_to(quantity, 2)))
            })
            .collect()
    }

    /// Normalize an ingredient list.
    ///
    /// Ingredients without a name are dropped. Quantity stays `None` when the
    /// source did not provide one; weight defaults to 0 and is rounded to 0.1 g.
    pub fn normalize_ingredients(ingredients: &[RawIngredient]) -> Vec<Ingredient> {
        ingredients
            .iter()
            .filter_map(|ingredient| {
                let name = ingredient.name.as_deref().map(str::trim)?;
                if name.is_empty() {
                    return None;
                }
                let weight = ingredient
                    .weight
                    .as_ref()
                    .and_then(parse_quantity)
                    .unwrap_or(0.0);
                Some(Ingredient {
                    name: name.to_string(),
                    quantity: ingredient.quantity.as_ref().and_then(parse_quantity),
                    measure: ingredient.measure.clone().unwrap_or_default(),
                    weight_g: round_to(weight, 1),
                    text: ingredient.text.clone().unwrap_or_default(),
                })
            })
            .collect()
    }
}

/// Lower-case and trim a nutrient name, then turn every space and hyphen
/// into an underscore (runs are kept, `"a  b"` becomes `"a__b"`)
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

fn first_present<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .filter_map(Option::as_deref)
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn nutrient(name: Option<&str>, label: Option<&str>, quantity: serde_json::Value) -> RawNutrient {
        RawNutrient {
            name: name.map(str::to_string),
            label: label.map(str::to_string),
            key: None,
            quantity: (!quantity.is_null()).then_some(quantity),
            unit: Some("g".to_string()),
        }
    }

    fn coded(key: &str, label: Option<&str>, quantity: serde_json::Value) -> RawNutrient {
        RawNutrient {
            key: Some(key.to_string()),
            ..nutrient(None, label, quantity)
        }
    }

    #[test]
    fn test_normalize_keys_and_rounding() {
        let profile = NutrientNormalizer::normalize(&[
            nutrient(Some("Protein"), None, json!(23.456)),
            nutrient(None, Some("Sugars, added"), json!("4.004")),
            nutrient(None, Some("Fatty acids - total trans"), json!(0.2)),
        ]);

        assert_eq!(profile.get("protein"), Some(23.46));
        assert_eq!(profile.get("sugars,_added"), Some(4.0));
        assert_eq!(profile.get("fatty_acids___total_trans"), Some(0.2));
    }

    #[test]
    fn test_label_wins_over_nutrient_code() {
        let profile = NutrientNormalizer::normalize(&[
            coded("PROCNT", Some("Protein"), json!(30.0)),
            coded("CHOCDF", None, json!(55.5)),
            RawNutrient {
                name: Some("Dietary Fiber".to_string()),
                ..coded("FIBTG", Some("Fiber"), json!(4.0))
            },
        ]);

        assert_eq!(profile.get("protein"), Some(30.0));
        assert_eq!(profile.get("chocdf"), Some(55.5));
        assert_eq!(profile.get("dietary_fiber"), Some(4.0));
        assert!(!profile.contains_key("procnt"));
        assert!(!profile.contains_key("fiber"));
    }

    #[test]
    fn test_normalize_key_maps_each_space() {
        assert_eq!(normalize_key("  Vitamin  B12 "), "vitamin__b12");
        assert_eq!(normalize_key("Fatty acids - total trans"), "fatty_acids___total_trans");
        assert_eq!(normalize_key("Omega-3"), "omega_3");
    }

    #[test]
    fn test_missing_quantity_is_absent_not_zero() {
        let profile = NutrientNormalizer::normalize(&[
            nutrient(Some("FIBTG"), None, json!(null)),
            nutrient(Some("CHOCDF"), None, json!("unknown")),
            nutrient(Some("FAT"), None, json!(9.0)),
        ]);

        assert_eq!(profile.len(), 1);
        assert!(!profile.contains_key("fibtg"));
        assert!(!profile.contains_key("chocdf"));
        assert_eq!(profile.get("fat"), Some(9.0));
    }

    #[test]
    fn test_entries_without_key_are_dropped() {
        let profile = NutrientNormalizer::normalize(&[
            nutrient(None, None, json!(5.0)),
            nutrient(Some("  "), Some("Calcium"), json!(120.0)),
        ]);

        assert_eq!(profile.len(), 1);
        assert_eq!(profile.get("calcium"), Some(120.0));
    }

    #[test]
    fn test_normalize_ingredients() {
        let ingredients = NutrientNormalizer::normalize_ingredients(&[
            RawIngredient {
                name: Some("tofu".to_string()),
                quantity: None,
                measure: None,
                weight: Some(json!(200.04)),
                text: Some("200g silken tofu".to_string()),
            },
            RawIngredient {
                name: None,
                quantity: Some(json!(1)),
                ..Default::default()
            },
            RawIngredient {
                name: Some("salt".to_string()),
                quantity: Some(json!("1")),
                measure: Some("pinch".to_string()),
                weight: None,
                text: None,
            },
        ]);

        assert_eq!(
            ingredients,
            vec![
                Ingredient {
                    name: "tofu".to_string(),
                    quantity: None,
                    measure: String::new(),
                    weight_g: 200.0,
                    text: "200g silken tofu".to_string(),
                },
                Ingredient {
                    name: "salt".to_string(),
                    quantity: Some(1.0),
                    measure: "pinch".to_string(),
                    weight_g: 0.0,
                    text: String::new(),
                },
            ]
        );
    }
}
