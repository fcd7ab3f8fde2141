//! Recommend lunch plans from a small in-memory catalog

use fitplan_engine::{recommend_meals, StaticCatalog, UserContext};

fn main() {
    let catalog = r#"{
        "recipes": [
            { "recipe_name": "Mapo Tofu", "calories": 1200, "servings": 2, "meal_type": "[lunch/dinner]",
              "dish_type": ["main course"], "cuisine_type": ["chinese"], "health_labels": ["Dairy-Free"],
              "ingredients": [{ "name": "tofu", "weight": 400 }, { "name": "ground pork", "weight": 150 }],
              "nutrients": [{ "key": "PROCNT", "label": "Protein", "quantity": 60 }] },
            { "recipe_name": "Garden Salad", "calories": 180, "servings": 1, "meal_type": ["lunch/dinner"],
              "dish_type": ["salad"], "health_labels": ["Vegan", "Dairy-Free"],
              "ingredients": [{ "name": "lettuce", "weight": 120 }] },
            { "recipe_name": "Egg Drop Soup", "calories": 320, "servings": 2, "meal_type": ["lunch/dinner"],
              "dish_type": ["soup"], "cuisine_type": ["chinese"],
              "nutrients": [{ "key": "PROCNT", "label": "Protein", "quantity": "14" }] },
            { "recipe_name": "Beef Noodles", "calories": 750, "servings": 1, "meal_type": ["lunch/dinner"],
              "dish_type": ["main course"], "diet_labels": ["High-Protein"] }
        ]
    }"#;

    let user = r#"{
        "demographics": { "gender": "female", "age": 28, "height_cm": 165, "weight_kg": 58, "nationality": "Chinese" },
        "activity_level": "moderate",
        "user_goal": "maintenance",
        "diet_profile": {
            "preferred_ingredients": ["tofu"],
            "health_preferences": ["Dairy-Free"],
            "nutrient_targets": { "protein": { "low": 20, "high": 45 } }
        },
        "current_context": { "meal_time": "lunch", "today_intake": [{ "calories": 420, "status": "eaten" }] },
        "history": [{ "type": "DietLog", "summary": "beef noodles", "timestamp": 1749900000 }]
    }"#;

    let result = StaticCatalog::from_json(catalog).and_then(|catalog| {
        let user: UserContext = serde_json::from_str(user)?;
        recommend_meals(&user, &catalog, 3)
    });

    match result {
        Ok(plans) => match serde_json::to_string_pretty(&plans) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error: {e:?}"),
        },
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
