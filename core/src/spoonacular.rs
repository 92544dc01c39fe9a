use serde::Deserialize;

use crate::models::{
    DEFAULT_READY_MINUTES, Ingredient, IngredientMatch, InstructionStep, Recipe,
};

#[derive(Debug, Deserialize)]
pub struct ComplexSearchResponse {
    #[serde(default)]
    pub results: Vec<RecipeData>,
}

/// One recipe as returned by any of the Spoonacular recipe endpoints. Fields that only
/// some endpoints fill in are optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeData {
    pub id: i64,
    pub title: Option<String>,
    pub image: Option<String>,
    pub ready_in_minutes: Option<u32>,
    pub servings: Option<u32>,
    #[serde(default)]
    pub extended_ingredients: Vec<IngredientData>,
    #[serde(default)]
    pub analyzed_instructions: Vec<InstructionData>,
    pub used_ingredient_count: Option<u32>,
    pub missed_ingredient_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct IngredientData {
    pub original: Option<String>,
    pub name: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InstructionData {
    #[serde(default)]
    pub steps: Vec<StepData>,
}

#[derive(Debug, Deserialize)]
pub struct StepData {
    pub number: u32,
    pub step: String,
}

#[must_use]
pub fn recipe_data_to_recipe(d: RecipeData) -> Option<Recipe> {
    let title = d.title.filter(|t| !t.trim().is_empty())?;

    let ingredients = d
        .extended_ingredients
        .into_iter()
        .filter_map(|i| {
            let name = i.name.filter(|n| !n.is_empty());
            let original = i
                .original
                .filter(|o| !o.is_empty())
                .or_else(|| name.clone())?;
            Some(Ingredient {
                original,
                name,
                unit: i.unit.filter(|u| !u.is_empty()),
            })
        })
        .collect();

    // Only the first instruction block is shown; later blocks are sub-recipes.
    let instruction_steps = d
        .analyzed_instructions
        .into_iter()
        .next()
        .map(|block| {
            block
                .steps
                .into_iter()
                .map(|s| InstructionStep {
                    number: s.number,
                    text: s.step,
                })
                .collect()
        })
        .unwrap_or_default();

    let ingredient_match = match (d.used_ingredient_count, d.missed_ingredient_count) {
        (None, None) => None,
        (used, missed) => Some(IngredientMatch {
            used: used.unwrap_or(0),
            missed: missed.unwrap_or(0),
        }),
    };

    Some(Recipe {
        id: d.id,
        title,
        image: d.image.unwrap_or_default(),
        ready_in_minutes: d.ready_in_minutes.unwrap_or(DEFAULT_READY_MINUTES),
        servings: d.servings,
        ingredients,
        instruction_steps,
        ingredient_match,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complex_search_payload() {
        let json = r#"{
            "results": [{
                "id": 716429,
                "title": "Pasta with Garlic, Scallions, Tomato & Basil",
                "image": "https://img.spoonacular.com/recipes/716429-312x231.jpg",
                "readyInMinutes": 45,
                "servings": 2,
                "analyzedInstructions": [
                    {"steps": [{"number": 1, "step": "Boil water"}, {"number": 2, "step": "Cook pasta"}]},
                    {"steps": [{"number": 1, "step": "Make the sauce"}]}
                ]
            }],
            "offset": 0,
            "number": 12,
            "totalResults": 1
        }"#;
        let data: ComplexSearchResponse = serde_json::from_str(json).unwrap();
        let recipe = recipe_data_to_recipe(data.results.into_iter().next().unwrap()).unwrap();
        assert_eq!(recipe.id, 716_429);
        assert_eq!(recipe.ready_in_minutes, 45);
        assert_eq!(recipe.servings, Some(2));
        assert_eq!(recipe.instruction_steps.len(), 2);
        assert_eq!(recipe.instruction_steps[1].text, "Cook pasta");
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.ingredient_match.is_none());
    }

    #[test]
    fn test_find_by_ingredients_payload() {
        let json = r#"[{
            "id": 641803,
            "title": "Easy & Delish! ~ Apple Crumble ~",
            "image": "https://img.spoonacular.com/recipes/641803-312x231.jpg",
            "usedIngredientCount": 2,
            "missedIngredientCount": 3,
            "likes": 1
        }]"#;
        let data: Vec<RecipeData> = serde_json::from_str(json).unwrap();
        let recipe = recipe_data_to_recipe(data.into_iter().next().unwrap()).unwrap();
        assert_eq!(recipe.ready_in_minutes, 30);
        assert_eq!(
            recipe.ingredient_match,
            Some(IngredientMatch { used: 2, missed: 3 })
        );
    }

    #[test]
    fn test_information_payload_ingredients() {
        let json = r#"{
            "id": 1,
            "title": "Toast",
            "extendedIngredients": [
                {"original": "2 slices bread", "name": "bread", "unit": "slices"},
                {"original": "", "name": "butter", "unit": ""},
                {"name": ""}
            ]
        }"#;
        let data: RecipeData = serde_json::from_str(json).unwrap();
        let recipe = recipe_data_to_recipe(data).unwrap();
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[0].unit.as_deref(), Some("slices"));
        assert_eq!(recipe.ingredients[1].original, "butter");
        assert!(recipe.ingredients[1].unit.is_none());
    }

    #[test]
    fn test_missing_title_is_dropped() {
        let data: RecipeData = serde_json::from_str(r#"{"id": 3, "title": " "}"#).unwrap();
        assert!(recipe_data_to_recipe(data).is_none());
        let data: RecipeData = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        assert!(recipe_data_to_recipe(data).is_none());
    }
}
