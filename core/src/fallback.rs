//! Built-in recipes served when the live API cannot answer.

use crate::models::{Ingredient, InstructionStep, Recipe};

pub const PLACEHOLDER_TITLE_PREFIX: &str = "[Placeholder] ";

fn steps(texts: &[&str]) -> Vec<InstructionStep> {
    texts
        .iter()
        .zip(1..)
        .map(|(text, number)| InstructionStep {
            number,
            text: (*text).to_string(),
        })
        .collect()
}

fn ingredients(lines: &[&str]) -> Vec<Ingredient> {
    lines.iter().map(|l| Ingredient::line(l)).collect()
}

/// The fixed result set for a search that no tier could answer.
#[must_use]
pub fn fallback_recipes() -> Vec<Recipe> {
    vec![
        Recipe {
            id: 716_429,
            title: "Pasta with Garlic, Scallions, Tomato & Basil".to_string(),
            image: "https://spoonacular.com/recipe-images/716429.jpg".to_string(),
            ready_in_minutes: 45,
            servings: Some(2),
            ingredients: ingredients(&[
                "200g pasta",
                "2 cloves garlic",
                "2 tomatoes",
                "Fresh basil",
            ]),
            instruction_steps: steps(&[
                "Cook pasta according to package instructions",
                "Sauté garlic in olive oil",
                "Add chopped tomatoes and cook for 5 minutes",
                "Toss with pasta and fresh basil",
            ]),
            ingredient_match: None,
        },
        Recipe {
            id: 715_538,
            title: "Easy Tomato Soup".to_string(),
            image: "https://spoonacular.com/recipe-images/715538.jpg".to_string(),
            ready_in_minutes: 30,
            servings: Some(4),
            ingredients: ingredients(&[
                "1 tbsp olive oil",
                "1 onion",
                "2 cloves garlic",
                "800g canned tomatoes",
            ]),
            instruction_steps: steps(&[
                "Sauté onion and garlic in olive oil",
                "Add tomatoes and simmer 15 minutes",
                "Blend until smooth",
                "Season with salt and pepper",
            ]),
            ingredient_match: None,
        },
    ]
}

/// Stand-in detail recipe carrying the requested id, marked as a placeholder in the title.
#[must_use]
pub fn placeholder_recipe(id: i64) -> Recipe {
    Recipe {
        id,
        title: format!("{PLACEHOLDER_TITLE_PREFIX}Pasta with Garlic, Scallions, Tomato & Basil"),
        image: "https://spoonacular.com/recipe-images/716429.jpg".to_string(),
        ready_in_minutes: 45,
        servings: Some(2),
        ingredients: ingredients(&[
            "200g pasta",
            "2 cloves garlic, minced",
            "2 tomatoes, diced",
            "1/4 cup fresh basil, chopped",
            "2 tbsp olive oil",
            "Salt to taste",
            "Black pepper to taste",
        ]),
        instruction_steps: steps(&[
            "Bring a large pot of salted water to a boil. Add pasta and cook according to package instructions until al dente.",
            "While pasta cooks, heat olive oil in a large skillet over medium heat. Add minced garlic and sauté for 1 minute until fragrant.",
            "Add diced tomatoes to the skillet and cook for 3-4 minutes until they start to soften.",
            "Drain pasta, reserving 1/4 cup of pasta water.",
            "Add drained pasta to the skillet with tomatoes. Toss to combine, adding reserved pasta water if needed.",
            "Remove from heat, stir in fresh basil, and season with salt and pepper to taste.",
        ]),
        ingredient_match: None,
    }
}

#[must_use]
pub fn is_placeholder(recipe: &Recipe) -> bool {
    recipe.title.starts_with(PLACEHOLDER_TITLE_PREFIX)
}
