use anyhow::{Result, bail};

use recipehub_core::error::ApiError;
use recipehub_core::models::Recipe;
use recipehub_core::pipeline::FetchOutcome;

use super::Hub;
use super::helpers::{OutcomeJson, exit_not_found, print_degraded_note, print_recipe_detail};

pub(crate) fn cmd_show(hub: &Hub, id: i64, json: bool) -> Result<()> {
    let outcome = hub.recipe(id);
    render_detail(id, &outcome, hub.favorites().is_favorite(id), json)
}

pub(super) fn render_detail(
    id: i64,
    outcome: &FetchOutcome<Recipe>,
    is_favorite: bool,
    json: bool,
) -> Result<()> {
    match outcome {
        FetchOutcome::Failure(ApiError::NotFound) => {
            exit_not_found(&format!("Recipe {id} not found"), json)
        }
        FetchOutcome::Failure(e) => bail!("Failed to load recipe details: {e}"),
        FetchOutcome::Success(recipe) | FetchOutcome::Degraded { data: recipe, .. } => {
            if json {
                #[derive(serde::Serialize)]
                struct Detail<'a> {
                    #[serde(flatten)]
                    outcome: OutcomeJson<'a, Recipe>,
                    favorite: bool,
                }
                if let Some(outcome) = OutcomeJson::from_outcome(outcome) {
                    let detail = Detail {
                        outcome,
                        favorite: is_favorite,
                    };
                    println!("{}", serde_json::to_string_pretty(&detail)?);
                }
                return Ok(());
            }
            if let Some(reason) = outcome.degrade_reason() {
                print_degraded_note("a placeholder recipe", reason);
            }
            print_recipe_detail(recipe, is_favorite);
            Ok(())
        }
    }
}
