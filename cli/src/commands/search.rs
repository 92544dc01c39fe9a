use anyhow::Result;

use recipehub_core::models::{DietaryFilters, Recipe};
use recipehub_core::pipeline::FetchOutcome;

use super::Hub;
use super::helpers::{OutcomeJson, print_degraded_note, print_recipe_table};

pub(crate) fn cmd_search(
    hub: &mut Hub,
    query: Option<&str>,
    filters: DietaryFilters,
    json: bool,
) -> Result<()> {
    if let Some(query) = query {
        hub.set_query(query)?;
    }
    hub.set_filters(filters);

    let outcome = hub.search();
    render_search(hub.query(), &outcome, json)
}

pub(super) fn render_search(
    query: &str,
    outcome: &FetchOutcome<Vec<Recipe>>,
    json: bool,
) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&OutcomeJson::from_outcome(outcome))?
        );
        return Ok(());
    }

    if let Some(reason) = outcome.degrade_reason() {
        print_degraded_note("built-in recipes", reason);
    }
    let recipes = outcome.data().map_or(&[][..], Vec::as_slice);
    println!("Results for '{query}':");
    print_recipe_table(recipes);
    Ok(())
}
