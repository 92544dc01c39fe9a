use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use recipehub_core::error::ApiError;
use recipehub_core::meal_plan::MealPlan;
use recipehub_core::models::{MealSlot, Recipe, RecipeSummary, ShoppingItem};
use recipehub_core::pipeline::{DegradeReason, FetchOutcome};

/// JSON shape for any pipeline result.
#[derive(Serialize)]
pub(crate) struct OutcomeJson<'a, T: Serialize> {
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub data: &'a T,
}

impl<'a, T: Serialize> OutcomeJson<'a, T> {
    /// `None` for a failed outcome, which has no data to show.
    pub(crate) fn from_outcome(outcome: &'a FetchOutcome<T>) -> Option<Self> {
        Some(Self {
            degraded: outcome.is_degraded(),
            reason: outcome.degrade_reason().map(ToString::to_string),
            data: outcome.data()?,
        })
    }
}

pub(crate) fn print_degraded_note(what: &str, reason: &DegradeReason) {
    eprintln!("Note: the recipe service is unavailable, showing {what} ({reason})");
}

pub(crate) fn print_recipe_table(recipes: &[Recipe]) {
    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Title")]
        title: String,
        #[tabled(rename = "Ready")]
        ready: String,
        #[tabled(rename = "Serves")]
        servings: String,
        #[tabled(rename = "Have/Missing")]
        matched: String,
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .enumerate()
        .map(|(i, r)| RecipeRow {
            idx: i + 1,
            id: r.id,
            title: truncate(&r.title, 45),
            ready: format_minutes(r.ready_in_minutes),
            servings: r.servings.map_or("-".into(), |s| s.to_string()),
            matched: r
                .ingredient_match
                .map_or("-".into(), |m| format!("{}/{}", m.used, m.missed)),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..6)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_summary_table(entries: &[RecipeSummary]) {
    #[derive(Tabled)]
    struct SummaryRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Title")]
        title: String,
        #[tabled(rename = "Ready")]
        ready: String,
    }

    let rows: Vec<SummaryRow> = entries
        .iter()
        .map(|e| SummaryRow {
            id: e.id,
            title: truncate(&e.title, 50),
            ready: format_minutes(e.ready_in_minutes),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_shopping_table(items: &[ShoppingItem]) {
    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = " ")]
        checked: &'static str,
        #[tabled(rename = "Item")]
        name: String,
        #[tabled(rename = "Qty")]
        quantity: String,
        #[tabled(rename = "ID")]
        id: String,
    }

    let rows: Vec<ItemRow> = items
        .iter()
        .map(|i| ItemRow {
            checked: if i.checked { "[x]" } else { "[ ]" },
            name: truncate(&i.name, 40),
            quantity: format_quantity(i.quantity, i.unit.as_deref()),
            id: i.id.clone(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_plan_table(plan: &MealPlan) {
    #[derive(Tabled)]
    struct DayRow {
        #[tabled(rename = "Day")]
        day: String,
        #[tabled(rename = "Breakfast")]
        breakfast: String,
        #[tabled(rename = "Lunch")]
        lunch: String,
        #[tabled(rename = "Dinner")]
        dinner: String,
    }

    let cell = |d: &recipehub_core::models::DayPlan, slot: MealSlot| {
        d.get(slot)
            .map_or_else(|| "-".to_string(), |m| truncate(&m.title, 28))
    };
    let rows: Vec<DayRow> = plan
        .iter()
        .map(|(day, d)| DayRow {
            day: day.to_string(),
            breakfast: cell(d, MealSlot::Breakfast),
            lunch: cell(d, MealSlot::Lunch),
            dinner: cell(d, MealSlot::Dinner),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn print_recipe_detail(recipe: &Recipe, is_favorite: bool) {
    let star = if is_favorite { " *" } else { "" };
    println!("=== {} (id: {}){star} ===\n", recipe.title, recipe.id);
    let ready = format_minutes(recipe.ready_in_minutes);
    match recipe.servings {
        Some(s) => println!("  Ready in {ready} | Serves {s}"),
        None => println!("  Ready in {ready}"),
    }
    if !recipe.image.is_empty() {
        println!("  {}", recipe.image);
    }

    println!("\n  INGREDIENTS");
    if recipe.ingredients.is_empty() {
        println!("    (none listed)");
    }
    for ing in &recipe.ingredients {
        println!("    - {}", ing.original);
    }

    println!("\n  INSTRUCTIONS");
    if recipe.instruction_steps.is_empty() {
        println!("    (none listed)");
    }
    for step in &recipe.instruction_steps {
        println!("    {}. {}", step.number, step.text);
    }
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn exit_not_found(message: &str, json: bool) -> ! {
    if json {
        println!("{}", json_error(message));
    } else {
        eprintln!("{message}");
    }
    process::exit(2);
}

/// Exit 2 when the API says the recipe does not exist; hand every other error back.
pub(crate) fn not_found_exits(err: anyhow::Error, json: bool) -> anyhow::Error {
    if is_not_found(&err) {
        exit_not_found(&format!("{err:#}"), json);
    }
    err
}

pub(crate) fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<ApiError>(), Some(ApiError::NotFound))
}

pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{prompt} [y/N]: ");
    io::stderr().flush()?;
    let stdin = io::stdin();
    let line = stdin.lock().lines().next().context("No input")??;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub(crate) fn format_minutes(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} h"),
        (h, m) => format!("{h} h {m} min"),
    }
}

pub(crate) fn format_quantity(quantity: u32, unit: Option<&str>) -> String {
    match unit {
        Some(u) => format!("{quantity} ({u})"),
        None => quantity.to_string(),
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s
            .char_indices()
            .nth(max.saturating_sub(3))
            .map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
