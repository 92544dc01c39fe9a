use anyhow::{Result, bail};
use std::process;

use recipehub_core::models::{MergeReport, NewShoppingItem, ShoppingItem};

use super::Hub;
use super::helpers::{confirm, exit_not_found, not_found_exits, print_shopping_table};

fn print_report(report: MergeReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let MergeReport { added, incremented } = report;
        println!("Shopping list: {added} added, {incremented} already listed (quantity increased)");
    }
    Ok(())
}

pub(crate) fn cmd_shopping_add(
    hub: &mut Hub,
    names: &[String],
    unit: Option<String>,
    json: bool,
) -> Result<()> {
    let items: Vec<NewShoppingItem> = names
        .iter()
        .map(|n| NewShoppingItem {
            name: n.clone(),
            unit: unit.clone(),
        })
        .collect();
    if items.iter().all(|i| i.name.trim().is_empty()) {
        bail!("Nothing to add: item names cannot be blank");
    }
    let report = hub.shopping_mut().add_ingredients(&items);
    print_report(report, json)
}

pub(crate) fn cmd_shopping_add_recipe(hub: &mut Hub, id: i64, json: bool) -> Result<()> {
    let (recipe, report) = hub
        .add_recipe_to_shopping_list(id)
        .map_err(|e| not_found_exits(e, json))?;
    if !json {
        println!("Ingredients from '{}':", recipe.title);
    }
    print_report(report, json)
}

pub(crate) fn cmd_shopping_list(hub: &Hub, json: bool) -> Result<()> {
    render_shopping(hub.shopping().items(), json)
}

pub(super) fn render_shopping(items: &[ShoppingItem], json: bool) -> Result<()> {
    if items.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("Shopping list is empty");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        print_shopping_table(items);
        let remaining = items.iter().filter(|i| !i.checked).count();
        let total = items.len();
        println!("{remaining} of {total} items left");
    }
    Ok(())
}

pub(crate) fn cmd_shopping_toggle(hub: &mut Hub, id: &str, json: bool) -> Result<()> {
    let Some(checked) = hub.shopping_mut().toggle(id) else {
        exit_not_found(&format!("Item {id} not found"), json);
    };
    if json {
        println!("{}", serde_json::json!({ "id": id, "checked": checked }));
    } else if let Some(item) = hub.shopping().get(id) {
        let state = if checked { "checked" } else { "unchecked" };
        println!("{} {state}", item.name);
    }
    Ok(())
}

pub(crate) fn cmd_shopping_remove(hub: &mut Hub, id: &str, json: bool) -> Result<()> {
    if !hub.shopping_mut().remove(id) {
        exit_not_found(&format!("Item {id} not found"), json);
    }
    if json {
        println!("{}", serde_json::json!({ "removed": id }));
    } else {
        println!("Removed item {id}");
    }
    Ok(())
}

pub(crate) fn cmd_shopping_clear_checked(hub: &mut Hub, json: bool) -> Result<()> {
    let removed = hub.shopping_mut().clear_checked();
    if json {
        println!("{}", serde_json::json!({ "removed": removed }));
    } else {
        println!("Removed {removed} checked item(s)");
    }
    Ok(())
}

pub(crate) fn cmd_shopping_clear(hub: &mut Hub, yes: bool, json: bool) -> Result<()> {
    let count = hub.shopping().items().len();
    if count > 0 && !yes && !confirm(&format!("Remove all {count} items from the shopping list?"))? {
        bail!("Aborted; shopping list unchanged");
    }
    let removed = hub.shopping_mut().clear_all();
    if json {
        println!("{}", serde_json::json!({ "removed": removed }));
    } else {
        println!("Cleared {removed} item(s)");
    }
    Ok(())
}
