use anyhow::{Result, bail};

use recipehub_core::meal_plan::MealPlan;
use recipehub_core::models::{Day, MealSlot, PlanSummary, parse_slot};

use super::Hub;
use super::helpers::{exit_not_found, not_found_exits, print_plan_table};

pub(crate) fn cmd_plan_set(
    hub: &mut Hub,
    day: &str,
    slot: &str,
    id: i64,
    from_favorites: bool,
    json: bool,
) -> Result<()> {
    let (meal, replaced) = if from_favorites {
        hub.plan_favorite(day, slot, id)?
    } else {
        hub.plan_recipe(day, slot, id)
            .map_err(|e| not_found_exits(e, json))?
    };
    let (day, slot) = parse_slot(day, slot)?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "day": day, "slot": slot, "meal": meal, "replaced": replaced })
        );
    } else {
        let verb = if replaced { "Replaced" } else { "Planned" };
        println!("{verb} {day} {slot}: {}", meal.title);
    }
    Ok(())
}

pub(crate) fn cmd_plan_clear(
    hub: &mut Hub,
    day: Option<&str>,
    slot: Option<&str>,
    all: bool,
    json: bool,
) -> Result<()> {
    if all {
        hub.meal_plan_mut().clear_all();
        if json {
            println!("{}", serde_json::json!({ "cleared": "all" }));
        } else {
            println!("Cleared the whole week");
        }
        return Ok(());
    }

    let (Some(day), Some(slot)) = (day, slot) else {
        bail!("Give a day and a slot (e.g. `plan clear monday dinner`), or use --all");
    };
    if !hub.meal_plan_mut().clear_meal(day, slot)? {
        exit_not_found(&format!("Nothing planned for {day} {slot}"), json);
    }
    if json {
        println!("{}", serde_json::json!({ "cleared": { "day": day, "slot": slot } }));
    } else {
        println!("Cleared {day} {slot}");
    }
    Ok(())
}

pub(crate) fn cmd_plan_show(hub: &Hub, json: bool) -> Result<()> {
    render_plan(hub.meal_plan().plan(), hub.meal_plan().summary(), json)
}

pub(crate) fn cmd_plan_open_days(hub: &Hub, slot: &str, json: bool) -> Result<()> {
    let Ok(slot) = slot.parse::<MealSlot>() else {
        bail!("Invalid slot '{slot}'. Use one of: breakfast, lunch, dinner");
    };
    let days: Vec<Day> = hub.meal_plan().open_days(slot);

    if json {
        println!("{}", serde_json::to_string_pretty(&days)?);
    } else if days.is_empty() {
        println!("Every {slot} this week is planned");
    } else {
        let names: Vec<&str> = days.iter().map(|d| d.name()).collect();
        println!("Open {slot} slots: {}", names.join(", "));
    }
    Ok(())
}

pub(super) fn render_plan(plan: &MealPlan, summary: PlanSummary, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "plan": plan, "summary": summary }))?
        );
        return Ok(());
    }

    print_plan_table(plan);
    let PlanSummary {
        total_slots,
        filled_slots,
        percentage,
    } = summary;
    println!("{filled_slots} of {total_slots} meals planned ({percentage}%)");
    Ok(())
}
