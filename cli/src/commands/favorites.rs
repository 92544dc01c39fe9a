use anyhow::Result;
use std::process;

use recipehub_core::models::FavoriteEntry;

use super::Hub;
use super::helpers::{exit_not_found, not_found_exits, print_summary_table};

pub(crate) fn cmd_favorite_add(hub: &mut Hub, id: i64, json: bool) -> Result<()> {
    let (entry, added) = hub
        .favorite_recipe(id)
        .map_err(|e| not_found_exits(e, json))?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "favorite": entry, "added": added })
        );
    } else if added {
        println!("Saved '{}' to favorites", entry.title);
    } else {
        println!("'{}' is already a favorite", entry.title);
    }
    Ok(())
}

pub(crate) fn cmd_favorite_remove(hub: &mut Hub, id: i64, json: bool) -> Result<()> {
    if !hub.favorites_mut().remove(id) {
        exit_not_found(&format!("Recipe {id} is not in favorites"), json);
    }
    if json {
        println!("{}", serde_json::json!({ "removed": id }));
    } else {
        println!("Removed recipe {id} from favorites");
    }
    Ok(())
}

pub(crate) fn cmd_favorite_list(hub: &Hub, json: bool) -> Result<()> {
    render_favorites(hub.favorites().list(), json)
}

pub(super) fn render_favorites(entries: &[FavoriteEntry], json: bool) -> Result<()> {
    if entries.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No favorites yet. Save one with `recipehub favorites add <id>`");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
    } else {
        print_summary_table(entries);
    }
    Ok(())
}
