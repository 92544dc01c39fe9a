use anyhow::Result;
use std::path::Path;
use std::rc::Rc;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use recipehub_core::service::inspect_storage;
use recipehub_core::storage::Storage;

/// Report on each persisted collection and the total storage used. Runs before any store
/// is opened, so corrupt values are reported rather than silently reset.
pub(crate) fn cmd_check(storage: &Rc<dyn Storage>, db_path: &Path, json: bool) -> Result<()> {
    let health = inspect_storage(storage);
    let usage = storage.usage_bytes()?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "database": db_path,
                "usage_bytes": usage,
                "stores": health,
            }))?
        );
        return Ok(());
    }

    #[derive(Tabled)]
    struct HealthRow {
        #[tabled(rename = "Key")]
        key: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Version")]
        version: String,
        #[tabled(rename = "Entries")]
        count: String,
    }

    let rows: Vec<HealthRow> = health
        .iter()
        .map(|h| HealthRow {
            key: h.key.clone(),
            status: match (&h.problem, h.exists) {
                (Some(problem), _) => format!("corrupt: {problem}"),
                (None, false) => "empty".to_string(),
                (None, true) => "ok".to_string(),
            },
            version: h.version.map_or("-".into(), |v| v.to_string()),
            count: h.count.map_or("-".into(), |c| c.to_string()),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    println!("Database: {}", db_path.display());
    println!("Storage used: {usage} bytes");

    if health.iter().any(|h| !h.valid) {
        eprintln!("Corrupt collections are reset to empty the next time they are opened");
    }
    Ok(())
}
