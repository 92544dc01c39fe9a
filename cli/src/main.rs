mod commands;
mod config;
mod spoonacular;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::rc::Rc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    Hub, cmd_check, cmd_favorite_add, cmd_favorite_list, cmd_favorite_remove, cmd_open,
    cmd_plan_clear, cmd_plan_open_days, cmd_plan_set, cmd_plan_show, cmd_search, cmd_shopping_add,
    cmd_shopping_add_recipe, cmd_shopping_clear, cmd_shopping_clear_checked, cmd_shopping_list,
    cmd_shopping_remove, cmd_shopping_toggle, cmd_show,
};
use crate::config::Config;
use crate::spoonacular::{DEFAULT_BASE_URL, SpoonacularClient};
use recipehub_core::db::Database;
use recipehub_core::models::DietaryFilters;
use recipehub_core::pipeline::FetchPipeline;
use recipehub_core::storage::Storage;

#[derive(Parser)]
#[command(
    name = "recipehub",
    version,
    about = "Search recipes, keep favorites, build a shopping list, and plan your week"
)]
struct Cli {
    /// Spoonacular API key (without one, searches fall back to built-in recipes)
    #[arg(long, env = "SPOONACULAR_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,
    /// Recipe API base URL
    #[arg(long, env = "RECIPEHUB_API_URL", default_value = DEFAULT_BASE_URL, global = true)]
    api_url: String,
    /// Database file (default: recipehub.db in the user data directory)
    #[arg(long, env = "RECIPEHUB_DB", global = true)]
    db: Option<PathBuf>,
    /// Report recipe lookups that fail instead of showing a placeholder recipe
    #[arg(long, global = true)]
    no_placeholder: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DietArgs {
    /// Only vegetarian recipes
    #[arg(long)]
    vegetarian: bool,
    /// Only gluten-free recipes
    #[arg(long)]
    gluten_free: bool,
    /// Only dairy-free recipes
    #[arg(long)]
    dairy_free: bool,
}

impl From<DietArgs> for DietaryFilters {
    fn from(a: DietArgs) -> Self {
        Self {
            vegetarian: a.vegetarian,
            gluten_free: a.gluten_free,
            dairy_free: a.dairy_free,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search recipes (falls back to ingredient search, then built-in recipes)
    Search {
        /// Search query, or comma-separated ingredients (default: pasta)
        query: Option<String>,
        #[command(flatten)]
        diet: DietArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a recipe's ingredients and instructions
    Show {
        /// Recipe ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Open a view by route: /search, /favorites, /shopping-list, /meal-planner, /recipe/<id>
    Open {
        /// Route token (default: /search)
        route: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage favorite recipes
    Favorites {
        #[command(subcommand)]
        command: FavoriteCommands,
    },
    /// Manage the shopping list
    Shopping {
        #[command(subcommand)]
        command: ShoppingCommands,
    },
    /// Manage the weekly meal plan
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Check the stored collections for problems and report storage usage
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FavoriteCommands {
    /// Save a recipe to favorites
    Add {
        /// Recipe ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a recipe from favorites
    Remove {
        /// Recipe ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List favorite recipes
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ShoppingCommands {
    /// Add items by name (an existing item with the same name gets its quantity bumped)
    Add {
        /// Item names
        #[arg(required = true)]
        names: Vec<String>,
        /// Unit for new items (e.g. "cups")
        #[arg(short, long)]
        unit: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add every ingredient of a recipe
    AddRecipe {
        /// Recipe ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the shopping list
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check or uncheck an item
    Toggle {
        /// Item ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an item
    Remove {
        /// Item ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove all checked items
    ClearChecked {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove every item
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum PlanCommands {
    /// Put a recipe into a slot
    Set {
        /// Day: monday-sunday
        day: String,
        /// Slot: breakfast, lunch, dinner
        slot: String,
        /// Recipe ID
        id: i64,
        /// Take the recipe from favorites instead of looking it up
        #[arg(long)]
        from_favorites: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Empty a slot, or the whole week with --all
    Clear {
        /// Day: monday-sunday
        day: Option<String>,
        /// Slot: breakfast, lunch, dinner
        slot: Option<String>,
        /// Clear every slot
        #[arg(long, conflicts_with_all = ["day", "slot"])]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the week and how much of it is planned
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List days whose slot is still empty
    OpenDays {
        /// Slot: breakfast, lunch, dinner
        slot: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("RECIPEHUB_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.db.as_deref())?;
    let storage: Rc<dyn Storage> = Rc::new(Database::open(&config.db_path)?);

    // Checked before the stores open, since opening resets corrupt values.
    if let Commands::Check { json } = cli.command {
        return cmd_check(&storage, &config.db_path, json);
    }

    let rt = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    if cli.api_key.is_none() {
        warn!("SPOONACULAR_API_KEY is not set; recipe lookups will use built-in data");
    }
    let client = SpoonacularClient::new(&cli.api_url, cli.api_key, rt.handle().clone());
    let mut pipeline = FetchPipeline::new(client);
    if cli.no_placeholder {
        pipeline = pipeline.without_placeholder();
    }
    let mut hub: Hub = Hub::new(pipeline, storage);

    match cli.command {
        Commands::Search { query, diet, json } => {
            cmd_search(&mut hub, query.as_deref(), diet.into(), json)
        }
        Commands::Show { id, json } => cmd_show(&hub, id, json),
        Commands::Open { route, json } => cmd_open(&hub, route.as_deref(), json),
        Commands::Favorites { command } => match command {
            FavoriteCommands::Add { id, json } => cmd_favorite_add(&mut hub, id, json),
            FavoriteCommands::Remove { id, json } => cmd_favorite_remove(&mut hub, id, json),
            FavoriteCommands::List { json } => cmd_favorite_list(&hub, json),
        },
        Commands::Shopping { command } => match command {
            ShoppingCommands::Add { names, unit, json } => {
                cmd_shopping_add(&mut hub, &names, unit, json)
            }
            ShoppingCommands::AddRecipe { id, json } => cmd_shopping_add_recipe(&mut hub, id, json),
            ShoppingCommands::List { json } => cmd_shopping_list(&hub, json),
            ShoppingCommands::Toggle { id, json } => cmd_shopping_toggle(&mut hub, &id, json),
            ShoppingCommands::Remove { id, json } => cmd_shopping_remove(&mut hub, &id, json),
            ShoppingCommands::ClearChecked { json } => cmd_shopping_clear_checked(&mut hub, json),
            ShoppingCommands::Clear { yes, json } => cmd_shopping_clear(&mut hub, yes, json),
        },
        Commands::Plan { command } => match command {
            PlanCommands::Set {
                day,
                slot,
                id,
                from_favorites,
                json,
            } => cmd_plan_set(&mut hub, &day, &slot, id, from_favorites, json),
            PlanCommands::Clear {
                day,
                slot,
                all,
                json,
            } => cmd_plan_clear(&mut hub, day.as_deref(), slot.as_deref(), all, json),
            PlanCommands::Show { json } => cmd_plan_show(&hub, json),
            PlanCommands::OpenDays { slot, json } => cmd_plan_open_days(&hub, &slot, json),
        },
        Commands::Check { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search_with_filters() {
        let cli = Cli::try_parse_from([
            "recipehub",
            "search",
            "egg, tomato",
            "--vegetarian",
            "--dairy-free",
            "--json",
        ])
        .unwrap();
        let Commands::Search { query, diet, json } = cli.command else {
            panic!("expected search");
        };
        assert_eq!(query.as_deref(), Some("egg, tomato"));
        assert!(json);
        let filters = DietaryFilters::from(diet);
        assert!(filters.vegetarian && filters.dairy_free && !filters.gluten_free);
    }

    #[test]
    fn test_plan_clear_all_conflicts_with_slot() {
        assert!(
            Cli::try_parse_from(["recipehub", "plan", "clear", "monday", "dinner", "--all"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["recipehub", "plan", "clear", "--all"]).is_ok());
    }

    #[test]
    fn test_shopping_add_requires_names() {
        assert!(Cli::try_parse_from(["recipehub", "shopping", "add"]).is_err());
    }
}
