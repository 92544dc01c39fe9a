use std::rc::Rc;

use anyhow::{Result, bail};
use tracing::info;

use crate::error::ApiError;
use crate::favorites::FavoritesStore;
use crate::meal_plan::{MealPlan, MealPlanStore};
use crate::models::{
    DietaryFilters, FavoriteEntry, MergeReport, PlanSummary, Recipe, RecipeSummary,
    ShoppingItem, parse_slot, validate_search_query,
};
use crate::pipeline::{FetchOutcome, FetchPipeline, RecipeSource};
use crate::router::{Resolution, Route, View, ViewRouter};
use crate::shopping::ShoppingListStore;
use crate::storage::{Storage, StoreHealth};

pub const DEFAULT_QUERY: &str = "pasta";

/// Health of every persisted collection, read without opening (and repairing) the stores.
#[must_use]
pub fn inspect_storage(storage: &Rc<dyn Storage>) -> Vec<StoreHealth> {
    vec![
        FavoritesStore::inspect(storage.clone()),
        ShoppingListStore::inspect(storage.clone()),
        MealPlanStore::inspect(storage.clone()),
    ]
}

/// Initial data for one routed view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewData {
    Search {
        query: String,
        filters: DietaryFilters,
        outcome: FetchOutcome<Vec<Recipe>>,
    },
    Favorites(Vec<FavoriteEntry>),
    ShoppingList(Vec<ShoppingItem>),
    MealPlanner {
        plan: MealPlan,
        summary: PlanSummary,
    },
    RecipeDetail {
        id: i64,
        outcome: FetchOutcome<Recipe>,
        is_favorite: bool,
    },
}

impl ViewData {
    #[must_use]
    pub fn route(&self) -> Route {
        match self {
            ViewData::Search { .. } => Route::Search,
            ViewData::Favorites(_) => Route::Favorites,
            ViewData::ShoppingList(_) => Route::ShoppingList,
            ViewData::MealPlanner { .. } => Route::MealPlanner,
            ViewData::RecipeDetail { id, .. } => Route::RecipeDetail(*id),
        }
    }
}

// Loaded data registers nothing; terminal rendering happens after activation.
impl View for ViewData {}

/// The recipe pipeline plus the three persisted collections, and the operations that
/// span them.
pub struct RecipeHub<S> {
    pipeline: FetchPipeline<S>,
    favorites: FavoritesStore,
    shopping: ShoppingListStore,
    meal_plan: MealPlanStore,
    query: String,
    filters: DietaryFilters,
}

impl<S: RecipeSource> RecipeHub<S> {
    pub fn new(pipeline: FetchPipeline<S>, storage: Rc<dyn Storage>) -> Self {
        Self {
            favorites: FavoritesStore::open(storage.clone()),
            shopping: ShoppingListStore::open(storage.clone()),
            meal_plan: MealPlanStore::open(storage),
            pipeline,
            query: DEFAULT_QUERY.to_string(),
            filters: DietaryFilters::default(),
        }
    }

    pub fn open(source: S, storage: Rc<dyn Storage>) -> Self {
        Self::new(FetchPipeline::new(source), storage)
    }

    // --- Search state ---

    /// Set the query the search view loads. Rejects invalid input and keeps the old query.
    pub fn set_query(&mut self, query: &str) -> Result<()> {
        self.query = validate_search_query(query)?;
        Ok(())
    }

    pub fn set_filters(&mut self, filters: DietaryFilters) {
        self.filters = filters;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filters(&self) -> DietaryFilters {
        self.filters
    }

    pub fn search(&self) -> FetchOutcome<Vec<Recipe>> {
        self.pipeline.search(&self.query, &self.filters)
    }

    pub fn recipe(&self, id: i64) -> FetchOutcome<Recipe> {
        self.pipeline.get_by_id(id)
    }

    // --- Views ---

    pub fn load_view(&self, route: &Route) -> ViewData {
        match *route {
            Route::Search => ViewData::Search {
                query: self.query.clone(),
                filters: self.filters,
                outcome: self.search(),
            },
            Route::Favorites => ViewData::Favorites(self.favorites.list().to_vec()),
            Route::ShoppingList => ViewData::ShoppingList(self.shopping.items().to_vec()),
            Route::MealPlanner => ViewData::MealPlanner {
                plan: self.meal_plan.plan().clone(),
                summary: self.meal_plan.summary(),
            },
            Route::RecipeDetail(id) => ViewData::RecipeDetail {
                id,
                outcome: self.recipe(id),
                is_favorite: self.favorites.is_favorite(id),
            },
        }
    }

    /// Start a router at `token`, load its view, and resolve it.
    pub fn open_route(&self, token: Option<&str>) -> (ViewRouter<ViewData>, Resolution) {
        let (mut router, ticket) = ViewRouter::start(token);
        let data = self.load_view(&ticket.route());
        let resolution = router.resolve(ticket, data);
        (router, resolution)
    }

    /// Load and show `route` on an existing router.
    pub fn navigate(&self, router: &mut ViewRouter<ViewData>, route: Route) -> Resolution {
        let ticket = router.navigate(route);
        let data = self.load_view(&route);
        router.resolve(ticket, data)
    }

    // --- Cross-store operations ---

    /// Add every ingredient of a recipe to the shopping list.
    pub fn add_recipe_to_shopping_list(&mut self, id: i64) -> Result<(Recipe, MergeReport)> {
        let recipe = self.live_recipe(id)?;
        let items: Vec<_> = recipe
            .ingredients
            .iter()
            .map(crate::models::Ingredient::to_shopping_item)
            .collect();
        let report = self.shopping.add_ingredients(&items);
        info!(
            id,
            added = report.added,
            incremented = report.incremented,
            "added recipe to shopping list"
        );
        Ok((recipe, report))
    }

    /// Save a recipe to favorites. Returns the saved entry and whether it was new.
    pub fn favorite_recipe(&mut self, id: i64) -> Result<(FavoriteEntry, bool)> {
        let recipe = self.live_recipe(id)?;
        let entry = RecipeSummary::from(&recipe);
        let added = self.favorites.add(entry.clone());
        Ok((entry, added))
    }

    /// Favorite when absent, unfavorite when present. Returns whether it is now a favorite.
    pub fn toggle_favorite(&mut self, id: i64) -> Result<bool> {
        if self.favorites.remove(id) {
            return Ok(false);
        }
        let (_, added) = self.favorite_recipe(id)?;
        Ok(added)
    }

    /// Put a recipe into a meal plan slot. Returns the meal and whether it replaced one.
    pub fn plan_recipe(&mut self, day: &str, slot: &str, id: i64) -> Result<(RecipeSummary, bool)> {
        let (day, slot) = parse_slot(day, slot)?;
        let recipe = self.live_recipe(id)?;
        let meal = RecipeSummary::from(&recipe);
        let replaced = self.meal_plan.set(day, slot, meal.clone());
        Ok((meal, replaced))
    }

    /// Put a favorite into a slot without a network round trip.
    pub fn plan_favorite(&mut self, day: &str, slot: &str, id: i64) -> Result<(RecipeSummary, bool)> {
        let (day, slot) = parse_slot(day, slot)?;
        let Some(meal) = self.favorites.list().iter().find(|f| f.id == id).cloned() else {
            bail!("Recipe {id} is not in favorites");
        };
        let replaced = self.meal_plan.set(day, slot, meal.clone());
        Ok((meal, replaced))
    }

    // --- Stores ---

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn favorites_mut(&mut self) -> &mut FavoritesStore {
        &mut self.favorites
    }

    pub fn shopping(&self) -> &ShoppingListStore {
        &self.shopping
    }

    pub fn shopping_mut(&mut self) -> &mut ShoppingListStore {
        &mut self.shopping
    }

    pub fn meal_plan(&self) -> &MealPlanStore {
        &self.meal_plan
    }

    pub fn meal_plan_mut(&mut self) -> &mut MealPlanStore {
        &mut self.meal_plan
    }

    /// Only live data goes into the persisted collections; built-in stand-ins never do.
    fn live_recipe(&self, id: i64) -> Result<Recipe> {
        match self.pipeline.get_by_id(id) {
            FetchOutcome::Success(recipe) => Ok(recipe),
            FetchOutcome::Degraded { reason, .. } => {
                let err = reason.last_error().cloned().unwrap_or(ApiError::NotFound);
                Err(anyhow::Error::new(err).context(format!("Recipe {id} could not be loaded")))
            }
            FetchOutcome::Failure(err) => {
                Err(anyhow::Error::new(err).context(format!("Recipe {id} could not be loaded")))
            }
        }
    }
}
