use anyhow::Result;

use recipehub_core::router::Resolution;
use recipehub_core::service::ViewData;

use super::Hub;
use super::favorites::render_favorites;
use super::plan::render_plan;
use super::search::render_search;
use super::shopping::render_shopping;
use super::show::render_detail;

/// Route to a view by token (`/favorites`, `#/recipe/42`, ...) and render it.
pub(crate) fn cmd_open(hub: &Hub, token: Option<&str>, json: bool) -> Result<()> {
    let (router, resolution) = hub.open_route(token);
    if let Resolution::Stale(route) = resolution {
        tracing::debug!(%route, "initial load superseded");
    }
    let Some(view) = router.active_view() else {
        return Ok(());
    };

    match view {
        ViewData::Search { query, outcome, .. } => render_search(query, outcome, json),
        ViewData::Favorites(entries) => render_favorites(entries, json),
        ViewData::ShoppingList(items) => render_shopping(items, json),
        ViewData::MealPlanner { plan, summary } => render_plan(plan, *summary, json),
        ViewData::RecipeDetail {
            id,
            outcome,
            is_favorite,
        } => render_detail(*id, outcome, *is_favorite, json),
    }
}
