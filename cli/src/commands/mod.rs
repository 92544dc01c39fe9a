mod check;
mod favorites;
mod helpers;
mod open;
mod plan;
mod search;
mod shopping;
mod show;

use recipehub_core::service::RecipeHub;

use crate::spoonacular::SpoonacularClient;

pub(crate) type Hub = RecipeHub<SpoonacularClient>;

pub(crate) use check::cmd_check;
pub(crate) use favorites::{cmd_favorite_add, cmd_favorite_list, cmd_favorite_remove};
pub(crate) use open::cmd_open;
pub(crate) use plan::{cmd_plan_clear, cmd_plan_open_days, cmd_plan_set, cmd_plan_show};
pub(crate) use search::cmd_search;
pub(crate) use shopping::{
    cmd_shopping_add, cmd_shopping_add_recipe, cmd_shopping_clear, cmd_shopping_clear_checked,
    cmd_shopping_list, cmd_shopping_remove, cmd_shopping_toggle,
};
pub(crate) use show::cmd_show;
