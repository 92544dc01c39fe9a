use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::fallback::{fallback_recipes, placeholder_recipe};
use crate::models::{DietaryFilters, Recipe, ingredient_list};

/// Transport seam for the remote recipe API.
///
/// The CLI implements this with reqwest; tests use in-memory mocks. Each method is one
/// request against one endpoint: no retries, no fallback.
pub trait RecipeSource {
    fn complex_search(&self, query: &str, filters: &DietaryFilters)
    -> Result<Vec<Recipe>, ApiError>;
    fn find_by_ingredients(&self, ingredients: &str) -> Result<Vec<Recipe>, ApiError>;
    fn recipe_information(&self, id: i64) -> Result<Recipe, ApiError>;
}

impl<S: RecipeSource + ?Sized> RecipeSource for &S {
    fn complex_search(
        &self,
        query: &str,
        filters: &DietaryFilters,
    ) -> Result<Vec<Recipe>, ApiError> {
        (**self).complex_search(query, filters)
    }

    fn find_by_ingredients(&self, ingredients: &str) -> Result<Vec<Recipe>, ApiError> {
        (**self).find_by_ingredients(ingredients)
    }

    fn recipe_information(&self, id: i64) -> Result<Recipe, ApiError> {
        (**self).recipe_information(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    RichSearch,
    IngredientSearch,
    RecipeInformation,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::RichSearch => "rich search",
            Tier::IngredientSearch => "ingredient search",
            Tier::RecipeInformation => "recipe lookup",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierFailure {
    Error(ApiError),
    Empty,
    /// The endpoint answered for a different recipe than the one requested.
    Mismatch { returned: i64 },
}

impl fmt::Display for TierFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierFailure::Error(e) => write!(f, "{e}"),
            TierFailure::Empty => f.write_str("returned no results"),
            TierFailure::Mismatch { returned } => write!(f, "returned recipe {returned}"),
        }
    }
}

/// Every tier that was tried and why it did not produce data, in call order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DegradeReason {
    pub failures: Vec<(Tier, TierFailure)>,
}

impl DegradeReason {
    fn record(&mut self, tier: Tier, failure: TierFailure) {
        match &failure {
            TierFailure::Error(e) => warn!(%tier, kind = e.kind(), "{e}"),
            other => warn!(%tier, "{other}"),
        }
        self.failures.push((tier, failure));
    }

    /// The last classified error, if any tier failed with one.
    #[must_use]
    pub fn last_error(&self) -> Option<&ApiError> {
        self.failures.iter().rev().find_map(|(_, f)| match f {
            TierFailure::Error(e) => Some(e),
            _ => None,
        })
    }
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (tier, failure)) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{tier}: {failure}")?;
        }
        Ok(())
    }
}

/// Result of one logical retrieval.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Success(T),
    /// Built-in data stood in for the live source.
    Degraded { data: T, reason: DegradeReason },
    Failure(ApiError),
}

impl<T> FetchOutcome<T> {
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) | Self::Degraded { data, .. } => Some(data),
            Self::Failure(_) => None,
        }
    }

    #[must_use]
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success(data) | Self::Degraded { data, .. } => Some(data),
            Self::Failure(_) => None,
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    #[must_use]
    pub fn degrade_reason(&self) -> Option<&DegradeReason> {
        match self {
            Self::Degraded { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

pub struct FetchPipeline<S> {
    source: S,
    placeholder_detail: bool,
}

impl<S: RecipeSource> FetchPipeline<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            placeholder_detail: true,
        }
    }

    /// Detail lookups report `Failure` instead of serving a placeholder recipe.
    #[must_use]
    pub fn without_placeholder(mut self) -> Self {
        self.placeholder_detail = false;
        self
    }

    /// Rich search, then ingredient search, then the built-in recipes. Never fails.
    pub fn search(&self, query: &str, filters: &DietaryFilters) -> FetchOutcome<Vec<Recipe>> {
        let mut reason = DegradeReason::default();

        match self.source.complex_search(query, filters) {
            Ok(recipes) if !recipes.is_empty() => {
                debug!(tier = %Tier::RichSearch, count = recipes.len(), "search answered");
                return FetchOutcome::Success(recipes);
            }
            Ok(_) => reason.record(Tier::RichSearch, TierFailure::Empty),
            Err(e) => reason.record(Tier::RichSearch, TierFailure::Error(e)),
        }

        let ingredients = ingredient_list(query);
        if ingredients.is_empty() {
            reason.record(Tier::IngredientSearch, TierFailure::Empty);
        } else {
            match self.source.find_by_ingredients(&ingredients) {
                Ok(recipes) if !recipes.is_empty() => {
                    debug!(tier = %Tier::IngredientSearch, count = recipes.len(), "search answered");
                    return FetchOutcome::Success(recipes);
                }
                Ok(_) => reason.record(Tier::IngredientSearch, TierFailure::Empty),
                Err(e) => reason.record(Tier::IngredientSearch, TierFailure::Error(e)),
            }
        }

        info!(query, %reason, "serving built-in recipes");
        FetchOutcome::Degraded {
            data: fallback_recipes(),
            reason,
        }
    }

    /// Live lookup, then a placeholder carrying the requested id.
    pub fn get_by_id(&self, id: i64) -> FetchOutcome<Recipe> {
        let mut reason = DegradeReason::default();

        match self.source.recipe_information(id) {
            Ok(recipe) if recipe.id == id => return FetchOutcome::Success(recipe),
            Ok(recipe) => reason.record(
                Tier::RecipeInformation,
                TierFailure::Mismatch {
                    returned: recipe.id,
                },
            ),
            Err(e) => reason.record(Tier::RecipeInformation, TierFailure::Error(e)),
        }

        if !self.placeholder_detail {
            let err = reason
                .last_error()
                .cloned()
                .unwrap_or(ApiError::NotFound);
            return FetchOutcome::Failure(err);
        }

        info!(id, %reason, "serving placeholder recipe");
        FetchOutcome::Degraded {
            data: placeholder_recipe(id),
            reason,
        }
    }
}
