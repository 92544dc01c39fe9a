use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub const DEFAULT_READY_MINUTES: u32 = 30;
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/312x231?text=Recipe";
pub const MAX_QUERY_LEN: usize = 100;

// --- Recipes (read-only, as fetched) ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub ready_in_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    pub ingredients: Vec<Ingredient>,
    pub instruction_steps: Vec<InstructionStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredient_match: Option<IngredientMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub original: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Ingredient {
    /// A display-only ingredient line with no structured name or unit.
    pub fn line(original: &str) -> Self {
        Self {
            original: original.to_string(),
            name: None,
            unit: None,
        }
    }

    /// Shopping list entry for this ingredient: the structured name when the API
    /// gave one, otherwise the whole display line.
    #[must_use]
    pub fn to_shopping_item(&self) -> NewShoppingItem {
        let name = self
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.original);
        NewShoppingItem {
            name: name.trim().to_string(),
            unit: self.unit.clone().filter(|u| !u.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstructionStep {
    pub number: u32,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngredientMatch {
    pub used: u32,
    pub missed: u32,
}

// --- Persisted projections ---

/// Projection of a [`Recipe`] kept in favorites and in meal plan slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default = "default_ready_minutes")]
    pub ready_in_minutes: u32,
}

pub type FavoriteEntry = RecipeSummary;
pub type MealRef = RecipeSummary;

fn default_ready_minutes() -> u32 {
    DEFAULT_READY_MINUTES
}

impl From<&Recipe> for RecipeSummary {
    fn from(r: &Recipe) -> Self {
        Self {
            id: r.id,
            title: r.title.clone(),
            image: if r.image.is_empty() {
                PLACEHOLDER_IMAGE.to_string()
            } else {
                r.image.clone()
            },
            ready_in_minutes: if r.ready_in_minutes == 0 {
                DEFAULT_READY_MINUTES
            } else {
                r.ready_in_minutes
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShoppingItem {
    pub name: String,
    pub unit: Option<String>,
}

impl NewShoppingItem {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            unit: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub added: usize,
    pub incremented: usize,
}

// --- Meal plan grid ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Day {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Day::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MealSlot {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MealSlot::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// Resolve a `(day, slot)` pair given as free text.
pub fn parse_slot(day: &str, slot: &str) -> Result<(Day, MealSlot), StoreError> {
    match (day.parse::<Day>(), slot.parse::<MealSlot>()) {
        (Ok(d), Ok(s)) => Ok((d, s)),
        _ => Err(StoreError::InvalidSlot {
            day: day.to_string(),
            slot: slot.to_string(),
        }),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    #[serde(default)]
    pub breakfast: Option<MealRef>,
    #[serde(default)]
    pub lunch: Option<MealRef>,
    #[serde(default)]
    pub dinner: Option<MealRef>,
}

impl DayPlan {
    #[must_use]
    pub fn get(&self, slot: MealSlot) -> Option<&MealRef> {
        match slot {
            MealSlot::Breakfast => self.breakfast.as_ref(),
            MealSlot::Lunch => self.lunch.as_ref(),
            MealSlot::Dinner => self.dinner.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, slot: MealSlot) -> &mut Option<MealRef> {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub total_slots: usize,
    pub filled_slots: usize,
    pub percentage: u32,
}

// --- Search input ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietaryFilters {
    pub vegetarian: bool,
    pub gluten_free: bool,
    pub dairy_free: bool,
}

impl DietaryFilters {
    /// Query parameters for the active filters only.
    #[must_use]
    pub fn query_params(&self) -> Vec<(&'static str, &'static str)> {
        let mut params = Vec::new();
        if self.vegetarian {
            params.push(("vegetarian", "true"));
        }
        if self.gluten_free {
            params.push(("glutenFree", "true"));
        }
        if self.dairy_free {
            params.push(("dairyFree", "true"));
        }
        params
    }
}

pub fn validate_search_query(query: &str) -> Result<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        bail!("Search query cannot be empty");
    }
    if trimmed.chars().count() > MAX_QUERY_LEN {
        bail!("Search query is too long (maximum {MAX_QUERY_LEN} characters)");
    }
    if trimmed.contains(['<', '>', '{', '}']) {
        bail!("Search query contains invalid characters");
    }
    Ok(trimmed.to_string())
}

/// Turn a free-text query into the comma-joined list the ingredient search expects.
#[must_use]
pub fn ingredient_list(query: &str) -> String {
    query
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}
