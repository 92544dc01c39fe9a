use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::Value;

use crate::error::StoreError;
use crate::models::{Day, DayPlan, MealRef, MealSlot, PlanSummary, parse_slot};
use crate::storage::{PersistentStore, Storage, StoreHealth};

pub const MEAL_PLAN_KEY: &str = "weekly_meal_plan";
pub const TOTAL_SLOTS: usize = Day::ALL.len() * MealSlot::ALL.len();
const SCHEMA_VERSION: u32 = 1;

pub type MealPlan = BTreeMap<Day, DayPlan>;

// Version 0 is the same day -> slot -> meal object, only without the envelope.
fn migrate(_from: u32, data: Value) -> Result<Value, String> {
    Ok(data)
}

fn persistent(storage: Rc<dyn Storage>) -> PersistentStore<MealPlan> {
    PersistentStore::new(storage, MEAL_PLAN_KEY, empty_plan).with_schema(SCHEMA_VERSION, migrate)
}

fn filled_count(plan: &MealPlan) -> usize {
    plan.values()
        .map(|d| MealSlot::ALL.iter().filter(|s| d.get(**s).is_some()).count())
        .sum()
}

fn empty_plan() -> MealPlan {
    Day::ALL.into_iter().map(|d| (d, DayPlan::default())).collect()
}

/// Seven days of breakfast, lunch, and dinner slots.
pub struct MealPlanStore {
    store: PersistentStore<MealPlan>,
    plan: MealPlan,
}

impl MealPlanStore {
    pub fn open(storage: Rc<dyn Storage>) -> Self {
        let store = persistent(storage);
        let mut plan = store.load();
        for day in Day::ALL {
            plan.entry(day).or_default();
        }
        Self { store, plan }
    }

    /// Put a meal in a slot. Returns whether the slot already held a meal.
    pub fn set_meal(&mut self, day: &str, slot: &str, meal: MealRef) -> Result<bool, StoreError> {
        let (day, slot) = parse_slot(day, slot)?;
        Ok(self.set(day, slot, meal))
    }

    /// Empty a slot. Returns whether it held a meal.
    pub fn clear_meal(&mut self, day: &str, slot: &str) -> Result<bool, StoreError> {
        let (day, slot) = parse_slot(day, slot)?;
        Ok(self.clear(day, slot))
    }

    pub fn set(&mut self, day: Day, slot: MealSlot, meal: MealRef) -> bool {
        let was_filled = self.day_mut(day).slot_mut(slot).replace(meal).is_some();
        self.store.save(&self.plan);
        was_filled
    }

    pub fn clear(&mut self, day: Day, slot: MealSlot) -> bool {
        let was_filled = self.day_mut(day).slot_mut(slot).take().is_some();
        if was_filled {
            self.store.save(&self.plan);
        }
        was_filled
    }

    pub fn clear_all(&mut self) {
        self.plan = empty_plan();
        self.store.save(&self.plan);
    }

    #[must_use]
    pub fn meal(&self, day: Day, slot: MealSlot) -> Option<&MealRef> {
        self.plan.get(&day).and_then(|d| d.get(slot))
    }

    #[must_use]
    pub fn plan(&self) -> &MealPlan {
        &self.plan
    }

    /// Days whose `slot` is still empty, in week order.
    #[must_use]
    pub fn open_days(&self, slot: MealSlot) -> Vec<Day> {
        Day::ALL
            .into_iter()
            .filter(|d| self.meal(*d, slot).is_none())
            .collect()
    }

    #[must_use]
    pub fn summary(&self) -> PlanSummary {
        let filled_slots = Day::ALL
            .iter()
            .flat_map(|d| MealSlot::ALL.iter().map(move |s| (*d, *s)))
            .filter(|(d, s)| self.meal(*d, *s).is_some())
            .count();
        // round(100 * filled / total); total is odd so there is never a tie
        let percentage = ((filled_slots * 100 + TOTAL_SLOTS / 2) / TOTAL_SLOTS) as u32;
        PlanSummary {
            total_slots: TOTAL_SLOTS,
            filled_slots,
            percentage,
        }
    }

    #[must_use]
    pub fn inspect(storage: Rc<dyn Storage>) -> StoreHealth {
        persistent(storage).inspect(filled_count)
    }

    fn day_mut(&mut self, day: Day) -> &mut DayPlan {
        self.plan.entry(day).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn meal(id: i64) -> MealRef {
        MealRef {
            id,
            title: format!("Recipe {id}"),
            image: String::new(),
            ready_in_minutes: 30,
        }
    }

    fn open() -> (Rc<dyn Storage>, MealPlanStore) {
        let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
        let plan = MealPlanStore::open(storage.clone());
        (storage, plan)
    }

    #[test]
    fn test_fresh_plan_has_all_slots() {
        let (_, plan) = open();
        let summary = plan.summary();
        assert_eq!(summary.total_slots, 21);
        assert_eq!(summary.filled_slots, 0);
        assert_eq!(summary.percentage, 0);
        assert_eq!(plan.plan().len(), 7);
    }

    #[test]
    fn test_set_meal_counts_and_overwrite() {
        let (_, mut plan) = open();
        assert!(!plan.set_meal("Monday", "breakfast", meal(1)).unwrap());
        assert_eq!(plan.summary().filled_slots, 1);
        assert!(!plan.set_meal("monday", "LUNCH", meal(2)).unwrap());
        assert_eq!(plan.summary().filled_slots, 2);

        // Overwrite keeps the count.
        assert!(plan.set_meal("Monday", "lunch", meal(3)).unwrap());
        assert_eq!(plan.summary().filled_slots, 2);
        assert_eq!(plan.meal(Day::Monday, MealSlot::Lunch).unwrap().id, 3);
    }

    #[test]
    fn test_percentage_rounding() {
        let (_, mut plan) = open();
        let mut expected = Vec::new();
        let mut got = Vec::new();
        for (n, (day, slot)) in Day::ALL
            .iter()
            .flat_map(|d| MealSlot::ALL.iter().map(move |s| (*d, *s)))
            .enumerate()
        {
            plan.set(day, slot, meal(n as i64));
            let filled = n + 1;
            expected.push((100.0 * filled as f64 / 21.0).round() as u32);
            got.push(plan.summary().percentage);
        }
        assert_eq!(got, expected);
        assert_eq!(plan.summary().percentage, 100);
        assert_eq!(got[0], 5);
        assert_eq!(got[1], 10);
    }

    #[test]
    fn test_invalid_slot_is_an_error() {
        let (_, mut plan) = open();
        assert!(matches!(
            plan.set_meal("Caturday", "dinner", meal(1)),
            Err(StoreError::InvalidSlot { .. })
        ));
        assert!(matches!(
            plan.clear_meal("Monday", "snack"),
            Err(StoreError::InvalidSlot { .. })
        ));
        assert_eq!(plan.summary().filled_slots, 0);
    }

    #[test]
    fn test_clear_meal() {
        let (_, mut plan) = open();
        plan.set_meal("Friday", "dinner", meal(9)).unwrap();
        assert!(plan.clear_meal("Friday", "dinner").unwrap());
        assert!(!plan.clear_meal("Friday", "dinner").unwrap());
        assert_eq!(plan.summary().filled_slots, 0);
    }

    #[test]
    fn test_open_days() {
        let (_, mut plan) = open();
        plan.set(Day::Monday, MealSlot::Dinner, meal(1));
        plan.set(Day::Sunday, MealSlot::Dinner, meal(2));
        plan.set(Day::Tuesday, MealSlot::Lunch, meal(3));
        let open = plan.open_days(MealSlot::Dinner);
        assert_eq!(open.len(), 5);
        assert_eq!(open.first(), Some(&Day::Tuesday));
        assert_eq!(open.last(), Some(&Day::Saturday));
    }

    #[test]
    fn test_missing_days_are_filled_in() {
        let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
        storage
            .set(
                MEAL_PLAN_KEY,
                r#"{"Monday": {"breakfast": {"id": 1, "title": "Oats", "image": "", "readyInMinutes": 5}},
                    "Tuesday": {"breakfast": null, "lunch": null, "dinner": null}}"#,
            )
            .unwrap();
        let plan = MealPlanStore::open(storage);
        assert_eq!(plan.plan().len(), 7);
        assert_eq!(plan.summary().total_slots, 21);
        assert_eq!(plan.summary().filled_slots, 1);
        assert!(plan.meal(Day::Monday, MealSlot::Lunch).is_none());
    }

    #[test]
    fn test_serialized_grid_is_total() {
        let (storage, mut plan) = open();
        plan.set(Day::Wednesday, MealSlot::Lunch, meal(4));
        let raw = storage.get(MEAL_PLAN_KEY).unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        let days = value["data"].as_object().unwrap();
        assert_eq!(days.len(), 7);
        for day in days.values() {
            let slots = day.as_object().unwrap();
            assert_eq!(slots.len(), 3);
        }
        assert_eq!(value["data"]["Wednesday"]["lunch"]["id"], 4);
        assert!(value["data"]["Sunday"]["dinner"].is_null());
    }

    #[test]
    fn test_corrupt_plan_recovers() {
        let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
        storage.set(MEAL_PLAN_KEY, r#"{"Someday": {}}"#).unwrap();
        let plan = MealPlanStore::open(storage);
        assert_eq!(plan.summary().filled_slots, 0);
        assert_eq!(plan.plan().len(), 7);
    }

    #[test]
    fn test_inspect_counts_filled_slots() {
        let (storage, mut plan) = open();
        plan.set(Day::Monday, MealSlot::Dinner, meal(1));
        plan.set(Day::Friday, MealSlot::Breakfast, meal(2));
        let health = MealPlanStore::inspect(storage);
        assert!(health.valid);
        assert_eq!(health.count, Some(2));
    }
}
