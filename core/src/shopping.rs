use std::rc::Rc;

use chrono::Utc;
use rand::Rng;
use serde_json::Value;

use crate::models::{MergeReport, NewShoppingItem, ShoppingItem};
use crate::storage::{PersistentStore, Storage, StoreHealth};

pub const SHOPPING_LIST_KEY: &str = "shopping_list";
const SCHEMA_VERSION: u32 = 1;

/// Version 0 lists used numeric ids (`Date.now() + Math.random()`); ids are strings now.
fn migrate(from: u32, mut data: Value) -> Result<Value, String> {
    if from == 0 {
        let items = data.as_array_mut().ok_or("shopping list is not an array")?;
        for item in items {
            let numeric = item
                .get("id")
                .filter(|id| id.is_number())
                .map(ToString::to_string);
            if let Some(id) = numeric {
                item["id"] = Value::String(id);
            }
        }
    }
    Ok(data)
}

/// Synthetic item id: millisecond timestamp plus 32 random bits.
fn new_item_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let salt: u32 = rand::rng().random();
    format!("{millis:x}-{salt:08x}")
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Older lists matched names case-sensitively and may hold "Tomato" next to "tomato".
/// Later items fold into the first: quantities add up, checked if either was.
/// Returns whether anything was folded.
fn fold_duplicate_names(items: &mut Vec<ShoppingItem>) -> bool {
    let before = items.len();
    let mut folded: Vec<ShoppingItem> = Vec::with_capacity(before);
    for item in items.drain(..) {
        if let Some(first) = folded.iter_mut().find(|f| same_name(&f.name, &item.name)) {
            first.quantity = first.quantity.saturating_add(item.quantity);
            first.checked |= item.checked;
        } else {
            folded.push(item);
        }
    }
    *items = folded;
    items.len() < before
}

pub struct ShoppingListStore {
    store: PersistentStore<Vec<ShoppingItem>>,
    items: Vec<ShoppingItem>,
}

impl ShoppingListStore {
    pub fn open(storage: Rc<dyn Storage>) -> Self {
        let store = persistent(storage);
        let mut items = store.load();
        if fold_duplicate_names(&mut items) {
            store.save(&items);
        }
        Self { store, items }
    }

    /// Fold ingredients into the list: a case-insensitive name match bumps the existing
    /// item's quantity by one, anything else is appended unchecked with quantity 1.
    pub fn add_ingredients(&mut self, incoming: &[NewShoppingItem]) -> MergeReport {
        let mut report = MergeReport::default();
        for ing in incoming {
            let name = ing.name.trim();
            if name.is_empty() {
                continue;
            }
            if let Some(existing) = self.items.iter_mut().find(|i| same_name(&i.name, name)) {
                existing.quantity = existing.quantity.saturating_add(1);
                report.incremented += 1;
            } else {
                self.items.push(ShoppingItem {
                    id: new_item_id(),
                    name: name.to_string(),
                    quantity: 1,
                    unit: ing.unit.clone(),
                    checked: false,
                });
                report.added += 1;
            }
        }
        if report != MergeReport::default() {
            self.store.save(&self.items);
        }
        report
    }

    /// Flip an item's checked state. Returns the new state, or `None` for an unknown id.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let item = self.items.iter_mut().find(|i| i.id == id)?;
        item.checked = !item.checked;
        let checked = item.checked;
        self.store.save(&self.items);
        Some(checked)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        if self.items.len() == before {
            return false;
        }
        self.store.save(&self.items);
        true
    }

    /// Drop every checked item. Returns how many were removed.
    pub fn clear_checked(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|i| !i.checked);
        let removed = before - self.items.len();
        if removed > 0 {
            self.store.save(&self.items);
        }
        removed
    }

    /// Empty the list. Callers are expected to have confirmed with the user.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        self.store.save(&self.items);
        removed
    }

    #[must_use]
    pub fn items(&self) -> &[ShoppingItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ShoppingItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Items not yet checked off.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.items.iter().filter(|i| !i.checked).count()
    }

    #[must_use]
    pub fn inspect(storage: Rc<dyn Storage>) -> StoreHealth {
        persistent(storage).inspect(Vec::len)
    }
}

fn persistent(storage: Rc<dyn Storage>) -> PersistentStore<Vec<ShoppingItem>> {
    PersistentStore::new(storage, SHOPPING_LIST_KEY, Vec::new).with_schema(SCHEMA_VERSION, migrate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn open() -> (Rc<dyn Storage>, ShoppingListStore) {
        let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
        let list = ShoppingListStore::open(storage.clone());
        (storage, list)
    }

    #[test]
    fn test_case_insensitive_merge() {
        let (_, mut list) = open();
        list.add_ingredients(&[NewShoppingItem::named("Tomato")]);
        let report = list.add_ingredients(&[NewShoppingItem::named("tomato")]);
        assert_eq!(
            report,
            MergeReport {
                added: 0,
                incremented: 1
            }
        );
        assert_eq!(list.items().len(), 1);
        assert_eq!(list.items()[0].quantity, 2);
        assert_eq!(list.items()[0].name, "Tomato");
    }

    #[test]
    fn test_merge_keeps_original_unit() {
        let (_, mut list) = open();
        list.add_ingredients(&[NewShoppingItem {
            name: "Milk".to_string(),
            unit: Some("cup".to_string()),
        }]);
        list.add_ingredients(&[NewShoppingItem {
            name: "MILK".to_string(),
            unit: Some("ml".to_string()),
        }]);
        assert_eq!(list.items()[0].unit.as_deref(), Some("cup"));
        assert_eq!(list.items()[0].quantity, 2);
    }

    #[test]
    fn test_merge_within_one_batch() {
        let (_, mut list) = open();
        let report = list.add_ingredients(&[
            NewShoppingItem::named("egg"),
            NewShoppingItem::named("Flour"),
            NewShoppingItem::named("EGG"),
            NewShoppingItem::named("  "),
        ]);
        assert_eq!(report.added, 2);
        assert_eq!(report.incremented, 1);
        assert_eq!(list.items().len(), 2);
        assert!(list.items().iter().all(|i| !i.checked));
    }

    #[test]
    fn test_ids_are_unique() {
        let (_, mut list) = open();
        let names: Vec<NewShoppingItem> = (0..200)
            .map(|i| NewShoppingItem::named(&format!("item {i}")))
            .collect();
        list.add_ingredients(&names);
        let ids: std::collections::HashSet<&str> =
            list.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn test_toggle_remove_and_clear_checked() {
        let (storage, mut list) = open();
        list.add_ingredients(&[
            NewShoppingItem::named("Basil"),
            NewShoppingItem::named("Garlic"),
            NewShoppingItem::named("Onion"),
        ]);
        let basil = list.items()[0].id.clone();
        let onion = list.items()[2].id.clone();

        assert_eq!(list.toggle(&basil), Some(true));
        assert_eq!(list.toggle(&onion), Some(true));
        assert_eq!(list.toggle(&onion), Some(false));
        assert_eq!(list.toggle("missing"), None);
        assert_eq!(list.remaining(), 2);

        assert_eq!(list.clear_checked(), 1);
        let names: Vec<&str> = list.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Garlic", "Onion"]);

        assert!(list.remove(&onion));
        assert!(!list.remove(&onion));

        let reopened = ShoppingListStore::open(storage);
        assert_eq!(reopened.items().len(), 1);
        assert_eq!(reopened.items()[0].name, "Garlic");
    }

    #[test]
    fn test_clear_all_is_not_gated() {
        let (storage, mut list) = open();
        list.add_ingredients(&[NewShoppingItem::named("a"), NewShoppingItem::named("b")]);
        assert_eq!(list.clear_all(), 2);
        assert!(ShoppingListStore::open(storage).items().is_empty());
    }

    #[test]
    fn test_legacy_numeric_ids_migrate() {
        let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
        storage
            .set(
                SHOPPING_LIST_KEY,
                r#"[{"id": 1718000000000.123, "name": "Rice", "quantity": 2, "unit": "cups", "checked": true},
                    {"id": 1718000000001.5, "name": "Beans", "quantity": 1, "checked": false}]"#,
            )
            .unwrap();
        let mut list = ShoppingListStore::open(storage);
        assert_eq!(list.items().len(), 2);
        assert_eq!(list.items()[0].id, "1718000000000.123");
        assert!(list.items()[0].checked);
        assert_eq!(list.items()[1].unit, None);

        assert_eq!(list.toggle("1718000000001.5"), Some(true));
    }

    #[test]
    fn test_legacy_case_duplicates_fold_on_open() {
        let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
        storage
            .set(
                SHOPPING_LIST_KEY,
                r#"[{"id": 1, "name": "Tomato", "quantity": 1, "unit": "whole", "checked": false},
                    {"id": 2, "name": "Basil", "quantity": 1, "checked": false},
                    {"id": 3, "name": "tomato", "quantity": 2, "unit": "can", "checked": true}]"#,
            )
            .unwrap();
        let mut list = ShoppingListStore::open(storage.clone());
        assert_eq!(list.items().len(), 2);
        let tomato = &list.items()[0];
        assert_eq!(tomato.id, "1");
        assert_eq!(tomato.name, "Tomato");
        assert_eq!(tomato.quantity, 3);
        assert_eq!(tomato.unit.as_deref(), Some("whole"));
        assert!(tomato.checked);

        list.add_ingredients(&[NewShoppingItem::named("TOMATO")]);
        assert_eq!(list.items().len(), 2);
        assert_eq!(list.items()[0].quantity, 4);

        // The folded list is what got written back.
        let reopened = ShoppingListStore::open(storage);
        let names: Vec<&str> = reopened.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Tomato", "Basil"]);
    }

    #[test]
    fn test_quantity_saturates() {
        let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
        storage
            .set(
                SHOPPING_LIST_KEY,
                r#"{"version": 1, "data": [{"id": "a", "name": "Salt", "quantity": 4294967295, "checked": false}]}"#,
            )
            .unwrap();
        let mut list = ShoppingListStore::open(storage);
        let report = list.add_ingredients(&[NewShoppingItem::named("salt")]);
        assert_eq!(report.incremented, 1);
        assert_eq!(list.items()[0].quantity, u32::MAX);
    }
}
