use std::rc::Rc;

use serde_json::Value;

use crate::models::FavoriteEntry;
use crate::storage::{PersistentStore, Storage, StoreHealth};

pub const FAVORITES_KEY: &str = "recipe_favorites";
const SCHEMA_VERSION: u32 = 1;

// Version 0 is the bare array written before values carried a version; same shape.
fn migrate(_from: u32, data: Value) -> Result<Value, String> {
    Ok(data)
}

/// Saved recipes, unique by id, in the order they were favorited.
pub struct FavoritesStore {
    store: PersistentStore<Vec<FavoriteEntry>>,
    entries: Vec<FavoriteEntry>,
}

impl FavoritesStore {
    pub fn open(storage: Rc<dyn Storage>) -> Self {
        let store = persistent(storage);
        let mut entries = store.load();
        dedup_by_id(&mut entries);
        Self { store, entries }
    }

    /// Returns `false` without touching storage when the id is already saved.
    pub fn add(&mut self, entry: FavoriteEntry) -> bool {
        if self.is_favorite(entry.id) {
            return false;
        }
        self.entries.push(entry);
        self.store.save(&self.entries);
        true
    }

    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|f| f.id != id);
        if self.entries.len() == before {
            return false;
        }
        self.store.save(&self.entries);
        true
    }

    /// Add when absent, remove when present. Returns whether it is now a favorite.
    pub fn toggle(&mut self, entry: FavoriteEntry) -> bool {
        if self.remove(entry.id) {
            false
        } else {
            self.add(entry)
        }
    }

    #[must_use]
    pub fn is_favorite(&self, id: i64) -> bool {
        self.entries.iter().any(|f| f.id == id)
    }

    #[must_use]
    pub fn list(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Health of the persisted favorites without loading (and so without repairing) them.
    #[must_use]
    pub fn inspect(storage: Rc<dyn Storage>) -> StoreHealth {
        persistent(storage).inspect(Vec::len)
    }
}

fn persistent(storage: Rc<dyn Storage>) -> PersistentStore<Vec<FavoriteEntry>> {
    PersistentStore::new(storage, FAVORITES_KEY, Vec::new).with_schema(SCHEMA_VERSION, migrate)
}

// Stored data from another writer may contain duplicates; keep the first of each id.
fn dedup_by_id(entries: &mut Vec<FavoriteEntry>) {
    let mut seen = std::collections::HashSet::new();
    entries.retain(|e| seen.insert(e.id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn entry(id: i64, title: &str) -> FavoriteEntry {
        FavoriteEntry {
            id,
            title: title.to_string(),
            image: format!("https://img.example/{id}.jpg"),
            ready_in_minutes: 25,
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
        let mut favs = FavoritesStore::open(storage);
        assert!(favs.add(entry(1, "Pho")));
        let n = favs.len();

        assert!(favs.add(entry(2, "Ramen")));
        assert!(!favs.add(entry(2, "Ramen again")));
        assert_eq!(favs.len(), n + 1);
        assert_eq!(favs.list()[1].title, "Ramen");
    }

    #[test]
    fn test_remove_and_is_favorite() {
        let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
        let mut favs = FavoritesStore::open(storage);
        favs.add(entry(1, "Pho"));
        assert!(favs.is_favorite(1));
        assert!(favs.remove(1));
        assert!(!favs.is_favorite(1));
        assert!(!favs.remove(1));
        assert!(favs.is_empty());
    }

    #[test]
    fn test_toggle() {
        let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
        let mut favs = FavoritesStore::open(storage);
        assert!(favs.toggle(entry(5, "Tacos")));
        assert!(!favs.toggle(entry(5, "Tacos")));
        assert!(favs.is_empty());
    }

    #[test]
    fn test_persists_in_insertion_order() {
        let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
        {
            let mut favs = FavoritesStore::open(storage.clone());
            favs.add(entry(3, "C"));
            favs.add(entry(1, "A"));
            favs.add(entry(2, "B"));
        }
        let favs = FavoritesStore::open(storage);
        let ids: Vec<i64> = favs.list().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_legacy_array_loads() {
        let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
        storage
            .set(
                FAVORITES_KEY,
                r#"[{"id": 716429, "title": "Pasta", "image": "x.jpg", "readyInMinutes": 45},
                    {"id": 716429, "title": "Pasta dup"}]"#,
            )
            .unwrap();
        let favs = FavoritesStore::open(storage);
        assert_eq!(favs.len(), 1);
        assert_eq!(favs.list()[0].ready_in_minutes, 45);
    }

    #[test]
    fn test_corrupt_value_yields_empty() {
        let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
        storage.set(FAVORITES_KEY, "][").unwrap();
        let mut favs = FavoritesStore::open(storage.clone());
        assert!(favs.is_empty());
        favs.add(entry(1, "Fresh start"));
        assert_eq!(FavoritesStore::open(storage).len(), 1);
    }
}
