// store.rs

use crate::entities::Entity;

/// Ordered in-memory sequence of entities for the current page's scope.
///
/// The sequence is only touched after the corresponding remote write has been
/// confirmed - a failed call leaves it untouched. Two entities never share an
/// id: inserting an id that is already present replaces the existing element
/// in place instead of duplicating it.
#[derive(Debug, Default)]
pub struct EntityStore<T: Entity> {
    items: Vec<T>,
}

impl<T: Entity> EntityStore<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Replaces the whole sequence with a freshly loaded one, keeping the
    /// gateway-provided order. Later duplicates of an id are dropped.
    pub fn load(&mut self, items: Vec<T>) {
        self.items.clear();
        for item in items {
            if self.find(item.id()).is_none() {
                self.items.push(item);
            }
        }
    }

    pub fn append(&mut self, item: T) {
        self.insert_at(self.items.len(), item);
    }

    pub fn prepend(&mut self, item: T) {
        self.insert_at(0, item);
    }

    fn insert_at(&mut self, index: usize, item: T) {
        if let Some(pos) = self.items.iter().position(|e| e.id() == item.id()) {
            self.items[pos] = item;
        } else {
            self.items.insert(index, item);
        }
    }

    /// Applies a field patch to the entity with this id, identity preserved.
    /// Returns false when the id is not in the sequence.
    pub fn replace(&mut self, id: &str, patch: impl FnOnce(&mut T)) -> bool {
        match self.items.iter_mut().find(|e| e.id() == id) {
            Some(item) => {
                patch(item);
                debug_assert_eq!(item.id(), id);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        let pos = self.items.iter().position(|e| e.id() == id)?;
        Some(self.items.remove(pos))
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|e| e.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Entity, PlannerEntry};
    use chrono::NaiveDate;

    fn entry(id: &str, content: &str) -> PlannerEntry {
        PlannerEntry {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
            content: content.to_string(),
            emoji: "📝".to_string(),
            user_id: "u1".to_string(),
            user_email: "u1@example.com".to_string(),
        }
    }

    fn ids(store: &EntityStore<PlannerEntry>) -> Vec<&str> {
        store.iter().map(|e| e.id()).collect()
    }

    #[test]
    fn insert_then_remove_restores_the_sequence() {
        let mut store = EntityStore::new();
        store.load(vec![entry("a", "one"), entry("b", "two")]);
        let before = ids(&store)
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        store.prepend(entry("c", "three"));
        assert_eq!(ids(&store), vec!["c", "a", "b"]);

        store.remove("c").expect("c was inserted");
        assert_eq!(ids(&store), before);
    }

    #[test]
    fn load_drops_duplicate_ids() {
        let mut store = EntityStore::new();
        store.load(vec![entry("a", "first"), entry("a", "second"), entry("b", "x")]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.find("a").unwrap().content, "first");
    }

    #[test]
    fn inserting_an_existing_id_replaces_in_place() {
        let mut store = EntityStore::new();
        store.load(vec![entry("a", "old"), entry("b", "x")]);
        store.append(entry("a", "new"));
        assert_eq!(ids(&store), vec!["a", "b"]);
        assert_eq!(store.find("a").unwrap().content, "new");
    }

    #[test]
    fn replace_patches_named_fields_only() {
        let mut store = EntityStore::new();
        store.load(vec![entry("a", "before")]);
        let untouched = store.find("a").unwrap().clone();

        let hit = store.replace("a", |e| e.content = "after".to_string());
        assert!(hit);

        let patched = store.find("a").unwrap();
        assert_eq!(patched.content, "after");
        assert_eq!(patched.id, untouched.id);
        assert_eq!(patched.date, untouched.date);
        assert_eq!(patched.emoji, untouched.emoji);
        assert_eq!(patched.user_id, untouched.user_id);
        assert_eq!(patched.user_email, untouched.user_email);
    }

    #[test]
    fn replace_of_unknown_id_is_a_no_op() {
        let mut store = EntityStore::new();
        store.load(vec![entry("a", "x")]);
        assert!(!store.replace("zzz", |e| e.content.clear()));
        assert_eq!(store.find("a").unwrap().content, "x");
    }
}
