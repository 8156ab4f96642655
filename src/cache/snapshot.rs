// Immutable snapshot: the item list and its id index, always built together.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Anything stored in a cache snapshot is looked up by a stable string id.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// One published refresh result. Never mutated after construction; a refresh
/// replaces the whole value.
#[derive(Debug)]
pub struct Snapshot<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl<T> Snapshot<T> {
    /// The snapshot served before the first successful refresh.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            refreshed_at: None,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// When the refresh that built this snapshot completed; `None` for the empty snapshot.
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }
}

impl<T: Keyed> Snapshot<T> {
    /// Builds the index from `items`. On duplicate ids the first item wins.
    pub fn new(items: Vec<T>, refreshed_at: DateTime<Utc>) -> Self {
        let mut index = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            index.entry(item.key().to_owned()).or_insert(i);
        }
        Self {
            items,
            index,
            refreshed_at: Some(refreshed_at),
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).and_then(|&i| self.items.get(i))
    }
}
