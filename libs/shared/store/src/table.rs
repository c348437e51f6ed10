use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;
use uuid::Uuid;

/// In-memory table keyed by id. One per aggregate type; the host owns
/// persistence, the core only needs a store that can be read and mutated
/// under the request that touches it.
pub struct Table<T> {
    rows: RwLock<HashMap<Uuid, T>>,
}

impl<T: Clone> Table<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<T> {
        self.rows.read().await.get(&id).cloned()
    }

    pub async fn insert(&self, id: Uuid, row: T) {
        self.rows.write().await.insert(id, row);
    }

    /// Apply `mutate` to the stored row, returning the updated copy.
    /// Returns `None` when the id is unknown; the row is untouched on
    /// that path.
    pub async fn update<F>(&self, id: Uuid, mutate: F) -> Option<T>
    where
        F: FnOnce(&mut T),
    {
        let mut rows = self.rows.write().await;
        let row = rows.get_mut(&id)?;
        mutate(row);
        Some(row.clone())
    }

    pub async fn remove(&self, id: Uuid) -> Option<T> {
        self.rows.write().await.remove(&id)
    }

    /// Apply `mutate` to every row matching `predicate` under one write
    /// lock. Returns the number of rows touched.
    pub async fn update_where<P, F>(&self, predicate: P, mutate: F) -> usize
    where
        P: Fn(&T) -> bool,
        F: Fn(&mut T),
    {
        let mut rows = self.rows.write().await;
        let mut touched = 0;
        for row in rows.values_mut() {
            if predicate(row) {
                mutate(row);
                touched += 1;
            }
        }
        touched
    }

    /// Snapshot of every row matching `predicate`.
    pub async fn filter<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.rows
            .read()
            .await
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }

    /// First row matching `predicate`, if any.
    pub async fn find<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.rows
            .read()
            .await
            .values()
            .find(|row| predicate(row))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

impl<T: Clone> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-key mutex registry. Booking and confirmation hold the provider's
/// lock across their check-then-commit section so two concurrent requests
/// for the same provider serialize instead of racing the overlap check.
#[derive(Default)]
pub struct LockMap {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl LockMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(key).or_default())
        };
        debug!("Acquiring serialization lock for key {}", key);
        lock.lock_owned().await
    }
}
