use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Arc, Mutex},
};

/// Deduplicates entity instances by key. `get_or_insert` holds the pool's
/// lock across construction of a missing entry, so two concurrent callers
/// racing on the same key are guaranteed to observe the same `Arc`.
pub struct Pool<K, V> {
    entries: Mutex<HashMap<K, Arc<V>>>,
}

impl<K, V> Default for Pool<K, V> {
    fn default() -> Self {
        Pool {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone, V> Pool<K, V> {
    pub fn get_or_insert(&self, key: K, make: impl FnOnce(K) -> V) -> Arc<V> {
        let mut entries = self.entries.lock().expect("pool lock poisoned");
        if let Some(existing) = entries.get(&key) {
            return existing.clone();
        }
        let value = Arc::new(make(key.clone()));
        entries.insert(key, value.clone());
        value
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.entries.lock().expect("pool lock poisoned").get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn identity() {
        let pool: Pool<u32, String> = Pool::default();
        let a = pool.get_or_insert(1, |k| format!("entity-{k}"));
        let b = pool.get_or_insert(1, |k| format!("entity-{k}"));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn concurrent_first_insert_collapses_to_one_entity() {
        let pool: Arc<Pool<u32, u32>> = Arc::new(Pool::default());
        let threads = 16;
        let barrier = Arc::new(Barrier::new(threads));
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let pool = pool.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    pool.get_or_insert(7, |_| 42)
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let first = &results[0];
        assert!(results.iter().all(|r| Arc::ptr_eq(first, r)));
    }
}
