//! Keyed store of fetched list pages shared by every request.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::list::options::QueryOptions;

/// Cache key: a scope such as `products` plus the serialized query options.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    scope: String,
    options: String,
}

impl QueryKey {
    pub fn new(scope: impl Into<String>, options: &QueryOptions) -> Self {
        Self::raw(scope, options.cache_key())
    }

    /// Key for data that is not described by list options, e.g. a lookup table.
    pub fn raw(scope: impl Into<String>, options: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            options: options.into(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn options(&self) -> &str {
        &self.options
    }

    pub fn in_scope(&self, scope: &str) -> bool {
        self.scope == scope
    }
}

#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    pub value: V,
    pub fetched_at: Instant,
    pub stale: bool,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
            stale: false,
        }
    }

    pub fn is_fresh(&self) -> bool {
        !self.stale
    }
}

/// Entry as it was before an in-place [`QueryCache::update`], with the revision
/// the update left behind.
#[derive(Clone, Debug)]
pub struct Replaced<V> {
    pub key: QueryKey,
    pub previous: CacheEntry<V>,
    pub revision: u64,
}

/// Injectable query cache.
///
/// Implementations never hold a lock across a call back into the caller, so
/// the trait object can be shared between actix workers.
pub trait QueryCache<V: Clone>: Send + Sync {
    /// Entry for `key`; `stale` is set when it was invalidated or outlived the stale time.
    fn get(&self, key: &QueryKey) -> Option<CacheEntry<V>>;

    fn set(&self, key: QueryKey, value: V);

    /// Starts a fetch of `key`. Any fetch of the same key started earlier is superseded.
    fn begin_fetch(&self, key: &QueryKey) -> u64;

    /// Stores the result of the fetch holding `ticket` unless a later fetch of
    /// the same key has started since. Returns whether it was stored.
    fn complete_fetch(&self, key: QueryKey, ticket: u64, value: V) -> bool;

    /// Marks every entry of `scope` stale. Returns the number of entries touched.
    fn invalidate(&self, scope: &str) -> usize;

    /// Copies of every entry of `scope`.
    fn snapshot(&self, scope: &str) -> Vec<(QueryKey, CacheEntry<V>)>;

    /// Puts previously snapshotted entries back verbatim.
    fn restore(&self, entries: Vec<(QueryKey, CacheEntry<V>)>);

    /// Rewrites the value of every entry of `scope` in place, returning what was replaced.
    fn update(&self, scope: &str, apply: &mut dyn FnMut(&mut V)) -> Vec<Replaced<V>>;

    /// Puts `replaced.previous` back unless the entry was written again after the update.
    fn revert(&self, replaced: Replaced<V>) -> bool;

    /// Value for `key` when it is still fresh.
    fn get_fresh(&self, key: &QueryKey) -> Option<V> {
        self.get(key)
            .filter(CacheEntry::is_fresh)
            .map(|entry| entry.value)
    }
}

/// In-process [`QueryCache`] with a stale time and a capacity bound.
pub struct MemoryQueryCache<V> {
    store: RwLock<Store<V>>,
    stale_time: Duration,
    max_entries: usize,
}

struct Slot<V> {
    entry: CacheEntry<V>,
    /// Store-wide write counter at the last write; doubles as eviction age.
    written: u64,
}

struct Store<V> {
    slots: HashMap<QueryKey, Slot<V>>,
    writes: u64,
    /// Latest fetch ticket handed out per key.
    fetches: HashMap<QueryKey, u64>,
    tickets: u64,
}

impl<V> Store<V> {
    fn insert(&mut self, key: QueryKey, entry: CacheEntry<V>, max_entries: usize) {
        self.writes += 1;
        self.slots.insert(
            key,
            Slot {
                entry,
                written: self.writes,
            },
        );
        while self.slots.len() > max_entries {
            let oldest = self
                .slots
                .iter()
                .min_by_key(|(_, slot)| slot.written)
                .map(|(key, _)| key.clone());
            let Some(key) = oldest else {
                break;
            };
            log::debug!("Evicting cached query {}:{}", key.scope(), key.options());
            self.slots.remove(&key);
            self.fetches.remove(&key);
        }
    }

    fn in_scope<'a>(&'a mut self, scope: &'a str) -> impl Iterator<Item = &'a mut Slot<V>> + 'a {
        self.slots
            .iter_mut()
            .filter(move |(key, _)| key.in_scope(scope))
            .map(|(_, slot)| slot)
    }
}

impl<V> MemoryQueryCache<V> {
    pub fn new(stale_time: Duration, max_entries: usize) -> Self {
        Self {
            store: RwLock::new(Store {
                slots: HashMap::new(),
                writes: 0,
                fetches: HashMap::new(),
                tickets: 0,
            }),
            stale_time,
            max_entries: max_entries.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .slots
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        store.slots.clear();
        store.fetches.clear();
    }
}

impl<V: Clone + Send + Sync> QueryCache<V> for MemoryQueryCache<V> {
    fn get(&self, key: &QueryKey) -> Option<CacheEntry<V>> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store.slots.get(key).map(|slot| {
            let mut entry = slot.entry.clone();
            entry.stale = entry.stale || entry.fetched_at.elapsed() >= self.stale_time;
            entry
        })
    }

    fn set(&self, key: QueryKey, value: V) {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        store.insert(key, CacheEntry::new(value), self.max_entries);
    }

    fn begin_fetch(&self, key: &QueryKey) -> u64 {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        store.tickets += 1;
        let ticket = store.tickets;
        store.fetches.insert(key.clone(), ticket);
        ticket
    }

    fn complete_fetch(&self, key: QueryKey, ticket: u64, value: V) -> bool {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        if store.fetches.get(&key).is_some_and(|latest| *latest > ticket) {
            log::debug!(
                "Dropping superseded fetch of {}:{}",
                key.scope(),
                key.options()
            );
            return false;
        }
        store.insert(key, CacheEntry::new(value), self.max_entries);
        true
    }

    fn invalidate(&self, scope: &str) -> usize {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        let mut touched = 0;
        for slot in store.in_scope(scope) {
            slot.entry.stale = true;
            touched += 1;
        }
        log::debug!("Invalidated {touched} cached queries in scope {scope}");
        touched
    }

    fn snapshot(&self, scope: &str) -> Vec<(QueryKey, CacheEntry<V>)> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store
            .slots
            .iter()
            .filter(|(key, _)| key.in_scope(scope))
            .map(|(key, slot)| (key.clone(), slot.entry.clone()))
            .collect()
    }

    fn restore(&self, entries: Vec<(QueryKey, CacheEntry<V>)>) {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        for (key, entry) in entries {
            store.insert(key, entry, self.max_entries);
        }
    }

    fn update(&self, scope: &str, apply: &mut dyn FnMut(&mut V)) -> Vec<Replaced<V>> {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        let Store { slots, writes, .. } = &mut *store;
        let mut replaced = Vec::new();
        for (key, slot) in slots.iter_mut().filter(|(key, _)| key.in_scope(scope)) {
            let previous = slot.entry.clone();
            apply(&mut slot.entry.value);
            *writes += 1;
            slot.written = *writes;
            replaced.push(Replaced {
                key: key.clone(),
                previous,
                revision: *writes,
            });
        }
        replaced
    }

    fn revert(&self, replaced: Replaced<V>) -> bool {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        let unchanged = store
            .slots
            .get(&replaced.key)
            .is_some_and(|slot| slot.written == replaced.revision);
        if unchanged {
            store.insert(replaced.key, replaced.previous, self.max_entries);
        }
        unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> MemoryQueryCache<Vec<u32>> {
        MemoryQueryCache::new(Duration::from_secs(60), 3)
    }

    #[test]
    fn fresh_entries_are_served() {
        let cache = cache();
        let key = QueryKey::raw("products", "a");
        cache.set(key.clone(), vec![1, 2]);

        assert_eq!(cache.get_fresh(&key), Some(vec![1, 2]));
        assert_eq!(cache.get_fresh(&QueryKey::raw("variants", "a")), None);
    }

    #[test]
    fn zero_stale_time_keeps_data_but_marks_it_stale() {
        let cache = MemoryQueryCache::new(Duration::ZERO, 10);
        let key = QueryKey::raw("products", "a");
        cache.set(key.clone(), vec![1]);

        let entry = cache.get(&key).expect("entry present");
        assert!(entry.stale);
        assert_eq!(entry.value, vec![1]);
        assert_eq!(cache.get_fresh(&key), None);
    }

    #[test]
    fn invalidate_only_touches_scope() {
        let cache = cache();
        cache.set(QueryKey::raw("products", "a"), vec![1]);
        cache.set(QueryKey::raw("products", "b"), vec![2]);
        cache.set(QueryKey::raw("variants", "a"), vec![3]);

        assert_eq!(cache.invalidate("products"), 2);
        assert_eq!(cache.get_fresh(&QueryKey::raw("products", "a")), None);
        assert_eq!(cache.get_fresh(&QueryKey::raw("variants", "a")), Some(vec![3]));
    }

    #[test]
    fn capacity_evicts_oldest_entry() {
        let cache = cache();
        for name in ["a", "b", "c", "d"] {
            cache.set(QueryKey::raw("products", name), vec![0]);
        }

        assert_eq!(cache.len(), 3);
        assert!(cache.get(&QueryKey::raw("products", "a")).is_none());
        assert!(cache.get(&QueryKey::raw("products", "d")).is_some());
    }

    #[test]
    fn snapshot_and_restore_undo_update() {
        let cache = cache();
        let key = QueryKey::raw("products", "a");
        cache.set(key.clone(), vec![1, 2]);

        let snapshot = cache.snapshot("products");
        assert_eq!(cache.update("products", &mut |value| value.push(3)).len(), 1);
        assert_eq!(cache.get_fresh(&key), Some(vec![1, 2, 3]));

        cache.restore(snapshot);
        assert_eq!(cache.get_fresh(&key), Some(vec![1, 2]));
    }

    #[test]
    fn only_the_latest_fetch_is_stored() {
        let cache = cache();
        let key = QueryKey::raw("products", "a");
        let slow = cache.begin_fetch(&key);
        let fast = cache.begin_fetch(&key);

        assert!(cache.complete_fetch(key.clone(), fast, vec![2]));
        assert!(!cache.complete_fetch(key.clone(), slow, vec![1]));
        assert_eq!(cache.get_fresh(&key), Some(vec![2]));

        let other = QueryKey::raw("products", "b");
        let ticket = cache.begin_fetch(&other);
        assert!(cache.complete_fetch(other.clone(), ticket, vec![3]));
    }

    #[test]
    fn revert_skips_entries_written_since_the_update() {
        let cache = cache();
        let kept = QueryKey::raw("products", "a");
        let refetched = QueryKey::raw("products", "b");
        cache.set(kept.clone(), vec![1]);
        cache.set(refetched.clone(), vec![1]);

        let replaced = cache.update("products", &mut |value| value.push(2));
        cache.set(refetched.clone(), vec![9]);

        for entry in replaced {
            let expected = entry.key == kept;
            assert_eq!(cache.revert(entry), expected);
        }

        assert_eq!(cache.get_fresh(&kept), Some(vec![1]));
        assert_eq!(cache.get_fresh(&refetched), Some(vec![9]));
    }
}
