//! Explicit optimistic-update transaction over a [`QueryCache`] scope.

use crate::query::cache::{QueryCache, Replaced};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionState {
    Pending,
    Committed,
    RolledBack,
}

/// Local change applied to cached data ahead of the remote mutation.
///
/// `begin` applies the change to every entry of the scope and remembers what it
/// replaced. The caller then either commits once the mutation succeeds or rolls
/// back. Rollback only restores entries nobody has written since `begin`; an
/// entry rewritten by a concurrent fetch or transaction is left to the refetch.
/// Both outcomes invalidate the scope so the next read refetches. Dropping a
/// pending transaction rolls it back.
pub struct OptimisticUpdate<'a, V: Clone> {
    cache: &'a dyn QueryCache<V>,
    scope: String,
    replaced: Vec<Replaced<V>>,
    state: TransactionState,
}

impl<'a, V: Clone> OptimisticUpdate<'a, V> {
    pub fn begin(
        cache: &'a dyn QueryCache<V>,
        scope: impl Into<String>,
        mut apply: impl FnMut(&mut V),
    ) -> Self {
        let scope = scope.into();
        let replaced = cache.update(&scope, &mut apply);
        log::debug!(
            "Optimistic update applied to {} cached queries in {scope}",
            replaced.len()
        );
        Self {
            cache,
            scope,
            replaced,
            state: TransactionState::Pending,
        }
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn commit(mut self) -> TransactionState {
        self.replaced.clear();
        self.cache.invalidate(&self.scope);
        self.state = TransactionState::Committed;
        self.state
    }

    pub fn rollback(mut self) -> TransactionState {
        self.undo();
        self.state
    }

    fn undo(&mut self) {
        let replaced = std::mem::take(&mut self.replaced);
        let total = replaced.len();
        let restored = replaced
            .into_iter()
            .map(|entry| self.cache.revert(entry))
            .filter(|restored| *restored)
            .count();
        log::debug!(
            "Rolled back optimistic update in {}: {restored} restored, {} rewritten since",
            self.scope,
            total - restored
        );
        self.cache.invalidate(&self.scope);
        self.state = TransactionState::RolledBack;
    }
}

impl<V: Clone> Drop for OptimisticUpdate<'_, V> {
    fn drop(&mut self) {
        if self.state == TransactionState::Pending {
            self.undo();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::query::cache::{MemoryQueryCache, QueryKey};

    fn seeded() -> (MemoryQueryCache<Vec<bool>>, QueryKey) {
        let cache = MemoryQueryCache::new(Duration::from_secs(60), 10);
        let key = QueryKey::raw("products", "page=1");
        cache.set(key.clone(), vec![true, false]);
        (cache, key)
    }

    fn flip_first(value: &mut Vec<bool>) {
        if let Some(first) = value.first_mut() {
            *first = !*first;
        }
    }

    #[test]
    fn begin_applies_change_immediately() {
        let (cache, key) = seeded();
        let tx = OptimisticUpdate::begin(&cache, "products", flip_first);

        assert_eq!(tx.state(), TransactionState::Pending);
        assert_eq!(cache.get_fresh(&key), Some(vec![false, false]));
        assert_eq!(tx.commit(), TransactionState::Committed);
    }

    #[test]
    fn commit_keeps_change_and_invalidates() {
        let (cache, key) = seeded();
        OptimisticUpdate::begin(&cache, "products", flip_first).commit();

        let entry = cache.get(&key).expect("entry present");
        assert!(entry.stale);
        assert_eq!(entry.value, vec![false, false]);
    }

    #[test]
    fn rollback_restores_snapshot_and_invalidates() {
        let (cache, key) = seeded();
        let state = OptimisticUpdate::begin(&cache, "products", flip_first).rollback();

        assert_eq!(state, TransactionState::RolledBack);
        let entry = cache.get(&key).expect("entry present");
        assert!(entry.stale);
        assert_eq!(entry.value, vec![true, false]);
    }

    #[test]
    fn dropping_pending_transaction_rolls_back() {
        let (cache, key) = seeded();
        {
            let _tx = OptimisticUpdate::begin(&cache, "products", flip_first);
            assert_eq!(cache.get_fresh(&key), Some(vec![false, false]));
        }
        assert_eq!(cache.get(&key).map(|entry| entry.value), Some(vec![true, false]));
    }

    #[test]
    fn rollback_keeps_entries_written_after_begin() {
        let (cache, key) = seeded();
        let other = QueryKey::raw("products", "page=2");
        cache.set(other.clone(), vec![true]);

        let tx = OptimisticUpdate::begin(&cache, "products", flip_first);
        cache.set(key.clone(), vec![false, true]);
        tx.rollback();

        assert_eq!(cache.get(&key).map(|entry| entry.value), Some(vec![false, true]));
        assert_eq!(cache.get(&other).map(|entry| entry.value), Some(vec![true]));
    }

    #[test]
    fn failed_transaction_leaves_later_commit_alone() {
        let (cache, key) = seeded();
        let first = OptimisticUpdate::begin(&cache, "products", flip_first);
        let second = OptimisticUpdate::begin(&cache, "products", |value: &mut Vec<bool>| {
            value[1] = true;
        });
        second.commit();
        first.rollback();

        assert_eq!(cache.get(&key).map(|entry| entry.value), Some(vec![false, true]));
    }

    #[test]
    fn other_scopes_are_untouched() {
        let (cache, _) = seeded();
        let variants = QueryKey::raw("variants", "all");
        cache.set(variants.clone(), vec![true]);

        OptimisticUpdate::begin(&cache, "products", flip_first).rollback();

        assert_eq!(cache.get_fresh(&variants), Some(vec![true]));
    }
}
