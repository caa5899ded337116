//! Query cache, list observer and optimistic updates.

pub mod cache;
pub mod observer;
pub mod optimistic;

pub use cache::{CacheEntry, MemoryQueryCache, QueryCache, QueryKey};
pub use observer::{FetchTicket, ListQuery, QueryStatus};
pub use optimistic::{OptimisticUpdate, TransactionState};
