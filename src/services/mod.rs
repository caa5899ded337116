//! Page loaders and mutations composed from the repository ports and the query caches.

use std::future::Future;
use std::time::Duration;

use crate::domain::facet::FacetValue;
use crate::domain::product::{DeletionResponse, Product};
use crate::domain::variant::Variant;
use crate::list::page::PageResult;
use crate::query::cache::{MemoryQueryCache, QueryCache, QueryKey};
use crate::query::observer::ListQuery;
use crate::repository::errors::RepositoryResult;

pub mod errors;
pub mod facets;
pub mod products;
pub mod variants;

#[cfg(test)]
pub(crate) mod fixtures;

pub use errors::{ServiceError, ServiceResult};

/// Query caches shared by every worker.
pub struct QueryCaches {
    pub products: MemoryQueryCache<PageResult<Product>>,
    pub variants: MemoryQueryCache<Vec<Variant>>,
    pub facets: MemoryQueryCache<Vec<FacetValue>>,
}

impl QueryCaches {
    pub fn new(stale_time: Duration, max_entries: usize) -> Self {
        Self {
            products: MemoryQueryCache::new(stale_time, max_entries),
            variants: MemoryQueryCache::new(stale_time, max_entries),
            facets: MemoryQueryCache::new(stale_time, max_entries),
        }
    }
}

/// Tally of a batch mutation: how many rows succeeded and why the others did not.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failures: Vec<String>,
}

impl BatchSummary {
    /// Splits host deletion answers into deleted rows and refusal messages.
    pub fn from_deletions(responses: Vec<DeletionResponse>, entity: &str) -> Self {
        let mut summary = Self::default();
        for response in responses {
            if response.is_deleted() {
                summary.succeeded += 1;
            } else {
                let message = response
                    .message
                    .unwrap_or_else(|| format!("{entity} could not be deleted"));
                log::error!("Host refused a {} deletion: {message}", entity.to_lowercase());
                summary.failures.push(message);
            }
        }
        summary
    }
}

/// Outcome of a bulk action, reported back to the user.
#[derive(Debug, PartialEq, Eq)]
pub enum BulkOutcome {
    Updated(usize),
    Deleted(BatchSummary),
    Duplicated(BatchSummary),
}

/// Data served to a view together with the error of a failed refresh, if any.
#[derive(Debug)]
pub struct Loaded<V> {
    pub value: V,
    /// Set when the refetch failed and `value` is the previous, stale data.
    pub error: Option<String>,
}

/// Serves `key` from `cache` while fresh, otherwise fetches it.
///
/// A failed fetch falls back to the stale entry and reports the error
/// alongside it; with nothing cached the error is returned. When requests for
/// the same key overlap, only the fetch started last is written to the cache;
/// an earlier one still answers its own request.
pub(crate) async fn fetch_cached<V, F, Fut>(
    cache: &dyn QueryCache<V>,
    key: QueryKey,
    fetch: F,
) -> ServiceResult<Loaded<V>>
where
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = RepositoryResult<V>>,
{
    let mut query = match cache.get(&key) {
        Some(entry) if entry.is_fresh() => {
            return Ok(Loaded {
                value: entry.value,
                error: None,
            });
        }
        Some(entry) => ListQuery::with_placeholder(key.clone(), entry.value),
        None => ListQuery::new(),
    };

    let ticket = query.begin(key.clone());
    let fetch_ticket = cache.begin_fetch(&key);
    let result = fetch().await;
    match &result {
        Ok(value) => {
            cache.complete_fetch(key, fetch_ticket, value.clone());
        }
        Err(err) => log::error!("Failed to fetch {}: {err}", key.scope()),
    }
    query.resolve(ticket, result);

    let error = query.error().map(str::to_string);
    match query.into_data() {
        Some(value) => Ok(Loaded { value, error }),
        None => Err(ServiceError::Remote(error.unwrap_or_default())),
    }
}
