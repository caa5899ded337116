use crate::domain::facet::{CATEGORY_FACET_CODE, FacetValue};
use crate::query::cache::{QueryCache, QueryKey};
use crate::repository::FacetReader;
use crate::services::{Loaded, ServiceResult, fetch_cached};

pub const FACETS_SCOPE: &str = "facets";

/// Category choices for the product filter and the product form.
pub async fn load_category_options<R>(
    repo: &R,
    cache: &dyn QueryCache<Vec<FacetValue>>,
) -> ServiceResult<Loaded<Vec<FacetValue>>>
where
    R: FacetReader + ?Sized,
{
    let key = QueryKey::raw(FACETS_SCOPE, CATEGORY_FACET_CODE);
    fetch_cached(cache, key, || repo.list_facet_values(CATEGORY_FACET_CODE)).await
}

/// Like [`load_category_options`] but degrades to no choices when the lookup fails.
pub async fn category_options_or_empty<R>(
    repo: &R,
    cache: &dyn QueryCache<Vec<FacetValue>>,
) -> Vec<FacetValue>
where
    R: FacetReader + ?Sized,
{
    match load_category_options(repo, cache).await {
        Ok(loaded) => loaded.value,
        Err(err) => {
            log::error!("Category options unavailable: {err}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::types::FacetValueId;
    use crate::query::cache::MemoryQueryCache;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

    fn shoes() -> FacetValue {
        FacetValue {
            id: FacetValueId::new("4").unwrap(),
            name: "Shoes".into(),
            code: "shoes".into(),
        }
    }

    #[actix_web::test]
    async fn looks_up_category_facet_once() {
        let cache = MemoryQueryCache::new(Duration::from_secs(60), 4);
        let mut repo = MockRepository::new();
        repo.expect_list_facet_values()
            .times(1)
            .returning(|code| {
                assert_eq!(code, CATEGORY_FACET_CODE);
                Ok(vec![shoes()])
            });

        load_category_options(&repo, &cache).await.unwrap();
        let loaded = load_category_options(&repo, &cache).await.unwrap();

        assert_eq!(loaded.value, vec![shoes()]);
    }

    #[actix_web::test]
    async fn unavailable_lookup_yields_no_choices() {
        let cache = MemoryQueryCache::new(Duration::from_secs(60), 4);
        let mut repo = MockRepository::new();
        repo.expect_list_facet_values()
            .returning(|_| Err(RepositoryError::Transport("refused".into())));

        assert!(category_options_or_empty(&repo, &cache).await.is_empty());
    }
}
