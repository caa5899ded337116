use crate::domain::types::{ProductId, VariantId};
use crate::domain::variant::{UpdateVariant, Variant};
use crate::forms::variant::{
    CreateVariantsForm, VariantBulkAction, VariantBulkActionForm, VariantForm,
};
use crate::list::filters::{FilterKind, ListSchema, Sorting};
use crate::list::memory::apply_in_memory;
use crate::list::options::QueryOptions;
use crate::list::page::PageResult;
use crate::query::cache::{QueryCache, QueryKey};
use crate::query::optimistic::OptimisticUpdate;
use crate::repository::{VariantReader, VariantWriter};
use crate::services::{
    BatchSummary, BulkOutcome, Loaded, ServiceError, ServiceResult, fetch_cached,
};

type VariantCache = dyn QueryCache<Vec<Variant>>;

/// Cache scope holding the variants of one product.
pub fn variants_scope(product_id: &ProductId) -> String {
    format!("variants:{product_id}")
}

pub fn variants_path(product_id: &ProductId) -> String {
    format!("/products/{product_id}/variants")
}

/// URL vocabulary and defaults of the variant table.
pub fn variant_list_schema(default_page_size: usize, max_page_size: usize) -> ListSchema {
    ListSchema::new()
        .page_size(default_page_size, max_page_size)
        .default_sorting(Sorting::asc("name"))
        .sortable(&["sku", "price", "priceWithTax", "stockLevels"])
        .search_fields(&["name", "sku"])
        .filter("enabled", "enabled", FilterKind::Flag)
}

/// Loads the variants of a product once and pages through them locally.
///
/// The host returns every variant of a product in one response, so `options`
/// are evaluated in memory over the cached list.
pub async fn load_variants<R>(
    repo: &R,
    cache: &VariantCache,
    product_id: &ProductId,
    options: &QueryOptions,
) -> ServiceResult<Loaded<PageResult<Variant>>>
where
    R: VariantReader + ?Sized,
{
    let key = QueryKey::raw(variants_scope(product_id), "all");
    let loaded = fetch_cached(cache, key, || repo.list_variants(product_id)).await?;
    Ok(Loaded {
        value: apply_in_memory(&loaded.value, options),
        error: loaded.error,
    })
}

/// Validates the form and updates the variant.
pub async fn update_variant<R>(
    repo: &R,
    cache: &VariantCache,
    product_id: &ProductId,
    id: &VariantId,
    form: &VariantForm,
) -> ServiceResult<()>
where
    R: VariantWriter + ?Sized,
{
    let updates = form.to_update()?;
    repo.update_variant(id, &updates).await.map_err(|err| {
        log::error!("Failed to update variant {id}: {err}");
        ServiceError::from(err)
    })?;
    cache.invalidate(&variants_scope(product_id));
    Ok(())
}

/// Optimistic enable/disable of one variant, restored if the host refuses it.
pub async fn set_variant_enabled<R>(
    repo: &R,
    cache: &VariantCache,
    product_id: &ProductId,
    id: &VariantId,
    enabled: bool,
) -> ServiceResult<()>
where
    R: VariantWriter + ?Sized,
{
    let transaction = OptimisticUpdate::begin(cache, variants_scope(product_id), |variants| {
        set_enabled(variants, std::slice::from_ref(id), enabled)
    });

    match repo.update_variant(id, &UpdateVariant::enabled(enabled)).await {
        Ok(()) => {
            transaction.commit();
            Ok(())
        }
        Err(err) => {
            log::error!("Failed to set enabled={enabled} on variant {id}: {err}");
            transaction.rollback();
            Err(ServiceError::from(err))
        }
    }
}

/// Creates the rows of the form under `product_id`. Returns how many were created.
pub async fn create_variants<R>(
    repo: &R,
    cache: &VariantCache,
    product_id: &ProductId,
    form: &CreateVariantsForm,
) -> ServiceResult<usize>
where
    R: VariantWriter + ?Sized,
{
    let variants = form.to_new_variants(product_id)?;
    let created = repo.create_variants(&variants).await.map_err(|err| {
        log::error!("Failed to create {} variants of product {product_id}: {err}", variants.len());
        ServiceError::from(err)
    })?;
    cache.invalidate(&variants_scope(product_id));
    Ok(created.len())
}

/// Deletes one variant. A `NOT_DELETED` answer becomes [`ServiceError::Rejected`].
pub async fn delete_variant<R>(
    repo: &R,
    cache: &VariantCache,
    product_id: &ProductId,
    id: &VariantId,
) -> ServiceResult<()>
where
    R: VariantWriter + ?Sized,
{
    let summary = delete_variants(repo, cache, product_id, std::slice::from_ref(id)).await?;
    match summary.failures.into_iter().next() {
        Some(message) => Err(ServiceError::Rejected(message)),
        None if summary.succeeded == 0 => Err(ServiceError::NotFound),
        None => Ok(()),
    }
}

async fn delete_variants<R>(
    repo: &R,
    cache: &VariantCache,
    product_id: &ProductId,
    ids: &[VariantId],
) -> ServiceResult<BatchSummary>
where
    R: VariantWriter + ?Sized,
{
    let responses = repo.delete_variants(ids).await.map_err(|err| {
        log::error!("Failed to delete {} variants of product {product_id}: {err}", ids.len());
        ServiceError::from(err)
    })?;

    let summary = BatchSummary::from_deletions(responses, "Variant");
    if summary.succeeded > 0 {
        cache.invalidate(&variants_scope(product_id));
    }
    Ok(summary)
}

/// Applies the selected bulk action to the selected variants of one product.
pub async fn apply_variant_bulk_action<R>(
    repo: &R,
    cache: &VariantCache,
    product_id: &ProductId,
    form: &VariantBulkActionForm,
) -> ServiceResult<BulkOutcome>
where
    R: VariantWriter + ?Sized,
{
    let ids = form.variant_ids()?;
    let enabled = match form.action {
        VariantBulkAction::Enable => true,
        VariantBulkAction::Disable => false,
        VariantBulkAction::Delete => {
            return delete_variants(repo, cache, product_id, &ids)
                .await
                .map(BulkOutcome::Deleted);
        }
        VariantBulkAction::Categories => {
            let updates = UpdateVariant::facet_values(form.facet_value_ids()?);
            let updated = repo.update_variants(&ids, &updates).await.map_err(|err| {
                log::error!("Failed to assign facet values to {} variants: {err}", ids.len());
                ServiceError::from(err)
            })?;
            cache.invalidate(&variants_scope(product_id));
            return Ok(BulkOutcome::Updated(updated));
        }
    };

    let transaction = OptimisticUpdate::begin(cache, variants_scope(product_id), |variants| {
        set_enabled(variants, &ids, enabled)
    });

    match repo.update_variants(&ids, &UpdateVariant::enabled(enabled)).await {
        Ok(updated) => {
            transaction.commit();
            Ok(BulkOutcome::Updated(updated))
        }
        Err(err) => {
            log::error!("Failed to set enabled={enabled} on {} variants: {err}", ids.len());
            transaction.rollback();
            Err(ServiceError::from(err))
        }
    }
}

fn set_enabled(variants: &mut [Variant], ids: &[VariantId], enabled: bool) {
    for variant in variants.iter_mut().filter(|v| ids.contains(&v.id)) {
        variant.enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::product::{DeletionResponse, DeletionResult};
    use crate::domain::types::FacetValueId;
    use crate::list::filters::{FilterValue, FiltersPatch, ListFilters};
    use crate::list::options::to_query_options;
    use crate::query::cache::MemoryQueryCache;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::fixtures::variant;

    fn product_id() -> ProductId {
        ProductId::new("1").unwrap()
    }

    fn catalog() -> Vec<Variant> {
        vec![
            variant("11", "Blue / 42", "SHOE-B-42", 1999),
            variant("12", "Red / 42", "SHOE-R-42", 2499),
            variant("13", "Blue / 44", "SHOE-B-44", 1899),
        ]
    }

    fn options(patch: FiltersPatch) -> QueryOptions {
        let schema = variant_list_schema(2, 50);
        let filters = patch.apply(&ListFilters::defaults(&schema)).normalized(&schema);
        to_query_options(&filters, &schema)
    }

    #[actix_web::test]
    async fn variants_are_fetched_once_and_paged_locally() {
        let cache = MemoryQueryCache::new(Duration::from_secs(60), 16);
        let mut repo = MockRepository::new();
        repo.expect_list_variants().times(1).returning(|_| Ok(catalog()));

        let first = load_variants(&repo, &cache, &product_id(), &options(FiltersPatch::new()))
            .await
            .unwrap();
        let second = load_variants(&repo, &cache, &product_id(), &options(FiltersPatch::new().page(2)))
            .await
            .unwrap();

        assert_eq!(first.value.total_items, 3);
        let names: Vec<_> = first.value.items.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Blue / 42", "Blue / 44"]);
        assert_eq!(second.value.items.len(), 1);
        assert_eq!(second.value.items[0].name, "Red / 42");
    }

    #[actix_web::test]
    async fn search_matches_sku() {
        let cache = MemoryQueryCache::new(Duration::from_secs(60), 16);
        let mut repo = MockRepository::new();
        repo.expect_list_variants().returning(|_| Ok(catalog()));

        let loaded = load_variants(
            &repo,
            &cache,
            &product_id(),
            &options(FiltersPatch::new().search("shoe-r")),
        )
        .await
        .unwrap();

        assert_eq!(loaded.value.total_items, 1);
        assert_eq!(loaded.value.items[0].sku, "SHOE-R-42");
    }

    #[actix_web::test]
    async fn disabled_filter_uses_flag() {
        let cache = MemoryQueryCache::new(Duration::from_secs(60), 16);
        let mut repo = MockRepository::new();
        repo.expect_list_variants().returning(|_| {
            let mut variants = catalog();
            variants[1].enabled = false;
            Ok(variants)
        });

        let loaded = load_variants(
            &repo,
            &cache,
            &product_id(),
            &options(FiltersPatch::new().filter("enabled", FilterValue::Flag(false))),
        )
        .await
        .unwrap();

        assert_eq!(loaded.value.total_items, 1);
        assert_eq!(loaded.value.items[0].id, VariantId::new("12").unwrap());
    }

    #[actix_web::test]
    async fn refused_toggle_restores_cached_list() {
        let cache = MemoryQueryCache::new(Duration::from_secs(60), 16);
        cache.set(QueryKey::raw(variants_scope(&product_id()), "all"), catalog());
        let mut repo = MockRepository::new();
        repo.expect_update_variant()
            .returning(|_, _| Err(RepositoryError::Remote("Forbidden".into())));

        let result = set_variant_enabled(
            &repo,
            &cache,
            &product_id(),
            &VariantId::new("11").unwrap(),
            false,
        )
        .await;

        assert!(result.is_err());
        let restored = cache.snapshot(&variants_scope(&product_id()));
        assert!(restored[0].1.value.iter().all(|v| v.enabled));
    }

    #[actix_web::test]
    async fn update_invalidates_only_that_product() {
        let cache = MemoryQueryCache::new(Duration::from_secs(60), 16);
        let other = ProductId::new("2").unwrap();
        cache.set(QueryKey::raw(variants_scope(&product_id()), "all"), catalog());
        cache.set(QueryKey::raw(variants_scope(&other), "all"), catalog());
        let mut repo = MockRepository::new();
        repo.expect_update_variant().returning(|_, _| Ok(()));
        let form = VariantForm {
            name: "Blue / 42".into(),
            sku: "SHOE-B-42".into(),
            price: "21.00".into(),
            stock_on_hand: 4,
            track_inventory: true,
            enabled: true,
        };

        update_variant(&repo, &cache, &product_id(), &VariantId::new("11").unwrap(), &form)
            .await
            .unwrap();

        let own = QueryKey::raw(variants_scope(&product_id()), "all");
        let others = QueryKey::raw(variants_scope(&other), "all");
        assert!(cache.get_fresh(&own).is_none());
        assert!(cache.get_fresh(&others).is_some());
    }

    fn seeded_cache() -> MemoryQueryCache<Vec<Variant>> {
        let cache = MemoryQueryCache::new(Duration::from_secs(60), 16);
        cache.set(QueryKey::raw(variants_scope(&product_id()), "all"), catalog());
        cache
    }

    fn bulk(action: VariantBulkAction, ids: &[&str]) -> VariantBulkActionForm {
        VariantBulkActionForm {
            action,
            ids: ids.iter().map(|id| id.to_string()).collect(),
            facet_value_ids: vec!["4".into()],
        }
    }

    #[actix_web::test]
    async fn created_variants_belong_to_the_product() {
        let cache = seeded_cache();
        let mut repo = MockRepository::new();
        repo.expect_create_variants().times(1).returning(|variants| {
            assert!(variants.iter().all(|v| v.product_id.as_str() == "1"));
            Ok(variants
                .iter()
                .enumerate()
                .map(|(i, _)| VariantId::new(format!("2{i}")).unwrap())
                .collect())
        });
        let form = CreateVariantsForm {
            sku: vec!["SHOE-G-40".into(), "SHOE-G-41".into()],
            price: vec!["15".into(), "15.5".into()],
            stock_on_hand: vec!["1".into(), "".into()],
        };

        let created = create_variants(&repo, &cache, &product_id(), &form).await.unwrap();

        assert_eq!(created, 2);
        let key = QueryKey::raw(variants_scope(&product_id()), "all");
        assert!(cache.get_fresh(&key).is_none());
    }

    #[actix_web::test]
    async fn invalid_rows_are_never_sent() {
        let cache = seeded_cache();
        let mut repo = MockRepository::new();
        repo.expect_create_variants().never();
        let form = CreateVariantsForm {
            sku: vec!["".into()],
            price: vec!["15".into()],
            stock_on_hand: vec!["".into()],
        };

        let result = create_variants(&repo, &cache, &product_id(), &form).await;

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[actix_web::test]
    async fn refused_variant_deletion_carries_host_message() {
        let cache = seeded_cache();
        let mut repo = MockRepository::new();
        repo.expect_delete_variants().returning(|_| {
            Ok(vec![DeletionResponse {
                result: DeletionResult::NotDeleted,
                message: Some("Variant is in an active order".into()),
            }])
        });

        let result =
            delete_variant(&repo, &cache, &product_id(), &VariantId::new("11").unwrap()).await;

        match result {
            Err(ServiceError::Rejected(message)) => {
                assert_eq!(message, "Variant is in an active order")
            }
            other => panic!("unexpected result: {other:?}"),
        }
        let key = QueryKey::raw(variants_scope(&product_id()), "all");
        assert!(cache.get_fresh(&key).is_some());
    }

    #[actix_web::test]
    async fn bulk_delete_summarises_each_answer() {
        let cache = seeded_cache();
        let mut repo = MockRepository::new();
        repo.expect_delete_variants().returning(|ids| {
            assert_eq!(ids.len(), 2);
            Ok(vec![
                DeletionResponse {
                    result: DeletionResult::Deleted,
                    message: None,
                },
                DeletionResponse {
                    result: DeletionResult::NotDeleted,
                    message: Some("Last variant of the product".into()),
                },
            ])
        });

        let outcome = apply_variant_bulk_action(
            &repo,
            &cache,
            &product_id(),
            &bulk(VariantBulkAction::Delete, &["11", "12"]),
        )
        .await
        .unwrap();

        assert_eq!(
            outcome,
            BulkOutcome::Deleted(BatchSummary {
                succeeded: 1,
                failures: vec!["Last variant of the product".into()],
            })
        );
        let key = QueryKey::raw(variants_scope(&product_id()), "all");
        assert!(cache.get_fresh(&key).is_none());
    }

    #[actix_web::test]
    async fn bulk_categories_replace_variant_facet_values() {
        let cache = seeded_cache();
        let mut repo = MockRepository::new();
        repo.expect_update_variants().times(1).returning(|ids, updates| {
            assert_eq!(
                updates.facet_value_ids,
                Some(vec![FacetValueId::new("4").unwrap()])
            );
            Ok(ids.len())
        });

        let outcome = apply_variant_bulk_action(
            &repo,
            &cache,
            &product_id(),
            &bulk(VariantBulkAction::Categories, &["11", "13"]),
        )
        .await
        .unwrap();

        assert_eq!(outcome, BulkOutcome::Updated(2));
    }

    #[actix_web::test]
    async fn bulk_disable_restores_every_row_on_failure() {
        let cache = seeded_cache();
        let mut repo = MockRepository::new();
        repo.expect_update_variants()
            .returning(|_, _| Err(RepositoryError::Transport("timeout".into())));

        let result = apply_variant_bulk_action(
            &repo,
            &cache,
            &product_id(),
            &bulk(VariantBulkAction::Disable, &["11", "12"]),
        )
        .await;

        assert!(result.is_err());
        let restored = cache.snapshot(&variants_scope(&product_id()));
        assert!(restored[0].1.value.iter().all(|v| v.enabled));
    }
}
