use crate::domain::product::{DuplicationResult, Product, UpdateProduct};
use crate::domain::types::ProductId;
use crate::forms::product::{BulkAction, BulkActionForm, ProductAssetsForm, ProductForm};
use crate::list::filters::{FilterKind, ListSchema, Sorting};
use crate::list::options::QueryOptions;
use crate::list::page::PageResult;
use crate::query::cache::{QueryCache, QueryKey};
use crate::query::optimistic::OptimisticUpdate;
use crate::repository::{ProductReader, ProductWriter};
use crate::services::{
    BatchSummary, BulkOutcome, Loaded, ServiceError, ServiceResult, fetch_cached,
};

/// Cache scope of every product list query.
pub const PRODUCTS_SCOPE: &str = "products";
pub const PRODUCTS_PATH: &str = "/products";

type ProductCache = dyn QueryCache<PageResult<Product>>;

/// URL vocabulary and defaults of the product table.
pub fn product_list_schema(default_page_size: usize, max_page_size: usize) -> ListSchema {
    ListSchema::new()
        .page_size(default_page_size, max_page_size)
        .default_sorting(Sorting::desc("createdAt"))
        .sortable(&["id", "updatedAt", "name", "slug"])
        .search_fields(&["name", "slug"])
        .filter("enabled", "enabled", FilterKind::Flag)
        .filter("categories", "facetValueId", FilterKind::OneOf)
}

/// Loads one page of products for `options`, serving fresh cache entries directly.
pub async fn load_products<R>(
    repo: &R,
    cache: &ProductCache,
    options: &QueryOptions,
) -> ServiceResult<Loaded<PageResult<Product>>>
where
    R: ProductReader + ?Sized,
{
    let key = QueryKey::new(PRODUCTS_SCOPE, options);
    fetch_cached(cache, key, || repo.list_products(options)).await
}

/// Fetches a single product, failing with [`ServiceError::NotFound`] when it does not exist.
pub async fn get_product<R>(repo: &R, id: &ProductId) -> ServiceResult<Product>
where
    R: ProductReader + ?Sized,
{
    match repo.get_product(id).await {
        Ok(Some(product)) => Ok(product),
        Ok(None) => Err(ServiceError::NotFound),
        Err(err) => {
            log::error!("Failed to fetch product {id}: {err}");
            Err(ServiceError::from(err))
        }
    }
}

/// Validates the form and creates the product.
pub async fn create_product<R>(
    repo: &R,
    cache: &ProductCache,
    form: &ProductForm,
) -> ServiceResult<ProductId>
where
    R: ProductWriter + ?Sized,
{
    let new_product = form.to_new_product()?;
    let id = repo.create_product(&new_product).await.map_err(|err| {
        log::error!("Failed to create product {}: {err}", new_product.name);
        ServiceError::from(err)
    })?;
    cache.invalidate(PRODUCTS_SCOPE);
    Ok(id)
}

/// Validates the form and applies it to an existing product.
pub async fn update_product<R>(
    repo: &R,
    cache: &ProductCache,
    id: &ProductId,
    form: &ProductForm,
) -> ServiceResult<()>
where
    R: ProductWriter + ?Sized,
{
    let updates = form.to_update()?;
    repo.update_product(id, &updates).await.map_err(|err| {
        log::error!("Failed to update product {id}: {err}");
        ServiceError::from(err)
    })?;
    cache.invalidate(PRODUCTS_SCOPE);
    Ok(())
}

/// Flips the enabled flag in every cached page first, then on the host.
///
/// The cached pages are restored when the host refuses the change.
pub async fn set_product_enabled<R>(
    repo: &R,
    cache: &ProductCache,
    id: &ProductId,
    enabled: bool,
) -> ServiceResult<()>
where
    R: ProductWriter + ?Sized,
{
    let transaction = OptimisticUpdate::begin(cache, PRODUCTS_SCOPE, |page| {
        set_enabled(page, std::slice::from_ref(id), enabled)
    });

    match repo.update_product(id, &UpdateProduct::enabled(enabled)).await {
        Ok(()) => {
            transaction.commit();
            Ok(())
        }
        Err(err) => {
            log::error!("Failed to set enabled={enabled} on product {id}: {err}");
            transaction.rollback();
            Err(ServiceError::from(err))
        }
    }
}

/// Replaces the assets of a product; the first one becomes the featured asset.
pub async fn set_product_assets<R>(
    repo: &R,
    cache: &ProductCache,
    id: &ProductId,
    form: &ProductAssetsForm,
) -> ServiceResult<()>
where
    R: ProductWriter + ?Sized,
{
    let updates = form.to_update()?;
    repo.update_product(id, &updates).await.map_err(|err| {
        log::error!("Failed to update assets of product {id}: {err}");
        ServiceError::from(err)
    })?;
    cache.invalidate(PRODUCTS_SCOPE);
    Ok(())
}

/// Deletes a single product. A `NOT_DELETED` answer becomes [`ServiceError::Rejected`].
pub async fn delete_product<R>(repo: &R, cache: &ProductCache, id: &ProductId) -> ServiceResult<()>
where
    R: ProductWriter + ?Sized,
{
    let summary = delete_products(repo, cache, std::slice::from_ref(id)).await?;
    match summary.failures.into_iter().next() {
        Some(message) => Err(ServiceError::Rejected(message)),
        None if summary.succeeded == 0 => Err(ServiceError::NotFound),
        None => Ok(()),
    }
}

/// Copies a product through the host's duplicator, returning the id of the copy.
pub async fn duplicate_product<R>(
    repo: &R,
    cache: &ProductCache,
    id: &ProductId,
) -> ServiceResult<ProductId>
where
    R: ProductWriter + ?Sized,
{
    let result = repo.duplicate_product(id).await.map_err(|err| {
        log::error!("Failed to duplicate product {id}: {err}");
        ServiceError::from(err)
    })?;
    match result {
        DuplicationResult::Duplicated { new_id } => {
            cache.invalidate(PRODUCTS_SCOPE);
            Ok(new_id)
        }
        DuplicationResult::Failed { message } => {
            log::error!("Host refused to duplicate product {id}: {message}");
            Err(ServiceError::Rejected(message))
        }
    }
}

async fn delete_products<R>(
    repo: &R,
    cache: &ProductCache,
    ids: &[ProductId],
) -> ServiceResult<BatchSummary>
where
    R: ProductWriter + ?Sized,
{
    let responses = repo.delete_products(ids).await.map_err(|err| {
        log::error!("Failed to delete {} products: {err}", ids.len());
        ServiceError::from(err)
    })?;

    let summary = BatchSummary::from_deletions(responses, "Product");
    if summary.succeeded > 0 {
        cache.invalidate(PRODUCTS_SCOPE);
    }
    Ok(summary)
}

/// Duplicates the products one by one; a failed copy does not stop the rest.
async fn duplicate_products<R>(
    repo: &R,
    cache: &ProductCache,
    ids: &[ProductId],
) -> BatchSummary
where
    R: ProductWriter + ?Sized,
{
    let mut summary = BatchSummary::default();
    for id in ids {
        match repo.duplicate_product(id).await {
            Ok(DuplicationResult::Duplicated { .. }) => summary.succeeded += 1,
            Ok(DuplicationResult::Failed { message }) => {
                log::error!("Host refused to duplicate product {id}: {message}");
                summary.failures.push(format!("{id}: {message}"));
            }
            Err(err) => {
                log::error!("Failed to duplicate product {id}: {err}");
                summary.failures.push(format!("{id}: {err}"));
            }
        }
    }
    if summary.succeeded > 0 {
        cache.invalidate(PRODUCTS_SCOPE);
    }
    summary
}

/// Applies the selected bulk action to the selected rows.
///
/// Enable and disable are optimistic like the single-row toggle.
pub async fn apply_bulk_action<R>(
    repo: &R,
    cache: &ProductCache,
    form: &BulkActionForm,
) -> ServiceResult<BulkOutcome>
where
    R: ProductWriter + ?Sized,
{
    let ids = form.product_ids()?;
    let enabled = match form.action {
        BulkAction::Enable => true,
        BulkAction::Disable => false,
        BulkAction::Delete => {
            return delete_products(repo, cache, &ids).await.map(BulkOutcome::Deleted);
        }
        BulkAction::Duplicate => {
            return Ok(BulkOutcome::Duplicated(
                duplicate_products(repo, cache, &ids).await,
            ));
        }
        BulkAction::Categories => {
            let updates = UpdateProduct::facet_values(form.facet_value_ids()?);
            let updated = repo.update_products(&ids, &updates).await.map_err(|err| {
                log::error!("Failed to assign categories to {} products: {err}", ids.len());
                ServiceError::from(err)
            })?;
            cache.invalidate(PRODUCTS_SCOPE);
            return Ok(BulkOutcome::Updated(updated));
        }
    };

    let transaction =
        OptimisticUpdate::begin(cache, PRODUCTS_SCOPE, |page| set_enabled(page, &ids, enabled));

    match repo.update_products(&ids, &UpdateProduct::enabled(enabled)).await {
        Ok(updated) => {
            transaction.commit();
            Ok(BulkOutcome::Updated(updated))
        }
        Err(err) => {
            log::error!("Failed to set enabled={enabled} on {} products: {err}", ids.len());
            transaction.rollback();
            Err(ServiceError::from(err))
        }
    }
}

fn set_enabled(page: &mut PageResult<Product>, ids: &[ProductId], enabled: bool) {
    for product in page.items.iter_mut().filter(|p| ids.contains(&p.id)) {
        product.enabled = enabled;
    }
}
