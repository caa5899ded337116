//! Ports to the host platform's admin API.
//!
//! Traits are split by reader/writer per entity so services can ask for the
//! narrowest capability they need. [`graphql::GraphqlRepository`] implements all
//! of them; tests substitute hand-written fakes or the mockall mock.

use async_trait::async_trait;

use crate::domain::facet::FacetValue;
use crate::domain::product::{
    DeletionResponse, DuplicationResult, NewProduct, Product, UpdateProduct,
};
use crate::domain::types::{ProductId, VariantId};
use crate::domain::variant::{NewVariant, UpdateVariant, Variant};
use crate::list::options::QueryOptions;
use crate::list::page::PageResult;
use crate::repository::errors::RepositoryResult;

pub mod errors;
#[cfg(feature = "server")]
pub mod graphql;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

#[cfg(feature = "server")]
pub use graphql::GraphqlRepository;

/// Remote list endpoint and detail lookup for products.
#[async_trait]
pub trait ProductReader: Send + Sync {
    async fn list_products(&self, options: &QueryOptions) -> RepositoryResult<PageResult<Product>>;
    async fn get_product(&self, id: &ProductId) -> RepositoryResult<Option<Product>>;
}

/// Product mutations.
#[async_trait]
pub trait ProductWriter: Send + Sync {
    async fn create_product(&self, product: &NewProduct) -> RepositoryResult<ProductId>;
    async fn update_product(&self, id: &ProductId, updates: &UpdateProduct) -> RepositoryResult<()>;
    /// Applies the same update to every product in `ids`. Returns how many were updated.
    async fn update_products(
        &self,
        ids: &[ProductId],
        updates: &UpdateProduct,
    ) -> RepositoryResult<usize>;
    async fn delete_products(&self, ids: &[ProductId]) -> RepositoryResult<Vec<DeletionResponse>>;
    async fn duplicate_product(&self, id: &ProductId) -> RepositoryResult<DuplicationResult>;
}

#[async_trait]
pub trait VariantReader: Send + Sync {
    /// Every variant of the product, in the host's order.
    async fn list_variants(&self, product_id: &ProductId) -> RepositoryResult<Vec<Variant>>;
}

/// Variant mutations.
#[async_trait]
pub trait VariantWriter: Send + Sync {
    /// Creates every variant in one request, returning the new ids in input order.
    async fn create_variants(&self, variants: &[NewVariant]) -> RepositoryResult<Vec<VariantId>>;
    async fn update_variant(&self, id: &VariantId, updates: &UpdateVariant) -> RepositoryResult<()>;
    /// Applies the same update to every variant in `ids`. Returns how many were updated.
    async fn update_variants(
        &self,
        ids: &[VariantId],
        updates: &UpdateVariant,
    ) -> RepositoryResult<usize>;
    async fn delete_variants(&self, ids: &[VariantId]) -> RepositoryResult<Vec<DeletionResponse>>;
}

#[async_trait]
pub trait FacetReader: Send + Sync {
    /// Values of the facet identified by `code`; empty when no such facet exists.
    async fn list_facet_values(&self, code: &str) -> RepositoryResult<Vec<FacetValue>>;
}
