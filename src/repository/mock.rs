//! Mock repository implementations for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;

use crate::domain::facet::FacetValue;
use crate::domain::product::{
    DeletionResponse, DuplicationResult, NewProduct, Product, UpdateProduct,
};
use crate::domain::types::{ProductId, VariantId};
use crate::domain::variant::{NewVariant, UpdateVariant, Variant};
use crate::list::options::QueryOptions;
use crate::list::page::PageResult;
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    FacetReader, ProductReader, ProductWriter, VariantReader, VariantWriter,
};

mock! {
    pub Repository {}

    #[async_trait]
    impl ProductReader for Repository {
        async fn list_products(&self, options: &QueryOptions) -> RepositoryResult<PageResult<Product>>;
        async fn get_product(&self, id: &ProductId) -> RepositoryResult<Option<Product>>;
    }

    #[async_trait]
    impl ProductWriter for Repository {
        async fn create_product(&self, product: &NewProduct) -> RepositoryResult<ProductId>;
        async fn update_product(&self, id: &ProductId, updates: &UpdateProduct) -> RepositoryResult<()>;
        async fn update_products(
            &self,
            ids: &[ProductId],
            updates: &UpdateProduct,
        ) -> RepositoryResult<usize>;
        async fn delete_products(&self, ids: &[ProductId]) -> RepositoryResult<Vec<DeletionResponse>>;
        async fn duplicate_product(&self, id: &ProductId) -> RepositoryResult<DuplicationResult>;
    }

    #[async_trait]
    impl VariantReader for Repository {
        async fn list_variants(&self, product_id: &ProductId) -> RepositoryResult<Vec<Variant>>;
    }

    #[async_trait]
    impl VariantWriter for Repository {
        async fn create_variants(&self, variants: &[NewVariant]) -> RepositoryResult<Vec<VariantId>>;
        async fn update_variant(&self, id: &VariantId, updates: &UpdateVariant) -> RepositoryResult<()>;
        async fn update_variants(
            &self,
            ids: &[VariantId],
            updates: &UpdateVariant,
        ) -> RepositoryResult<usize>;
        async fn delete_variants(&self, ids: &[VariantId]) -> RepositoryResult<Vec<DeletionResponse>>;
    }

    #[async_trait]
    impl FacetReader for Repository {
        async fn list_facet_values(&self, code: &str) -> RepositoryResult<Vec<FacetValue>>;
    }
}
