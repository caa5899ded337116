//! Repository backed by the host's admin GraphQL API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::facet::FacetValue;
use crate::domain::product::{
    DeletionResponse, DuplicationResult, NewProduct, Product, UpdateProduct,
};
use crate::domain::types::{ProductId, VariantId};
use crate::domain::variant::{NewVariant, UpdateVariant, Variant};
use crate::list::options::QueryOptions;
use crate::list::page::PageResult;
use crate::models::facet::FacetRecord;
use crate::models::graphql::{GraphqlRequest, GraphqlResponse, PaginatedList};
use crate::models::product::{
    CreateProductInput, DuplicateEntityInput, DuplicateEntityRecord, ProductRecord,
    UpdateProductInput,
};
use crate::models::variant::{CreateVariantInput, ProductVariantsRecord, UpdateVariantInput};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{FacetReader, ProductReader, ProductWriter, VariantReader, VariantWriter};

const PRODUCT_LIST_QUERY: &str = r#"
query ConsoleProductList($options: ProductListOptions) {
  products(options: $options) {
    totalItems
    items {
      id
      name
      enabled
      createdAt
      updatedAt
      slug
      description
      featuredAsset { id name preview }
      assets { id name preview }
      collections { id name }
      facetValues { id name code }
    }
  }
}"#;

const PRODUCT_DETAIL_QUERY: &str = r#"
query ConsoleProductDetail($id: ID!) {
  product(id: $id) {
    id
    name
    enabled
    createdAt
    updatedAt
    slug
    description
    featuredAsset { id name preview }
    assets { id name preview }
    collections { id name }
    facetValues { id name code }
    translations { languageCode name description }
  }
}"#;

const CREATE_PRODUCT_MUTATION: &str = r#"
mutation ConsoleCreateProduct($input: CreateProductInput!) {
  createProduct(input: $input) { id }
}"#;

const UPDATE_PRODUCTS_MUTATION: &str = r#"
mutation ConsoleUpdateProducts($input: [UpdateProductInput!]!) {
  updateProducts(input: $input) { id }
}"#;

const DELETE_PRODUCTS_MUTATION: &str = r#"
mutation ConsoleDeleteProducts($ids: [ID!]!) {
  deleteProducts(ids: $ids) { result message }
}"#;

const DUPLICATE_ENTITY_MUTATION: &str = r#"
mutation ConsoleDuplicateEntity($input: DuplicateEntityInput!) {
  duplicateEntity(input: $input) {
    ... on DuplicateEntitySuccess { newEntityId }
    ... on DuplicateEntityError { message duplicationError }
  }
}"#;

const PRODUCT_VARIANTS_QUERY: &str = r#"
query ConsoleProductVariants($productId: ID!) {
  product(id: $productId) {
    id
    name
    variants {
      id
      name
      sku
      enabled
      price
      priceWithTax
      currencyCode
      stockOnHand
      stockAllocated
      trackInventory
      outOfStockThreshold
    }
  }
}"#;

const UPDATE_VARIANTS_MUTATION: &str = r#"
mutation ConsoleUpdateVariants($input: [UpdateProductVariantInput!]!) {
  updateProductVariants(input: $input) { id }
}"#;

const CREATE_VARIANTS_MUTATION: &str = r#"
mutation ConsoleCreateVariants($input: [CreateProductVariantInput!]!) {
  createProductVariants(input: $input) { id }
}"#;

const DELETE_VARIANTS_MUTATION: &str = r#"
mutation ConsoleDeleteVariants($ids: [ID!]!) {
  deleteProductVariants(ids: $ids) { result message }
}"#;

const FACETS_BY_CODE_QUERY: &str = r#"
query ConsoleFacets($code: String!) {
  facets(options: { filter: { code: { eq: $code } } }) {
    totalItems
    items { id name values { id name code } }
  }
}"#;

#[derive(Deserialize)]
struct ProductsData {
    products: PaginatedList<ProductRecord>,
}

#[derive(Deserialize)]
struct ProductData {
    product: Option<ProductRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProductData {
    create_product: IdOnly,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProductsData {
    update_products: Vec<Option<IdOnly>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteProductsData {
    delete_products: Vec<DeletionResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DuplicateEntityData {
    duplicate_entity: DuplicateEntityRecord,
}

#[derive(Deserialize)]
struct ProductVariantsData {
    product: Option<ProductVariantsRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateVariantsData {
    update_product_variants: Vec<Option<IdOnly>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateVariantsData {
    create_product_variants: Vec<Option<IdOnly>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteVariantsData {
    delete_product_variants: Vec<DeletionResponse>,
}

#[derive(Deserialize)]
struct FacetsData {
    facets: PaginatedList<FacetRecord>,
}

#[derive(Deserialize)]
struct IdOnly {
    id: String,
}

/// Async GraphQL client for the host's admin API.
#[derive(Clone)]
pub struct GraphqlRepository {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl GraphqlRepository {
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint, token)
    }

    pub fn with_client(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            token: token.filter(|token| !token.is_empty()),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<V, T>(&self, query: &str, variables: V) -> RepositoryResult<T>
    where
        V: Serialize + Send,
        T: DeserializeOwned,
    {
        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&GraphqlRequest { query, variables });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        let body: GraphqlResponse<T> = response.json().await?;
        body.into_data().map_err(RepositoryError::Remote)
    }
}

#[async_trait]
impl ProductReader for GraphqlRepository {
    async fn list_products(&self, options: &QueryOptions) -> RepositoryResult<PageResult<Product>> {
        let data: ProductsData = self
            .execute(PRODUCT_LIST_QUERY, json!({ "options": options }))
            .await?;
        let items = data
            .products
            .items
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageResult::new(items, data.products.total_items))
    }

    async fn get_product(&self, id: &ProductId) -> RepositoryResult<Option<Product>> {
        let data: ProductData = self
            .execute(PRODUCT_DETAIL_QUERY, json!({ "id": id }))
            .await?;
        Ok(data.product.map(Product::try_from).transpose()?)
    }
}

#[async_trait]
impl ProductWriter for GraphqlRepository {
    async fn create_product(&self, product: &NewProduct) -> RepositoryResult<ProductId> {
        let data: CreateProductData = self
            .execute(
                CREATE_PRODUCT_MUTATION,
                json!({ "input": CreateProductInput::from(product) }),
            )
            .await?;
        Ok(ProductId::new(data.create_product.id)?)
    }

    async fn update_product(&self, id: &ProductId, updates: &UpdateProduct) -> RepositoryResult<()> {
        if updates.is_empty() {
            return Ok(());
        }
        let updated = self.update_products(std::slice::from_ref(id), updates).await?;
        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn update_products(
        &self,
        ids: &[ProductId],
        updates: &UpdateProduct,
    ) -> RepositoryResult<usize> {
        if ids.is_empty() || updates.is_empty() {
            return Ok(0);
        }
        let input: Vec<UpdateProductInput> = ids
            .iter()
            .map(|id| UpdateProductInput::new(id, updates))
            .collect();
        let data: UpdateProductsData = self
            .execute(UPDATE_PRODUCTS_MUTATION, json!({ "input": input }))
            .await?;
        Ok(data.update_products.iter().flatten().count())
    }

    async fn delete_products(&self, ids: &[ProductId]) -> RepositoryResult<Vec<DeletionResponse>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let data: DeleteProductsData = self
            .execute(DELETE_PRODUCTS_MUTATION, json!({ "ids": ids }))
            .await?;
        Ok(data.delete_products)
    }

    async fn duplicate_product(&self, id: &ProductId) -> RepositoryResult<DuplicationResult> {
        let data: DuplicateEntityData = self
            .execute(
                DUPLICATE_ENTITY_MUTATION,
                json!({ "input": DuplicateEntityInput::product(id) }),
            )
            .await?;
        Ok(DuplicationResult::try_from(data.duplicate_entity)?)
    }
}

#[async_trait]
impl VariantReader for GraphqlRepository {
    async fn list_variants(&self, product_id: &ProductId) -> RepositoryResult<Vec<Variant>> {
        let data: ProductVariantsData = self
            .execute(PRODUCT_VARIANTS_QUERY, json!({ "productId": product_id }))
            .await?;
        let product = data.product.ok_or(RepositoryError::NotFound)?;
        Ok(product
            .variants
            .into_iter()
            .map(Variant::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

#[async_trait]
impl VariantWriter for GraphqlRepository {
    async fn create_variants(&self, variants: &[NewVariant]) -> RepositoryResult<Vec<VariantId>> {
        if variants.is_empty() {
            return Ok(Vec::new());
        }
        let input: Vec<CreateVariantInput> = variants.iter().map(CreateVariantInput::from).collect();
        let data: CreateVariantsData = self
            .execute(CREATE_VARIANTS_MUTATION, json!({ "input": input }))
            .await?;
        Ok(data
            .create_product_variants
            .into_iter()
            .flatten()
            .map(|record| VariantId::new(record.id))
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn update_variant(&self, id: &VariantId, updates: &UpdateVariant) -> RepositoryResult<()> {
        if updates.is_empty() {
            return Ok(());
        }
        let updated = self.update_variants(std::slice::from_ref(id), updates).await?;
        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn update_variants(
        &self,
        ids: &[VariantId],
        updates: &UpdateVariant,
    ) -> RepositoryResult<usize> {
        if ids.is_empty() || updates.is_empty() {
            return Ok(0);
        }
        let input: Vec<UpdateVariantInput> = ids
            .iter()
            .map(|id| UpdateVariantInput::new(id, updates))
            .collect();
        let data: UpdateVariantsData = self
            .execute(UPDATE_VARIANTS_MUTATION, json!({ "input": input }))
            .await?;
        Ok(data.update_product_variants.iter().flatten().count())
    }

    async fn delete_variants(&self, ids: &[VariantId]) -> RepositoryResult<Vec<DeletionResponse>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let data: DeleteVariantsData = self
            .execute(DELETE_VARIANTS_MUTATION, json!({ "ids": ids }))
            .await?;
        Ok(data.delete_product_variants)
    }
}

#[async_trait]
impl FacetReader for GraphqlRepository {
    async fn list_facet_values(&self, code: &str) -> RepositoryResult<Vec<FacetValue>> {
        let data: FacetsData = self
            .execute(FACETS_BY_CODE_QUERY, json!({ "code": code }))
            .await?;
        let values = data
            .facets
            .items
            .into_iter()
            .flat_map(|facet| facet.values)
            .map(FacetValue::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_is_ignored() {
        let repo = GraphqlRepository::new("http://localhost:3000/admin-api", Some(String::new()));
        assert!(repo.token.is_none());
        assert_eq!(repo.endpoint(), "http://localhost:3000/admin-api");
    }

    #[test]
    fn list_options_are_sent_as_variables() {
        let options = QueryOptions {
            take: 10,
            skip: 20,
            filter: None,
            sort: Default::default(),
        };
        let request = GraphqlRequest {
            query: PRODUCT_LIST_QUERY,
            variables: json!({ "options": options }),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["variables"]["options"], json!({ "take": 10, "skip": 20 }));
    }
}
