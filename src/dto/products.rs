use serde::Serialize;

use crate::domain::facet::FacetValue;
use crate::domain::product::Product;

/// Product table row.
#[derive(Debug, Serialize)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub enabled: bool,
    pub preview: Option<String>,
    pub collections: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductRow {
    fn from(product: Product) -> Self {
        Self {
            collections: product.collection_names(),
            preview: product.featured_asset.map(|asset| asset.preview),
            id: product.id.to_string(),
            name: product.name,
            slug: product.slug,
            enabled: product.enabled,
            created_at: product.created_at.format("%Y-%m-%d %H:%M").to_string(),
            updated_at: product.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Category checkbox of the product form and the filter panel.
#[derive(Debug, Serialize)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

impl CategoryOption {
    /// Marks the options whose id is in `selected`.
    pub fn from_values(values: &[FacetValue], selected: &[String]) -> Vec<Self> {
        values
            .iter()
            .map(|value| CategoryOption {
                id: value.id.to_string(),
                name: value.name.clone(),
                selected: selected.iter().any(|id| id == value.id.as_str()),
            })
            .collect()
    }
}

/// Data required to render the product edit page.
#[derive(Debug, Serialize)]
pub struct ProductPageData {
    pub product: Product,
    pub categories: Vec<CategoryOption>,
}

impl ProductPageData {
    pub fn new(product: Product, facet_values: &[FacetValue]) -> Self {
        let selected: Vec<String> = product
            .facet_values
            .iter()
            .map(|value| value.id.to_string())
            .collect();
        Self {
            categories: CategoryOption::from_values(facet_values, &selected),
            product,
        }
    }
}
