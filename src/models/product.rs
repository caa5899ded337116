use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::product::{
    Asset as DomainAsset, CollectionRef, DuplicationResult,
    NewProduct as DomainNewProduct, Product as DomainProduct,
    UpdateProduct as DomainUpdateProduct,
};
use crate::domain::types::{AssetId, ProductId, TypeConstraintError};
use crate::models::facet::FacetValueRecord;

/// Language every translation written by the console is stored under.
pub const DEFAULT_LANGUAGE_CODE: &str = "en";

/// Code of the host's built-in product duplicator.
pub const PRODUCT_DUPLICATOR_CODE: &str = "product-duplicator";

#[derive(Clone, Debug, Deserialize)]
pub struct AssetRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub preview: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CollectionRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRecord {
    pub language_code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Product as returned by the list and detail queries.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub featured_asset: Option<AssetRecord>,
    #[serde(default)]
    pub assets: Vec<AssetRecord>,
    #[serde(default)]
    pub collections: Vec<CollectionRecord>,
    #[serde(default)]
    pub facet_values: Vec<FacetValueRecord>,
    #[serde(default)]
    pub translations: Vec<TranslationRecord>,
}

impl TryFrom<AssetRecord> for DomainAsset {
    type Error = TypeConstraintError;

    fn try_from(record: AssetRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AssetId::new(record.id)?,
            name: record.name,
            preview: record.preview,
        })
    }
}

impl ProductRecord {
    fn translation(&self) -> Option<&TranslationRecord> {
        self.translations
            .iter()
            .find(|t| t.language_code == DEFAULT_LANGUAGE_CODE)
            .or_else(|| self.translations.first())
    }
}

impl TryFrom<ProductRecord> for DomainProduct {
    type Error = TypeConstraintError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        // list queries only select translations, detail queries select both
        let (name, description) = match record.translation() {
            Some(t) if record.name.is_empty() => (
                t.name.clone(),
                if record.description.is_empty() {
                    t.description.clone()
                } else {
                    record.description.clone()
                },
            ),
            _ => (record.name.clone(), record.description.clone()),
        };

        Ok(Self {
            id: ProductId::new(record.id)?,
            name,
            slug: record.slug,
            description,
            enabled: record.enabled,
            updated_at: record.updated_at.unwrap_or(record.created_at),
            created_at: record.created_at,
            featured_asset: record
                .featured_asset
                .map(DomainAsset::try_from)
                .transpose()?,
            assets: record
                .assets
                .into_iter()
                .map(DomainAsset::try_from)
                .collect::<Result<_, _>>()?,
            collections: record
                .collections
                .into_iter()
                .map(|c| CollectionRef {
                    id: c.id,
                    name: c.name,
                })
                .collect(),
            facet_values: record
                .facet_values
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductTranslationInput {
    pub language_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    pub enabled: bool,
    pub facet_value_ids: Vec<String>,
    pub translations: Vec<ProductTranslationInput>,
}

impl From<&DomainNewProduct> for CreateProductInput {
    fn from(product: &DomainNewProduct) -> Self {
        Self {
            enabled: product.enabled,
            facet_value_ids: product
                .facet_value_ids
                .iter()
                .map(|id| id.to_string())
                .collect(),
            translations: vec![ProductTranslationInput {
                language_code: DEFAULT_LANGUAGE_CODE.to_string(),
                name: Some(product.name.to_string()),
                slug: Some(product.slug.to_string()),
                description: Some(product.description.clone()),
            }],
        }
    }
}

/// `UpdateProductInput`; absent fields are left out of the payload.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet_value_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translations: Option<Vec<ProductTranslationInput>>,
}

impl UpdateProductInput {
    pub fn new(id: &ProductId, updates: &DomainUpdateProduct) -> Self {
        let translation = ProductTranslationInput {
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            name: updates.name.as_ref().map(ToString::to_string),
            slug: updates.slug.as_ref().map(ToString::to_string),
            description: updates.description.clone(),
        };
        let has_translation = translation.name.is_some()
            || translation.slug.is_some()
            || translation.description.is_some();

        Self {
            id: id.to_string(),
            enabled: updates.enabled,
            facet_value_ids: updates
                .facet_value_ids
                .as_ref()
                .map(|ids| ids.iter().map(ToString::to_string).collect()),
            asset_ids: updates
                .asset_ids
                .as_ref()
                .map(|ids| ids.iter().map(ToString::to_string).collect()),
            featured_asset_id: updates.featured_asset_id.as_ref().map(ToString::to_string),
            translations: has_translation.then(|| vec![translation]),
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ConfigArgInput {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ConfigurableOperationInput {
    pub code: String,
    pub arguments: Vec<ConfigArgInput>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateEntityInput {
    pub entity_name: String,
    pub entity_id: String,
    pub duplicator_input: ConfigurableOperationInput,
}

impl DuplicateEntityInput {
    pub fn product(id: &ProductId) -> Self {
        Self {
            entity_name: "Product".to_string(),
            entity_id: id.to_string(),
            duplicator_input: ConfigurableOperationInput {
                code: PRODUCT_DUPLICATOR_CODE.to_string(),
                arguments: Vec::new(),
            },
        }
    }
}

/// `DuplicateEntityResult` union: success carries the new id, errors a message.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum DuplicateEntityRecord {
    #[serde(rename_all = "camelCase")]
    Success { new_entity_id: String },
    #[serde(rename_all = "camelCase")]
    Error {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        duplication_error: Option<String>,
    },
}

impl TryFrom<DuplicateEntityRecord> for DuplicationResult {
    type Error = TypeConstraintError;

    fn try_from(record: DuplicateEntityRecord) -> Result<Self, TypeConstraintError> {
        Ok(match record {
            DuplicateEntityRecord::Success { new_entity_id } => DuplicationResult::Duplicated {
                new_id: ProductId::new(new_entity_id)?,
            },
            DuplicateEntityRecord::Error {
                message,
                duplication_error,
            } => DuplicationResult::Failed {
                message: message
                    .filter(|m| !m.is_empty())
                    .or(duplication_error)
                    .unwrap_or_else(|| "Unknown error".to_string()),
            },
        })
    }
}
