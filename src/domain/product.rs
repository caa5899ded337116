use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::facet::FacetValue;
use crate::domain::types::{AssetId, FacetValueId, NonEmptyString, ProductId, Slug};
use crate::list::predicate::{Queryable, Scalar};

/// Preview-sized reference to an uploaded asset.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Asset {
    pub id: AssetId,
    pub name: String,
    pub preview: String,
}

/// Collection the product is listed in.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionRef {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub featured_asset: Option<Asset>,
    pub assets: Vec<Asset>,
    pub collections: Vec<CollectionRef>,
    pub facet_values: Vec<FacetValue>,
}

impl Product {
    /// Comma separated collection names for table cells.
    pub fn collection_names(&self) -> String {
        self.collections
            .iter()
            .map(|c| c.name.as_str())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Queryable for Product {
    fn field(&self, name: &str) -> Option<Scalar> {
        match name {
            "id" => Some(Scalar::Text(self.id.to_string())),
            "name" => Some(Scalar::Text(self.name.clone())),
            "slug" => Some(Scalar::Text(self.slug.clone())),
            "enabled" => Some(Scalar::Bool(self.enabled)),
            "createdAt" => Some(Scalar::Int(self.created_at.timestamp_millis())),
            "updatedAt" => Some(Scalar::Int(self.updated_at.timestamp_millis())),
            _ => None,
        }
    }
}

/// Payload for creating a product on the host platform.
#[derive(Clone, Debug, PartialEq)]
pub struct NewProduct {
    pub name: NonEmptyString,
    pub slug: Slug,
    pub description: String,
    pub enabled: bool,
    pub facet_value_ids: Vec<FacetValueId>,
}

/// Partial field set applied by an update mutation; `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateProduct {
    pub name: Option<NonEmptyString>,
    pub slug: Option<Slug>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub facet_value_ids: Option<Vec<FacetValueId>>,
    pub asset_ids: Option<Vec<AssetId>>,
    pub featured_asset_id: Option<AssetId>,
}

impl UpdateProduct {
    /// Update touching only the enabled flag.
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Self::default()
        }
    }

    /// Update replacing the assigned facet values.
    pub fn facet_values(ids: Vec<FacetValueId>) -> Self {
        Self {
            facet_value_ids: Some(ids),
            ..Self::default()
        }
    }

    /// Update replacing the asset list; the first asset becomes the featured one.
    pub fn assets(ids: Vec<AssetId>) -> Self {
        Self {
            featured_asset_id: ids.first().cloned(),
            asset_ids: Some(ids),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Outcome reported by the host for a delete mutation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeletionResult {
    Deleted,
    NotDeleted,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletionResponse {
    pub result: DeletionResult,
    pub message: Option<String>,
}

impl DeletionResponse {
    pub fn is_deleted(&self) -> bool {
        self.result == DeletionResult::Deleted
    }
}

/// Outcome reported by the host for a duplicate mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DuplicationResult {
    Duplicated { new_id: ProductId },
    Failed { message: String },
}
