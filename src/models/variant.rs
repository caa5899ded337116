use serde::{Deserialize, Serialize};

use crate::domain::types::{TypeConstraintError, VariantId};
use crate::domain::variant::{
    NewVariant as DomainNewVariant, UpdateVariant as DomainUpdateVariant,
    Variant as DomainVariant,
};
use crate::models::product::DEFAULT_LANGUAGE_CODE;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sku: String,
    pub enabled: bool,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub price_with_tax: i64,
    #[serde(default)]
    pub currency_code: String,
    #[serde(default)]
    pub stock_on_hand: i64,
    #[serde(default)]
    pub stock_allocated: i64,
    #[serde(default)]
    pub track_inventory: TrackInventory,
    #[serde(default)]
    pub out_of_stock_threshold: i64,
}

/// `GlobalFlag` of the host: inventory tracking can defer to the global setting.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackInventory {
    True,
    False,
    #[default]
    Inherit,
}

impl From<bool> for TrackInventory {
    fn from(value: bool) -> Self {
        if value {
            TrackInventory::True
        } else {
            TrackInventory::False
        }
    }
}

impl TryFrom<VariantRecord> for DomainVariant {
    type Error = TypeConstraintError;

    fn try_from(record: VariantRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: VariantId::new(record.id)?,
            name: record.name,
            sku: record.sku,
            enabled: record.enabled,
            price: record.price,
            price_with_tax: record.price_with_tax,
            currency_code: record.currency_code,
            stock_on_hand: record.stock_on_hand,
            stock_allocated: record.stock_allocated,
            track_inventory: record.track_inventory == TrackInventory::True,
            out_of_stock_threshold: record.out_of_stock_threshold,
        })
    }
}

/// Product with its full variant list, as returned by the variants query.
#[derive(Clone, Debug, Deserialize)]
pub struct ProductVariantsRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub variants: Vec<VariantRecord>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VariantTranslationInput {
    pub language_code: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVariantInput {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_on_hand: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_of_stock_threshold: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_inventory: Option<TrackInventory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet_value_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translations: Option<Vec<VariantTranslationInput>>,
}

impl UpdateVariantInput {
    pub fn new(id: &VariantId, updates: &DomainUpdateVariant) -> Self {
        Self {
            id: id.to_string(),
            enabled: updates.enabled,
            sku: updates.sku.as_ref().map(ToString::to_string),
            price: updates.price.map(|amount| amount.get()),
            stock_on_hand: updates.stock_on_hand.map(|amount| amount.get()),
            out_of_stock_threshold: updates.out_of_stock_threshold.map(|amount| amount.get()),
            track_inventory: updates.track_inventory.map(TrackInventory::from),
            facet_value_ids: updates
                .facet_value_ids
                .as_ref()
                .map(|ids| ids.iter().map(ToString::to_string).collect()),
            translations: updates.name.as_ref().map(|name| {
                vec![VariantTranslationInput {
                    language_code: DEFAULT_LANGUAGE_CODE.to_string(),
                    name: name.to_string(),
                }]
            }),
        }
    }
}

/// `CreateProductVariantInput`; new variants start enabled and are named after their SKU.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateVariantInput {
    pub product_id: String,
    pub sku: String,
    pub price: i64,
    pub stock_on_hand: i64,
    pub enabled: bool,
    pub translations: Vec<VariantTranslationInput>,
}

impl From<&DomainNewVariant> for CreateVariantInput {
    fn from(variant: &DomainNewVariant) -> Self {
        Self {
            product_id: variant.product_id.to_string(),
            sku: variant.sku.to_string(),
            price: variant.price.get(),
            stock_on_hand: variant.stock_on_hand.get(),
            enabled: true,
            translations: vec![VariantTranslationInput {
                language_code: DEFAULT_LANGUAGE_CODE.to_string(),
                name: variant.sku.to_string(),
            }],
        }
    }
}
