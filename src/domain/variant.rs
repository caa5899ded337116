use serde::{Deserialize, Serialize};

use crate::domain::types::{Amount, FacetValueId, NonEmptyString, ProductId, VariantId};
use crate::list::predicate::{Queryable, Scalar};

/// Purchasable SKU-level child of a product.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variant {
    pub id: VariantId,
    pub name: String,
    pub sku: String,
    pub enabled: bool,
    /// Price in minor currency units.
    pub price: i64,
    pub price_with_tax: i64,
    pub currency_code: String,
    pub stock_on_hand: i64,
    pub stock_allocated: i64,
    pub track_inventory: bool,
    pub out_of_stock_threshold: i64,
}

impl Variant {
    /// Units available for sale.
    pub fn stock_level(&self) -> i64 {
        self.stock_on_hand - self.stock_allocated
    }

    /// Formats the net price as `12.50 EUR`.
    pub fn display_price(&self) -> String {
        format_price(self.price, &self.currency_code)
    }
}

/// Renders a minor-unit amount with its currency code, `—` when the code is unknown.
pub fn format_price(minor_units: i64, currency_code: &str) -> String {
    if currency_code.is_empty() {
        return "—".to_string();
    }
    let sign = if minor_units < 0 { "-" } else { "" };
    let abs = minor_units.unsigned_abs();
    format!("{sign}{}.{:02} {currency_code}", abs / 100, abs % 100)
}

impl Queryable for Variant {
    fn field(&self, name: &str) -> Option<Scalar> {
        match name {
            "id" => Some(Scalar::Text(self.id.to_string())),
            "name" => Some(Scalar::Text(self.name.clone())),
            "sku" => Some(Scalar::Text(self.sku.clone())),
            "enabled" => Some(Scalar::Bool(self.enabled)),
            "price" => Some(Scalar::Int(self.price)),
            "priceWithTax" => Some(Scalar::Int(self.price_with_tax)),
            "stockLevels" => Some(Scalar::Int(self.stock_level())),
            _ => None,
        }
    }
}

/// Partial field set for a variant update mutation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateVariant {
    pub name: Option<NonEmptyString>,
    pub sku: Option<NonEmptyString>,
    pub enabled: Option<bool>,
    pub price: Option<Amount>,
    pub stock_on_hand: Option<Amount>,
    pub out_of_stock_threshold: Option<Amount>,
    pub track_inventory: Option<bool>,
    pub facet_value_ids: Option<Vec<FacetValueId>>,
}

impl UpdateVariant {
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Self::default()
        }
    }

    /// Update replacing the facet values of the variant.
    pub fn facet_values(ids: Vec<FacetValueId>) -> Self {
        Self {
            facet_value_ids: Some(ids),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Variant to be created under an existing product; the SKU doubles as its name.
#[derive(Clone, Debug, PartialEq)]
pub struct NewVariant {
    pub product_id: ProductId,
    pub sku: NonEmptyString,
    pub price: Amount,
    pub stock_on_hand: Amount,
}
