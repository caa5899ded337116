//! Builders shared by the service tests.

use chrono::{DateTime, Utc};

use crate::domain::product::Product;
use crate::domain::types::{ProductId, VariantId};
use crate::domain::variant::Variant;

pub fn product(id: &str, name: &str, enabled: bool) -> Product {
    let created_at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap_or_default();
    Product {
        id: ProductId::new(id).unwrap(),
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        description: String::new(),
        enabled,
        created_at,
        updated_at: created_at,
        featured_asset: None,
        assets: Vec::new(),
        collections: Vec::new(),
        facet_values: Vec::new(),
    }
}

pub fn variant(id: &str, name: &str, sku: &str, price: i64) -> Variant {
    Variant {
        id: VariantId::new(id).unwrap(),
        name: name.to_string(),
        sku: sku.to_string(),
        enabled: true,
        price,
        price_with_tax: price,
        currency_code: "EUR".to_string(),
        stock_on_hand: 5,
        stock_allocated: 0,
        track_inventory: true,
        out_of_stock_threshold: 0,
    }
}
