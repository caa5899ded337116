use serde::Serialize;

use crate::domain::types::ProductId;
use crate::domain::variant::{Variant, format_price};

/// Variant table row with prices and stock prepared for display.
#[derive(Debug, Serialize)]
pub struct VariantRow {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub enabled: bool,
    pub price: String,
    pub price_with_tax: String,
    /// Net price in major units for the inline edit form.
    pub price_input: String,
    pub stock_on_hand: i64,
    pub stock_level: i64,
    pub track_inventory: bool,
}

impl From<Variant> for VariantRow {
    fn from(variant: Variant) -> Self {
        let sign = if variant.price < 0 { "-" } else { "" };
        let abs = variant.price.unsigned_abs();
        Self {
            price: variant.display_price(),
            price_with_tax: format_price(variant.price_with_tax, &variant.currency_code),
            price_input: format!("{sign}{}.{:02}", abs / 100, abs % 100),
            stock_level: variant.stock_level(),
            id: variant.id.to_string(),
            name: variant.name,
            sku: variant.sku,
            enabled: variant.enabled,
            stock_on_hand: variant.stock_on_hand,
            track_inventory: variant.track_inventory,
        }
    }
}

/// Heading of the variants page.
#[derive(Debug, Serialize)]
pub struct VariantsPageData {
    pub product_id: ProductId,
    pub product_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::VariantId;

    #[test]
    fn row_formats_prices() {
        let row = VariantRow::from(Variant {
            id: VariantId::new("3").unwrap(),
            name: "Blue / 42".into(),
            sku: "SHOE-B-42".into(),
            enabled: true,
            price: 1905,
            price_with_tax: 2286,
            currency_code: "EUR".into(),
            stock_on_hand: 10,
            stock_allocated: 2,
            track_inventory: true,
            out_of_stock_threshold: 0,
        });

        assert_eq!(row.price, "19.05 EUR");
        assert_eq!(row.price_with_tax, "22.86 EUR");
        assert_eq!(row.price_input, "19.05");
        assert_eq!(row.stock_level, 8);
    }
}
