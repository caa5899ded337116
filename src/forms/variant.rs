use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{Amount, FacetValueId, NonEmptyString, ProductId, VariantId};
use crate::domain::variant::{NewVariant, UpdateVariant};
use crate::forms::{FormError, unique_ids};

#[derive(Debug, Deserialize, Validate)]
/// Edit form of a single variant.
pub struct VariantForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub sku: String,
    /// Net price in major units, e.g. `19.99`.
    pub price: String,
    #[validate(range(min = 0))]
    pub stock_on_hand: i64,
    #[serde(default)]
    pub track_inventory: bool,
    #[serde(default)]
    pub enabled: bool,
}

impl VariantForm {
    pub fn to_update(&self) -> Result<UpdateVariant, FormError> {
        self.validate()?;
        let price = Amount::from_major_units(&self.price).map_err(|_| FormError::InvalidPrice)?;
        Ok(UpdateVariant {
            name: Some(NonEmptyString::new(self.name.as_str())?),
            sku: Some(NonEmptyString::new(self.sku.as_str())?),
            enabled: Some(self.enabled),
            price: Some(price),
            stock_on_hand: Some(Amount::new(self.stock_on_hand)?),
            track_inventory: Some(self.track_inventory),
            ..UpdateVariant::default()
        })
    }
}

/// Product a variant form was posted from; sent as a hidden input next to the edit fields.
#[derive(Debug, Deserialize)]
pub struct VariantTarget {
    pub product_id: String,
}

impl VariantTarget {
    pub fn product_id(&self) -> Result<ProductId, FormError> {
        Ok(ProductId::new(self.product_id.as_str())?)
    }
}

/// Rows of the "create variants" table; the i-th value of each field forms one variant.
#[derive(Debug, Default, Deserialize)]
pub struct CreateVariantsForm {
    #[serde(default)]
    pub sku: Vec<String>,
    #[serde(default)]
    pub price: Vec<String>,
    #[serde(default)]
    pub stock_on_hand: Vec<String>,
}

impl CreateVariantsForm {
    /// Converts the filled-in rows. Completely blank rows are skipped; a row with
    /// a price or stock but no SKU is an error.
    pub fn to_new_variants(&self, product_id: &ProductId) -> Result<Vec<NewVariant>, FormError> {
        let rows = self.sku.len().max(self.price.len()).max(self.stock_on_hand.len());
        let cell = |values: &[String], row: usize| {
            values.get(row).map(|value| value.trim()).unwrap_or_default().to_string()
        };

        let mut variants = Vec::new();
        for row in 0..rows {
            let (sku, price, stock) = (
                cell(&self.sku, row),
                cell(&self.price, row),
                cell(&self.stock_on_hand, row),
            );
            if sku.is_empty() && price.is_empty() && stock.is_empty() {
                continue;
            }
            if sku.is_empty() {
                return Err(FormError::Constraint("SKU is required for every variant".to_string()));
            }
            let price = if price.is_empty() {
                Amount::new(0)?
            } else {
                Amount::from_major_units(&price).map_err(|_| FormError::InvalidPrice)?
            };
            let stock_on_hand = if stock.is_empty() {
                Amount::new(0)?
            } else {
                let units: i64 = stock
                    .parse()
                    .map_err(|_| FormError::Constraint(format!("invalid stock: {stock}")))?;
                Amount::new(units)?
            };
            variants.push(NewVariant {
                product_id: product_id.clone(),
                sku: NonEmptyString::new(sku)?,
                price,
                stock_on_hand,
            });
        }

        if variants.is_empty() {
            return Err(FormError::Constraint("add at least one variant".to_string()));
        }
        Ok(variants)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VariantBulkAction {
    Enable,
    Disable,
    Delete,
    /// Replace the facet values of every selected variant.
    Categories,
}

/// Action applied to the rows selected in the variant table.
#[derive(Debug, Deserialize, Validate)]
pub struct VariantBulkActionForm {
    pub action: VariantBulkAction,
    #[serde(default, rename = "id")]
    #[validate(length(min = 1))]
    pub ids: Vec<String>,
    #[serde(default, rename = "facet_value_id")]
    pub facet_value_ids: Vec<String>,
}

impl VariantBulkActionForm {
    pub fn variant_ids(&self) -> Result<Vec<VariantId>, FormError> {
        self.validate()?;
        unique_ids(&self.ids)
    }

    pub fn facet_value_ids(&self) -> Result<Vec<FacetValueId>, FormError> {
        unique_ids(&self.facet_value_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::from_body;

    #[test]
    fn valid_form_converts_price_to_minor_units() {
        let form: VariantForm =
            from_body(b"name=Blue+%2F+42&sku=SHOE-B-42&price=19.9&stock_on_hand=5&enabled=true")
                .unwrap();

        let update = form.to_update().unwrap();

        assert_eq!(update.price.map(Amount::get), Some(1990));
        assert_eq!(update.stock_on_hand.map(Amount::get), Some(5));
        assert_eq!(update.enabled, Some(true));
        assert_eq!(update.track_inventory, Some(false));
    }

    #[test]
    fn negative_values_are_rejected() {
        let form: VariantForm =
            from_body(b"name=Blue&sku=B&price=-1&stock_on_hand=0").unwrap();
        assert!(matches!(form.to_update(), Err(FormError::InvalidPrice)));

        let form: VariantForm =
            from_body(b"name=Blue&sku=B&price=1&stock_on_hand=-3").unwrap();
        assert!(matches!(form.to_update(), Err(FormError::Validation(_))));
    }

    #[test]
    fn target_is_read_alongside_edit_fields() {
        let body = b"product_id=4&name=Blue&sku=B&price=1&stock_on_hand=0";
        let target: VariantTarget = from_body(body).unwrap();
        assert_eq!(target.product_id().unwrap(), ProductId::new("4").unwrap());
        assert!(from_body::<VariantForm>(body).is_ok());
    }

    #[test]
    fn sku_is_required() {
        let form: VariantForm = from_body(b"name=Blue&sku=&price=1&stock_on_hand=0").unwrap();
        assert!(form.to_update().is_err());
    }

    #[test]
    fn create_rows_skip_blank_lines() {
        let form: CreateVariantsForm = from_body(
            b"sku=SHOE-G-40&price=15&stock_on_hand=2&sku=&price=&stock_on_hand=&sku=SHOE-G-41&price=&stock_on_hand=",
        )
        .unwrap();

        let variants = form.to_new_variants(&ProductId::new("3").unwrap()).unwrap();

        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].price.get(), 1500);
        assert_eq!(variants[0].stock_on_hand.get(), 2);
        assert_eq!(variants[1].sku.to_string(), "SHOE-G-41");
        assert_eq!(variants[1].price.get(), 0);
    }

    #[test]
    fn create_rows_need_sku() {
        let product = ProductId::new("3").unwrap();
        let form: CreateVariantsForm = from_body(b"sku=&price=15&stock_on_hand=").unwrap();
        assert!(matches!(
            form.to_new_variants(&product),
            Err(FormError::Constraint(_))
        ));

        let empty = CreateVariantsForm::default();
        assert!(empty.to_new_variants(&product).is_err());

        let form: CreateVariantsForm = from_body(b"sku=A&price=1.-5&stock_on_hand=1").unwrap();
        assert!(matches!(form.to_new_variants(&product), Err(FormError::InvalidPrice)));
    }

    #[test]
    fn bulk_form_reads_selection() {
        let form: VariantBulkActionForm =
            from_body(b"action=categories&id=11&id=12&facet_value_id=4").unwrap();
        assert_eq!(form.action, VariantBulkAction::Categories);
        assert_eq!(form.variant_ids().unwrap().len(), 2);
        assert_eq!(form.facet_value_ids().unwrap().len(), 1);

        let empty: VariantBulkActionForm = from_body(b"action=delete").unwrap();
        assert!(empty.variant_ids().is_err());
    }
}
