use serde::Deserialize;
use validator::Validate;

use crate::domain::product::{NewProduct, UpdateProduct};
use crate::domain::types::{AssetId, FacetValueId, NonEmptyString, ProductId, Slug};
use crate::forms::{FormError, unique_ids};

#[derive(Debug, Deserialize, Validate)]
/// Create/edit form of a product.
pub struct ProductForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Derived from the name when left blank.
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, rename = "facet_value_id")]
    pub facet_value_ids: Vec<String>,
}

impl ProductForm {
    fn slug(&self) -> Result<Slug, FormError> {
        let slug = if self.slug.trim().is_empty() {
            Slug::from_name(&self.name)
        } else {
            Slug::new(self.slug.as_str())
        };
        Ok(slug?)
    }

    fn description(&self) -> String {
        ammonia::clean(self.description.trim())
    }

    pub fn to_new_product(&self) -> Result<NewProduct, FormError> {
        self.validate()?;
        Ok(NewProduct {
            name: NonEmptyString::new(self.name.as_str())?,
            slug: self.slug()?,
            description: self.description(),
            enabled: self.enabled,
            facet_value_ids: unique_ids(&self.facet_value_ids)?,
        })
    }

    pub fn to_update(&self) -> Result<UpdateProduct, FormError> {
        self.validate()?;
        Ok(UpdateProduct {
            name: Some(NonEmptyString::new(self.name.as_str())?),
            slug: Some(self.slug()?),
            description: Some(self.description()),
            enabled: Some(self.enabled),
            facet_value_ids: Some(unique_ids(&self.facet_value_ids)?),
            ..UpdateProduct::default()
        })
    }
}

#[derive(Debug, Deserialize)]
/// Enable/disable switch posted from a table row.
pub struct ToggleEnabledForm {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Enable,
    Disable,
    Delete,
    Duplicate,
    /// Replace the categories of every selected product.
    Categories,
}

#[derive(Debug, Deserialize, Validate)]
/// Action applied to the rows selected in the product table.
pub struct BulkActionForm {
    pub action: BulkAction,
    #[serde(default, rename = "id")]
    #[validate(length(min = 1))]
    pub ids: Vec<String>,
    /// Categories chosen for [`BulkAction::Categories`].
    #[serde(default, rename = "facet_value_id")]
    pub facet_value_ids: Vec<String>,
}

impl BulkActionForm {
    pub fn product_ids(&self) -> Result<Vec<ProductId>, FormError> {
        self.validate()?;
        unique_ids(&self.ids)
    }

    pub fn facet_value_ids(&self) -> Result<Vec<FacetValueId>, FormError> {
        unique_ids(&self.facet_value_ids)
    }
}

#[derive(Debug, Deserialize)]
/// Asset list of a product in display order; the first one is featured.
pub struct ProductAssetsForm {
    #[serde(default, rename = "asset_id")]
    pub asset_ids: Vec<String>,
}

impl ProductAssetsForm {
    pub fn to_update(&self) -> Result<UpdateProduct, FormError> {
        Ok(UpdateProduct::assets(unique_ids::<AssetId>(&self.asset_ids)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::from_body;

    #[test]
    fn new_product_derives_slug_and_sanitizes_description() {
        let form: ProductForm = from_body(
            b"name=Trail+Shoe&description=%3Cscript%3Ex%3C%2Fscript%3E%3Cb%3EGrippy%3C%2Fb%3E&enabled=true&facet_value_id=4&facet_value_id=4&facet_value_id=7",
        )
        .unwrap();

        let product = form.to_new_product().unwrap();

        assert_eq!(product.slug.as_str(), "trail-shoe");
        assert_eq!(product.description, "<b>Grippy</b>");
        assert!(product.enabled);
        assert_eq!(product.facet_value_ids.len(), 2);
    }

    #[test]
    fn blank_name_fails_validation() {
        let form: ProductForm = from_body(b"name=&slug=x").unwrap();
        assert!(matches!(form.to_new_product(), Err(FormError::Validation(_))));
    }

    #[test]
    fn bad_slug_is_a_constraint_error() {
        let form: ProductForm = from_body(b"name=Shoe&slug=Not+A+Slug").unwrap();
        assert!(matches!(form.to_update(), Err(FormError::Constraint(_))));
    }

    #[test]
    fn bulk_form_requires_selection() {
        let empty: BulkActionForm = from_body(b"action=delete").unwrap();
        assert!(empty.product_ids().is_err());

        let form: BulkActionForm = from_body(b"action=enable&id=1&id=2&id=2").unwrap();
        assert_eq!(form.action, BulkAction::Enable);
        assert_eq!(form.product_ids().unwrap().len(), 2);
    }

    #[test]
    fn bulk_categories_carry_facet_values() {
        let form: BulkActionForm =
            from_body(b"action=categories&id=1&facet_value_id=4&facet_value_id=").unwrap();
        assert_eq!(form.action, BulkAction::Categories);
        assert_eq!(
            form.facet_value_ids().unwrap(),
            vec![FacetValueId::new("4").unwrap()]
        );
    }

    #[test]
    fn first_asset_becomes_featured() {
        let form: ProductAssetsForm = from_body(b"asset_id=9&asset_id=3").unwrap();
        let update = form.to_update().unwrap();
        assert_eq!(update.featured_asset_id, Some(AssetId::new("9").unwrap()));
        assert_eq!(update.asset_ids.map(|ids| ids.len()), Some(2));
    }
}
