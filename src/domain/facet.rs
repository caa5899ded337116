use serde::{Deserialize, Serialize};

use crate::domain::types::FacetValueId;

/// Facet code whose values populate the category filter.
pub const CATEGORY_FACET_CODE: &str = "category";

/// One enumerated value of a facet, e.g. a single category.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetValue {
    pub id: FacetValueId,
    pub name: String,
    pub code: String,
}
