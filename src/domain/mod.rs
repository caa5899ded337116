//! Domain aggregates exposed by the catalog service layer.

pub mod facet;
pub mod product;
pub mod types;
pub mod variant;
