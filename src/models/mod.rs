//! Wire records of the host's admin API and the server configuration.

pub mod config;
pub mod facet;
pub mod graphql;
pub mod product;
pub mod variant;
