//! DTO modules that bridge services with templates and APIs.

pub mod api;
pub mod list;
pub mod products;
pub mod variants;
