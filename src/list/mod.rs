//! List view state shared by every table in the console.
//!
//! [`controller::ListQueryStateController`] owns the state of one view,
//! [`url`] keeps it round-trippable through the address bar and
//! [`options::to_query_options`] projects it into the remote query shape.

pub mod controller;
pub mod filters;
pub mod memory;
pub mod options;
pub mod page;
pub mod predicate;
pub mod url;

pub use controller::{FilterUpdate, ListQueryStateController};
pub use filters::{
    ColumnFilter, ColumnFilters, FilterKind, FilterValue, FiltersPatch, ListFilters, ListSchema,
    SortDirection, Sorting,
};
pub use options::{QueryOptions, to_query_options};
pub use page::PageResult;
pub use predicate::{Predicate, Queryable, Scalar};
