//! DTOs exposed by the JSON API endpoints.

use serde::Serialize;

use crate::list::filters::ListFilters;
use crate::list::options::QueryOptions;
use crate::list::page::PageResult;

/// Result payload of `/api/v1/products`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<'a, T> {
    /// Canonical list state decoded from the query string.
    pub state: &'a ListFilters,
    /// Options sent to the host for that state.
    pub options: &'a QueryOptions,
    #[serde(flatten)]
    pub page: PageResult<T>,
    /// Set when stale data is served after a failed refresh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
