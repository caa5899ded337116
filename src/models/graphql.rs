//! Envelope types of the host's admin GraphQL API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a, V: Serialize> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct GraphqlError {
    pub message: String,
}

impl<T> GraphqlResponse<T> {
    /// Payload of a successful response, or every reported error message joined.
    pub fn into_data(self) -> Result<T, String> {
        if !self.errors.is_empty() {
            return Err(self
                .errors
                .into_iter()
                .map(|err| err.message)
                .collect::<Vec<_>>()
                .join("; "));
        }
        self.data
            .ok_or_else(|| "response carried neither data nor errors".to_string())
    }
}

/// `PaginatedList` shape shared by every list query of the host.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedList<T> {
    pub items: Vec<T>,
    pub total_items: usize,
}
