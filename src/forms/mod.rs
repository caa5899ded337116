//! Form definitions backing the console routes.

use serde::de::DeserializeOwned;
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod list;
pub mod product;
pub mod variant;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("malformed form body: {0}")]
    Decode(String),

    #[error("invalid value: {0}")]
    Constraint(String),

    #[error("invalid price")]
    InvalidPrice,
}

/// Decodes an `application/x-www-form-urlencoded` body, including repeated keys
/// such as checkbox groups.
pub fn from_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, FormError> {
    serde_html_form::from_bytes(body).map_err(|err| FormError::Decode(err.to_string()))
}

/// Parses submitted ids, skipping blanks and repeats.
pub(crate) fn unique_ids<T>(raw: &[String]) -> Result<Vec<T>, FormError>
where
    T: TryFrom<String, Error = TypeConstraintError> + PartialEq,
{
    let mut ids: Vec<T> = Vec::new();
    for value in raw.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
        let id = T::try_from(value.to_string())?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}
