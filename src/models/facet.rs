use serde::Deserialize;

use crate::domain::facet::FacetValue as DomainFacetValue;
use crate::domain::types::{FacetValueId, TypeConstraintError};

#[derive(Clone, Debug, Deserialize)]
pub struct FacetValueRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
}

/// Facet with its values, as returned by the facet lookup.
#[derive(Clone, Debug, Deserialize)]
pub struct FacetRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub values: Vec<FacetValueRecord>,
}

impl TryFrom<FacetValueRecord> for DomainFacetValue {
    type Error = TypeConstraintError;

    fn try_from(record: FacetValueRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: FacetValueId::new(record.id)?,
            name: record.name,
            code: record.code,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn facet_values_convert_without_code() {
        let facet: FacetRecord = serde_json::from_value(json!({
            "id": "1",
            "name": "Category",
            "values": [{ "id": "4", "name": "Shoes" }]
        }))
        .unwrap();

        let values = facet
            .values
            .into_iter()
            .map(DomainFacetValue::try_from)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(values[0].id.as_str(), "4");
        assert_eq!(values[0].name, "Shoes");
        assert!(values[0].code.is_empty());
    }
}
