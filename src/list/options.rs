use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::list::filters::{FilterKind, FilterValue, ListFilters, ListSchema, SortDirection};
use crate::list::predicate::{Predicate, Scalar};

/// Remote list request derived from [`ListFilters`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryOptions {
    pub take: usize,
    pub skip: usize,
    pub filter: Option<Predicate>,
    pub sort: BTreeMap<String, SortDirection>,
}

impl QueryOptions {
    /// Variables object for the host's list options input. `filter` and
    /// `sort` are left out entirely when empty.
    pub fn to_variables(&self) -> Value {
        let mut object = Map::new();
        object.insert("take".to_string(), json!(self.take));
        object.insert("skip".to_string(), json!(self.skip));
        if let Some(filter) = &self.filter {
            object.insert("filter".to_string(), filter.to_graphql());
        }
        if !self.sort.is_empty() {
            let sort: Map<String, Value> = self
                .sort
                .iter()
                .map(|(field, direction)| (field.clone(), json!(direction.as_str())))
                .collect();
            object.insert("sort".to_string(), Value::Object(sort));
        }
        Value::Object(object)
    }

    /// Deterministic serialization used as the query-cache key.
    pub fn cache_key(&self) -> String {
        self.to_variables().to_string()
    }
}

impl Serialize for QueryOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_variables().serialize(serializer)
    }
}

/// Projects list state into the remote query shape.
pub fn to_query_options(filters: &ListFilters, schema: &ListSchema) -> QueryOptions {
    let page_size = filters.page_size.max(1);
    let mut clauses = Vec::new();

    let term = filters.search_term.trim();
    if !term.is_empty() {
        let search = schema
            .search_fields
            .iter()
            .map(|field| Predicate::contains(field.clone(), term))
            .collect();
        clauses.extend(Predicate::any(search));
    }

    for filter in filters.column_filters.iter() {
        let Some(spec) = schema.filter_spec(&filter.field) else {
            continue;
        };
        if let Some(clause) = column_clause(&spec.predicate_field, spec.kind, &filter.value) {
            clauses.push(clause);
        }
    }

    let sort = filters
        .sorting
        .iter()
        .map(|sorting| (sorting.field.clone(), sorting.direction))
        .collect();

    QueryOptions {
        take: page_size,
        skip: filters.page.saturating_sub(1).saturating_mul(page_size),
        filter: Predicate::all(clauses),
        sort,
    }
}

fn column_clause(field: &str, kind: FilterKind, value: &FilterValue) -> Option<Predicate> {
    match (kind, value) {
        (FilterKind::Flag, FilterValue::Flag(flag)) => Some(Predicate::equals(field, *flag)),
        (FilterKind::Text, FilterValue::Text(text)) if !text.trim().is_empty() => {
            Some(Predicate::equals(field, text.trim()))
        }
        (FilterKind::OneOf, FilterValue::OneOf(values)) => {
            let mut values: Vec<Scalar> = values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(Scalar::from)
                .collect();
            match values.len() {
                0 => None,
                1 => values.pop().map(|value| Predicate::Eq {
                    field: field.to_string(),
                    value,
                }),
                _ => Some(Predicate::one_of(field, values)),
            }
        }
        // a single text value submitted for a multi-choice filter
        (FilterKind::OneOf, FilterValue::Text(text)) if !text.trim().is_empty() => {
            Some(Predicate::equals(field, text.trim()))
        }
        _ => None,
    }
}
