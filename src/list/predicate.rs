//! Tagged filter predicates and their boundary serialization.
//!
//! Predicates are built as plain Rust values and only turned into the host's
//! filter language (`{field: {contains: ..}}`, `{_and: [..]}`) when a request
//! leaves the console. The same tree can be evaluated in memory against any
//! [`Queryable`] record.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value, json};

/// Scalar value a predicate compares against.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Scalar {
    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Bool(value) => Value::Bool(*value),
            Scalar::Int(value) => json!(value),
            Scalar::Text(value) => Value::String(value.clone()),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

/// Record whose fields can be read by name for in-memory filtering and sorting.
pub trait Queryable {
    fn field(&self, name: &str) -> Option<Scalar>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    /// Case-insensitive substring match on a text field.
    Contains { field: String, text: String },
    Eq { field: String, value: Scalar },
    In { field: String, values: Vec<Scalar> },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn contains(field: impl Into<String>, text: impl Into<String>) -> Self {
        Predicate::Contains {
            field: field.into(),
            text: text.into(),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Predicate::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn one_of(field: impl Into<String>, values: Vec<Scalar>) -> Self {
        Predicate::In {
            field: field.into(),
            values,
        }
    }

    /// Conjunction of `clauses`; `None` when empty, the clause itself when single.
    pub fn all(mut clauses: Vec<Predicate>) -> Option<Predicate> {
        match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(Predicate::And(clauses)),
        }
    }

    /// Disjunction of `clauses`; `None` when empty, the clause itself when single.
    pub fn any(mut clauses: Vec<Predicate>) -> Option<Predicate> {
        match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(Predicate::Or(clauses)),
        }
    }

    /// Renders the predicate in the host's GraphQL filter input shape.
    pub fn to_graphql(&self) -> Value {
        let mut object = Map::new();
        match self {
            Predicate::Contains { field, text } => {
                object.insert(field.clone(), json!({ "contains": text }));
            }
            Predicate::Eq { field, value } => {
                object.insert(field.clone(), json!({ "eq": value.to_json() }));
            }
            Predicate::In { field, values } => {
                let values: Vec<Value> = values.iter().map(Scalar::to_json).collect();
                object.insert(field.clone(), json!({ "in": values }));
            }
            Predicate::And(clauses) => {
                let clauses: Vec<Value> = clauses.iter().map(Predicate::to_graphql).collect();
                object.insert("_and".to_string(), Value::Array(clauses));
            }
            Predicate::Or(clauses) => {
                let clauses: Vec<Value> = clauses.iter().map(Predicate::to_graphql).collect();
                object.insert("_or".to_string(), Value::Array(clauses));
            }
        }
        Value::Object(object)
    }

    pub fn matches<T: Queryable + ?Sized>(&self, item: &T) -> bool {
        match self {
            Predicate::Contains { field, text } => match item.field(field) {
                Some(Scalar::Text(value)) => value.to_lowercase().contains(&text.to_lowercase()),
                _ => false,
            },
            Predicate::Eq { field, value } => item.field(field).as_ref() == Some(value),
            Predicate::In { field, values } => item
                .field(field)
                .is_some_and(|actual| values.contains(&actual)),
            Predicate::And(clauses) => clauses.iter().all(|clause| clause.matches(item)),
            Predicate::Or(clauses) => clauses.iter().any(|clause| clause.matches(item)),
        }
    }
}

impl Serialize for Predicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_graphql().serialize(serializer)
    }
}
