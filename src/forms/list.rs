use serde::Deserialize;

use crate::list::filters::{FilterKind, FilterValue, FiltersPatch, ListSchema};
use crate::list::url::{PAGE_SIZE_PARAM, SEARCH_PARAM};

/// Toolbar form of a list view: search box, one input per filter spec, page size.
///
/// Filter inputs are read by their spec id, so the same form serves every list.
#[derive(Debug, Default, Deserialize)]
#[serde(from = "Vec<(String, String)>")]
pub struct ListFilterForm {
    pub q: String,
    pub page_size: Option<usize>,
    pub fields: Vec<(String, String)>,
}

impl From<Vec<(String, String)>> for ListFilterForm {
    fn from(pairs: Vec<(String, String)>) -> Self {
        let mut form = ListFilterForm::default();
        for (key, value) in pairs {
            match key.as_str() {
                SEARCH_PARAM => form.q = value,
                PAGE_SIZE_PARAM => form.page_size = value.trim().parse().ok(),
                _ => form.fields.push((key, value)),
            }
        }
        form
    }
}

impl ListFilterForm {
    /// Patch replacing the search term and every schema filter with the submitted values.
    pub fn to_patch(&self, schema: &ListSchema) -> FiltersPatch {
        let mut patch = FiltersPatch::new().search(self.q.trim());
        if let Some(page_size) = self.page_size {
            patch = patch.page_size(page_size);
        }
        for spec in &schema.filters {
            let raw: Vec<&str> = self
                .fields
                .iter()
                .filter(|(key, _)| *key == spec.id)
                .map(|(_, value)| value.trim())
                .filter(|value| !value.is_empty())
                .collect();
            patch = match filter_value(spec.kind, &raw) {
                Some(value) => patch.filter(spec.id.clone(), value),
                None => patch.clear_filter(spec.id.clone()),
            };
        }
        patch
    }
}

fn filter_value(kind: FilterKind, raw: &[&str]) -> Option<FilterValue> {
    match kind {
        FilterKind::Flag => match raw.last().copied() {
            Some("true") => Some(FilterValue::Flag(true)),
            Some("false") => Some(FilterValue::Flag(false)),
            _ => None,
        },
        FilterKind::Text => raw.last().map(|text| FilterValue::Text(text.to_string())),
        FilterKind::OneOf => {
            let mut values: Vec<String> = Vec::new();
            for value in raw {
                if !values.iter().any(|existing| existing == value) {
                    values.push(value.to_string());
                }
            }
            (!values.is_empty()).then_some(FilterValue::OneOf(values))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::filters::{ListFilters, Sorting};

    fn schema() -> ListSchema {
        ListSchema::new()
            .default_sorting(Sorting::desc("createdAt"))
            .search_fields(&["name"])
            .filter("enabled", "enabled", FilterKind::Flag)
            .filter("categories", "facetValueId", FilterKind::OneOf)
    }

    fn form(fields: &[(&str, &str)], q: &str) -> ListFilterForm {
        ListFilterForm {
            q: q.to_string(),
            page_size: None,
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn decodes_urlencoded_body() {
        let form: ListFilterForm =
            crate::forms::from_body(b"q=shoe&pageSize=25&categories=4&categories=7").unwrap();
        assert_eq!(form.q, "shoe");
        assert_eq!(form.page_size, Some(25));
        assert_eq!(form.fields.len(), 2);
    }

    #[test]
    fn submitted_inputs_become_filters() {
        let schema = schema();
        let patch = form(
            &[("enabled", "false"), ("categories", "4"), ("categories", "7")],
            " shoe ",
        )
        .to_patch(&schema);

        let filters = patch.apply(&ListFilters::defaults(&schema));

        assert_eq!(filters.search_term, "shoe");
        assert_eq!(
            filters.column_filters.get("enabled"),
            Some(&FilterValue::Flag(false))
        );
        assert_eq!(
            filters.column_filters.get("categories"),
            Some(&FilterValue::OneOf(vec!["4".into(), "7".into()]))
        );
    }

    #[test]
    fn blank_inputs_clear_filters() {
        let schema = schema();
        let current = ListFilters {
            search_term: "boot".to_string(),
            column_filters: crate::list::filters::ColumnFilters::new()
                .with("enabled", FilterValue::Flag(true)),
            ..ListFilters::defaults(&schema)
        };

        let filters = form(&[("enabled", "")], "").to_patch(&schema).apply(&current);

        assert!(filters.search_term.is_empty());
        assert!(filters.column_filters.is_empty());
    }
}
