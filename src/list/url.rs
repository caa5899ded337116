//! Query-string codec for list state and the navigation capability it writes through.
//!
//! Decoding never fails: anything malformed in a hand-edited URL falls back to
//! the schema default for that field. Encoding omits every field that equals
//! its default so shared links stay short.

use std::collections::BTreeMap;

use crate::list::filters::{
    ColumnFilters, FilterKind, FilterValue, ListFilters, ListSchema, SortDirection, Sorting,
    page_in_range,
};

pub const PAGE_PARAM: &str = "page";
pub const PAGE_SIZE_PARAM: &str = "pageSize";
pub const SORT_PARAM: &str = "sort";
pub const SEARCH_PARAM: &str = "q";

/// Key/value view of a query string. Repeated keys keep the last value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchParams(BTreeMap<String, String>);

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        match serde_html_form::from_str::<Vec<(String, String)>>(query) {
            Ok(pairs) => pairs.into_iter().collect(),
            Err(err) => {
                log::debug!("Ignoring malformed query string {query:?}: {err}");
                Self::default()
            }
        }
    }

    pub fn to_query_string(&self) -> String {
        serde_html_form::to_string(&self.0).unwrap_or_else(|err| {
            log::error!("Failed to encode query string: {err}");
            String::new()
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SearchParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Read and write access to the address-bar state of the current view.
pub trait Navigator {
    fn search(&self) -> SearchParams;
    /// Replaces the query string, triggering a client-side route update.
    fn navigate(&mut self, params: SearchParams);
    /// Link to the current route with `params` as its query string.
    fn href(&self, params: &SearchParams) -> String;
}

/// Navigator over a fixed route path that records every navigation.
///
/// In the HTTP layer one is built per request from the incoming query string;
/// its final location becomes the redirect target.
#[derive(Clone, Debug)]
pub struct HistoryNavigator {
    path: String,
    current: SearchParams,
    history: Vec<SearchParams>,
}

impl HistoryNavigator {
    pub fn new(path: impl Into<String>, query: &str) -> Self {
        Self {
            path: path.into(),
            current: SearchParams::parse(query),
            history: Vec::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Current path plus query string.
    pub fn location(&self) -> String {
        self.href(&self.current)
    }

    pub fn history(&self) -> &[SearchParams] {
        &self.history
    }

    pub fn navigated(&self) -> bool {
        !self.history.is_empty()
    }
}

impl Navigator for HistoryNavigator {
    fn search(&self) -> SearchParams {
        self.current.clone()
    }

    fn navigate(&mut self, params: SearchParams) {
        self.history.push(params.clone());
        self.current = params;
    }

    fn href(&self, params: &SearchParams) -> String {
        if params.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, params.to_query_string())
        }
    }
}

/// Builds list state from URL parameters, falling back to defaults per field.
pub fn decode(params: &SearchParams, schema: &ListSchema) -> ListFilters {
    let defaults = ListFilters::defaults(schema);

    let page_size = params
        .get(PAGE_SIZE_PARAM)
        .and_then(parse_positive)
        .filter(|size| *size <= schema.max_page_size)
        .unwrap_or(defaults.page_size);

    let page = params
        .get(PAGE_PARAM)
        .and_then(parse_positive)
        .filter(|page| page_in_range(*page, page_size))
        .unwrap_or(defaults.page);

    let sorting = params
        .get(SORT_PARAM)
        .and_then(|raw| decode_sorting(raw, schema))
        .or(defaults.sorting);

    let search_term = params
        .get(SEARCH_PARAM)
        .map(|term| term.trim().to_string())
        .unwrap_or_default();

    let column_filters = schema
        .filters
        .iter()
        .filter_map(|spec| {
            let raw = params.get(&spec.id)?;
            decode_filter_value(spec.kind, raw).map(|value| (spec.id.clone(), value))
        })
        .collect::<ColumnFilters>();

    ListFilters {
        page,
        page_size,
        sorting,
        search_term,
        column_filters,
    }
}

/// Minimal parameter set for `filters`: fields equal to their default are left out.
pub fn encode(filters: &ListFilters, schema: &ListSchema) -> SearchParams {
    let mut params = SearchParams::new();

    if filters.page > 1 {
        params.insert(PAGE_PARAM, filters.page.to_string());
    }
    if filters.page_size != schema.default_page_size {
        params.insert(PAGE_SIZE_PARAM, filters.page_size.to_string());
    }
    if filters.sorting != schema.default_sorting {
        if let Some(sorting) = &filters.sorting {
            params.insert(
                SORT_PARAM,
                format!("{}:{}", sorting.field, sorting.direction.as_url()),
            );
        }
    }
    if !filters.search_term.is_empty() {
        params.insert(SEARCH_PARAM, filters.search_term.clone());
    }
    for filter in filters.column_filters.iter() {
        if schema.filter_spec(&filter.field).is_none() {
            continue;
        }
        if let Some(encoded) = encode_filter_value(&filter.value) {
            params.insert(filter.field.clone(), encoded);
        }
    }

    params
}

/// Replaces the parameters owned by the list in `current`, keeping foreign ones.
pub fn merge(current: &SearchParams, filters: &ListFilters, schema: &ListSchema) -> SearchParams {
    let mut merged = current.clone();
    for key in [PAGE_PARAM, PAGE_SIZE_PARAM, SORT_PARAM, SEARCH_PARAM] {
        merged.remove(key);
    }
    for spec in &schema.filters {
        merged.remove(&spec.id);
    }
    for (key, value) in encode(filters, schema).iter() {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

fn parse_positive(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|value| *value > 0)
}

fn decode_sorting(raw: &str, schema: &ListSchema) -> Option<Sorting> {
    let (field, direction) = raw.split_once(':').unwrap_or((raw, ""));
    let field = field.trim();
    if !schema.is_sortable(field) {
        return None;
    }
    let direction = SortDirection::from_url(direction).unwrap_or_else(|| {
        schema
            .default_sorting
            .as_ref()
            .map(|sorting| sorting.direction)
            .unwrap_or_default()
    });
    Some(Sorting::new(field, direction))
}

fn decode_filter_value(kind: FilterKind, raw: &str) -> Option<FilterValue> {
    let raw = raw.trim();
    match kind {
        FilterKind::Flag => match raw.to_ascii_lowercase().as_str() {
            "true" => Some(FilterValue::Flag(true)),
            "false" => Some(FilterValue::Flag(false)),
            _ => None,
        },
        FilterKind::Text => (!raw.is_empty()).then(|| FilterValue::Text(raw.to_string())),
        FilterKind::OneOf => {
            let mut values: Vec<String> = Vec::new();
            for value in raw.split(',').map(str::trim).filter(|v| !v.is_empty()) {
                if !values.iter().any(|existing| existing == value) {
                    values.push(value.to_string());
                }
            }
            (!values.is_empty()).then_some(FilterValue::OneOf(values))
        }
    }
}

fn encode_filter_value(value: &FilterValue) -> Option<String> {
    match value {
        FilterValue::Flag(flag) => Some(flag.to_string()),
        FilterValue::Text(text) if !text.is_empty() => Some(text.clone()),
        FilterValue::OneOf(values) if !values.is_empty() => Some(values.join(",")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ListSchema {
        ListSchema::new()
            .page_size(10, 100)
            .default_sorting(Sorting::desc("createdAt"))
            .sortable(&["name", "slug"])
            .search_fields(&["name", "slug"])
            .filter("enabled", "enabled", FilterKind::Flag)
            .filter("categories", "facetValueId", FilterKind::OneOf)
    }

    #[test]
    fn decodes_well_formed_params() {
        let params =
            SearchParams::parse("?page=3&pageSize=25&sort=name:asc&q=shoe&enabled=false&categories=1,2,1");

        let filters = decode(&params, &schema());

        assert_eq!(filters.page, 3);
        assert_eq!(filters.page_size, 25);
        assert_eq!(filters.sorting, Some(Sorting::asc("name")));
        assert_eq!(filters.search_term, "shoe");
        assert_eq!(
            filters.column_filters.get("enabled"),
            Some(&FilterValue::Flag(false))
        );
        assert_eq!(
            filters.column_filters.get("categories"),
            Some(&FilterValue::OneOf(vec!["1".into(), "2".into()]))
        );
    }

    #[test]
    fn malformed_params_fall_back_to_defaults() {
        let schema = schema();
        let defaults = ListFilters::defaults(&schema);
        for query in [
            "page=-2&pageSize=0&sort=price:asc&enabled=maybe",
            "page=abc&pageSize=1000&sort=&enabled=",
            "page=0&pageSize=-5&sort=:desc&categories=,,",
            "page=18446744073709551615",
            "page=99999999999999999999999",
            "page=2147483647&pageSize=10",
        ] {
            let filters = decode(&SearchParams::parse(query), &schema);
            assert_eq!(filters, defaults, "query {query}");
        }
    }

    #[test]
    fn unknown_direction_keeps_field_with_default_direction() {
        let filters = decode(&SearchParams::parse("sort=name:sideways"), &schema());
        assert_eq!(filters.sorting, Some(Sorting::desc("name")));
    }

    #[test]
    fn encode_omits_defaults() {
        let schema = schema();
        assert!(encode(&ListFilters::defaults(&schema), &schema).is_empty());

        let filters = ListFilters {
            page: 2,
            search_term: "red shoe".to_string(),
            column_filters: ColumnFilters::new()
                .with("categories", FilterValue::OneOf(vec!["4".into(), "7".into()])),
            ..ListFilters::defaults(&schema)
        };
        let params = encode(&filters, &schema);

        assert_eq!(params.get(PAGE_PARAM), Some("2"));
        assert_eq!(params.get(PAGE_SIZE_PARAM), None);
        assert_eq!(params.get(SORT_PARAM), None);
        assert_eq!(params.get(SEARCH_PARAM), Some("red shoe"));
        assert_eq!(params.get("categories"), Some("4,7"));
        assert_eq!(decode(&params, &schema), filters);
    }

    #[test]
    fn merge_preserves_foreign_params() {
        let schema = schema();
        let current = SearchParams::parse("tab=variants&page=4&enabled=true");
        let merged = merge(&current, &ListFilters::defaults(&schema), &schema);

        assert_eq!(merged.get("tab"), Some("variants"));
        assert_eq!(merged.get(PAGE_PARAM), None);
        assert_eq!(merged.get("enabled"), None);
    }

    #[test]
    fn history_navigator_records_locations() {
        let mut navigator = HistoryNavigator::new("/products", "q=boot");
        assert_eq!(navigator.location(), "/products?q=boot");
        assert!(!navigator.navigated());

        navigator.navigate(SearchParams::from_iter([("q", "red shoe"), ("page", "2")]));

        assert!(navigator.navigated());
        assert_eq!(navigator.location(), "/products?page=2&q=red+shoe");
        navigator.navigate(SearchParams::new());
        assert_eq!(navigator.location(), "/products");
        assert_eq!(navigator.history().len(), 2);
    }
}
