//! List view state: pagination, sorting, search and column filters.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Token used by the host API (`ASC`/`DESC`).
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Token used in the address bar (`asc`/`desc`).
    pub fn as_url(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn from_url(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sorting {
    pub field: String,
    pub direction: SortDirection,
}

impl Sorting {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// Value of one active column filter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Flag(bool),
    Text(String),
    OneOf(Vec<String>),
}

impl FilterValue {
    /// Empty text or an empty choice list count as "no filter".
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Flag(_) => false,
            FilterValue::Text(text) => text.trim().is_empty(),
            FilterValue::OneOf(values) => values.iter().all(|v| v.trim().is_empty()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub field: String,
    pub value: FilterValue,
}

/// Ordered column filters with unique field ids.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilters(Vec<ColumnFilter>);

impl ColumnFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: FilterValue) -> Self {
        self.set(field, value);
        self
    }

    /// Replaces the value in place, appends a new field, or removes it when `value` is empty.
    pub fn set(&mut self, field: impl Into<String>, value: FilterValue) {
        let field = field.into();
        if value.is_empty() {
            self.remove(&field);
            return;
        }
        match self.0.iter_mut().find(|f| f.field == field) {
            Some(existing) => existing.value = value,
            None => self.0.push(ColumnFilter { field, value }),
        }
    }

    pub fn remove(&mut self, field: &str) -> Option<FilterValue> {
        let index = self.0.iter().position(|f| f.field == field)?;
        Some(self.0.remove(index).value)
    }

    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.0.iter().find(|f| f.field == field).map(|f| &f.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnFilter> {
        self.0.iter()
    }

    pub fn retain(&mut self, keep: impl FnMut(&ColumnFilter) -> bool) {
        self.0.retain(keep);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Same field/value pairs regardless of order.
    pub fn same_values(&self, other: &ColumnFilters) -> bool {
        self.len() == other.len()
            && self
                .0
                .iter()
                .all(|f| other.get(&f.field) == Some(&f.value))
    }
}

impl<F: Into<String>> FromIterator<(F, FilterValue)> for ColumnFilters {
    fn from_iter<I: IntoIterator<Item = (F, FilterValue)>>(iter: I) -> Self {
        let mut filters = ColumnFilters::new();
        for (field, value) in iter {
            filters.set(field, value);
        }
        filters
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Flag,
    Text,
    OneOf,
}

/// A column filter a list view accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterSpec {
    /// Filter id, also the query-string parameter name.
    pub id: String,
    /// Field name on the remote side.
    pub predicate_field: String,
    pub kind: FilterKind,
}

/// Defaults and URL vocabulary of one list view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListSchema {
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub default_sorting: Option<Sorting>,
    pub sortable_fields: Vec<String>,
    pub search_fields: Vec<String>,
    pub filters: Vec<FilterSpec>,
}

impl Default for ListSchema {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            default_sorting: None,
            sortable_fields: Vec::new(),
            search_fields: Vec::new(),
            filters: Vec::new(),
        }
    }
}

impl ListSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_size(mut self, default: usize, max: usize) -> Self {
        self.default_page_size = default.max(1);
        self.max_page_size = max.max(self.default_page_size);
        self
    }

    /// Sets the default sorting; its field becomes sortable.
    pub fn default_sorting(mut self, sorting: Sorting) -> Self {
        if !self.is_sortable(&sorting.field) {
            self.sortable_fields.push(sorting.field.clone());
        }
        self.default_sorting = Some(sorting);
        self
    }

    pub fn sortable(mut self, fields: &[&str]) -> Self {
        for field in fields {
            if !self.is_sortable(field) {
                self.sortable_fields.push((*field).to_string());
            }
        }
        self
    }

    pub fn search_fields(mut self, fields: &[&str]) -> Self {
        self.search_fields = fields.iter().map(|f| (*f).to_string()).collect();
        self
    }

    pub fn filter(
        mut self,
        id: impl Into<String>,
        predicate_field: impl Into<String>,
        kind: FilterKind,
    ) -> Self {
        self.filters.push(FilterSpec {
            id: id.into(),
            predicate_field: predicate_field.into(),
            kind,
        });
        self
    }

    pub fn is_sortable(&self, field: &str) -> bool {
        self.sortable_fields.iter().any(|f| f == field)
    }

    pub fn filter_spec(&self, id: &str) -> Option<&FilterSpec> {
        self.filters.iter().find(|spec| spec.id == id)
    }
}

/// Largest offset the host accepts; GraphQL `Int` is 32-bit.
pub const MAX_SKIP: usize = i32::MAX as usize;

/// `page` is at least 1 and its offset fits the host's `skip` argument.
pub fn page_in_range(page: usize, page_size: usize) -> bool {
    page > 0
        && (page - 1)
            .checked_mul(page_size)
            .is_some_and(|skip| skip <= MAX_SKIP)
}

/// Canonical state of one list view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListFilters {
    pub page: usize,
    pub page_size: usize,
    pub sorting: Option<Sorting>,
    pub search_term: String,
    pub column_filters: ColumnFilters,
}

impl ListFilters {
    pub fn defaults(schema: &ListSchema) -> Self {
        Self {
            page: 1,
            page_size: schema.default_page_size,
            sorting: schema.default_sorting.clone(),
            search_term: String::new(),
            column_filters: ColumnFilters::new(),
        }
    }

    /// Coerces every field into the range the schema allows.
    pub fn normalized(mut self, schema: &ListSchema) -> Self {
        if self.page_size == 0 || self.page_size > schema.max_page_size {
            self.page_size = schema.default_page_size;
        }
        if !page_in_range(self.page, self.page_size) {
            self.page = 1;
        }
        let sortable = self
            .sorting
            .as_ref()
            .is_some_and(|s| schema.is_sortable(&s.field));
        if !sortable {
            self.sorting = schema.default_sorting.clone();
        }
        self.search_term = self.search_term.trim().to_string();
        self.column_filters
            .retain(|f| schema.filter_spec(&f.field).is_some() && !f.value.is_empty());
        self
    }

    pub fn has_active_filters(&self) -> bool {
        !self.search_term.is_empty() || !self.column_filters.is_empty()
    }

    /// Search term, sorting or column filters differ from `other`.
    pub fn query_changed(&self, other: &ListFilters) -> bool {
        self.search_term != other.search_term
            || self.sorting != other.sorting
            || !self.column_filters.same_values(&other.column_filters)
    }
}

/// Partial update of [`ListFilters`]; unset fields keep their current value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FiltersPatch {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub sorting: Option<Option<Sorting>>,
    pub search_term: Option<String>,
    pub column_filters: Option<ColumnFilters>,
    /// Individual filter upserts (`Some`) or removals (`None`), applied after `column_filters`.
    pub filter_updates: Vec<(String, Option<FilterValue>)>,
}

impl FiltersPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn sorting(mut self, sorting: Option<Sorting>) -> Self {
        self.sorting = Some(sorting);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn column_filters(mut self, filters: ColumnFilters) -> Self {
        self.column_filters = Some(filters);
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: FilterValue) -> Self {
        self.filter_updates.push((field.into(), Some(value)));
        self
    }

    pub fn clear_filter(mut self, field: impl Into<String>) -> Self {
        self.filter_updates.push((field.into(), None));
        self
    }

    /// Applies the patch verbatim, without normalization or page reset.
    pub fn apply(&self, current: &ListFilters) -> ListFilters {
        let mut next = current.clone();
        if let Some(page) = self.page {
            next.page = page;
        }
        if let Some(page_size) = self.page_size {
            next.page_size = page_size;
        }
        if let Some(sorting) = &self.sorting {
            next.sorting = sorting.clone();
        }
        if let Some(term) = &self.search_term {
            next.search_term = term.clone();
        }
        if let Some(filters) = &self.column_filters {
            next.column_filters = filters.clone();
        }
        for (field, value) in &self.filter_updates {
            match value {
                Some(value) => next.column_filters.set(field.clone(), value.clone()),
                None => {
                    next.column_filters.remove(field);
                }
            }
        }
        next
    }
}
