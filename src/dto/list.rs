use std::collections::BTreeMap;

use serde::Serialize;

use crate::list::controller::ListQueryStateController;
use crate::list::filters::{FilterValue, FiltersPatch};
use crate::list::page::PageResult;
use crate::list::url::{HistoryNavigator, SEARCH_PARAM};
use crate::pagination::Pagination;

/// Link of a sortable column header.
#[derive(Debug, Serialize)]
pub struct SortLink {
    pub href: String,
    /// `asc`/`desc` when the table is currently sorted by this column.
    pub direction: Option<&'static str>,
}

/// Chip describing one applied filter, with the link that removes it.
#[derive(Debug, Serialize)]
pub struct ActiveFilter {
    pub id: String,
    pub values: Vec<String>,
    pub clear_href: String,
}

/// Everything a table template needs to render one list view.
#[derive(Debug, Serialize)]
pub struct ListView<T> {
    pub items: Vec<T>,
    pub total_items: usize,
    pub page_size: usize,
    pub pagination: Pagination,
    pub search_term: String,
    /// Submitted values per filter id, used to pre-fill the filter form.
    pub filter_values: BTreeMap<String, Vec<String>>,
    pub sort_links: BTreeMap<String, SortLink>,
    pub active_filters: Vec<ActiveFilter>,
    pub clear_all_href: Option<String>,
    /// Banner shown when the list could not be refreshed.
    pub error: Option<String>,
    pub location: String,
}

impl<T> ListView<T> {
    pub fn new(
        controller: &ListQueryStateController<HistoryNavigator>,
        page: PageResult<T>,
        error: Option<String>,
    ) -> Self {
        let filters = controller.filters();
        let schema = controller.schema();

        let pagination = Pagination::new(
            filters.page,
            page.total_pages(filters.page_size),
            |number| controller.href_for(FiltersPatch::new().page(number)),
        );

        let sort_links = schema
            .sortable_fields
            .iter()
            .map(|field| {
                let direction = filters
                    .sorting
                    .as_ref()
                    .filter(|sorting| &sorting.field == field)
                    .map(|sorting| sorting.direction.as_url());
                let link = SortLink {
                    href: controller.sort_href(field),
                    direction,
                };
                (field.clone(), link)
            })
            .collect();

        let filter_values: BTreeMap<String, Vec<String>> = filters
            .column_filters
            .iter()
            .map(|filter| (filter.field.clone(), filter_value_strings(&filter.value)))
            .collect();

        let mut active_filters = Vec::new();
        if !filters.search_term.is_empty() {
            active_filters.push(ActiveFilter {
                id: SEARCH_PARAM.to_string(),
                values: vec![filters.search_term.clone()],
                clear_href: controller.href_for(FiltersPatch::new().search("").page(1)),
            });
        }
        for (id, values) in &filter_values {
            active_filters.push(ActiveFilter {
                id: id.clone(),
                values: values.clone(),
                clear_href: controller.href_for(FiltersPatch::new().clear_filter(id).page(1)),
            });
        }

        let clear_all_href = filters.has_active_filters().then(|| {
            controller.href_for(
                FiltersPatch::new()
                    .search("")
                    .column_filters(Default::default())
                    .page(1),
            )
        });

        Self {
            items: page.items,
            total_items: page.total_items,
            page_size: filters.page_size,
            pagination,
            search_term: filters.search_term.clone(),
            filter_values,
            sort_links,
            active_filters,
            clear_all_href,
            error,
            location: controller.navigator().location(),
        }
    }

    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> ListView<U> {
        ListView {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            page_size: self.page_size,
            pagination: self.pagination,
            search_term: self.search_term,
            filter_values: self.filter_values,
            sort_links: self.sort_links,
            active_filters: self.active_filters,
            clear_all_href: self.clear_all_href,
            error: self.error,
            location: self.location,
        }
    }
}

fn filter_value_strings(value: &FilterValue) -> Vec<String> {
    match value {
        FilterValue::Flag(flag) => vec![flag.to_string()],
        FilterValue::Text(text) => vec![text.clone()],
        FilterValue::OneOf(values) => values.clone(),
    }
}
