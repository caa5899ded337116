//! Canonical filter/sort/pagination state of one list view.

use crate::list::filters::{
    ColumnFilters, FiltersPatch, ListFilters, ListSchema, SortDirection, Sorting,
};
use crate::list::options::{QueryOptions, to_query_options};
use crate::list::url::{self, Navigator, SEARCH_PARAM, SearchParams};

/// Update accepted by [`ListQueryStateController::set_filters`].
pub enum FilterUpdate {
    Patch(FiltersPatch),
    With(Box<dyn FnOnce(&ListFilters) -> FiltersPatch>),
}

impl FilterUpdate {
    /// Update computed from the current state.
    pub fn with(updater: impl FnOnce(&ListFilters) -> FiltersPatch + 'static) -> Self {
        FilterUpdate::With(Box::new(updater))
    }
}

impl From<FiltersPatch> for FilterUpdate {
    fn from(patch: FiltersPatch) -> Self {
        FilterUpdate::Patch(patch)
    }
}

/// Owns list state for one view and keeps it in sync with the URL.
pub struct ListQueryStateController<N> {
    schema: ListSchema,
    filters: ListFilters,
    navigator: N,
}

impl<N: Navigator> ListQueryStateController<N> {
    /// Merges URL state over the schema defaults.
    pub fn initialize(url_state: &SearchParams, schema: &ListSchema) -> ListFilters {
        url::decode(url_state, schema)
    }

    /// Builds the controller from the navigator's current URL.
    pub fn mount(schema: ListSchema, navigator: N) -> Self {
        let filters = Self::initialize(&navigator.search(), &schema);
        Self {
            schema,
            filters,
            navigator,
        }
    }

    pub fn filters(&self) -> &ListFilters {
        &self.filters
    }

    pub fn schema(&self) -> &ListSchema {
        &self.schema
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn into_navigator(self) -> N {
        self.navigator
    }

    /// Applies `update` and rewrites the URL. Returns whether the state changed.
    ///
    /// The page goes back to 1 whenever the search term, sorting or a column
    /// filter changes; a page size change alone keeps the current page.
    pub fn set_filters(&mut self, update: impl Into<FilterUpdate>) -> bool {
        let next = self.resolve(update.into());
        let changed = next != self.filters;

        let current = self.navigator.search();
        let params = url::merge(&current, &next, &self.schema);
        if params != current {
            self.navigator.navigate(params);
        }

        if changed {
            log::debug!(
                "List state changed: page {} size {} search {:?}",
                next.page,
                next.page_size,
                next.search_term
            );
        }
        self.filters = next;
        changed
    }

    /// Remote query for the current state.
    pub fn query_options(&self) -> QueryOptions {
        to_query_options(&self.filters, &self.schema)
    }

    /// Resets one column filter, or the search term for the search parameter.
    pub fn clear_filter(&mut self, field_id: &str) -> bool {
        let patch = if field_id == SEARCH_PARAM {
            FiltersPatch::new().search("")
        } else {
            FiltersPatch::new().clear_filter(field_id)
        };
        self.set_filters(patch.page(1))
    }

    /// Resets the search term and every column filter. Sorting and page size stay.
    pub fn clear_all(&mut self) -> bool {
        self.set_filters(
            FiltersPatch::new()
                .search("")
                .column_filters(ColumnFilters::new())
                .page(1),
        )
    }

    pub fn change_page(&mut self, page: usize, page_size: usize) -> bool {
        self.set_filters(FiltersPatch::new().page(page).page_size(page_size))
    }

    pub fn change_sorting(&mut self, sorting: Option<Sorting>) -> bool {
        self.set_filters(FiltersPatch::new().sorting(sorting).page(1))
    }

    pub fn change_column_filters(&mut self, filters: ColumnFilters) -> bool {
        self.set_filters(FiltersPatch::new().column_filters(filters).page(1))
    }

    pub fn change_search(&mut self, term: impl Into<String>) -> bool {
        self.set_filters(FiltersPatch::new().search(term))
    }

    /// URL the view would navigate to after `update`, without applying it.
    pub fn href_for(&self, update: impl Into<FilterUpdate>) -> String {
        let next = self.resolve(update.into());
        let params = url::merge(&self.navigator.search(), &next, &self.schema);
        self.navigator.href(&params)
    }

    /// Header link for a sortable column: toggles direction when already sorted by it.
    pub fn sort_href(&self, field: &str) -> String {
        let direction = match &self.filters.sorting {
            Some(sorting) if sorting.field == field => sorting.direction.toggled(),
            _ => SortDirection::Asc,
        };
        self.href_for(FiltersPatch::new().sorting(Some(Sorting::new(field, direction))))
    }

    fn resolve(&self, update: FilterUpdate) -> ListFilters {
        let patch = match update {
            FilterUpdate::Patch(patch) => patch,
            FilterUpdate::With(updater) => updater(&self.filters),
        };
        let mut next = patch.apply(&self.filters).normalized(&self.schema);
        if next.query_changed(&self.filters) {
            next.page = 1;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::filters::{FilterKind, FilterValue};
    use crate::list::url::HistoryNavigator;

    fn schema() -> ListSchema {
        ListSchema::new()
            .page_size(10, 100)
            .default_sorting(Sorting::desc("createdAt"))
            .sortable(&["name"])
            .search_fields(&["name"])
            .filter("status", "enabled", FilterKind::Flag)
    }

    fn controller(query: &str) -> ListQueryStateController<HistoryNavigator> {
        ListQueryStateController::mount(schema(), HistoryNavigator::new("/products", query))
    }

    #[test]
    fn mount_reads_url_state() {
        let controller = controller("page=3&q=boot");
        assert_eq!(controller.filters().page, 3);
        assert_eq!(controller.filters().search_term, "boot");
    }

    #[test]
    fn search_change_resets_page() {
        let mut controller = controller("page=4");
        controller.change_search("shoe");
        assert_eq!(controller.filters().page, 1);
        assert_eq!(controller.navigator().location(), "/products?q=shoe");
    }

    #[test]
    fn page_size_change_keeps_page() {
        let mut controller = controller("page=4");
        controller.set_filters(FiltersPatch::new().page_size(20));
        assert_eq!(controller.filters().page, 4);
        assert_eq!(controller.filters().page_size, 20);
    }

    #[test]
    fn explicit_page_is_overridden_when_query_changes() {
        let mut controller = controller("");
        controller.set_filters(FiltersPatch::new().page(5).sorting(Some(Sorting::asc("name"))));
        assert_eq!(controller.filters().page, 1);
        assert_eq!(controller.navigator().location(), "/products?sort=name%3Aasc");
    }

    #[test]
    fn filter_then_page_size_leaves_page_at_one() {
        let mut controller = controller("");
        controller.set_filters(
            FiltersPatch::new()
                .filter("status", FilterValue::Flag(true))
                .page(1),
        );
        controller.set_filters(FiltersPatch::new().page_size(20));

        assert_eq!(controller.filters().page, 1);
        assert_eq!(controller.filters().page_size, 20);
        assert_eq!(
            controller.navigator().location(),
            "/products?pageSize=20&status=true"
        );
    }

    #[test]
    fn updater_function_sees_current_state() {
        let mut controller = controller("page=2");
        controller.set_filters(FilterUpdate::with(|current| {
            FiltersPatch::new().page(current.page + 1)
        }));
        assert_eq!(controller.filters().page, 3);
    }

    #[test]
    fn reapplying_same_patch_is_idempotent() {
        let mut controller = controller("");
        let patch = FiltersPatch::new().search("shoe");
        assert!(controller.set_filters(patch.clone()));
        assert!(!controller.set_filters(patch));
        assert_eq!(controller.navigator().history().len(), 1);
    }

    #[test]
    fn clear_all_drops_filter_from_query_options() {
        let mut controller = controller("q=shoe&status=false&page=3&sort=name:asc");
        assert!(controller.query_options().filter.is_some());

        controller.clear_all();

        let options = controller.query_options();
        assert!(options.filter.is_none());
        assert!(options.to_variables().get("filter").is_none());
        assert_eq!(controller.filters().page, 1);
        assert_eq!(controller.filters().sorting, Some(Sorting::asc("name")));
    }

    #[test]
    fn clear_filter_handles_search_param() {
        let mut controller = controller("q=shoe&status=true");
        controller.clear_filter(SEARCH_PARAM);
        assert!(controller.filters().search_term.is_empty());
        controller.clear_filter("status");
        assert!(controller.filters().column_filters.is_empty());
        assert_eq!(controller.navigator().location(), "/products");
    }

    #[test]
    fn page_beyond_last_page_is_not_clamped() {
        let mut controller = controller("page=9");
        controller.set_filters(FiltersPatch::new().page_size(100));
        assert_eq!(controller.filters().page, 9);
        assert_eq!(controller.query_options().skip, 800);
    }

    #[test]
    fn href_for_does_not_navigate() {
        let controller = controller("q=shoe");
        assert_eq!(
            controller.href_for(FiltersPatch::new().page(2)),
            "/products?page=2&q=shoe"
        );
        assert_eq!(controller.sort_href("name"), "/products?q=shoe&sort=name%3Aasc");
        assert!(!controller.navigator().navigated());
        assert_eq!(
            controller.filters().sorting.as_ref().map(|s| s.direction),
            Some(SortDirection::Desc)
        );
    }
}
