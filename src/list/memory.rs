//! Client-side filtering, sorting and pagination over an already fetched list.

use std::cmp::Ordering;

use crate::list::filters::SortDirection;
use crate::list::options::QueryOptions;
use crate::list::page::PageResult;
use crate::list::predicate::Queryable;

/// Evaluates `options` against `items` the way the remote endpoint would.
///
/// Sorting is stable; a sort field the records do not expose leaves the
/// source order untouched. `total_items` counts the filtered set before
/// slicing, and a page past the end yields no items.
pub fn apply_in_memory<T>(items: &[T], options: &QueryOptions) -> PageResult<T>
where
    T: Queryable + Clone,
{
    let mut filtered: Vec<&T> = match &options.filter {
        Some(predicate) => items.iter().filter(|item| predicate.matches(*item)).collect(),
        None => items.iter().collect(),
    };

    if !options.sort.is_empty() {
        filtered.sort_by(|a, b| {
            options
                .sort
                .iter()
                .map(|(field, direction)| {
                    let ordering = a.field(field).cmp(&b.field(field));
                    match direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                })
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }

    let total_items = filtered.len();
    let items = filtered
        .into_iter()
        .skip(options.skip)
        .take(options.take)
        .cloned()
        .collect();

    PageResult::new(items, total_items)
}
