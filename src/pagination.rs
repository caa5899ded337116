use serde::Serialize;

/// Page numbers to show around the current page; `None` marks an ellipsis.
fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = left_edge.saturating_add(1).min(last_page.saturating_add(1));
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = current_page
        .saturating_add(right_current)
        .saturating_add(1)
        .min(last_page.saturating_add(1));

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// One entry of the pager; an ellipsis has neither number nor link.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PageLink {
    pub number: Option<usize>,
    pub href: Option<String>,
    pub current: bool,
}

/// Pager of a list view with ready-made links for every entry.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub total_pages: usize,
    pub links: Vec<PageLink>,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

impl Pagination {
    /// Builds the pager; `href` produces the URL of a page number.
    ///
    /// The current page is kept even when it lies past the last page, so the
    /// view can offer a way back instead of silently clamping.
    pub fn new(current_page: usize, total_pages: usize, href: impl Fn(usize) -> String) -> Self {
        let current_page = if current_page == 0 { 1 } else { current_page };

        let links = get_pages(total_pages, current_page, 2, 2, 4, 2)
            .into_iter()
            .map(|page| PageLink {
                number: page,
                href: page.map(&href),
                current: page == Some(current_page),
            })
            .collect();

        let prev_href = (current_page > 1).then(|| href((current_page - 1).min(total_pages.max(1))));
        let next_href = (current_page < total_pages).then(|| href(current_page.saturating_add(1)));

        Self {
            page: current_page,
            total_pages,
            links,
            prev_href,
            next_href,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn href(page: usize) -> String {
        format!("/products?page={page}")
    }

    #[test]
    fn no_pages_without_items() {
        let pagination = Pagination::new(1, 0, href);
        assert!(pagination.links.is_empty());
        assert!(pagination.prev_href.is_none());
        assert!(pagination.next_href.is_none());
    }

    #[test]
    fn long_ranges_collapse_into_ellipses() {
        let pages = get_pages(20, 10, 2, 2, 4, 2);
        assert_eq!(
            pages,
            vec![
                Some(1),
                Some(2),
                None,
                Some(8),
                Some(9),
                Some(10),
                Some(11),
                Some(12),
                Some(13),
                Some(14),
                None,
                Some(19),
                Some(20),
            ]
        );
    }

    #[test]
    fn links_mark_current_page() {
        let pagination = Pagination::new(2, 3, href);
        let current: Vec<_> = pagination
            .links
            .iter()
            .filter(|link| link.current)
            .filter_map(|link| link.number)
            .collect();
        assert_eq!(current, vec![2]);
        assert_eq!(pagination.prev_href.as_deref(), Some("/products?page=1"));
        assert_eq!(pagination.next_href.as_deref(), Some("/products?page=3"));
    }

    #[test]
    fn page_past_the_end_links_back_to_last_page() {
        let pagination = Pagination::new(7, 3, href);
        assert_eq!(pagination.page, 7);
        assert_eq!(pagination.prev_href.as_deref(), Some("/products?page=3"));
        assert!(pagination.next_href.is_none());
    }

    #[test]
    fn huge_current_page_does_not_overflow() {
        let pagination = Pagination::new(usize::MAX, 3, href);
        assert_eq!(pagination.prev_href.as_deref(), Some("/products?page=3"));
        assert!(pagination.links.iter().all(|link| !link.current));
    }
}
