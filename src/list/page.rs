use serde::{Deserialize, Serialize};

/// One page of a remote list together with the unpaginated total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total_items: usize,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, total_items: usize) -> Self {
        Self { items, total_items }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    pub fn total_pages(&self, page_size: usize) -> usize {
        self.total_items.div_ceil(page_size.max(1))
    }

    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
        }
    }
}

impl<T> Default for PageResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}
