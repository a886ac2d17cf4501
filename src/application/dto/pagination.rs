use serde::{Deserialize, Serialize};

/// Offset page of results. `page` is 1-based; a page past the end is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: serde::de::DeserializeOwned"
))]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, page_size: u32, total_items: u64) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_items.div_ceil(u64::from(page_size))
        };
        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
        }
    }

    pub const fn has_next(&self) -> bool {
        (self.page as u64) < self.total_pages
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_round_up() {
        let page = Page::new(vec![1, 2], 1, 2, 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());

        let last = Page::<i32>::new(vec![], 4, 2, 5);
        assert!(!last.has_next());
    }
}
