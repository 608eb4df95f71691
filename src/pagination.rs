//! Pagination utilities for ODP API responses.

use serde::{Deserialize, Serialize};

/// A page of results from the ODP API.
///
/// ODP list endpoints page with `offset`/`limit` and return a bare JSON
/// array, so whether more results exist is inferred from a full page.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Serialize")]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Offset of the first item on this page.
    pub offset: u32,
    /// Maximum number of items requested.
    pub limit: u32,
    /// Whether there may be more items after this page.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Create a new page from items and pagination info.
    #[must_use]
    pub fn new(items: Vec<T>, offset: u32, limit: u32) -> Self {
        let has_more = limit > 0 && items.len() >= limit as usize;
        Self {
            items,
            offset,
            limit,
            has_more,
        }
    }

    /// Offset of the page following this one.
    #[must_use]
    pub fn next_offset(&self) -> u32 {
        let len = u32::try_from(self.items.len()).unwrap_or(u32::MAX);
        self.offset.saturating_add(len)
    }

    /// Map the items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            offset: self.offset,
            limit: self.limit,
            has_more: self.has_more,
        }
    }

    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns an iterator over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Query parameters for paginated requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    pub offset: u32,
    pub limit: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: crate::traits::DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationParams {
    #[must_use]
    pub fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_page_has_more() {
        let page: Page<i32> = Page::new(vec![1; 100], 0, 100);
        assert!(page.has_more);
        assert_eq!(page.next_offset(), 100);
    }

    #[test]
    fn test_partial_page_is_last() {
        let page: Page<i32> = Page::new(vec![1; 50], 200, 100);
        assert!(!page.has_more);
        assert_eq!(page.next_offset(), 250);
    }

    #[test]
    fn test_zero_limit_never_has_more() {
        let page: Page<i32> = Page::new(vec![], 0, 0);
        assert!(!page.has_more);
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2, 3], 0, 100);
        let mapped = page.map(|x| x * 2);
        assert_eq!(mapped.items, vec![2, 4, 6]);
        assert_eq!(mapped.offset, 0);
    }

    #[test]
    fn test_params_serialize_as_query() {
        let params = PaginationParams::new(20, 10);
        let value = serde_json::to_value(params).unwrap();
        assert_eq!(value, serde_json::json!({"offset": 20, "limit": 10}));
    }
}
