//! Page-number pagination shared by every list view.

use serde::Serialize;

use crate::error::DomainError;

/// Default number of posts on a list page.
pub const DEFAULT_PER_PAGE: u64 = 10;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page,
            per_page: per_page.max(1),
        }
    }

    /// First page with the default page size.
    pub fn first() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }

    /// Number of rows to skip before this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.per_page
    }

    /// Total number of pages for `total_items`. An empty list still has one page.
    pub fn total_pages(&self, total_items: u64) -> u64 {
        total_items.div_ceil(self.per_page).max(1)
    }

    /// Reject page 0 and pages past the end of the list.
    pub fn check(&self, total_items: u64) -> Result<(), DomainError> {
        if self.page == 0 || self.page > self.total_pages(total_items) {
            return Err(DomainError::PageOutOfRange(self.page));
        }
        Ok(())
    }

    /// Cut one page out of an already ordered list.
    pub fn slice<T>(&self, items: Vec<T>) -> Result<Page<T>, DomainError> {
        let total_items = items.len() as u64;
        self.check(total_items)?;

        let items = items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.per_page as usize)
            .collect();

        Ok(Page::new(items, *self, total_items))
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// One page of an ordered collection.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total_items,
            total_pages: request.total_pages(total_items),
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_has_one_page() {
        let request = PageRequest::first();
        let page = request.slice(Vec::<u32>::new()).unwrap();

        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_slice_returns_at_most_per_page_items() {
        let items: Vec<u32> = (0..25).collect();

        let second = PageRequest::new(2, 10).slice(items.clone()).unwrap();
        assert_eq!(second.items, (10..20).collect::<Vec<_>>());
        assert_eq!(second.total_pages, 3);
        assert!(second.has_next());
        assert!(second.has_previous());

        let last = PageRequest::new(3, 10).slice(items).unwrap();
        assert_eq!(last.items, vec![20, 21, 22, 23, 24]);
        assert!(!last.has_next());
    }

    #[test]
    fn test_out_of_range_pages_are_rejected() {
        let items: Vec<u32> = (0..10).collect();

        assert!(matches!(
            PageRequest::new(2, 10).slice(items.clone()),
            Err(DomainError::PageOutOfRange(2))
        ));
        assert!(matches!(
            PageRequest::new(0, 10).slice(items),
            Err(DomainError::PageOutOfRange(0))
        ));
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(4, 10).offset(), 30);
    }
}
