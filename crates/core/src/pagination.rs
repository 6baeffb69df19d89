//! Page arithmetic for the legacy collection readers.
//!
//! Pages are 1-indexed and read in `_id` descending order. A reader stops
//! once the requested page reaches the total page count.

use serde::Serialize;

/// Page size used by the migration readers.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Page size used by the Bmall relationship scan.
pub const RELATIONSHIP_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn first(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
            ..self
        }
    }

    /// Documents to skip before this page.
    pub fn skip(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

/// Number of pages needed for `total` documents.
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    let size = u64::from(page_size.max(1));
    total.div_ceil(size)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u64,
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        let total_pages = total_pages(total, request.page_size);
        Self {
            items,
            page: request.page,
            total_pages,
            has_next: u64::from(request.page) < total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            total_pages: self.total_pages,
            has_next: self.has_next,
        }
    }
}
