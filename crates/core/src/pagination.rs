//! Fixed-size pagination used by the dashboard and admin lists.

use serde::{Deserialize, Serialize};

/// Items per page in admin and dashboard lists.
pub const PAGE_SIZE: u32 = 10;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Page request with the standard page size. Page 0 is treated as page 1.
    #[must_use]
    pub fn new(page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: PAGE_SIZE,
        }
    }

    /// Clamp the page to the last page that exists for `total` items.
    #[must_use]
    pub fn clamped(self, total: u64) -> Self {
        Self {
            page: self.page.min(total_pages(total, self.per_page)).max(1),
            ..self
        }
    }

    /// Row offset for SQL `OFFSET`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }

    /// Row limit for SQL `LIMIT`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

/// Number of pages needed for `total` items (at least 1).
#[must_use]
pub fn total_pages(total: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page.max(1));
    let pages = total.div_ceil(per_page).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Wrap already-fetched items for a (clamped) request.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages: total_pages(total, request.per_page),
        }
    }
}

/// Turn a search box value into a SQL `ILIKE` pattern, escaping wildcards.
#[must_use]
pub fn ilike_pattern(search: Option<&str>) -> String {
    let term = search.map(str::trim).unwrap_or_default();
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets() {
        assert_eq!(PageRequest::new(None).offset(), 0);
        assert_eq!(PageRequest::new(Some(0)).page, 1);
        assert_eq!(PageRequest::new(Some(3)).offset(), 20);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[test]
    fn test_clamp_to_last_page() {
        assert_eq!(PageRequest::new(Some(9)).clamped(25).page, 3);
        assert_eq!(PageRequest::new(Some(9)).clamped(0).page, 1);
    }

    #[test]
    fn test_ilike_pattern_escapes() {
        assert_eq!(ilike_pattern(None), "%%");
        assert_eq!(ilike_pattern(Some(" 50%_off ")), "%50\\%\\_off%");
    }
}
