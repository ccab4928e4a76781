// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Page-number pagination with `page` and `page_size` query parameters.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// A resolved page: which rows to fetch and how to link neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: usize,
    pub size: usize,
    pub count: usize,
    pub num_pages: usize,
}

impl PageWindow {
    pub fn offset(&self) -> usize {
        (self.number - 1) * self.size
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

/// Unparsable or non-positive sizes fall back to the default; large ones clamp.
pub fn page_size(raw: Option<&str>) -> usize {
    match raw.and_then(|s| s.trim().parse::<i64>().ok()) {
        Some(n) if n > 0 => (n as usize).min(MAX_PAGE_SIZE),
        _ => DEFAULT_PAGE_SIZE,
    }
}

/// Resolves `page` against `count` rows. Page 1 always exists, even when empty.
pub fn resolve(query: &PageQuery, count: usize) -> Result<PageWindow, ApiError> {
    let size = page_size(query.page_size.as_deref());
    let num_pages = count.div_ceil(size).max(1);
    let number = match query.page.as_deref().map(str::trim) {
        None | Some("") => 1,
        Some("last") => num_pages,
        Some(raw) => raw.parse::<usize>().map_err(|_| ApiError::InvalidPage)?,
    };
    if number == 0 || number > num_pages {
        return Err(ApiError::InvalidPage);
    }
    Ok(PageWindow {
        number,
        size,
        count,
        num_pages,
    })
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// `base` is the absolute URL of the list endpoint without a query string.
    pub fn new(window: &PageWindow, query: &PageQuery, base: &str, results: Vec<T>) -> Self {
        let next = window
            .has_next()
            .then(|| page_link(base, query, Some(window.number + 1)));
        let previous = window.has_previous().then(|| {
            let target = window.number - 1;
            page_link(base, query, (target > 1).then_some(target))
        });
        Page {
            count: window.count,
            next,
            previous,
            results,
        }
    }
}

/// Link to `page`, keeping an explicit `page_size`. `None` drops the page
/// parameter, which is how the first page is addressed.
fn page_link(base: &str, query: &PageQuery, page: Option<usize>) -> String {
    let mut params = Vec::new();
    if let Some(p) = page {
        params.push(format!("page={}", p));
    }
    if let Some(size) = query.page_size.as_deref() {
        params.push(format!("page_size={}", size.trim()));
    }
    if params.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, params.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(page: Option<&str>, size: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(String::from),
            page_size: size.map(String::from),
        }
    }

    #[test]
    fn page_size_defaults_and_clamps() {
        assert_eq!(page_size(None), 20);
        assert_eq!(page_size(Some("abc")), 20);
        assert_eq!(page_size(Some("0")), 20);
        assert_eq!(page_size(Some("-5")), 20);
        assert_eq!(page_size(Some("7")), 7);
        assert_eq!(page_size(Some("500")), 100);
    }

    #[test]
    fn out_of_range_pages_are_invalid() {
        assert!(matches!(resolve(&q(Some("4"), None), 45), Err(ApiError::InvalidPage)));
        assert!(matches!(resolve(&q(Some("0"), None), 45), Err(ApiError::InvalidPage)));
        assert!(matches!(resolve(&q(Some("two"), None), 45), Err(ApiError::InvalidPage)));
        let w = resolve(&q(Some("3"), None), 45).unwrap();
        assert_eq!(w.offset(), 40);
        assert!(!w.has_next());
    }

    #[test]
    fn empty_table_still_has_first_page() {
        let w = resolve(&q(None, None), 0).unwrap();
        assert_eq!((w.number, w.num_pages), (1, 1));
        assert!(matches!(resolve(&q(Some("2"), None), 0), Err(ApiError::InvalidPage)));
    }

    #[test]
    fn last_resolves_to_final_page() {
        let w = resolve(&q(Some("last"), Some("10")), 45).unwrap();
        assert_eq!(w.number, 5);
    }

    #[test]
    fn links_drop_page_for_first_and_keep_page_size() {
        let query = q(Some("2"), Some("10"));
        let w = resolve(&query, 45).unwrap();
        let page: Page<u8> = Page::new(&w, &query, "http://h/campaign/", vec![]);
        assert_eq!(page.next.as_deref(), Some("http://h/campaign/?page=3&page_size=10"));
        assert_eq!(page.previous.as_deref(), Some("http://h/campaign/?page_size=10"));

        let query = q(Some("3"), None);
        let w = resolve(&query, 45).unwrap();
        let page: Page<u8> = Page::new(&w, &query, "http://h/campaign/", vec![]);
        assert_eq!(page.next, None);
        assert_eq!(page.previous.as_deref(), Some("http://h/campaign/?page=2"));
    }
}
