//! Page/limit/skip composition for listing and search queries.
//!
//! Every paginated read in the system goes through the same two steps:
//! normalize the raw page/limit inputs into a [`PageWindow`], run the
//! filtered find + count pair, then [`Paginated::assemble`] the slice with
//! metadata computed from the *filtered* count. Requesting a page past the
//! end of a non-empty result set is not an error; callers detect it with
//! [`Paginated::is_out_of_range`] and answer with the computed totals and
//! an empty data sequence.

use serde::Serialize;

/// Default page when the request carries none (or an invalid one).
pub const DEFAULT_PAGE: u64 = 1;

/// Default page size when the request carries none (or an invalid one).
pub const DEFAULT_LIMIT: u64 = 10;

/// A normalized pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number.
    pub page: u64,
    /// Page size.
    pub limit: u64,
}

impl PageWindow {
    /// Normalize raw page/limit inputs.
    ///
    /// Missing values and values below 1 fall back to [`DEFAULT_PAGE`] and
    /// [`DEFAULT_LIMIT`] respectively.
    #[must_use]
    pub fn normalize(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p as u64,
            _ => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(l) if l >= 1 => l as u64,
            _ => DEFAULT_LIMIT,
        };
        Self { page, limit }
    }

    /// Number of records to skip: `(page - 1) * limit`.
    #[must_use]
    pub const fn skip(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of results plus metadata derived from the filtered total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// Records on this page.
    pub data: Vec<T>,
    /// The requested (1-based) page.
    pub current_page: u64,
    /// Total pages for the filtered result set.
    pub total_pages: u64,
    /// Total records in the filtered result set.
    pub total_results: u64,
}

impl<T> Paginated<T> {
    /// Assemble a page from a data slice, its window and the filtered count.
    #[must_use]
    pub fn assemble(data: Vec<T>, window: PageWindow, total_results: u64) -> Self {
        Self {
            data,
            current_page: window.page,
            total_pages: total_pages(total_results, window.limit),
            total_results,
        }
    }

    /// Whether the requested page lies past the end of a non-empty result
    /// set. An empty result set accepts any page.
    #[must_use]
    pub const fn is_out_of_range(&self) -> bool {
        self.total_pages != 0 && self.current_page > self.total_pages
    }

    /// Map the records of this page, keeping the metadata.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}

/// `ceil(total / limit)`; zero when the filtered set is empty.
#[must_use]
pub const fn total_pages(total_results: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    total_results.div_ceil(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_defaults() {
        let w = PageWindow::normalize(None, None);
        assert_eq!(w.page, 1);
        assert_eq!(w.limit, 10);
        assert_eq!(w.skip(), 0);
    }

    #[test]
    fn test_normalize_rejects_sub_one_inputs() {
        let w = PageWindow::normalize(Some(0), Some(-3));
        assert_eq!(w.page, 1);
        assert_eq!(w.limit, 10);
    }

    #[test]
    fn test_skip_is_page_minus_one_times_limit() {
        let w = PageWindow::normalize(Some(3), Some(10));
        assert_eq!(w.skip(), 20);

        let w = PageWindow::normalize(Some(7), Some(25));
        assert_eq!(w.skip(), 150);
    }

    #[test]
    fn test_25_records_page_3_of_10() {
        // 25 filtered records, limit 10: page 3 holds the remaining 5.
        let window = PageWindow::normalize(Some(3), Some(10));
        let page = Paginated::assemble(vec![21, 22, 23, 24, 25], window, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 3);
        assert_eq!(page.data.len(), 5);
        assert!(!page.is_out_of_range());
    }

    #[test]
    fn test_page_past_end_is_out_of_range_not_error() {
        let window = PageWindow::normalize(Some(5), Some(10));
        let page: Paginated<i32> = Paginated::assemble(vec![], window, 25);
        assert_eq!(page.total_pages, 3);
        assert!(page.is_out_of_range());
    }

    #[test]
    fn test_empty_result_set_accepts_any_page() {
        let window = PageWindow::normalize(Some(9), Some(10));
        let page: Paginated<i32> = Paginated::assemble(vec![], window, 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.is_out_of_range());
    }

    #[test]
    fn test_exact_division() {
        assert_eq!(total_pages(30, 10), 3);
        assert_eq!(total_pages(31, 10), 4);
        assert_eq!(total_pages(0, 10), 0);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let window = PageWindow::normalize(Some(2), Some(2));
        let page = Paginated::assemble(vec![3, 4], window, 5).map(|n| n * 10);
        assert_eq!(page.data, vec![30, 40]);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_results, 5);
    }
}
