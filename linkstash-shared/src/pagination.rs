/// Pagination normalization and response metadata
///
/// Every listing endpoint accepts optional `page` and `limit` query
/// parameters. This module clamps them into safe ranges, computes the SQL
/// offset, and builds the pagination block returned alongside list responses.
///
/// # Contract
///
/// - `page` is clamped to `[1, 10000]`, default 1
/// - `limit` is clamped to `[1, 100]`, default 20
/// - `offset = (page - 1) * limit`, which the caps bound at 999,900
///
/// # Example
///
/// ```
/// use linkstash_shared::pagination::{normalize, PaginationMeta};
///
/// let p = normalize(Some(3), Some(25));
/// assert_eq!(p.offset, 50);
///
/// let meta = PaginationMeta::new(2, 20, 100);
/// assert_eq!(meta.total_pages, 5);
/// assert!(meta.has_next);
/// ```
use serde::{Deserialize, Serialize};

/// Default page when none is supplied
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size when none is supplied
pub const DEFAULT_LIMIT: i64 = 20;

/// Largest accepted page size
pub const MAX_LIMIT: i64 = 100;

/// Largest accepted page number
pub const MAX_PAGE: i64 = 10_000;

/// Normalized pagination parameters ready for a LIMIT/OFFSET query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number after clamping (1-based)
    pub page: i64,

    /// Page size after clamping
    pub limit: i64,

    /// Row offset for the query
    pub offset: i64,
}

/// Pagination block included in list responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Page number served
    pub page: i64,

    /// Page size served
    pub limit: i64,

    /// Total matching rows
    pub total: i64,

    /// Total pages at this page size
    #[serde(rename = "totalPages")]
    pub total_pages: i64,

    /// Whether a later page exists
    #[serde(rename = "hasNext")]
    pub has_next: bool,

    /// Whether an earlier page exists
    #[serde(rename = "hasPrev")]
    pub has_prev: bool,
}

/// Clamps raw page/limit values and computes the row offset
///
/// Pure function: out-of-range values are clamped, never rejected, so a
/// hostile `page=999999999` costs at most the capped offset.
pub fn normalize(page: Option<i64>, limit: Option<i64>) -> Pagination {
    let page = page.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE);
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    Pagination {
        page,
        limit,
        offset: (page - 1) * limit,
    }
}

impl PaginationMeta {
    /// Builds response metadata from the served page and the total row count
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_defaults() {
        let p = normalize(None, None);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 20);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_normalize_clamps_page() {
        assert_eq!(normalize(Some(0), None).page, 1);
        assert_eq!(normalize(Some(-5), None).page, 1);
        assert_eq!(normalize(Some(99_999), None).page, MAX_PAGE);
    }

    #[test]
    fn test_normalize_clamps_limit() {
        assert_eq!(normalize(None, Some(0)).limit, 1);
        assert_eq!(normalize(None, Some(-1)).limit, 1);
        assert_eq!(normalize(None, Some(500)).limit, MAX_LIMIT);
    }

    #[test]
    fn test_offset_is_page_minus_one_times_limit() {
        for (page, limit) in [(1, 20), (2, 20), (3, 50), (10_000, 100), (0, 500)] {
            let p = normalize(Some(page), Some(limit));
            assert_eq!(p.offset, (p.page - 1) * p.limit);
            assert!((1..=MAX_PAGE).contains(&p.page));
            assert!((1..=MAX_LIMIT).contains(&p.limit));
        }
    }

    #[test]
    fn test_max_offset_is_bounded() {
        let p = normalize(Some(i64::MAX), Some(i64::MAX));
        assert_eq!(p.offset, (MAX_PAGE - 1) * MAX_LIMIT);
    }

    #[test]
    fn test_meta_basic() {
        let meta = PaginationMeta::new(2, 20, 100);
        assert_eq!(meta.total_pages, 5);
        assert!(meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_meta_last_page() {
        let meta = PaginationMeta::new(5, 20, 100);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn test_meta_rounds_up() {
        let meta = PaginationMeta::new(1, 20, 101);
        assert_eq!(meta.total_pages, 6);
    }

    #[test]
    fn test_meta_empty() {
        let meta = PaginationMeta::new(1, 20, 0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }
}
