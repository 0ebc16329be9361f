//! Shared response envelope types for API handlers.
//!
//! Plain responses use the `{ "data": ... }` envelope; paginated listings
//! add a `pagination` block with 1-based page metadata.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Paginated `{ "data": T, "pagination": ... }` response envelope.
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub data: T,
    pub pagination: PageMeta,
}

/// Pagination metadata for 1-based page/limit listings.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageMeta {
    pub current_page: i64,
    pub limit: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    /// Derive metadata from the requested page, the total matching count,
    /// and the number of rows actually returned.
    ///
    /// `has_next` holds when the rows before and on this page do not cover
    /// the total; `has_prev` holds for any page past the first.
    pub fn new(page: i64, limit: i64, total_count: i64, returned: usize) -> Self {
        let skip = (page - 1).max(0) * limit;
        Self {
            current_page: page,
            limit,
            total_count,
            total_pages: if limit > 0 {
                (total_count + limit - 1) / limit
            } else {
                0
            },
            has_next: skip + (returned as i64) < total_count,
            has_prev: page > 1,
        }
    }
}
