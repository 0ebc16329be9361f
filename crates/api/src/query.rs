//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Default page size for record listings.
pub const DEFAULT_LIMIT: i64 = 10;

/// Maximum page size for record listings.
pub const MAX_LIMIT: i64 = 100;

/// Generic 1-based pagination parameters (`?page=&limit=`).
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    /// Requested page, floored at 1.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Requested page size, defaulted and capped.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let params = PageParams {
            page: None,
            limit: None,
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn test_limit_capped_and_page_floored() {
        let params = PageParams {
            page: Some(0),
            limit: Some(10_000),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), MAX_LIMIT);
    }
}
