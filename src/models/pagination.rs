//! Paging parameters shared by the list endpoints.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page position after defaults and clamping have been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Build a page request from optional query values.
    ///
    /// `page` is at least 1; `limit` defaults to [`DEFAULT_PAGE_SIZE`] and is
    /// clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip. Saturates for absurd page numbers, which then simply
    /// yield an empty page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Paging block returned alongside every list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let pages = if total == 0 {
            0
        } else {
            (total + request.limit - 1) / request.limit
        };

        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages,
        }
    }
}
