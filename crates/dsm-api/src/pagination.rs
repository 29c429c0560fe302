use dsm_db::models::PageRequest;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// List sizing limits taken from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSettings {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

/// Resolved `page`/`limit` pair for one list request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: i64,
    pub limit: i64,
}

impl Paging {
    /// Apply defaults and the configured cap. `page` starts at 1.
    pub fn resolve(
        page: Option<i64>,
        limit: Option<i64>,
        settings: PaginationSettings,
    ) -> Result<Self, ApiError> {
        let page = page.unwrap_or(1);
        if page < 1 {
            return Err(ApiError::Validation("page must be at least 1".to_string()));
        }

        let limit = limit.unwrap_or(settings.default_limit);
        if limit < 1 {
            return Err(ApiError::Validation("limit must be at least 1".to_string()));
        }

        let limit = limit.min(settings.max_limit);
        // The offset must fit in a BIGINT
        if (page - 1).checked_mul(limit).is_none() {
            return Err(ApiError::Validation("page is too large".to_string()));
        }

        Ok(Self { page, limit })
    }

    pub const fn request(self) -> PageRequest {
        PageRequest {
            limit: self.limit,
            offset: (self.page - 1) * self.limit,
        }
    }

    pub fn into_page<T>(self, items: Vec<T>, total: i64) -> Page<T> {
        Page {
            items,
            pagination: Pagination::new(self.page, self.limit, total),
        }
    }
}

/// Paging metadata returned with list responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub const fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}
