//! Pagination utilities for service layer
//!
//! Turns the raw `page` / `size` query values into a skip/limit window.
//! Without a `size` there is no window and callers get the full result set.

use crate::errors::ServiceError;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u64,
    /// items per page
    pub per_page: u64,
}

/// Skip/limit pair handed to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub skip: u64,
    pub limit: u64,
}

impl Pagination {
    /// Parse raw query values. `size` absent means no pagination; `page`
    /// absent means the first page. Non-numeric, zero or negative values are
    /// rejected.
    pub fn parse(page: Option<&str>, size: Option<&str>) -> Result<Option<Self>, ServiceError> {
        let per_page = match non_blank(size) {
            None => return Ok(None),
            Some(s) => positive("size", s)?,
        };
        let page = match non_blank(page) {
            None => 1,
            Some(p) => positive("page", p)?,
        };
        Ok(Some(Self { page, per_page }))
    }

    /// Convert to a window. A page size above `max_per_page` is rejected
    /// rather than shrunk, so `ceil(count / size)` stays the page count.
    pub fn window(self, max_per_page: u64) -> Result<Window, ServiceError> {
        if self.per_page > max_per_page {
            return Err(ServiceError::Validation(format!("size must be <= {max_per_page}")));
        }
        let per_page = self.per_page.max(1);
        let page = self.page.max(1);
        Ok(Window { skip: (page - 1).saturating_mul(per_page), limit: per_page })
    }
}

fn non_blank(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

fn positive(name: &str, raw: &str) -> Result<u64, ServiceError> {
    match raw.parse::<i64>() {
        Ok(n) if n > 0 => Ok(n as u64),
        Ok(_) => Err(ServiceError::Validation(format!("{name} must be >= 1"))),
        Err(_) => Err(ServiceError::Validation(format!("{name} must be an integer"))),
    }
}
