//! Page/limit pagination for listing endpoints

use crate::error::{PortfolioError, Result};

/// Number of contacts served per page
pub const CONTACTS_PAGE_SIZE: u64 = 5;

/// A 1-based page over a collection in natural order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    /// Create a page request, clamping `page` and `limit` to at least 1
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Parse the raw `page` query value
    ///
    /// Only the leading integer counts, so `2.5` and `2abc` select page 2.
    /// Missing, unparseable and zero values select the first page. Negative
    /// and out-of-range pages are rejected.
    pub fn from_query(raw: Option<&str>, limit: u64) -> Result<Self> {
        let raw = raw.unwrap_or("").trim_start();
        let (negative, rest) = match raw.as_bytes().first() {
            Some(b'-') => (true, &raw[1..]),
            Some(b'+') => (false, &raw[1..]),
            _ => (false, raw),
        };
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .map_or(rest, |end| &rest[..end]);
        if digits.is_empty() {
            return Ok(Self::new(1, limit));
        }

        let page: i64 = digits.parse().map_err(|_| {
            PortfolioError::Validation(format!("page {} is out of range", digits))
        })?;
        if negative && page > 0 {
            return Err(PortfolioError::Validation(format!(
                "page must be a positive integer, got -{}",
                page
            )));
        }
        Ok(Self::new(page.unsigned_abs(), limit))
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of documents before this page
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Number of pages needed for `total` documents
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}
