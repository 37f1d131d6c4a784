//! Offset cursors for paginated listings.
//!
//! A cursor is the decimal offset of the first item of the next page in a
//! collection's ascending row order. Cursors carry no server-side state; every
//! page is recomputed from the current index.

use crate::error::{Error, Result};

/// A validated page request. The limit is always at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    limit: usize,
    offset: usize,
}

impl PageRequest {
    /// Page of at most `limit` items starting `offset` items in.
    pub fn new(limit: usize, offset: usize) -> Result<Self> {
        if limit == 0 {
            return Err(Error::InvalidRequest("limit must be at least 1".to_string()));
        }
        Ok(Self { limit, offset })
    }

    /// Maximum number of items to return.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of items to skip.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Build a page request from raw query parameters.
    ///
    /// A missing limit falls back to `default_limit`; the limit must lie in
    /// `1..=max_limit`. The cursor is parsed with [`parse_cursor`].
    pub fn from_params(
        limit: Option<usize>,
        cursor: Option<&str>,
        default_limit: usize,
        max_limit: usize,
    ) -> Result<Self> {
        let limit = limit.unwrap_or(default_limit);
        if limit == 0 || limit > max_limit {
            return Err(Error::InvalidLimit {
                limit,
                max: max_limit,
            });
        }
        Self::new(limit, parse_cursor(cursor)?)
    }

    /// Cursor for the page after this one, if `total` leaves anything behind it.
    pub fn next_cursor(&self, total: usize) -> Option<String> {
        next_cursor(self.offset, self.limit, total)
    }
}

/// Parse a page cursor into an offset.
///
/// Absent or blank cursors mean offset 0. Anything other than a non-negative
/// decimal integer is rejected.
pub fn parse_cursor(cursor: Option<&str>) -> Result<usize> {
    let Some(raw) = cursor.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(0);
    };
    if raw.starts_with('-') {
        return Err(Error::InvalidCursor("cursor must be >= 0".to_string()));
    }
    if !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::InvalidCursor(format!("not a number: {raw}")));
    }
    raw.parse::<usize>()
        .map_err(|e| Error::InvalidCursor(format!("{raw}: {e}")))
}

/// Compute the cursor following a page, or `None` on the last page.
pub fn next_cursor(offset: usize, limit: usize, total: usize) -> Option<String> {
    let next = offset.saturating_add(limit);
    (next < total).then(|| next.to_string())
}
