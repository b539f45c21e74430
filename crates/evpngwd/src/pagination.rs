//! Page token bookkeeping for list operations.
//!
//! Tokens are opaque UUIDs mapped to the offset at which the next page
//! starts. They stay valid for the lifetime of the process, so replaying a
//! token returns the same page boundary as long as the store is unchanged.

use std::collections::HashMap;

use evpn_gw_common::{GwError, GwResult};
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Page length used when the caller passes `0`.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Upper bound on the page length; larger requests are clamped.
pub const MAX_PAGE_SIZE: usize = 250;

/// Table of issued page tokens, shared by all resource kinds.
#[derive(Debug, Default)]
pub struct PageTokens {
    offsets: Mutex<HashMap<String, usize>>,
}

impl PageTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a request's page size and token into `(size, offset)`.
    pub fn extract(&self, page_size: i32, page_token: &str) -> GwResult<(usize, usize)> {
        let size = match page_size {
            n if n < 0 => {
                return Err(GwError::invalid_argument(
                    "negative PageSize is not allowed",
                ))
            }
            0 => DEFAULT_PAGE_SIZE,
            n => (n as usize).min(MAX_PAGE_SIZE),
        };

        if page_token.is_empty() {
            return Ok((size, 0));
        }

        let offset = self
            .offsets
            .lock()
            .get(page_token)
            .copied()
            .ok_or_else(|| {
                GwError::invalid_argument(format!(
                    "unable to find pagination token {}",
                    page_token
                ))
            })?;
        debug!("Found offset {} from pagination token: {}", offset, page_token);
        Ok((size, offset))
    }

    /// Mints a token that resumes a listing at `offset`.
    pub fn issue(&self, offset: usize) -> String {
        let token = Uuid::new_v4().to_string();
        self.offsets.lock().insert(token.clone(), offset);
        token
    }

    /// Cuts one page out of a sorted snapshot.
    ///
    /// Returns the page and the token for the next one (empty when the
    /// snapshot is exhausted).
    pub fn paginate<T>(
        &self,
        items: Vec<T>,
        page_size: i32,
        page_token: &str,
    ) -> GwResult<(Vec<T>, String)> {
        let (size, offset) = self.extract(page_size, page_token)?;
        debug!(
            "Limiting result len({}) to [{}:{}]",
            items.len(),
            offset,
            offset + size
        );
        let (page, has_more) = limit_pagination(items, offset, size);
        let token = if has_more {
            self.issue(offset + size)
        } else {
            String::new()
        };
        Ok((page, token))
    }
}

/// Returns `items[offset..offset + size]` and whether anything remains
/// beyond it. An offset past the end yields an empty page.
pub fn limit_pagination<T>(items: Vec<T>, offset: usize, size: usize) -> (Vec<T>, bool) {
    let end = offset.saturating_add(size);
    let has_more = end < items.len();
    let page = items.into_iter().skip(offset).take(size).collect();
    (page, has_more)
}
