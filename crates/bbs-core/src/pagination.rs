//! # Pagination
//!
//! Pages are 1-indexed. A missing `page` means the first page and a missing
//! `size` falls back to the policy default.

use crate::error::{AppError, Result};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Bounds applied to client-supplied page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePolicy {
    pub default_size: u32,
    pub max_size: u32,
}

impl Default for PagePolicy {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

/// A validated page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, size: Option<u32>, policy: &PagePolicy) -> Result<Self> {
        let page = page.unwrap_or(1);
        let size = size.unwrap_or(policy.default_size);

        if page < 1 {
            return Err(AppError::ValidationError(
                "page must be 1 or greater".to_string(),
            ));
        }
        if size < 1 || size > policy.max_size {
            return Err(AppError::ValidationError(format!(
                "size must be between 1 and {}",
                policy.max_size
            )));
        }

        Ok(Self { page, size })
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.size)
    }
}
