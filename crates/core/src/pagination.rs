//! Limit/offset helpers shared by list endpoints.

/// Clamp a user-provided limit into `1..=max`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Default and maximum page size of one listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default: i64,
    pub max: i64,
}

impl PageLimits {
    pub const fn new(default: i64, max: i64) -> Self {
        Self { default, max }
    }

    pub fn clamp(&self, limit: Option<i64>) -> i64 {
        clamp_limit(limit, self.default, self.max)
    }
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
