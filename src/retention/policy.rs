// ABOUTME: Retention limits applied to a repository's tags.
// ABOUTME: Each limit is optional; an absent limit is unbounded.

use crate::types::format_mb;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RetentionPolicy {
    /// Keep at most this many tags.
    pub max_count: Option<usize>,
    /// Keep at most this many bytes; zero is treated as unbounded.
    pub max_total_size: Option<u64>,
}

impl RetentionPolicy {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_count(mut self, count: usize) -> Self {
        self.max_count = Some(count);
        self
    }

    pub fn with_max_total_size(mut self, bytes: u64) -> Self {
        self.max_total_size = Some(bytes);
        self
    }

    /// Size limit in effect, if any.
    pub fn size_limit(&self) -> Option<u64> {
        self.max_total_size.filter(|&bytes| bytes > 0)
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_count.is_none() && self.size_limit().is_none()
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max_count {
            Some(count) => write!(f, "keep {count} tags")?,
            None => write!(f, "unbounded count")?,
        }
        match self.size_limit() {
            Some(bytes) => write!(f, ", max {}", format_mb(bytes)),
            None => write!(f, ", unbounded size"),
        }
    }
}
