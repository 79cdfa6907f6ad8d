// ABOUTME: Parsing of retention limits from raw flag, env, or file values.
// ABOUTME: Count must be non-negative; size in MB of zero or less means unbounded.

use crate::error::{Error, Result};
use crate::types::BYTES_PER_MB;

/// Parse a raw keep-count. Empty means unbounded.
pub fn parse_keep_count(raw: &str) -> Result<Option<usize>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: i64 = raw
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("invalid KEEP_COUNT value: {raw}")))?;
    keep_count(value)
}

pub fn keep_count(value: i64) -> Result<Option<usize>> {
    usize::try_from(value)
        .map(Some)
        .map_err(|_| Error::InvalidConfig(format!("invalid KEEP_COUNT value: {value}")))
}

/// Parse a raw size limit in MB into bytes. Empty or non-positive means unbounded.
pub fn parse_max_size_mb(raw: &str) -> Result<Option<u64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: i64 = raw
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("invalid MAX_SIZE_MB value: {raw}")))?;
    max_size_mb(value)
}

pub fn max_size_mb(value: i64) -> Result<Option<u64>> {
    if value <= 0 {
        return Ok(None);
    }
    (value as u64)
        .checked_mul(BYTES_PER_MB)
        .map(Some)
        .ok_or_else(|| Error::InvalidConfig(format!("MAX_SIZE_MB value too large: {value}")))
}
