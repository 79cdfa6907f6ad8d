// ABOUTME: Image tag record as reported by the registry listing.
// ABOUTME: Null timestamps sort as oldest, null sizes count as zero bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const BYTES_PER_MB: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,

    /// `None` when the registry has no timestamp; orders before any real one.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "null_as_zero")]
    pub full_size: u64,
}

impl Tag {
    pub fn new(name: impl Into<String>, last_updated: DateTime<Utc>, full_size: u64) -> Self {
        Self {
            name: name.into(),
            last_updated: Some(last_updated),
            full_size,
        }
    }
}

/// Sum of `full_size` over the given tags.
pub fn total_size<'a>(tags: impl IntoIterator<Item = &'a Tag>) -> u64 {
    tags.into_iter().fold(0u64, |acc, t| acc.saturating_add(t.full_size))
}

/// Render a byte count as megabytes with two decimals.
pub fn format_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MB as f64)
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}
