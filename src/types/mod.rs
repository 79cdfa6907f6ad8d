// ABOUTME: Validated domain types shared across the crate.
// ABOUTME: Repository identifiers and registry tag records.

mod repository_name;
mod tag;

pub use repository_name::{RepositoryName, RepositoryNameError};
pub use tag::{BYTES_PER_MB, Tag, format_mb, total_size};
