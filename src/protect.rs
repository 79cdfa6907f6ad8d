// ABOUTME: Protection list of tag names that must never be deleted.
// ABOUTME: Loaded once from a line-oriented file; empty when no file is configured.

use snafu::{ResultExt, Snafu};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Failure to read a configured protection list.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProtectionLoadError {
    #[snafu(display("failed to read protection list {}: {source}", path.display()))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectionSet {
    names: HashSet<String>,
}

impl ProtectionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse one tag name per line. Whitespace is trimmed; blank lines and
    /// `#` comments are ignored.
    pub fn from_lines(content: &str) -> Self {
        let names = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { names }
    }

    pub fn load(path: &Path) -> Result<Self, ProtectionLoadError> {
        let content = std::fs::read_to_string(path).context(ReadSnafu { path })?;
        Ok(Self::from_lines(&content))
    }

    /// Load from `path` when one is configured, otherwise protect nothing.
    pub fn load_optional(path: Option<&Path>) -> Result<Self, ProtectionLoadError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::empty()),
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.names.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ProtectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
