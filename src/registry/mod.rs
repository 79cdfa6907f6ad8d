// ABOUTME: Registry access: the TagRegistry seam and its Docker Hub implementation.
// ABOUTME: Connection settings are deserialized from the `registry` config section.

mod client;
mod error;

pub use client::{HubClient, Session, SessionToken};
pub use error::{AuthError, DeleteError, FetchError, RegistryError};

use crate::types::{RepositoryName, Tag};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_REGISTRY_URL: &str = "https://hub.docker.com/v2";
pub const MAX_PAGE_SIZE: u32 = 100;

/// Tag listing and deletion for one authenticated account.
#[async_trait]
pub trait TagRegistry: Send + Sync {
    /// Every tag in the repository, across all pages. Fails as a whole if
    /// any page fails.
    async fn list_tags(&self, repository: &RepositoryName) -> Result<Vec<Tag>, FetchError>;

    /// Delete one tag.
    async fn delete_tag(&self, repository: &RepositoryName, tag: &str) -> Result<(), DeleteError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrySettings {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Extra attempts for transient failures; 0 disables retrying.
    #[serde(default = "default_retries")]
    pub retries: usize,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            url: default_url(),
            page_size: default_page_size(),
            timeout: default_timeout(),
            retries: default_retries(),
        }
    }
}

fn default_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_retries() -> usize {
    2
}
