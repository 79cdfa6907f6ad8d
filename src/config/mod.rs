// ABOUTME: Configuration types and resolution for a cleanup run.
// ABOUTME: Merges tagtrim.yml with environment and flag overrides into one Config.

mod env_value;
mod init;
mod limits;

pub use env_value::EnvValue;
pub use init::init_config;
pub use limits::{keep_count, max_size_mb, parse_keep_count, parse_max_size_mb};

use crate::error::{Error, Result};
use crate::registry::{MAX_PAGE_SIZE, RegistrySettings};
use crate::retention::RetentionPolicy;
use crate::types::RepositoryName;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "tagtrim.yml";
pub const CONFIG_FILENAME_ALT: &str = "tagtrim.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".tagtrim/config.yml";

/// Contents of a tagtrim.yml file. Every field is optional so the
/// environment and flags can supply what the file leaves out.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub repository: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<EnvValue>,

    #[serde(default)]
    pub retention: RetentionSection,

    #[serde(default)]
    pub protect_file: Option<PathBuf>,

    #[serde(default)]
    pub registry: RegistrySettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetentionSection {
    #[serde(default)]
    pub keep_count: Option<i64>,

    #[serde(default)]
    pub max_size_mb: Option<i64>,
}

impl FileConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load the first config file found in `dir`, or an empty config.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }
}

/// Values from the environment or command line. These win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub repository: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub keep_count: Option<String>,
    pub max_size_mb: Option<String>,
    pub protect_file: Option<PathBuf>,
    pub registry_url: Option<String>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub repository: RepositoryName,
    pub credentials: Credentials,
    pub policy: RetentionPolicy,
    pub protect_file: Option<PathBuf>,
    pub registry: RegistrySettings,
}

impl Config {
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self> {
        let username = non_empty(overrides.username)
            .or(non_empty(file.username))
            .ok_or(Error::MissingConfig("username (DOCKER_USERNAME)"))?;

        let password = match non_empty(overrides.password) {
            Some(password) => password,
            None => file
                .password
                .as_ref()
                .map(EnvValue::resolve)
                .transpose()?
                .filter(|p| !p.is_empty())
                .ok_or(Error::MissingConfig("password (DOCKER_PASSWORD)"))?,
        };

        let repository = non_empty(overrides.repository)
            .or(non_empty(file.repository))
            .ok_or(Error::MissingConfig("repository (DOCKER_REPOSITORY)"))?;
        let repository = RepositoryName::with_default_namespace(&repository, &username)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;

        let max_count = match non_empty(overrides.keep_count) {
            Some(raw) => parse_keep_count(&raw)?,
            None => file
                .retention
                .keep_count
                .map(keep_count)
                .transpose()?
                .flatten(),
        };

        let max_total_size = match non_empty(overrides.max_size_mb) {
            Some(raw) => parse_max_size_mb(&raw)?,
            None => file
                .retention
                .max_size_mb
                .map(max_size_mb)
                .transpose()?
                .flatten(),
        };

        let mut registry = file.registry;
        if let Some(url) = non_empty(overrides.registry_url) {
            registry.url = url;
        }
        if registry.page_size == 0 || registry.page_size > MAX_PAGE_SIZE {
            return Err(Error::InvalidConfig(format!(
                "registry.page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                registry.page_size
            )));
        }

        let protect_file = overrides
            .protect_file
            .filter(|p| !p.as_os_str().is_empty())
            .or(file.protect_file);

        Ok(Config {
            repository,
            credentials: Credentials { username, password },
            policy: RetentionPolicy {
                max_count,
                max_total_size,
            },
            protect_file,
            registry,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
