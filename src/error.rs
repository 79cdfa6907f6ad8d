// ABOUTME: Application-wide error types for tagtrim.
// ABOUTME: Every variant here is fatal; per-tag deletion failures are reported, not raised.

use crate::protect::ProtectionLoadError;
use crate::registry::{AuthError, FetchError, RegistryError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Registry(#[from] RegistryError),

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("{0}")]
    ProtectionLoad(#[from] ProtectionLoadError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Whether this error comes from configuration, before any network call.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::ConfigNotFound(_)
                | Error::MissingConfig(_)
                | Error::MissingEnvVar(_)
                | Error::InvalidConfig(_)
                | Error::Yaml(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
