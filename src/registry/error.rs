// ABOUTME: Error types for registry API calls.
// ABOUTME: Authentication and listing failures are fatal; deletion failures are per tag.

use reqwest::StatusCode;

/// Errors building the HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid registry URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Credential exchange rejected or unreachable.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("login rejected with status {status}: {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("login response did not contain a token")]
    MissingToken,

    #[error("login request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A page of the tag listing could not be retrieved.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to fetch tags (page {page}): status {status}")]
    Status { page: usize, status: StatusCode },

    #[error("failed to fetch tags (page {page}): {source}")]
    Transport {
        page: usize,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid next page link after page {page} ({url}): {reason}")]
    InvalidNextPage {
        page: usize,
        url: String,
        reason: String,
    },

    #[error("failed to decode tags (page {page}): {source}")]
    Decode {
        page: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// A single tag could not be deleted.
#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("tag {tag} not found")]
    NotFound { tag: String },

    #[error("not allowed to delete {tag}: {message}")]
    Forbidden { tag: String, message: String },

    #[error("failed to delete {tag} (status {status}): {message}")]
    Rejected {
        tag: String,
        status: StatusCode,
        message: String,
    },

    #[error("failed to delete {tag}: {source}")]
    Transport {
        tag: String,
        #[source]
        source: reqwest::Error,
    },
}

impl DeleteError {
    pub fn tag(&self) -> &str {
        match self {
            DeleteError::NotFound { tag }
            | DeleteError::Forbidden { tag, .. }
            | DeleteError::Rejected { tag, .. }
            | DeleteError::Transport { tag, .. } => tag,
        }
    }

    /// Classify a non-success response to a delete request.
    pub(crate) fn from_status(tag: &str, status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::NOT_FOUND => DeleteError::NotFound {
                tag: tag.to_string(),
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DeleteError::Forbidden {
                tag: tag.to_string(),
                message,
            },
            _ => DeleteError::Rejected {
                tag: tag.to_string(),
                status,
                message,
            },
        }
    }
}
