// ABOUTME: Docker Hub API v2 client: login, paginated tag listing, tag deletion.
// ABOUTME: Transient failures are retried with exponential backoff.

use super::error::{AuthError, DeleteError, FetchError, RegistryError};
use super::{RegistrySettings, TagRegistry};
use crate::types::{RepositoryName, Tag};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("tagtrim/", env!("CARGO_PKG_VERSION"));
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Bearer credential returned by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Deserialize)]
struct TagsPage {
    #[serde(default)]
    results: Vec<Tag>,
    #[serde(default)]
    next: Option<String>,
}

/// Unauthenticated client for one registry endpoint.
#[derive(Debug, Clone)]
pub struct HubClient {
    http: reqwest::Client,
    base: Url,
    base_str: String,
    page_size: u32,
    retries: usize,
}

impl HubClient {
    pub fn new(settings: &RegistrySettings) -> Result<Self, RegistryError> {
        let base_str = settings.url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_str).map_err(|e| RegistryError::InvalidUrl {
            url: settings.url.clone(),
            reason: e.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            http,
            base,
            base_str,
            page_size: settings.page_size,
            retries: settings.retries,
        })
    }

    /// Exchange credentials for a session token.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SessionToken, AuthError> {
        let url = format!("{}/users/login/", self.base_str);
        debug!(%url, username, "logging in");

        let response = self
            .send(|| {
                self.http
                    .post(&url)
                    .form(&[("username", username), ("password", password)])
            })
            .await?
            .response;

        let status = response.status();
        if status != StatusCode::OK {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected { status, message });
        }

        let body: LoginResponse = response.json().await?;
        match body.token {
            Some(token) if !token.is_empty() => Ok(SessionToken(token)),
            _ => Err(AuthError::MissingToken),
        }
    }

    /// Log in and return a session bound to the resulting token.
    pub async fn login(self, username: &str, password: &str) -> Result<Session, AuthError> {
        let token = self.authenticate(username, password).await?;
        Ok(Session::new(self, token))
    }

    /// Send a request, retrying transport errors and 5xx responses.
    ///
    /// The last 5xx response is returned as-is once retries run out.
    async fn send<F>(&self, build: F) -> Result<Delivered, reqwest::Error>
    where
        F: Fn() -> RequestBuilder,
    {
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(100)
            .max_delay(MAX_BACKOFF)
            .map(jitter)
            .take(self.retries);
        let server_errors = AtomicUsize::new(0);

        let outcome = Retry::spawn(strategy, || {
            let request = build();
            let server_errors = &server_errors;
            async move {
                match request.send().await {
                    Ok(response) if response.status().is_server_error() => {
                        server_errors.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            status = %response.status(),
                            url = %response.url(),
                            "registry returned server error"
                        );
                        Err(Attempt::Server(response))
                    }
                    Ok(response) => Ok(response),
                    Err(e) => {
                        warn!(error = %e, "registry request failed");
                        Err(Attempt::Transport(e))
                    }
                }
            }
        })
        .await;

        let response = match outcome {
            Ok(response) | Err(Attempt::Server(response)) => response,
            Err(Attempt::Transport(e)) => return Err(e),
        };
        Ok(Delivered {
            response,
            server_errors: server_errors.into_inner(),
        })
    }

    /// Resolve a `next` link against the base URL. The token is only ever
    /// sent to the registry's own origin.
    fn next_page_url(&self, page: usize, link: String) -> Result<String, FetchError> {
        let url = self
            .base
            .join(&link)
            .map_err(|e| FetchError::InvalidNextPage {
                page,
                url: link.clone(),
                reason: e.to_string(),
            })?;
        if url.origin() != self.base.origin() {
            return Err(FetchError::InvalidNextPage {
                page,
                url: link,
                reason: format!("points outside {}", self.base_str),
            });
        }
        Ok(url.to_string())
    }

    fn tags_url(&self, repository: &RepositoryName) -> String {
        format!(
            "{}/repositories/{}/{}/tags?page_size={}",
            self.base_str,
            repository.namespace(),
            repository.name(),
            self.page_size
        )
    }

    fn tag_url(&self, repository: &RepositoryName, tag: &str) -> String {
        format!(
            "{}/repositories/{}/{}/tags/{}/",
            self.base_str,
            repository.namespace(),
            repository.name(),
            urlencoding::encode(tag)
        )
    }
}

enum Attempt {
    Transport(reqwest::Error),
    Server(Response),
}

/// Final response of a request plus the 5xx answers seen before it.
struct Delivered {
    response: Response,
    server_errors: usize,
}

/// Authenticated client; every request carries the session token.
#[derive(Debug, Clone)]
pub struct Session {
    client: HubClient,
    token: SessionToken,
}

impl Session {
    pub fn new(client: HubClient, token: SessionToken) -> Self {
        Self { client, token }
    }

    fn authorization(&self) -> String {
        format!("JWT {}", self.token.as_str())
    }
}

#[async_trait]
impl TagRegistry for Session {
    async fn list_tags(&self, repository: &RepositoryName) -> Result<Vec<Tag>, FetchError> {
        let mut tags = Vec::new();
        let mut next = Some(self.client.tags_url(repository));
        let mut page = 0;
        let mut visited = HashSet::new();
        let auth = self.authorization();

        while let Some(url) = next.take() {
            page += 1;
            if !visited.insert(url.clone()) {
                return Err(FetchError::InvalidNextPage {
                    page: page - 1,
                    url,
                    reason: "repeats an earlier page".to_string(),
                });
            }
            debug!(page, %url, "fetching tag page");

            let response = self
                .client
                .send(|| self.client.http.get(&url).header(AUTHORIZATION, &auth))
                .await
                .map_err(|source| FetchError::Transport { page, source })?
                .response;

            let status = response.status();
            if status != StatusCode::OK {
                return Err(FetchError::Status { page, status });
            }

            let body = response
                .bytes()
                .await
                .map_err(|source| FetchError::Transport { page, source })?;
            let batch: TagsPage = serde_json::from_slice(&body)
                .map_err(|source| FetchError::Decode { page, source })?;

            debug!(page, count = batch.results.len(), "received tag page");
            tags.extend(batch.results);

            next = match batch.next.filter(|n| !n.is_empty()) {
                Some(link) => Some(self.client.next_page_url(page, link)?),
                None => None,
            };
        }

        Ok(tags)
    }

    async fn delete_tag(&self, repository: &RepositoryName, tag: &str) -> Result<(), DeleteError> {
        let url = self.client.tag_url(repository, tag);
        let auth = self.authorization();
        debug!(%url, tag, "deleting tag");

        let Delivered {
            response,
            server_errors,
        } = self
            .client
            .send(|| self.client.http.delete(&url).header(AUTHORIZATION, &auth))
            .await
            .map_err(|source| DeleteError::Transport {
                tag: tag.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(());
        }
        // 404 after a 5xx: an earlier attempt already removed the tag.
        if status == StatusCode::NOT_FOUND && server_errors > 0 {
            debug!(tag, server_errors, "tag gone after an earlier server error");
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        Err(DeleteError::from_status(tag, status, message))
    }
}
