// ABOUTME: In-memory TagRegistry for orchestration tests.
// ABOUTME: Records delete calls and can be told to reject specific tags.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashSet;
use std::sync::Mutex;
use tagtrim::registry::{DeleteError, FetchError, TagRegistry};
use tagtrim::types::{RepositoryName, Tag};

#[derive(Default)]
pub struct FakeRegistry {
    tags: Mutex<Vec<Tag>>,
    rejected: HashSet<String>,
    deletes: Mutex<Vec<String>>,
    fail_listing: bool,
}

impl FakeRegistry {
    pub fn new(tags: Vec<Tag>) -> Self {
        Self {
            tags: Mutex::new(tags),
            ..Default::default()
        }
    }

    /// Make deletion of `tag` fail with a 403.
    pub fn rejecting(mut self, tag: &str) -> Self {
        self.rejected.insert(tag.to_string());
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Names passed to delete_tag, in call order.
    pub fn delete_calls(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> Vec<String> {
        self.tags
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.name.clone())
            .collect()
    }
}

#[async_trait]
impl TagRegistry for FakeRegistry {
    async fn list_tags(&self, _repository: &RepositoryName) -> Result<Vec<Tag>, FetchError> {
        if self.fail_listing {
            return Err(FetchError::Status {
                page: 1,
                status: StatusCode::INTERNAL_SERVER_ERROR,
            });
        }
        Ok(self.tags.lock().unwrap().clone())
    }

    async fn delete_tag(&self, _repository: &RepositoryName, tag: &str) -> Result<(), DeleteError> {
        self.deletes.lock().unwrap().push(tag.to_string());
        if self.rejected.contains(tag) {
            return Err(DeleteError::Forbidden {
                tag: tag.to_string(),
                message: "permission denied".to_string(),
            });
        }
        self.tags.lock().unwrap().retain(|t| t.name != tag);
        Ok(())
    }
}
