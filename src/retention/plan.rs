// ABOUTME: Retention planner deciding which tags to delete.
// ABOUTME: Applies the count limit, then the size limit, honoring protected tags.

use super::RetentionPolicy;
use crate::protect::ProtectionSet;
use crate::types::{Tag, total_size};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

/// Tags of one repository, unique by name, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<Tag>,
}

impl TagSet {
    /// Order by `last_updated` descending. The sort is stable, so equal
    /// timestamps keep their listing order. Repeated names keep the first
    /// occurrence.
    pub fn new(tags: Vec<Tag>) -> Self {
        let mut seen = HashSet::new();
        let mut tags: Vec<Tag> = tags
            .into_iter()
            .filter(|t| seen.insert(t.name.clone()))
            .collect();
        tags.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Self { tags }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        total_size(&self.tags)
    }

    pub fn as_slice(&self) -> &[Tag] {
        &self.tags
    }

    pub fn into_vec(self) -> Vec<Tag> {
        self.tags
    }
}

/// Which limit caused a deletion or a protected skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionReason {
    Count,
    Size,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedDeletion {
    pub tag: Tag,
    pub reason: DeletionReason,
    /// Compared total just before this deletion, for size deletions.
    pub total_before: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtectedSkip {
    pub name: String,
    pub reason: DeletionReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPlan {
    /// In discovery order: count pass first, then size pass.
    pub deletions: Vec<PlannedDeletion>,
    /// Newest first.
    pub survivors: Vec<Tag>,
    pub protected_skips: Vec<ProtectedSkip>,
}

impl RetentionPlan {
    pub fn deletion_names(&self) -> Vec<&str> {
        self.deletions.iter().map(|d| d.tag.name.as_str()).collect()
    }

    pub fn survivor_names(&self) -> Vec<&str> {
        self.survivors.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn survivor_size(&self) -> u64 {
        total_size(&self.survivors)
    }
}

/// Compute the deletions needed for `tags` to satisfy `policy`.
///
/// Protected tags are never scheduled. A protected tag past the count limit
/// survives without using up the kept quota. In the size pass a protected
/// tag stays in the compared total until it is reached as the oldest
/// candidate; from then on it is left out of the comparison but still
/// survives.
pub fn plan(tags: TagSet, protected: &ProtectionSet, policy: &RetentionPolicy) -> RetentionPlan {
    let mut plan = RetentionPlan {
        survivors: tags.into_vec(),
        ..Default::default()
    };

    if let Some(max_count) = policy.max_count {
        apply_count_limit(&mut plan, protected, max_count);
    }

    if let Some(limit) = policy.size_limit() {
        apply_size_limit(&mut plan, protected, limit);
    }

    info!(
        deletions = plan.deletions.len(),
        survivors = plan.survivors.len(),
        protected_skips = plan.protected_skips.len(),
        "retention plan computed"
    );

    plan
}

fn apply_count_limit(plan: &mut RetentionPlan, protected: &ProtectionSet, max_count: usize) {
    if plan.survivors.len() <= max_count {
        return;
    }

    let candidates = plan.survivors.split_off(max_count);
    for tag in candidates {
        if protected.contains(&tag.name) {
            debug!(tag = %tag.name, "protected tag exceeds count limit, keeping");
            plan.protected_skips.push(ProtectedSkip {
                name: tag.name.clone(),
                reason: DeletionReason::Count,
            });
            plan.survivors.push(tag);
        } else {
            plan.deletions.push(PlannedDeletion {
                tag,
                reason: DeletionReason::Count,
                total_before: None,
            });
        }
    }
}

fn apply_size_limit(plan: &mut RetentionPlan, protected: &ProtectionSet, limit: u64) {
    let mut candidates = std::mem::take(&mut plan.survivors);
    // Passed-over protected tags, oldest first.
    let mut passed_over = Vec::new();
    let mut compared = total_size(&candidates);

    while compared > limit {
        let Some(oldest) = candidates.pop() else {
            break;
        };
        compared = compared.saturating_sub(oldest.full_size);

        if protected.contains(&oldest.name) {
            debug!(tag = %oldest.name, "protected tag exceeds size limit, keeping");
            plan.protected_skips.push(ProtectedSkip {
                name: oldest.name.clone(),
                reason: DeletionReason::Size,
            });
            passed_over.push(oldest);
        } else {
            let total_before = compared.saturating_add(oldest.full_size);
            plan.deletions.push(PlannedDeletion {
                tag: oldest,
                reason: DeletionReason::Size,
                total_before: Some(total_before),
            });
        }
    }

    passed_over.reverse();
    candidates.extend(passed_over);
    plan.survivors = candidates;
}
