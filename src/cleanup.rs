// ABOUTME: Cleanup run orchestration: fetch inventory, plan, delete, summarize.
// ABOUTME: Deletion failures are collected per tag and never abort the batch.

use crate::output::Output;
use crate::protect::ProtectionSet;
use crate::registry::{FetchError, TagRegistry};
use crate::retention::{
    self, DeletionReason, PlannedDeletion, RetentionPlan, RetentionPolicy, TagSet,
};
use crate::types::{RepositoryName, format_mb};
use serde::Serialize;
use tracing::{info, warn};

/// A tag the registry refused to delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteFailure {
    pub tag: String,
    pub message: String,
}

/// Outcome of issuing the planned deletions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub deleted: Vec<String>,
    pub deleted_bytes: u64,
    pub failures: Vec<DeleteFailure>,
}

/// Final figures of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub repository: String,
    pub dry_run: bool,
    pub fetched: usize,
    pub planned: usize,
    pub deleted: usize,
    pub deleted_bytes: u64,
    pub protected_skips: usize,
    pub failures: Vec<DeleteFailure>,
    pub remaining: usize,
    pub remaining_bytes: u64,
}

impl RunSummary {
    pub fn message(&self) -> String {
        let prefix = if self.dry_run {
            "Dry run complete"
        } else {
            "Cleanup complete"
        };
        let mut message = format!(
            "{prefix}. Remaining images: {}, total size: {}",
            self.remaining,
            format_mb(self.remaining_bytes)
        );
        if !self.failures.is_empty() {
            message.push_str(&format!(" ({} deletion(s) failed)", self.failures.len()));
        }
        message
    }
}

/// Fetch every tag of `repository`, ordered newest first.
pub async fn fetch_inventory<R>(
    registry: &R,
    repository: &RepositoryName,
) -> Result<TagSet, FetchError>
where
    R: TagRegistry + ?Sized,
{
    let tags = registry.list_tags(repository).await?;
    let set = TagSet::new(tags);
    info!(
        repository = %repository,
        count = set.len(),
        bytes = set.total_size(),
        "fetched tag inventory"
    );
    Ok(set)
}

/// Issue every planned deletion in order.
pub async fn execute<R>(
    registry: &R,
    repository: &RepositoryName,
    plan: &RetentionPlan,
    output: &Output,
) -> ExecutionReport
where
    R: TagRegistry + ?Sized,
{
    let mut report = ExecutionReport::default();

    for deletion in &plan.deletions {
        let name = &deletion.tag.name;
        output.progress(&describe("Deleting", deletion));
        match registry.delete_tag(repository, name).await {
            Ok(()) => {
                info!(tag = %name, "deleted tag");
                output.event("deleted", deletion);
                report.deleted.push(name.clone());
                report.deleted_bytes += deletion.tag.full_size;
            }
            Err(e) => {
                warn!(tag = %name, error = %e, "failed to delete tag");
                output.warning(&format!("error deleting {name}: {e}"));
                report.failures.push(DeleteFailure {
                    tag: name.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    report
}

/// Run one cleanup pass over `repository`.
///
/// The full inventory is fetched before anything is deleted; a failed page
/// aborts the run. With `dry_run` the plan is reported and nothing is deleted.
pub async fn run<R>(
    registry: &R,
    repository: &RepositoryName,
    protected: &ProtectionSet,
    policy: &RetentionPolicy,
    dry_run: bool,
    output: &Output,
) -> Result<RunSummary, FetchError>
where
    R: TagRegistry + ?Sized,
{
    let inventory = fetch_inventory(registry, repository).await?;
    let fetched = inventory.len();
    output.progress(&format!(
        "Found {fetched} tags ({}) in {repository}; policy: {policy}",
        format_mb(inventory.total_size())
    ));

    let plan = retention::plan(inventory, protected, policy);
    report_plan(&plan, dry_run, output);

    let report = if dry_run {
        ExecutionReport::default()
    } else {
        execute(registry, repository, &plan, output).await
    };

    Ok(RunSummary {
        repository: repository.to_string(),
        dry_run,
        fetched,
        planned: plan.deletions.len(),
        deleted: report.deleted.len(),
        deleted_bytes: report.deleted_bytes,
        protected_skips: plan.protected_skips.len(),
        failures: report.failures,
        remaining: plan.survivors.len(),
        remaining_bytes: plan.survivor_size(),
    })
}

fn report_plan(plan: &RetentionPlan, dry_run: bool, output: &Output) {
    for skip in &plan.protected_skips {
        output.progress(&format!("Skipping protected tag: {}", skip.name));
        output.event("protected", skip);
    }

    if dry_run {
        for deletion in &plan.deletions {
            output.progress(&describe("Would delete", deletion));
            output.event("planned", deletion);
        }
    }
}

fn describe(verb: &str, deletion: &PlannedDeletion) -> String {
    let name = &deletion.tag.name;
    match (deletion.reason, deletion.total_before) {
        (DeletionReason::Size, Some(total)) => {
            format!("{verb} (exceeds size, total={}): {name}", format_mb(total))
        }
        (DeletionReason::Size, None) => format!("{verb} (exceeds size): {name}"),
        (DeletionReason::Count, _) => format!("{verb} (exceeds count): {name}"),
    }
}
