// ABOUTME: Retention policy evaluation over a repository's tag inventory.
// ABOUTME: Pure planning; no network access happens here.

mod plan;
mod policy;

pub use plan::{DeletionReason, PlannedDeletion, ProtectedSkip, RetentionPlan, TagSet, plan};
pub use policy::RetentionPolicy;
