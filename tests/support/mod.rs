// ABOUTME: Test support utilities.
// ABOUTME: Tag builders, an in-memory registry, and mock Docker Hub helpers.

use chrono::{TimeZone, Utc};
use std::sync::Once;
use tagtrim::types::{BYTES_PER_MB, Tag};

// Each test binary only uses some of these modules, so allow dead_code.
#[allow(dead_code)]
pub mod fake_registry;
#[allow(dead_code)]
pub mod hub;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("tagtrim=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Tag updated at `secs` since the epoch.
#[allow(dead_code)]
pub fn tag(name: &str, secs: i64, bytes: u64) -> Tag {
    Tag::new(name, Utc.timestamp_opt(secs, 0).unwrap(), bytes)
}

/// Tag updated at `secs` since the epoch, sized in MB.
#[allow(dead_code)]
pub fn tag_mb(name: &str, secs: i64, mb: u64) -> Tag {
    tag(name, secs, mb * BYTES_PER_MB)
}
