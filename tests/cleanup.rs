// ABOUTME: Tests for the cleanup run: fetch, plan, delete, summarize.
// ABOUTME: Uses an in-memory registry and a mock Docker Hub for the HTTP path.

mod support;

use support::fake_registry::FakeRegistry;
use support::hub::{self, TAGS_PATH, tag_json};
use support::{init_tracing, tag_mb};
use tagtrim::cleanup;
use tagtrim::output::{Output, OutputMode};
use tagtrim::protect::ProtectionSet;
use tagtrim::retention::RetentionPolicy;
use tagtrim::types::BYTES_PER_MB;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quiet() -> Output {
    Output::new(OutputMode::Quiet)
}

fn abc() -> FakeRegistry {
    FakeRegistry::new(vec![
        tag_mb("a", 5, 100),
        tag_mb("b", 4, 100),
        tag_mb("c", 3, 100),
    ])
}

mod in_memory {
    use super::*;

    #[tokio::test]
    async fn deletes_planned_tags_in_order() {
        init_tracing();
        let registry = abc();
        let policy = RetentionPolicy::unbounded().with_max_total_size(150 * BYTES_PER_MB);

        let summary = cleanup::run(
            &registry,
            &hub::repository(),
            &ProtectionSet::empty(),
            &policy,
            false,
            &quiet(),
        )
        .await
        .unwrap();

        assert_eq!(registry.delete_calls(), ["c", "b"]);
        assert_eq!(registry.remaining(), ["a"]);
        assert_eq!(summary.fetched, 3);
        assert_eq!(summary.deleted, 2);
        assert_eq!(summary.deleted_bytes, 200 * BYTES_PER_MB);
        assert_eq!(summary.remaining, 1);
        assert_eq!(summary.remaining_bytes, 100 * BYTES_PER_MB);
        assert!(summary.failures.is_empty());
    }

    #[tokio::test]
    async fn deletion_failure_does_not_stop_the_batch() {
        let registry = abc().rejecting("b");
        let policy = RetentionPolicy::unbounded().with_max_count(1);

        let summary = cleanup::run(
            &registry,
            &hub::repository(),
            &ProtectionSet::empty(),
            &policy,
            false,
            &quiet(),
        )
        .await
        .unwrap();

        assert_eq!(registry.delete_calls(), ["b", "c"]);
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].tag, "b");
        assert!(summary.message().contains("1 deletion(s) failed"));
    }

    #[tokio::test]
    async fn dry_run_deletes_nothing() {
        let registry = abc();
        let policy = RetentionPolicy::unbounded().with_max_count(1);

        let summary = cleanup::run(
            &registry,
            &hub::repository(),
            &ProtectionSet::empty(),
            &policy,
            true,
            &quiet(),
        )
        .await
        .unwrap();

        assert!(registry.delete_calls().is_empty());
        assert_eq!(summary.planned, 2);
        assert_eq!(summary.deleted, 0);
        assert_eq!(summary.remaining, 1);
        assert!(summary.message().starts_with("Dry run complete"));
    }

    #[tokio::test]
    async fn protected_tags_are_never_deleted() {
        let registry = abc();
        let policy = RetentionPolicy::unbounded().with_max_count(0);
        let protected = ProtectionSet::from_iter(["a", "b", "c"]);

        let summary = cleanup::run(
            &registry,
            &hub::repository(),
            &protected,
            &policy,
            false,
            &quiet(),
        )
        .await
        .unwrap();

        assert!(registry.delete_calls().is_empty());
        assert_eq!(summary.protected_skips, 3);
        assert_eq!(summary.remaining, 3);
    }

    #[tokio::test]
    async fn listing_failure_aborts_before_deleting() {
        let registry = abc().failing_listing();
        let policy = RetentionPolicy::unbounded().with_max_count(0);

        let result = cleanup::run(
            &registry,
            &hub::repository(),
            &ProtectionSet::empty(),
            &policy,
            false,
            &quiet(),
        )
        .await;

        assert!(result.is_err());
        assert!(registry.delete_calls().is_empty());
    }
}

mod over_http {
    use super::*;

    #[tokio::test]
    async fn failed_second_page_issues_no_deletes() {
        init_tracing();
        let server = MockServer::start().await;
        hub::mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path(TAGS_PATH))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(502))
            .with_priority(1)
            .mount(&server)
            .await;
        hub::mount_pages(
            &server,
            vec![
                vec![tag_json("v3", "2024-03-03T00:00:00Z", 300)],
                vec![tag_json("v2", "2024-03-02T00:00:00Z", 200)],
                vec![tag_json("v1", "2024-03-01T00:00:00Z", 100)],
            ],
        )
        .await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let session = hub::session(&server).await;
        let policy = RetentionPolicy::unbounded().with_max_count(0);
        let result = cleanup::run(
            &session,
            &hub::repository(),
            &ProtectionSet::empty(),
            &policy,
            false,
            &quiet(),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(hub::requests_with_method(&server, "DELETE").await, 0);
    }

    #[tokio::test]
    async fn full_run_against_mock_hub() {
        let server = MockServer::start().await;
        hub::mount_login(&server).await;
        hub::mount_pages(
            &server,
            vec![
                vec![
                    tag_json("latest", "2024-03-04T00:00:00Z", 10),
                    tag_json("v3", "2024-03-03T00:00:00Z", 10),
                ],
                vec![
                    tag_json("v2", "2024-03-02T00:00:00Z", 10),
                    tag_json("v1", "2024-03-01T00:00:00Z", 10),
                ],
            ],
        )
        .await;
        hub::mount_delete(&server, "v2", 204).await;
        hub::mount_delete(&server, "v1", 403).await;

        let session = hub::session(&server).await;
        let policy = RetentionPolicy::unbounded().with_max_count(2);
        let summary = cleanup::run(
            &session,
            &hub::repository(),
            &ProtectionSet::empty(),
            &policy,
            false,
            &quiet(),
        )
        .await
        .unwrap();

        assert_eq!(summary.fetched, 4);
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].tag, "v1");
        assert_eq!(summary.remaining, 2);
        assert_eq!(hub::requests_with_method(&server, "DELETE").await, 2);
    }
}
