// ABOUTME: Mock Docker Hub endpoints built on wiremock.
// ABOUTME: Login, paginated tag listing, and delete routes for repository acme/app.

use serde_json::{Value, json};
use std::time::Duration;
use tagtrim::registry::{HubClient, RegistrySettings, Session};
use tagtrim::types::RepositoryName;
use wiremock::matchers::{
    body_string_contains, header, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";
pub const TAGS_PATH: &str = "/v2/repositories/acme/app/tags";

pub fn repository() -> RepositoryName {
    RepositoryName::parse("acme/app").unwrap()
}

/// Settings pointing at the mock server, without retries.
pub fn settings(server: &MockServer) -> RegistrySettings {
    RegistrySettings {
        url: format!("{}/v2", server.uri()),
        page_size: 100,
        timeout: Duration::from_secs(5),
        retries: 0,
    }
}

pub fn tag_json(name: &str, last_updated: &str, full_size: u64) -> Value {
    json!({
        "name": name,
        "last_updated": last_updated,
        "full_size": full_size,
        "digest": "sha256:0000",
    })
}

/// Accept username `acme` with any password.
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v2/users/login/"))
        .and(body_string_contains("username=acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": TOKEN })))
        .mount(server)
        .await;
}

/// URL of listing page `page` (page 1 has no `page` parameter).
pub fn page_url(server: &MockServer, page: usize) -> String {
    format!("{}{}?page={}&page_size=100", server.uri(), TAGS_PATH, page)
}

/// Serve `pages` as a linked listing; page N links to page N+1.
pub async fn mount_pages(server: &MockServer, pages: Vec<Vec<Value>>) {
    let count = pages.len();
    for (index, results) in pages.into_iter().enumerate() {
        let page = index + 1;
        let next = if page < count {
            Value::String(page_url(server, page + 1))
        } else {
            Value::Null
        };
        let body = json!({ "count": 0, "next": next, "previous": null, "results": results });

        let mock = Mock::given(method("GET"))
            .and(path(TAGS_PATH))
            .and(header("Authorization", format!("JWT {TOKEN}").as_str()));
        let mock = if page == 1 {
            mock.and(query_param_is_missing("page"))
        } else {
            mock.and(query_param("page", page.to_string().as_str()))
        };
        mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }
}

pub fn tag_path(tag: &str) -> String {
    format!("{TAGS_PATH}/{tag}/")
}

pub async fn mount_delete(server: &MockServer, tag: &str, status: u16) {
    Mock::given(method("DELETE"))
        .and(path(tag_path(tag)))
        .respond_with(ResponseTemplate::new(status).set_body_string(if status == 204 {
            ""
        } else {
            "delete refused"
        }))
        .mount(server)
        .await;
}

pub async fn session(server: &MockServer) -> Session {
    HubClient::new(&settings(server))
        .unwrap()
        .login("acme", "secret")
        .await
        .unwrap()
}

/// Requests the server received with the given method.
pub async fn requests_with_method(server: &MockServer, verb: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == verb)
        .count()
}
