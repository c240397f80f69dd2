//! Mock API tests for the GitHub change-request backend.
//!
//! These tests use wiremock to simulate the GitHub REST API and verify the
//! backend's behavior without network access or real credentials.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gpwatch_core::traits::{ChangeRequests, DocumentSource, NewRequest, submit_updates};
use gpwatch_core::{GpVersion, ProposedUpdate, ReleaseCycle};
use gpwatch_github::{ApiUrl, GithubClient, GithubRequests, RepoRef};

fn backend(server: &MockServer) -> GithubRequests {
    let api = ApiUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap();
    let client = GithubClient::new(api, "test-token");
    GithubRequests::new(
        client,
        RepoRef::new("octo/tracker").unwrap(),
        "products/pan-gp.md",
        "main",
    )
}

fn new_request(cycle: &str, version: &str) -> NewRequest {
    let update = ProposedUpdate {
        cycle: ReleaseCycle::new(cycle).unwrap(),
        new_version: GpVersion::new(version).unwrap(),
        new_date: "2025-04-03".parse().unwrap(),
        previous: None,
    };
    NewRequest::for_update(&update, "patched document\n".to_string())
}

async fn mount_create_flow(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/repos/octo/tracker/git/ref/heads/main"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/main",
            "object": { "sha": "base-sha", "type": "commit" }
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/tracker/git/refs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ref": "refs/heads/gpwatch/6.2",
            "object": { "sha": "base-sha" }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/tracker/contents/products/pan-gp.md"))
        .and(query_param("ref", "main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": "file-sha",
            "path": "products/pan-gp.md"
        })))
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/repos/octo/tracker/contents/products/pan-gp.md"))
        .and(body_partial_json(json!({
            "sha": "file-sha",
            "branch": "gpwatch/6.2"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "commit": { "sha": "commit-sha" }
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/tracker/pulls"))
        .and(body_partial_json(json!({
            "head": "gpwatch/6.2",
            "base": "main"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "number": 42,
            "title": "Update GlobalProtect 6.2 to 6.2.8-c317",
            "html_url": "https://github.com/octo/tracker/pull/42",
            "head": { "ref": "gpwatch/6.2" }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn create_opens_pull_request() {
    let server = MockServer::start().await;
    mount_create_flow(&server).await;

    let created = backend(&server)
        .create(new_request("6.2", "6.2.8-c317"))
        .await
        .unwrap();

    assert_eq!(created.id, "42");
    assert_eq!(created.location, "https://github.com/octo/tracker/pull/42");
}

#[tokio::test]
async fn list_open_filters_to_cycle_branches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/tracker/pulls"))
        .and(query_param("state", "open"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "number": 7,
                "title": "Update GlobalProtect 6.2 to 6.2.8-c317",
                "html_url": "https://github.com/octo/tracker/pull/7",
                "head": { "ref": "gpwatch/6.2" }
            },
            {
                "number": 8,
                "title": "Bump serde",
                "html_url": "https://github.com/octo/tracker/pull/8",
                "head": { "ref": "dependabot/cargo/serde-1" }
            }
        ])))
        .mount(&server)
        .await;

    let open = backend(&server).list_open().await.unwrap();

    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, "7");
    assert_eq!(
        open[0].cycle(),
        Some(ReleaseCycle::new("6.2").unwrap())
    );
}

#[tokio::test]
async fn fetch_document_uses_raw_media_type() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/tracker/contents/products/pan-gp.md"))
        .and(query_param("ref", "main"))
        .and(header("accept", "application/vnd.github.raw+json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("---\ntitle: GlobalProtect\n"))
        .mount(&server)
        .await;

    let content = backend(&server).fetch_document().await.unwrap();
    assert!(content.starts_with("---"));
}

#[tokio::test]
async fn api_error_carries_status_and_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/tracker/git/ref/heads/main"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Reference already exists"
        })))
        .mount(&server)
        .await;

    let result = backend(&server).create(new_request("6.2", "6.2.8-c317")).await;

    let err = result.unwrap_err().to_string();
    assert!(err.contains("422"));
    assert!(err.contains("Reference already exists"));
}

#[tokio::test]
async fn one_failed_submission_does_not_block_the_rest() {
    let server = MockServer::start().await;
    mount_create_flow(&server).await;

    // The 6.3 branch creation fails; 6.2 must still go through. Higher
    // priority than the catch-all ref mock in the shared flow.
    Mock::given(method("POST"))
        .and(path("/repos/octo/tracker/git/refs"))
        .and(body_partial_json(json!({ "ref": "refs/heads/gpwatch/6.3" })))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Reference already exists"
        })))
        .with_priority(1)
        .mount(&server)
        .await;

    let backend = backend(&server);
    let results = submit_updates(
        &backend,
        vec![
            new_request("6.3", "6.3.3-c842"),
            new_request("6.2", "6.2.8-c317"),
        ],
    )
    .await;

    assert_eq!(results.len(), 2);
    assert!(results[0].outcome.is_err());
    let created = results[1].outcome.as_ref().unwrap();
    assert_eq!(created.id, "42");
}
