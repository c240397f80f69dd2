//! GitHub-backed change-request implementation.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{debug, instrument};

use gpwatch_core::Result;
use gpwatch_core::traits::{ChangeRequests, CreatedRequest, DocumentSource, NewRequest, OpenRequest};

use crate::api_url::RepoRef;
use crate::client::GithubClient;

/// Response from the git ref endpoint.
#[derive(Debug, serde::Deserialize)]
struct RefResponse {
    object: RefObject,
}

#[derive(Debug, serde::Deserialize)]
struct RefObject {
    sha: String,
}

/// Request body for branch creation.
#[derive(Debug, serde::Serialize)]
struct CreateRefRequest<'a> {
    #[serde(rename = "ref")]
    git_ref: String,
    sha: &'a str,
}

/// Response from the contents endpoint (metadata shape).
#[derive(Debug, serde::Deserialize)]
struct ContentResponse {
    sha: String,
}

/// Request body for a contents update.
#[derive(Debug, serde::Serialize)]
struct UpdateContentRequest<'a> {
    message: &'a str,
    content: String,
    sha: &'a str,
    branch: &'a str,
}

/// Response from the contents update endpoint. The commit details are not
/// needed; deserializing into an empty shape tolerates any body.
#[derive(Debug, serde::Deserialize)]
struct UpdateContentResponse {}

/// Request body for pull-request creation.
#[derive(Debug, serde::Serialize)]
struct CreatePullRequest<'a> {
    title: &'a str,
    body: &'a str,
    head: &'a str,
    base: &'a str,
}

/// Response from pull-request endpoints.
#[derive(Debug, serde::Deserialize)]
struct PullResponse {
    number: u64,
    #[serde(default)]
    title: String,
    html_url: String,
    head: PullHead,
}

#[derive(Debug, serde::Deserialize)]
struct PullHead {
    #[serde(rename = "ref")]
    git_ref: String,
}

/// Query for listing open pull requests.
#[derive(Debug, serde::Serialize)]
struct ListPullsQuery {
    state: &'static str,
    per_page: u32,
}

/// A GitHub-hosted change-request backend.
///
/// Proposals become pull requests against `base`: a branch is created from
/// the base ref, the tracker document is committed to it, and a pull
/// request is opened. Listing filters to requests whose head branch
/// carries the cycle tag convention.
#[derive(Debug, Clone)]
pub struct GithubRequests {
    client: GithubClient,
    repo: RepoRef,
    doc_path: String,
    base: String,
}

impl GithubRequests {
    /// Create a backend for the given repository.
    ///
    /// `doc_path` is the tracker document's path within the repository;
    /// `base` is the branch requests are opened against.
    pub fn new(
        client: GithubClient,
        repo: RepoRef,
        doc_path: impl Into<String>,
        base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            repo,
            doc_path: doc_path.into(),
            base: base.into(),
        }
    }

    /// Returns the repository this backend targets.
    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    fn repo_path(&self, rest: &str) -> String {
        format!(
            "repos/{}/{}/{}",
            self.repo.owner(),
            self.repo.name(),
            rest
        )
    }

    async fn base_sha(&self) -> Result<String> {
        let path = self.repo_path(&format!("git/ref/heads/{}", self.base));
        let no_params: [(&str, &str); 0] = [];
        let response: RefResponse = self.client.get(&path, &no_params).await?;
        Ok(response.object.sha)
    }

    async fn create_branch(&self, head: &str, sha: &str) -> Result<()> {
        let path = self.repo_path("git/refs");
        let request = CreateRefRequest {
            git_ref: format!("refs/heads/{head}"),
            sha,
        };
        self.client.post_no_response(&path, &request).await?;
        Ok(())
    }

    async fn document_sha(&self) -> Result<String> {
        let path = self.repo_path(&format!("contents/{}", self.doc_path));
        let response: ContentResponse =
            self.client.get(&path, &[("ref", self.base.as_str())]).await?;
        Ok(response.sha)
    }

    async fn put_document(&self, request: &NewRequest, file_sha: &str) -> Result<()> {
        let path = self.repo_path(&format!("contents/{}", self.doc_path));
        let body = UpdateContentRequest {
            message: &request.title,
            content: BASE64.encode(request.document.as_bytes()),
            sha: file_sha,
            branch: &request.head,
        };
        let _: UpdateContentResponse = self.client.put(&path, &body).await?;
        Ok(())
    }

    async fn open_pull(&self, request: &NewRequest) -> Result<PullResponse> {
        let path = self.repo_path("pulls");
        let body = CreatePullRequest {
            title: &request.title,
            body: &request.body,
            head: &request.head,
            base: &self.base,
        };
        self.client.post(&path, &body).await
    }
}

#[async_trait]
impl DocumentSource for GithubRequests {
    /// Fetch the tracker document's content at the base branch.
    #[instrument(skip(self), fields(repo = %self.repo))]
    async fn fetch_document(&self) -> Result<String> {
        let path = self.repo_path(&format!("contents/{}", self.doc_path));
        self.client
            .get_raw(&path, &[("ref", self.base.as_str())])
            .await
    }
}

#[async_trait]
impl ChangeRequests for GithubRequests {
    #[instrument(skip(self), fields(repo = %self.repo))]
    async fn list_open(&self) -> Result<Vec<OpenRequest>> {
        let path = self.repo_path("pulls");
        let query = ListPullsQuery {
            state: "open",
            per_page: 100,
        };

        let pulls: Vec<PullResponse> = self.client.get(&path, &query).await?;

        let requests: Vec<OpenRequest> = pulls
            .into_iter()
            .map(|pull| OpenRequest {
                id: pull.number.to_string(),
                title: pull.title,
                head: pull.head.git_ref,
            })
            .filter(|request| request.cycle().is_some())
            .collect();

        debug!(count = requests.len(), "listed open cycle requests");

        Ok(requests)
    }

    #[instrument(skip(self, request), fields(repo = %self.repo, head = %request.head))]
    async fn create(&self, request: NewRequest) -> Result<CreatedRequest> {
        let base_sha = self.base_sha().await?;
        self.create_branch(&request.head, &base_sha).await?;

        let file_sha = self.document_sha().await?;
        self.put_document(&request, &file_sha).await?;

        let pull = self.open_pull(&request).await?;

        debug!(number = pull.number, url = %pull.html_url, "opened pull request");

        Ok(CreatedRequest {
            id: pull.number.to_string(),
            location: pull.html_url,
        })
    }
}
