//! Change-request trait and submission helpers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Error;
use crate::reconcile::ProposedUpdate;
use crate::types::ReleaseCycle;

/// Head-branch prefix that tags a change request with its release cycle.
const BRANCH_PREFIX: &str = "gpwatch/";

/// Returns the conventional head branch name for a cycle's request.
pub fn branch_for(cycle: ReleaseCycle) -> String {
    format!("{BRANCH_PREFIX}{cycle}")
}

/// Extract the release cycle from a conventional head branch name.
///
/// Returns `None` for branches that do not follow the convention; those
/// requests are simply not ours to deduplicate against.
pub fn cycle_from_branch(branch: &str) -> Option<ReleaseCycle> {
    let tag = branch.strip_prefix(BRANCH_PREFIX)?;
    ReleaseCycle::new(tag).ok()
}

/// An open change request, used only for deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRequest {
    /// Backend-assigned identifier (PR number, file stem).
    pub id: String,
    /// Request title.
    pub title: String,
    /// Head branch name.
    pub head: String,
}

impl OpenRequest {
    /// Returns the release cycle this request is tagged with, if any.
    pub fn cycle(&self) -> Option<ReleaseCycle> {
        cycle_from_branch(&self.head)
    }
}

/// A change request to be created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequest {
    /// The release cycle the request updates.
    pub cycle: ReleaseCycle,
    /// Request title.
    pub title: String,
    /// Request body.
    pub body: String,
    /// Head branch to create the change on.
    pub head: String,
    /// Full patched tracker-document content to publish on the branch.
    pub document: String,
}

impl NewRequest {
    /// Build the conventional request for one proposed update.
    pub fn for_update(update: &ProposedUpdate, document: String) -> Self {
        let title = format!(
            "Update GlobalProtect {} to {}",
            update.cycle, update.new_version
        );
        let body = match &update.previous {
            Some(previous) => format!(
                "GlobalProtect {cycle} has a newer release: {previous} -> {version} \
                 (released {date}).",
                cycle = update.cycle,
                previous = previous,
                version = update.new_version,
                date = update.new_date,
            ),
            None => format!(
                "GlobalProtect {cycle} has its first tracked release: {version} \
                 (released {date}).",
                cycle = update.cycle,
                version = update.new_version,
                date = update.new_date,
            ),
        };

        Self {
            cycle: update.cycle,
            title,
            body,
            head: branch_for(update.cycle),
            document,
        }
    }
}

/// A successfully created change request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedRequest {
    /// Backend-assigned identifier (PR number, file stem).
    pub id: String,
    /// Location of the created request (URL or filesystem path).
    pub location: String,
}

/// A change-request backend.
///
/// Credentials and transport are the implementation's concern; callers
/// only see the two operations the reconciler needs.
#[async_trait]
pub trait ChangeRequests: Send + Sync {
    /// List the currently open change requests.
    async fn list_open(&self) -> crate::Result<Vec<OpenRequest>>;

    /// Create a new change request.
    async fn create(&self, request: NewRequest) -> crate::Result<CreatedRequest>;
}

/// Outcome of one submission attempt.
#[derive(Debug)]
pub struct SubmissionResult {
    /// The cycle the request was for.
    pub cycle: ReleaseCycle,
    /// Created request, or the error that prevented creation.
    pub outcome: Result<CreatedRequest, Error>,
}

/// Submit each request through the backend, independently.
///
/// A failure for one item is recorded and does not block the remaining
/// items; submissions are not transactional.
pub async fn submit_updates<C>(client: &C, requests: Vec<NewRequest>) -> Vec<SubmissionResult>
where
    C: ChangeRequests + ?Sized,
{
    let mut results = Vec::with_capacity(requests.len());

    for request in requests {
        let cycle = request.cycle;
        debug!(cycle = %cycle, head = %request.head, "submitting change request");

        let outcome = client.create(request).await;
        if let Err(e) = &outcome {
            warn!(cycle = %cycle, error = %e, "change request submission failed");
        }

        results.push(SubmissionResult { cycle, outcome });
    }

    results
}
