//! File-backed change-request storage.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};

use gpwatch_core::Result;
use gpwatch_core::error::SubmissionError;
use gpwatch_core::traits::{ChangeRequests, CreatedRequest, NewRequest, OpenRequest};

/// A directory of pending change requests.
///
/// Offline counterpart to a hosted change-request backend: `create` writes
/// the patched document next to a metadata file, and `list_open` reads the
/// metadata back, so re-runs against the same directory deduplicate
/// exactly like runs against a hosted backend. A CI job can pick the
/// written documents up and turn them into real requests.
#[derive(Debug, Clone)]
pub struct RequestDir {
    root: PathBuf,
}

impl RequestDir {
    /// Create a request store rooted at the given directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Convert a head branch name into a filesystem-safe file stem.
    fn stem_for(head: &str) -> String {
        head.replace('/', "-")
    }

    fn meta_path(&self, stem: &str) -> PathBuf {
        self.root.join(format!("{stem}.json"))
    }

    fn document_path(&self, stem: &str) -> PathBuf {
        self.root.join(format!("{stem}.md"))
    }

    fn write_error(&self, path: &Path, err: std::io::Error) -> SubmissionError {
        SubmissionError::Write {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl ChangeRequests for RequestDir {
    /// List previously written requests. A missing root directory means
    /// no requests, not an error.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn list_open(&self) -> Result<Vec<OpenRequest>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.root).map_err(|e| SubmissionError::Write {
            path: self.root.display().to_string(),
            message: e.to_string(),
        })?;

        let mut requests = Vec::new();

        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }

            if let Ok(content) = fs::read_to_string(&path)
                && let Ok(request) = serde_json::from_str::<OpenRequest>(&content)
            {
                requests.push(request);
            }
        }

        requests.sort_by(|a, b| a.head.cmp(&b.head));

        debug!(count = requests.len(), "listed pending requests");

        Ok(requests)
    }

    #[instrument(skip(self, request), fields(head = %request.head))]
    async fn create(&self, request: NewRequest) -> Result<CreatedRequest> {
        fs::create_dir_all(&self.root).map_err(|e| self.write_error(&self.root, e))?;

        let stem = Self::stem_for(&request.head);
        let document_path = self.document_path(&stem);
        let meta_path = self.meta_path(&stem);

        fs::write(&document_path, &request.document)
            .map_err(|e| self.write_error(&document_path, e))?;

        let meta = OpenRequest {
            id: stem.clone(),
            title: request.title.clone(),
            head: request.head.clone(),
        };
        let content = serde_json::to_string_pretty(&meta).map_err(|e| SubmissionError::Write {
            path: meta_path.display().to_string(),
            message: e.to_string(),
        })?;
        fs::write(&meta_path, content).map_err(|e| self.write_error(&meta_path, e))?;

        debug!(document = %document_path.display(), "wrote pending request");

        Ok(CreatedRequest {
            id: stem,
            location: document_path.display().to_string(),
        })
    }
}
