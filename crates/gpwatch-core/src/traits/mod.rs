//! Backend traits for snapshot, document, and change-request access.

mod change_requests;
mod document_source;
mod version_source;

pub use change_requests::{
    ChangeRequests, CreatedRequest, NewRequest, OpenRequest, SubmissionResult, branch_for,
    cycle_from_branch, submit_updates,
};
pub use document_source::DocumentSource;
pub use version_source::VersionSource;
