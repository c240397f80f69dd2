//! gpwatch-core - Core types and reconcile logic for the gpwatch release tracker.

pub mod error;
pub mod reconcile;
pub mod record;
pub mod traits;
pub mod types;

pub use error::Error;
pub use reconcile::{
    Candidate, CandidateSet, CycleEntry, CycleMatch, ProposedUpdate, ReconcileReport, SkipReason,
    SkippedCycle, collect_candidates, compute_updates,
};
pub use record::{ReleaseType, VersionRecord};
pub use traits::{
    ChangeRequests, CreatedRequest, DocumentSource, NewRequest, OpenRequest, SubmissionResult,
    VersionSource, submit_updates,
};
pub use types::{GpVersion, ReleaseCycle};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
