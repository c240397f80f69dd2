//! gpwatch-file - Filesystem-backed inputs and request storage for gpwatch.

mod document;
mod requests;
mod snapshot;

pub use document::{AppliedChange, DocumentFile, TrackerDocument};
pub use requests::RequestDir;
pub use snapshot::SnapshotFile;
