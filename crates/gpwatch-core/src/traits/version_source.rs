//! Version source trait.

use async_trait::async_trait;

use crate::Result;
use crate::record::VersionRecord;

/// A source of snapshot records.
///
/// The source is externally owned and periodically overwritten with a
/// complete snapshot; implementations only ever read it.
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Read the current snapshot of all known version records.
    async fn snapshot(&self) -> Result<Vec<VersionRecord>>;
}
