//! Document source trait.

use async_trait::async_trait;

use crate::Result;

/// A source of the upstream tracker document.
///
/// The document is owned by the upstream project; implementations read
/// its current content and never write it back directly.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the tracker document's current content.
    async fn fetch_document(&self) -> Result<String>;
}
