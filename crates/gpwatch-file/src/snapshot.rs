//! Snapshot file loading.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};

use gpwatch_core::Result;
use gpwatch_core::error::{Error, FatalInputError};
use gpwatch_core::record::VersionRecord;
use gpwatch_core::traits::VersionSource;

/// A snapshot file on disk.
///
/// The file is owned by an external feed job that periodically overwrites
/// it with a complete snapshot; this type only ever reads it. The feed has
/// shipped the file as UTF-8, UTF-8 with BOM, and UTF-16 (both endians)
/// over time, so decoding sniffs the BOM before deserializing.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    /// Create a snapshot source for the given file path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and deserialize the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`FatalInputError`] when the file cannot be read, decoded,
    /// or parsed as a JSON array of records. Nothing in a run can proceed
    /// without the snapshot.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<Vec<VersionRecord>> {
        let display = self.path.display().to_string();

        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| FatalInputError::Read {
                path: display.clone(),
                message: e.to_string(),
            })?;

        let text = decode_text(&bytes, &display)?;

        let records: Vec<VersionRecord> =
            serde_json::from_str(&text).map_err(|e| FatalInputError::Snapshot {
                path: display,
                message: e.to_string(),
            })?;

        debug!(count = records.len(), "loaded snapshot records");

        Ok(records)
    }
}

#[async_trait]
impl VersionSource for SnapshotFile {
    async fn snapshot(&self) -> Result<Vec<VersionRecord>> {
        self.load().await
    }
}

/// Decode snapshot bytes into text, sniffing the BOM.
fn decode_text(bytes: &[u8], path: &str) -> std::result::Result<String, Error> {
    let encoding_error = |message: String| {
        Error::FatalInput(FatalInputError::Encoding {
            path: path.to_string(),
            message,
        })
    };

    match bytes {
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes).map_err(encoding_error),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes).map_err(encoding_error),
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8(rest.to_vec())
            .map_err(|e| encoding_error(e.to_string())),
        _ => String::from_utf8(bytes.to_vec()).map_err(|e| encoding_error(e.to_string())),
    }
}

fn decode_utf16(
    bytes: &[u8],
    from_bytes: fn([u8; 2]) -> u16,
) -> std::result::Result<String, String> {
    if bytes.len() % 2 != 0 {
        return Err("UTF-16 content has an odd byte count".to_string());
    }

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| from_bytes([pair[0], pair[1]]))
        .collect();

    String::from_utf16(&units).map_err(|e| e.to_string())
}
