//! Error types for the gpwatch libraries.
//!
//! This module provides a unified error type with explicit variants for
//! record parsing, cycle-matching conflicts, change-request submission,
//! and fatal input failures.

use thiserror::Error;

/// The unified error type for gpwatch operations.
///
/// Parse and conflict errors are recoverable per record or per cycle; a
/// fatal input error aborts the whole run.
#[derive(Debug, Error)]
pub enum Error {
    /// A record or published value could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A release cycle could not be matched to a single candidate.
    #[error("conflict: {0}")]
    Conflict(#[from] ConflictError),

    /// A change request could not be submitted.
    #[error("submission error: {0}")]
    Submission(#[from] SubmissionError),

    /// A required input was unreadable or malformed at the top level.
    #[error("fatal input error: {0}")]
    FatalInput(#[from] FatalInputError),
}

/// Record-level parse errors.
///
/// These isolate a single record (or a single published value); they never
/// abort reconciliation of other cycles.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Version string does not match `MAJOR.MINOR.PATCH[-cBUILD]`.
    #[error("invalid version '{value}'")]
    Version { value: String },

    /// Release cycle identifier does not match `MAJOR.MINOR`.
    #[error("invalid release cycle '{value}'")]
    Cycle { value: String },

    /// Release timestamp does not match `YYYY/MM/DD HH:mm:ss`.
    #[error("invalid timestamp '{value}': {reason}")]
    Timestamp { value: String, reason: String },

    /// A record is missing the field the matching rule needs.
    #[error("record '{version}' has no component tag")]
    MissingComponent { version: String },
}

/// Cycle-level matching conflicts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConflictError {
    /// Two distinct version spellings tie for newest in the same cycle.
    #[error("cycle {cycle} has ambiguous candidates: {}", .versions.join(", "))]
    AmbiguousCandidates { cycle: String, versions: Vec<String> },

    /// The published version in the tracker document cannot be parsed.
    #[error("cycle {cycle} has unparseable published version '{value}'")]
    UnparseablePublished { cycle: String, value: String },
}

/// Change-request submission errors.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The backend configuration is unusable (bad API URL or repository).
    #[error("invalid backend configuration: {message}")]
    Config { message: String },

    /// Network transport failed (DNS, TLS, connection).
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// The change-request API rejected the operation.
    #[error("API error: HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Api { status: u16, message: Option<String> },

    /// The API returned a body the client could not interpret.
    #[error("unexpected API response: {message}")]
    InvalidResponse { message: String },

    /// A file-backed request sink could not be written.
    #[error("failed to write request to {path}: {message}")]
    Write { path: String, message: String },
}

/// Fatal input errors.
///
/// The only condition that aborts a run: a required external input cannot
/// be read or makes no sense at the top level.
#[derive(Debug, Error)]
pub enum FatalInputError {
    /// Input file could not be read.
    #[error("cannot read {path}: {message}")]
    Read { path: String, message: String },

    /// Input bytes are not valid UTF-8 or UTF-16 text.
    #[error("cannot decode {path}: {message}")]
    Encoding { path: String, message: String },

    /// The snapshot is not a JSON array of version records.
    #[error("malformed snapshot {path}: {message}")]
    Snapshot { path: String, message: String },

    /// The tracker document has no recognizable release blocks.
    #[error("malformed tracker document {path}: {message}")]
    Document { path: String, message: String },
}
