//! Tracker document parsing and patching.
//!
//! The upstream tracker document is a markdown file whose front matter
//! lists one release block per cycle:
//!
//! ```text
//! releases:
//!   - releaseCycle: "6.3"
//!     releaseDate: 2024-09-10
//!     latest: "6.3.3-c842"
//!     latestReleaseDate: 2025-12-17
//! ```
//!
//! Patching rewrites only the `latest` and `latestReleaseDate` lines of
//! affected blocks; everything else is preserved byte for byte so the
//! resulting change request is a minimal diff.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, instrument};

use gpwatch_core::Result;
use gpwatch_core::error::FatalInputError;
use gpwatch_core::reconcile::{CycleEntry, ProposedUpdate};
use gpwatch_core::traits::DocumentSource;
use gpwatch_core::types::ReleaseCycle;

/// Line prefix that opens a release block.
const BLOCK_PREFIX: &str = "  - releaseCycle: ";

/// Field indent inside a release block.
const FIELD_INDENT: &str = "    ";

/// One applied change, for the run summary.
#[derive(Debug, Clone)]
pub struct AppliedChange {
    /// The cycle that was patched.
    pub cycle: ReleaseCycle,
    /// The previously published version, if any.
    pub previous: Option<String>,
    /// The version now published.
    pub new_version: String,
}

/// A parsed tracker document.
#[derive(Debug, Clone)]
pub struct TrackerDocument {
    content: String,
    blocks: Vec<ReleaseBlock>,
}

#[derive(Debug, Clone)]
struct ReleaseBlock {
    /// Parsed cycle tag; `None` when the tag is not a cycle identifier
    /// (such blocks are left untouched).
    cycle: Option<ReleaseCycle>,
    latest: Option<String>,
    latest_release_date: Option<NaiveDate>,
    start: usize,
    end: usize,
}

impl TrackerDocument {
    /// Parse a tracker document from its full text content.
    ///
    /// `origin` names the source (file path or repository path) for
    /// diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`FatalInputError::Document`] when the content has no
    /// release blocks at all; a document this logic cannot see into is a
    /// fatal input, not an empty result.
    pub fn parse(content: impl Into<String>, origin: &str) -> Result<Self> {
        let content = content.into();
        let blocks = scan_blocks(&content);

        if blocks.is_empty() {
            return Err(FatalInputError::Document {
                path: origin.to_string(),
                message: "no release blocks found".to_string(),
            }
            .into());
        }

        debug!(blocks = blocks.len(), origin, "parsed tracker document");

        Ok(Self { content, blocks })
    }

    /// Returns the original document content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Published state per release cycle, in cycle order.
    pub fn entries(&self) -> BTreeMap<ReleaseCycle, CycleEntry> {
        self.blocks
            .iter()
            .filter_map(|block| {
                let cycle = block.cycle?;
                Some((
                    cycle,
                    CycleEntry {
                        latest: block.latest.clone(),
                        latest_release_date: block.latest_release_date,
                    },
                ))
            })
            .collect()
    }

    /// Apply proposed updates, producing the patched content and a change
    /// note per affected block. Updates for cycles the document does not
    /// list are ignored.
    pub fn apply(&self, updates: &[ProposedUpdate]) -> (String, Vec<AppliedChange>) {
        let by_cycle: BTreeMap<ReleaseCycle, &ProposedUpdate> =
            updates.iter().map(|u| (u.cycle, u)).collect();

        let mut content = self.content.clone();
        let mut changes = Vec::new();

        // Reverse order keeps earlier block offsets valid while splicing.
        for block in self.blocks.iter().rev() {
            let Some(cycle) = block.cycle else { continue };
            let Some(update) = by_cycle.get(&cycle) else {
                continue;
            };

            let patched = patch_block(&self.content[block.start..block.end], update);
            content.replace_range(block.start..block.end, &patched);

            changes.push(AppliedChange {
                cycle,
                previous: block.latest.clone(),
                new_version: update.new_version.to_string(),
            });
        }

        changes.reverse();
        (content, changes)
    }
}

/// Scan the content for release blocks with their byte spans.
///
/// A block runs from its `releaseCycle` line to the next block, the
/// closing `---` fence, or the end of the content.
fn scan_blocks(content: &str) -> Vec<ReleaseBlock> {
    let mut starts = Vec::new();
    let mut fence_after: Option<usize> = None;

    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);

        if body.starts_with(BLOCK_PREFIX) {
            starts.push(offset);
        } else if body == "---" && !starts.is_empty() && fence_after.is_none() {
            fence_after = Some(offset);
        }

        offset += line.len();
    }

    let mut blocks = Vec::new();
    for (i, &start) in starts.iter().enumerate() {
        let end = starts
            .get(i + 1)
            .copied()
            .or(fence_after)
            .unwrap_or(content.len());

        blocks.push(parse_block(content, start, end));
    }

    blocks
}

fn parse_block(content: &str, start: usize, end: usize) -> ReleaseBlock {
    let text = &content[start..end];

    let tag = text
        .lines()
        .next()
        .and_then(|line| line.strip_prefix(BLOCK_PREFIX))
        .map(|value| value.trim().trim_matches('"'))
        .unwrap_or_default();

    let cycle = match ReleaseCycle::new(tag) {
        Ok(c) => Some(c),
        Err(_) => {
            debug!(tag, "release block tag is not a cycle; leaving untouched");
            None
        }
    };

    let latest = field_value(text, "latest").map(str::to_string);
    let latest_release_date = field_value(text, "latestReleaseDate").and_then(|value| {
        value.parse::<NaiveDate>().ok().or_else(|| {
            debug!(value, "ignoring unparseable latestReleaseDate");
            None
        })
    });

    ReleaseBlock {
        cycle,
        latest,
        latest_release_date,
        start,
        end,
    }
}

/// Extract a block field's value, quotes stripped.
fn field_value<'a>(block: &'a str, field: &str) -> Option<&'a str> {
    block.lines().find_map(|line| {
        line.strip_prefix(FIELD_INDENT)
            .and_then(|rest| rest.strip_prefix(field))
            .and_then(|rest| rest.strip_prefix(':'))
            .map(|value| value.trim().trim_matches('"'))
    })
}

/// Rewrite one block's `latest` and `latestReleaseDate` lines, inserting
/// the date line after `latest` when the block never had one.
fn patch_block(block: &str, update: &ProposedUpdate) -> String {
    let has_date = block
        .lines()
        .any(|line| line.starts_with("    latestReleaseDate:"));

    let mut out = String::with_capacity(block.len() + 40);

    for line in block.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);
        let ending = &line[body.len()..];

        if body.starts_with("    latest:") {
            out.push_str(&format!("    latest: \"{}\"", update.new_version));
            if !has_date {
                out.push_str(if ending.is_empty() { "\n" } else { ending });
                out.push_str(&format!("    latestReleaseDate: {}", update.new_date));
            }
            out.push_str(ending);
        } else if body.starts_with("    latestReleaseDate:") {
            out.push_str(&format!("    latestReleaseDate: {}", update.new_date));
            out.push_str(ending);
        } else {
            out.push_str(line);
        }
    }

    out
}

/// A tracker document on the local filesystem.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    path: PathBuf,
}

impl DocumentFile {
    /// Create a document source for the given file path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the document file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the document.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<TrackerDocument> {
        let content = self.fetch_document().await?;
        TrackerDocument::parse(content, &self.path.display().to_string())
    }
}

#[async_trait]
impl DocumentSource for DocumentFile {
    async fn fetch_document(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| {
                FatalInputError::Read {
                    path: self.path.display().to_string(),
                    message: e.to_string(),
                }
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpwatch_core::GpVersion;

    const DOC: &str = "\
---
title: GlobalProtect
category: app
releases:
  - releaseCycle: \"6.3\"
    releaseDate: 2024-09-10
    latest: \"6.3.2-c650\"
    latestReleaseDate: 2025-06-02
    link: https://docs.example.com/6-3
  - releaseCycle: \"6.2\"
    releaseDate: 2023-06-21
    latest: \"6.2.8-c263\"
    latestReleaseDate: 2025-01-10
  - releaseCycle: \"6.1\"
    releaseDate: 2022-08-15
    latest: \"6.1.5\"
---

GlobalProtect release tracking.
";

    fn update(cycle: &str, version: &str, date: &str) -> ProposedUpdate {
        ProposedUpdate {
            cycle: ReleaseCycle::new(cycle).unwrap(),
            new_version: GpVersion::new(version).unwrap(),
            new_date: date.parse().unwrap(),
            previous: None,
        }
    }

    #[test]
    fn parses_entries() {
        let doc = TrackerDocument::parse(DOC, "pan-gp.md").unwrap();
        let entries = doc.entries();

        assert_eq!(entries.len(), 3);
        let entry = &entries[&ReleaseCycle::new("6.2").unwrap()];
        assert_eq!(entry.latest.as_deref(), Some("6.2.8-c263"));
        assert_eq!(
            entry.latest_release_date,
            Some("2025-01-10".parse().unwrap())
        );

        // Last block has no date field.
        let entry = &entries[&ReleaseCycle::new("6.1").unwrap()];
        assert_eq!(entry.latest.as_deref(), Some("6.1.5"));
        assert!(entry.latest_release_date.is_none());
    }

    #[test]
    fn no_blocks_is_fatal() {
        let result = TrackerDocument::parse("---\ntitle: empty\n---\n", "empty.md");
        assert!(result.is_err());
    }

    #[test]
    fn patches_latest_and_date() {
        let doc = TrackerDocument::parse(DOC, "pan-gp.md").unwrap();
        let (content, changes) =
            doc.apply(&[update("6.2", "6.2.8-c317", "2025-04-03")]);

        assert!(content.contains("    latest: \"6.2.8-c317\"\n    latestReleaseDate: 2025-04-03\n"));
        // Other blocks untouched.
        assert!(content.contains("    latest: \"6.3.2-c650\"\n"));
        assert!(content.contains("    latest: \"6.1.5\"\n"));

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].previous.as_deref(), Some("6.2.8-c263"));
        assert_eq!(changes[0].new_version, "6.2.8-c317");
    }

    #[test]
    fn inserts_missing_date_line() {
        let doc = TrackerDocument::parse(DOC, "pan-gp.md").unwrap();
        let (content, _) = doc.apply(&[update("6.1", "6.1.6-c12", "2025-02-20")]);

        assert!(content.contains("    latest: \"6.1.6-c12\"\n    latestReleaseDate: 2025-02-20\n"));
    }

    #[test]
    fn preserves_everything_else() {
        let doc = TrackerDocument::parse(DOC, "pan-gp.md").unwrap();
        let (content, _) = doc.apply(&[update("6.2", "6.2.8-c317", "2025-04-03")]);

        assert!(content.starts_with("---\ntitle: GlobalProtect\n"));
        assert!(content.ends_with("GlobalProtect release tracking.\n"));
        assert!(content.contains("    link: https://docs.example.com/6-3\n"));
        assert!(content.contains("    releaseDate: 2023-06-21\n"));
    }

    #[test]
    fn unknown_cycles_are_ignored() {
        let doc = TrackerDocument::parse(DOC, "pan-gp.md").unwrap();
        let (content, changes) = doc.apply(&[update("9.9", "9.9.9", "2025-01-01")]);

        assert_eq!(content, DOC);
        assert!(changes.is_empty());
    }

    #[test]
    fn multiple_updates_in_one_pass() {
        let doc = TrackerDocument::parse(DOC, "pan-gp.md").unwrap();
        let (content, changes) = doc.apply(&[
            update("6.3", "6.3.3-c842", "2025-12-17"),
            update("6.1", "6.1.6-c12", "2025-02-20"),
        ]);

        assert!(content.contains("    latest: \"6.3.3-c842\"\n"));
        assert!(content.contains("    latest: \"6.1.6-c12\"\n"));
        assert_eq!(changes.len(), 2);
        // Changes come back in document order.
        assert_eq!(changes[0].cycle.to_string(), "6.3");
        assert_eq!(changes[1].cycle.to_string(), "6.1");
    }

    #[test]
    fn non_cycle_block_tags_are_skipped() {
        let doc = "\
releases:
  - releaseCycle: \"legacy\"
    latest: \"1.0\"
  - releaseCycle: \"6.2\"
    latest: \"6.2.8-c263\"
---
";
        let parsed = TrackerDocument::parse(doc, "pan-gp.md").unwrap();
        assert_eq!(parsed.entries().len(), 1);
    }

    #[tokio::test]
    async fn document_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pan-gp.md");
        tokio::fs::write(&path, DOC).await.unwrap();

        let doc = DocumentFile::new(&path).load().await.unwrap();
        assert_eq!(doc.entries().len(), 3);
    }

    #[tokio::test]
    async fn missing_document_file_is_fatal() {
        let result = DocumentFile::new("/nonexistent/pan-gp.md").load().await;
        assert!(result.is_err());
    }
}
