//! Release-cycle reconciliation.
//!
//! A single-pass, pure computation: given the snapshot records, the
//! published state per cycle, and the set of cycles with an open change
//! request, decide which cycles need an update. No clock access, no I/O;
//! identical inputs always produce identical output.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConflictError, ParseError};
use crate::record::VersionRecord;
use crate::types::{GpVersion, ReleaseCycle};

/// Rule for matching a snapshot record to a release cycle.
///
/// The two snapshot schema variants disagree on whether a `component` tag
/// exists, so the rule is an explicit parameter rather than something
/// inferred from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleMatch {
    /// Derive the cycle from the version's `major.minor` prefix.
    #[default]
    VersionPrefix,
    /// Use the record's `component` field as the cycle identifier.
    ComponentTag,
}

/// Newest known build for one release cycle.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The newest version seen for the cycle.
    pub version: GpVersion,
    /// Release date of that version.
    pub released: NaiveDate,
}

/// Published state of one release cycle in the tracker document.
#[derive(Debug, Clone, Default)]
pub struct CycleEntry {
    /// Currently published `latest` version string. `None` or empty when
    /// the cycle has never been published.
    pub latest: Option<String>,
    /// Currently published release date, if any.
    pub latest_release_date: Option<NaiveDate>,
}

/// A proposed change to one release cycle's published entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedUpdate {
    /// The cycle to update.
    pub cycle: ReleaseCycle,
    /// The newer version to publish.
    pub new_version: GpVersion,
    /// The release date of the newer version.
    pub new_date: NaiveDate,
    /// The previously published version, if any.
    pub previous: Option<String>,
}

/// Why a cycle produced no proposal.
#[derive(Debug, Clone)]
pub enum SkipReason {
    /// The published version is already the newest known.
    UpToDate { published: String },
    /// The cycle already has an open change request.
    PendingRequest,
    /// No snapshot record matched the cycle.
    NoCandidates,
    /// The cycle could not be matched unambiguously.
    Conflict(ConflictError),
}

/// One cycle that was considered but not proposed.
#[derive(Debug, Clone)]
pub struct SkippedCycle {
    pub cycle: ReleaseCycle,
    pub reason: SkipReason,
}

/// Outcome of one reconcile pass.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// Proposed updates, at most one per cycle, in cycle order.
    pub proposals: Vec<ProposedUpdate>,
    /// Cycles considered but skipped, with reasons, in cycle order.
    pub skipped: Vec<SkippedCycle>,
    /// Record-level diagnostics from candidate collection.
    pub parse_errors: Vec<ParseError>,
}

impl ReconcileReport {
    /// Returns true if the pass produced no proposals.
    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }
}

/// Per-cycle candidates extracted from the snapshot.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    /// Newest unambiguous candidate per cycle.
    pub candidates: BTreeMap<ReleaseCycle, Candidate>,
    /// Cycles whose newest candidate is ambiguous.
    pub conflicts: BTreeMap<ReleaseCycle, ConflictError>,
    /// Records excluded from consideration, in input order.
    pub parse_errors: Vec<ParseError>,
}

/// Collect the newest candidate per release cycle.
///
/// A record whose version or timestamp fails to parse is excluded and
/// reported, without affecting other records. Two distinct spellings that
/// tie for newest (`6.1.5` vs `6.1.5-c0`) mark the cycle as conflicted;
/// the conflict only stands if nothing strictly newer follows.
pub fn collect_candidates(records: &[VersionRecord], matching: CycleMatch) -> CandidateSet {
    struct Best {
        candidate: Candidate,
        tied: Vec<String>,
    }

    let mut best: BTreeMap<ReleaseCycle, Best> = BTreeMap::new();
    let mut parse_errors = Vec::new();

    for record in records {
        let version = match record.parsed_version() {
            Ok(v) => v,
            Err(e) => {
                debug!(version = %record.version, "skipping unparseable record");
                parse_errors.push(e);
                continue;
            }
        };

        let cycle = match cycle_for(record, &version, matching) {
            Ok(c) => c,
            Err(e) => {
                parse_errors.push(e);
                continue;
            }
        };

        let released = match record.released_date() {
            Ok(d) => d,
            Err(e) => {
                debug!(version = %record.version, "skipping record with bad timestamp");
                parse_errors.push(e);
                continue;
            }
        };

        match best.get_mut(&cycle) {
            None => {
                best.insert(
                    cycle,
                    Best {
                        candidate: Candidate { version, released },
                        tied: Vec::new(),
                    },
                );
            }
            Some(entry) => {
                if version > entry.candidate.version {
                    entry.candidate = Candidate { version, released };
                    entry.tied.clear();
                } else if version == entry.candidate.version
                    && version.as_str() != entry.candidate.version.as_str()
                    && !entry.tied.iter().any(|t| t.as_str() == version.as_str())
                {
                    entry.tied.push(version.as_str().to_string());
                }
            }
        }
    }

    let mut candidates = BTreeMap::new();
    let mut conflicts = BTreeMap::new();

    for (cycle, entry) in best {
        if entry.tied.is_empty() {
            candidates.insert(cycle, entry.candidate);
        } else {
            let mut versions = vec![entry.candidate.version.as_str().to_string()];
            versions.extend(entry.tied);
            conflicts.insert(
                cycle,
                ConflictError::AmbiguousCandidates {
                    cycle: cycle.to_string(),
                    versions,
                },
            );
        }
    }

    CandidateSet {
        candidates,
        conflicts,
        parse_errors,
    }
}

fn cycle_for(
    record: &VersionRecord,
    version: &GpVersion,
    matching: CycleMatch,
) -> Result<ReleaseCycle, ParseError> {
    match matching {
        CycleMatch::VersionPrefix => Ok(version.cycle()),
        CycleMatch::ComponentTag => match &record.component {
            Some(tag) => ReleaseCycle::new(tag),
            None => Err(ParseError::MissingComponent {
                version: record.version.clone(),
            }),
        },
    }
}

/// Compute the proposed updates for one reconcile pass.
///
/// For each cycle present in `entries`, the newest snapshot candidate is
/// compared against the published version. A strictly newer candidate
/// yields a proposal unless the cycle already has an open change request.
/// Ties are not updates. Conflicted or unmatched cycles are skipped with
/// a reason rather than aborting the pass.
pub fn compute_updates(
    records: &[VersionRecord],
    entries: &BTreeMap<ReleaseCycle, CycleEntry>,
    open_requests: &BTreeSet<ReleaseCycle>,
    matching: CycleMatch,
) -> ReconcileReport {
    let CandidateSet {
        candidates,
        conflicts,
        parse_errors,
    } = collect_candidates(records, matching);

    let mut proposals = Vec::new();
    let mut skipped = Vec::new();

    for (cycle, entry) in entries {
        if let Some(conflict) = conflicts.get(cycle) {
            skipped.push(SkippedCycle {
                cycle: *cycle,
                reason: SkipReason::Conflict(conflict.clone()),
            });
            continue;
        }

        let Some(candidate) = candidates.get(cycle) else {
            skipped.push(SkippedCycle {
                cycle: *cycle,
                reason: SkipReason::NoCandidates,
            });
            continue;
        };

        let published = entry.latest.as_deref().filter(|s| !s.is_empty());
        let published_version = match published {
            Some(raw) => match GpVersion::new(raw) {
                Ok(v) => Some(v),
                Err(_) => {
                    skipped.push(SkippedCycle {
                        cycle: *cycle,
                        reason: SkipReason::Conflict(ConflictError::UnparseablePublished {
                            cycle: cycle.to_string(),
                            value: raw.to_string(),
                        }),
                    });
                    continue;
                }
            },
            // Never published: anything known is newer.
            None => None,
        };

        let is_newer = match &published_version {
            Some(current) => candidate.version > *current,
            None => true,
        };

        if !is_newer {
            skipped.push(SkippedCycle {
                cycle: *cycle,
                reason: SkipReason::UpToDate {
                    published: published.unwrap_or_default().to_string(),
                },
            });
            continue;
        }

        if open_requests.contains(cycle) {
            debug!(cycle = %cycle, "cycle already has an open request");
            skipped.push(SkippedCycle {
                cycle: *cycle,
                reason: SkipReason::PendingRequest,
            });
            continue;
        }

        proposals.push(ProposedUpdate {
            cycle: *cycle,
            new_version: candidate.version.clone(),
            new_date: candidate.released,
            previous: published.map(str::to_string),
        });
    }

    ReconcileReport {
        proposals,
        skipped,
        parse_errors,
    }
}
