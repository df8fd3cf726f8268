//! Per-run reconciliation of flattened scenes against a sheet snapshot.
//!
//! Each candidate moves from `New` to exactly one terminal placement:
//!
//! - `Matched`  -- the scene ID is already on the sheet; changed cells are
//!   diffed in place. An ID match always wins over free-row insertion.
//! - `Inserted` -- the scene is new and took the next free template row.
//! - `Dropped`  -- no ID, a repeat within this run, or no free row left.
//!   Dropping is not an error; the sheet never grows.
//!
//! The index is derived from the snapshot at the start of the call; no
//! state survives between runs.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::flatten::FlattenedScene;
use crate::layout::UpdatePolicy;
use crate::merge::{update_existing_row, write_into_template_row, WriteBatch};
use crate::sheet::SheetSnapshot;
use crate::sheet_index::{DuplicateSceneId, SheetIndex};
use crate::RowNumber;

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// Why a candidate was not placed on the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    MissingSceneId,
    DuplicateInBatch,
    NoFreeRow,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingSceneId => "missing_scene_id",
            Self::DuplicateInBatch => "duplicate_in_batch",
            Self::NoFreeRow => "no_free_row",
        }
    }
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of one candidate row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "placement", rename_all = "snake_case")]
pub enum Placement {
    Matched { row: RowNumber },
    Inserted { row: RowNumber },
    Dropped { reason: DropReason },
}

impl Placement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matched { .. } => "matched",
            Self::Inserted { .. } => "inserted",
            Self::Dropped { .. } => "dropped",
        }
    }

    pub fn row(&self) -> Option<RowNumber> {
        match self {
            Self::Matched { row } | Self::Inserted { row } => Some(*row),
            Self::Dropped { .. } => None,
        }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Outcome for one candidate, in scraped order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateOutcome {
    pub scene_id: String,
    #[serde(flatten)]
    pub placement: Placement,
    /// Cell writes this candidate contributed to the batch.
    pub writes: usize,
}

/// Result of reconciling one run's candidates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub outcomes: Vec<CandidateOutcome>,
    /// Scene IDs that appear on more than one sheet row.
    pub duplicates: Vec<DuplicateSceneId>,
    pub batch: WriteBatch,
}

impl ReconcileReport {
    pub fn matched(&self) -> usize {
        self.count(|p| matches!(p, Placement::Matched { .. }))
    }

    /// Matched candidates that needed no writes.
    pub fn unchanged(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.placement, Placement::Matched { .. }) && o.writes == 0)
            .count()
    }

    pub fn inserted(&self) -> usize {
        self.count(|p| matches!(p, Placement::Inserted { .. }))
    }

    pub fn dropped(&self) -> usize {
        self.count(|p| matches!(p, Placement::Dropped { .. }))
    }

    fn count(&self, pred: impl Fn(&Placement) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.placement)).count()
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Place every candidate and compute the minimal write batch.
pub fn reconcile(
    candidates: &[FlattenedScene],
    snapshot: &SheetSnapshot,
    policy: &UpdatePolicy,
) -> ReconcileReport {
    let index = SheetIndex::build(snapshot);
    let mut free_rows = index.free_rows().iter().copied();
    let mut inserted_ids: HashSet<&str> = HashSet::new();
    let mut batch = WriteBatch::default();
    let mut outcomes = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let scene_id = candidate.scene_id();

        let (placement, writes) = if scene_id.is_empty() {
            (
                Placement::Dropped {
                    reason: DropReason::MissingSceneId,
                },
                0,
            )
        } else if let Some(row) = index.lookup(scene_id) {
            let old_row = snapshot.row(row).unwrap_or_default();
            let writes = update_existing_row(
                &mut batch,
                row,
                &candidate.cells,
                old_row,
                policy,
                &candidate.performer_links,
            );
            (Placement::Matched { row }, writes)
        } else if !inserted_ids.insert(scene_id) {
            (
                Placement::Dropped {
                    reason: DropReason::DuplicateInBatch,
                },
                0,
            )
        } else if let Some(row) = free_rows.next() {
            let writes = write_into_template_row(
                &mut batch,
                row,
                &candidate.cells,
                &candidate.performer_links,
            );
            (Placement::Inserted { row }, writes)
        } else {
            (
                Placement::Dropped {
                    reason: DropReason::NoFreeRow,
                },
                0,
            )
        };

        match placement {
            Placement::Dropped { reason } => {
                tracing::debug!(scene_id, %reason, "Scene not placed");
            }
            _ => {
                tracing::debug!(
                    scene_id,
                    %placement,
                    row = placement.row(),
                    writes,
                    "Scene placed",
                );
            }
        }

        outcomes.push(CandidateOutcome {
            scene_id: scene_id.to_string(),
            placement,
            writes,
        });
    }

    ReconcileReport {
        outcomes,
        duplicates: index.duplicates().to_vec(),
        batch,
    }
}
