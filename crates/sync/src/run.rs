//! One sync run: load inputs, reconcile, write outputs.

use serde::Serialize;

use scenesheet_core::flatten::{flatten_scene, FlattenedScene};
use scenesheet_core::reconcile::{reconcile, ReconcileReport};
use scenesheet_core::requests::batch_update_body;

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::loader::{load_reference, load_scenes, load_snapshot, write_json};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub scenes: usize,
    pub matched: usize,
    pub unchanged: usize,
    pub inserted: usize,
    pub dropped: usize,
    pub writes: usize,
    pub rich_text_writes: usize,
    pub duplicate_sheet_ids: usize,
}

impl RunSummary {
    fn from_report(scenes: usize, report: &ReconcileReport) -> Self {
        Self {
            scenes,
            matched: report.matched(),
            unchanged: report.unchanged(),
            inserted: report.inserted(),
            dropped: report.dropped(),
            writes: report.batch.len(),
            rich_text_writes: report.batch.rich_text_count(),
            duplicate_sheet_ids: report.duplicates.len(),
        }
    }
}

/// Execute a full run with the given configuration.
///
/// Always writes the request body, even when it is empty, so callers can
/// tell a no-op run from a failed one.
pub fn run(config: &SyncConfig) -> SyncResult<RunSummary> {
    tracing::info!(
        scenes_file = %config.scenes_file.display(),
        snapshot_file = %config.snapshot_file.display(),
        performer = %config.performer_name,
        hyperlinks = config.flatten.hyperlinks_enabled,
        "Starting scene sync",
    );

    let scenes = load_scenes(&config.scenes_file)?;
    let reference = load_reference(config);
    let mut snapshot = load_snapshot(&config.snapshot_file)?;

    let candidates: Vec<FlattenedScene> = scenes
        .iter()
        .map(|scene| flatten_scene(scene, &config.performer_name, &reference, config.flatten))
        .collect();

    let report = reconcile(&candidates, &snapshot, &config.policy);

    let body = batch_update_body(&report.batch, config.sheet_id);
    write_json(&config.output_file, &body)?;
    tracing::info!(
        path = %config.output_file.display(),
        requests = body.requests.len(),
        "Wrote batch update body",
    );

    if let Some(path) = &config.updated_snapshot_file {
        snapshot.apply(&report.batch);
        write_json(path, &snapshot.to_grid())?;
        tracing::info!(path = %path.display(), "Wrote updated snapshot");
    }

    let summary = RunSummary::from_report(scenes.len(), &report);
    tracing::info!(
        scenes = summary.scenes,
        matched = summary.matched,
        unchanged = summary.unchanged,
        inserted = summary.inserted,
        dropped = summary.dropped,
        writes = summary.writes,
        rich_text_writes = summary.rich_text_writes,
        duplicate_sheet_ids = summary.duplicate_sheet_ids,
        "Scene sync complete",
    );

    Ok(summary)
}
