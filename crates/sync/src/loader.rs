//! JSON file loading and output writing.
//!
//! Scenes and the sheet snapshot are required: failing to read them aborts
//! the run. Reference files are optional; a missing or unreadable one is
//! logged and treated as empty.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use scenesheet_core::reference::{NetworkRecord, PerformerRecord, ReferenceData};
use scenesheet_core::scene::Scene;
use scenesheet_core::sheet::{SheetCell, SheetSnapshot};

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};

// ---------------------------------------------------------------------------
// Generic JSON I/O
// ---------------------------------------------------------------------------

/// Read and decode a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> SyncResult<T> {
    let raw = fs::read_to_string(path).map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SyncError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty-print a value to a JSON file, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> SyncResult<()> {
    let io_error = |source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| SyncError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(io_error)
}

/// Read an optional reference file. Failures are logged and yield `None`.
fn read_optional<T: DeserializeOwned>(path: Option<&Path>, kind: &str) -> Option<T> {
    let path = path?;
    match read_json(path) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(kind, error = %e, "Reference file unavailable, using empty data");
            None
        }
    }
}

/// Read an optional list of reference records. Entries that do not decode
/// are skipped one by one instead of discarding the whole file.
fn read_optional_records<T: DeserializeOwned>(path: Option<&Path>, kind: &str) -> Vec<T> {
    let values: Vec<Value> = read_optional(path, kind).unwrap_or_default();
    values
        .into_iter()
        .enumerate()
        .filter_map(|(position, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(kind, position, error = %e, "Skipping undecodable reference entry");
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Load scraped scenes. Array entries that are not objects are skipped.
pub fn load_scenes(path: &Path) -> SyncResult<Vec<Scene>> {
    let values: Vec<Value> = read_json(path)?;
    let total = values.len();

    let scenes: Vec<Scene> = values
        .into_iter()
        .enumerate()
        .filter_map(|(position, value)| {
            if !value.is_object() {
                tracing::warn!(position, "Skipping scene entry that is not an object");
                return None;
            }
            match serde_json::from_value(value) {
                Ok(scene) => Some(scene),
                Err(e) => {
                    tracing::warn!(position, error = %e, "Skipping undecodable scene entry");
                    None
                }
            }
        })
        .collect();

    tracing::info!(
        path = %path.display(),
        scenes = scenes.len(),
        skipped = total - scenes.len(),
        "Loaded scraped scenes",
    );
    Ok(scenes)
}

/// Load the male, trans, and network reference files named in `config`.
pub fn load_reference(config: &SyncConfig) -> ReferenceData {
    let male: Vec<PerformerRecord> =
        read_optional_records(config.male_performers_file.as_deref(), "male_performers");
    let trans: Vec<PerformerRecord> =
        read_optional_records(config.trans_performers_file.as_deref(), "trans_performers");
    let networks: Vec<NetworkRecord> =
        read_optional_records(config.networks_file.as_deref(), "networks");

    let reference = ReferenceData::from_records(&male, &trans, &networks);
    tracing::info!(
        male = reference.male_count(),
        trans = reference.trans_count(),
        mapped_sites = reference.mapped_site_count(),
        "Loaded reference data",
    );
    reference
}

/// Load the worksheet snapshot: a JSON array of rows, header first.
pub fn load_snapshot(path: &Path) -> SyncResult<SheetSnapshot> {
    let grid: Vec<Vec<SheetCell>> = read_json(path)?;
    let snapshot = SheetSnapshot::from_grid(grid);
    tracing::info!(
        path = %path.display(),
        data_rows = snapshot.data_rows().len(),
        "Loaded sheet snapshot",
    );
    Ok(snapshot)
}
