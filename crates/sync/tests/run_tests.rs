//! Integration tests for a full file-based sync run.
//!
//! Each test writes its inputs into a temporary directory, runs the sync,
//! and inspects the request body and updated snapshot it leaves behind.

use std::fs;
use std::path::{Path, PathBuf};

use assert_matches::assert_matches;
use serde_json::{json, Value};

use scenesheet_core::flatten::FlattenOptions;
use scenesheet_core::layout::UpdatePolicy;
use scenesheet_sync::config::SyncConfig;
use scenesheet_sync::error::SyncError;
use scenesheet_sync::run::run;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn write(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, value.to_string()).expect("fixture should be written");
    path
}

fn read(path: &Path) -> Value {
    let raw = fs::read_to_string(path).expect("output should exist");
    serde_json::from_str(&raw).expect("output should be JSON")
}

fn blank_row() -> Vec<Value> {
    vec![json!(""); 24]
}

fn template_row(row: u32) -> Vec<Value> {
    let mut cells = blank_row();
    cells[0] = json!("=ROW()-1");
    cells[9] = json!(format!("=IMAGE(Q{row})"));
    cells[11] = json!(false);
    cells
}

fn config(dir: &Path, scenes: &Value, snapshot: &Value) -> SyncConfig {
    SyncConfig {
        scenes_file: write(dir, "jane_doe_scenes.json", scenes),
        snapshot_file: write(dir, "snapshot.json", snapshot),
        male_performers_file: Some(write(dir, "male.json", &json!([{"name": "Johnny Sins"}]))),
        trans_performers_file: None,
        networks_file: Some(dir.join("missing_networks.json")),
        performer_name: "Jane Doe".to_string(),
        flatten: FlattenOptions::default(),
        sheet_id: 987,
        policy: UpdatePolicy::default(),
        output_file: dir.join("out/batch_update.json"),
        updated_snapshot_file: Some(dir.join("out/snapshot.json")),
    }
}

fn scenes() -> Value {
    json!([
        {
            "scene_id": 501,
            "scene_title": "First Scene",
            "performers": [
                {"name": "Jane Doe", "url": "https://p/jane"},
                {"name": "Johnny Sins"}
            ],
            "studio": {"name": "Digital Playground", "pair_url": "https://dp"}
        },
        {"scene_id": "502", "scene_title": "Second Scene"},
        {"scene_title": "No ID"}
    ])
}

fn snapshot() -> Value {
    json!([
        ["ID", "Pornstar", "Scene ID"],
        template_row(2),
        template_row(3)
    ])
}

// ---------------------------------------------------------------------------
// Test: outputs
// ---------------------------------------------------------------------------

/// A full run writes a request body whose size matches the summary, with
/// every request aimed at the configured sheet.
#[test]
fn run_writes_request_body_and_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config(dir.path(), &scenes(), &snapshot());

    let summary = run(&config).expect("run should succeed");
    assert_eq!(summary.scenes, 3);
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.dropped, 1);
    assert_eq!(summary.matched, 0);
    assert_eq!(summary.rich_text_writes, 1);

    let body = read(&config.output_file);
    let requests = body["requests"].as_array().expect("requests array");
    assert_eq!(requests.len(), summary.writes);
    assert!(requests
        .iter()
        .all(|r| r["updateCells"]["range"]["sheetId"] == 987));
}

/// The updated snapshot holds the new scene values next to the original
/// template formulas and checkboxes.
#[test]
fn updated_snapshot_keeps_template_cells() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config(dir.path(), &scenes(), &snapshot());
    run(&config).expect("run should succeed");

    let grid = read(config.updated_snapshot_file.as_ref().expect("configured"));
    assert_eq!(grid[0][0], "ID");
    assert_eq!(grid[1][0], "=ROW()-1");
    assert_eq!(grid[1][2], "501");
    assert_eq!(grid[1][11], "FALSE");
    assert_eq!(grid[1][4], "Johnny Sins {1}");
    assert_eq!(grid[1][5]["value"], "Jane Doe {1}");
    assert_eq!(grid[1][5]["runs"][0]["link"], "https://p/jane");
    assert_eq!(grid[2][2], "502");
}

/// Running again against the updated snapshot matches every scene and
/// writes an empty request body.
#[test]
fn rerun_against_updated_snapshot_is_a_no_op() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = config(dir.path(), &scenes(), &snapshot());
    run(&first).expect("first run should succeed");

    let second = SyncConfig {
        snapshot_file: first.updated_snapshot_file.clone().expect("configured"),
        output_file: dir.path().join("second/batch_update.json"),
        updated_snapshot_file: None,
        ..first.clone()
    };
    let summary = run(&second).expect("second run should succeed");
    assert_eq!(summary.matched, 2);
    assert_eq!(summary.unchanged, 2);
    assert_eq!(summary.writes, 0);
    assert_eq!(read(&second.output_file), json!({"requests": []}));
}

// ---------------------------------------------------------------------------
// Test: failures
// ---------------------------------------------------------------------------

/// A missing snapshot fails the run before any output is written.
#[test]
fn missing_snapshot_aborts_without_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config(dir.path(), &scenes(), &snapshot());
    config.snapshot_file = dir.path().join("nope.json");

    assert_matches!(run(&config), Err(SyncError::Io { .. }));
    assert!(!config.output_file.exists());
}

/// A scenes file that is not a JSON array is a decode error.
#[test]
fn scenes_file_must_be_an_array() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config(dir.path(), &json!({"scene_id": 1}), &snapshot());
    assert_matches!(run(&config), Err(SyncError::Json { .. }));
}
