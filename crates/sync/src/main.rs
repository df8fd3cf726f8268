//! `scenesheet-sync` -- reconcile scraped scenes with a worksheet snapshot.
//!
//! Reads one performer's scraped scenes and a snapshot of their worksheet,
//! and writes the Sheets `batchUpdate` body that brings the sheet up to
//! date. Configuration comes from the environment (or a `.env` file); see
//! [`SyncConfig::from_env`] for the full table.
//!
//! # Environment variables
//!
//! | Variable              | Required | Default             | Description                      |
//! |-----------------------|----------|---------------------|----------------------------------|
//! | `SCENES_FILE`         | yes      | --                  | Scraped scenes JSON              |
//! | `SHEET_SNAPSHOT_FILE` | yes      | --                  | Worksheet rows JSON, header first|
//! | `OUTPUT_FILE`         | no       | `batch_update.json` | Encoded request body             |
//! | `RUST_LOG`            | no       | `scenesheet_sync=info,scenesheet_core=info` | Log filter |

use scenesheet_sync::config::SyncConfig;
use scenesheet_sync::run;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scenesheet_sync=info,scenesheet_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SyncConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    if let Err(e) = run::run(&config) {
        tracing::error!(error = %e, "Scene sync failed");
        std::process::exit(1);
    }
}
