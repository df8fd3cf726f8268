use std::path::PathBuf;

use scenesheet_core::flatten::FlattenOptions;
use scenesheet_core::layout::UpdatePolicy;
use scenesheet_core::naming::performer_from_filename;

use crate::error::{SyncError, SyncResult};

/// Default path of the encoded `batchUpdate` body.
pub const DEFAULT_OUTPUT_FILE: &str = "batch_update.json";

/// Sync run configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Scraped scenes JSON for one performer.
    pub scenes_file: PathBuf,
    /// Snapshot of the performer's worksheet, header row first.
    pub snapshot_file: PathBuf,
    pub male_performers_file: Option<PathBuf>,
    pub trans_performers_file: Option<PathBuf>,
    pub networks_file: Option<PathBuf>,
    /// Performer the worksheet belongs to (column B).
    pub performer_name: String,
    pub flatten: FlattenOptions,
    /// Numeric worksheet ID used in request ranges.
    pub sheet_id: i64,
    pub policy: UpdatePolicy,
    pub output_file: PathBuf,
    /// Where to persist the snapshot with this run's writes applied.
    pub updated_snapshot_file: Option<PathBuf>,
}

impl SyncConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                          |
    /// |-------------------------|----------------------------------|
    /// | `SCENES_FILE`           | required                         |
    /// | `SHEET_SNAPSHOT_FILE`   | required                         |
    /// | `MALE_PERFORMERS_FILE`  | none (empty list)                |
    /// | `TRANS_PERFORMERS_FILE` | none (empty list)                |
    /// | `NETWORKS_FILE`         | none (empty map)                 |
    /// | `PERFORMER_NAME`        | derived from the scenes file name|
    /// | `HYPERLINKS`            | `on`                             |
    /// | `TITLE_CASE_TITLES`     | `false`                          |
    /// | `SHEET_ID`              | `0`                              |
    /// | `UPDATEABLE_COLUMNS`    | every flattened column           |
    /// | `OUTPUT_FILE`           | `batch_update.json`              |
    /// | `UPDATED_SNAPSHOT_FILE` | none (not written)               |
    pub fn from_env() -> SyncResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup. Blank
    /// values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SyncResult<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| var(key).ok_or(SyncError::MissingEnv(key));
        let path = |key: &str| var(key).map(PathBuf::from);

        let scenes_file = PathBuf::from(required("SCENES_FILE")?);
        let snapshot_file = PathBuf::from(required("SHEET_SNAPSHOT_FILE")?);

        let performer_name =
            var("PERFORMER_NAME").unwrap_or_else(|| performer_from_filename(&scenes_file));

        let hyperlinks_enabled = match var("HYPERLINKS") {
            Some(value) => parse_flag("HYPERLINKS", &value)?,
            None => true,
        };
        let title_case_titles = match var("TITLE_CASE_TITLES") {
            Some(value) => parse_flag("TITLE_CASE_TITLES", &value)?,
            None => false,
        };

        let sheet_id: i64 = match var("SHEET_ID") {
            Some(value) => value.parse().map_err(|_| SyncError::InvalidEnv {
                var: "SHEET_ID",
                value: value.clone(),
                reason: "must be an integer".to_string(),
            })?,
            None => 0,
        };

        let policy = match var("UPDATEABLE_COLUMNS") {
            Some(value) => UpdatePolicy::from_letters(&value)?,
            None => UpdatePolicy::default(),
        };

        Ok(Self {
            scenes_file,
            snapshot_file,
            male_performers_file: path("MALE_PERFORMERS_FILE"),
            trans_performers_file: path("TRANS_PERFORMERS_FILE"),
            networks_file: path("NETWORKS_FILE"),
            performer_name,
            flatten: FlattenOptions {
                hyperlinks_enabled,
                title_case_titles,
            },
            sheet_id,
            policy,
            output_file: path("OUTPUT_FILE").unwrap_or_else(|| DEFAULT_OUTPUT_FILE.into()),
            updated_snapshot_file: path("UPDATED_SNAPSHOT_FILE"),
        })
    }
}

/// Accepts `on`/`off`, `true`/`false`, `yes`/`no` and `1`/`0`.
fn parse_flag(var: &'static str, value: &str) -> SyncResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(SyncError::InvalidEnv {
            var,
            value: value.to_string(),
            reason: "expected on or off".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;
    use scenesheet_core::error::CoreError;
    use scenesheet_core::layout::Column;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> SyncResult<SyncConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SyncConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("SCENES_FILE", "scenes/jane_doe_scenes_and_details.json"),
        ("SHEET_SNAPSHOT_FILE", "snapshots/jane_doe.json"),
    ];

    #[test]
    fn defaults_applied() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.performer_name, "Jane Doe");
        assert!(config.flatten.hyperlinks_enabled);
        assert!(!config.flatten.title_case_titles);
        assert_eq!(config.sheet_id, 0);
        assert_eq!(config.policy, UpdatePolicy::default());
        assert_eq!(config.output_file, PathBuf::from(DEFAULT_OUTPUT_FILE));
        assert!(config.networks_file.is_none());
        assert!(config.updated_snapshot_file.is_none());
    }

    #[test]
    fn missing_scenes_file_rejected() {
        let result = load(&[("SHEET_SNAPSHOT_FILE", "s.json")]);
        assert_matches!(result, Err(SyncError::MissingEnv("SCENES_FILE")));
    }

    #[test]
    fn blank_value_counts_as_unset() {
        let result = load(&[("SCENES_FILE", "  "), ("SHEET_SNAPSHOT_FILE", "s.json")]);
        assert_matches!(result, Err(SyncError::MissingEnv("SCENES_FILE")));
    }

    #[test]
    fn overrides_parsed() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("PERFORMER_NAME", "Someone Else"),
            ("HYPERLINKS", "off"),
            ("TITLE_CASE_TITLES", "true"),
            ("SHEET_ID", "123456"),
            ("UPDATEABLE_COLUMNS", "i,p"),
            ("OUTPUT_FILE", "out/requests.json"),
        ]);
        let config = load(&vars).unwrap();
        assert_eq!(config.performer_name, "Someone Else");
        assert!(!config.flatten.hyperlinks_enabled);
        assert!(config.flatten.title_case_titles);
        assert_eq!(config.sheet_id, 123456);
        assert_eq!(
            config.policy.columns().collect::<Vec<_>>(),
            vec![Column::Title, Column::Duration]
        );
        assert_eq!(config.output_file, PathBuf::from("out/requests.json"));
    }

    #[test]
    fn bad_flag_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("HYPERLINKS", "sometimes"));
        assert_matches!(load(&vars), Err(SyncError::InvalidEnv { var: "HYPERLINKS", .. }));
    }

    #[test]
    fn bad_sheet_id_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("SHEET_ID", "abc"));
        assert_matches!(load(&vars), Err(SyncError::InvalidEnv { var: "SHEET_ID", .. }));
    }

    #[test]
    fn template_column_in_policy_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("UPDATEABLE_COLUMNS", "A,I"));
        assert_matches!(load(&vars), Err(SyncError::Core(CoreError::Validation(_))));
    }
}
