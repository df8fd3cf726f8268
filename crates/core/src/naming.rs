//! Performer naming convention for scraped scene files.
//!
//! Scrapers write one JSON file per performer, named after the performer
//! with a suffix describing the contents.

use std::path::Path;

/// File-stem suffixes written by the scrapers, longest first.
pub const SCRAPED_FILE_SUFFIXES: &[&str] = &[
    "_scenes_and_details_fixed",
    "_scenes_and_details",
    "_scenes",
    "_details",
];

/// Derive the performer display name from a scraped scenes file.
///
/// Convention: `{performer}{_suffix}.json`
///
/// - the stem is lowercased and the first matching suffix is removed
/// - `-` and `_` become spaces
/// - every word is capitalized
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use scenesheet_core::naming::performer_from_filename;
///
/// assert_eq!(performer_from_filename(Path::new("sunny_leone_scenes.json")), "Sunny Leone");
/// assert_eq!(performer_from_filename(Path::new("data/ava-addams_details.json")), "Ava Addams");
/// ```
pub fn performer_from_filename(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let base = SCRAPED_FILE_SUFFIXES
        .iter()
        .find_map(|suffix| stem.strip_suffix(suffix))
        .unwrap_or(&stem);

    base.replace(['-', '_'], " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
