//! Scene duration normalization.
//!
//! Scrapers report durations either as clock strings (`29:16`, `1:02:03`)
//! or as already-formatted text (`29 min, 16 sec`). The sheet stores the
//! long form.

use std::sync::LazyLock;

use regex::Regex;

static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+):(\d{2})(?::(\d{2}))?$").expect("valid regex"));

static UNIT_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(hr|min|sec)\b").expect("valid regex"));

static ZERO_HOURS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0 hr,\s*").expect("valid regex"));

fn join_units(hours: u64, minutes: u64, seconds: u64) -> String {
    [(hours, "hr"), (minutes, "min"), (seconds, "sec")]
        .iter()
        .filter(|(value, _)| *value != 0)
        .map(|(value, unit)| format!("{value} {unit}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convert a raw duration into `N hr, N min, N sec` form.
///
/// - `HH:MM:SS` and `MM:SS` become a comma-joined list of the non-zero
///   components; `MM:SS` minutes of 60 or more roll over into hours.
/// - Text that already uses `hr`/`min`/`sec` passes through with a leading
///   `0 hr,` removed.
/// - Anything else is returned unchanged (trimmed). Blank input yields "".
///
/// ```
/// use scenesheet_core::duration::convert_duration;
///
/// assert_eq!(convert_duration("5:09"), "5 min, 9 sec");
/// assert_eq!(convert_duration("1:02:03"), "1 hr, 2 min, 3 sec");
/// ```
pub fn convert_duration(raw: &str) -> String {
    let duration = raw.trim();
    if duration.is_empty() {
        return String::new();
    }

    if let Some(caps) = CLOCK_RE.captures(duration) {
        let number = |i: usize| -> Option<u64> { caps.get(i)?.as_str().parse().ok() };
        let converted = match (number(1), number(2), caps.get(3)) {
            (Some(hours), Some(minutes), Some(_)) => {
                number(3).map(|seconds| join_units(hours, minutes, seconds))
            }
            (Some(total_minutes), Some(seconds), None) => {
                Some(join_units(total_minutes / 60, total_minutes % 60, seconds))
            }
            _ => None,
        };
        // Components too large to count are left as scraped.
        return converted.unwrap_or_else(|| duration.to_string());
    }

    if UNIT_WORD_RE.is_match(duration) {
        return ZERO_HOURS_RE.replace(duration, "").trim().to_string();
    }

    duration.to_string()
}
