//! Text normalization shared by the flattener and the sheet index.
//!
//! - Name normalization for set membership and map lookups
//! - Scene ID normalization so scraped and sheet-stored IDs compare equal
//! - Smart title case and the network display alias table
//! - `=HYPERLINK(...)` formula rendering

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Invisible characters stripped from scene IDs before comparison.
pub const INVISIBLE_ID_CHARS: &[char] = &[
    '\u{00a0}', '\u{200b}', '\u{200c}', '\u{200d}', '\u{200e}', '\u{200f}', '\u{2060}',
    '\u{feff}',
];

/// Display aliases for known networks, keyed by trimmed lowercase name.
pub const NETWORK_DISPLAY_ALIASES: &[(&str, &str)] = &[
    ("fantasy massage", "Adult Time - Fantasy Massage"),
    ("girlsway", "Adult Time - Girlsway"),
    ("vixen media", "Vixen Media Group"),
];

// ---------------------------------------------------------------------------
// Whitespace and identity normalization
// ---------------------------------------------------------------------------

/// Replace non-breaking spaces and collapse runs of whitespace.
pub fn normalize_whitespace(text: &str) -> String {
    text.replace('\u{00a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercased, trimmed, whitespace-collapsed form used for lookups.
///
/// Applied to performer names before testing the male/trans sets and to
/// studio/site names before consulting the site-to-network map.
pub fn normalize_name(name: &str) -> String {
    normalize_whitespace(&name.to_lowercase())
}

/// Normalize a scene ID for matching between scraped JSON and the sheet.
///
/// ```
/// use scenesheet_core::text::normalize_scene_id;
///
/// assert_eq!(normalize_scene_id("\u{200b} 12345\u{00a0}"), "12345");
/// ```
pub fn normalize_scene_id(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !INVISIBLE_ID_CHARS.contains(c))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Title case
// ---------------------------------------------------------------------------

fn is_cased(c: char) -> bool {
    c.is_lowercase() || c.is_uppercase()
}

/// At least one cased letter and no lowercase letters.
fn is_all_upper(word: &str) -> bool {
    word.chars().any(is_cased) && !word.chars().any(char::is_lowercase)
}

/// At least one cased letter and no uppercase letters.
fn is_all_lower(word: &str) -> bool {
    word.chars().any(is_cased) && !word.chars().any(char::is_uppercase)
}

/// Capitalize the first letter of every letter run (`o'neil` -> `O'Neil`).
fn capitalize_letter_runs(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev_cased = false;
    for c in word.chars() {
        if is_cased(c) {
            if prev_cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_cased = true;
        } else {
            out.push(c);
            prev_cased = false;
        }
    }
    out
}

/// Smart title case.
///
/// Strips `?`, then title-cases only tokens written entirely in lowercase.
/// Tokens containing a digit, all-uppercase tokens (acronyms such as `VR`)
/// and mixed-case tokens (brand names) are kept as written.
///
/// ```
/// use scenesheet_core::text::to_title_case;
///
/// assert_eq!(to_title_case("the GREAT escape"), "The GREAT Escape");
/// assert_eq!(to_title_case("VR UHD Scene"), "VR UHD Scene");
/// ```
pub fn to_title_case(value: &str) -> String {
    value
        .replace('?', "")
        .split_whitespace()
        .map(|word| {
            if word.chars().any(char::is_numeric) || is_all_upper(word) || !is_all_lower(word) {
                word.to_string()
            } else {
                capitalize_letter_runs(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Display names and hyperlinks
// ---------------------------------------------------------------------------

/// Map a raw network name to its display alias, if one is defined.
pub fn apply_network_alias(name: &str) -> &str {
    let key = name.trim().to_lowercase();
    NETWORK_DISPLAY_ALIASES
        .iter()
        .find(|(raw, _)| *raw == key)
        .map(|(_, alias)| *alias)
        .unwrap_or(name)
}

/// Display text for a group/network/studio/site name.
pub fn entity_display_name(name: &str) -> String {
    to_title_case(apply_network_alias(name))
}

/// Render a Google Sheets `HYPERLINK` formula, or plain text when links
/// are disabled or no URL is known.
pub fn make_hyperlink(url: Option<&str>, text: &str, enabled: bool) -> String {
    match url {
        Some(url) if enabled && !url.is_empty() => format!(
            "=HYPERLINK(\"{}\", \"{}\")",
            url.replace('"', "\"\""),
            text.replace('"', "\"\"")
        ),
        _ => text.to_string(),
    }
}
