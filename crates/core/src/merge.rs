//! Row merger: turns a candidate row into cell writes.
//!
//! Two entry points, chosen by the reconciliation driver:
//!
//! - [`update_existing_row`] diffs a candidate against the row that
//!   already holds the scene and emits only the cells that change, using
//!   each column's [`MergeRule`].
//! - [`write_into_template_row`] fills a free template row, leaving the
//!   label column and every sheet-owned placeholder untouched.
//!
//! Writes are collected in a [`WriteBatch`] and applied by the caller as
//! one unit.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::flatten::TRANS_SUFFIX;
use crate::layout::{Column, MergeRule, UpdatePolicy};
use crate::sheet::{SheetCell, TextRun};
use crate::text::normalize_name;
use crate::RowNumber;

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// A plain value written to one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellWrite {
    pub row: RowNumber,
    pub column: Column,
    pub value: String,
}

/// A full rich-text replacement of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RichTextWrite {
    pub row: RowNumber,
    pub column: Column,
    pub text: String,
    pub runs: Vec<TextRun>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SheetWrite {
    Value(CellWrite),
    RichText(RichTextWrite),
}

impl SheetWrite {
    pub fn row(&self) -> RowNumber {
        match self {
            Self::Value(w) => w.row,
            Self::RichText(w) => w.row,
        }
    }

    pub fn column(&self) -> Column {
        match self {
            Self::Value(w) => w.column,
            Self::RichText(w) => w.column,
        }
    }
}

/// Writes accumulated over a run, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteBatch {
    writes: Vec<SheetWrite>,
}

impl WriteBatch {
    pub fn push_value(&mut self, write: CellWrite) {
        self.writes.push(SheetWrite::Value(write));
    }

    pub fn push_rich_text(&mut self, write: RichTextWrite) {
        self.writes.push(SheetWrite::RichText(write));
    }

    pub fn writes(&self) -> &[SheetWrite] {
        &self.writes
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn rich_text_count(&self) -> usize {
        self.writes
            .iter()
            .filter(|w| matches!(w, SheetWrite::RichText(_)))
            .count()
    }
}

// ---------------------------------------------------------------------------
// URL lists
// ---------------------------------------------------------------------------

/// Union two newline-separated URL lists: trimmed, de-duplicated, sorted.
///
/// Keeps cross-reference links added by hand while adding newly scraped
/// ones.
///
/// ```
/// use scenesheet_core::merge::merge_urls;
///
/// assert_eq!(
///     merge_urls("https://b\nhttps://a", "https://a\nhttps://c"),
///     "https://a\nhttps://b\nhttps://c"
/// );
/// ```
pub fn merge_urls(old: &str, new: &str) -> String {
    old.split('\n')
        .chain(new.split('\n'))
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Performer rich text
// ---------------------------------------------------------------------------

fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Performer name from a `Name {count}` or `Name {count} (Trans)` entry.
pub fn performer_name_from_entry(entry: &str) -> &str {
    let entry = entry.trim();
    let entry = entry.strip_suffix(TRANS_SUFFIX).unwrap_or(entry).trim_end();
    match entry.rfind(" {") {
        Some(pos) if entry.ends_with('}') => entry[..pos].trim_end(),
        _ => entry,
    }
}

/// Hyperlink runs for a performer cell: each performer's name links to its
/// URL, and the link ends where the name ends.
pub fn performer_runs(text: &str, links: &HashMap<String, String>) -> Vec<TextRun> {
    let total = utf16_len(text);
    let mut runs = Vec::new();
    let mut offset = 0;

    for line in text.split('\n') {
        let leading = utf16_len(&line[..line.len() - line.trim_start().len()]);
        let name = performer_name_from_entry(line);
        if let Some(url) = links.get(&normalize_name(name)) {
            let start = offset + leading;
            let end = start + utf16_len(name);
            runs.push(TextRun::link(start, url.clone()));
            if end < total {
                runs.push(TextRun::unlinked(end));
            }
        }
        offset += utf16_len(line) + 1;
    }

    runs
}

// ---------------------------------------------------------------------------
// Update path
// ---------------------------------------------------------------------------

fn new_text(cells: &[Option<String>], column: Column) -> Option<&str> {
    cells.get(column.index()).and_then(|c| c.as_deref())
}

fn old_cell(row: &[SheetCell], column: Column) -> Option<&SheetCell> {
    row.get(column.index())
}

/// Diff a candidate row against the sheet row that already holds the
/// scene and enqueue the changed cells. Returns the number of writes.
///
/// Only columns in `policy` are considered, and placeholder (`None`)
/// cells are never written.
pub fn update_existing_row(
    batch: &mut WriteBatch,
    row: RowNumber,
    new_cells: &[Option<String>],
    old_row: &[SheetCell],
    policy: &UpdatePolicy,
    performer_links: &HashMap<String, String>,
) -> usize {
    let before = batch.len();

    for column in policy.columns() {
        let Some(new) = new_text(new_cells, column) else {
            continue;
        };
        let old = old_cell(old_row, column);
        let old_value = old.map(|c| c.value.as_str()).unwrap_or("");

        match column.merge_rule() {
            MergeRule::RichText if !new.is_empty() => {
                let runs = performer_runs(new, performer_links);
                let unchanged = old.is_some_and(|c| c.value == new && c.runs == runs);
                if !unchanged {
                    batch.push_rich_text(RichTextWrite {
                        row,
                        column,
                        text: new.to_string(),
                        runs,
                    });
                }
            }
            MergeRule::Protect => {
                if old_value.trim().is_empty() && !new.trim().is_empty() {
                    batch.push_value(CellWrite {
                        row,
                        column,
                        value: new.to_string(),
                    });
                }
            }
            MergeRule::MergeUrls => {
                let merged = merge_urls(old_value, new);
                if merged != old_value {
                    batch.push_value(CellWrite {
                        row,
                        column,
                        value: merged,
                    });
                }
            }
            MergeRule::RichText | MergeRule::Overwrite => {
                if new != old_value {
                    batch.push_value(CellWrite {
                        row,
                        column,
                        value: new.to_string(),
                    });
                }
            }
        }
    }

    batch.len() - before
}

// ---------------------------------------------------------------------------
// Insert path
// ---------------------------------------------------------------------------

/// Fill a free template row with a new scene. Returns the number of writes.
///
/// Placeholder (`None`) cells and the label column are never written, so
/// template formulas and hand-kept labels survive. Performer cells with
/// known links are written as rich text.
pub fn write_into_template_row(
    batch: &mut WriteBatch,
    row: RowNumber,
    cells: &[Option<String>],
    performer_links: &HashMap<String, String>,
) -> usize {
    let before = batch.len();

    for (index, value) in cells.iter().enumerate() {
        let (Some(column), Some(value)) = (Column::from_index(index), value) else {
            continue;
        };
        if column == Column::Label {
            continue;
        }

        if column.merge_rule() == MergeRule::RichText && !value.is_empty() {
            let runs = performer_runs(value, performer_links);
            if !runs.is_empty() {
                batch.push_rich_text(RichTextWrite {
                    row,
                    column,
                    text: value.clone(),
                    runs,
                });
                continue;
            }
        }

        batch.push_value(CellWrite {
            row,
            column,
            value: value.clone(),
        });
    }

    batch.len() - before
}
