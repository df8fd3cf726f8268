//! In-memory snapshot of a scene worksheet.
//!
//! The snapshot is captured once per run and is the only view of the sheet
//! the index builder and merger see. Cells carry their text and any rich
//! text runs, so performer hyperlinks written by a previous run can be
//! compared against the ones a new run would write.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::layout::COLUMN_COUNT;
use crate::merge::{SheetWrite, WriteBatch};
use crate::{RowNumber, FIRST_DATA_ROW};

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// A formatting run inside a rich-text cell. The run applies from
/// `start_index` until the next run; `link: None` ends a hyperlink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    /// Offset in UTF-16 code units, as the Sheets API counts them.
    pub start_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl TextRun {
    pub fn link(start_index: usize, url: impl Into<String>) -> Self {
        Self {
            start_index,
            link: Some(url.into()),
        }
    }

    pub fn unlinked(start_index: usize) -> Self {
        Self {
            start_index,
            link: None,
        }
    }
}

/// One cell as read from the sheet (formula text for formula cells).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawCell")]
pub struct SheetCell {
    pub value: String,
    pub runs: Vec<TextRun>,
}

/// Plain cells serialize as bare strings so persisted snapshots stay
/// readable; rich text cells keep their runs.
impl Serialize for SheetCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.runs.is_empty() {
            return serializer.serialize_str(&self.value);
        }
        let mut state = serializer.serialize_struct("SheetCell", 2)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("runs", &self.runs)?;
        state.end()
    }
}

impl SheetCell {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            runs: Vec::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl From<&str> for SheetCell {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

/// Snapshot files hold plain values for most cells and objects for rich
/// text cells.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCell {
    Empty,
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    Rich {
        #[serde(default)]
        value: String,
        #[serde(default)]
        runs: Vec<TextRun>,
    },
}

impl From<RawCell> for SheetCell {
    fn from(raw: RawCell) -> Self {
        match raw {
            RawCell::Empty => Self::default(),
            RawCell::Text(s) => Self::text(s),
            RawCell::Number(n) => Self::text(n.to_string()),
            RawCell::Flag(b) => Self::text(if b { "TRUE" } else { "FALSE" }),
            RawCell::Rich { value, runs } => Self { value, runs },
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Worksheet contents: an optional header row plus data rows, each padded
/// or truncated to [`COLUMN_COUNT`] cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetSnapshot {
    header: Vec<SheetCell>,
    rows: Vec<Vec<SheetCell>>,
}

fn fit_row(mut row: Vec<SheetCell>) -> Vec<SheetCell> {
    row.resize(COLUMN_COUNT, SheetCell::default());
    row
}

impl SheetSnapshot {
    /// Build from a full grid whose first row is the header.
    pub fn from_grid(grid: Vec<Vec<SheetCell>>) -> Self {
        let mut rows = grid.into_iter();
        let header = rows.next().unwrap_or_default();
        Self {
            header,
            rows: rows.map(fit_row).collect(),
        }
    }

    /// Build from data rows only (no header).
    pub fn from_data_rows(rows: Vec<Vec<SheetCell>>) -> Self {
        Self {
            header: Vec::new(),
            rows: rows.into_iter().map(fit_row).collect(),
        }
    }

    /// Data rows, header excluded. Index 0 is sheet row 2.
    pub fn data_rows(&self) -> &[Vec<SheetCell>] {
        &self.rows
    }

    /// Cells of a 1-based sheet row, if it is a data row.
    pub fn row(&self, number: RowNumber) -> Option<&[SheetCell]> {
        let offset = number.checked_sub(FIRST_DATA_ROW)? as usize;
        self.rows.get(offset).map(Vec::as_slice)
    }

    /// Full grid including the header, for persisting the snapshot.
    pub fn to_grid(&self) -> Vec<Vec<SheetCell>> {
        std::iter::once(self.header.clone())
            .chain(self.rows.iter().cloned())
            .collect()
    }

    /// Apply a write batch in order, as the sheet would.
    ///
    /// Writes addressed below the last data row grow the snapshot with
    /// blank rows. Writes to the header row are ignored.
    pub fn apply(&mut self, batch: &WriteBatch) {
        for write in batch.writes() {
            let Some(offset) = write.row().checked_sub(FIRST_DATA_ROW) else {
                continue;
            };
            let offset = offset as usize;
            if offset >= self.rows.len() {
                self.rows.resize(offset + 1, fit_row(Vec::new()));
            }
            let cell = &mut self.rows[offset][write.column().index()];
            match write {
                SheetWrite::Value(w) => *cell = SheetCell::text(w.value.clone()),
                SheetWrite::RichText(w) => {
                    *cell = SheetCell {
                        value: w.text.clone(),
                        runs: w.runs.clone(),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Column;
    use crate::merge::{CellWrite, RichTextWrite};

    #[test]
    fn raw_cells_decode() {
        let grid: Vec<Vec<SheetCell>> = serde_json::from_str(
            r#"[["ID", "Pornstar"], [null, "Jane Doe", 12345, true, {"value": "A {1}", "runs": [{"start_index": 0, "link": "https://a"}]}]]"#,
        )
        .unwrap();
        assert_eq!(grid[1][0], SheetCell::default());
        assert_eq!(grid[1][2].value, "12345");
        assert_eq!(grid[1][3].value, "TRUE");
        assert_eq!(grid[1][4].runs, vec![TextRun::link(0, "https://a")]);
    }

    #[test]
    fn header_split_and_rows_padded() {
        let snapshot = SheetSnapshot::from_grid(vec![
            vec!["ID".into(), "Pornstar".into()],
            vec!["".into(), "Jane Doe".into()],
        ]);
        assert_eq!(snapshot.data_rows().len(), 1);
        assert_eq!(snapshot.data_rows()[0].len(), COLUMN_COUNT);
        assert_eq!(snapshot.row(2).unwrap()[1].value, "Jane Doe");
        assert!(snapshot.row(1).is_none());
        assert!(snapshot.row(3).is_none());
    }

    #[test]
    fn long_rows_truncated() {
        let row: Vec<SheetCell> = (0..30).map(|i| SheetCell::text(i.to_string())).collect();
        let snapshot = SheetSnapshot::from_data_rows(vec![row]);
        assert_eq!(snapshot.data_rows()[0].len(), COLUMN_COUNT);
    }

    #[test]
    fn empty_grid() {
        let snapshot = SheetSnapshot::from_grid(Vec::new());
        assert!(snapshot.data_rows().is_empty());
    }

    #[test]
    fn apply_writes_values_and_rich_text() {
        let mut snapshot = SheetSnapshot::from_data_rows(vec![Vec::new()]);
        let mut batch = WriteBatch::default();
        batch.push_value(CellWrite {
            row: 2,
            column: Column::Title,
            value: "New Title".to_string(),
        });
        batch.push_rich_text(RichTextWrite {
            row: 3,
            column: Column::FemalePartners,
            text: "Jane Doe {1}".to_string(),
            runs: vec![TextRun::link(0, "https://p/jane"), TextRun::unlinked(8)],
        });
        snapshot.apply(&batch);

        assert_eq!(snapshot.row(2).unwrap()[Column::Title.index()].value, "New Title");
        let cell = &snapshot.row(3).unwrap()[Column::FemalePartners.index()];
        assert_eq!(cell.value, "Jane Doe {1}");
        assert_eq!(cell.runs.len(), 2);
    }

    #[test]
    fn plain_cells_serialize_as_strings() {
        let json = serde_json::to_value(vec![
            SheetCell::text("plain"),
            SheetCell {
                value: "A {1}".to_string(),
                runs: vec![TextRun::link(0, "https://a")],
            },
        ])
        .unwrap();
        assert_eq!(json[0], "plain");
        assert_eq!(json[1]["runs"][0]["link"], "https://a");
    }

    #[test]
    fn to_grid_keeps_header() {
        let snapshot = SheetSnapshot::from_grid(vec![vec!["ID".into()], vec!["x".into()]]);
        let grid = snapshot.to_grid();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0][0].value, "ID");
    }
}
