//! Google Sheets `spreadsheets.batchUpdate` request encoding.
//!
//! Every write becomes one single-cell `updateCells` request. Plain values
//! starting with `=` are sent as formulas so `HYPERLINK` cells stay live;
//! rich text writes carry `textFormatRuns` with link formats. Plain writes
//! to performer columns send empty runs so stale links are cleared too.

use serde::Serialize;

use crate::layout::MergeRule;
use crate::merge::{SheetWrite, WriteBatch};
use crate::sheet::TextRun;

const VALUE_FIELDS: &str = "userEnteredValue";
const RICH_TEXT_FIELDS: &str = "userEnteredValue,textFormatRuns";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateBody {
    pub requests: Vec<Request>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub update_cells: UpdateCellsRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCellsRequest {
    pub range: GridRange,
    pub rows: Vec<RowData>,
    pub fields: &'static str,
}

/// Half-open, 0-based cell range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    pub sheet_id: i64,
    pub start_row_index: u32,
    pub end_row_index: u32,
    pub start_column_index: usize,
    pub end_column_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowData {
    pub values: Vec<CellData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    pub user_entered_value: ExtendedValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_format_runs: Option<Vec<TextFormatRun>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtendedValue {
    StringValue(String),
    FormulaValue(String),
}

impl ExtendedValue {
    fn for_text(text: &str) -> Self {
        if text.starts_with('=') {
            Self::FormulaValue(text.to_string())
        } else {
            Self::StringValue(text.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFormatRun {
    pub start_index: usize,
    pub format: TextFormat,
}

/// An empty format (no link) ends the previous run's hyperlink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextFormat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub uri: String,
}

impl From<&TextRun> for TextFormatRun {
    fn from(run: &TextRun) -> Self {
        Self {
            start_index: run.start_index,
            format: TextFormat {
                link: run.link.as_ref().map(|uri| Link { uri: uri.clone() }),
            },
        }
    }
}

fn single_cell(sheet_id: i64, write: &SheetWrite, cell: CellData, fields: &'static str) -> Request {
    // Sheet rows are 1-based; grid ranges are 0-based and half-open.
    let row_index = write.row().saturating_sub(1);
    let column_index = write.column().index();
    Request {
        update_cells: UpdateCellsRequest {
            range: GridRange {
                sheet_id,
                start_row_index: row_index,
                end_row_index: row_index + 1,
                start_column_index: column_index,
                end_column_index: column_index + 1,
            },
            rows: vec![RowData { values: vec![cell] }],
            fields,
        },
    }
}

/// Encode a write batch for the worksheet with the given numeric `sheetId`.
pub fn batch_update_body(batch: &WriteBatch, sheet_id: i64) -> BatchUpdateBody {
    let requests = batch
        .writes()
        .iter()
        .map(|write| match write {
            SheetWrite::Value(w) if w.column.merge_rule() == MergeRule::RichText => single_cell(
                sheet_id,
                write,
                CellData {
                    user_entered_value: ExtendedValue::for_text(&w.value),
                    text_format_runs: Some(Vec::new()),
                },
                RICH_TEXT_FIELDS,
            ),
            SheetWrite::Value(w) => single_cell(
                sheet_id,
                write,
                CellData {
                    user_entered_value: ExtendedValue::for_text(&w.value),
                    text_format_runs: None,
                },
                VALUE_FIELDS,
            ),
            SheetWrite::RichText(w) => single_cell(
                sheet_id,
                write,
                CellData {
                    user_entered_value: ExtendedValue::StringValue(w.text.clone()),
                    text_format_runs: Some(w.runs.iter().map(TextFormatRun::from).collect()),
                },
                RICH_TEXT_FIELDS,
            ),
        })
        .collect();

    BatchUpdateBody { requests }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Column;
    use crate::merge::{CellWrite, RichTextWrite};

    #[test]
    fn value_write_encodes_single_cell_range() {
        let mut batch = WriteBatch::default();
        batch.push_value(CellWrite {
            row: 5,
            column: Column::Title,
            value: "Poolside".to_string(),
        });
        let json = serde_json::to_value(batch_update_body(&batch, 42)).unwrap();
        let update = &json["requests"][0]["updateCells"];
        assert_eq!(update["range"]["sheetId"], 42);
        assert_eq!(update["range"]["startRowIndex"], 4);
        assert_eq!(update["range"]["endRowIndex"], 5);
        assert_eq!(update["range"]["startColumnIndex"], 8);
        assert_eq!(update["range"]["endColumnIndex"], 9);
        assert_eq!(update["fields"], "userEnteredValue");
        assert_eq!(
            update["rows"][0]["values"][0]["userEnteredValue"]["stringValue"],
            "Poolside"
        );
        assert!(update["rows"][0]["values"][0].get("textFormatRuns").is_none());
    }

    #[test]
    fn hyperlink_formula_sent_as_formula() {
        let mut batch = WriteBatch::default();
        batch.push_value(CellWrite {
            row: 2,
            column: Column::Network,
            value: "=HYPERLINK(\"https://n\", \"Net\")".to_string(),
        });
        let json = serde_json::to_value(batch_update_body(&batch, 0)).unwrap();
        let value = &json["requests"][0]["updateCells"]["rows"][0]["values"][0]["userEnteredValue"];
        assert_eq!(value["formulaValue"], "=HYPERLINK(\"https://n\", \"Net\")");
    }

    #[test]
    fn rich_text_write_carries_runs() {
        let mut batch = WriteBatch::default();
        batch.push_rich_text(RichTextWrite {
            row: 3,
            column: Column::FemalePartners,
            text: "Jane Doe {1}".to_string(),
            runs: vec![TextRun::link(0, "https://p/jane"), TextRun::unlinked(8)],
        });
        let json = serde_json::to_value(batch_update_body(&batch, 7)).unwrap();
        let update = &json["requests"][0]["updateCells"];
        assert_eq!(update["fields"], "userEnteredValue,textFormatRuns");
        let runs = &update["rows"][0]["values"][0]["textFormatRuns"];
        assert_eq!(runs[0]["startIndex"], 0);
        assert_eq!(runs[0]["format"]["link"]["uri"], "https://p/jane");
        assert_eq!(runs[1]["startIndex"], 8);
        assert_eq!(runs[1]["format"], serde_json::json!({}));
    }

    #[test]
    fn plain_performer_write_clears_runs() {
        let mut batch = WriteBatch::default();
        batch.push_value(CellWrite {
            row: 4,
            column: Column::MalePartners,
            value: String::new(),
        });
        let json = serde_json::to_value(batch_update_body(&batch, 0)).unwrap();
        let update = &json["requests"][0]["updateCells"];
        assert_eq!(update["fields"], "userEnteredValue,textFormatRuns");
        assert_eq!(update["rows"][0]["values"][0]["userEnteredValue"]["stringValue"], "");
        assert_eq!(update["rows"][0]["values"][0]["textFormatRuns"], serde_json::json!([]));
    }

    #[test]
    fn empty_batch_has_no_requests() {
        let body = batch_update_body(&WriteBatch::default(), 0);
        assert!(body.requests.is_empty());
    }
}
