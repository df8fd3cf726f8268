//! Sheet index builder.
//!
//! Scans the snapshot once per run to find which row already holds each
//! scene and which rows are blank template rows that can take new scenes.
//! Nothing is cached between runs: the sheet is the source of truth and may
//! have been edited by hand.

use std::collections::HashMap;

use serde::Serialize;

use crate::layout::Column;
use crate::sheet::{SheetCell, SheetSnapshot};
use crate::text::normalize_scene_id;
use crate::{RowNumber, FIRST_DATA_ROW};

/// A scene ID found on more than one sheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateSceneId {
    pub scene_id: String,
    /// The row the index points at (the later occurrence).
    pub kept_row: RowNumber,
    pub shadowed_row: RowNumber,
}

/// Scene lookup and free-row list derived from one snapshot.
#[derive(Debug, Clone, Default)]
pub struct SheetIndex {
    scene_rows: HashMap<String, RowNumber>,
    free_rows: Vec<RowNumber>,
    duplicates: Vec<DuplicateSceneId>,
}

fn row_numbers(rows: &[Vec<SheetCell>]) -> impl Iterator<Item = (RowNumber, &Vec<SheetCell>)> {
    (FIRST_DATA_ROW..).zip(rows)
}

fn cell_text(row: &[SheetCell], column: Column) -> &str {
    row.get(column.index()).map(|c| c.value.as_str()).unwrap_or("")
}

/// Whether every column outside the template allow-list is blank.
pub fn is_free_template_row(row: &[SheetCell]) -> bool {
    row.iter().enumerate().all(|(i, cell)| {
        Column::from_index(i).is_some_and(Column::is_template_owned) || cell.is_blank()
    })
}

/// Rows that can be reused for new scenes, in sheet order.
pub fn find_free_template_rows(rows: &[Vec<SheetCell>]) -> Vec<RowNumber> {
    row_numbers(rows)
        .filter(|(_, row)| is_free_template_row(row))
        .map(|(number, _)| number)
        .collect()
}

impl SheetIndex {
    /// Index every data row of the snapshot.
    pub fn build(snapshot: &SheetSnapshot) -> Self {
        let rows = snapshot.data_rows();
        let mut scene_rows = HashMap::new();
        let mut duplicates = Vec::new();

        for (number, row) in row_numbers(rows) {
            let scene_id = normalize_scene_id(cell_text(row, Column::SceneId));
            if scene_id.is_empty() {
                continue;
            }
            if let Some(previous) = scene_rows.insert(scene_id.clone(), number) {
                tracing::warn!(
                    scene_id = %scene_id,
                    kept_row = number,
                    shadowed_row = previous,
                    "Scene ID appears on more than one sheet row",
                );
                duplicates.push(DuplicateSceneId {
                    scene_id,
                    kept_row: number,
                    shadowed_row: previous,
                });
            }
        }

        let free_rows = find_free_template_rows(rows);

        tracing::debug!(
            data_rows = rows.len(),
            scenes = scene_rows.len(),
            free_rows = free_rows.len(),
            "Sheet index built",
        );

        Self {
            scene_rows,
            free_rows,
            duplicates,
        }
    }

    /// Row holding the scene, matched on the normalized ID.
    pub fn lookup(&self, scene_id: &str) -> Option<RowNumber> {
        self.scene_rows.get(&normalize_scene_id(scene_id)).copied()
    }

    pub fn scene_count(&self) -> usize {
        self.scene_rows.len()
    }

    pub fn free_rows(&self) -> &[RowNumber] {
        &self.free_rows
    }

    pub fn duplicates(&self) -> &[DuplicateSceneId] {
        &self.duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::COLUMN_COUNT;

    fn row(cells: &[(Column, &str)]) -> Vec<SheetCell> {
        let mut row = vec![SheetCell::default(); COLUMN_COUNT];
        for (column, value) in cells {
            row[column.index()] = SheetCell::text(*value);
        }
        row
    }

    #[test]
    fn scene_rows_are_one_based_after_header() {
        let snapshot = SheetSnapshot::from_data_rows(vec![
            row(&[(Column::SceneId, "111")]),
            row(&[(Column::SceneId, "222")]),
        ]);
        let index = SheetIndex::build(&snapshot);
        assert_eq!(index.lookup("111"), Some(2));
        assert_eq!(index.lookup("222"), Some(3));
        assert_eq!(index.lookup("333"), None);
        assert_eq!(index.scene_count(), 2);
    }

    #[test]
    fn invisible_characters_ignored_on_both_sides() {
        let snapshot =
            SheetSnapshot::from_data_rows(vec![row(&[(Column::SceneId, "\u{200b}555\u{00a0}")])]);
        let index = SheetIndex::build(&snapshot);
        assert_eq!(index.lookup("555"), Some(2));
        assert_eq!(index.lookup(" 555\u{200e}"), Some(2));
    }

    #[test]
    fn template_only_rows_are_free() {
        let snapshot = SheetSnapshot::from_data_rows(vec![
            row(&[
                (Column::Id, "=ROW()-1"),
                (Column::Banner, "=IMAGE(Q3)"),
                (Column::SaveFlag, "FALSE"),
                (Column::Quality, "1080p"),
                (Column::Label, "todo"),
            ]),
            row(&[(Column::SceneId, "1")]),
            row(&[(Column::Title, "   ")]),
            row(&[(Column::FileSize, "1.2 GB")]),
        ]);
        let index = SheetIndex::build(&snapshot);
        assert_eq!(index.free_rows(), &[2, 4]);
    }

    #[test]
    fn duplicate_ids_keep_last_row() {
        let snapshot = SheetSnapshot::from_data_rows(vec![
            row(&[(Column::SceneId, "9")]),
            row(&[(Column::SceneId, "9 ")]),
        ]);
        let index = SheetIndex::build(&snapshot);
        assert_eq!(index.lookup("9"), Some(3));
        assert_eq!(
            index.duplicates(),
            &[DuplicateSceneId {
                scene_id: "9".to_string(),
                kept_row: 3,
                shadowed_row: 2,
            }]
        );
    }

    #[test]
    fn empty_snapshot() {
        let index = SheetIndex::build(&SheetSnapshot::default());
        assert_eq!(index.scene_count(), 0);
        assert!(index.free_rows().is_empty());
    }
}
