//! Pure reconciliation logic for the scene catalog spreadsheet.
//!
//! Scraped scenes are flattened into fixed-width rows ([`flatten`]),
//! matched against a snapshot of the sheet ([`sheet_index`]) and diffed
//! cell by cell into a write batch ([`merge`], [`reconcile`]). Nothing in
//! this crate touches the filesystem or the network.

pub mod duration;
pub mod error;
pub mod flatten;
pub mod layout;
pub mod merge;
pub mod naming;
pub mod reconcile;
pub mod reference;
pub mod requests;
pub mod scene;
pub mod sheet;
pub mod sheet_index;
pub mod text;

/// 1-based sheet row number. Row 1 is the header.
pub type RowNumber = u32;

/// Row number of the first data row.
pub const FIRST_DATA_ROW: RowNumber = 2;
