//! The scene worksheet column layout.
//!
//! Every performer tab in the catalog spreadsheet shares one fixed 24-column
//! layout (A..X). [`Column`] names each position, [`SceneRow`] is the
//! named record produced by the flattener, and [`SceneRow::to_cells`] is
//! the single place where the record is laid out positionally.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::text::make_hyperlink;

/// Number of columns in the scene worksheet.
pub const COLUMN_COUNT: usize = 24;

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// A column of the scene worksheet, in sheet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    /// Row ID, filled by the sheet template.
    Id,
    Performer,
    SceneId,
    ReleaseDate,
    MalePartners,
    FemalePartners,
    Network,
    Site,
    Title,
    /// Thumbnail banner, filled by the sheet template.
    Banner,
    IsVr,
    /// Save checkbox, filled by the sheet template.
    SaveFlag,
    TeleLink,
    /// Quality dropdown, filled by the sheet template.
    Quality,
    FileSize,
    Duration,
    Thumbnail,
    ScreenCaps,
    PicsSet,
    VideoLink,
    OriginalUrl,
    /// Catalog URL plus any cross-reference URLs added by hand.
    CatalogUrl,
    TrailerUrl,
    /// Label, maintained by hand or by the sheet template.
    Label,
}

/// How a column is reconciled when the scene already has a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeRule {
    /// Replace the cell when the new text differs.
    Overwrite,
    /// Only fill an empty cell; never replace an existing value.
    Protect,
    /// Union the newline-separated URL lists.
    MergeUrls,
    /// Rewrite as rich text with per-performer hyperlinks.
    RichText,
}

impl Column {
    /// All columns in sheet order.
    pub const ALL: [Column; COLUMN_COUNT] = [
        Self::Id,
        Self::Performer,
        Self::SceneId,
        Self::ReleaseDate,
        Self::MalePartners,
        Self::FemalePartners,
        Self::Network,
        Self::Site,
        Self::Title,
        Self::Banner,
        Self::IsVr,
        Self::SaveFlag,
        Self::TeleLink,
        Self::Quality,
        Self::FileSize,
        Self::Duration,
        Self::Thumbnail,
        Self::ScreenCaps,
        Self::PicsSet,
        Self::VideoLink,
        Self::OriginalUrl,
        Self::CatalogUrl,
        Self::TrailerUrl,
        Self::Label,
    ];

    /// Columns owned by the sheet template. A row whose other columns are
    /// all blank is a reusable template row.
    pub const TEMPLATE_OWNED: [Column; 5] = [
        Self::Id,
        Self::Banner,
        Self::SaveFlag,
        Self::Quality,
        Self::Label,
    ];

    /// 0-based position in the row.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Spreadsheet column letter (`A`..`X`).
    pub fn letter(self) -> char {
        (b'A' + self as u8) as char
    }

    /// Parse a spreadsheet column letter, case-insensitively.
    pub fn from_letter(letter: &str) -> Result<Self, CoreError> {
        let trimmed = letter.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => {
                let offset = (c.to_ascii_uppercase() as u8 - b'A') as usize;
                Self::from_index(offset)
                    .ok_or_else(|| CoreError::UnknownColumn(trimmed.to_string()))
            }
            _ => Err(CoreError::UnknownColumn(trimmed.to_string())),
        }
    }

    pub fn is_template_owned(self) -> bool {
        Self::TEMPLATE_OWNED.contains(&self)
    }

    pub fn merge_rule(self) -> MergeRule {
        match self {
            Self::MalePartners | Self::FemalePartners => MergeRule::RichText,
            Self::Duration => MergeRule::Protect,
            Self::CatalogUrl => MergeRule::MergeUrls,
            _ => MergeRule::Overwrite,
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

// ---------------------------------------------------------------------------
// Update policy
// ---------------------------------------------------------------------------

/// Columns the merger may touch on a row that already holds the scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePolicy {
    columns: BTreeSet<Column>,
}

impl Default for UpdatePolicy {
    /// Every column the flattener produces; template and manual columns
    /// are left alone.
    fn default() -> Self {
        Self {
            columns: BTreeSet::from([
                Column::Performer,
                Column::SceneId,
                Column::ReleaseDate,
                Column::MalePartners,
                Column::FemalePartners,
                Column::Network,
                Column::Site,
                Column::Title,
                Column::IsVr,
                Column::Duration,
                Column::OriginalUrl,
                Column::CatalogUrl,
                Column::TrailerUrl,
            ]),
        }
    }
}

impl UpdatePolicy {
    /// Build a policy from an explicit column set. Template-owned columns
    /// are rejected.
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Result<Self, CoreError> {
        let columns: BTreeSet<Column> = columns.into_iter().collect();
        if columns.is_empty() {
            return Err(CoreError::Validation(
                "Update policy must name at least one column".to_string(),
            ));
        }
        if let Some(owned) = columns.iter().find(|c| c.is_template_owned()) {
            return Err(CoreError::Validation(format!(
                "Column {owned} is owned by the sheet template and cannot be updated"
            )));
        }
        Ok(Self { columns })
    }

    /// Parse a comma-separated list of column letters, e.g. `"B,C,G,H"`.
    pub fn from_letters(letters: &str) -> Result<Self, CoreError> {
        let columns = letters
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(Column::from_letter)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(columns)
    }

    pub fn allows(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Updateable columns in sheet order.
    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns.iter().copied()
    }
}

// ---------------------------------------------------------------------------
// SceneRow
// ---------------------------------------------------------------------------

/// Display text with an optional hyperlink target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkText {
    pub text: String,
    pub url: Option<String>,
}

impl LinkText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: None,
        }
    }

    pub fn linked(text: impl Into<String>, url: Option<&str>) -> Self {
        Self {
            text: text.into(),
            url: url.filter(|u| !u.is_empty()).map(str::to_string),
        }
    }

    pub fn is_linked(&self) -> bool {
        self.url.is_some()
    }

    /// Cell contents: a `HYPERLINK` formula when enabled and linked.
    pub fn render(&self, hyperlinks_enabled: bool) -> String {
        make_hyperlink(self.url.as_deref(), &self.text, hyperlinks_enabled)
    }
}

/// The values one scene contributes to its worksheet row.
///
/// Columns absent from this record (template and manual columns) are
/// emitted as `None` placeholders and are never written by the flattener.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneRow {
    pub performer: String,
    pub scene_id: String,
    pub release_date: String,
    /// Newline-separated `Name {count}` entries.
    pub male_partners: String,
    /// Newline-separated `Name {count}` entries, trans performers suffixed.
    pub female_partners: String,
    pub network: LinkText,
    pub site: LinkText,
    pub title: String,
    pub is_vr: bool,
    pub duration: String,
    pub original_url: String,
    pub catalog_url: String,
    pub trailer_url: String,
}

impl SceneRow {
    /// Serialize the record into sheet column order.
    pub fn to_cells(&self, hyperlinks_enabled: bool) -> Vec<Option<String>> {
        Column::ALL
            .iter()
            .map(|&column| self.cell(column, hyperlinks_enabled))
            .collect()
    }

    /// The value for one column, or `None` when the sheet owns it.
    pub fn cell(&self, column: Column, hyperlinks_enabled: bool) -> Option<String> {
        let value = match column {
            Column::Performer => self.performer.clone(),
            Column::SceneId => self.scene_id.clone(),
            Column::ReleaseDate => self.release_date.clone(),
            Column::MalePartners => self.male_partners.clone(),
            Column::FemalePartners => self.female_partners.clone(),
            Column::Network => self.network.render(hyperlinks_enabled),
            Column::Site => self.site.render(hyperlinks_enabled),
            Column::Title => self.title.clone(),
            Column::IsVr => if self.is_vr { "Yes" } else { "No" }.to_string(),
            Column::Duration => self.duration.clone(),
            Column::OriginalUrl => self.original_url.clone(),
            Column::CatalogUrl => self.catalog_url.clone(),
            Column::TrailerUrl => self.trailer_url.clone(),
            Column::Id
            | Column::Banner
            | Column::SaveFlag
            | Column::TeleLink
            | Column::Quality
            | Column::FileSize
            | Column::Thumbnail
            | Column::ScreenCaps
            | Column::PicsSet
            | Column::VideoLink
            | Column::Label => return None,
        };
        Some(value)
    }
}
