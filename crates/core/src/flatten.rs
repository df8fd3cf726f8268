//! Row flattener: one scraped [`Scene`] -> one [`SceneRow`].
//!
//! Network cell (G), first match wins:
//!
//! 1. Group, linked when it has a URL
//! 2. Network, linked when it has a URL
//! 3. Parent network of the studio (or site) from the site-to-network map,
//!    plain text only
//! 4. Standalone studio, linked when it has a URL
//!
//! Site cell (H), first match wins:
//!
//! 1. Studio, when a group is present
//! 2. Studio, when it is a known child of a network
//! 3. Site or webserie
//!
//! Each cell is linked only by its own entity's URL, so a linked site cell
//! never affects whether the network cell is linked.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::duration::convert_duration;
use crate::layout::{LinkText, SceneRow};
use crate::reference::ReferenceData;
use crate::scene::{Entity, Scene};
use crate::text::{
    entity_display_name, normalize_name, normalize_scene_id, normalize_whitespace, to_title_case,
};

/// Suffix appended to trans performers in the female partners column.
pub const TRANS_SUFFIX: &str = " (Trans)";

/// Scene count shown when the scraper did not report one.
pub const DEFAULT_SCENE_COUNT: &str = "1";

/// Knobs for a flattening run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenOptions {
    /// Emit `=HYPERLINK(...)` formulas for linked network/site cells.
    pub hyperlinks_enabled: bool,
    /// Apply smart title case to scene titles.
    pub title_case_titles: bool,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            hyperlinks_enabled: true,
            title_case_titles: false,
        }
    }
}

/// A flattened scene ready for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedScene {
    pub row: SceneRow,
    /// Cells in sheet order; `None` marks sheet-owned columns.
    pub cells: Vec<Option<String>>,
    /// Normalized performer name -> profile URL, for rich-text links.
    pub performer_links: HashMap<String, String>,
}

impl FlattenedScene {
    /// Normalized scene ID used to match the scene against the sheet.
    pub fn scene_id(&self) -> &str {
        &self.row.scene_id
    }
}

// ---------------------------------------------------------------------------
// Performers
// ---------------------------------------------------------------------------

struct PerformerColumns {
    males: Vec<String>,
    females: Vec<String>,
    links: HashMap<String, String>,
}

fn partition_performers(scene: &Scene, reference: &ReferenceData) -> PerformerColumns {
    let mut columns = PerformerColumns {
        males: Vec::new(),
        females: Vec::new(),
        links: HashMap::new(),
    };

    for performer in &scene.performers {
        let name = performer.name.trim();
        if name.is_empty() {
            continue;
        }
        let count = performer
            .scenes_count
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_SCENE_COUNT);
        let display = normalize_whitespace(&format!("{name} {{{count}}}"));

        if let Some(link) = &performer.link {
            columns.links.insert(normalize_name(name), link.clone());
        }

        if reference.is_male(name) {
            columns.males.push(display);
        } else if reference.is_trans(name) {
            columns.females.push(format!("{display}{TRANS_SUFFIX}"));
        } else {
            columns.females.push(display);
        }
    }

    columns
}

// ---------------------------------------------------------------------------
// Network and site cells
// ---------------------------------------------------------------------------

fn entity_cell(entity: &Entity) -> LinkText {
    LinkText::linked(entity_display_name(&entity.name), entity.link.as_deref())
}

fn network_cell(scene: &Scene, site: Option<&Entity>, reference: &ReferenceData) -> LinkText {
    if let Some(group) = &scene.group {
        return entity_cell(group);
    }
    if let Some(network) = &scene.network {
        return entity_cell(network);
    }

    let studio_name = scene.studio.as_ref().map(|s| s.name.as_str()).unwrap_or("");
    let mapped = reference
        .parent_network(studio_name)
        .or_else(|| site.and_then(|s| reference.parent_network(&s.name)));

    match (mapped, &scene.studio) {
        (Some(parent), _) if normalize_name(parent) != normalize_name(studio_name) => {
            LinkText::plain(entity_display_name(parent))
        }
        (_, Some(studio)) => entity_cell(studio),
        _ => LinkText::default(),
    }
}

fn site_cell(scene: &Scene, site: Option<&Entity>, reference: &ReferenceData) -> LinkText {
    match (&scene.group, &scene.studio) {
        (Some(_), Some(studio)) => return entity_cell(studio),
        (None, Some(studio)) if reference.is_network_child(&studio.name) => {
            return entity_cell(studio)
        }
        _ => {}
    }
    site.map(entity_cell).unwrap_or_default()
}

/// Site entity, falling back to the webserie. Name and link fall back
/// independently.
fn site_or_webserie(scene: &Scene) -> Option<Entity> {
    let name = scene
        .site
        .as_ref()
        .or(scene.webserie.as_ref())
        .map(|e| e.name.clone())?;
    let link = scene
        .site
        .as_ref()
        .and_then(|e| e.link.as_deref())
        .or_else(|| scene.webserie.as_ref().and_then(|e| e.link.as_deref()));
    Some(Entity::new(name, link))
}

// ---------------------------------------------------------------------------
// Flatten
// ---------------------------------------------------------------------------

/// Convert one scraped scene into its worksheet row.
///
/// Pure: no sheet access and no side effects.
pub fn flatten_scene(
    scene: &Scene,
    performer_name: &str,
    reference: &ReferenceData,
    options: FlattenOptions,
) -> FlattenedScene {
    let performers = partition_performers(scene, reference);
    let site = site_or_webserie(scene);

    let title = scene.scene_title.clone().unwrap_or_default();
    let title = if options.title_case_titles {
        to_title_case(&title)
    } else {
        title
    };

    let row = SceneRow {
        performer: performer_name.to_string(),
        scene_id: normalize_scene_id(scene.scene_id.as_deref().unwrap_or("")),
        release_date: scene.date.clone().unwrap_or_default(),
        male_partners: performers.males.join("\n"),
        female_partners: performers.females.join("\n"),
        network: network_cell(scene, site.as_ref(), reference),
        site: site_cell(scene, site.as_ref(), reference),
        title,
        is_vr: scene.is_vr_video,
        duration: convert_duration(scene.details.duration.as_deref().unwrap_or("")),
        original_url: scene
            .details
            .original_site_final_url
            .clone()
            .unwrap_or_default(),
        catalog_url: scene.scene_url.clone().unwrap_or_default(),
        trailer_url: scene.trailer_url.clone().unwrap_or_default(),
    };

    FlattenedScene {
        cells: row.to_cells(options.hyperlinks_enabled),
        row,
        performer_links: performers.links,
    }
}
