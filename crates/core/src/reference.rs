//! Reference data consulted while flattening scenes.
//!
//! Male and trans performer lists and the network hierarchy are maintained
//! as JSON files by other parts of the catalog tooling. Everything here is
//! keyed by [`normalize_name`].

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::scene::lenient_text;
use crate::text::normalize_name;

// ---------------------------------------------------------------------------
// Source records
// ---------------------------------------------------------------------------

// Names and titles that are missing, null or not text decode as "" and are
// skipped when the lookup tables are built, so one bad entry never costs
// the rest of the file.

/// A performer entry in the male or trans performer lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformerRecord {
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
}

/// A site that belongs to a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
    #[serde(default, deserialize_with = "lenient_name")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub url: Option<String>,
}

/// A network and its child sites, as exported from the Networks worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRecord {
    #[serde(default, deserialize_with = "lenient_name")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_sites")]
    pub sites: Vec<SiteRecord>,
}

fn lenient_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

/// Site entries that are not objects are dropped; a non-array is empty.
fn lenient_sites<'de, D>(deserializer: D) -> Result<Vec<SiteRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default())
}

// ---------------------------------------------------------------------------
// ReferenceData
// ---------------------------------------------------------------------------

/// Normalized lookup tables used by the row flattener.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    male_performers: HashSet<String>,
    trans_performers: HashSet<String>,
    /// Normalized site/studio name -> parent network display title.
    site_to_network: HashMap<String, String>,
}

impl ReferenceData {
    pub fn new(
        male_performers: HashSet<String>,
        trans_performers: HashSet<String>,
        site_to_network: HashMap<String, String>,
    ) -> Self {
        Self {
            male_performers,
            trans_performers,
            site_to_network,
        }
    }

    /// Build the lookup tables from the raw reference files.
    ///
    /// Names are normalized on the way in. When a site appears under more
    /// than one network, the network listed last wins.
    pub fn from_records(
        male: &[PerformerRecord],
        trans: &[PerformerRecord],
        networks: &[NetworkRecord],
    ) -> Self {
        let normalize_all = |records: &[PerformerRecord]| {
            records
                .iter()
                .map(|r| normalize_name(&r.name))
                .filter(|n| !n.is_empty())
                .collect::<HashSet<_>>()
        };

        let site_to_network = networks
            .iter()
            .flat_map(|network| {
                network
                    .sites
                    .iter()
                    .map(move |site| (normalize_name(&site.title), network.title.clone()))
            })
            .filter(|(site, _)| !site.is_empty())
            .collect();

        Self {
            male_performers: normalize_all(male),
            trans_performers: normalize_all(trans),
            site_to_network,
        }
    }

    pub fn is_male(&self, name: &str) -> bool {
        self.male_performers.contains(&normalize_name(name))
    }

    pub fn is_trans(&self, name: &str) -> bool {
        self.trans_performers.contains(&normalize_name(name))
    }

    /// Parent network title for a site or studio name, if mapped.
    pub fn parent_network(&self, name: &str) -> Option<&str> {
        self.site_to_network
            .get(&normalize_name(name))
            .map(String::as_str)
            .filter(|n| !n.is_empty())
    }

    /// Whether the name is a known child site of some network.
    pub fn is_network_child(&self, name: &str) -> bool {
        self.site_to_network.contains_key(&normalize_name(name))
    }

    pub fn male_count(&self) -> usize {
        self.male_performers.len()
    }

    pub fn trans_count(&self) -> usize {
        self.trans_performers.len()
    }

    pub fn mapped_site_count(&self) -> usize {
        self.site_to_network.len()
    }
}
