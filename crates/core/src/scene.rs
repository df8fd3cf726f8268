//! Typed model of a scraped scene.
//!
//! Scraper output is loosely shaped: IDs arrive as numbers or strings,
//! entity objects may be empty or missing, and counts may be numeric.
//! Deserialization is lenient -- a malformed sub-field becomes absent
//! instead of failing the whole scene.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A named group, network, studio, site, or webserie attached to a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub name: String,
    /// Link shown for the entity in the sheet (the scraper's `pair_url`).
    pub link: Option<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>, link: Option<&str>) -> Self {
        Self {
            name: name.into(),
            link: link.filter(|l| !l.is_empty()).map(str::to_string),
        }
    }
}

/// A performer credited on a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Performer {
    pub name: String,
    /// Number of scenes shared with the catalog performer, as scraped.
    pub scenes_count: Option<String>,
    /// Profile link, falling back to the pairing link.
    pub link: Option<String>,
}

/// Per-scene detail page fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneDetails {
    #[serde(default, deserialize_with = "lenient_text")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub original_site_final_url: Option<String>,
}

/// One scraped scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default, deserialize_with = "lenient_text")]
    pub scene_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub scene_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub scene_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub trailer_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_vr_video: bool,
    #[serde(default, deserialize_with = "lenient_performers")]
    pub performers: Vec<Performer>,
    #[serde(default, deserialize_with = "lenient_entity")]
    pub group: Option<Entity>,
    #[serde(default, deserialize_with = "lenient_entity")]
    pub network: Option<Entity>,
    #[serde(default, deserialize_with = "lenient_entity")]
    pub studio: Option<Entity>,
    #[serde(default, deserialize_with = "lenient_entity")]
    pub site: Option<Entity>,
    #[serde(default, deserialize_with = "lenient_entity")]
    pub webserie: Option<Entity>,
    #[serde(default, deserialize_with = "lenient_details")]
    pub details: SceneDetails,
}

// ---------------------------------------------------------------------------
// Lenient field decoding
// ---------------------------------------------------------------------------

/// Strings pass through, numbers are rendered, everything else is absent.
/// Blank strings are absent too.
fn value_to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn field_text(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(value_to_text)
}

fn entity_from_value(value: &Value) -> Option<Entity> {
    let obj = value.as_object()?;
    let name = field_text(obj, "name")?;
    Some(Entity {
        name,
        link: field_text(obj, "pair_url"),
    })
}

fn performer_from_value(value: &Value) -> Option<Performer> {
    let obj = value.as_object()?;
    Some(Performer {
        name: field_text(obj, "name").unwrap_or_default(),
        scenes_count: field_text(obj, "scenes_count"),
        link: field_text(obj, "url").or_else(|| field_text(obj, "pair_url")),
    })
}

pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "yes" | "true"),
        _ => false,
    })
}

fn lenient_entity<'de, D>(deserializer: D) -> Result<Option<Entity>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(entity_from_value(&value))
}

fn lenient_performers<'de, D>(deserializer: D) -> Result<Vec<Performer>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| items.iter().filter_map(performer_from_value).collect())
        .unwrap_or_default())
}

fn lenient_details<'de, D>(deserializer: D) -> Result<SceneDetails, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> Scene {
        serde_json::from_value(json).expect("scene should deserialize")
    }

    #[test]
    fn full_scene_decodes() {
        let scene = parse(serde_json::json!({
            "scene_id": 123456,
            "date": "2023-05-01",
            "scene_title": "Poolside",
            "scene_url": "https://www.data18.com/scenes/123456",
            "trailer_url": "https://www.data18.com/trailer/123456",
            "is_vr_video": true,
            "performers": [
                { "name": "Jane Doe", "scenes_count": "3", "url": "https://p/jane", "pair_url": "https://pair/jane" },
                { "name": "John Roe", "pair_url": "https://pair/john" }
            ],
            "studio": { "name": "Brazzers Exxtra", "url": "https://s", "pair_url": "https://pair/s" },
            "details": { "duration": "29:16", "original_site_final_url": "https://brazzers.test/1" }
        }));

        assert_eq!(scene.scene_id.as_deref(), Some("123456"));
        assert!(scene.is_vr_video);
        assert_eq!(scene.performers.len(), 2);
        assert_eq!(scene.performers[0].link.as_deref(), Some("https://p/jane"));
        assert_eq!(scene.performers[1].link.as_deref(), Some("https://pair/john"));
        assert_eq!(scene.performers[1].scenes_count, None);
        assert_eq!(
            scene.studio,
            Some(Entity::new("Brazzers Exxtra", Some("https://pair/s")))
        );
        assert_eq!(scene.details.duration.as_deref(), Some("29:16"));
    }

    #[test]
    fn empty_entity_objects_are_absent() {
        let scene = parse(serde_json::json!({ "group": {}, "network": { "name": "" } }));
        assert!(scene.group.is_none());
        assert!(scene.network.is_none());
    }

    #[test]
    fn malformed_fields_are_absent() {
        let scene = parse(serde_json::json!({
            "scene_id": null,
            "performers": "nobody",
            "site": ["not", "an", "object"],
            "details": 42,
            "is_vr_video": null
        }));
        assert!(scene.scene_id.is_none());
        assert!(scene.performers.is_empty());
        assert!(scene.site.is_none());
        assert_eq!(scene.details, SceneDetails::default());
        assert!(!scene.is_vr_video);
    }

    #[test]
    fn numeric_scene_count_rendered_as_text() {
        let scene = parse(serde_json::json!({
            "performers": [{ "name": "Jane Doe", "scenes_count": 7 }]
        }));
        assert_eq!(scene.performers[0].scenes_count.as_deref(), Some("7"));
    }

    #[test]
    fn entity_new_drops_empty_link() {
        assert_eq!(Entity::new("Site", Some("")).link, None);
    }
}
