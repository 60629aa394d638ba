//! Location references attached to media.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// A place a media item is tagged with.
///
/// Graph payloads only carry a partial location (id, name, slug); the
/// transport's `resolve_location` fills in coordinates and address.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    /// Platform location ID (absent for user-supplied places)
    #[serde(default)]
    pub pk: Option<u64>,

    pub name: String,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub lat: Option<f64>,

    #[serde(default)]
    pub lng: Option<f64>,

    /// ID in the external places provider
    #[serde(default)]
    pub external_id: Option<u64>,

    /// Name of the external places provider (e.g. "facebook_places")
    #[serde(default)]
    pub external_id_source: Option<String>,
}

impl Location {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Whether coordinates are known
    pub fn is_complete(&self) -> bool {
        self.lat.is_some() && self.lng.is_some()
    }

    /// Serialize a location the way the edit endpoint expects it.
    ///
    /// `None` becomes an empty JSON object.
    pub fn edit_payload(location: Option<&Location>) -> String {
        let Some(loc) = location else {
            return "{}".to_string();
        };

        let mut payload = json!({
            "name": loc.name,
            "address": loc.address.clone().unwrap_or_default(),
            "lat": loc.lat,
            "lng": loc.lng,
        });

        if let (Some(source), Some(id)) = (&loc.external_id_source, loc.external_id) {
            payload["external_source"] = json!(source);
            payload[format!("{}_id", source)] = json!(id.to_string());
        }

        payload.to_string()
    }
}
