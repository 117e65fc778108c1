//! Mission and device content stored next to a game's channel files.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    discovery::{collect::read_metadata, ScanError},
    models::lenient_text,
    trigger::{sanitize_trigger_config, TriggerConfig},
};

/// File inside a record's `source` directory holding missions and devices.
pub const CONTENT_FILE: &str = "config.json";

/// A single mission of a game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Mission {
    /// Stable identifier.
    #[serde(deserialize_with = "lenient_text")]
    pub id: String,
    /// Display title.
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    /// Mission kind (question, photo, ...).
    #[serde(rename = "type", deserialize_with = "lenient_text")]
    pub mission_type: String,
    /// Optional trigger binding.
    #[serde(
        deserialize_with = "sanitized_trigger",
        skip_serializing_if = "Option::is_none"
    )]
    pub trigger: Option<TriggerConfig>,
}

/// A physical or virtual device placed in the game area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Device {
    /// Stable identifier.
    #[serde(deserialize_with = "lenient_text")]
    pub id: String,
    /// Display title.
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    /// Device kind.
    #[serde(rename = "type", deserialize_with = "lenient_text")]
    pub device_type: String,
    /// Latitude of the geofence centre.
    #[serde(
        deserialize_with = "lenient_coordinate",
        skip_serializing_if = "Option::is_none"
    )]
    pub lat: Option<f64>,
    /// Longitude of the geofence centre.
    #[serde(
        deserialize_with = "lenient_coordinate",
        skip_serializing_if = "Option::is_none"
    )]
    pub lng: Option<f64>,
    /// Optional trigger binding.
    #[serde(
        deserialize_with = "sanitized_trigger",
        skip_serializing_if = "Option::is_none"
    )]
    pub trigger: Option<TriggerConfig>,
}

/// Numbers or numeric strings; anything else reads as no coordinate.
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|coordinate| coordinate.is_finite()))
}

fn sanitized_trigger<'de, D>(deserializer: D) -> Result<Option<TriggerConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .filter(Value::is_object)
        .map(|value| sanitize_trigger_config(&value)))
}

/// Missions and devices of one game channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameContent {
    /// Missions in play order.
    pub missions: Vec<Mission>,
    /// Devices in placement order.
    pub devices: Vec<Device>,
}

impl GameContent {
    /// Load `config.json` from `dir`. Missing or malformed files yield
    /// empty content.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(CONTENT_FILE);
        let value = match read_metadata(&path) {
            Ok(value) => value,
            Err(ScanError::Missing { .. }) => {
                debug!("No content file at {}", path.display());
                return Self::default();
            }
            Err(err) => {
                warn!("Ignoring content: {err}");
                return Self::default();
            }
        };
        Self::from_value(value).unwrap_or_else(|err| {
            warn!("Ignoring content {}: {err}", path.display());
            Self::default()
        })
    }

    /// Decode content from a JSON value (for example a cached snapshot).
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Find a mission by identifier.
    pub fn mission(&self, id: &str) -> Option<&Mission> {
        self.missions.iter().find(|mission| mission.id == id)
    }

    /// Find a device by identifier.
    pub fn device(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|device| device.id == id)
    }

    /// Validate every mission; returns the first problem found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.missions.iter().try_for_each(validate_mission)
    }
}

/// Reason a mission cannot be saved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The mission has no identifier.
    #[error("mission is missing an id")]
    MissingId,
    /// The mission has no title.
    #[error("mission {id} is missing a title")]
    MissingTitle {
        /// Offending mission.
        id: String,
    },
    /// The mission's enabled trigger has no target.
    #[error("mission {id} has an enabled trigger without a target")]
    MissingTriggerTarget {
        /// Offending mission.
        id: String,
    },
}

/// Check the fields a mission needs before it can be saved.
pub fn validate_mission(mission: &Mission) -> Result<(), ValidationError> {
    if mission.id.trim().is_empty() {
        return Err(ValidationError::MissingId);
    }
    if mission.title.trim().is_empty() {
        return Err(ValidationError::MissingTitle {
            id: mission.id.clone(),
        });
    }
    if let Some(trigger) = &mission.trigger {
        if trigger.enabled && trigger.action_target.trim().is_empty() {
            return Err(ValidationError::MissingTriggerTarget {
                id: mission.id.clone(),
            });
        }
    }
    Ok(())
}
