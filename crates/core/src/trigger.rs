//! "When this entity is triggered, do this" bindings for missions and devices.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a trigger does once it fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// Show a media asset.
    #[default]
    Media,
    /// Activate a device.
    Devices,
    /// Unlock a mission.
    Missions,
}

impl ActionType {
    /// Parse a known label; unknown labels yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "media" => Some(ActionType::Media),
            "devices" => Some(ActionType::Devices),
            "missions" => Some(ActionType::Missions),
            _ => None,
        }
    }

    /// Wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Media => "media",
            ActionType::Devices => "devices",
            ActionType::Missions => "missions",
        }
    }

    /// Next action type in picker order.
    pub fn next(&self) -> Self {
        match self {
            ActionType::Media => ActionType::Devices,
            ActionType::Devices => ActionType::Missions,
            ActionType::Missions => ActionType::Media,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully-populated trigger binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerConfig {
    /// When false the remaining fields are ignored.
    pub enabled: bool,
    /// Which ID space `action_target` is drawn from.
    pub action_type: ActionType,
    /// Media, device or mission identifier.
    pub action_target: String,
    /// Human readable label of the target.
    pub action_label: String,
    /// Thumbnail of the target.
    pub action_thumbnail: String,
    /// Device whose event fires this trigger.
    pub trigger_device_id: String,
    /// Response key that fires this trigger.
    pub triggered_response_key: String,
    /// Mission whose completion fires this trigger.
    pub triggered_mission_id: String,
}

/// The configuration an entity starts with before any edit.
pub const DEFAULT_TRIGGER_CONFIG: TriggerConfig = TriggerConfig {
    enabled: false,
    action_type: ActionType::Media,
    action_target: String::new(),
    action_label: String::new(),
    action_thumbnail: String::new(),
    trigger_device_id: String::new(),
    triggered_response_key: String::new(),
    triggered_mission_id: String::new(),
};

impl TriggerConfig {
    /// One-line description for list views.
    pub fn summary(&self) -> String {
        if !self.enabled {
            return "trigger off".to_string();
        }
        let target = if !self.action_label.is_empty() {
            self.action_label.as_str()
        } else if !self.action_target.is_empty() {
            self.action_target.as_str()
        } else {
            "(no target)"
        };
        format!("{} → {}", self.action_type, target)
    }
}

/// Partial update; `None` fields leave the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerPatch {
    /// New value for `enabled`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// New action kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_type: Option<ActionType>,
    /// New action target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_target: Option<String>,
    /// New action label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_label: Option<String>,
    /// New thumbnail URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_thumbnail: Option<String>,
    /// Device that fires the trigger.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_device_id: Option<String>,
    /// Response key reported when fired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggered_response_key: Option<String>,
    /// Mission unlocked when fired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggered_mission_id: Option<String>,
}

impl TriggerPatch {
    /// Patch that only sets `enabled`.
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Self::default()
        }
    }

    /// Patch that only sets `action_type`.
    pub fn action_type(action_type: ActionType) -> Self {
        Self {
            action_type: Some(action_type),
            ..Self::default()
        }
    }
}

/// Build a complete config from untrusted JSON.
pub fn sanitize_trigger_config(input: &Value) -> TriggerConfig {
    let field = |name: &str| input.get(name).map(coerce_string).unwrap_or_default();

    TriggerConfig {
        enabled: input.get("enabled").map(truthy).unwrap_or(false),
        action_type: input
            .get("actionType")
            .and_then(Value::as_str)
            .and_then(ActionType::parse)
            .unwrap_or_default(),
        action_target: field("actionTarget"),
        action_label: field("actionLabel"),
        action_thumbnail: field("actionThumbnail"),
        trigger_device_id: field("triggerDeviceId"),
        triggered_response_key: field("triggeredResponseKey"),
        triggered_mission_id: field("triggeredMissionId"),
    }
}

/// Apply a partial update over the defaults-filled current state.
pub fn merge_trigger_state(
    current: Option<&TriggerConfig>,
    partial: &TriggerPatch,
) -> TriggerConfig {
    let mut next = current.cloned().unwrap_or(DEFAULT_TRIGGER_CONFIG);

    if let Some(enabled) = partial.enabled {
        next.enabled = enabled;
    }
    if let Some(action_type) = partial.action_type {
        next.action_type = action_type;
    }
    let assign = |target: &mut String, value: &Option<String>| {
        if let Some(value) = value {
            *target = value.clone();
        }
    };
    assign(&mut next.action_target, &partial.action_target);
    assign(&mut next.action_label, &partial.action_label);
    assign(&mut next.action_thumbnail, &partial.action_thumbnail);
    assign(&mut next.trigger_device_id, &partial.trigger_device_id);
    assign(&mut next.triggered_response_key, &partial.triggered_response_key);
    assign(&mut next.triggered_mission_id, &partial.triggered_mission_id);

    next
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0 && !v.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_onto_missing_state_fills_defaults() {
        let merged = merge_trigger_state(None, &TriggerPatch::enabled(true));
        assert_eq!(
            merged,
            TriggerConfig {
                enabled: true,
                ..DEFAULT_TRIGGER_CONFIG
            }
        );

        let value = serde_json::to_value(&merged).expect("json");
        for key in [
            "enabled",
            "actionType",
            "actionTarget",
            "actionLabel",
            "actionThumbnail",
            "triggerDeviceId",
            "triggeredResponseKey",
            "triggeredMissionId",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["actionType"], json!("media"));
    }

    #[test]
    fn merge_keeps_unrelated_fields() {
        let current = TriggerConfig {
            enabled: true,
            action_target: "video-7".to_string(),
            action_label: "Intro".to_string(),
            ..TriggerConfig::default()
        };
        let merged =
            merge_trigger_state(Some(&current), &TriggerPatch::action_type(ActionType::Devices));
        assert_eq!(merged.action_type, ActionType::Devices);
        assert_eq!(merged.action_target, "video-7");
        assert!(merged.enabled);
    }

    #[test]
    fn sanitize_clamps_and_coerces() {
        let config = sanitize_trigger_config(&json!({
            "enabled": "yes",
            "actionType": "teleport",
            "actionTarget": 12,
            "actionLabel": null,
            "triggerDeviceId": ["x"],
            "triggeredMissionId": "m-3"
        }));
        assert!(config.enabled);
        assert_eq!(config.action_type, ActionType::Media);
        assert_eq!(config.action_target, "12");
        assert_eq!(config.action_label, "");
        assert_eq!(config.trigger_device_id, "");
        assert_eq!(config.triggered_mission_id, "m-3");

        assert_eq!(sanitize_trigger_config(&json!(null)), DEFAULT_TRIGGER_CONFIG);
        assert!(!sanitize_trigger_config(&json!({ "enabled": 0 })).enabled);
        assert_eq!(
            sanitize_trigger_config(&json!({ "actionType": "missions" })).action_type,
            ActionType::Missions
        );
    }

    #[test]
    fn patch_deserializes_from_partial_json() {
        let patch: TriggerPatch =
            serde_json::from_value(json!({ "actionType": "devices" })).expect("patch");
        assert_eq!(patch, TriggerPatch::action_type(ActionType::Devices));
    }

    #[test]
    fn summary_reflects_state() {
        assert_eq!(DEFAULT_TRIGGER_CONFIG.summary(), "trigger off");
        let config = TriggerConfig {
            enabled: true,
            action_type: ActionType::Missions,
            action_target: "m-2".to_string(),
            ..TriggerConfig::default()
        };
        assert_eq!(config.summary(), "missions → m-2");
        assert_eq!(ActionType::Missions.next(), ActionType::Media);
    }
}
