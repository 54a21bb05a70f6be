//! Action descriptors attached to gestures.
//!
//! An action is either one of the widget's own [`CustomAction`]s or an opaque
//! host action whose fields are passed through untouched.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use serde_json::{Map, Value};

/// Tags handled by the widget itself. Every other tag belongs to the host.
const CUSTOM_TAGS: &[&str] = &[
    "open-popup",
    "navigate-back",
    "show-notifications",
    "toggle-menu",
    "quickbar",
    "open-edit-mode",
    "logout",
    "custom-js-action",
];

/// Host action tags that need an explicit entity id.
const ENTITY_TAGS: &[&str] = &["more-info", "toggle"];

/// Which list the host quick bar opens with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickbarMode {
    Devices,
    Entities,
    Commands,
}

impl QuickbarMode {
    /// Shortcut key the host binds to this quick bar mode.
    pub fn key(self) -> char {
        match self {
            Self::Devices => 'd',
            Self::Entities => 'e',
            Self::Commands => 'c',
        }
    }
}

/// Actions implemented by the widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum CustomAction {
    OpenPopup,
    NavigateBack,
    ShowNotifications,
    ToggleMenu,
    Quickbar {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<QuickbarMode>,
    },
    OpenEditMode,
    Logout,
    CustomJsAction {
        /// Template evaluated when the action runs.
        code: String,
    },
}

impl CustomAction {
    /// Key for the synthetic key press of a quick bar action; commands when unset.
    pub fn quickbar_key(mode: Option<QuickbarMode>) -> char {
        mode.map_or('c', QuickbarMode::key)
    }
}

/// A declarative "what to do" for a gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionDescriptor {
    /// Handled by the widget.
    Custom(CustomAction),
    /// Forwarded to the host runtime as-is.
    Host(Map<String, Value>),
}

impl ActionDescriptor {
    /// Build a descriptor from a raw map, dispatching on its `action` tag.
    pub fn from_map(map: Map<String, Value>) -> Result<Self, String> {
        let tag = match map.get("action") {
            Some(Value::String(s)) => s.clone(),
            _ => return Err("action descriptor must have an \"action\" property".to_string()),
        };
        if CUSTOM_TAGS.contains(&tag.as_str()) {
            serde_json::from_value(Value::Object(map))
                .map(Self::Custom)
                .map_err(|e| format!("invalid \"{}\" action: {}", tag, e))
        } else {
            Ok(Self::Host(map))
        }
    }

    /// Convenience constructor for a host action with no extra fields.
    pub fn host(tag: &str) -> Self {
        let mut map = Map::new();
        map.insert("action".to_string(), Value::String(tag.to_string()));
        Self::Host(map)
    }

    /// The `action` tag.
    pub fn tag(&self) -> String {
        match self.to_value().get("action") {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        }
    }

    /// True for the open-popup custom action.
    pub fn is_open_popup(&self) -> bool {
        matches!(self, Self::Custom(CustomAction::OpenPopup))
    }

    /// Explicit entity id carried by a host action, when its kind needs one.
    pub fn entity(&self) -> Option<String> {
        let Self::Host(map) = self else {
            return None;
        };
        if !self.needs_entity() {
            return None;
        }
        map.get("entity")
            .or_else(|| map.get("entity_id"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// True when the host action kind requires an entity id.
    pub fn needs_entity(&self) -> bool {
        match self {
            Self::Host(map) => map
                .get("action")
                .and_then(Value::as_str)
                .is_some_and(|tag| ENTITY_TAGS.contains(&tag)),
            Self::Custom(_) => false,
        }
    }

    /// Serialise back to the configuration shape.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Custom(c) => serde_json::to_value(c).unwrap_or(Value::Null),
            Self::Host(map) => Value::Object(map.clone()),
        }
    }
}

impl Serialize for ActionDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Custom(c) => c.serialize(serializer),
            Self::Host(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ActionDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_map(map).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(v: Value) -> Result<ActionDescriptor, serde_json::Error> {
        serde_json::from_value(v)
    }

    #[test]
    fn custom_tags_parse_to_custom_actions() {
        assert_eq!(
            parse(json!({ "action": "open-popup" })).unwrap(),
            ActionDescriptor::Custom(CustomAction::OpenPopup)
        );
        assert_eq!(
            parse(json!({ "action": "quickbar", "mode": "devices" })).unwrap(),
            ActionDescriptor::Custom(CustomAction::Quickbar {
                mode: Some(QuickbarMode::Devices)
            })
        );
        assert_eq!(
            parse(json!({ "action": "custom-js-action", "code": "[[[ return 1 ]]]" })).unwrap(),
            ActionDescriptor::Custom(CustomAction::CustomJsAction {
                code: "[[[ return 1 ]]]".to_string()
            })
        );
    }

    #[test]
    fn unknown_tags_pass_through() {
        let a = parse(json!({ "action": "navigate", "navigation_path": "/lovelace/1" })).unwrap();
        let ActionDescriptor::Host(map) = &a else {
            panic!("expected host action");
        };
        assert_eq!(map["navigation_path"], "/lovelace/1");
        assert_eq!(a.tag(), "navigate");
        assert_eq!(a.entity(), None);
    }

    #[test]
    fn missing_action_tag_is_rejected() {
        let err = parse(json!({ "navigation_path": "/" })).unwrap_err();
        assert!(err.to_string().contains("\"action\" property"));
    }

    #[test]
    fn custom_js_requires_code() {
        assert!(parse(json!({ "action": "custom-js-action" })).is_err());
    }

    #[test]
    fn quickbar_keys() {
        assert_eq!(CustomAction::quickbar_key(Some(QuickbarMode::Devices)), 'd');
        assert_eq!(CustomAction::quickbar_key(Some(QuickbarMode::Entities)), 'e');
        assert_eq!(CustomAction::quickbar_key(Some(QuickbarMode::Commands)), 'c');
        assert_eq!(CustomAction::quickbar_key(None), 'c');
    }

    #[test]
    fn entity_annotation_only_for_entity_actions() {
        let more_info = parse(json!({ "action": "more-info", "entity": "light.kitchen" })).unwrap();
        assert_eq!(more_info.entity().as_deref(), Some("light.kitchen"));
        let toggle = parse(json!({ "action": "toggle", "entity_id": "switch.fan" })).unwrap();
        assert_eq!(toggle.entity().as_deref(), Some("switch.fan"));
        let call = parse(json!({ "action": "call-service", "entity": "light.kitchen" })).unwrap();
        assert_eq!(call.entity(), None);
    }

    #[test]
    fn serializes_back_to_config_shape() {
        let v = json!({ "action": "quickbar", "mode": "entities" });
        assert_eq!(parse(v.clone()).unwrap().to_value(), v);
        assert_eq!(
            ActionDescriptor::Custom(CustomAction::NavigateBack).to_value(),
            json!({ "action": "navigate-back" })
        );
    }
}
