//! Shared types exchanged between the navbar core and its host dashboard.
//!
//! The host owns the application state and performs every side effect; the
//! core only reads [`AppState`] snapshots and emits [`HostEvent`]s.
use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// State record for a single entity, as published by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityState {
    /// `domain.object_id`, e.g. `light.kitchen`.
    pub entity_id: String,
    /// Current state as reported by the host, e.g. `on` or `playing`.
    pub state: String,
    pub attributes: Map<String, Value>,
    /// Timestamp of the last state change.
    pub last_changed: String,
    /// Timestamp of the last state or attribute update.
    pub last_updated: String,
}

impl EntityState {
    /// Construct a state record with no attributes.
    pub fn new(entity_id: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: state.into(),
            ..Self::default()
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Numeric attribute lookup.
    pub fn attribute_f64(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).and_then(Value::as_f64)
    }
}

/// Read-only snapshot of the host application state.
///
/// Unknown top-level fields (areas, panels, ...) are kept in `extra` so that
/// templates can reach them through `hass`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    /// Entity states keyed by entity id.
    pub states: BTreeMap<String, EntityState>,
    /// Current user record.
    pub user: Value,
    /// Path of the dashboard view currently shown.
    pub current_path: String,
    /// Any other host fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppState {
    /// Look up an entity state by id.
    pub fn entity(&self, id: &str) -> Option<&EntityState> {
        self.states.get(id)
    }

    /// Insert or replace an entity state.
    pub fn set_entity(&mut self, state: EntityState) {
        self.states.insert(state.entity_id.clone(), state);
    }
}

/// Public state of the widget itself, exposed to templates as `navbar`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetState {
    /// Desktop layout is in effect.
    pub is_desktop: bool,
}

/// Classified pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    /// Short press and release.
    Tap,
    /// Press held past the hold delay.
    Hold,
    /// Two taps on one target within the double-tap window.
    DoubleTap,
}

impl GestureKind {
    /// Wire name of the gesture (`tap`, `hold`, `double_tap`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tap => "tap",
            Self::Hold => "hold",
            Self::DoubleTap => "double_tap",
        }
    }

    /// Config key holding the action for this gesture.
    pub fn action_key(self) -> &'static str {
        match self {
            Self::Tap => "tap_action",
            Self::Hold => "hold_action",
            Self::DoubleTap => "double_tap_action",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque identifier of the UI element a gesture was performed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub String);

impl TargetId {
    /// Create a target id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Haptic feedback flavour requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticKind {
    /// Light tick used for selections.
    Selection,
}

/// Side effects requested of the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HostEvent {
    /// Fire haptic feedback.
    Haptic {
        /// Feedback flavour.
        kind: HapticKind,
    },
    /// Clear pressed/ripple visuals on a target.
    ResetRipple {
        /// Element that was pressed.
        target: TargetId,
    },
    /// Open the popup of route `route`, anchored to `target`.
    OpenPopup {
        /// Route owning the popup.
        route: usize,
        /// Element the popup is anchored to.
        target: TargetId,
    },
    /// Start closing the popup of route `route`.
    ClosePopup {
        /// Route owning the popup.
        route: usize,
    },
    /// The close transition of route `route`'s popup has finished.
    PopupRemoved {
        /// Route owning the popup.
        route: usize,
    },
    /// Ask the host to toggle its sidebar menu.
    ToggleMenu,
    /// Ask the host to show its notification drawer.
    ShowNotifications,
    /// Synthetic key press (used to open the quick bar).
    KeyDown {
        /// Key to press.
        key: char,
    },
    /// Go back in navigation history.
    HistoryBack,
    /// Navigate to a path.
    Navigate {
        /// Destination path.
        path: String,
    },
    /// Force the dashboard into edit mode.
    ForceEditMode,
    /// Revoke the current auth session.
    Logout,
    /// Host-native action, passed through unchanged.
    Action {
        /// Gesture that triggered the action.
        gesture: GestureKind,
        /// `{ "<gesture>_action": descriptor }`, plus `entity` for actions
        /// that need one.
        config: Value,
        /// Entity the action applies to, for `more-info` and `toggle`.
        entity: Option<String>,
    },
    /// Invoke a host service.
    CallService {
        /// Service domain, e.g. `media_player`.
        domain: String,
        /// Service name within the domain.
        service: String,
        /// Service data, usually carrying `entity_id`.
        data: Value,
    },
}

/// Channel aliases for the host event bus.
pub mod bus {
    use super::HostEvent;

    /// Tokio unbounded sender for host events.
    pub type HostTx = tokio::sync::mpsc::UnboundedSender<HostEvent>;
    /// Tokio unbounded receiver for host events.
    pub type HostRx = tokio::sync::mpsc::UnboundedReceiver<HostEvent>;

    /// Create a standard unbounded host channel (sender, receiver).
    pub fn host_channel() -> (HostTx, HostRx) {
        tokio::sync::mpsc::unbounded_channel::<HostEvent>()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn app_state_keeps_unknown_fields() {
        let state: AppState = serde_json::from_value(json!({
            "states": {
                "light.kitchen": { "entity_id": "light.kitchen", "state": "on" }
            },
            "user": { "name": "User" },
            "areas": { "area1": { "name": "Kitchen" } }
        }))
        .unwrap();
        assert_eq!(state.entity("light.kitchen").unwrap().state, "on");
        assert!(state.extra.contains_key("areas"));
        assert_eq!(state.current_path, "");
    }

    #[test]
    fn widget_state_uses_camel_case() {
        let v = serde_json::to_value(WidgetState { is_desktop: true }).unwrap();
        assert_eq!(v, json!({ "isDesktop": true }));
    }

    #[test]
    fn gesture_names() {
        assert_eq!(GestureKind::DoubleTap.as_str(), "double_tap");
        assert_eq!(GestureKind::Hold.action_key(), "hold_action");
        assert_eq!(GestureKind::Tap.to_string(), "tap");
    }
}
