//! Configuration data model for the navbar widget.
//!
//! Fields typed as [`Value`] are "templatable": they hold either a plain value
//! or a `[[[ ... ]]]` template string resolved at render time.

use navbar_protocol::GestureKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ActionDescriptor, defaults};

/// Badge shown on a route or popup item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeConfig {
    /// Deprecated raw boolean expression over `states`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<Value>,
    /// Deprecated spelling of `text_color`.
    #[serde(rename = "textColor", skip_serializing_if = "Option::is_none")]
    pub text_color_legacy: Option<Value>,
}

impl BadgeConfig {
    /// Effective text colour field, preferring the current spelling.
    pub fn text_color_field(&self) -> Option<&Value> {
        self.text_color.as_ref().or(self.text_color_legacy.as_ref())
    }
}

/// Properties shared by routes and popup items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemBase {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tap_action: Option<ActionDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_action: Option<ActionDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub double_tap_action: Option<ActionDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_color: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_selected: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_selected: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<BadgeConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<Value>,
}

impl ItemBase {
    /// Action bound to `gesture`, if any.
    pub fn action_for(&self, gesture: GestureKind) -> Option<&ActionDescriptor> {
        match gesture {
            GestureKind::Tap => self.tap_action.as_ref(),
            GestureKind::Hold => self.hold_action.as_ref(),
            GestureKind::DoubleTap => self.double_tap_action.as_ref(),
        }
    }

    /// True when any gesture has an explicit action.
    pub fn has_any_action(&self) -> bool {
        self.tap_action.is_some() || self.hold_action.is_some() || self.double_tap_action.is_some()
    }
}

/// Entry inside a route's popup menu.
pub type PopupItem = ItemBase;

/// Top-level navigable entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteItem {
    #[serde(flatten)]
    pub base: ItemBase,
    /// Popup entries: a list, or a template producing one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popup: Option<Value>,
    /// Older name for `popup`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submenu: Option<Vec<PopupItem>>,
}

/// Global or per-gesture haptic switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HapticConfig {
    Uniform(bool),
    PerAction(HapticActions),
}

/// Per-gesture haptic switches; unset fields use the widget defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HapticActions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tap_action: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_action: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub double_tap_action: Option<bool>,
}

/// Named label visibility modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMode {
    PopupOnly,
    RoutesOnly,
}

/// Whether labels are drawn under route and popup icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelVisibility {
    Bool(bool),
    Mode(LabelMode),
}

impl Default for LabelVisibility {
    fn default() -> Self {
        Self::Bool(false)
    }
}

/// How the bar is attached to the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Floating,
    Docked,
}

/// Screen edge the desktop bar sits on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesktopPosition {
    Top,
    Left,
    #[default]
    Bottom,
    Right,
}

/// Anchor of the media player widget on desktop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetPosition {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    #[default]
    BottomCenter,
    BottomRight,
}

/// Desktop layout section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    pub mode: DisplayMode,
    pub show_labels: LabelVisibility,
    pub show_popup_label_backgrounds: bool,
    /// Viewport width at or above which the desktop layout is used.
    pub min_width: u32,
    pub position: DesktopPosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<Value>,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Floating,
            show_labels: LabelVisibility::Bool(false),
            show_popup_label_backgrounds: false,
            min_width: defaults::DESKTOP_MIN_WIDTH,
            position: DesktopPosition::Bottom,
            hidden: None,
        }
    }
}

/// Mobile layout section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MobileConfig {
    pub mode: DisplayMode,
    pub show_labels: LabelVisibility,
    pub show_popup_label_backgrounds: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<Value>,
}

impl Default for MobileConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Docked,
            show_labels: LabelVisibility::Bool(false),
            show_popup_label_backgrounds: false,
            hidden: None,
        }
    }
}

/// Media player widget section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaPlayerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<Value>,
    pub album_cover_background: bool,
    pub desktop_position: WidgetPosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tap_action: Option<ActionDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_action: Option<ActionDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub double_tap_action: Option<ActionDescriptor>,
}

/// Complete widget configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavbarConfig {
    pub routes: Vec<RouteItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_player: Option<MediaPlayerConfig>,
    /// Name of a dashboard-level template this config extends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default)]
    pub desktop: DesktopConfig,
    #[serde(default)]
    pub mobile: MobileConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub haptic: Option<HapticConfig>,
}

impl NavbarConfig {
    /// A configuration with the given routes and every other section defaulted.
    pub fn with_routes(routes: Vec<RouteItem>) -> Self {
        Self {
            routes,
            media_player: None,
            template: None,
            desktop: DesktopConfig::default(),
            mobile: MobileConfig::default(),
            haptic: None,
        }
    }
}

impl Default for NavbarConfig {
    fn default() -> Self {
        Self::with_routes(Vec::new())
    }
}
