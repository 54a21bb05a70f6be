// Defaults and constants for the widget configuration

/// Viewport width at which the desktop layout starts.
pub(crate) const DESKTOP_MIN_WIDTH: u32 = 768;

// Haptic defaults, applied per field when the config leaves one unset
/// Implicit navigation to a route `url`.
pub const HAPTIC_URL: bool = false;
/// Tap actions.
pub const HAPTIC_TAP: bool = false;
/// Hold actions.
pub const HAPTIC_HOLD: bool = true;
/// Double-tap actions.
pub const HAPTIC_DOUBLE_TAP: bool = true;

/// Fallback badge background colour.
pub const BADGE_COLOR: &str = "red";

/// Media player states in which the widget shows itself by default.
pub const MEDIA_PLAYER_ACTIVE_STATES: &[&str] = &["playing", "paused"];
