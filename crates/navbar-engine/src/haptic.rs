use config::{HapticConfig, defaults};
use navbar_protocol::GestureKind;

/// Decide whether a gesture should produce haptic feedback.
///
/// `is_navigation` marks plain navigation (implicit `url` taps and
/// navigate-back), which has its own switch.
pub fn should_trigger_haptic(
    config: Option<&HapticConfig>,
    gesture: GestureKind,
    is_navigation: bool,
) -> bool {
    let per_action = match config {
        Some(HapticConfig::Uniform(enabled)) => return *enabled,
        Some(HapticConfig::PerAction(actions)) => Some(actions),
        None => None,
    };

    if is_navigation {
        return per_action
            .and_then(|a| a.url)
            .unwrap_or(defaults::HAPTIC_URL);
    }
    match gesture {
        GestureKind::Tap => per_action
            .and_then(|a| a.tap_action)
            .unwrap_or(defaults::HAPTIC_TAP),
        GestureKind::Hold => per_action
            .and_then(|a| a.hold_action)
            .unwrap_or(defaults::HAPTIC_HOLD),
        GestureKind::DoubleTap => per_action
            .and_then(|a| a.double_tap_action)
            .unwrap_or(defaults::HAPTIC_DOUBLE_TAP),
    }
}
