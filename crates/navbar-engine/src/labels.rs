use config::{LabelMode, LabelVisibility, NavbarConfig};

/// True when a viewport of `width` pixels gets the desktop layout.
pub fn is_desktop(config: &NavbarConfig, width: u32) -> bool {
    width >= config.desktop.min_width
}

fn label_setting(config: &NavbarConfig, is_desktop: bool) -> LabelVisibility {
    if is_desktop {
        config.desktop.show_labels
    } else {
        config.mobile.show_labels
    }
}

/// Whether labels are drawn for routes (`is_popup == false`) or popup items.
pub fn should_show_labels(config: &NavbarConfig, is_desktop: bool, is_popup: bool) -> bool {
    match label_setting(config, is_desktop) {
        LabelVisibility::Bool(show) => show,
        LabelVisibility::Mode(LabelMode::PopupOnly) => is_popup,
        LabelVisibility::Mode(LabelMode::RoutesOnly) => !is_popup,
    }
}

/// Whether popup labels get a background.
pub fn should_show_label_background(config: &NavbarConfig, is_desktop: bool) -> bool {
    if is_desktop {
        config.desktop.show_popup_label_backgrounds
    } else {
        config.mobile.show_popup_label_backgrounds
    }
}
