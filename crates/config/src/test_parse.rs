#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::{Map, json};

    use crate::*;

    const MINIMAL: &str = r#"{
        "routes": [
            { "url": "/lovelace/home", "icon": "mdi:home", "label": "Home" }
        ]
    }"#;

    #[test]
    fn minimal_config_uses_widget_defaults() {
        let cfg = load_from_str(MINIMAL, None).unwrap();
        assert_eq!(cfg.routes.len(), 1);
        assert_eq!(cfg.routes[0].base.url.as_deref(), Some("/lovelace/home"));
        assert_eq!(cfg.desktop.min_width, 768);
        assert_eq!(cfg.desktop.mode, DisplayMode::Floating);
        assert_eq!(cfg.desktop.position, DesktopPosition::Bottom);
        assert_eq!(cfg.desktop.show_labels, LabelVisibility::Bool(false));
        assert_eq!(cfg.mobile.mode, DisplayMode::Docked);
        assert!(cfg.haptic.is_none());
        assert!(cfg.media_player.is_none());
    }

    #[test]
    fn ron_sources_are_accepted() {
        let ron = r#"{
            "routes": [
                { "icon": "mdi:cog", "tap_action": { "action": "toggle-menu" } },
            ],
        }"#;
        let cfg = load_from_str(ron, Some(Path::new("navbar.ron"))).unwrap();
        assert_eq!(
            cfg.routes[0].base.tap_action,
            Some(ActionDescriptor::Custom(CustomAction::ToggleMenu))
        );
    }

    #[test]
    fn json_syntax_error_reports_location() {
        let src = "{\n  \"routes\": [\n    { \"icon\": \"mdi:home\" \n  ]\n}";
        let err = load_from_str(src, Some(Path::new("bad.json"))).unwrap_err();
        match &err {
            Error::Parse {
                line, col, excerpt, ..
            } => {
                assert_eq!(*line, Some(4));
                assert!(col.is_some());
                assert!(excerpt.as_deref().unwrap().contains('^'));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
        assert!(err.pretty().starts_with("Config parse error at bad.json:4:"));
    }

    #[test]
    fn routes_are_required() {
        let err = load_from_str("{}", None).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(err.to_string().contains("routes"));
    }

    #[test]
    fn route_without_icon_or_image_fails() {
        let err = load_from_str(r#"{ "routes": [ { "url": "/a" } ] }"#, None).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(err.to_string().starts_with("route 0:"));
        assert!(err.to_string().contains("\"icon\" or \"image\""));
    }

    #[test]
    fn route_without_actionable_property_fails() {
        let src = r#"{ "routes": [
            { "icon": "mdi:home", "url": "/a" },
            { "image": "/local/x.png" }
        ] }"#;
        let err = load_from_str(src, None).unwrap_err();
        assert!(err.to_string().starts_with("route 1:"));
        assert!(err.to_string().contains("actionable"));
    }

    #[test]
    fn popup_or_action_counts_as_actionable() {
        let src = r#"{ "routes": [
            { "icon": "mdi:menu", "popup": [ { "icon": "mdi:a", "url": "/a" } ] },
            { "icon": "mdi:menu", "popup": "[[[ return [] ]]]" },
            { "icon": "mdi:menu", "submenu": [ { "icon": "mdi:b", "url": "/b" } ] },
            { "icon": "mdi:bell", "hold_action": { "action": "show-notifications" } }
        ] }"#;
        let cfg = load_from_str(src, None).unwrap();
        assert_eq!(cfg.routes.len(), 4);
        assert!(cfg.routes[1].popup.as_ref().unwrap().is_string());
        assert_eq!(cfg.routes[2].submenu.as_ref().unwrap()[0].url.as_deref(), Some("/b"));
    }

    #[test]
    fn action_without_tag_is_a_validation_error() {
        let src = r#"{ "routes": [ { "icon": "mdi:x", "tap_action": { "entity": "light.a" } } ] }"#;
        let err = load_from_str(src, None).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn haptic_forms() {
        let uniform = load_from_str(
            r#"{ "routes": [ { "icon": "mdi:x", "url": "/" } ], "haptic": true }"#,
            None,
        )
        .unwrap();
        assert_eq!(uniform.haptic, Some(HapticConfig::Uniform(true)));

        let per = load_from_str(
            r#"{ "routes": [ { "icon": "mdi:x", "url": "/" } ],
                 "haptic": { "tap_action": true, "hold_action": false } }"#,
            None,
        )
        .unwrap();
        let Some(HapticConfig::PerAction(actions)) = per.haptic else {
            panic!("expected per-action haptics");
        };
        assert_eq!(actions.tap_action, Some(true));
        assert_eq!(actions.hold_action, Some(false));
        assert_eq!(actions.url, None);
    }

    #[test]
    fn label_visibility_modes() {
        let cfg = load_from_str(
            r#"{ "routes": [ { "icon": "mdi:x", "url": "/" } ],
                 "desktop": { "show_labels": "popup_only", "min_width": 1024 },
                 "mobile": { "show_labels": true } }"#,
            None,
        )
        .unwrap();
        assert_eq!(cfg.desktop.show_labels, LabelVisibility::Mode(LabelMode::PopupOnly));
        assert_eq!(cfg.desktop.min_width, 1024);
        assert_eq!(cfg.mobile.show_labels, LabelVisibility::Bool(true));
    }

    #[test]
    fn legacy_badge_text_color_is_honoured() {
        let cfg = load_from_str(
            r#"{ "routes": [ { "icon": "mdi:x", "url": "/",
                 "badge": { "show": true, "textColor": "white" } } ] }"#,
            None,
        )
        .unwrap();
        let badge = cfg.routes[0].base.badge.as_ref().unwrap();
        assert_eq!(badge.text_color_field(), Some(&json!("white")));
    }

    #[test]
    fn dashboard_template_is_merged_under_card_config() {
        let mut templates = Map::new();
        templates.insert(
            "base".to_string(),
            json!({
                "routes": [ { "icon": "mdi:home", "url": "/home" } ],
                "desktop": { "position": "left", "min_width": 900 }
            }),
        );
        let card = r#"{ "template": "base", "desktop": { "min_width": 1200 } }"#;
        let cfg = load_with_templates(card, None, Some(&templates)).unwrap();
        assert_eq!(cfg.routes.len(), 1);
        assert_eq!(cfg.desktop.position, DesktopPosition::Left);
        assert_eq!(cfg.desktop.min_width, 1200);
        assert_eq!(cfg.template.as_deref(), Some("base"));
    }

    #[test]
    fn missing_templates_map_leaves_card_config() {
        let card = r#"{ "template": "base", "routes": [ { "icon": "mdi:x", "url": "/" } ] }"#;
        let cfg = load_with_templates(card, None, None).unwrap();
        assert_eq!(cfg.routes.len(), 1);
    }

    #[test]
    fn unreadable_path_is_a_read_error() {
        let err = load_from_path(Path::new("/nonexistent/navbar.json")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
        assert_eq!(err.path(), Some(Path::new("/nonexistent/navbar.json")));
    }
}
