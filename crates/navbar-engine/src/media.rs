use config::{ActionDescriptor, MediaPlayerConfig, defaults};
use navbar_protocol::{AppState, EntityState, HostEvent};
use serde_json::{Value, json};
use template::{TemplateContext, TemplateEngine};

/// Service domain of media players.
const MEDIA_DOMAIN: &str = "media_player";

/// Visibility of the media player widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPlayerStatus {
    /// Not rendered.
    Hidden,
    /// The configured entity does not exist; shown with an error.
    Missing {
        /// Resolved entity id.
        entity: String,
        /// Message shown in place of the player.
        error: String,
    },
    /// Rendered for `entity`.
    Visible {
        /// Resolved entity id.
        entity: String,
    },
}

impl MediaPlayerStatus {
    /// True unless hidden.
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

/// Decide whether and for which entity the media player is shown.
pub fn media_player_status(
    config: Option<&MediaPlayerConfig>,
    app: &AppState,
    is_desktop: bool,
    templates: &TemplateEngine,
    ctx: &TemplateContext,
) -> MediaPlayerStatus {
    let Some(config) = config else {
        return MediaPlayerStatus::Hidden;
    };
    let Some(entity_field) = config.entity.as_ref() else {
        return MediaPlayerStatus::Hidden;
    };
    if is_desktop {
        return MediaPlayerStatus::Hidden;
    }

    let entity = templates.resolve_string(ctx, entity_field);
    if entity.is_empty() {
        return MediaPlayerStatus::Hidden;
    }
    let Some(state) = app.entity(&entity) else {
        return MediaPlayerStatus::Missing {
            error: format!("Entity not found \"{}\"", entity),
            entity,
        };
    };

    let visible = match &config.show {
        Some(show) => templates.resolve_bool(ctx, show),
        None => defaults::MEDIA_PLAYER_ACTIVE_STATES.contains(&state.state.as_str()),
    };
    if visible {
        MediaPlayerStatus::Visible { entity }
    } else {
        MediaPlayerStatus::Hidden
    }
}

/// Playback progress in `0.0..=1.0`, when the player reports a position.
pub fn progress(state: &EntityState) -> Option<f64> {
    let position = state.attribute_f64("media_position")?;
    let duration = state.attribute_f64("media_duration")?;
    (duration > 0.0).then(|| position / duration)
}

/// Toggle playback of `state`'s entity.
pub fn play_pause(state: &EntityState) -> HostEvent {
    let service = if state.state == "playing" {
        "media_pause"
    } else {
        "media_play"
    };
    call(service, &state.entity_id)
}

/// Skip to the next track.
pub fn next_track(entity: &str) -> HostEvent {
    call("media_next_track", entity)
}

/// Tap action when none is configured: the host's more-info dialog.
pub fn default_tap_action(entity: &str) -> ActionDescriptor {
    let mut action = ActionDescriptor::host("more-info");
    if let ActionDescriptor::Host(map) = &mut action {
        map.insert("entity".to_string(), Value::String(entity.to_string()));
    }
    action
}

fn call(service: &str, entity: &str) -> HostEvent {
    HostEvent::CallService {
        domain: MEDIA_DOMAIN.to_string(),
        service: service.to_string(),
        data: json!({ "entity_id": entity }),
    }
}

#[cfg(test)]
mod tests {
    use navbar_protocol::WidgetState;
    use serde_json::json;

    use super::*;

    fn setup(state: &str) -> (AppState, TemplateContext) {
        let mut app = AppState::default();
        app.set_entity(
            EntityState::new("media_player.living", state)
                .with_attribute("media_position", json!(30))
                .with_attribute("media_duration", json!(120)),
        );
        let ctx = TemplateContext::new(&app, &WidgetState::default()).unwrap();
        (app, ctx)
    }

    fn cfg(entity: Value) -> MediaPlayerConfig {
        MediaPlayerConfig {
            entity: Some(entity),
            ..MediaPlayerConfig::default()
        }
    }

    #[test]
    fn visibility_rules() {
        let t = TemplateEngine::new();
        let (app, ctx) = setup("playing");
        let c = cfg(json!("media_player.living"));

        assert_eq!(media_player_status(None, &app, false, &t, &ctx), MediaPlayerStatus::Hidden);
        assert_eq!(
            media_player_status(Some(&c), &app, true, &t, &ctx),
            MediaPlayerStatus::Hidden
        );
        assert_eq!(
            media_player_status(Some(&c), &app, false, &t, &ctx),
            MediaPlayerStatus::Visible {
                entity: "media_player.living".to_string()
            }
        );

        let (idle, idle_ctx) = setup("idle");
        assert_eq!(
            media_player_status(Some(&c), &idle, false, &t, &idle_ctx),
            MediaPlayerStatus::Hidden
        );
        let forced = MediaPlayerConfig {
            show: Some(json!("[[[ return true ]]]")),
            ..c.clone()
        };
        assert!(media_player_status(Some(&forced), &idle, false, &t, &idle_ctx).is_visible());
    }

    #[test]
    fn templated_and_missing_entities() {
        let t = TemplateEngine::new();
        let (app, ctx) = setup("paused");
        let templated = cfg(json!("[[[ return 'media_player.' + 'living' ]]]"));
        assert!(media_player_status(Some(&templated), &app, false, &t, &ctx).is_visible());

        let missing = cfg(json!("media_player.kitchen"));
        let status = media_player_status(Some(&missing), &app, false, &t, &ctx);
        assert_eq!(
            status,
            MediaPlayerStatus::Missing {
                entity: "media_player.kitchen".to_string(),
                error: "Entity not found \"media_player.kitchen\"".to_string(),
            }
        );
        assert!(status.is_visible());
    }

    #[test]
    fn playback_services() {
        let (app, _) = setup("playing");
        let state = app.entity("media_player.living").unwrap();
        assert_eq!(progress(state), Some(0.25));
        assert_eq!(
            play_pause(state),
            HostEvent::CallService {
                domain: "media_player".to_string(),
                service: "media_pause".to_string(),
                data: json!({ "entity_id": "media_player.living" }),
            }
        );
        let paused = EntityState::new("media_player.living", "paused");
        assert!(matches!(play_pause(&paused), HostEvent::CallService { service, .. } if service == "media_play"));
        assert_eq!(progress(&paused), None);
        assert!(matches!(next_track("media_player.living"), HostEvent::CallService { service, .. } if service == "media_next_track"));
    }

    #[test]
    fn default_tap_opens_more_info() {
        let action = default_tap_action("media_player.living");
        assert_eq!(action.tag(), "more-info");
        assert_eq!(action.entity().as_deref(), Some("media_player.living"));
    }
}
