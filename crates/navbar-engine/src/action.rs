//! Action execution.
//!
//! The executor turns an [`ActionDescriptor`] and the gesture that triggered
//! it into host events. Widget-level actions are handled here; every other
//! action is forwarded to the host unchanged.

use std::{sync::Arc, time::Duration};

use config::{ActionDescriptor, CustomAction, HapticConfig};
use navbar_protocol::{GestureKind, HostEvent, TargetId};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use template::{EvalOptions, TemplateContext, TemplateEngine};
use tracing::{debug, error};

use crate::{Error, HostBridge, PopupTracker, Result, haptic::should_trigger_haptic};

/// Delay before a host action is forwarded, so it lands after the gesture's own events.
pub const HOST_ACTION_DELAY: Duration = Duration::from_millis(10);

/// The item that owns a dispatched action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOwner {
    /// A top-level route.
    Route {
        /// Position in the configured route list.
        index: usize,
        /// Implicit navigation target.
        url: Option<String>,
        /// Number of resolved popup entries.
        popup_items: usize,
    },
    /// An entry in the popup of route `route`.
    PopupItem {
        /// Owning route.
        route: usize,
        /// Position in the route's popup.
        index: usize,
        /// Implicit navigation target.
        url: Option<String>,
    },
    /// A free-standing widget such as the media player.
    Widget,
}

impl ActionOwner {
    /// Route whose popup this owner lives in or controls.
    pub fn popup_route(&self) -> Option<usize> {
        match self {
            Self::Route { index, .. } => Some(*index),
            Self::PopupItem { route, .. } => Some(*route),
            Self::Widget => None,
        }
    }

    /// Navigation target for an implicit tap.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Route { url, .. } | Self::PopupItem { url, .. } => url.as_deref(),
            Self::Widget => None,
        }
    }
}

/// Everything the executor knows about a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchContext {
    /// Element the gesture landed on.
    pub target: TargetId,
    /// Item whose action is running.
    pub owner: ActionOwner,
    /// Gesture that selected the action.
    pub gesture: GestureKind,
}

/// Performs actions on behalf of gesture detectors.
#[derive(Clone)]
pub struct ActionExecutor {
    host: HostBridge,
    popups: PopupTracker,
    haptic: Arc<RwLock<Option<HapticConfig>>>,
    templates: &'static TemplateEngine,
}

impl ActionExecutor {
    /// Executor using the process-wide template engine.
    pub fn new(host: HostBridge) -> Self {
        Self::with_templates(host, TemplateEngine::shared())
    }

    pub fn with_templates(host: HostBridge, templates: &'static TemplateEngine) -> Self {
        Self {
            popups: PopupTracker::new(host.clone()),
            host,
            haptic: Arc::new(RwLock::new(None)),
            templates,
        }
    }

    /// Install the haptic configuration.
    pub fn set_haptic(&self, config: Option<HapticConfig>) {
        *self.haptic.write() = config;
    }

    pub fn popups(&self) -> &PopupTracker {
        &self.popups
    }

    pub fn host(&self) -> &HostBridge {
        &self.host
    }

    /// Execute `action`, logging instead of returning failures.
    pub fn execute(
        &self,
        action: Option<&ActionDescriptor>,
        ctx: &DispatchContext,
        tctx: &TemplateContext,
    ) {
        if let Err(e) = self.try_execute(action, ctx, tctx) {
            error!(gesture = %ctx.gesture, target = %ctx.target, error = %e, "action failed");
        }
    }

    /// Execute `action` for the gesture described by `ctx`.
    pub fn try_execute(
        &self,
        action: Option<&ActionDescriptor>,
        ctx: &DispatchContext,
        tctx: &TemplateContext,
    ) -> Result<()> {
        self.host.send(HostEvent::ResetRipple {
            target: ctx.target.clone(),
        })?;

        let opening_popup = action.is_some_and(ActionDescriptor::is_open_popup);
        if !opening_popup && let Some(route) = ctx.owner.popup_route() {
            self.popups.close(route)?;
        }

        let Some(action) = action else {
            return self.implicit(ctx);
        };
        debug!(action = %action.tag(), gesture = %ctx.gesture, "execute");

        match action {
            ActionDescriptor::Custom(custom) => self.custom(custom, ctx, tctx),
            ActionDescriptor::Host(map) => {
                self.haptic(ctx.gesture, false)?;
                let entity = action.entity();
                self.host.send_later(
                    HOST_ACTION_DELAY,
                    HostEvent::Action {
                        gesture: ctx.gesture,
                        config: host_action_config(ctx.gesture, map, entity.as_deref()),
                        entity,
                    },
                );
                Ok(())
            }
        }
    }

    fn custom(&self, action: &CustomAction, ctx: &DispatchContext, tctx: &TemplateContext) -> Result<()> {
        let gesture = ctx.gesture;
        match action {
            CustomAction::OpenPopup => {
                let ActionOwner::Route {
                    index, popup_items, ..
                } = ctx.owner
                else {
                    debug!("open-popup ignored outside a route");
                    return Ok(());
                };
                if popup_items == 0 {
                    return Err(Error::NoPopupItems { route: index });
                }
                self.haptic(gesture, false)?;
                self.popups.open(index, &ctx.target)
            }
            CustomAction::NavigateBack => {
                self.haptic(gesture, true)?;
                self.host.send(HostEvent::HistoryBack)
            }
            CustomAction::ToggleMenu => {
                self.haptic(gesture, false)?;
                self.host.send(HostEvent::ToggleMenu)
            }
            CustomAction::ShowNotifications => {
                self.haptic(gesture, false)?;
                self.host.send(HostEvent::ShowNotifications)
            }
            CustomAction::Quickbar { mode } => {
                self.haptic(gesture, false)?;
                self.host.send(HostEvent::KeyDown {
                    key: CustomAction::quickbar_key(*mode),
                })
            }
            CustomAction::OpenEditMode => {
                self.haptic(gesture, false)?;
                self.host.send(HostEvent::ForceEditMode)
            }
            CustomAction::Logout => {
                self.haptic(gesture, false)?;
                self.host.send(HostEvent::Logout)
            }
            CustomAction::CustomJsAction { code } => {
                self.haptic(gesture, false)?;
                self.templates
                    .evaluate(tctx, &Value::String(code.clone()), EvalOptions::statement())?;
                Ok(())
            }
        }
    }

    /// No action bound: a tap on an item with a url navigates there.
    fn implicit(&self, ctx: &DispatchContext) -> Result<()> {
        match ctx.owner.url() {
            Some(url) if ctx.gesture == GestureKind::Tap => {
                self.haptic(ctx.gesture, true)?;
                self.host.send(HostEvent::Navigate {
                    path: url.to_string(),
                })
            }
            _ => {
                debug!(gesture = %ctx.gesture, "no action configured");
                Ok(())
            }
        }
    }

    fn haptic(&self, gesture: GestureKind, is_navigation: bool) -> Result<()> {
        if should_trigger_haptic(self.haptic.read().as_ref(), gesture, is_navigation) {
            self.host.haptic()?;
        }
        Ok(())
    }
}

/// Config object handed to the host: the descriptor under the gesture's
/// action key, plus the entity for kinds that need one.
fn host_action_config(gesture: GestureKind, descriptor: &Map<String, Value>, entity: Option<&str>) -> Value {
    let mut config = Map::new();
    config.insert(gesture.action_key().to_string(), Value::Object(descriptor.clone()));
    if let Some(entity) = entity {
        config.insert("entity".to_string(), Value::String(entity.to_string()));
    }
    Value::Object(config)
}
