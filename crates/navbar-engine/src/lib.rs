//! Navbar Engine
//!
//! The engine is the behavioural core of the navbar widget:
//! - classifies raw pointer input into tap / hold / double-tap ([`GestureDetector`])
//! - executes the configured action for a gesture ([`ActionExecutor`])
//! - resolves templatable route and popup fields into render models
//! - decides media player visibility and playback service calls
//!
//! [`Navbar`] ties these together for one widget instance. Every side effect
//! is a [`navbar_protocol::HostEvent`] sent to the host over an unbounded channel.
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU32, Ordering},
};

mod action;
mod error;
mod gesture;
mod haptic;
mod host;
mod item;
mod labels;
mod media;
mod popup;
pub mod test_support;
mod timer;

use config::{ActionDescriptor, ItemBase, NavbarConfig, PopupItem, RouteItem};
use navbar_protocol::{AppState, GestureKind, TargetId, WidgetState, bus::HostTx};
use parking_lot::RwLock;
use template::{TemplateContext, TemplateEngine};
use tracing::{debug, error};

pub use action::{ActionExecutor, ActionOwner, DispatchContext, HOST_ACTION_DELAY};
pub use error::{Error, Result};
pub use gesture::{
    DOUBLE_TAP_WINDOW, GestureBindings, GestureDetector, GestureSink, GestureTiming, HOLD_DELAY,
    HoldMode, MOVE_THRESHOLD, Point,
};
pub use haptic::should_trigger_haptic;
pub use host::HostBridge;
pub use item::{ResolvedBadge, ResolvedItem, ResolvedRoute, Resolver};
pub use labels::{is_desktop, should_show_label_background, should_show_labels};
pub use media::{
    MediaPlayerStatus, default_tap_action, media_player_status, next_track, play_pause, progress,
};
pub use popup::{POPUP_CLOSE_DELAY, PopupTracker};
pub use timer::Timers;

/// Interactive element a gesture belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRef {
    /// Route at this position in the configuration.
    Route(usize),
    /// Entry `index` of route `route`'s popup.
    PopupItem {
        /// Owning route.
        route: usize,
        /// Position in the popup.
        index: usize,
    },
    /// The media player widget.
    MediaPlayer,
}

struct Shared {
    config: RwLock<NavbarConfig>,
    state: RwLock<AppState>,
    viewport_width: AtomicU32,
    edit_mode: AtomicBool,
    executor: ActionExecutor,
    templates: &'static TemplateEngine,
}

/// One navbar widget instance.
///
/// Cloning yields another handle to the same instance.
#[derive(Clone)]
pub struct Navbar {
    shared: Arc<Shared>,
}

impl Navbar {
    /// Create a widget that sends its side effects to `tx`.
    pub fn new(config: NavbarConfig, tx: HostTx) -> Self {
        Self::with_templates(config, tx, TemplateEngine::shared())
    }

    /// Like [`new`](Self::new) with an explicit template engine.
    pub fn with_templates(config: NavbarConfig, tx: HostTx, templates: &'static TemplateEngine) -> Self {
        let executor = ActionExecutor::with_templates(HostBridge::new(tx), templates);
        executor.set_haptic(config.haptic.clone());
        Self {
            shared: Arc::new(Shared {
                config: RwLock::new(config),
                state: RwLock::new(AppState::default()),
                viewport_width: AtomicU32::new(0),
                edit_mode: AtomicBool::new(false),
                executor,
                templates,
            }),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> NavbarConfig {
        self.shared.config.read().clone()
    }

    /// Install a new configuration. Open popups are closed; attached detectors
    /// pick up the new bindings at their next press.
    pub fn set_config(&self, config: NavbarConfig) -> Result<()> {
        self.shared.executor.set_haptic(config.haptic.clone());
        *self.shared.config.write() = config;
        self.shared.executor.popups().close_any()
    }

    /// Install a new host state snapshot.
    pub fn set_state(&self, state: AppState) {
        *self.shared.state.write() = state;
    }

    /// Record the rendered viewport width in pixels.
    pub fn set_viewport_width(&self, width: u32) {
        self.shared.viewport_width.store(width, Ordering::Relaxed);
    }

    /// Mark whether the host dashboard is being edited.
    pub fn set_edit_mode(&self, editing: bool) {
        self.shared.edit_mode.store(editing, Ordering::Relaxed);
    }

    /// True when the viewport is at least `desktop.min_width` wide.
    pub fn is_desktop(&self) -> bool {
        is_desktop(
            &self.shared.config.read(),
            self.shared.viewport_width.load(Ordering::Relaxed),
        )
    }

    /// Public widget state exposed to templates.
    pub fn widget_state(&self) -> WidgetState {
        WidgetState {
            is_desktop: self.is_desktop(),
        }
    }

    /// Template arguments for the current state.
    pub fn template_context(&self) -> Result<TemplateContext> {
        let widget = self.widget_state();
        Ok(TemplateContext::new(&self.shared.state.read(), &widget)?)
    }

    /// True when the bar is hidden for the current layout. Never hidden while editing.
    pub fn is_hidden(&self) -> Result<bool> {
        if self.shared.edit_mode.load(Ordering::Relaxed) {
            return Ok(false);
        }
        let ctx = self.template_context()?;
        let desktop = self.is_desktop();
        let config = self.shared.config.read();
        let field = if desktop {
            config.desktop.hidden.as_ref()
        } else {
            config.mobile.hidden.as_ref()
        };
        Ok(field.is_some_and(|h| self.shared.templates.resolve_bool(&ctx, h)))
    }

    /// Render models for every route.
    pub fn resolve_routes(&self) -> Result<Vec<ResolvedRoute>> {
        let ctx = self.template_context()?;
        let desktop = self.is_desktop();
        let config = self.shared.config.read();
        let state = self.shared.state.read();
        let resolver = Resolver {
            templates: self.shared.templates,
            ctx: &ctx,
            current_path: &state.current_path,
            show_route_labels: should_show_labels(&config, desktop, false),
            show_popup_labels: should_show_labels(&config, desktop, true),
        };
        Ok(config.routes.iter().map(|r| resolver.route(r)).collect())
    }

    pub fn media_player_status(&self) -> Result<MediaPlayerStatus> {
        let ctx = self.template_context()?;
        let desktop = self.is_desktop();
        let config = self.shared.config.read();
        Ok(media_player_status(
            config.media_player.as_ref(),
            &self.shared.state.read(),
            desktop,
            self.shared.templates,
            &ctx,
        ))
    }

    /// Toggle playback of the configured media player.
    pub fn media_play_pause(&self) -> Result<()> {
        if let MediaPlayerStatus::Visible { entity } = self.media_player_status()? {
            let event = self.shared.state.read().entity(&entity).map(play_pause);
            if let Some(event) = event {
                self.host().send(event)?;
            }
        }
        Ok(())
    }

    /// Skip the configured media player to its next track.
    pub fn media_next_track(&self) -> Result<()> {
        if let MediaPlayerStatus::Visible { entity } = self.media_player_status()? {
            self.host().send(next_track(&entity))?;
        }
        Ok(())
    }

    /// Close whichever popup is open.
    pub fn close_popup(&self) -> Result<()> {
        self.shared.executor.popups().close_any()
    }

    /// Route whose popup is open.
    pub fn open_popup(&self) -> Option<usize> {
        self.shared.executor.popups().open_route()
    }

    /// Run the action bound to `gesture` on `item`.
    pub fn dispatch(&self, item: ItemRef, gesture: GestureKind, target: &TargetId) -> Result<()> {
        let ctx = self.template_context()?;
        let (action, owner) = self.lookup(item, gesture, &ctx)?;
        let dispatch = DispatchContext {
            target: target.clone(),
            owner,
            gesture,
        };
        debug!(?item, %gesture, "dispatch");
        self.shared
            .executor
            .try_execute(action.as_ref(), &dispatch, &ctx)
    }

    /// Gesture detector for route `index`.
    pub fn attach_route(&self, index: usize) -> GestureDetector {
        self.attach(ItemRef::Route(index), HoldMode::OnRelease)
    }

    /// Gesture detector for entry `index` of route `route`'s popup.
    pub fn attach_popup_item(&self, route: usize, index: usize) -> GestureDetector {
        self.attach(ItemRef::PopupItem { route, index }, HoldMode::OnRelease)
    }

    /// Gesture detector for the media player widget.
    pub fn attach_media_player(&self) -> GestureDetector {
        self.attach(ItemRef::MediaPlayer, HoldMode::OnTimer)
    }

    /// Which gestures `item` currently has actions for.
    pub fn bindings(&self, item: ItemRef) -> GestureBindings {
        let ctx = match self.template_context() {
            Ok(ctx) => ctx,
            Err(e) => {
                error!(error = %e, "cannot build template context");
                return GestureBindings::default();
            }
        };
        let config = self.shared.config.read();
        match item {
            ItemRef::Route(i) => bindings_for(config.routes.get(i).map(|r| &r.base)),
            ItemRef::PopupItem { route, index } => {
                let items = config
                    .routes
                    .get(route)
                    .map(|r| self.popup_items(r, &ctx))
                    .unwrap_or_default();
                bindings_for(items.get(index))
            }
            ItemRef::MediaPlayer => match config.media_player.as_ref() {
                Some(mp) => GestureBindings {
                    tap: true,
                    hold: mp.hold_action.is_some(),
                    double_tap: mp.double_tap_action.is_some(),
                },
                None => GestureBindings::default(),
            },
        }
    }

    fn attach(&self, item: ItemRef, hold_mode: HoldMode) -> GestureDetector {
        let sink = ItemSink {
            navbar: self.clone(),
            item,
        };
        GestureDetector::new(self.bindings(item), GestureTiming::default(), hold_mode, sink)
    }

    /// Action bound to `gesture` on `item`, and the item as an action owner.
    fn lookup(
        &self,
        item: ItemRef,
        gesture: GestureKind,
        ctx: &TemplateContext,
    ) -> Result<(Option<ActionDescriptor>, ActionOwner)> {
        let config = self.shared.config.read();
        match item {
            ItemRef::Route(index) => {
                let route = config
                    .routes
                    .get(index)
                    .ok_or_else(|| Error::UnknownItem(format!("route {}", index)))?;
                let owner = ActionOwner::Route {
                    index,
                    url: route.base.url.clone(),
                    popup_items: self.popup_items(route, ctx).len(),
                };
                Ok((route.base.action_for(gesture).cloned(), owner))
            }
            ItemRef::PopupItem { route, index } => {
                let items = config
                    .routes
                    .get(route)
                    .map(|r| self.popup_items(r, ctx))
                    .unwrap_or_default();
                let entry = items.get(index).ok_or_else(|| {
                    Error::UnknownItem(format!("popup item {} of route {}", index, route))
                })?;
                let owner = ActionOwner::PopupItem {
                    route,
                    index,
                    url: entry.url.clone(),
                };
                Ok((entry.action_for(gesture).cloned(), owner))
            }
            ItemRef::MediaPlayer => {
                let mp = config
                    .media_player
                    .as_ref()
                    .ok_or_else(|| Error::UnknownItem("media player".to_string()))?;
                let action = match gesture {
                    GestureKind::Tap => mp.tap_action.clone().or_else(|| {
                        mp.entity
                            .as_ref()
                            .map(|e| self.shared.templates.resolve_string(ctx, e))
                            .filter(|e| !e.is_empty())
                            .map(|e| default_tap_action(&e))
                    }),
                    GestureKind::Hold => mp.hold_action.clone(),
                    GestureKind::DoubleTap => mp.double_tap_action.clone(),
                };
                Ok((action, ActionOwner::Widget))
            }
        }
    }

    fn popup_items(&self, route: &RouteItem, ctx: &TemplateContext) -> Vec<PopupItem> {
        let state = self.shared.state.read();
        Resolver {
            templates: self.shared.templates,
            ctx,
            current_path: &state.current_path,
            show_route_labels: false,
            show_popup_labels: false,
        }
        .popup_items(route)
    }

    fn host(&self) -> &HostBridge {
        self.shared.executor.host()
    }
}

/// Detector sink for one item. Bindings and actions are looked up in the
/// configuration current at the time of each gesture.
struct ItemSink {
    navbar: Navbar,
    item: ItemRef,
}

impl GestureSink for ItemSink {
    fn dispatch(&self, gesture: GestureKind, target: &TargetId) {
        if let Err(e) = self.navbar.dispatch(self.item, gesture, target) {
            error!(item = ?self.item, %gesture, error = %e, "gesture dispatch failed");
        }
    }

    fn bindings(&self) -> Option<GestureBindings> {
        Some(self.navbar.bindings(self.item))
    }
}

fn bindings_for(base: Option<&ItemBase>) -> GestureBindings {
    match base {
        Some(b) => GestureBindings {
            tap: true,
            hold: b.hold_action.is_some(),
            double_tap: b.double_tap_action.is_some(),
        },
        None => GestureBindings::default(),
    }
}
