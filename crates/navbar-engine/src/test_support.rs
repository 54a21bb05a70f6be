//! Test support utilities for navbar-engine unit and integration tests.
//! These helpers are public so integration tests can share them.

use std::{sync::Arc, time::Duration};

use config::NavbarConfig;
use navbar_protocol::{
    AppState, EntityState, GestureKind, HostEvent, TargetId,
    bus::{HostRx, host_channel},
};
use parking_lot::Mutex;
use serde_json::Value;

use crate::Navbar;

/// Build a configuration from a JSON document, panicking on invalid input.
pub fn config_from_json(value: Value) -> NavbarConfig {
    match config::from_value(value, None) {
        Ok(cfg) => cfg,
        Err(e) => panic!("invalid test config: {}", e.pretty()),
    }
}

/// A widget plus the receiving end of its host channel.
pub fn navbar(config: NavbarConfig) -> (Navbar, HostRx) {
    let (tx, rx) = host_channel();
    (Navbar::new(config, tx), rx)
}

/// State snapshot with the given `(entity_id, state)` pairs.
pub fn app_state(entities: &[(&str, &str)]) -> AppState {
    let mut app = AppState::default();
    for (id, state) in entities {
        app.set_entity(EntityState::new(*id, *state));
    }
    app
}

/// Drain every event currently queued on `rx`.
pub fn drain(rx: &mut HostRx) -> Vec<HostEvent> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

/// Events queued on `rx` with haptic and ripple bookkeeping removed.
pub fn drain_effects(rx: &mut HostRx) -> Vec<HostEvent> {
    drain(rx)
        .into_iter()
        .filter(|ev| !matches!(ev, HostEvent::Haptic { .. } | HostEvent::ResetRipple { .. }))
        .collect()
}

/// Receive the next event within `timeout_ms`.
pub async fn recv_within(rx: &mut HostRx, timeout_ms: u64) -> Option<HostEvent> {
    tokio::time::timeout(Duration::from_millis(timeout_ms), rx.recv())
        .await
        .ok()
        .flatten()
}

/// Sleep on the tokio clock. Under a paused clock this advances time and lets
/// spawned timers run.
pub async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Gesture sink that records what it receives.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<(GestureKind, TargetId)>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn events(&self) -> Vec<(GestureKind, TargetId)> {
        self.events.lock().clone()
    }

    /// Gestures recorded so far, without targets.
    pub fn kinds(&self) -> Vec<GestureKind> {
        self.events.lock().iter().map(|(k, _)| *k).collect()
    }

    /// A sink closure feeding this recorder.
    pub fn sink(&self) -> impl Fn(GestureKind, &TargetId) + Send + Sync + 'static {
        let events = self.events.clone();
        move |gesture: GestureKind, target: &TargetId| events.lock().push((gesture, target.clone()))
    }
}
