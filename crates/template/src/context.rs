//! Script-side view of the host state.

use navbar_protocol::{AppState, WidgetState};
use rhai::{Dynamic, serde::to_dynamic};

use crate::{Result, TemplateError};

/// Positional arguments passed to every template: `(states, user, hass, navbar)`.
///
/// Built once per render pass; each evaluation works on its own clone.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    states: Dynamic,
    user: Dynamic,
    hass: Dynamic,
    navbar: Dynamic,
}

impl TemplateContext {
    /// Convert a state snapshot and the widget state into script values.
    pub fn new(app: &AppState, widget: &WidgetState) -> Result<Self> {
        Ok(Self {
            states: convert(&app.states, "states")?,
            user: convert(&app.user, "user")?,
            hass: convert(app, "hass")?,
            navbar: convert(widget, "navbar")?,
        })
    }

    /// Fresh copies of the four arguments, in calling order.
    pub(crate) fn args(&self) -> (Dynamic, Dynamic, Dynamic, Dynamic) {
        (
            self.states.clone(),
            self.user.clone(),
            self.hass.clone(),
            self.navbar.clone(),
        )
    }

    /// A fresh copy of the entity state map.
    pub(crate) fn states(&self) -> Dynamic {
        self.states.clone()
    }
}

fn convert<T: serde::Serialize + ?Sized>(value: &T, what: &str) -> Result<Dynamic> {
    to_dynamic(value).map_err(|e| TemplateError::Context(format!("{}: {}", what, e)))
}
