//! Structural checks that serde cannot express.

use std::path::Path;

use crate::{Error, NavbarConfig, RouteItem};

/// Check every route of `cfg`, reporting the first offending one.
pub(crate) fn validate(cfg: &NavbarConfig, path: Option<&Path>) -> Result<(), Error> {
    for (idx, route) in cfg.routes.iter().enumerate() {
        validate_route(route).map_err(|msg| Error::validation(path, format!("route {}: {}", idx, msg)))?;
    }
    Ok(())
}

/// A route needs something to draw and something to do.
fn validate_route(route: &RouteItem) -> Result<(), String> {
    let base = &route.base;
    if base.icon.is_none() && base.image.is_none() {
        return Err(
            "each route must have either an \"icon\" or \"image\" property configured".to_string(),
        );
    }
    let has_popup = route.popup.is_some() || route.submenu.is_some();
    if !has_popup && base.url.is_none() && !base.has_any_action() {
        return Err("each route must have at least one actionable property \
             (url, popup, tap_action, hold_action, double_tap_action)"
            .to_string());
    }
    Ok(())
}
