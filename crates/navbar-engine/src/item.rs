//! Render models for routes and popup items.
//!
//! Every templatable field is resolved against the current state. Resolution
//! never fails: broken templates degrade per field.

use config::{BadgeConfig, ItemBase, PopupItem, RouteItem, defaults};
use serde_json::Value;
use template::{EvalOptions, TemplateContext, TemplateEngine, is_template};
use tracing::warn;

/// Resolved badge.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBadge {
    /// Count shown inside the badge; `None` renders a plain dot.
    pub count: Option<Value>,
    /// Badge background colour.
    pub color: String,
    /// Explicit count colour, if configured.
    pub text_color: Option<String>,
}

/// Resolved display state of a route or popup item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedItem {
    /// Hidden by its `hidden` template.
    pub hidden: bool,
    /// Selected by template or by the current location.
    pub active: bool,
    /// `None` when labels are not shown.
    pub label: Option<String>,
    /// Icon for the current active state.
    pub icon: Option<String>,
    /// Image for the current active state.
    pub image: Option<String>,
    /// Icon colour, if configured.
    pub icon_color: Option<String>,
    /// Highlight colour while active.
    pub selected_color: Option<String>,
    /// `None` when the badge is not shown.
    pub badge: Option<ResolvedBadge>,
}

/// Resolved route with its popup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedRoute {
    /// The route button itself.
    pub item: ResolvedItem,
    /// Popup entries in display order.
    pub popup: Vec<ResolvedItem>,
    /// True when the route or any of its popup items is active.
    pub self_or_child_active: bool,
}

/// Resolves items against one state snapshot.
pub struct Resolver<'a> {
    /// Engine used for every templatable field.
    pub templates: &'a TemplateEngine,
    /// Arguments for every template evaluated in this pass.
    pub ctx: &'a TemplateContext,
    /// Browser location used for url matching.
    pub current_path: &'a str,
    /// Whether route buttons carry labels.
    pub show_route_labels: bool,
    /// Whether popup entries carry labels.
    pub show_popup_labels: bool,
}

impl Resolver<'_> {
    /// Render model of a route and its popup.
    pub fn route(&self, route: &RouteItem) -> ResolvedRoute {
        let item = self.item(&route.base, self.show_route_labels);
        let popup: Vec<ResolvedItem> = self
            .popup_items(route)
            .iter()
            .map(|p| self.popup_item(p))
            .collect();
        let self_or_child_active = item.active || popup.iter().any(|p| p.active);
        ResolvedRoute {
            item,
            popup,
            self_or_child_active,
        }
    }

    /// Render model of one popup entry.
    pub fn popup_item(&self, item: &PopupItem) -> ResolvedItem {
        self.item(item, self.show_popup_labels)
    }

    /// Popup entries of `route`: the evaluated `popup` template, the literal
    /// `popup` list, or the `submenu` list.
    pub fn popup_items(&self, route: &RouteItem) -> Vec<PopupItem> {
        match &route.popup {
            Some(v) if is_template(v) => {
                match self.templates.evaluate_as::<Vec<PopupItem>>(self.ctx, v) {
                    Ok(items) => items,
                    Err(e) => {
                        warn!(error = %e, "popup template failed");
                        Vec::new()
                    }
                }
            }
            Some(Value::Array(_)) => route
                .popup
                .clone()
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default(),
            _ => route.submenu.clone().unwrap_or_default(),
        }
    }

    /// True when the item is selected: its `selected` template, else a url match.
    pub fn is_active(&self, item: &ItemBase) -> bool {
        match &item.selected {
            Some(selected) => self.templates.resolve_bool(self.ctx, selected),
            None => item
                .url
                .as_deref()
                .is_some_and(|url| url_matches(url, self.current_path)),
        }
    }

    /// True when the item's `hidden` template holds.
    pub fn is_hidden(&self, item: &ItemBase) -> bool {
        item.hidden
            .as_ref()
            .is_some_and(|h| self.templates.resolve_bool(self.ctx, h))
    }

    fn item(&self, item: &ItemBase, show_labels: bool) -> ResolvedItem {
        let active = self.is_active(item);
        let pick = |selected: &Option<Value>, normal: &Option<Value>| {
            let field = if active { selected.as_ref().or(normal.as_ref()) } else { normal.as_ref() };
            field.and_then(|v| self.text(v))
        };
        ResolvedItem {
            hidden: self.is_hidden(item),
            active,
            label: show_labels.then(|| {
                item.label
                    .as_ref()
                    .and_then(|l| self.text(l))
                    .unwrap_or_else(|| " ".to_string())
            }),
            icon: pick(&item.icon_selected, &item.icon),
            image: pick(&item.image_selected, &item.image),
            icon_color: item.icon_color.as_ref().and_then(|v| self.text(v)),
            selected_color: item.selected_color.as_ref().and_then(|v| self.text(v)),
            badge: item.badge.as_ref().and_then(|b| self.badge(b)),
        }
    }

    fn badge(&self, badge: &BadgeConfig) -> Option<ResolvedBadge> {
        let show = match (&badge.show, &badge.template) {
            (Some(show), _) => self.templates.resolve_bool(self.ctx, show),
            (None, Some(expr)) => self.templates.evaluate_legacy_badge(self.ctx, expr),
            (None, None) => false,
        };
        if !show {
            return None;
        }
        let count = badge
            .count
            .as_ref()
            .map(|c| self.templates.resolve_value(self.ctx, c))
            .filter(|c| !c.is_null());
        Some(ResolvedBadge {
            count,
            color: badge
                .color
                .as_ref()
                .and_then(|c| self.text(c))
                .unwrap_or_else(|| defaults::BADGE_COLOR.to_string()),
            text_color: badge.text_color_field().and_then(|c| self.text(c)),
        })
    }

    /// Resolved display text; empty results count as absent.
    fn text(&self, value: &Value) -> Option<String> {
        let resolved = if is_template(value) {
            self.templates
                .evaluate(self.ctx, value, EvalOptions::safe())
                .unwrap_or_else(|_| value.clone())
        } else {
            value.clone()
        };
        match resolved {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

/// Whether an item `url` selects the location `path`.
///
/// Absolute urls must match exactly. Relative urls match the tail of the
/// path, ignoring a trailing `/` on either side.
fn url_matches(url: &str, path: &str) -> bool {
    if url.starts_with('/') {
        return url == path;
    }
    let url = url.strip_suffix('/').unwrap_or(url);
    let path = path.strip_suffix('/').unwrap_or(path);
    path.ends_with(&format!("/{url}"))
}
