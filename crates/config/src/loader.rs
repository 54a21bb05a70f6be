//! Parse and load widget configuration.

use std::{ffi::OsStr, fs, path::Path};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{Error, NavbarConfig, deep_merge_keep_arrays, validate::validate};

/// Source syntax of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Ron,
}

impl Format {
    fn for_path(path: Option<&Path>) -> Self {
        match path.and_then(Path::extension) {
            Some(ext) if ext == OsStr::new("ron") => Self::Ron,
            _ => Self::Json,
        }
    }
}

/// Load a configuration from disk. `.ron` files are read as RON, everything else as JSON.
pub fn load_from_path(path: &Path) -> Result<NavbarConfig, Error> {
    let source = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    load_from_str(&source, Some(path))
}

/// Parse and validate a configuration from `source`.
pub fn load_from_str(source: &str, path: Option<&Path>) -> Result<NavbarConfig, Error> {
    load_with_templates(source, path, None)
}

/// Parse a configuration, applying a dashboard-level template when it names one.
pub fn load_with_templates(
    source: &str,
    path: Option<&Path>,
    templates: Option<&Map<String, Value>>,
) -> Result<NavbarConfig, Error> {
    let raw = parse_value(source, path)?;
    let merged = apply_template(raw, templates);
    from_value(merged, path)
}

/// Build a configuration from an already-parsed document.
pub fn from_value(value: Value, path: Option<&Path>) -> Result<NavbarConfig, Error> {
    let cfg: NavbarConfig =
        serde_json::from_value(value).map_err(|e| Error::validation(path, e.to_string()))?;
    validate(&cfg, path)?;
    debug!(routes = cfg.routes.len(), "config loaded");
    Ok(cfg)
}

fn parse_value(source: &str, path: Option<&Path>) -> Result<Value, Error> {
    match Format::for_path(path) {
        Format::Json => serde_json::from_str(source).map_err(|e| {
            let msg = e.to_string();
            // serde_json appends " at line L column C"; the excerpt shows the location instead.
            let message = match msg.rfind(" at line ") {
                Some(i) => msg[..i].to_string(),
                None => msg,
            };
            Error::parse_at(source, path, e.line(), e.column(), message)
        }),
        Format::Ron => ron::from_str::<Value>(source).map_err(|e| Error::Parse {
            path: path.map(Path::to_path_buf),
            line: None,
            col: None,
            message: e.to_string(),
            excerpt: None,
        }),
    }
}

fn apply_template(raw: Value, templates: Option<&Map<String, Value>>) -> Value {
    let Some(name) = raw.get("template").and_then(Value::as_str).map(str::to_string) else {
        return raw;
    };
    let Some(templates) = templates else {
        warn!(template = %name, "config names a template but the dashboard defines none");
        return raw;
    };
    match templates.get(&name) {
        Some(base) => deep_merge_keep_arrays(base, &raw),
        None => {
            warn!(template = %name, "dashboard template not found");
            raw
        }
    }
}
