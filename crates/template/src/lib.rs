//! Dynamic configuration values.
//!
//! A configuration string of the form `[[[ ... ]]]` is a template: its body is
//! a small script evaluated against the host state each time the value is
//! needed. Bodies are compiled into a function of
//! `(states, user, hass, navbar)`, cached by content hash, and only an explicit
//! `return` yields a value.
//!
//! ```text
//! [[[ return states["light.kitchen"].state === "on" ]]]
//! ```

mod cache;
mod context;
mod dialect;
mod engine;
mod error;
mod resolve;

use serde_json::Value;

pub use cache::CachePolicy;
pub use context::TemplateContext;
pub use dialect::normalize;
pub use engine::{EvalOptions, TemplateEngine};
pub use error::{Result, TemplateError};
pub use resolve::is_truthy;

/// Opening template delimiter.
pub const OPEN: &str = "[[[";
/// Closing template delimiter.
pub const CLOSE: &str = "]]]";

/// True if `value` is a template string.
pub fn is_template(value: &Value) -> bool {
    value.as_str().is_some_and(is_template_str)
}

/// True if `s`, once trimmed, is delimited by `[[[` and `]]]`.
pub fn is_template_str(s: &str) -> bool {
    let t = s.trim();
    t.starts_with(OPEN) && t.ends_with(CLOSE)
}

/// Template body with every delimiter removed and surrounding whitespace trimmed.
pub fn clean_template(s: &str) -> Option<String> {
    if !is_template_str(s) {
        return None;
    }
    Some(s.replace(OPEN, "").replace(CLOSE, "").trim().to_string())
}

/// Wrap `raw` in template delimiters unless it already is a template.
pub fn wrap_template(raw: &str) -> String {
    if is_template_str(raw) {
        raw.to_string()
    } else {
        format!("{}{}{}", OPEN, raw, CLOSE)
    }
}
