//! Typed resolution of templatable configuration fields for render paths.
//!
//! Render paths never fail: a broken template degrades to its raw text (for
//! strings) or to `false` (for flags).

use serde_json::Value;
use tracing::warn;

use crate::{EvalOptions, TemplateContext, TemplateEngine, is_template};

/// JavaScript truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Display form of a resolved value.
fn display(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl TemplateEngine {
    /// Resolve a field to any value; failing templates yield their raw text.
    pub fn resolve_value(&self, ctx: &TemplateContext, value: &Value) -> Value {
        if !is_template(value) {
            return value.clone();
        }
        self.evaluate(ctx, value, EvalOptions::safe())
            .unwrap_or_else(|_| value.clone())
    }

    /// Resolve a field to display text.
    pub fn resolve_string(&self, ctx: &TemplateContext, value: &Value) -> String {
        display(self.resolve_value(ctx, value))
    }

    /// Resolve a flag. A failing template counts as `false`.
    pub fn resolve_bool(&self, ctx: &TemplateContext, value: &Value) -> bool {
        if !is_template(value) {
            return is_truthy(value);
        }
        match self.evaluate(ctx, value, EvalOptions::strict()) {
            Ok(v) => is_truthy(&v),
            Err(e) => {
                warn!(template = %value, error = %e, "flag template failed; treating as false");
                false
            }
        }
    }

    /// Resolve a number, accepting numeric strings.
    pub fn resolve_number(&self, ctx: &TemplateContext, value: &Value) -> Option<f64> {
        if is_template(value) {
            match self.evaluate(ctx, value, EvalOptions::strict()) {
                Ok(v) => as_number(&v),
                Err(e) => {
                    warn!(template = %value, error = %e, "number template failed");
                    None
                }
            }
        } else {
            as_number(value)
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
