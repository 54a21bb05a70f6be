//! Compilation and evaluation of templates on an embedded Rhai engine.

use std::sync::Arc;

use once_cell::sync::Lazy;
use rhai::{AST, Dynamic, Engine, EvalAltResult, Scope, serde::from_dynamic};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::{
    CachePolicy, Result, TemplateContext, TemplateError,
    cache::{TemplateCache, body_key},
    clean_template, dialect, is_template,
};

/// Name of the script function every template body is compiled into.
const TEMPLATE_FN: &str = "template";

/// Name of the function a legacy badge expression is compiled into.
const LEGACY_BADGE_FN: &str = "legacy_badge";

static SHARED: Lazy<TemplateEngine> = Lazy::new(TemplateEngine::new);

/// Per-call evaluation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalOptions {
    /// Return the input instead of an error when evaluation fails.
    pub safe: bool,
    /// Treat a body without `return` as yielding `null` rather than failing.
    pub allow_empty_return: bool,
}

impl EvalOptions {
    /// Strict evaluation: every failure is an error.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Safe evaluation: failures degrade to the original value.
    pub fn safe() -> Self {
        Self {
            safe: true,
            ..Self::default()
        }
    }

    /// Strict evaluation of a body run for its side effects.
    pub fn statement() -> Self {
        Self {
            allow_empty_return: true,
            ..Self::default()
        }
    }
}

/// Template evaluator with a compile cache keyed by template body.
pub struct TemplateEngine {
    engine: Engine,
    cache: TemplateCache,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    /// Engine with an unbounded compile cache.
    pub fn new() -> Self {
        Self::with_policy(CachePolicy::Unbounded)
    }

    /// Engine with the given cache policy.
    pub fn with_policy(policy: CachePolicy) -> Self {
        let mut engine = Engine::new();
        configure_engine(&mut engine);
        Self {
            engine,
            cache: TemplateCache::new(policy),
        }
    }

    /// Process-wide engine shared by every widget instance.
    pub fn shared() -> &'static TemplateEngine {
        &SHARED
    }

    /// Cache policy in effect.
    pub fn policy(&self) -> CachePolicy {
        self.cache.policy()
    }

    /// Number of compiled templates currently cached.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop every compiled template.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Evaluate `value` as a template against `ctx`.
    ///
    /// In safe mode a non-template is returned unchanged, and a failing
    /// template yields the original template string.
    pub fn evaluate(&self, ctx: &TemplateContext, value: &Value, opts: EvalOptions) -> Result<Value> {
        match self.evaluate_strict(ctx, value) {
            Ok(v) => Ok(v),
            Err(TemplateError::NoReturnValue) if opts.allow_empty_return => Ok(Value::Null),
            Err(e) if opts.safe => {
                if !matches!(e, TemplateError::InvalidTemplate(_)) {
                    warn!(template = %value, error = %e, "template evaluation failed");
                }
                Ok(value.clone())
            }
            Err(e) => Err(e),
        }
    }

    /// Strictly evaluate `value` and deserialize the result into `T`.
    pub fn evaluate_as<T: DeserializeOwned>(&self, ctx: &TemplateContext, value: &Value) -> Result<T> {
        let out = self.evaluate_strict(ctx, value)?;
        serde_json::from_value(out).map_err(|e| TemplateError::Conversion(e.to_string()))
    }

    /// Evaluate a deprecated `badge.template` expression.
    ///
    /// The raw string is an expression over `states` only, without delimiters
    /// or `return`. Any failure counts as `false`.
    pub fn evaluate_legacy_badge(&self, ctx: &TemplateContext, expr: &str) -> bool {
        let expr = expr.trim();
        let key = body_key(&format!("{}\u{0}{}", LEGACY_BADGE_FN, expr));
        let result = self
            .cache
            .get_or_compile(key, || {
                let src = format!(
                    "fn {}(states) {{\nreturn {}\n}}",
                    LEGACY_BADGE_FN,
                    dialect::normalize(expr)
                );
                self.compile(&src)
            })
            .and_then(|ast| {
                self.engine
                    .call_fn::<Dynamic>(&mut Scope::new(), &ast, LEGACY_BADGE_FN, (ctx.states(),))
            })
            .and_then(|d| from_dynamic::<Value>(&d));
        match result {
            Ok(v) => crate::is_truthy(&v),
            Err(e) => {
                warn!(expr, error = %e, "legacy badge expression failed");
                false
            }
        }
    }

    fn evaluate_strict(&self, ctx: &TemplateContext, value: &Value) -> Result<Value> {
        if !is_template(value) {
            return Err(TemplateError::InvalidTemplate(value.to_string()));
        }
        let raw = value.as_str().unwrap_or_default();
        let body = clean_template(raw).ok_or_else(|| TemplateError::CleanFailed(raw.to_string()))?;

        let ast = self.compiled(&body)?;
        let out = self
            .engine
            .call_fn::<Dynamic>(&mut Scope::new(), &ast, TEMPLATE_FN, ctx.args())?;
        if out.is_unit() {
            return Err(TemplateError::NoReturnValue);
        }
        trace!(body = %body, result = %out, "template evaluated");
        from_dynamic::<Value>(&out).map_err(|e| TemplateError::Conversion(e.to_string()))
    }

    /// Compiled function for a cleaned body, from cache when possible.
    fn compiled(&self, body: &str) -> Result<Arc<AST>> {
        let key = body_key(body);
        let ast = self.cache.get_or_compile(key, || {
            debug!(key, "compiling template");
            self.compile(&wrap_body(body))
        })?;
        Ok(ast)
    }

    fn compile(&self, src: &str) -> std::result::Result<AST, Box<EvalAltResult>> {
        self.engine.compile(src).map_err(Into::into)
    }
}

/// Rhai source for a cleaned body.
///
/// The body runs as an inner block whose value is discarded, so only an
/// explicit `return` produces a result.
fn wrap_body(body: &str) -> String {
    format!(
        "fn {}(states, user, hass, navbar) {{\n{{\n{}\n}}\n()\n}}",
        TEMPLATE_FN,
        dialect::normalize(body)
    )
}

fn configure_engine(engine: &mut Engine) {
    engine.on_print(|s| info!(target: "template::rhai", "{}", s));
    engine.on_debug(|s, src, pos| {
        debug!(target: "template::rhai", "{} @ {:?}:{:?}", s, src, pos);
    });

    // Sandbox limits.
    engine.set_max_operations(200_000);
    engine.set_max_call_levels(64);
    engine.set_max_expr_depths(128, 64);
}
