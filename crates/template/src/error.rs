use rhai::EvalAltResult;
use thiserror::Error;

/// Errors produced while evaluating a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The value is not delimited by `[[[` and `]]]`.
    #[error("value is not a template: {0}")]
    InvalidTemplate(String),

    /// The template body could not be extracted.
    #[error("could not extract template body from {0}")]
    CleanFailed(String),

    /// Compiling or running the template failed.
    #[error("template evaluation failed: {0}")]
    Evaluation(#[from] Box<EvalAltResult>),

    /// The template ran to completion without an explicit `return`.
    #[error("template did not return a value")]
    NoReturnValue,

    /// The state snapshot could not be exposed to scripts.
    #[error("invalid template context: {0}")]
    Context(String),

    /// The template result does not have the requested shape.
    #[error("template result has unexpected shape: {0}")]
    Conversion(String),
}

/// Convenience alias for template results.
pub type Result<T> = std::result::Result<T, TemplateError>;
