// Expression pipeline: normalize -> tokenize -> parse -> evaluate -> format.
// The public entry point is `evaluate_expression`; the submodules are exposed
// for callers that want to inspect the AST (e.g. tests, tooling).

pub mod eval;
pub mod format;
pub mod parser;

pub use eval::AngleUnit;
pub use parser::{parse, Expr, Op};

use std::fmt;

/// The single public evaluation failure.
///
/// Every parse or runtime problem (unknown identifier, malformed syntax,
/// NaN result) collapses to this one error; callers display it as
/// "Invalid Expression" and nothing else. The underlying detail is kept
/// for diagnostics but never shown to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError {
    detail: String,
}

impl EvalError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }

    /// Internal parse/eval detail, for logging only.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid Expression")
    }
}

impl std::error::Error for EvalError {}

/// Evaluate a typed arithmetic expression to a formatted numeric string.
///
/// Empty (or whitespace-only) input evaluates to the empty string and is
/// not an error. A NaN result is an error; infinities format as
/// "Infinity" / "-Infinity".
pub fn evaluate_expression(input: &str, angle: AngleUnit) -> Result<String, EvalError> {
    if input.trim().is_empty() {
        return Ok(String::new());
    }

    let normalized = parser::normalize(input);
    let expr = parser::parse(&normalized).map_err(EvalError::new)?;
    let value = eval::evaluate(&expr, angle).map_err(EvalError::new)?;

    if value.is_nan() {
        return Err(EvalError::new("result is NaN"));
    }

    Ok(format::format_result(value))
}
