//! Value coercion: turn a raw header token into the most specific value it represents.

use std::fmt;

use serde::Serialize;

use super::literal::{self, format_float, Literal};

/// Comment appended to constants that could not be resolved to a value.
pub const UNRESOLVED_MARKER: &str = "# TODO";

/// Suffixes marking a C float literal (`1.5f`).
const FLOAT_SUFFIXES: [char; 2] = ['f', 'F'];

/// A coerced constant value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ConstantValue {
    /// Token made only of decimal digits.
    Integer(i64),
    /// Decimal float, with an optional C float suffix stripped.
    Float(f64),
    /// Result of evaluating the token as a restricted literal expression.
    Structured(Literal),
    /// Anything else, kept verbatim for manual review.
    Unresolved(String),
}

impl ConstantValue {
    /// Whether this value needs a human to look at it.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, ConstantValue::Unresolved(_))
    }
}

impl fmt::Display for ConstantValue {
    /// Render as the right-hand side of a Python assignment.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Integer(v) => write!(f, "{}", v),
            ConstantValue::Float(v) => write!(f, "{}", format_float(*v)),
            ConstantValue::Structured(lit) => write!(f, "{}", lit),
            ConstantValue::Unresolved(raw) => {
                write!(f, "'{}'  {}", escape_single_quoted(raw), UNRESOLVED_MARKER)
            }
        }
    }
}

fn escape_single_quoted(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Coerce a raw token, trying integer, float, literal expression, then the
/// unresolved fallback. Never fails.
pub fn coerce(token: &str) -> ConstantValue {
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        return match token.parse::<i64>() {
            Ok(v) => ConstantValue::Integer(v),
            Err(_) => {
                tracing::warn!("integer constant `{}` does not fit in 64 bits", token);
                ConstantValue::Unresolved(token.to_string())
            }
        };
    }

    if let Some(v) = parse_float(token) {
        return ConstantValue::Float(v);
    }

    match literal::evaluate(token) {
        Ok(lit) => ConstantValue::Structured(lit),
        Err(e) => {
            tracing::debug!("`{}` is not a literal: {}", token, e);
            ConstantValue::Unresolved(token.to_string())
        }
    }
}

fn parse_float(token: &str) -> Option<f64> {
    let digits = token.strip_suffix(FLOAT_SUFFIXES).unwrap_or(token);
    // f64's parser also takes `inf`/`nan`; those are names, not numbers, in a header.
    if !digits.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}
