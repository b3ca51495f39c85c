//! Pattern extractor for prefixed constants in C header text.
//!
//! Three recognizers run over the whole text, in order:
//!
//! 1. Direct assignment: `PREFIX_NAME = token` (enumerators, initialisers)
//! 2. Preprocessor define: `#define PREFIX_NAME token`
//! 3. Wrapped define: `#define PREFIX_NAME MACRO(other, ..., token)`, keeping
//!    only the last macro argument
//!
//! All matches of all recognizers are kept, in recognizer order and then
//! position order.

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Serialize;

/// Which recognizer produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecognizerKind {
    Assignment,
    Define,
    WrappedDefine,
}

impl RecognizerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecognizerKind::Assignment => "assignment",
            RecognizerKind::Define => "define",
            RecognizerKind::WrappedDefine => "wrapped-define",
        }
    }
}

/// A (name, token) pair captured by a single recognizer match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawConstant {
    pub name: String,
    pub token: String,
    pub kind: RecognizerKind,
}

struct Recognizer {
    kind: RecognizerKind,
    regex: Regex,
}

/// Token characters accepted in define values: letters, digits, `. , _ + - / *` and spaces.
const TOKEN_CLASS: &str = r"[*A-Za-z0-9.,_ +\-/]";

/// Extracts prefixed constants from header text.
pub struct PatternExtractor {
    prefix: String,
    recognizers: Vec<Recognizer>,
}

impl PatternExtractor {
    /// Build an extractor recognizing names that start with `prefix`.
    pub fn new(prefix: &str) -> Result<Self> {
        if !is_identifier(prefix) {
            bail!(
                "constant prefix `{}` must be a non-empty C identifier (e.g. `VKY_`)",
                prefix
            );
        }

        let name = format!(r"\b({}[A-Za-z0-9_]+)", regex::escape(prefix));
        let patterns = [
            (
                RecognizerKind::Assignment,
                format!(r"(?m){name}\s+=\s+([^\n,()]+?)[ \t]*(?:(?://|/\*)[^\n]*)?(?:,|\r?$)"),
            ),
            (
                RecognizerKind::Define,
                format!(r"(?m)#define[ \t]+{name}[ \t]+({TOKEN_CLASS}+)(?:(?://|/\*).*)?\r?$"),
            ),
            (
                RecognizerKind::WrappedDefine,
                format!(
                    r"#define[ \t]+{name}[ \t]+[A-Za-z_][A-Za-z0-9_]*[ \t]*\([ \t]*[A-Za-z0-9_]+[ \t]*,({TOKEN_CLASS}+)\)"
                ),
            ),
        ];

        let recognizers = patterns
            .into_iter()
            .map(|(kind, pattern)| {
                let regex = Regex::new(&pattern)
                    .with_context(|| format!("invalid {} pattern", kind.as_str()))?;
                Ok(Recognizer { kind, regex })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PatternExtractor {
            prefix: prefix.to_string(),
            recognizers,
        })
    }

    /// The required name prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Extract every constant in `text`, in discovery order.
    pub fn extract(&self, text: &str) -> Vec<RawConstant> {
        let mut found = Vec::new();

        for recognizer in &self.recognizers {
            for cap in recognizer.regex.captures_iter(text) {
                let name = cap.get(1).map_or("", |m| m.as_str());
                let value = cap.get(2).map_or("", |m| m.as_str());

                let token = match recognizer.kind {
                    RecognizerKind::Assignment => strip_trailing_comment(value),
                    RecognizerKind::Define => strip_trailing_comment(value),
                    RecognizerKind::WrappedDefine => last_argument(value),
                };

                if token.is_empty() {
                    continue;
                }

                found.push(RawConstant {
                    name: name.to_string(),
                    token: token.to_string(),
                    kind: recognizer.kind,
                });
            }
        }

        found
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Drop a trailing `//` or `/*` comment and surrounding whitespace.
fn strip_trailing_comment(value: &str) -> &str {
    let end = [value.find("//"), value.find("/*")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(value.len());
    value[..end].trim()
}

fn last_argument(args: &str) -> &str {
    let args = strip_trailing_comment(args);
    args.rsplit(',').next().unwrap_or(args).trim()
}
