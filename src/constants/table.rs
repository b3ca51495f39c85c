//! Constant table: last-writer-wins aggregation across headers and rendering
//! of the generated Python module.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use super::coerce::{coerce, ConstantValue};
use super::extract::{PatternExtractor, RawConstant, RecognizerKind};

/// First line of every generated artifact.
pub const GENERATED_HEADER: &str = "# automatically-generated by ferry -- DO NOT EDIT";

/// A header file read into memory.
#[derive(Debug, Clone)]
pub struct HeaderSource {
    pub path: PathBuf,
    pub text: String,
}

impl HeaderSource {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        HeaderSource {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Read a header from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read header: {}", path.display()))?;
        Ok(HeaderSource::new(path, text))
    }

    /// Read every header up front, failing on the first one that can't be read.
    pub fn read_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Self>> {
        paths.iter().map(|p| HeaderSource::read(p.as_ref())).collect()
    }
}

/// A coerced constant and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedConstant {
    pub name: String,
    pub value: ConstantValue,
    pub kind: RecognizerKind,
    pub source: PathBuf,
}

/// Deduplicated constants keyed by their full (prefixed) name.
#[derive(Debug, Clone)]
pub struct ConstantTable {
    prefix: String,
    entries: BTreeMap<String, TypedConstant>,
}

impl ConstantTable {
    /// Create an empty table for names carrying `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        ConstantTable {
            prefix: prefix.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Build a table from headers in the given order.
    ///
    /// Within a header, matches are taken recognizer by recognizer; a later
    /// match for an existing name replaces the earlier one.
    pub fn build(extractor: &PatternExtractor, headers: &[HeaderSource]) -> Self {
        let mut table = ConstantTable::new(extractor.prefix());

        for header in headers {
            let found = extractor.extract(&header.text);
            tracing::debug!(
                "{}: {} constant(s) matched",
                header.path.display(),
                found.len()
            );
            for raw in found {
                table.insert(raw, &header.path);
            }
        }

        table
    }

    /// Coerce and insert a raw constant, returning the entry it replaced.
    pub fn insert(&mut self, raw: RawConstant, source: &Path) -> Option<TypedConstant> {
        let constant = TypedConstant {
            value: coerce(&raw.token),
            name: raw.name,
            kind: raw.kind,
            source: source.to_path_buf(),
        };

        let previous = self.entries.insert(constant.name.clone(), constant);
        if let Some(ref prev) = previous {
            tracing::debug!(
                "{} from {} overrides the value from {}",
                prev.name,
                source.display(),
                prev.source.display()
            );
        }
        previous
    }

    /// The required name prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Look up a constant by its full name.
    pub fn get(&self, name: &str) -> Option<&TypedConstant> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate as `(stripped name, constant)` in lexicographic order of the stripped name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedConstant)> {
        // Every key starts with the prefix, so full-name order is stripped-name order.
        self.entries.iter().map(|(name, constant)| {
            let short = name.strip_prefix(self.prefix.as_str()).unwrap_or(name);
            (short, constant)
        })
    }

    /// Constants that fell back to the unresolved placeholder.
    pub fn unresolved(&self) -> impl Iterator<Item = &TypedConstant> {
        self.entries.values().filter(|c| c.value.is_unresolved())
    }

    /// Render the generated Python module.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(64 + self.entries.len() * 32);
        out.push_str(GENERATED_HEADER);
        out.push_str("\n\n");
        for (name, constant) in self.iter() {
            out.push_str(name);
            out.push_str(" = ");
            out.push_str(&constant.value.to_string());
            out.push('\n');
        }
        out
    }

    /// JSON view of the table, keyed by stripped name.
    pub fn to_json(&self) -> serde_json::Value {
        let constants: serde_json::Map<String, serde_json::Value> = self
            .iter()
            .map(|(name, constant)| {
                (
                    name.to_string(),
                    serde_json::to_value(constant).unwrap_or(serde_json::Value::Null),
                )
            })
            .collect();

        serde_json::json!({
            "prefix": self.prefix,
            "constants": constants,
        })
    }
}

/// Write the rendered table to `path`, replacing whatever was there.
pub fn write_artifact(table: &ConstantTable, path: &Path) -> Result<()> {
    crate::util::fs::write_string(path, &table.render())
}
