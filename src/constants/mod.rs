//! Constant extraction from C headers.
//!
//! Headers are scanned by a [`PatternExtractor`], each captured token is
//! coerced into a [`ConstantValue`], and the results are collected into a
//! [`ConstantTable`] that renders to a generated Python module.

pub mod coerce;
pub mod extract;
pub mod literal;
pub mod table;

pub use coerce::{coerce, ConstantValue};
pub use extract::{PatternExtractor, RawConstant, RecognizerKind};
pub use literal::{Literal, LiteralError};
pub use table::{write_artifact, ConstantTable, HeaderSource, TypedConstant, GENERATED_HEADER};
