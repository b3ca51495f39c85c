//! Implementation of `ferry generate`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::constants::{write_artifact, ConstantTable, HeaderSource, PatternExtractor};
use crate::core::Workspace;

/// Result of generating the constants module.
#[derive(Debug)]
pub struct GenerateResult {
    /// Where the module was written
    pub output: PathBuf,

    /// Everything that went into it
    pub table: ConstantTable,
}

impl GenerateResult {
    /// Names of constants written with the unresolved marker.
    pub fn unresolved(&self) -> Vec<&str> {
        self.table.unresolved().map(|c| c.name.as_str()).collect()
    }
}

/// Read the workspace's headers and build the constant table.
///
/// Every header is read before any is scanned; an unreadable header aborts
/// the whole extraction.
pub fn extract(ws: &Workspace) -> Result<ConstantTable> {
    let extractor = PatternExtractor::new(ws.prefix())?;

    let paths = ws.header_paths();
    let headers = HeaderSource::read_all(paths.as_slice())?;

    let table = ConstantTable::build(&extractor, &headers);
    tracing::debug!(
        "extracted {} constant(s) from {} header(s)",
        table.len(),
        headers.len()
    );

    Ok(table)
}

/// Extract constants and write the generated module, replacing any previous one.
pub fn generate(ws: &Workspace) -> Result<GenerateResult> {
    let table = extract(ws)?;

    for constant in table.unresolved() {
        tracing::warn!(
            "{} could not be resolved to a value: {}",
            constant.name,
            constant.source.display()
        );
    }

    let output = ws.output_path();
    write_artifact(&table, &output)
        .with_context(|| format!("failed to write constants module for `{}`", ws.manifest().name()))?;

    tracing::info!("wrote {} constant(s) to {}", table.len(), output.display());

    Ok(GenerateResult { output, table })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ConstantValue, GENERATED_HEADER};
    use crate::core::MANIFEST_NAME;
    use crate::test_support::fixtures::ProjectFixture;
    use tempfile::TempDir;

    fn workspace(fixture: ProjectFixture) -> (TempDir, Workspace) {
        let tmp = TempDir::new().unwrap();
        let root = fixture.write_to(tmp.path()).unwrap();
        let ws = Workspace::new(&root.join(MANIFEST_NAME)).unwrap();
        (tmp, ws)
    }

    #[test]
    fn test_generate_writes_sorted_module() {
        let (_tmp, ws) = workspace(ProjectFixture::visky());

        let result = generate(&ws).unwrap();
        let text = std::fs::read_to_string(&result.output).unwrap();

        assert!(text.starts_with(&format!("{}\n\n", GENERATED_HEADER)));
        assert!(text.ends_with('\n'));

        let names: Vec<&str> = text
            .lines()
            .skip(2)
            .map(|l| l.split(" = ").next().unwrap())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.contains(&"DEFAULT_WIDTH"));
        assert!(names.contains(&"MAX_OBJECTS"));
    }

    #[test]
    fn test_later_headers_override_earlier_ones() {
        let (_tmp, ws) = workspace(ProjectFixture::visky());

        let table = extract(&ws).unwrap();

        // Defined in constants.h and redefined in app.h.
        let width = table.get("VKY_DEFAULT_WIDTH").unwrap();
        assert_eq!(width.value, ConstantValue::Integer(1024));
        assert!(width.source.ends_with("include/visky/app.h"));
    }

    #[test]
    fn test_generate_reports_unresolved() {
        let (_tmp, ws) = workspace(ProjectFixture::visky());

        let result = generate(&ws).unwrap();
        assert_eq!(result.unresolved(), vec!["VKY_DEFAULT_BACKEND"]);
    }

    #[test]
    fn test_missing_header_aborts_before_writing() {
        let (_tmp, ws) = workspace(
            ProjectFixture::visky().without_header("include/visky/scene.h"),
        );

        let err = generate(&ws).unwrap_err();
        assert!(format!("{:#}", err).contains("scene.h"));
        assert!(!ws.output_path().exists());
    }

    #[test]
    fn test_generate_is_idempotent() {
        let (_tmp, ws) = workspace(ProjectFixture::visky());

        let first = generate(&ws).unwrap();
        let first = std::fs::read(&first.output).unwrap();
        let second = generate(&ws).unwrap();
        let second = std::fs::read(&second.output).unwrap();

        assert_eq!(first, second);
    }
}
