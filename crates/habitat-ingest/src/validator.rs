//! Required-file validation.
//!
//! Matches candidate paths against a report's required file patterns and
//! yields the logical table name -> path assignment used to load inputs.

use std::collections::BTreeMap;
use std::path::PathBuf;

use habitat_catalog::{ReportCatalog, ReportSpec};
use tracing::debug;

use crate::error::{MissingFile, ValidationError};

/// Logical table name -> input file.
pub type FileAssignment = BTreeMap<String, PathBuf>;

/// Resolves `report` in the catalogue and validates `candidates` against it.
pub fn validate_files(
    catalog: &ReportCatalog,
    report: &str,
    candidates: &[PathBuf],
) -> Result<FileAssignment, ValidationError> {
    let spec = catalog.get(report)?;
    validate_against(spec, candidates)
}

/// Validates `candidates` against a report specification.
///
/// Every candidate must exist (the first missing one fails immediately).
/// Each file is assigned to the first pattern it matches, in declaration
/// order. The result is either a mapping covering exactly the required
/// tables or an error; missing inputs are reported before unmatched files,
/// and both list every offender.
pub fn validate_against(
    spec: &ReportSpec,
    candidates: &[PathBuf],
) -> Result<FileAssignment, ValidationError> {
    if let Some(path) = candidates.iter().find(|path| !path.is_file()) {
        return Err(ValidationError::FileNotFound { path: path.clone() });
    }

    let mut matched: BTreeMap<&str, Vec<&PathBuf>> = BTreeMap::new();
    let mut unmatched: Vec<PathBuf> = Vec::new();
    for path in candidates {
        match spec.required_files.iter().find(|pattern| pattern.matches(path)) {
            Some(pattern) => {
                debug!(path = %path.display(), table = pattern.table(), "input file matched");
                let files = matched.entry(pattern.table()).or_default();
                if !files.contains(&path) {
                    files.push(path);
                }
            }
            None => {
                debug!(path = %path.display(), "input file matches no pattern");
                if !unmatched.contains(path) {
                    unmatched.push(path.clone());
                }
            }
        }
    }

    let missing: Vec<MissingFile> = spec
        .required_files
        .iter()
        .filter(|pattern| !matched.contains_key(pattern.table()))
        .map(|pattern| MissingFile {
            display: pattern.display().to_string(),
            table: pattern.table().to_string(),
        })
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFiles {
            report: spec.name.clone(),
            missing,
        });
    }

    if !unmatched.is_empty() {
        unmatched.sort();
        return Err(ValidationError::UnmatchedFiles {
            report: spec.name.clone(),
            unmatched,
        });
    }

    let mut assignment = FileAssignment::new();
    for pattern in &spec.required_files {
        let files = matched.remove(pattern.table()).unwrap_or_default();
        match files.as_slice() {
            [single] => {
                assignment.insert(pattern.table().to_string(), (*single).clone());
            }
            _ => {
                let mut files: Vec<PathBuf> = files.into_iter().cloned().collect();
                files.sort();
                return Err(ValidationError::AmbiguousFiles {
                    display: pattern.display().to_string(),
                    table: pattern.table().to_string(),
                    files,
                });
            }
        }
    }
    debug!(report = %spec.name, files = assignment.len(), "input files validated");
    Ok(assignment)
}
