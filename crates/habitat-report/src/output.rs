//! Output file naming.

use std::path::{Path, PathBuf};

use habitat_catalog::ReportSpec;
use habitat_model::ReportContext;

/// Extension of every generated report.
pub const OUTPUT_EXTENSION: &str = "xlsx";

/// File name for a run: `{region}` and `{date}` (as `dd-mm-yyyy`)
/// substituted into the report's template, with `.xlsx` appended unless
/// already present.
pub fn output_file_name(spec: &ReportSpec, context: &ReportContext) -> String {
    let region: String = context
        .region()
        .chars()
        .map(|ch| if matches!(ch, '/' | '\\') { '-' } else { ch })
        .collect();
    let date = context.report_date().format("%d-%m-%Y").to_string();
    let name = spec
        .output_filename
        .replace("{region}", &region)
        .replace("{date}", &date);

    let suffix = format!(".{OUTPUT_EXTENSION}");
    if name.to_ascii_lowercase().ends_with(&suffix) {
        name
    } else {
        format!("{name}{suffix}")
    }
}

/// `output_dir` joined with [`output_file_name`].
pub fn output_path(output_dir: &Path, spec: &ReportSpec, context: &ReportContext) -> PathBuf {
    output_dir.join(output_file_name(spec, context))
}
