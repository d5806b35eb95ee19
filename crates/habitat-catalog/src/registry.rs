//! Report catalogue.
//!
//! The catalogue is an explicitly constructed value: callers build it once
//! (usually with [`ReportCatalog::builtin`]) and pass it to whatever needs
//! it. It has no registration path after construction, so shared references
//! can be read from any number of threads.

use std::collections::{BTreeMap, BTreeSet};

use habitat_model::{ReportPeriod, TargetKind};
use habitat_query::{Token, placeholders};
use serde::Deserialize;
use tracing::debug;

use crate::embedded;
use crate::error::{CatalogError, Result};
use crate::spec::{
    DIMENSIONS_QUERY, FilePattern, GeneratorKind, Layout, NamedQuery, ReferenceTable, ReportSpec,
};

#[derive(Debug, Clone, Default)]
pub struct ReportCatalog {
    reports: BTreeMap<String, ReportSpec>,
}

impl ReportCatalog {
    /// Parses and checks the catalogue compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(embedded::REPORTS)
    }

    /// Parses a catalogue in the embedded TOML format and checks it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawCatalog =
            toml::from_str(content).map_err(|source| CatalogError::Toml { source })?;
        let specs = raw
            .report
            .into_iter()
            .map(RawReport::into_spec)
            .collect::<Result<Vec<_>>>()?;
        Self::from_specs(specs)
    }

    /// Builds a catalogue from already constructed specifications.
    pub fn from_specs(specs: impl IntoIterator<Item = ReportSpec>) -> Result<Self> {
        let mut reports = BTreeMap::new();
        for spec in specs {
            check_report(&spec)?;
            if reports.contains_key(&spec.name) {
                return Err(CatalogError::DuplicateReport { name: spec.name });
            }
            reports.insert(spec.name.clone(), spec);
        }
        debug!(reports = reports.len(), "report catalogue loaded");
        Ok(Self { reports })
    }

    /// Looks up a report by name.
    ///
    /// The error lists every known report name.
    pub fn get(&self, name: &str) -> Result<&ReportSpec> {
        self.reports
            .get(name)
            .ok_or_else(|| CatalogError::UnknownReport {
                name: name.to_string(),
                known: self.reports.keys().cloned().collect(),
            })
    }

    pub fn has(&self, name: &str) -> bool {
        self.reports.contains_key(name)
    }

    /// Returns a copy of every specification keyed by name.
    pub fn all(&self) -> BTreeMap<String, ReportSpec> {
        self.reports.clone()
    }

    pub fn names(&self) -> Vec<&str> {
        self.reports.keys().map(String::as_str).collect()
    }

    /// Specifications sorted by category, then name.
    pub fn list(&self) -> Vec<&ReportSpec> {
        let mut specs: Vec<&ReportSpec> = self.reports.values().collect();
        specs.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        specs
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

// =============================================================================
// TOML row types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCatalog {
    #[serde(default)]
    report: Vec<RawReport>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReport {
    name: String,
    display_name: String,
    category: String,
    period: ReportPeriod,
    #[serde(default)]
    target: Option<TargetKind>,
    generator: GeneratorKind,
    output_filename: String,
    #[serde(default)]
    reference_tables: Vec<ReferenceTable>,
    #[serde(default)]
    required_files: Vec<RawFilePattern>,
    #[serde(default)]
    queries: Vec<NamedQuery>,
    #[serde(default)]
    layout: Layout,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFilePattern {
    pattern: String,
    display: String,
    table: String,
}

impl RawReport {
    fn into_spec(self) -> Result<ReportSpec> {
        let required_files = self
            .required_files
            .into_iter()
            .map(|raw| {
                FilePattern::new(&raw.pattern, raw.display, raw.table).map_err(|source| {
                    CatalogError::InvalidPattern {
                        report: self.name.clone(),
                        pattern: raw.pattern.clone(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ReportSpec {
            name: self.name,
            display_name: self.display_name,
            category: self.category,
            period: self.period,
            target: self.target,
            generator: self.generator,
            output_filename: self.output_filename,
            required_files,
            queries: self.queries,
            reference_tables: self.reference_tables,
            layout: self.layout,
        })
    }
}

// =============================================================================
// Self-check
// =============================================================================

fn check_report(spec: &ReportSpec) -> Result<()> {
    let report = || spec.name.clone();

    if spec.required_files.is_empty() {
        return Err(CatalogError::NoRequiredFiles { report: report() });
    }
    let mut tables = BTreeSet::new();
    for pattern in &spec.required_files {
        if !tables.insert(pattern.table()) {
            return Err(CatalogError::DuplicateTable {
                report: report(),
                table: pattern.table().to_string(),
            });
        }
        // loaded journals and reference tables share one engine namespace
        if spec
            .reference_tables
            .iter()
            .any(|reference| reference.name() == pattern.table())
        {
            return Err(CatalogError::ReferenceTableClash {
                report: report(),
                table: pattern.table().to_string(),
            });
        }
    }

    let mut queries = BTreeSet::new();
    for query in &spec.queries {
        if !queries.insert(query.name.as_str()) {
            return Err(CatalogError::DuplicateQuery {
                report: report(),
                query: query.name.clone(),
            });
        }
        check_placeholders(spec, query)?;
    }
    if !queries.contains(DIMENSIONS_QUERY) {
        return Err(CatalogError::MissingQuery {
            report: report(),
            query: DIMENSIONS_QUERY.to_string(),
        });
    }

    check_layout(spec, &queries)
}

fn check_placeholders(spec: &ReportSpec, query: &NamedQuery) -> Result<()> {
    for placeholder in placeholders(&query.sql) {
        let token = placeholder
            .token()
            .filter(|token| placeholder.width.is_none() || token.is_numeric())
            .ok_or_else(|| CatalogError::UnknownPlaceholder {
                report: spec.name.clone(),
                query: query.name.clone(),
                placeholder: placeholder.raw.clone(),
            })?;
        if !token_available(token, spec.period, spec.target) {
            return Err(CatalogError::UnavailablePlaceholder {
                report: spec.name.clone(),
                query: query.name.clone(),
                placeholder: placeholder.raw,
                period: match spec.target {
                    Some(target) => format!("{} {target}-scoped", spec.period),
                    None => spec.period.to_string(),
                },
            });
        }
    }
    Ok(())
}

/// Whether a context accepted for this period and target always carries a
/// value for `token`.
fn token_available(token: Token, period: ReportPeriod, target: Option<TargetKind>) -> bool {
    match token {
        Token::Year | Token::Region => true,
        Token::Month => period == ReportPeriod::Monthly,
        Token::Semester | Token::SemesterStart | Token::SemesterEnd => {
            period == ReportPeriod::Semester
        }
        Token::Programme => target.is_some(),
        Token::Subprogram | Token::AidAmount => matches!(
            target,
            Some(TargetKind::Subprogram | TargetKind::Notification)
        ),
        Token::Notification => target == Some(TargetKind::Notification),
    }
}

fn check_layout(spec: &ReportSpec, queries: &BTreeSet<&str>) -> Result<()> {
    let layout = &spec.layout;
    let incomplete = |requirement: &'static str| CatalogError::IncompleteLayout {
        report: spec.name.clone(),
        generator: spec.generator.to_string(),
        requirement,
    };
    let unbound = |column: &str, query: &str| CatalogError::UnboundColumn {
        report: spec.name.clone(),
        column: column.to_string(),
        query: query.to_string(),
    };

    if layout.keys.is_empty() {
        return Err(incomplete("at least one key column"));
    }
    for column in &layout.columns {
        if !queries.contains(column.query.as_str()) {
            return Err(unbound(&column.key, &column.query));
        }
    }

    if let Some(matrix) = &layout.matrix {
        for query in [&matrix.columns_query, &matrix.query] {
            if !queries.contains(query.as_str()) {
                return Err(unbound("matrix", query));
            }
        }
    }
    if let Some(commitment) = &layout.commitment {
        for key in [&commitment.decisions, &commitment.paid] {
            if layout.column(key).is_none() {
                return Err(incomplete("commitment inputs bound to layout columns"));
            }
        }
    }

    match spec.generator {
        GeneratorKind::TrancheMatrix if layout.matrix.is_none() => {
            Err(incomplete("a [layout.matrix] section"))
        }
        GeneratorKind::ProgrammeDetail if layout.commitment.is_none() => {
            Err(incomplete("a [layout.commitment] section"))
        }
        GeneratorKind::DimensionTable
        | GeneratorKind::TrancheMatrix
        | GeneratorKind::ProgrammeDetail
        | GeneratorKind::CommuneDistribution => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[[report]]
name = "essai"
display_name = "Essai"
category = "Tests"
period = "monthly"
generator = "dimension_table"
output_filename = "Essai_{region}_{date}.xlsx"

[[report.required_files]]
pattern = '^journal_paiements_.*$'
display = "Journal_paiements_*"
table = "paiements"

[[report.queries]]
name = "dimensions"
sql = "SELECT code AS cle, libelle FROM programmes"

[[report.queries]]
name = "mois"
sql = "SELECT 1 AS cle, 2 AS v FROM paiements WHERE d LIKE '%/{month:02}/{year}'"

[report.layout]
[[report.layout.keys]]
column = "libelle"
header = "Programme"

[[report.layout.columns]]
key = "v"
header = "Valeur"
query = "mois"
value = "v"
"#;

    #[test]
    fn minimal_catalogue_parses() {
        let catalog = ReportCatalog::from_toml_str(MINIMAL).unwrap();
        let spec = catalog.get("essai").unwrap();
        assert_eq!(spec.period, ReportPeriod::Monthly);
        assert_eq!(spec.table_names(), vec!["paiements"]);
        assert_eq!(spec.queries[1].name, "mois");
    }

    #[test]
    fn rejects_unknown_placeholder() {
        let content = MINIMAL.replace("{month:02}", "{mois}");
        let error = ReportCatalog::from_toml_str(&content).unwrap_err();
        assert!(matches!(
            error,
            CatalogError::UnknownPlaceholder { ref placeholder, .. } if placeholder == "{mois}"
        ));
    }

    #[test]
    fn rejects_placeholder_the_period_cannot_fill() {
        let content = MINIMAL.replace("period = \"monthly\"", "period = \"annual\"");
        let error = ReportCatalog::from_toml_str(&content).unwrap_err();
        assert!(matches!(error, CatalogError::UnavailablePlaceholder { .. }));
    }

    #[test]
    fn rejects_missing_dimensions_query() {
        let content = MINIMAL.replace("name = \"dimensions\"", "name = \"lignes\"");
        let error = ReportCatalog::from_toml_str(&content).unwrap_err();
        assert!(matches!(error, CatalogError::MissingQuery { .. }));
    }

    #[test]
    fn rejects_unbound_layout_column() {
        let content = MINIMAL.replace("query = \"mois\"", "query = \"annee\"");
        let error = ReportCatalog::from_toml_str(&content).unwrap_err();
        assert!(matches!(
            error,
            CatalogError::UnboundColumn { ref query, .. } if query == "annee"
        ));
    }

    #[test]
    fn rejects_invalid_pattern() {
        let content = MINIMAL.replace("'^journal_paiements_.*$'", "'^journal_(paiements'");
        let error = ReportCatalog::from_toml_str(&content).unwrap_err();
        assert!(matches!(error, CatalogError::InvalidPattern { .. }));
    }

    #[test]
    fn rejects_duplicate_report() {
        let content = format!("{MINIMAL}\n{}", MINIMAL.trim_start());
        let error = ReportCatalog::from_toml_str(&content).unwrap_err();
        assert!(matches!(error, CatalogError::DuplicateReport { .. }));
    }

    #[test]
    fn rejects_journal_named_like_reference_table() {
        let content = MINIMAL
            .replace("table = \"paiements\"", "table = \"programmes\"")
            .replace(
                "output_filename = \"Essai_{region}_{date}.xlsx\"",
                "output_filename = \"Essai_{region}_{date}.xlsx\"\nreference_tables = [\"programmes\"]",
            );
        let error = ReportCatalog::from_toml_str(&content).unwrap_err();
        assert!(matches!(
            error,
            CatalogError::ReferenceTableClash { ref table, .. } if table == "programmes"
        ));
    }

    #[test]
    fn journal_may_reuse_an_unregistered_reference_name() {
        let content = MINIMAL.replace("table = \"paiements\"", "table = \"communes\"");
        let catalog = ReportCatalog::from_toml_str(&content).unwrap();
        assert_eq!(catalog.get("essai").unwrap().table_names(), vec!["communes"]);
    }

    #[test]
    fn tranche_matrix_requires_matrix_section() {
        let content = MINIMAL.replace("dimension_table", "tranche_matrix");
        let error = ReportCatalog::from_toml_str(&content).unwrap_err();
        assert!(matches!(error, CatalogError::IncompleteLayout { .. }));
    }
}
