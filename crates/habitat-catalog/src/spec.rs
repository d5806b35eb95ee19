//! Report specification types.

use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

use habitat_model::{ReportPeriod, TargetKind};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Name of the query every report must declare. It yields one row per
/// rendered line.
pub const DIMENSIONS_QUERY: &str = "dimensions";

/// Column every query result is keyed on.
pub const KEY_COLUMN: &str = "cle";

/// Layout family responsible for turning query results into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    /// One row per dimension, one column per bound query value.
    DimensionTable,
    /// Dimensions as rows, tranches as columns.
    TrancheMatrix,
    /// Dimension table plus committed and remaining amounts.
    ProgrammeDetail,
    /// Communes of the region with per-daira subtotals.
    CommuneDistribution,
}

impl GeneratorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DimensionTable => "dimension_table",
            Self::TrancheMatrix => "tranche_matrix",
            Self::ProgrammeDetail => "programme_detail",
            Self::CommuneDistribution => "commune_distribution",
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static lookup tables that can be registered next to the journals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceTable {
    Programmes,
    SousProgrammes,
    Tranches,
    Communes,
}

impl ReferenceTable {
    pub const ALL: [ReferenceTable; 4] = [
        ReferenceTable::Programmes,
        ReferenceTable::SousProgrammes,
        ReferenceTable::Tranches,
        ReferenceTable::Communes,
    ];

    /// Table name used in queries.
    pub fn name(self) -> &'static str {
        match self {
            Self::Programmes => "programmes",
            Self::SousProgrammes => "sous_programmes",
            Self::Tranches => "tranches",
            Self::Communes => "communes",
        }
    }
}

impl fmt::Display for ReferenceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A required input file: a case-insensitive pattern on the file name and
/// the logical table the matching file is loaded as.
#[derive(Debug, Clone)]
pub struct FilePattern {
    regex: Regex,
    display: String,
    table: String,
}

impl FilePattern {
    pub fn new(
        pattern: &str,
        display: impl Into<String>,
        table: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            regex,
            display: display.into(),
            table: table.into(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Human-readable form used in diagnostics, e.g. `Journal_paiements_*.xlsx`.
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn matches_name(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }

    /// Tests the final component of `path`. Paths without a UTF-8 file name
    /// never match.
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(OsStr::to_str)
            .is_some_and(|name| self.matches_name(name))
    }
}

impl PartialEq for FilePattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern() == other.pattern()
            && self.display == other.display
            && self.table == other.table
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamedQuery {
    pub name: String,
    pub sql: String,
}

/// A column of the `dimensions` result shown as a row label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyColumn {
    pub column: String,
    pub header: String,
}

/// A numeric column filled from one query result, looked up by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    /// Identifier other layout sections refer to.
    pub key: String,
    pub header: String,
    pub query: String,
    /// Result column holding the value.
    pub value: String,
}

/// Matrix columns: one per row of `columns_query`, values from `query`
/// looked up by (key, `column_key`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixSpec {
    pub columns_query: String,
    pub label: String,
    pub query: String,
    pub column_key: String,
    pub value: String,
}

/// Derived committed and remaining amounts.
///
/// committed = `decisions` column x `unit_amount` dimension column;
/// remaining = committed - `paid` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommitmentSpec {
    pub decisions: String,
    pub unit_amount: String,
    pub paid: String,
    pub committed_header: String,
    pub remaining_header: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Layout {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub keys: Vec<KeyColumn>,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub matrix: Option<MatrixSpec>,
    #[serde(default)]
    pub commitment: Option<CommitmentSpec>,
    /// Dimension column to subtotal on.
    #[serde(default)]
    pub group_by: Option<String>,
}

impl Layout {
    pub fn column(&self, key: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.key == key)
    }
}

/// Declarative definition of one report type.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSpec {
    pub name: String,
    pub display_name: String,
    pub category: String,
    pub period: ReportPeriod,
    pub target: Option<TargetKind>,
    pub generator: GeneratorKind,
    /// File name template with `{region}` and `{date}` placeholders.
    pub output_filename: String,
    pub required_files: Vec<FilePattern>,
    /// Queries in execution order.
    pub queries: Vec<NamedQuery>,
    pub reference_tables: Vec<ReferenceTable>,
    pub layout: Layout,
}

impl ReportSpec {
    pub fn query(&self, name: &str) -> Option<&NamedQuery> {
        self.queries.iter().find(|query| query.name == name)
    }

    /// Logical table names of the required files, in declaration order.
    pub fn table_names(&self) -> Vec<&str> {
        self.required_files
            .iter()
            .map(FilePattern::table)
            .collect()
    }
}
