//! Catalogue and reference data compiled into the binary.

/// Report definitions.
pub const REPORTS: &str = include_str!("../data/reports.toml");

/// Programmes: `code, libelle, ordre`.
pub const PROGRAMMES: &str = include_str!("../data/reference/programmes.csv");

/// Sub-programmes with their notification and unit aid:
/// `code, libelle, programme, notification, montant_aide`.
pub const SOUS_PROGRAMMES: &str = include_str!("../data/reference/sous_programmes.csv");

/// Payment tranches: `code, libelle, ordre`.
pub const TRANCHES: &str = include_str!("../data/reference/tranches.csv");

/// Administrative divisions: `wilaya, daira, commune, ordre`.
pub const COMMUNES: &str = include_str!("../data/reference/communes.csv");
