//! Static reference data: programmes, sub-programmes, tranches and the
//! administrative divisions.
//!
//! Loaded from embedded CSV, resolved into report targets, and turned into
//! frames the query engine joins against.

use std::io::Cursor;

use habitat_common::fold_label;
use habitat_model::TargetDimension;
use polars::prelude::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::embedded;
use crate::error::ReferenceError;
use crate::spec::ReferenceTable;

type Result<T> = std::result::Result<T, ReferenceError>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Programme {
    pub code: String,
    pub libelle: String,
    pub ordre: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SousProgramme {
    pub code: String,
    pub libelle: String,
    pub programme: String,
    pub notification: String,
    pub montant_aide: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tranche {
    pub code: String,
    pub libelle: String,
    pub ordre: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Commune {
    pub wilaya: String,
    pub daira: String,
    pub commune: String,
    pub ordre: i64,
}

/// Read-only lookup tables shared by every generation run.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    programmes: Vec<Programme>,
    sous_programmes: Vec<SousProgramme>,
    tranches: Vec<Tranche>,
    communes: Vec<Commune>,
}

impl ReferenceData {
    /// Loads the reference tables compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_csv(
            embedded::PROGRAMMES,
            embedded::SOUS_PROGRAMMES,
            embedded::TRANCHES,
            embedded::COMMUNES,
        )
    }

    /// Parses the four reference tables from CSV text.
    pub fn from_csv(
        programmes: &str,
        sous_programmes: &str,
        tranches: &str,
        communes: &str,
    ) -> Result<Self> {
        let data = Self {
            programmes: read_rows("programmes", programmes)?,
            sous_programmes: read_rows("sous_programmes", sous_programmes)?,
            tranches: read_rows("tranches", tranches)?,
            communes: read_rows("communes", communes)?,
        };
        for sous_programme in &data.sous_programmes {
            if !data
                .programmes
                .iter()
                .any(|p| p.code == sous_programme.programme)
            {
                return Err(ReferenceError::DanglingProgramme {
                    code: sous_programme.code.clone(),
                    programme: sous_programme.programme.clone(),
                });
            }
        }
        Ok(data)
    }

    pub fn programmes(&self) -> &[Programme] {
        &self.programmes
    }

    pub fn sous_programmes(&self) -> &[SousProgramme] {
        &self.sous_programmes
    }

    pub fn tranches(&self) -> &[Tranche] {
        &self.tranches
    }

    pub fn communes(&self) -> &[Commune] {
        &self.communes
    }

    /// Distinct regions (wilayas) in first-seen order.
    pub fn regions(&self) -> Vec<&str> {
        let mut regions: Vec<&str> = Vec::new();
        for commune in &self.communes {
            if !regions.contains(&commune.wilaya.as_str()) {
                regions.push(&commune.wilaya);
            }
        }
        regions
    }

    /// Communes of a region, in reference order. Region names compare
    /// ignoring case, accents and spacing.
    pub fn communes_of(&self, region: &str) -> Vec<&Commune> {
        let wanted = fold_label(region);
        let mut communes: Vec<&Commune> = self
            .communes
            .iter()
            .filter(|commune| fold_label(&commune.wilaya) == wanted)
            .collect();
        communes.sort_by_key(|commune| commune.ordre);
        communes
    }

    pub fn resolve_programme(&self, code: &str) -> Result<TargetDimension> {
        let programme = self
            .programmes
            .iter()
            .find(|p| p.code.eq_ignore_ascii_case(code.trim()))
            .ok_or_else(|| ReferenceError::UnknownProgramme {
                code: code.to_string(),
            })?;
        Ok(TargetDimension::Programme {
            code: programme.code.clone(),
            label: programme.libelle.clone(),
        })
    }

    pub fn resolve_subprogram(&self, code: &str) -> Result<TargetDimension> {
        let sous_programme = self
            .sous_programmes
            .iter()
            .find(|sp| sp.code.eq_ignore_ascii_case(code.trim()))
            .ok_or_else(|| ReferenceError::UnknownSubprogram {
                code: code.to_string(),
            })?;
        Ok(TargetDimension::Subprogram {
            code: sous_programme.code.clone(),
            label: sous_programme.libelle.clone(),
            programme: sous_programme.programme.clone(),
            aid_amount: sous_programme.montant_aide,
        })
    }

    pub fn resolve_notification(&self, reference: &str) -> Result<TargetDimension> {
        let sous_programme = self
            .sous_programmes
            .iter()
            .find(|sp| sp.notification.eq_ignore_ascii_case(reference.trim()))
            .ok_or_else(|| ReferenceError::UnknownNotification {
                reference: reference.to_string(),
            })?;
        Ok(TargetDimension::Notification {
            reference: sous_programme.notification.clone(),
            subprogram: sous_programme.code.clone(),
            programme: sous_programme.programme.clone(),
            aid_amount: sous_programme.montant_aide,
        })
    }

    /// Builds the frame registered for `table`.
    ///
    /// `communes` is restricted to `region`; an unknown region is an error.
    pub fn frame(&self, table: ReferenceTable, region: &str) -> Result<DataFrame> {
        let name = table.name();
        let frame_error = |source| ReferenceError::Frame {
            table: name,
            source,
        };
        let columns: Vec<Column> = match table {
            ReferenceTable::Programmes => vec![
                text_column("code", self.programmes.iter().map(|p| p.code.as_str())),
                text_column("libelle", self.programmes.iter().map(|p| p.libelle.as_str())),
                int_column("ordre", self.programmes.iter().map(|p| p.ordre)),
            ],
            ReferenceTable::SousProgrammes => {
                let rows = &self.sous_programmes;
                vec![
                    text_column("code", rows.iter().map(|sp| sp.code.as_str())),
                    text_column("libelle", rows.iter().map(|sp| sp.libelle.as_str())),
                    text_column("programme", rows.iter().map(|sp| sp.programme.as_str())),
                    text_column(
                        "notification",
                        rows.iter().map(|sp| sp.notification.as_str()),
                    ),
                    Series::new(
                        "montant_aide".into(),
                        rows.iter().map(|sp| sp.montant_aide).collect::<Vec<f64>>(),
                    )
                    .into_column(),
                ]
            }
            ReferenceTable::Tranches => vec![
                text_column("code", self.tranches.iter().map(|t| t.code.as_str())),
                text_column("libelle", self.tranches.iter().map(|t| t.libelle.as_str())),
                int_column("ordre", self.tranches.iter().map(|t| t.ordre)),
            ],
            ReferenceTable::Communes => {
                let rows = self.communes_of(region);
                if rows.is_empty() {
                    return Err(ReferenceError::UnknownRegion {
                        region: region.to_string(),
                        known: self.regions().into_iter().map(String::from).collect(),
                    });
                }
                vec![
                    text_column("wilaya", rows.iter().map(|c| c.wilaya.as_str())),
                    text_column("daira", rows.iter().map(|c| c.daira.as_str())),
                    text_column("commune", rows.iter().map(|c| c.commune.as_str())),
                    int_column("ordre", rows.iter().map(|c| c.ordre)),
                ]
            }
        };
        DataFrame::new(columns).map_err(frame_error)
    }
}

fn read_rows<T: DeserializeOwned>(table: &'static str, content: &str) -> Result<Vec<T>> {
    let cursor = Cursor::new(content.as_bytes());
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(cursor);
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|source| ReferenceError::Csv { table, source })
}

fn text_column<'a>(name: &str, values: impl Iterator<Item = &'a str>) -> Column {
    Series::new(name.into(), values.collect::<Vec<&str>>()).into_column()
}

fn int_column(name: &str, values: impl Iterator<Item = i64>) -> Column {
    Series::new(name.into(), values.collect::<Vec<i64>>()).into_column()
}
