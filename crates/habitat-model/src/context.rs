//! Report context: the region, period and optional target of one run.
//!
//! A [`ReportContext`] can only be obtained through [`ReportContextBuilder`],
//! which rejects out-of-range or future values at construction time. Once
//! built the context is immutable.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::error::{ContextError, Result};
use crate::period::{ReportPeriod, month_name, semester_months};
use crate::target::{TargetDimension, TargetKind};

const MIN_YEAR: i32 = 2000;
const MAX_YEAR: i32 = 2100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportContext {
    region: String,
    year: i32,
    month: Option<u32>,
    semester: Option<u8>,
    report_date: NaiveDate,
    target: Option<TargetDimension>,
}

impl ReportContext {
    pub fn builder(region: impl Into<String>, year: i32) -> ReportContextBuilder {
        ReportContextBuilder {
            region: region.into(),
            year,
            month: None,
            semester: None,
            report_date: None,
            target: None,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn semester(&self) -> Option<u8> {
        self.semester
    }

    /// First and last month of the semester, when one is set.
    pub fn semester_bounds(&self) -> Option<(u32, u32)> {
        self.semester.map(semester_months)
    }

    pub fn report_date(&self) -> NaiveDate {
        self.report_date
    }

    pub fn target(&self) -> Option<&TargetDimension> {
        self.target.as_ref()
    }

    /// Period label used in document headers, e.g. `Mars 2024`.
    pub fn period_label(&self) -> String {
        if let Some(name) = self.month.and_then(month_name) {
            return format!("{name} {}", self.year);
        }
        match self.semester {
            Some(1) => format!("1er semestre {}", self.year),
            Some(_) => format!("2ème semestre {}", self.year),
            None => format!("Année {}", self.year),
        }
    }

    /// Checks that this context carries what a report of the given period
    /// and target kind needs.
    pub fn check_scope(&self, period: ReportPeriod, target: Option<TargetKind>) -> Result<()> {
        match period {
            ReportPeriod::Monthly if self.month.is_none() => {
                return Err(ContextError::MissingPeriod {
                    period,
                    requirement: "a month",
                });
            }
            ReportPeriod::Semester if self.semester.is_none() => {
                return Err(ContextError::MissingPeriod {
                    period,
                    requirement: "a semester",
                });
            }
            _ => {}
        }
        match (target, self.target.as_ref()) {
            (Some(expected), Some(actual)) if actual.kind() != expected => {
                Err(ContextError::TargetMismatch {
                    expected,
                    found: actual.kind().to_string(),
                })
            }
            (Some(expected), None) => Err(ContextError::TargetMismatch {
                expected,
                found: "none".to_string(),
            }),
            (None, Some(actual)) => Err(ContextError::UnexpectedTarget {
                found: actual.kind(),
            }),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportContextBuilder {
    region: String,
    year: i32,
    month: Option<u32>,
    semester: Option<u8>,
    report_date: Option<NaiveDate>,
    target: Option<TargetDimension>,
}

impl ReportContextBuilder {
    #[must_use]
    pub fn month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    #[must_use]
    pub fn semester(mut self, semester: u8) -> Self {
        self.semester = Some(semester);
        self
    }

    /// Date printed on the report and used in the output file name.
    /// Defaults to today.
    #[must_use]
    pub fn report_date(mut self, date: NaiveDate) -> Self {
        self.report_date = Some(date);
        self
    }

    #[must_use]
    pub fn target(mut self, target: TargetDimension) -> Self {
        self.target = Some(target);
        self
    }

    /// Builds the context against the local calendar date.
    pub fn build(self) -> Result<ReportContext> {
        let today = Local::now().date_naive();
        self.build_as_of(today)
    }

    /// Builds the context, treating `today` as the current date.
    pub fn build_as_of(self, today: NaiveDate) -> Result<ReportContext> {
        let region = self.region.trim().to_string();
        if region.is_empty() {
            return Err(ContextError::EmptyRegion);
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(ContextError::YearOutOfRange { year: self.year });
        }
        if let Some(month) = self.month
            && !(1..=12).contains(&month)
        {
            return Err(ContextError::MonthOutOfRange { month });
        }
        if let Some(semester) = self.semester
            && !(1..=2).contains(&semester)
        {
            return Err(ContextError::SemesterOutOfRange { semester });
        }
        if self.month.is_some() && self.semester.is_some() {
            return Err(ContextError::ConflictingPeriod);
        }
        if let Some(target) = &self.target
            && let Some(amount) = target.aid_amount()
            && !(amount.is_finite() && amount > 0.0)
        {
            return Err(ContextError::InvalidAidAmount {
                reference: target.match_value().to_string(),
                amount,
            });
        }

        let report_date = self.report_date.unwrap_or(today);
        if report_date > today {
            return Err(ContextError::FutureReportDate {
                date: report_date,
                today,
            });
        }

        let first_month = self
            .month
            .or_else(|| self.semester.map(|s| semester_months(s).0))
            .unwrap_or(1);
        // Year and month are range-checked above, so the first day exists.
        let start = NaiveDate::from_ymd_opt(self.year, first_month, 1)
            .ok_or(ContextError::YearOutOfRange { year: self.year })?;
        if start > today {
            return Err(ContextError::FuturePeriod { start, today });
        }

        Ok(ReportContext {
            region,
            year: self.year,
            month: self.month,
            semester: self.semester,
            report_date,
            target: self.target,
        })
    }
}
