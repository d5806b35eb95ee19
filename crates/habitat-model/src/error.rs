use chrono::NaiveDate;
use thiserror::Error;

use crate::period::ReportPeriod;
use crate::target::TargetKind;

/// Errors raised while building or checking a report context.
///
/// All of these are raised before any input file is read.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContextError {
    #[error("region must not be empty")]
    EmptyRegion,

    #[error("year {year} is outside the supported range 2000-2100")]
    YearOutOfRange { year: i32 },

    #[error("month {month} is outside 1-12")]
    MonthOutOfRange { month: u32 },

    #[error("semester {semester} is outside 1-2")]
    SemesterOutOfRange { semester: u8 },

    #[error("a context cannot carry both a month and a semester")]
    ConflictingPeriod,

    #[error("report date {date} is in the future (today is {today})")]
    FutureReportDate { date: NaiveDate, today: NaiveDate },

    #[error("reporting period starting {start} is in the future (today is {today})")]
    FuturePeriod { start: NaiveDate, today: NaiveDate },

    #[error("{period} report requires {requirement}")]
    MissingPeriod {
        period: ReportPeriod,
        requirement: &'static str,
    },

    #[error("report requires a {expected} target, got {found}")]
    TargetMismatch {
        expected: TargetKind,
        found: String,
    },

    #[error("report does not accept a target dimension (got {found})")]
    UnexpectedTarget { found: TargetKind },

    #[error("invalid aid amount {amount} for {reference}")]
    InvalidAidAmount { reference: String, amount: f64 },
}

pub type Result<T> = std::result::Result<T, ContextError>;
