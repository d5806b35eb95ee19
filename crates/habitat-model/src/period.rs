use std::fmt;

use serde::{Deserialize, Serialize};

/// Reporting cadence declared by a report specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Monthly,
    Semester,
    Annual,
}

impl ReportPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Semester => "semester",
            Self::Annual => "annual",
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const MONTH_NAMES: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

/// French month name used in report headers.
///
/// Returns `None` outside 1-12.
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(index).copied()
}

/// First and last month of a semester.
pub(crate) fn semester_months(semester: u8) -> (u32, u32) {
    if semester <= 1 { (1, 6) } else { (7, 12) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_names_cover_the_year() {
        assert_eq!(month_name(1), Some("Janvier"));
        assert_eq!(month_name(12), Some("Décembre"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn period_serializes_lowercase() {
        let json = serde_json::to_string(&ReportPeriod::Semester).expect("serialize");
        assert_eq!(json, "\"semester\"");
    }
}
