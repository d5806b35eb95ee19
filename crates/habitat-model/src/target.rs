use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of dimension a scoped report is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Programme,
    Subprogram,
    Notification,
}

impl TargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Programme => "programme",
            Self::Subprogram => "subprogram",
            Self::Notification => "notification",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The programme, subprogram or notification a scoped report covers.
///
/// Values are resolved from the reference catalogue, so `aid_amount` is the
/// catalogued unit aid rather than user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TargetDimension {
    Programme {
        code: String,
        label: String,
    },
    Subprogram {
        code: String,
        label: String,
        programme: String,
        aid_amount: f64,
    },
    Notification {
        reference: String,
        subprogram: String,
        programme: String,
        aid_amount: f64,
    },
}

impl TargetDimension {
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Programme { .. } => TargetKind::Programme,
            Self::Subprogram { .. } => TargetKind::Subprogram,
            Self::Notification { .. } => TargetKind::Notification,
        }
    }

    /// Value matched exactly against the journals' column for this dimension.
    pub fn match_value(&self) -> &str {
        match self {
            Self::Programme { code, .. } => code,
            Self::Subprogram { code, .. } => code,
            Self::Notification { reference, .. } => reference,
        }
    }

    /// Programme code this target belongs to.
    pub fn programme(&self) -> &str {
        match self {
            Self::Programme { code, .. } => code,
            Self::Subprogram { programme, .. } | Self::Notification { programme, .. } => programme,
        }
    }

    /// Subprogram code, when the target is at or below subprogram level.
    pub fn subprogram(&self) -> Option<&str> {
        match self {
            Self::Programme { .. } => None,
            Self::Subprogram { code, .. } => Some(code),
            Self::Notification { subprogram, .. } => Some(subprogram),
        }
    }

    pub fn notification(&self) -> Option<&str> {
        match self {
            Self::Notification { reference, .. } => Some(reference),
            _ => None,
        }
    }

    pub fn aid_amount(&self) -> Option<f64> {
        match self {
            Self::Programme { .. } => None,
            Self::Subprogram { aid_amount, .. } | Self::Notification { aid_amount, .. } => {
                Some(*aid_amount)
            }
        }
    }

    /// Human-readable description used in report headers.
    pub fn describe(&self) -> String {
        match self {
            Self::Programme { code, label } => format!("Programme {label} ({code})"),
            Self::Subprogram {
                code,
                label,
                programme,
                ..
            } => format!("Sous-programme {label} ({code}) - programme {programme}"),
            Self::Notification {
                reference,
                subprogram,
                ..
            } => format!("Notification {reference} - sous-programme {subprogram}"),
        }
    }
}
