//! Pipeline stages and progress reporting.

use std::fmt;

/// State of a generation run.
///
/// Stages advance strictly in declaration order; [`PipelineStage::Failed`]
/// can follow any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PipelineStage {
    Idle,
    FilesValidated,
    DataLoaded,
    ReferenceTablesCreated,
    QueriesExecuted,
    DocumentBuilt,
    Saved,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FilesValidated => "files validated",
            Self::DataLoaded => "data loaded",
            Self::ReferenceTablesCreated => "reference tables created",
            Self::QueriesExecuted => "queries executed",
            Self::DocumentBuilt => "document built",
            Self::Saved => "saved",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Stage reached after this one on success, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::FilesValidated),
            Self::FilesValidated => Some(Self::DataLoaded),
            Self::DataLoaded => Some(Self::ReferenceTablesCreated),
            Self::ReferenceTablesCreated => Some(Self::QueriesExecuted),
            Self::QueriesExecuted => Some(Self::DocumentBuilt),
            Self::DocumentBuilt => Some(Self::Saved),
            Self::Saved => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives every stage a run enters, `Done` or `Failed` included.
pub trait ProgressObserver: Send + Sync {
    fn on_stage(&self, stage: PipelineStage);
}
