pub mod context;
pub mod error;
pub mod period;
pub mod target;

pub use context::{ReportContext, ReportContextBuilder};
pub use error::{ContextError, Result};
pub use period::{ReportPeriod, month_name};
pub use target::{TargetDimension, TargetKind};
