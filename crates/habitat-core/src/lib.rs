//! Report generation pipeline.
//!
//! [`ReportGenerator`] validates the input files of a request, loads them
//! into a per-run query engine next to the reference tables, runs the
//! report's queries, builds the document and hands it to a sink.
//! [`spawn_generation`] runs the same pipeline on a worker thread.

mod error;
mod generator;
mod runner;
mod stage;

pub use error::{ErrorKind, GenerationError, Result};
pub use generator::{GenerationOutcome, GenerationRequest, ReportGenerator};
pub use runner::{GenerationEvent, GenerationHandle, spawn_generation};
pub use stage::{PipelineStage, ProgressObserver};
