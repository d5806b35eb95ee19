//! Query layer for report generation.
//!
//! - [`QueryEngine`] wraps one in-process Polars SQL context per generation
//!   run. Tables are registered from loaded spreadsheets and reference data,
//!   then queried with SQL.
//! - [`render_query`] turns a catalogued SQL template into executable text by
//!   substituting the report context's values.

mod engine;
mod error;
mod template;

pub use engine::{QueryEngine, TableDescription};
pub use error::{QueryError, Result, TemplateError};
pub use template::{Placeholder, Token, placeholders, render_query};
