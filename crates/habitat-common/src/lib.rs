//! Shared utilities for the housing-aid report crates.
//!
//! This crate provides helpers used across the workspace, mostly around
//! reading values out of Polars frames and parsing amounts exported by
//! the payment and decision journals.

pub mod polars;
pub mod text;

pub use polars::{
    any_to_f64, any_to_i64, any_to_string, format_numeric, parse_amount, parse_i64,
};
pub use text::fold_label;
