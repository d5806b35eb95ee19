//! Library side of the `habitat` command: logging setup, user settings and
//! terminal tables.

pub mod logging;
pub mod settings;
pub mod summary;
