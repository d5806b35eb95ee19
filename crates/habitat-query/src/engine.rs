//! In-process SQL engine adapter.
//!
//! One [`QueryEngine`] is owned by one generation run. Tables live only as
//! long as the engine: closing (or dropping) it discards them, and any later
//! query fails with [`QueryError::Closed`].

use std::collections::BTreeSet;

use habitat_common::any_to_i64;
use polars::prelude::*;
use polars::sql::SQLContext;
use tracing::{debug, warn};

use crate::error::{QueryError, Result};

/// Column names and types of a registered table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescription {
    pub table: String,
    pub columns: Vec<(String, String)>,
}

pub struct QueryEngine {
    context: Option<SQLContext>,
    tables: BTreeSet<String>,
    has_data: bool,
}

impl QueryEngine {
    pub fn new() -> Self {
        Self {
            context: Some(SQLContext::new()),
            tables: BTreeSet::new(),
            has_data: false,
        }
    }

    /// Registers a frame under `name`, replacing any earlier table of that
    /// name. Column names are trimmed before registration.
    pub fn create_table(&mut self, name: &str, frame: DataFrame) -> Result<()> {
        let context = self.context.as_mut().ok_or(QueryError::Closed)?;
        let frame = trim_column_names(frame).map_err(|source| QueryError::Registration {
            table: name.to_string(),
            source,
        })?;
        let rows = frame.height();
        let columns = frame.width();
        let replaced = !self.tables.insert(name.to_string());
        context.register(name, frame.lazy());
        self.has_data = true;
        debug!(table = name, rows, columns, replaced, "registered table");
        Ok(())
    }

    /// Executes a query and collects its result.
    ///
    /// Fails if the engine is closed or if no table was ever registered.
    pub fn execute(&mut self, query: &str) -> Result<DataFrame> {
        let context = self.context.as_mut().ok_or(QueryError::Closed)?;
        if !self.has_data {
            return Err(QueryError::NoDataLoaded);
        }
        context
            .execute(query)
            .and_then(LazyFrame::collect)
            .map_err(|source| QueryError::Execution {
                query: query.to_string(),
                source,
            })
    }

    pub fn has_data(&self) -> bool {
        self.has_data
    }

    pub fn is_closed(&self) -> bool {
        self.context.is_none()
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains(name)
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.iter().cloned().collect()
    }

    pub fn count_records(&mut self, table: &str) -> Result<usize> {
        self.ensure_table(table)?;
        let frame = self.execute(&format!("SELECT COUNT(*) AS n FROM {table}"))?;
        let count = frame
            .get_columns()
            .first()
            .and_then(|column| column.get(0).ok())
            .and_then(any_to_i64)
            .unwrap_or(0);
        Ok(usize::try_from(count).unwrap_or(0))
    }

    pub fn describe(&mut self, table: &str) -> Result<TableDescription> {
        self.ensure_table(table)?;
        let frame = self.execute(&format!("SELECT * FROM {table} LIMIT 0"))?;
        let columns = frame
            .get_columns()
            .iter()
            .map(|column| (column.name().to_string(), column.dtype().to_string()))
            .collect();
        Ok(TableDescription {
            table: table.to_string(),
            columns,
        })
    }

    pub fn sample(&mut self, table: &str, rows: usize) -> Result<DataFrame> {
        self.ensure_table(table)?;
        self.execute(&format!("SELECT * FROM {table} LIMIT {rows}"))
    }

    /// Logs row counts and schemas of every table at debug level.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn log_summary(&mut self) {
        for table in self.table_names() {
            match self.count_records(&table) {
                Ok(rows) => debug!(table = %table, rows, "table summary"),
                Err(error) => warn!(table = %table, %error, "could not count table rows"),
            }
            match self.describe(&table) {
                Ok(description) => {
                    let columns: Vec<String> = description
                        .columns
                        .iter()
                        .map(|(name, dtype)| format!("{name}: {dtype}"))
                        .collect();
                    debug!(table = %table, columns = ?columns, "table schema");
                }
                Err(error) => warn!(table = %table, %error, "could not describe table"),
            }
        }
    }

    /// Releases the engine and its tables. Safe to call more than once.
    pub fn close(&mut self) {
        if self.context.take().is_some() {
            debug!(tables = self.tables.len(), "query engine closed");
        }
        self.tables.clear();
    }

    fn ensure_table(&self, table: &str) -> Result<()> {
        if self.is_closed() {
            return Err(QueryError::Closed);
        }
        if self.tables.contains(table) {
            Ok(())
        } else {
            Err(QueryError::UnknownTable {
                table: table.to_string(),
            })
        }
    }
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for QueryEngine {
    fn drop(&mut self) {
        self.close();
    }
}

fn trim_column_names(mut frame: DataFrame) -> PolarsResult<DataFrame> {
    let names: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.as_str().to_string())
        .collect();
    if names.iter().all(|name| name.trim() == name) {
        return Ok(frame);
    }
    frame.set_column_names(names.iter().map(|name| name.trim()))?;
    Ok(frame)
}
