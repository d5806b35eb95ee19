//! Named query results consumed by the generators.

use std::collections::HashMap;

use habitat_catalog::KEY_COLUMN;
use habitat_common::{any_to_f64, any_to_string};
use polars::prelude::{Column, DataFrame};

use crate::error::{DocumentError, Result};

/// Query name -> result frame, in execution order.
#[derive(Debug, Clone, Default)]
pub struct QueryResults {
    results: Vec<(String, DataFrame)>,
}

impl QueryResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a result, replacing any earlier result of the same name.
    pub fn insert(&mut self, name: impl Into<String>, frame: DataFrame) {
        let name = name.into();
        match self.results.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = frame,
            None => self.results.push((name, frame)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&DataFrame> {
        self.results
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, frame)| frame)
    }

    pub fn frame(&self, name: &str) -> Result<&DataFrame> {
        self.get(name).ok_or_else(|| DocumentError::MissingQuery {
            query: name.to_string(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Row count of every result, in execution order.
    pub fn row_counts(&self) -> Vec<(String, usize)> {
        self.results
            .iter()
            .map(|(name, frame)| (name.clone(), frame.height()))
            .collect()
    }

    /// Sums `value` per key. Null or non-numeric values count as zero.
    pub fn keyed_values(&self, query: &str, value: &str) -> Result<HashMap<String, f64>> {
        let frame = self.frame(query)?;
        let keys = column(frame, query, KEY_COLUMN)?;
        let values = column(frame, query, value)?;
        let mut totals = HashMap::new();
        for idx in 0..frame.height() {
            let key = text_at(keys, idx);
            let amount = number_at(values, idx);
            *totals.entry(key).or_insert(0.0) += amount;
        }
        Ok(totals)
    }

    /// Sums `value` per (key, `second_key`) pair.
    pub fn pair_values(
        &self,
        query: &str,
        second_key: &str,
        value: &str,
    ) -> Result<HashMap<(String, String), f64>> {
        let frame = self.frame(query)?;
        let keys = column(frame, query, KEY_COLUMN)?;
        let seconds = column(frame, query, second_key)?;
        let values = column(frame, query, value)?;
        let mut totals = HashMap::new();
        for idx in 0..frame.height() {
            let pair = (text_at(keys, idx), text_at(seconds, idx));
            *totals.entry(pair).or_insert(0.0) += number_at(values, idx);
        }
        Ok(totals)
    }

    /// Reads the given columns of every row as text.
    pub fn text_rows(&self, query: &str, columns: &[&str]) -> Result<Vec<Vec<String>>> {
        let frame = self.frame(query)?;
        let selected = columns
            .iter()
            .map(|name| column(frame, query, name))
            .collect::<Result<Vec<_>>>()?;
        Ok((0..frame.height())
            .map(|idx| selected.iter().map(|col| text_at(col, idx)).collect())
            .collect())
    }
}

fn column<'a>(frame: &'a DataFrame, query: &str, name: &str) -> Result<&'a Column> {
    frame
        .column(name)
        .map_err(|_| DocumentError::MissingColumn {
            query: query.to_string(),
            column: name.to_string(),
        })
}

fn text_at(column: &Column, idx: usize) -> String {
    column
        .get(idx)
        .map(any_to_string)
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn number_at(column: &Column, idx: usize) -> f64 {
    column.get(idx).ok().and_then(any_to_f64).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    use super::*;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("cle".into(), vec!["A", "B", "A"]).into_column(),
            Series::new("tranche".into(), vec!["T1", "T1", "T2"]).into_column(),
            Series::new("montant".into(), vec![Some(10.0), None, Some(5.0)]).into_column(),
        ])
        .unwrap()
    }

    #[test]
    fn keyed_values_sum_duplicates() {
        let mut results = QueryResults::new();
        results.insert("q", frame());
        let values = results.keyed_values("q", "montant").unwrap();
        assert_eq!(values.get("A"), Some(&15.0));
        assert_eq!(values.get("B"), Some(&0.0));
    }

    #[test]
    fn pair_values_key_on_both_columns() {
        let mut results = QueryResults::new();
        results.insert("q", frame());
        let values = results.pair_values("q", "tranche", "montant").unwrap();
        assert_eq!(values.get(&("A".to_string(), "T2".to_string())), Some(&5.0));
    }

    #[test]
    fn missing_query_and_column_are_errors() {
        let mut results = QueryResults::new();
        results.insert("q", frame());
        assert_eq!(
            results.keyed_values("r", "montant").unwrap_err(),
            DocumentError::MissingQuery {
                query: "r".to_string()
            }
        );
        assert!(matches!(
            results.keyed_values("q", "nombre"),
            Err(DocumentError::MissingColumn { .. })
        ));
    }

    #[test]
    fn insert_replaces_and_keeps_order() {
        let mut results = QueryResults::new();
        results.insert("b", frame());
        results.insert("a", frame());
        results.insert("b", frame().head(Some(1)));
        assert_eq!(results.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(results.row_counts()[0], ("b".to_string(), 1));
    }
}
