//! Column statistics used to derive default generalizers.

use std::collections::HashSet;

use deid_core::Value;

use crate::table::{ColumnKind, Table};

/// Summary of one column.
#[derive(Debug, Clone)]
pub struct ColumnStats {
    pub name: String,
    pub kind: ColumnKind,
    pub nulls: usize,
    /// Smallest numeric value, ignoring empty cells.
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Distinct values in order of first appearance, `Null` included.
    pub distinct: Vec<Value>,
}

impl ColumnStats {
    /// Observed numeric bounds, when the column has any numbers.
    #[must_use]
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.min.zip(self.max)
    }
}

/// Computes statistics for every column of `table`.
#[must_use]
pub fn column_stats(table: &Table) -> Vec<ColumnStats> {
    table
        .headers
        .iter()
        .zip(&table.kinds)
        .enumerate()
        .map(|(index, (name, &kind))| {
            let mut seen = HashSet::new();
            let mut stats = ColumnStats {
                name: name.clone(),
                kind,
                nulls: 0,
                min: None,
                max: None,
                distinct: Vec::new(),
            };
            for value in table.column(index) {
                if value.is_null() {
                    stats.nulls += 1;
                }
                if let Some(number) = value.as_f64() {
                    stats.min = Some(stats.min.map_or(number, |m| m.min(number)));
                    stats.max = Some(stats.max.map_or(number, |m| m.max(number)));
                }
                if seen.insert(value) {
                    stats.distinct.push(value.clone());
                }
            }
            stats
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn collects_bounds_and_distinct_values() {
        let table = Table {
            path: PathBuf::from("memory.csv"),
            headers: vec!["age".into(), "sex".into()],
            kinds: vec![ColumnKind::Integer, ColumnKind::Text],
            rows: vec![
                vec![Value::Integer(34), Value::from("F")],
                vec![Value::Null, Value::from("M")],
                vec![Value::Integer(71), Value::from("F")],
            ],
        };
        let stats = column_stats(&table);
        assert_eq!(stats[0].bounds(), Some((34.0, 71.0)));
        assert_eq!(stats[0].nulls, 1);
        assert_eq!(stats[0].distinct.len(), 3);
        assert_eq!(stats[1].bounds(), None);
        assert_eq!(stats[1].distinct, vec![Value::from("F"), Value::from("M")]);
    }
}
