//! Turning a loaded table into generalizer-backed attributes.

use std::collections::BTreeMap;

use deid_core::{Attribute, Dataset, Generalizer, IntervalGeneralizer, NominalGeneralizer};
use tracing::{debug, warn};

use crate::config::{ColumnRule, HierarchyConfig};
use crate::error::{IngestError, Result};
use crate::stats::{ColumnStats, column_stats};
use crate::table::Table;

/// Builds one attribute per table column.
///
/// Columns with a rule in `config` follow it. Other numeric columns get an
/// interval generalizer over their observed range with
/// `config.interval_levels`; everything else gets a two-level hierarchy
/// (value, suppressed).
pub fn build_attributes(table: &Table, config: &HierarchyConfig) -> Result<Vec<Attribute>> {
    for name in config.columns.keys() {
        if !table.headers.contains(name) {
            warn!(column = %name, "hierarchy rule for unknown column ignored");
        }
    }

    column_stats(table)
        .into_iter()
        .map(|stats| -> Result<Attribute> {
            let generalizer = match config.columns.get(&stats.name) {
                Some(rule) => from_rule(&stats, rule, config.interval_levels)?,
                None => discovered(&stats, config.interval_levels)?,
            };
            debug!(
                column = %stats.name,
                kind = stats.kind.label(),
                generalizer = generalizer.kind(),
                levels = generalizer.levels(),
                "built generalizer"
            );
            Ok(Attribute::new(stats.name, generalizer))
        })
        .collect()
}

/// Builds attributes and moves the table rows into a [`Dataset`].
pub fn into_dataset(table: Table, config: &HierarchyConfig) -> Result<(Vec<String>, Dataset)> {
    let attributes = build_attributes(&table, config)?;
    let dataset = Dataset::new(attributes, table.rows)?;
    Ok((table.headers, dataset))
}

fn discovered(stats: &ColumnStats, levels: usize) -> Result<Generalizer> {
    match stats.bounds() {
        Some((min, max)) if stats.kind.is_numeric() => {
            Ok(IntervalGeneralizer::new(min, max, levels)?.into())
        }
        _ => Ok(NominalGeneralizer::suppress_only(stats.distinct.iter().cloned())?.into()),
    }
}

fn from_rule(stats: &ColumnStats, rule: &ColumnRule, default_levels: usize) -> Result<Generalizer> {
    match rule {
        ColumnRule::Interval { min, max, levels } => {
            let (observed_min, observed_max) = stats.bounds().unzip();
            let bounds = min.or(observed_min).zip(max.or(observed_max));
            let Some((min, max)) = bounds else {
                return Err(IngestError::InvalidRule {
                    column: stats.name.clone(),
                    reason: "interval rule needs numeric data or explicit bounds".to_string(),
                });
            };
            let levels = levels.unwrap_or(default_levels);
            Ok(IntervalGeneralizer::new(min, max, levels)?.into())
        }
        ColumnRule::Nominal { hierarchy } => nominal(stats, hierarchy),
        ColumnRule::Suppress => {
            Ok(NominalGeneralizer::suppress_only(stats.distinct.iter().cloned())?.into())
        }
    }
}

fn nominal(
    stats: &ColumnStats,
    hierarchy: &BTreeMap<String, Vec<Option<String>>>,
) -> Result<Generalizer> {
    let generalizer = NominalGeneralizer::from_labels(
        hierarchy
            .iter()
            .map(|(value, labels)| (stats.kind.parse(value), labels.clone())),
    )?;
    if let Some(missing) = stats
        .distinct
        .iter()
        .find(|value| !value.is_null() && !generalizer.covers(value))
    {
        return Err(IngestError::UncoveredValue {
            column: stats.name.clone(),
            value: missing.to_string(),
        });
    }
    Ok(generalizer.into())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use deid_core::{Generalized, Value};

    use super::*;
    use crate::table::ColumnKind;

    fn table() -> Table {
        Table {
            path: PathBuf::from("memory.csv"),
            headers: vec!["age".into(), "answer".into()],
            kinds: vec![ColumnKind::Integer, ColumnKind::Text],
            rows: vec![
                vec![Value::Integer(20), Value::from("mostly agree")],
                vec![Value::Integer(60), Value::from("mostly disagree")],
            ],
        }
    }

    #[test]
    fn discovers_default_generalizers() {
        let attributes = build_attributes(&table(), &HierarchyConfig::default()).unwrap();
        assert_eq!(attributes[0].generalizer.kind(), "interval");
        assert_eq!(attributes[0].levels(), 6);
        assert_eq!(attributes[1].generalizer.kind(), "nominal");
        assert_eq!(attributes[1].levels(), 2);
    }

    #[test]
    fn applies_rules() {
        let mut config = HierarchyConfig::default();
        config.columns.insert(
            "age".into(),
            ColumnRule::Interval {
                min: Some(0.0),
                max: None,
                levels: Some(3),
            },
        );
        config.columns.insert(
            "answer".into(),
            ColumnRule::Nominal {
                hierarchy: BTreeMap::from([
                    ("mostly agree".to_string(), vec![Some("agree".to_string()), None]),
                    ("mostly disagree".to_string(), vec![Some("disagree".to_string()), None]),
                ]),
            },
        );
        let attributes = build_attributes(&table(), &config).unwrap();
        let Generalizer::Interval(age) = &attributes[0].generalizer else {
            panic!("expected interval generalizer");
        };
        assert_eq!(age.bounds(), (0.0, 60.0));
        assert_eq!(age.levels(), 3);
        assert_eq!(
            attributes[1]
                .generalizer
                .generalize(&Value::from("mostly agree"), 1),
            Generalized::Label("agree".into())
        );
    }

    #[test]
    fn rejects_uncovered_values() {
        let mut config = HierarchyConfig::default();
        config.columns.insert(
            "answer".into(),
            ColumnRule::Nominal {
                hierarchy: BTreeMap::from([(
                    "mostly agree".to_string(),
                    vec![Some("agree".to_string())],
                )]),
            },
        );
        let err = build_attributes(&table(), &config).unwrap_err();
        assert!(matches!(err, IngestError::UncoveredValue { ref value, .. } if value == "mostly disagree"));
    }

    #[test]
    fn interval_rule_on_text_needs_bounds() {
        let mut config = HierarchyConfig::default();
        config.columns.insert(
            "answer".into(),
            ColumnRule::Interval {
                min: None,
                max: None,
                levels: None,
            },
        );
        let err = build_attributes(&table(), &config).unwrap_err();
        assert!(matches!(err, IngestError::InvalidRule { .. }));
    }

    #[test]
    fn builds_dataset() {
        let (headers, dataset) = into_dataset(table(), &HierarchyConfig::default()).unwrap();
        assert_eq!(headers, vec!["age".to_string(), "answer".to_string()]);
        assert_eq!(dataset.len(), 2);
    }
}
