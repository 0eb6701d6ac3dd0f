//! Load, anonymize and export through real files.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use deid_core::{SearchSettings, Value, anonymize};
use deid_ingest::{
    ColumnKind, HierarchyConfig, IngestError, into_dataset, load_config, read_table, write_table,
};
use tempfile::TempDir;

const PATIENTS: &str = "\
age,sex,bp
34,F,120
36,F,125
38,F,118
41,M,140
43,M,135
45,M,150
62,F,160
67,F,155
";

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn reads_typed_columns() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "patients.csv", "\u{feff}id,score,label\n1,2.5,a\n2,,b\n");
    let table = read_table(&path).unwrap();
    assert_eq!(table.headers, vec!["id", "score", "label"]);
    assert_eq!(
        table.kinds,
        vec![ColumnKind::Integer, ColumnKind::Real, ColumnKind::Text]
    );
    assert_eq!(table.rows[1][1], Value::Null);
    assert_eq!(table.rows[0][1], Value::Real(2.5));
}

#[test]
fn read_errors_carry_context() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.csv");
    assert!(matches!(
        read_table(&missing).unwrap_err(),
        IngestError::FileNotFound { .. }
    ));

    let header_only = write(&dir, "header.csv", "age,sex\n");
    assert!(matches!(
        read_table(&header_only).unwrap_err(),
        IngestError::EmptyCsv { .. }
    ));

    let ragged = write(&dir, "ragged.csv", "age,sex\n1,F\n2\n");
    assert!(matches!(
        read_table(&ragged).unwrap_err(),
        IngestError::CsvParse { .. }
    ));
}

#[test]
fn loads_hierarchy_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "hierarchy.json",
        r#"{ "interval_levels": 4, "search": { "k": 3 }, "columns": { "sex": { "kind": "suppress" } } }"#,
    );
    let config = load_config(&path).unwrap();
    assert_eq!(config.interval_levels, 4);
    assert_eq!(config.search.map(|s| s.k), Some(3));

    let broken = write(&dir, "broken.json", "{ not json");
    assert!(matches!(
        load_config(&broken).unwrap_err(),
        IngestError::ConfigParse { .. }
    ));
}

#[test]
fn anonymized_export_has_no_small_classes() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "patients.csv", PATIENTS);
    let output = dir.path().join("anonymized.csv");

    let config = HierarchyConfig {
        interval_levels: 4,
        ..HierarchyConfig::default()
    };
    let table = read_table(&input).unwrap();
    let (headers, dataset) = into_dataset(table, &config).unwrap();
    let settings = SearchSettings::default()
        .with_k(2)
        .with_max_suppression_rate(0.25);
    let outcome = anonymize(&dataset, &settings, &mut ()).unwrap();
    let release = dataset.anonymize(&outcome.node, settings.k, false).unwrap();
    write_table(&output, &headers, &release.rows).unwrap();

    let exported = read_exported(&output);
    assert_eq!(exported.len(), release.rows.len());
    assert_eq!(exported.len() + release.suppressed_rows, 8);

    let mut classes: HashMap<&Vec<String>, usize> = HashMap::new();
    for row in &exported {
        *classes.entry(row).or_default() += 1;
    }
    assert!(classes.values().all(|&size| size >= 2));
}

fn read_exported(path: &Path) -> Vec<Vec<String>> {
    let text = fs::read_to_string(path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("age,sex,bp"));
    lines
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect()
}
