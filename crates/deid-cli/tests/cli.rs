//! End-to-end runs of the `deid` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const PATIENTS: &str = "\
age,sex
31,F
33,F
35,F
37,F
52,M
54,M
56,M
58,M
";

fn deid(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_deid"))
        .args(["--color", "never"])
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn anonymize_writes_release() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("patients.csv");
    let output = dir.path().join("released.csv");
    fs::write(&input, PATIENTS).unwrap();

    let result = deid(&[
        "anonymize",
        path_str(&input),
        path_str(&output),
        "-k",
        "3",
        "--max-suppression",
        "0.2",
        "--interval-levels",
        "3",
        "--no-progress",
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    let written = fs::read_to_string(&output).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("age,sex"));
    // 58 is the observed maximum, so its row falls outside both age bands.
    assert_eq!(lines.count(), 7);
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Generalization: (1, 0)"));
}

#[test]
fn lattice_without_solution_exits_with_two() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("patients.csv");
    fs::write(&input, PATIENTS).unwrap();

    let result = deid(&["lattice", path_str(&input), "-k", "100", "--no-progress"]);
    assert_eq!(result.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("No node satisfies the constraints."));
}

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let result = deid(&[
        "anonymize",
        path_str(&dir.path().join("absent.csv")),
        path_str(&dir.path().join("out.csv")),
        "--no-progress",
    ]);
    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("error: read"));
}
