//! Runs the conformance suite under conformance/.
//!
//! positive/NAME.tdoc must parse and project to positive/NAME.expected.json.
//! negative/NAME.tdoc must fail with the kind and line recorded in
//! negative/NAME.expected-error.json.

use std::path::{Path, PathBuf};

use treedoc_core::parse_file;

fn conformance_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../conformance")
        .join(name)
}

fn sources(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", dir.display(), e))
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |e| e == "tdoc"))
        .collect();
    paths.sort();
    paths
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().unwrap().to_string_lossy();
    path.with_file_name(format!("{}{}", stem, suffix))
}

fn read_json(path: &Path) -> serde_json::Value {
    let src = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", path.display(), e));
    serde_json::from_str(&src).unwrap_or_else(|e| panic!("bad JSON in {}: {}", path.display(), e))
}

#[test]
fn positive_documents_match_expected_projection() {
    let files = sources(&conformance_dir("positive"));
    assert!(!files.is_empty(), "no positive conformance documents");

    let mut failures = Vec::new();
    for path in &files {
        let expected = read_json(&sibling(path, ".expected.json"));
        match parse_file(path) {
            Ok(doc) => {
                let actual = doc.to_json_value();
                if actual != expected {
                    failures.push(format!(
                        "{}:\n  expected {}\n  actual   {}",
                        path.display(),
                        expected,
                        actual
                    ));
                }
            }
            Err(e) => failures.push(format!("{}: unexpected error {}", path.display(), e)),
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn negative_documents_fail_as_expected() {
    let files = sources(&conformance_dir("negative"));
    assert!(!files.is_empty(), "no negative conformance documents");

    let mut failures = Vec::new();
    for path in &files {
        let expected = read_json(&sibling(path, ".expected-error.json"));
        match parse_file(path) {
            Ok(_) => failures.push(format!("{}: parsed but should fail", path.display())),
            Err(e) => {
                let actual = e.to_json_value();
                if actual["kind"] != expected["kind"] || actual["line"] != expected["line"] {
                    failures.push(format!(
                        "{}: expected {} got {}",
                        path.display(),
                        expected,
                        actual
                    ));
                }
            }
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}
