//! Tests for lint rules and the check API.

use ltschem::prelude::*;
use ltschem::parse_schematic;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn fuel_tank_fixture_is_clean() {
    let result =
        AscToolkit::check_schematic(&fixture_path("fuel_tanks.asc"), &CheckOptions::default())
            .expect("should check");
    assert_eq!(
        result.total_issues(),
        0,
        "unexpected issues: {:?}",
        result.issues
    );
}

#[test]
fn floating_flag_fixture_reports_exactly_the_flag() {
    let result =
        AscToolkit::check_schematic(&fixture_path("floating_flag.asc"), &CheckOptions::default())
            .expect("should check");

    let floating: Vec<_> = result
        .issues
        .iter()
        .filter(|i| i.rule_id == "floating_flag")
        .collect();
    assert_eq!(floating.len(), 1);
    assert_eq!(floating[0].object.as_deref(), Some("lost"));

    // Nothing else in the drawing is wrong.
    assert_eq!(result.total_issues(), 1, "issues: {:?}", result.issues);
    assert_eq!(result.stats.warnings, 1);
    assert!(!result.has_errors());
}

#[test]
fn rules_engine_runs_directly_on_parsed_schematic() {
    let schematic = parse_schematic(&fixture_path("floating_flag.asc")).expect("should parse");
    let issues = RulesEngine::with_default_rules().analyze(&schematic);
    assert!(issues.iter().any(|i| i.rule_id == "floating_flag"));
}

#[test]
fn rule_ids_are_distinct_and_named() {
    let engine = RulesEngine::with_default_rules();
    let mut ids: Vec<&str> = engine.rules().map(|r| r.id()).collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total, "rule ids must be unique");
    for rule in engine.rules() {
        assert!(!rule.name().is_empty());
    }
}

#[test]
fn check_project_covers_fixture_directory() {
    let dir = fixture_path("");
    let results = AscToolkit::check_project(&dir, &CheckOptions::default());
    // The directory holds malformed.asc, so a full project check fails.
    assert!(results.is_err());

    let results = AscToolkit::check_project(
        &dir,
        &CheckOptions {
            strict: false,
            rules: vec!["floating_flag".to_string()],
        },
    );
    assert!(results.is_err(), "malformed file still fails to parse");
}

#[test]
fn issues_serialize_to_json() {
    let result =
        AscToolkit::check_schematic(&fixture_path("floating_flag.asc"), &CheckOptions::default())
            .expect("should check");
    let json = serde_json::to_string(&result.issues).expect("should serialize");
    assert!(json.contains("floating_flag"));
    assert!(json.contains("Warning"));
}
