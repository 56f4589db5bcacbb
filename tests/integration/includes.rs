//! Include expansion: path security and repeated inclusion policies.

use anchorage::config::LoadOptions;
use anchorage::core::AnchorageError;
use anchorage::document::Node;
use anchorage::include::InclusionPolicy;
use anchorage::loader::{load_file, load_with_options};
use anchorage::test_utils::write_tree;
use tempfile::TempDir;

fn include_options() -> LoadOptions {
    LoadOptions::new().with_include_tag("!include")
}

fn load_main(temp: &TempDir, options: &LoadOptions) -> anchorage::core::Result<anchorage::document::Document> {
    load_file(&temp.path().join("main.yml"), options)
}

#[test]
fn test_parent_traversal_is_rejected() {
    let temp = TempDir::new().unwrap();
    write_tree(
        temp.path(),
        &[("main.yml", "secret: !include ../secret.yml\n"), ("nested/ok.yml", "a: 1\n")],
    )
    .unwrap();

    let err = load_main(&temp, &include_options()).unwrap_err();
    assert!(matches!(err, AnchorageError::ParentTraversalForbidden { ref path } if path == "../secret.yml"));
}

#[test]
fn test_traversal_that_stays_inside_is_still_rejected() {
    let temp = TempDir::new().unwrap();
    write_tree(temp.path(), &[("main.yml", "a: !include nested/../a.yml\n"), ("a.yml", "x: 1\n")]).unwrap();

    let err = load_main(&temp, &include_options()).unwrap_err();
    assert!(matches!(err, AnchorageError::ParentTraversalForbidden { .. }));
}

#[test]
fn test_absolute_path_outside_base_is_rejected() {
    let temp = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    write_tree(outside.path(), &[("secret.yml", "token: hunter2\n")]).unwrap();

    let target = outside.path().join("secret.yml");
    write_tree(temp.path(), &[("main.yml", &format!("secret: !include {}\n", target.display()))]).unwrap();

    let err = load_main(&temp, &include_options()).unwrap_err();
    assert!(matches!(err, AnchorageError::PathEscape { .. }));
}

#[test]
fn test_nested_includes_resolve_against_including_file() {
    let temp = TempDir::new().unwrap();
    write_tree(
        temp.path(),
        &[
            ("main.yml", "jobs: !include ci/jobs.yml\n"),
            ("ci/jobs.yml", "build: !include steps/build.yml\n"),
            ("ci/steps/build.yml", "script: make\n"),
        ],
    )
    .unwrap();

    let doc = load_main(&temp, &include_options()).unwrap();
    let script = doc.root().get("jobs").and_then(|j| j.get("build")).and_then(|b| b.get("script"));
    assert_eq!(script.and_then(Node::as_str), Some("make"));
}

#[test]
fn test_diamond_includes_depend_on_policy() {
    let temp = TempDir::new().unwrap();
    write_tree(
        temp.path(),
        &[
            ("main.yml", "left: !include a.yml\nright: !include b.yml\n"),
            ("a.yml", "common: !include c.yml\n"),
            ("b.yml", "common: !include c.yml\n"),
            ("c.yml", "shared: true\n"),
        ],
    )
    .unwrap();

    let err = load_main(&temp, &include_options()).unwrap_err();
    assert!(matches!(err, AnchorageError::RecursiveInclusion { ref path } if path.ends_with("c.yml")));

    let options = include_options().with_policy(InclusionPolicy::ActiveChain);
    let doc = load_main(&temp, &options).unwrap();
    for side in ["left", "right"] {
        let shared = doc.root().get(side).and_then(|s| s.get("common")).and_then(|c| c.get("shared"));
        assert_eq!(shared.and_then(Node::as_str), Some("true"));
    }
}

#[test]
fn test_include_cycle_is_rejected_under_both_policies() {
    let temp = TempDir::new().unwrap();
    write_tree(
        temp.path(),
        &[
            ("main.yml", "root: !include a.yml\n"),
            ("a.yml", "next: !include b.yml\n"),
            ("b.yml", "back: !include a.yml\n"),
        ],
    )
    .unwrap();

    for policy in [InclusionPolicy::RejectRepeats, InclusionPolicy::ActiveChain] {
        let err = load_main(&temp, &include_options().with_policy(policy)).unwrap_err();
        assert!(
            matches!(err, AnchorageError::RecursiveInclusion { ref path } if path.ends_with("a.yml")),
            "policy {policy}: {err}"
        );
    }
}

#[test]
fn test_missing_include_target() {
    let temp = TempDir::new().unwrap();
    write_tree(temp.path(), &[("main.yml", "gone: !include missing.yml\n")]).unwrap();

    let err = load_main(&temp, &include_options()).unwrap_err();
    assert!(matches!(err, AnchorageError::IncludeReadError { ref path, .. } if path.ends_with("missing.yml")));
}

#[test]
fn test_unparsable_include_target() {
    let temp = TempDir::new().unwrap();
    write_tree(temp.path(), &[("main.yml", "bad: !include bad.yml\n"), ("bad.yml", "key: [unclosed\n")])
        .unwrap();

    let err = load_main(&temp, &include_options()).unwrap_err();
    assert!(matches!(err, AnchorageError::IncludeParseError { ref path, .. } if path.ends_with("bad.yml")));
}

#[test]
fn test_include_directive_must_be_scalar() {
    let temp = TempDir::new().unwrap();
    write_tree(temp.path(), &[("main.yml", "bad: !include [a.yml, b.yml]\n")]).unwrap();

    let err = load_main(&temp, &include_options()).unwrap_err();
    assert!(matches!(err, AnchorageError::InvalidIncludeDirective { line: 1, .. }));
}

#[test]
fn test_include_tag_requires_base_path() {
    let err = load_with_options("a: !include a.yml\n".as_bytes(), &include_options()).unwrap_err();
    assert!(matches!(err, AnchorageError::MissingBasePath));
}

#[test]
fn test_custom_include_tag() {
    let temp = TempDir::new().unwrap();
    write_tree(
        temp.path(),
        &[("main.yml", "a: !import a.yml\nb: !include b.yml\n"), ("a.yml", "x: 1\n")],
    )
    .unwrap();

    let doc = load_main(&temp, &LoadOptions::new().with_include_tag("!import")).unwrap();
    assert!(doc.root().get("a").and_then(|a| a.get("x")).is_some());
    assert!(doc.root().get("b").is_some_and(|b| b.has_tag("!include")));
}
