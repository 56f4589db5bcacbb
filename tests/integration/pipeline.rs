//! Load pipeline: parse, expand, re-index, build the dependency graph.

use anchorage::config::LoadOptions;
use anchorage::core::AnchorageError;
use anchorage::document::{Document, Node, NodeKind};
use anchorage::graph::{DependencyGraph, check_dependencies};
use anchorage::loader::{load_file, load_str, load_with_options};
use anchorage::test_utils::{init_test_logging, write_tree};
use serde::Deserialize;
use std::collections::BTreeMap;
use tempfile::TempDir;

use super::fixture;

#[test]
fn test_merge_and_include_scenario() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    write_tree(
        temp.path(),
        &[
            (
                "main.yml",
                "default: &default\n  retries: 3\njob1:\n  <<: *default\n  script: make\ntasks: !include tasks.yml\n",
            ),
            ("tasks.yml", "- lint\n- test\n"),
        ],
    )
    .unwrap();

    let options = LoadOptions::new().with_include_tag("!include");
    let doc = load_file(&temp.path().join("main.yml"), &options).unwrap();

    let tasks = doc.root().get("tasks").and_then(Node::as_sequence).unwrap();
    assert!(!tasks.is_empty());

    let merged = doc.root().get("job1").and_then(|job| job.get("<<")).unwrap();
    let resolved = doc.resolve_alias(merged).unwrap();
    assert_eq!(resolved.id, "default");
    assert!(matches!(resolved.node.kind, NodeKind::Mapping(_)));
}

#[test]
fn test_fixture_pipeline_graph() {
    let options = LoadOptions::new().with_include_tag("!include");
    let doc = load_file(&fixture("pipeline/main.yml"), &options).unwrap();

    assert_eq!(
        doc.anchor_ids().collect::<Vec<_>>(),
        vec!["default", "build", "job1", "deploy", "lint", "cache"]
    );

    let graph = check_dependencies(&doc, "depends_on").unwrap();
    assert_eq!(graph.node_count(), 6);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.dependencies_of("job1"), Some(&["build".to_string()][..]));
    assert_eq!(graph.dependencies_of("deploy"), Some(&["job1".to_string(), "build".to_string()][..]));
    assert_eq!(graph.transitive_dependencies("deploy"), vec!["job1", "build"]);

    let order: Vec<&str> = graph.topological_order().unwrap().into_iter().map(|n| n.id.as_str()).collect();
    let pos = |id: &str| order.iter().position(|n| *n == id).unwrap();
    assert!(pos("build") < pos("job1"));
    assert!(pos("job1") < pos("deploy"));
}

#[test]
fn test_included_anchor_is_usable_by_alias_resolution() {
    let options = LoadOptions::new().with_include_tag("!include");
    let doc = load_file(&fixture("pipeline/main.yml"), &options).unwrap();

    let cache = doc.anchored("cache").unwrap();
    assert_eq!(cache.node.get("key").and_then(Node::as_str), Some("cargo"));
    assert!(cache.line() >= 1);
}

#[test]
fn test_self_dependency_fixture_is_rejected() {
    let doc = load_file(&fixture("self_dependency.yml"), &LoadOptions::new()).unwrap();
    let err = check_dependencies(&doc, "depends_on").unwrap_err();
    assert!(matches!(err, AnchorageError::CycleDetected { ref id, .. } if id == "release"));
    assert_eq!(err.to_string(), "Cycle detected at node: release");
}

#[test]
fn test_dependency_field_is_configurable() {
    let doc = load_str("a: &a {}\nb: &b {needs: [*a], depends_on: []}\n").unwrap();
    assert_eq!(DependencyGraph::build(&doc, "depends_on").unwrap().edge_count(), 0);
    assert_eq!(DependencyGraph::build(&doc, "needs").unwrap().edge_count(), 1);
}

#[test]
fn test_unknown_dependency_is_rejected() {
    let doc = Document::new(Node::mapping(vec![(
        Node::scalar("b"),
        Node::mapping(vec![(Node::scalar("depends_on"), Node::sequence(vec![Node::alias("ghost")]))])
            .with_anchor("b"),
    )]));

    let err = check_dependencies(&doc, "depends_on").unwrap_err();
    assert!(matches!(err, AnchorageError::UnresolvedDagNode { ref id, .. } if id == "ghost"));
}

#[test]
fn test_decode_resolved_document() {
    #[derive(Debug, Deserialize)]
    struct Job {
        #[serde(default)]
        retries: u32,
        #[serde(default)]
        script: String,
        #[serde(default)]
        depends_on: Vec<String>,
    }

    let mut doc = load_str(
        "default: &default\n  retries: 2\nbuild: &build\n  <<: *default\n  script: make\ntest: &test\n  script: make check\n  depends_on: [*build]\n",
    )
    .unwrap();
    assert_eq!(doc.rewrite_references("depends_on").unwrap(), 1);

    let jobs: BTreeMap<String, Job> = doc.decode().unwrap_or_else(|e| panic!("decode failed: {e}"));
    assert_eq!(jobs["build"].retries, 2);
    assert_eq!(jobs["test"].depends_on, vec!["build".to_string()]);
    assert_eq!(jobs["test"].script, "make check");
}

#[test]
fn test_reader_input_with_includes() {
    let temp = TempDir::new().unwrap();
    write_tree(temp.path(), &[("steps.yml", "- compile\n")]).unwrap();

    let options = LoadOptions::with_includes(temp.path());
    let doc = load_with_options("steps: !include steps.yml\n".as_bytes(), &options).unwrap();
    assert_eq!(doc.root().get("steps").and_then(Node::as_sequence).map(<[Node]>::len), Some(1));
}
