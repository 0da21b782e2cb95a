mod common;

use assert_matches::assert_matches;

use common::{GraphCall, MockGraph, MockPlatform, brewery_zip_bytes, literal, test_config};
use csm_twingraph_etl::app::App;
use csm_twingraph_etl::domain::{DATASET_VAR_TYPE, RunParameter};
use csm_twingraph_etl::error::EtlError;
use csm_twingraph_etl::platform::Runner;
use csm_twingraph_etl::records::{EntityKind, GraphRecord};

fn brewery_platform(scratch: &std::path::Path) -> MockPlatform {
    let mut platform = MockPlatform::default()
        .with_dataset("d-target", None)
        .with_dataset("d-bar", Some("%WORKSPACE_FILE%/datasets/d-bar"))
        .with_dataset("d-extra", Some("external/blob"))
        .with_file(
            "datasets/d-bar/brewery_instance.zip",
            &brewery_zip_bytes(scratch),
        );
    platform.runner = Runner {
        dataset_list: vec!["d-target".to_string()],
        parameters_values: vec![
            literal("num_waiters", "5"),
            literal("restock_quantity", "10"),
            literal("stock", "100"),
            RunParameter::new("bar_instance", "d-bar", DATASET_VAR_TYPE),
            RunParameter::new("extra", "d-extra", DATASET_VAR_TYPE),
        ],
    };
    platform
}

#[test]
fn run_loads_brewery_instance_into_target_dataset() {
    let scratch = tempfile::tempdir().unwrap();
    let params_dir = tempfile::tempdir().unwrap();
    let platform = brewery_platform(scratch.path());
    let graph = MockGraph::default();
    let app = App::new(test_config(params_dir.path()), platform, graph);

    let summary = app.run().unwrap();

    assert_eq!(summary.target_dataset, "d-target");
    assert_eq!(summary.resolved_parameters, 4);
    assert_eq!(summary.skipped_parameters, vec!["extra"]);
    assert_eq!(summary.write.nodes, 3);
    assert_eq!(summary.write.relationships, 2);
    assert!(!summary.write.cleared);
    assert!(
        params_dir
            .path()
            .join("bar_instance/reference/Nodes/Customer.csv")
            .is_file()
    );
}

#[test]
fn run_writes_bar_first_then_customers_and_remapped_edges() {
    let scratch = tempfile::tempdir().unwrap();
    let params_dir = tempfile::tempdir().unwrap();
    let graph = MockGraph::populated();
    let platform = brewery_platform(scratch.path());
    let app = App::new(test_config(params_dir.path()), platform, &graph);

    app.run().unwrap();

    let calls = graph.calls();
    assert_matches!(calls[1], GraphCall::Query(_));
    let nodes = graph.created(EntityKind::Node);
    assert_eq!(nodes.len(), 1);
    let names: Vec<&str> = nodes[0].iter().map(GraphRecord::name).collect();
    assert_eq!(names, vec!["MyBar", "Customer1", "Customer2"]);

    let relationships = graph.created(EntityKind::Relationship);
    assert_eq!(relationships.len(), 1);
    let rels: Vec<(&str, &str, &str)> = relationships[0]
        .iter()
        .filter_map(|record| match record {
            GraphRecord::Relationship(rel) => {
                Some((rel.rel_type.as_str(), rel.source.as_str(), rel.target.as_str()))
            }
            GraphRecord::Node(_) => None,
        })
        .collect();
    assert_eq!(
        rels,
        vec![("satisfaction", "id-1", "id-2"), ("bar_vertex", "id-0", "id-1")]
    );
}

#[test]
fn run_without_bar_instance_fails_with_named_parameter() {
    let scratch = tempfile::tempdir().unwrap();
    let params_dir = tempfile::tempdir().unwrap();
    let mut platform = brewery_platform(scratch.path());
    platform
        .runner
        .parameters_values
        .retain(|param| param.parameter_id != "bar_instance");
    let graph = MockGraph::default();
    let app = App::new(test_config(params_dir.path()), platform, &graph);

    let err = app.run().unwrap_err();

    assert_matches!(err, EtlError::MissingParameter(name) if name == "bar_instance");
    assert!(graph.calls().is_empty());
}

#[test]
fn run_requires_a_target_dataset() {
    let scratch = tempfile::tempdir().unwrap();
    let params_dir = tempfile::tempdir().unwrap();
    let mut platform = brewery_platform(scratch.path());
    platform.runner.dataset_list.clear();
    let app = App::new(test_config(params_dir.path()), platform, MockGraph::default());

    let err = app.run().unwrap_err();

    assert_matches!(err, EtlError::NoTargetDataset);
}
