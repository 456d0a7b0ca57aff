//! ConfigError surfaces at plan construction; the plan never starts (§7).

use crate::prelude::run_application;
use serde_json::json;

#[test]
fn malformed_application_json_is_rejected_before_the_plan_runs() {
    run_application(&json!("not an application"), &[])
        .fails()
        .stderr_contains("Error");
}

#[test]
fn a_duplicate_pipeline_id_is_rejected() {
    let pipeline = json!({
        "id": "p",
        "name": "p",
        "category": "pipeline",
        "steps": [],
    });
    let application = json!({
        "pipelines": [pipeline.clone(), pipeline],
        "executions": [{"id": "e1", "pipelineIds": ["p"]}],
    });

    run_application(&application, &[]).fails();
}

#[test]
fn an_unknown_parent_id_is_rejected() {
    let application = json!({
        "pipelines": [],
        "executions": [
            {"id": "e1", "pipelineIds": [], "parents": ["ghost"]},
        ],
    });

    run_application(&application, &[]).fails();
}

#[test]
fn a_cyclic_parent_graph_is_rejected() {
    let application = json!({
        "pipelines": [],
        "executions": [
            {"id": "a", "pipelineIds": [], "parents": ["b"]},
            {"id": "b", "pipelineIds": [], "parents": ["a"]},
        ],
    });

    run_application(&application, &[]).fails();
}

#[test]
fn an_execution_referencing_an_unknown_pipeline_errors_that_execution() {
    let application = json!({
        "pipelines": [],
        "executions": [{"id": "e1", "pipelineIds": ["ghost"]}],
    });

    let report = run_application(&application, &["--json"]).stdout_json();
    assert_eq!(report["outcome"]["status"], "ERRORED");
    assert_eq!(report["executions"]["e1"]["status"], "ERRORED");
}
