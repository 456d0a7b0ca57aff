//! S1 — chain, globals inheritance (§8).

use crate::prelude::run_application;
use serde_json::json;

fn identity_pipeline(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": id,
        "category": "pipeline",
        "steps": [{
            "id": "s1",
            "type": "pipeline",
            "params": [{"name": "input", "type": "text", "value": 1}],
            "engineMeta": "Value.identity",
        }],
    })
}

#[test]
fn a_child_execution_inherits_its_parents_final_globals_and_pipeline_parameters() {
    let application = json!({
        "pipelines": [identity_pipeline("p")],
        "executions": [
            {
                "id": "A",
                "pipelineIds": ["p"],
                "globals": {"x": 42},
                "pipelineParameters": {"runId": "abc"},
            },
            {
                "id": "B",
                "pipelineIds": ["p"],
                "parents": ["A"],
            },
        ],
    });

    let report = run_application(&application, &["--json"]).succeeds().stdout_json();

    assert_eq!(report["outcome"]["status"], "COMPLETE");
    let a_in_b = &report["executions"]["B"]["globals"]["A"];
    assert_eq!(a_in_b["globals"]["x"], 42);
    assert_eq!(a_in_b["pipelineParameters"]["runId"], "abc");
}

#[test]
fn independent_executions_both_complete_and_are_reported() {
    let application = json!({
        "pipelines": [identity_pipeline("p")],
        "executions": [
            {"id": "e1", "pipelineIds": ["p"]},
            {"id": "e2", "pipelineIds": ["p"]},
        ],
    });

    let report = run_application(&application, &["--json"]).succeeds().stdout_json();
    assert_eq!(report["outcome"]["status"], "COMPLETE");
    assert_eq!(report["executions"]["e1"]["status"], "COMPLETE");
    assert_eq!(report["executions"]["e2"]["status"], "COMPLETE");
}
