//! S4 — `executeIfEmpty` short-circuits a step against a prior pipeline's
//! result within the same execution's chained context (§8).

use crate::prelude::run_application;
use serde_json::json;

#[test]
fn a_non_empty_guard_skips_the_step_body_and_stores_its_value() {
    let application = json!({
        "pipelines": [
            {
                "id": "p1",
                "name": "p1",
                "category": "pipeline",
                "steps": [{
                    "id": "readDF",
                    "type": "pipeline",
                    "params": [{"name": "input", "type": "text", "value": "DF1"}],
                    "engineMeta": "Value.identity",
                }],
            },
            {
                "id": "p2",
                "name": "p2",
                "category": "pipeline",
                "steps": [{
                    "id": "read",
                    "type": "pipeline",
                    "params": [{"name": "input", "type": "text", "value": "should-not-run"}],
                    "engineMeta": "Value.identity",
                    "executeIfEmpty": {"name": "guard", "type": "text", "value": "@p1.readDF"},
                }],
            },
        ],
        "executions": [
            {"id": "e1", "pipelineIds": ["p1", "p2"]},
        ],
    });

    let report = run_application(&application, &["--json"]).succeeds().stdout_json();
    assert_eq!(report["outcome"]["status"], "COMPLETE");
}
