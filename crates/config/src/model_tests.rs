// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn execution(id: &str, parents: &[&str]) -> ExecutionDef {
    ExecutionDef {
        id: id.to_string(),
        parents: parents.iter().map(|s| s.to_string()).collect(),
        ..ExecutionDef::default()
    }
}

fn application(executions: Vec<ExecutionDef>) -> Application {
    Application {
        executions,
        ..Application::default()
    }
}

#[test]
fn validate_accepts_a_chain() {
    let app = application(vec![execution("a", &[]), execution("b", &["a"])]);
    assert!(app.validate().is_ok());
}

#[test]
fn validate_accepts_parallel_siblings() {
    let app = application(vec![
        execution("root", &[]),
        execution("a", &["root"]),
        execution("b", &["root"]),
    ]);
    assert!(app.validate().is_ok());
}

#[test]
fn validate_rejects_duplicate_execution_ids() {
    let app = application(vec![execution("a", &[]), execution("a", &[])]);
    let err = app.validate().unwrap_err();
    assert_eq!(err, ConfigError::DuplicateExecutionId("a".to_string()));
}

#[test]
fn validate_rejects_unknown_parent() {
    let app = application(vec![execution("a", &["ghost"])]);
    let err = app.validate().unwrap_err();
    assert_eq!(err, ConfigError::UnknownParent("a".to_string(), "ghost".to_string()));
}

#[test]
fn validate_rejects_a_cycle() {
    let app = application(vec![execution("a", &["b"]), execution("b", &["a"])]);
    let err = app.validate().unwrap_err();
    assert_eq!(err, ConfigError::CyclicExecutionGraph);
}

#[test]
fn descriptor_new_has_empty_parameters() {
    let descriptor = Descriptor::new("com.example.Listener");
    assert_eq!(descriptor.class_name, "com.example.Listener");
    assert!(descriptor.parameters.is_empty());
}

#[test]
fn application_json_roundtrips_through_serde() {
    let app = application(vec![execution("a", &[])]);
    let json = serde_json::to_string(&app).unwrap();
    let back: Application = serde_json::from_str(&json).unwrap();
    assert_eq!(back, app);
}
