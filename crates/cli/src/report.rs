// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rendering a [`PlanReport`] for the terminal (§4.7, §7: "the plan outcome
//! and a per-execution terminal state... are reported to the driver").

use metalus_engine::{PlanOutcome, PlanReport, TerminalState};
use serde_json::{json, Value as Json};

pub fn print_report(report: &PlanReport) {
    let mut executions: Vec<_> = report.states.iter().collect();
    executions.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));

    for (id, state) in executions {
        println!("{id}: {}", describe_state(state));
    }
    println!("plan: {}", describe_outcome(&report.outcome));
}

fn describe_state(state: &TerminalState) -> String {
    match state {
        TerminalState::Complete { .. } => "COMPLETE".to_string(),
        TerminalState::Paused { step, message } => {
            format!("PAUSED at step '{step}'{}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())
        }
        TerminalState::Errored { step, message } => format!("ERRORED at step '{step}': {message}"),
        TerminalState::Skipped => "SKIPPED".to_string(),
    }
}

fn describe_outcome(outcome: &PlanOutcome) -> String {
    match outcome {
        PlanOutcome::Complete => "COMPLETE".to_string(),
        PlanOutcome::Paused { execution, step, message } => {
            format!(
                "PAUSED ({execution} at '{step}'){}",
                message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
            )
        }
        PlanOutcome::Errored { execution, step, message } => format!("ERRORED ({execution} at '{step}'): {message}"),
        PlanOutcome::Skipped { execution } => format!("SKIPPED ({execution})"),
    }
}

pub fn report_to_json(report: &PlanReport) -> Json {
    let executions: serde_json::Map<String, Json> = report
        .states
        .iter()
        .map(|(id, state)| (id.as_str().to_string(), state_to_json(state)))
        .collect();

    json!({
        "executions": executions,
        "outcome": outcome_to_json(&report.outcome),
    })
}

fn state_to_json(state: &TerminalState) -> Json {
    match state {
        TerminalState::Complete { globals, pipeline_parameters } => json!({
            "status": "COMPLETE",
            "globals": globals,
            "pipelineParameters": pipeline_parameters,
        }),
        TerminalState::Paused { step, message } => json!({
            "status": "PAUSED",
            "step": step.as_str(),
            "message": message,
        }),
        TerminalState::Errored { step, message } => json!({
            "status": "ERRORED",
            "step": step.as_str(),
            "message": message,
        }),
        TerminalState::Skipped => json!({ "status": "SKIPPED" }),
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;

fn outcome_to_json(outcome: &PlanOutcome) -> Json {
    match outcome {
        PlanOutcome::Complete => json!({ "status": "COMPLETE" }),
        PlanOutcome::Paused { execution, step, message } => json!({
            "status": "PAUSED",
            "execution": execution.as_str(),
            "step": step.as_str(),
            "message": message,
        }),
        PlanOutcome::Errored { execution, step, message } => json!({
            "status": "ERRORED",
            "execution": execution.as_str(),
            "step": step.as_str(),
            "message": message,
        }),
        PlanOutcome::Skipped { execution } => json!({
            "status": "SKIPPED",
            "execution": execution.as_str(),
        }),
    }
}
