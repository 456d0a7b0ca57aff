// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle audit callbacks emitted by the pipeline executor (§4.4, §4.6).

use crate::ids::{ExecutionId, PipelineDefId, StepId};
use crate::response::PipelineStepResponse;
use parking_lot::Mutex;
use std::fmt;
use std::time::Instant;

/// Lifecycle callbacks the executor emits as it runs a pipeline (§4.4).
/// `pipelineListener` callbacks may be invoked concurrently from different
/// executions and must be internally synchronized (§5).
pub trait PipelineListener: Send + Sync {
    fn pipeline_started(&self, execution: &ExecutionId, pipeline: &PipelineDefId);
    fn step_started(&self, execution: &ExecutionId, pipeline: &PipelineDefId, step: &StepId);
    fn step_finished(
        &self,
        execution: &ExecutionId,
        pipeline: &PipelineDefId,
        step: &StepId,
        result: &PipelineStepResponse,
    );
    fn pipeline_finished(&self, execution: &ExecutionId, pipeline: &PipelineDefId);
    fn pipeline_paused(&self, execution: &ExecutionId, pipeline: &PipelineDefId, step: &StepId);
    fn pipeline_errored(
        &self,
        execution: &ExecutionId,
        pipeline: &PipelineDefId,
        step: &StepId,
        message: &str,
    );
}

impl fmt::Debug for dyn PipelineListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<PipelineListener>")
    }
}

/// One recorded lifecycle event, kept for test assertions and for driver
/// reporting (§7: "a per-execution terminal state with the last observed
/// step id and message").
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub execution: ExecutionId,
    pub pipeline: PipelineDefId,
    pub step: Option<StepId>,
    pub kind: AuditKind,
    pub at: Instant,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuditKind {
    PipelineStarted,
    StepStarted,
    StepFinished,
    PipelineFinished,
    PipelinePaused,
    PipelineErrored(String),
}

/// Default [`PipelineListener`] implementation: records timing into an
/// in-memory audit list (§4.4: "Default listener records timing into the
/// context's audit list") and logs via `tracing`, mirroring the teacher's
/// dual logger + event emission pattern (`engine/src/activity_logger.rs`).
#[derive(Debug, Default)]
pub struct AuditTrail {
    entries: Mutex<Vec<AuditEntry>>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().clone()
    }

    fn push(&self, entry: AuditEntry) {
        self.entries.lock().push(entry);
    }
}

impl PipelineListener for AuditTrail {
    fn pipeline_started(&self, execution: &ExecutionId, pipeline: &PipelineDefId) {
        tracing::info!(execution = %execution, pipeline = %pipeline, "pipeline started");
        self.push(AuditEntry {
            execution: execution.clone(),
            pipeline: pipeline.clone(),
            step: None,
            kind: AuditKind::PipelineStarted,
            at: Instant::now(),
        });
    }

    fn step_started(&self, execution: &ExecutionId, pipeline: &PipelineDefId, step: &StepId) {
        tracing::debug!(execution = %execution, pipeline = %pipeline, step = %step, "step started");
        self.push(AuditEntry {
            execution: execution.clone(),
            pipeline: pipeline.clone(),
            step: Some(step.clone()),
            kind: AuditKind::StepStarted,
            at: Instant::now(),
        });
    }

    fn step_finished(
        &self,
        execution: &ExecutionId,
        pipeline: &PipelineDefId,
        step: &StepId,
        _result: &PipelineStepResponse,
    ) {
        tracing::debug!(execution = %execution, pipeline = %pipeline, step = %step, "step finished");
        self.push(AuditEntry {
            execution: execution.clone(),
            pipeline: pipeline.clone(),
            step: Some(step.clone()),
            kind: AuditKind::StepFinished,
            at: Instant::now(),
        });
    }

    fn pipeline_finished(&self, execution: &ExecutionId, pipeline: &PipelineDefId) {
        tracing::info!(execution = %execution, pipeline = %pipeline, "pipeline finished");
        self.push(AuditEntry {
            execution: execution.clone(),
            pipeline: pipeline.clone(),
            step: None,
            kind: AuditKind::PipelineFinished,
            at: Instant::now(),
        });
    }

    fn pipeline_paused(&self, execution: &ExecutionId, pipeline: &PipelineDefId, step: &StepId) {
        tracing::warn!(execution = %execution, pipeline = %pipeline, step = %step, "pipeline paused");
        self.push(AuditEntry {
            execution: execution.clone(),
            pipeline: pipeline.clone(),
            step: Some(step.clone()),
            kind: AuditKind::PipelinePaused,
            at: Instant::now(),
        });
    }

    fn pipeline_errored(
        &self,
        execution: &ExecutionId,
        pipeline: &PipelineDefId,
        step: &StepId,
        message: &str,
    ) {
        tracing::error!(execution = %execution, pipeline = %pipeline, step = %step, %message, "pipeline errored");
        self.push(AuditEntry {
            execution: execution.clone(),
            pipeline: pipeline.clone(),
            step: Some(step.clone()),
            kind: AuditKind::PipelineErrored(message.to_string()),
            at: Instant::now(),
        });
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
