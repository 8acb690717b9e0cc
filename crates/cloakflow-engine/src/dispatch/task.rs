use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The four task bodies the dispatcher knows how to run. An unknown task
/// type cannot be enqueued by construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    StartSession,
    StopSession,
    RunJobExecution,
    RunWorkflow,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::StartSession => "start_session",
            TaskKind::StopSession => "stop_session",
            TaskKind::RunJobExecution => "run_job_execution",
            TaskKind::RunWorkflow => "run_workflow",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-task execution budget and result-retention windows. Defaults mirror
/// the production queue settings: 30 minute timeout, results kept one hour,
/// failures kept a day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueOptions {
    pub timeout: Duration,
    pub result_retention: Duration,
    pub failure_retention: Duration,
}

impl Default for EnqueueOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30 * 60),
            result_retention: Duration::from_secs(3600),
            failure_retention: Duration::from_secs(86400),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// One queued unit of work as the dispatcher tracks it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub kind: TaskKind,
    pub payload: Value,
    pub status: TaskStatus,
    pub created_at: i64,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub options: EnqueueOptions,
}

impl Task {
    pub fn new(kind: TaskKind, payload: Value, options: EnqueueOptions) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            payload,
            status: TaskStatus::Pending,
            created_at: chrono::Utc::now().timestamp_millis(),
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
            options,
        }
    }

    /// Mark task as picked up by a worker
    pub fn start(&mut self) {
        self.status = TaskStatus::Running;
        self.started_at = Some(chrono::Utc::now().timestamp_millis());
    }

    /// Mark task as completed with its result
    pub fn complete(&mut self, result: Value) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(chrono::Utc::now().timestamp_millis());
        self.result = Some(result);
    }

    /// Mark task as failed
    pub fn fail(&mut self, error: String) {
        self.status = TaskStatus::Failed;
        self.completed_at = Some(chrono::Utc::now().timestamp_millis());
        self.error = Some(error);
    }

    /// How long a finished record stays observable before the purge sweep
    /// removes it.
    pub fn retention(&self) -> Duration {
        match self.status {
            TaskStatus::Failed => self.options.failure_retention,
            _ => self.options.result_retention,
        }
    }
}
