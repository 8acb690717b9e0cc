use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// One execution of a Job against one Profile.
///
/// Status transitions are monotonic: pending → running → {completed, failed}.
/// A terminal execution never moves again; every terminal execution carries a
/// non-null `completed_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExecution {
    pub id: i64,
    pub job_id: i64,
    pub profile_id: i64,
    pub session_id: Option<i64>,
    pub status: ExecutionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl JobExecution {
    pub fn new(id: i64, job_id: i64, profile_id: i64) -> Self {
        Self {
            id,
            job_id,
            profile_id,
            session_id: None,
            status: ExecutionStatus::Pending,
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            ExecutionStatus::Completed | ExecutionStatus::Failed
        )
    }

    /// Mark the execution as running and stamp `started_at`.
    pub fn start(&mut self) -> bool {
        if self.status != ExecutionStatus::Pending {
            return false;
        }
        self.status = ExecutionStatus::Running;
        self.started_at = Some(Utc::now());
        true
    }

    /// Mark the execution as completed with its result payload.
    pub fn complete(&mut self, result: Value) -> bool {
        if self.status != ExecutionStatus::Running {
            return false;
        }
        self.status = ExecutionStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.result = Some(result);
        true
    }

    /// Mark the execution as failed with the error text captured.
    ///
    /// Allowed from both pending and running: a handler that cannot even
    /// start the execution (missing profile, missing session) still has to
    /// record the failure.
    pub fn fail(&mut self, error: impl Into<String>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = ExecutionStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.error = Some(error.into());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_happy_path() {
        let mut exec = JobExecution::new(1, 10, 100);
        assert_eq!(exec.status, ExecutionStatus::Pending);
        assert!(exec.completed_at.is_none());

        assert!(exec.start());
        assert!(exec.started_at.is_some());
        assert!(exec.completed_at.is_none());

        assert!(exec.complete(serde_json::json!({"screenshot": "shots/1.png"})));
        assert_eq!(exec.status, ExecutionStatus::Completed);
        assert!(exec.completed_at.is_some());
    }

    #[test]
    fn test_monotonic_failure_path() {
        let mut exec = JobExecution::new(2, 10, 100);
        assert!(exec.start());
        assert!(exec.fail("navigation timed out"));
        assert_eq!(exec.status, ExecutionStatus::Failed);
        assert_eq!(exec.error.as_deref(), Some("navigation timed out"));
        assert!(exec.completed_at.is_some());
    }

    #[test]
    fn test_no_backward_transition() {
        let mut exec = JobExecution::new(3, 10, 100);
        exec.start();
        exec.complete(Value::Null);

        assert!(!exec.start());
        assert!(!exec.fail("too late"));
        assert_eq!(exec.status, ExecutionStatus::Completed);
        assert!(exec.error.is_none());
    }

    #[test]
    fn test_fail_before_start_still_stamps_completed_at() {
        let mut exec = JobExecution::new(4, 10, 100);
        assert!(exec.fail("profile 100 not found"));
        assert!(exec.started_at.is_none());
        assert!(exec.completed_at.is_some());
    }

    #[test]
    fn test_wire_shape() {
        let exec = JobExecution::new(5, 10, 100);
        let value = serde_json::to_value(&exec).unwrap();
        assert_eq!(value["jobId"], 10);
        assert_eq!(value["profileId"], 100);
        assert_eq!(value["status"], "pending");
        assert!(value["startedAt"].is_null());
    }
}
