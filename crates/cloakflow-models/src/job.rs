use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Done,
    Failed,
}

/// A unit of work request, queued for background processing.
///
/// Created by the API layer; mutated only by the dispatcher's task handlers;
/// never deleted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i64,
    #[serde(rename = "type")]
    pub job_type: String,
    pub payload: Value,
    pub status: JobStatus,
    pub attempts: u32,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(id: i64, job_type: impl Into<String>, payload: Value) -> Self {
        Self {
            id,
            job_type: job_type.into(),
            payload,
            status: JobStatus::Queued,
            attempts: 0,
            scheduled_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, JobStatus::Done | JobStatus::Failed)
    }

    /// Mark the job as picked up by a worker. Returns false (and leaves the
    /// job untouched) unless it is currently queued.
    pub fn begin_processing(&mut self) -> bool {
        if self.status != JobStatus::Queued {
            return false;
        }
        self.status = JobStatus::Processing;
        self.attempts += 1;
        true
    }

    pub fn finish(&mut self) -> bool {
        if self.status != JobStatus::Processing {
            return false;
        }
        self.status = JobStatus::Done;
        true
    }

    pub fn fail(&mut self) -> bool {
        if self.status != JobStatus::Processing {
            return false;
        }
        self.status = JobStatus::Failed;
        true
    }
}
