//! Repository trait abstractions over the persistent store.
//!
//! The engine reads and writes entities exclusively through these traits;
//! implementations are provided by downstream crates (and by in-memory test
//! doubles). Row-level consistency of concurrent writers is the store's
//! responsibility, not the engine's.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use cloakflow_models::{Job, JobExecution, Profile, Proxy, Session, SessionStatus, Workflow};

use crate::error::Result;

// ── Creation requests ────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize)]
pub struct NewSession {
    pub profile_id: i64,
    #[serde(default)]
    pub proxy_id: Option<i64>,
    #[serde(default)]
    pub status: Option<SessionStatus>,
    #[serde(default)]
    pub meta: Option<Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewJob {
    #[serde(rename = "type")]
    pub job_type: String,
    pub payload: Value,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

// ── Store traits ─────────────────────────────────────────────────────

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, id: i64) -> Result<Option<Profile>>;
}

#[async_trait]
pub trait ProxyStore: Send + Sync {
    async fn get_proxy(&self, id: i64) -> Result<Option<Proxy>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, request: NewSession) -> Result<Session>;
    async fn get_session(&self, id: i64) -> Result<Option<Session>>;
    async fn update_session(&self, session: &Session) -> Result<()>;
    /// The profile's currently running session, if any. Used to resolve the
    /// proxy a job execution should go out through.
    async fn find_running_session(&self, profile_id: i64) -> Result<Option<Session>>;
}

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create_job(&self, request: NewJob) -> Result<Job>;
    async fn get_job(&self, id: i64) -> Result<Option<Job>>;
    async fn update_job(&self, job: &Job) -> Result<()>;
}

#[async_trait]
pub trait ExecutionStore: Send + Sync {
    async fn create_execution(&self, job_id: i64, profile_id: i64) -> Result<JobExecution>;
    async fn get_execution(&self, id: i64) -> Result<Option<JobExecution>>;
    async fn update_execution(&self, execution: &JobExecution) -> Result<()>;
}

#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn get_workflow(&self, id: i64) -> Result<Option<Workflow>>;
}

/// Binary artifact persistence (screenshots). Returns the stored path.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn save_screenshot(&self, execution_id: i64, bytes: &[u8]) -> Result<String>;
}

/// Everything the run handlers need from the store, as one object-safe bound.
pub trait Datastore:
    ProfileStore
    + ProxyStore
    + SessionStore
    + JobStore
    + ExecutionStore
    + WorkflowStore
    + ArtifactStore
{
}

impl<T> Datastore for T where
    T: ProfileStore
        + ProxyStore
        + SessionStore
        + JobStore
        + ExecutionStore
        + WorkflowStore
        + ArtifactStore
{
}
