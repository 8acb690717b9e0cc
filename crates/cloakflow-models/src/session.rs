use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Running,
    Stopped,
}

/// A logical browser identity instance bound to one Profile and optionally
/// one Proxy.
///
/// idle → running → stopped, re-enterable: a stopped session can be started
/// again. Transitions happen only inside the dispatcher's task handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: i64,
    pub profile_id: i64,
    pub proxy_id: Option<i64>,
    pub status: SessionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub meta: Value,
}

impl Session {
    pub fn new(id: i64, profile_id: i64, proxy_id: Option<i64>) -> Self {
        Self {
            id,
            profile_id,
            proxy_id,
            status: SessionStatus::Idle,
            started_at: None,
            stopped_at: None,
            meta: Value::Null,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    /// Transition to running and stamp `started_at`. Applies from idle and
    /// from stopped (restart); a no-op while already running.
    pub fn start(&mut self) -> bool {
        if self.status == SessionStatus::Running {
            return false;
        }
        self.status = SessionStatus::Running;
        self.started_at = Some(Utc::now());
        self.stopped_at = None;
        true
    }

    /// Transition to stopped and stamp `stopped_at`. Only a running session
    /// can stop.
    pub fn stop(&mut self) -> bool {
        if self.status != SessionStatus::Running {
            return false;
        }
        self.status = SessionStatus::Stopped;
        self.stopped_at = Some(Utc::now());
        true
    }
}
