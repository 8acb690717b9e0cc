//! In-memory task queue.
//!
//! Pending tasks are held FIFO; workers block on a notify handle until work
//! arrives. Finished records are retained for the task's retention window and
//! swept lazily on access. A closed queue stands in for an unreachable
//! broker: pushes fail synchronously and draining workers shut down.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

use cloakflow_traits::{EngineError, Result};

use super::task::{Task, TaskStatus};

#[derive(Default, Debug)]
struct QueueState {
    pending: VecDeque<Task>,
    running: HashMap<String, Task>,
    // finished task -> purge deadline (epoch millis)
    finished: HashMap<String, (Task, i64)>,
}

#[derive(Debug)]
pub struct TaskQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    closed: AtomicBool,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Refuse new work and wake every blocked worker so it can drain out.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Add a task to the pending queue. Fails synchronously when the queue
    /// is closed; nothing is enqueued in that case.
    pub fn push(&self, task: Task) -> Result<String> {
        if self.is_closed() {
            return Err(EngineError::QueueUnavailable(
                "queue is closed, task was not enqueued".to_string(),
            ));
        }

        let task_id = task.id.clone();
        {
            let mut state = self.state.lock().expect("queue mutex poisoned");
            state.pending.push_back(task);
        }
        self.notify.notify_one();
        Ok(task_id)
    }

    /// Pop the next pending task, blocking until one is available. Returns
    /// `None` once the queue is closed and drained, which is the worker's
    /// signal to stop.
    pub async fn pop(&self) -> Option<Task> {
        loop {
            if let Some(task) = self.try_pop() {
                return Some(task);
            }
            if self.is_closed() {
                return None;
            }
            self.notify.notified().await;
        }
    }

    /// Atomically move the first pending task to running, marking it started.
    fn try_pop(&self) -> Option<Task> {
        let mut state = self.state.lock().expect("queue mutex poisoned");
        let mut task = state.pending.pop_front()?;
        task.start();
        state.running.insert(task.id.clone(), task.clone());
        Some(task)
    }

    pub fn complete_task(&self, task_id: &str, result: serde_json::Value) {
        self.finish_task(task_id, |task| task.complete(result));
    }

    pub fn fail_task(&self, task_id: &str, error: String) {
        self.finish_task(task_id, |task| task.fail(error));
    }

    fn finish_task(&self, task_id: &str, apply: impl FnOnce(&mut Task)) {
        let mut state = self.state.lock().expect("queue mutex poisoned");
        let Some(mut task) = state.running.remove(task_id) else {
            return;
        };
        apply(&mut task);

        let now = chrono::Utc::now().timestamp_millis();
        let purge_at = now + task.retention().as_millis() as i64;
        state.finished.insert(task_id.to_string(), (task, purge_at));
        Self::purge_expired_locked(&mut state, now);
    }

    /// Look a task up in any table. Expired finished records are gone.
    pub fn get_task(&self, task_id: &str) -> Option<Task> {
        let mut state = self.state.lock().expect("queue mutex poisoned");
        Self::purge_expired_locked(&mut state, chrono::Utc::now().timestamp_millis());

        if let Some(task) = state.running.get(task_id) {
            return Some(task.clone());
        }
        if let Some((task, _)) = state.finished.get(task_id) {
            return Some(task.clone());
        }
        state.pending.iter().find(|t| t.id == task_id).cloned()
    }

    pub fn has_pending_tasks(&self) -> bool {
        !self
            .state
            .lock()
            .expect("queue mutex poisoned")
            .pending
            .is_empty()
    }

    /// Drop finished records whose retention window has elapsed.
    pub fn purge_expired(&self) -> usize {
        let mut state = self.state.lock().expect("queue mutex poisoned");
        Self::purge_expired_locked(&mut state, chrono::Utc::now().timestamp_millis())
    }

    fn purge_expired_locked(state: &mut QueueState, now: i64) -> usize {
        let before = state.finished.len();
        state.finished.retain(|_, (_, purge_at)| *purge_at > now);
        before - state.finished.len()
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}
