//! Queue-based task dispatcher.
//!
//! Accepts `(task kind, payload)` pairs and schedules them onto a pool of
//! workers. Each worker runs one task at a time to completion under the
//! task's timeout budget; on expiry the task future is force-aborted and the
//! task is marked failed. Delivery is at-least-once to exactly one worker
//! with no dedup and no implicit retry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use cloakflow_traits::{EngineError, Result};

use super::queue::TaskQueue;
use super::task::{EnqueueOptions, Task, TaskKind, TaskStatus};

/// A task body. The dispatcher is agnostic to what runs inside; the engine
/// wires its run handlers in through this trait.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn run(&self, kind: TaskKind, payload: Value) -> Result<Value>;
}

/// Handle returned by `enqueue`: the task id plus a status lookup bound to
/// the queue the task went into.
#[derive(Clone, Debug)]
pub struct TaskHandle {
    id: String,
    queue: Arc<TaskQueue>,
}

impl TaskHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current task record, or `None` once the retention window has purged
    /// it.
    pub fn task(&self) -> Option<Task> {
        self.queue.get_task(&self.id)
    }

    pub fn status(&self) -> Option<TaskStatus> {
        self.task().map(|t| t.status)
    }
}

/// The dispatcher client. Cheap to clone; pass it explicitly into every
/// component that needs to enqueue. There is no process-wide singleton.
#[derive(Clone)]
pub struct Dispatcher {
    queue: Arc<TaskQueue>,
    handler: Arc<dyn TaskHandler>,
    num_workers: usize,
    running: Arc<Mutex<bool>>,
}

impl Dispatcher {
    pub fn new(handler: Arc<dyn TaskHandler>, num_workers: usize) -> Self {
        Self {
            queue: Arc::new(TaskQueue::new()),
            handler,
            num_workers: num_workers.max(1),
            running: Arc::new(Mutex::new(false)),
        }
    }

    /// Enqueue a task. Fails synchronously with `QueueUnavailable` when the
    /// queue is closed; the owning entity is expected to already be
    /// persisted, so callers treat that as a degraded success, not a hard
    /// failure.
    pub fn enqueue(
        &self,
        kind: TaskKind,
        payload: Value,
        options: EnqueueOptions,
    ) -> Result<TaskHandle> {
        let task = Task::new(kind, payload, options);
        let id = self.queue.push(task)?;
        debug!(task_id = %id, kind = %kind, "Task enqueued");
        Ok(TaskHandle {
            id,
            queue: self.queue.clone(),
        })
    }

    /// Spawn the worker pool. Idempotent.
    pub async fn start(&self) {
        let mut running = self.running.lock().await;
        if *running {
            return;
        }
        *running = true;
        drop(running);

        info!(num_workers = self.num_workers, "Starting workers");
        for worker_id in 0..self.num_workers {
            let worker = Worker {
                id: worker_id,
                queue: self.queue.clone(),
                handler: self.handler.clone(),
            };
            tokio::spawn(async move {
                worker.run_worker_loop().await;
            });
        }
    }

    /// Stop accepting work. Queued tasks drain; workers exit afterwards.
    pub async fn shutdown(&self) {
        self.queue.close();
        let mut running = self.running.lock().await;
        *running = false;
    }

    pub fn get_task(&self, task_id: &str) -> Option<Task> {
        self.queue.get_task(task_id)
    }

    pub fn purge_expired_results(&self) -> usize {
        self.queue.purge_expired()
    }
}

struct Worker {
    id: usize,
    queue: Arc<TaskQueue>,
    handler: Arc<dyn TaskHandler>,
}

impl Worker {
    async fn run_worker_loop(&self) {
        info!(worker_id = self.id, "Worker started");

        while let Some(task) = self.queue.pop().await {
            self.process_task(task).await;
        }

        info!(worker_id = self.id, "Worker stopped");
    }

    async fn process_task(&self, task: Task) {
        debug!(worker_id = self.id, task_id = %task.id, kind = %task.kind, "Processing task");

        let budget = task.options.timeout.max(Duration::from_millis(1));
        let body = self.handler.run(task.kind, task.payload.clone());

        match tokio::time::timeout(budget, body).await {
            Ok(Ok(result)) => {
                self.queue.complete_task(&task.id, result);
                info!(worker_id = self.id, task_id = %task.id, kind = %task.kind, "Task completed");
            }
            Ok(Err(err)) => {
                error!(worker_id = self.id, task_id = %task.id, error = %err, "Task failed");
                self.queue.fail_task(&task.id, err.to_string());
            }
            Err(_) => {
                // The task future was dropped mid-flight; resource guards
                // held inside the handler run their release on that drop.
                let err = EngineError::Timeout(budget);
                error!(worker_id = self.id, task_id = %task.id, error = %err, "Task force-aborted");
                self.queue.fail_task(&task.id, err.to_string());
            }
        }
    }
}
