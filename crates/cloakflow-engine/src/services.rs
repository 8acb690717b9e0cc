//! Entity-creation services.
//!
//! The HTTP surface (external) calls these to persist an entity and enqueue
//! its follow-up task in one step. The dispatcher client is passed in
//! explicitly. An unreachable queue is a **degraded success**: the entity is
//! already persisted, so the missing enqueue comes back as a warning on the
//! response, never as an error.

use serde_json::{Value, json};
use tracing::warn;

use cloakflow_models::{Job, JobExecution, Session, SessionStatus};
use cloakflow_traits::{Datastore, EngineError, NewJob, NewSession, Result};

use crate::dispatch::{Dispatcher, EnqueueOptions, TaskKind};

#[derive(Debug)]
pub struct SessionCreated {
    pub session: Session,
    pub warning: Option<String>,
}

pub struct JobCreated {
    pub job: Job,
    pub executions: Vec<JobExecution>,
    pub warnings: Vec<String>,
}

/// Persist a session and enqueue its start task. The session is created with
/// the requested status; the start task is enqueued unless the caller asked
/// for an explicitly non-running session.
pub async fn create_session(
    store: &dyn Datastore,
    dispatcher: &Dispatcher,
    request: NewSession,
) -> Result<SessionCreated> {
    store
        .get_profile(request.profile_id)
        .await?
        .ok_or_else(|| EngineError::not_found("profile", request.profile_id))?;

    if let Some(proxy_id) = request.proxy_id {
        store
            .get_proxy(proxy_id)
            .await?
            .ok_or_else(|| EngineError::not_found("proxy", proxy_id))?;
    }

    let wants_start = matches!(request.status, None | Some(SessionStatus::Running));
    let session = store.create_session(request).await?;

    let mut warning = None;
    if wants_start {
        if let Err(err) = dispatcher.enqueue(
            TaskKind::StartSession,
            json!({"session_id": session.id}),
            EnqueueOptions::default(),
        ) {
            warn!(session_id = session.id, error = %err, "Session created but start task was not enqueued");
            warning = Some(format!("failed to enqueue start_session task: {err}"));
        }
    }

    Ok(SessionCreated { session, warning })
}

/// Enqueue a stop task for an existing session. Queue failure is returned as
/// a warning; the stop can be requested again later.
pub async fn request_session_stop(
    store: &dyn Datastore,
    dispatcher: &Dispatcher,
    session_id: i64,
) -> Result<Option<String>> {
    store
        .get_session(session_id)
        .await?
        .ok_or_else(|| EngineError::not_found("session", session_id))?;

    match dispatcher.enqueue(
        TaskKind::StopSession,
        json!({"session_id": session_id}),
        EnqueueOptions::default(),
    ) {
        Ok(_) => Ok(None),
        Err(err) => {
            warn!(session_id, error = %err, "Stop requested but task was not enqueued");
            Ok(Some(format!("failed to enqueue stop_session task: {err}")))
        }
    }
}

/// Persist a job, create one execution per requested profile, and enqueue a
/// run task per execution. Profiles that do not exist get no execution; every
/// enqueue failure is collected as a warning.
pub async fn create_job(
    store: &dyn Datastore,
    dispatcher: &Dispatcher,
    request: NewJob,
    profile_ids: &[i64],
) -> Result<JobCreated> {
    let job = store.create_job(request).await?;

    let mut executions = Vec::new();
    let mut warnings = Vec::new();

    for &profile_id in profile_ids {
        // Every execution must reference an existing profile at creation.
        if store.get_profile(profile_id).await?.is_none() {
            warnings.push(format!("profile {profile_id} not found, no execution created"));
            continue;
        }

        let execution = store.create_execution(job.id, profile_id).await?;

        let enqueued = if job.job_type == "run_workflow" {
            match job.payload.get("workflow_id").and_then(Value::as_i64) {
                Some(workflow_id) => dispatcher
                    .enqueue(
                        TaskKind::RunWorkflow,
                        json!({"workflow_id": workflow_id, "profile_id": profile_id}),
                        EnqueueOptions::default(),
                    )
                    .map(|_| ()),
                None => Err(EngineError::validation(
                    "run_workflow job payload missing workflow_id",
                )),
            }
        } else {
            dispatcher
                .enqueue(
                    TaskKind::RunJobExecution,
                    json!({"job_execution_id": execution.id}),
                    EnqueueOptions::default(),
                )
                .map(|_| ())
        };

        if let Err(err) = enqueued {
            warn!(job_id = job.id, profile_id, error = %err, "Execution created but run task was not enqueued");
            warnings.push(format!(
                "failed to enqueue task for profile {profile_id}: {err}"
            ));
        }

        executions.push(execution);
    }

    Ok(JobCreated {
        job,
        executions,
        warnings,
    })
}
