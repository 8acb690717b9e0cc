//! run_job_execution task body: drive one headless automation pass for one
//! profile and record the outcome on the JobExecution.

use serde_json::{Value, json};
use tracing::{error, info, warn};

use cloakflow_models::{Job, JobExecution, Profile, UpdateEvent};
use cloakflow_traits::{EngineError, LaunchConfig, Result};

use crate::engine::actions::NAVIGATION_TIMEOUT;
use crate::inject;

use super::{PageGuard, RunContext, require_id, resolve_proxy};

const DEFAULT_TEST_URL: &str = "https://example.com";

pub(crate) async fn run_job_execution(ctx: &RunContext, payload: &Value) -> Result<Value> {
    let execution_id = require_id(payload, "job_execution_id")?;

    let mut execution = ctx
        .store
        .get_execution(execution_id)
        .await?
        .ok_or_else(|| EngineError::not_found("job execution", execution_id))?;

    let profile = match ctx.store.get_profile(execution.profile_id).await? {
        Some(profile) => profile,
        None => {
            let err = EngineError::not_found("profile", execution.profile_id);
            abort_execution(ctx, &mut execution, &err).await?;
            return Err(err);
        }
    };

    let mut job = match ctx.store.get_job(execution.job_id).await? {
        Some(job) => job,
        None => {
            let err = EngineError::not_found("job", execution.job_id);
            abort_execution(ctx, &mut execution, &err).await?;
            return Err(err);
        }
    };

    if execution.start() {
        ctx.store.update_execution(&execution).await?;
        ctx.emit(UpdateEvent::job_execution_update(
            execution.id,
            json!({
                "status": execution.status,
                "startedAt": execution.started_at,
            }),
        ))
        .await;
    } else {
        warn!(execution_id, status = ?execution.status, "Ignoring start for execution not pending");
    }

    if job.begin_processing() {
        ctx.store.update_job(&job).await?;
    }

    match drive_execution(ctx, &execution, &job, &profile).await {
        Ok(result) => {
            execution.complete(result.clone());
            ctx.store.update_execution(&execution).await?;
            ctx.emit(UpdateEvent::job_execution_update(
                execution.id,
                json!({
                    "status": execution.status,
                    "completedAt": execution.completed_at,
                    "result": execution.result,
                }),
            ))
            .await;

            if job.finish() {
                ctx.store.update_job(&job).await?;
            }

            info!(execution_id, "Job execution completed");
            Ok(result)
        }
        Err(err) => {
            execution.fail(err.to_string());
            ctx.store.update_execution(&execution).await?;
            ctx.emit(UpdateEvent::job_execution_update(
                execution.id,
                json!({
                    "status": execution.status,
                    "error": execution.error,
                }),
            ))
            .await;

            if job.fail() {
                ctx.store.update_job(&job).await?;
            }

            error!(execution_id, error = %err, "Job execution failed");
            Err(err)
        }
    }
}

/// Mark an execution failed before it ever started (missing referenced
/// entity) and surface the failure on the channel.
async fn abort_execution(
    ctx: &RunContext,
    execution: &mut JobExecution,
    err: &EngineError,
) -> Result<()> {
    if execution.fail(err.to_string()) {
        ctx.store.update_execution(execution).await?;
        ctx.emit(UpdateEvent::job_execution_update(
            execution.id,
            json!({
                "status": execution.status,
                "error": execution.error,
            }),
        ))
        .await;
    }
    Ok(())
}

/// Launch, navigate, screenshot. The page is released on every exit path.
async fn drive_execution(
    ctx: &RunContext,
    execution: &JobExecution,
    job: &Job,
    profile: &Profile,
) -> Result<Value> {
    let proxy = resolve_proxy(ctx, profile.id).await?;
    let fingerprint = profile.fingerprint_data();

    let config = LaunchConfig {
        headless: true,
        viewport: inject::viewport_from(&fingerprint),
        user_agent: inject::user_agent_from(&fingerprint),
        proxy,
        init_scripts: inject::assemble_init_scripts(ctx.scripts.as_ref(), &fingerprint),
    };

    let mut guard = PageGuard::new(ctx.browser.launch(config).await?);

    let url = job
        .payload
        .get("url")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_TEST_URL)
        .to_string();
    info!(execution_id = execution.id, url = %url, "Navigating");

    let outcome = capture(ctx, &mut guard, execution, &url).await;
    guard.release().await;
    outcome
}

async fn capture(
    ctx: &RunContext,
    guard: &mut PageGuard,
    execution: &JobExecution,
    url: &str,
) -> Result<Value> {
    let settled = guard.page().navigate(url, NAVIGATION_TIMEOUT).await?;
    let bytes = guard.page().screenshot(None).await?;
    let path = ctx.store.save_screenshot(execution.id, &bytes).await?;

    Ok(json!({"screenshot": path, "url": settled}))
}
