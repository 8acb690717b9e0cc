//! run_workflow task body: interpret a workflow graph against one visible
//! browser session.

use serde_json::Value;
use tracing::{error, info};

use cloakflow_traits::{EngineError, LaunchConfig, Result};

use crate::engine::run_graph;
use crate::inject;

use super::{PageGuard, RunContext, require_id, resolve_proxy};

pub(crate) async fn run_workflow(ctx: &RunContext, payload: &Value) -> Result<Value> {
    let workflow_id = require_id(payload, "workflow_id")?;
    let profile_id = require_id(payload, "profile_id")?;

    let workflow = ctx
        .store
        .get_workflow(workflow_id)
        .await?
        .ok_or_else(|| EngineError::not_found("workflow", workflow_id))?;
    let profile = ctx
        .store
        .get_profile(profile_id)
        .await?
        .ok_or_else(|| EngineError::not_found("profile", profile_id))?;

    info!(workflow_id, profile_id, workflow = %workflow.name, "Starting workflow");

    let proxy = resolve_proxy(ctx, profile_id).await?;
    let fingerprint = profile.fingerprint_data();

    let config = LaunchConfig {
        // Visible so the operator can watch the automation run.
        headless: false,
        viewport: inject::viewport_from(&fingerprint),
        user_agent: inject::user_agent_from(&fingerprint),
        proxy,
        init_scripts: inject::assemble_init_scripts(ctx.scripts.as_ref(), &fingerprint),
    };

    let mut guard = PageGuard::new(ctx.browser.launch(config).await?);
    let report = run_graph(guard.page(), &workflow.graph).await;
    guard.release().await;

    if report.success {
        info!(
            workflow_id,
            profile_id,
            nodes = report.results.len(),
            "Workflow completed"
        );
    } else {
        error!(workflow_id, profile_id, errors = ?report.errors, "Workflow finished with errors");
    }

    // Partial results survive a fail-fast abort; the report is the task
    // result either way.
    Ok(serde_json::to_value(&report)?)
}
