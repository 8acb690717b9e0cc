//! start_session / stop_session task bodies.

use serde_json::{Value, json};
use tracing::{info, warn};

use cloakflow_models::UpdateEvent;
use cloakflow_traits::{EngineError, Result};

use super::{RunContext, require_id};

pub(crate) async fn start_session(ctx: &RunContext, payload: &Value) -> Result<Value> {
    let session_id = require_id(payload, "session_id")?;

    let mut session = ctx
        .store
        .get_session(session_id)
        .await?
        .ok_or_else(|| EngineError::not_found("session", session_id))?;

    // The bound profile must still exist before the session may run.
    ctx.store
        .get_profile(session.profile_id)
        .await?
        .ok_or_else(|| EngineError::not_found("profile", session.profile_id))?;

    if session.start() {
        ctx.store.update_session(&session).await?;
    } else {
        warn!(session_id, status = ?session.status, "Ignoring start for session already running");
    }

    ctx.emit(UpdateEvent::session_update(
        session.id,
        json!({
            "status": session.status,
            "startedAt": session.started_at,
        }),
    ))
    .await;

    info!(session_id, profile_id = session.profile_id, "Session started");
    Ok(json!({"status": session.status}))
}

pub(crate) async fn stop_session(ctx: &RunContext, payload: &Value) -> Result<Value> {
    let session_id = require_id(payload, "session_id")?;

    let mut session = ctx
        .store
        .get_session(session_id)
        .await?
        .ok_or_else(|| EngineError::not_found("session", session_id))?;

    if session.stop() {
        ctx.store.update_session(&session).await?;
    } else {
        warn!(session_id, status = ?session.status, "Ignoring stop for session not running");
    }

    ctx.emit(UpdateEvent::session_update(
        session.id,
        json!({
            "status": session.status,
            "stoppedAt": session.stopped_at,
        }),
    ))
    .await;

    info!(session_id, "Session stopped");
    Ok(json!({"status": session.status}))
}
