//! Top-level task bodies the dispatcher's workers run.
//!
//! Each handler loads its entities through the store traits, drives the
//! lifecycle state machine, and writes results/errors back. All entity
//! transitions happen here and nowhere else.

pub mod execution;
pub mod session;
pub mod workflow;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use cloakflow_models::UpdateEvent;
use cloakflow_traits::{
    BrowserAutomation, BrowserPage, CredentialDecryptor, Datastore, EngineError, EventChannel,
    FingerprintScriptProvider, ProxySettings, Result,
};

use crate::dispatch::{TaskHandler, TaskKind};

/// The collaborators a task body runs against, wired in once at startup and
/// shared by every worker.
#[derive(Clone)]
pub struct RunContext {
    pub store: Arc<dyn Datastore>,
    pub browser: Arc<dyn BrowserAutomation>,
    pub scripts: Arc<dyn FingerprintScriptProvider>,
    pub decryptor: Arc<dyn CredentialDecryptor>,
    pub events: Arc<dyn EventChannel>,
}

impl RunContext {
    /// Emit an update event. Emission failure is logged and never fails the
    /// task that produced the event.
    pub(crate) async fn emit(&self, event: UpdateEvent) {
        let name = event.name.clone();
        if let Err(err) = self.events.send(event).await {
            warn!(event = %name, error = %err, "Failed to emit update event");
        }
    }
}

#[async_trait]
impl TaskHandler for RunContext {
    async fn run(&self, kind: TaskKind, payload: Value) -> Result<Value> {
        match kind {
            TaskKind::StartSession => session::start_session(self, &payload).await,
            TaskKind::StopSession => session::stop_session(self, &payload).await,
            TaskKind::RunJobExecution => execution::run_job_execution(self, &payload).await,
            TaskKind::RunWorkflow => workflow::run_workflow(self, &payload).await,
        }
    }
}

pub(crate) fn require_id(payload: &Value, key: &str) -> Result<i64> {
    payload
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| EngineError::validation(format!("{key} required")))
}

/// Proxy settings for a profile: its running session's proxy, if that proxy
/// is active. The credential is decrypted through the external capability;
/// decryption failure downgrades to no credential rather than failing the
/// task.
pub(crate) async fn resolve_proxy(
    ctx: &RunContext,
    profile_id: i64,
) -> Result<Option<ProxySettings>> {
    let Some(session) = ctx.store.find_running_session(profile_id).await? else {
        return Ok(None);
    };
    let Some(proxy_id) = session.proxy_id else {
        return Ok(None);
    };
    let Some(proxy) = ctx.store.get_proxy(proxy_id).await? else {
        return Ok(None);
    };
    if !proxy.active {
        return Ok(None);
    }

    let password = match &proxy.password_encrypted {
        Some(ciphertext) => match ctx.decryptor.decrypt(ciphertext) {
            Ok(plaintext) => Some(plaintext),
            Err(err) => {
                warn!(proxy_id, error = %err, "Failed to decrypt proxy credential, continuing without it");
                None
            }
        },
        None => None,
    };

    Ok(Some(ProxySettings {
        server: proxy.server_url(),
        username: proxy.username.clone(),
        password,
    }))
}

/// Scoped ownership of a launched page. `release()` closes the whole browser
/// stack on the normal and error paths; if the task future is dropped by the
/// dispatcher's timeout abort first, `Drop` schedules the close instead, so
/// the browser is released on every exit path.
pub(crate) struct PageGuard {
    page: Option<Box<dyn BrowserPage>>,
}

impl PageGuard {
    pub fn new(page: Box<dyn BrowserPage>) -> Self {
        Self { page: Some(page) }
    }

    pub fn page(&mut self) -> &mut dyn BrowserPage {
        self.page.as_mut().expect("page already released").as_mut()
    }

    pub async fn release(mut self) {
        if let Some(mut page) = self.page.take() {
            if let Err(err) = page.close().await {
                warn!(error = %err, "Failed to close browser page");
            }
        }
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if let Some(mut page) = self.page.take() {
            // Reached only when the owning future was cancelled mid-task;
            // the close must run on a live runtime.
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    let _ = page.close().await;
                });
            }
        }
    }
}
