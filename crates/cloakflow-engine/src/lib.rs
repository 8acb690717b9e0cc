//! Cloakflow Engine - background task orchestration for browser identity
//! profiles.
//!
//! The engine dispatches long-running browser automation tasks onto a worker
//! pool, drives the Job / JobExecution / Session lifecycle state machines
//! from inside those tasks, and interprets workflow graphs against live
//! browser sessions. Persistence, the browser itself, fingerprint script
//! generation, credential decryption and event delivery are external
//! collaborators reached through the `cloakflow-traits` interfaces.

pub mod dispatch;
pub mod engine;
pub mod handlers;
pub mod inject;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::{Dispatcher, EnqueueOptions, Task, TaskHandle, TaskKind, TaskStatus};
pub use engine::{NodeResult, TraversalReport, run_graph};
pub use handlers::RunContext;
pub use services::{JobCreated, SessionCreated, create_job, create_session, request_session_stop};

use std::sync::Arc;

use cloakflow_traits::{
    BrowserAutomation, CredentialDecryptor, Datastore, EventChannel, FingerprintScriptProvider,
};

/// Assembled engine: the run-handler context wired into a started dispatcher.
pub struct AutomationCore {
    pub context: Arc<RunContext>,
    pub dispatcher: Dispatcher,
}

impl AutomationCore {
    pub async fn start(
        store: Arc<dyn Datastore>,
        browser: Arc<dyn BrowserAutomation>,
        scripts: Arc<dyn FingerprintScriptProvider>,
        decryptor: Arc<dyn CredentialDecryptor>,
        events: Arc<dyn EventChannel>,
        num_workers: usize,
    ) -> Self {
        let context = Arc::new(RunContext {
            store,
            browser,
            scripts,
            decryptor,
            events,
        });

        let dispatcher = Dispatcher::new(context.clone(), num_workers);
        dispatcher.start().await;

        Self {
            context,
            dispatcher,
        }
    }

    pub async fn shutdown(&self) {
        self.dispatcher.shutdown().await;
    }
}
