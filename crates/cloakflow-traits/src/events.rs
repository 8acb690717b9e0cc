//! Realtime update event channel.

use async_trait::async_trait;

use cloakflow_models::UpdateEvent;

use crate::error::Result;

/// Delivery surface for `session:update` / `jobExecution:update` events.
///
/// `send` reports success or failure explicitly; the caller decides whether
/// to log and continue. Emission failure must never fail the task that
/// produced the event.
#[async_trait]
pub trait EventChannel: Send + Sync {
    async fn send(&self, event: UpdateEvent) -> Result<()>;
}
