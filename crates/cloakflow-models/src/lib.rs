//! Cloakflow Models - Entity types and lifecycle state machines.
//!
//! Everything the orchestration engine persists or emits lives here:
//! - Job, JobExecution, Session and their explicit state machines
//! - Profile and Proxy identity configuration (read-only to the engine)
//! - Workflow and its node/edge graph wire format
//! - Update events consumed by an external realtime channel

pub mod event;
pub mod execution;
pub mod job;
pub mod profile;
pub mod proxy;
pub mod session;
pub mod workflow;

pub use event::UpdateEvent;
pub use execution::{ExecutionStatus, JobExecution};
pub use job::{Job, JobStatus};
pub use profile::Profile;
pub use proxy::Proxy;
pub use session::{Session, SessionStatus};
pub use workflow::{Graph, GraphEdge, GraphNode, NodeData, Workflow};
