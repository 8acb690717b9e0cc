//! Cloakflow Traits - Shared trait definitions and core abstractions.
//!
//! This crate provides the narrow interfaces the orchestration engine
//! consumes its external collaborators through:
//! - the engine error taxonomy (`EngineError`)
//! - repository store traits over the persistent store
//! - the browser automation capability (`BrowserAutomation`, `BrowserPage`)
//! - the fingerprint script provider and proxy credential decryptor
//! - the realtime event channel

pub mod browser;
pub mod error;
pub mod events;
pub mod fingerprint;
pub mod store;

// ── Top-level re-exports ─────────────────────────────────────────────

pub use error::{EngineError, Result};

pub use store::{
    ArtifactStore, Datastore, ExecutionStore, JobStore, NewJob, NewSession, ProfileStore,
    ProxyStore, SessionStore, WorkflowStore,
};

pub use browser::{BrowserAutomation, BrowserPage, LaunchConfig, ProxySettings, Viewport};

pub use events::EventChannel;
pub use fingerprint::{CredentialDecryptor, FingerprintScriptProvider};
