//! Browser automation capability.
//!
//! The engine drives a real browser only through these traits. A launched
//! page handle owns its whole browser stack (page, context, browser process);
//! it is exclusively owned by the task that launched it and `close()` releases
//! everything.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxySettings {
    /// `{type}://{host}:{port}`
    pub server: String,
    pub username: Option<String>,
    /// Plaintext, decrypted just before launch. Never persisted.
    pub password: Option<String>,
}

/// Everything needed to launch one configured browser page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchConfig {
    pub headless: bool,
    pub viewport: Viewport,
    pub user_agent: Option<String>,
    pub proxy: Option<ProxySettings>,
    /// Scripts installed before any page content runs, in order.
    pub init_scripts: Vec<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::default(),
            user_agent: None,
            proxy: None,
            init_scripts: Vec::new(),
        }
    }
}

#[async_trait]
pub trait BrowserAutomation: Send + Sync {
    async fn launch(&self, config: LaunchConfig) -> Result<Box<dyn BrowserPage>>;
}

/// One live page. All calls block the owning task until the browser settles;
/// there is no cooperative yielding between them.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigate and wait for network idle. Returns the settled URL.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<String>;

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    async fn click(&mut self, selector: &str) -> Result<()>;

    async fn fill(&mut self, selector: &str, text: &str) -> Result<()>;

    /// Full-page screenshot. When `path` is given the implementation also
    /// writes the image there.
    async fn screenshot(&mut self, path: Option<&str>) -> Result<Vec<u8>>;

    /// Close the page and release the underlying context and browser.
    /// Idempotent.
    async fn close(&mut self) -> Result<()>;
}
