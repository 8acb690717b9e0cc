//! Action executor: maps one node's action name and config to browser
//! automation primitive calls.

use std::time::Duration;

use serde_json::{Map, Value, json};

use cloakflow_traits::{BrowserPage, EngineError, Result};

pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_SELECTOR_TIMEOUT_MS: u64 = 5000;

/// Normalize an action name: case-insensitive, underscore synonyms collapse
/// (`open_page` ≡ `openPage` ≡ `openpage`).
fn normalize(action: &str) -> String {
    action
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn require_str(config: &Map<String, Value>, key: &str, action: &str) -> Result<String> {
    match config.get(key).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(EngineError::validation(format!(
            "{action} requires '{key}' in config"
        ))),
    }
}

/// Execute one action against the live page. A missing required config key
/// is a validation failure; an unrecognized action name is a hard error.
/// Either becomes the node-level error that fail-fasts the traversal.
pub async fn execute_action(
    page: &mut dyn BrowserPage,
    action: &str,
    config: &Map<String, Value>,
) -> Result<Value> {
    match normalize(action).as_str() {
        "openpage" => {
            let url = require_str(config, "url", "openPage")?;
            let settled = page.navigate(&url, NAVIGATION_TIMEOUT).await?;
            Ok(json!({"url": settled}))
        }
        "waitselector" => {
            let selector = require_str(config, "selector", "waitSelector")?;
            let timeout_ms = config
                .get("timeout")
                .and_then(Value::as_u64)
                .unwrap_or(DEFAULT_SELECTOR_TIMEOUT_MS);
            page.wait_for_selector(&selector, Duration::from_millis(timeout_ms))
                .await?;
            Ok(json!({"found": true}))
        }
        "click" => {
            let selector = require_str(config, "selector", "click")?;
            page.click(&selector).await?;
            Ok(json!({"clicked": true}))
        }
        "typetext" => {
            let selector = require_str(config, "selector", "typeText")?;
            let text = config
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default();
            page.fill(&selector, text).await?;
            Ok(json!({"typed": true, "textLength": text.len()}))
        }
        "screenshot" => {
            let path = config.get("path").and_then(Value::as_str);
            let bytes = page.screenshot(path).await?;
            Ok(json!({
                "screenshot": path.unwrap_or("captured"),
                "bytes": bytes.len(),
            }))
        }
        "closepage" => {
            page.close().await?;
            Ok(json!({"closed": true}))
        }
        "start" => Ok(json!({"status": "started"})),
        "end" => Ok(json!({"status": "ended"})),
        "merge" => Ok(json!({"status": "merged"})),
        _ => Err(EngineError::action(format!("unknown action: {action}"))),
    }
}
