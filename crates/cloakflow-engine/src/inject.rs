//! Injection script assembly and launch parameters derived from a profile's
//! fingerprint attributes.

use serde_json::Value;

use cloakflow_traits::{FingerprintScriptProvider, Viewport};

/// Scripts a launched page is seeded with, in the fixed installation order:
/// base fingerprint patch, audio spoof, per-profile injection. Empty static
/// scripts are skipped; the per-profile injection is always present.
pub fn assemble_init_scripts(
    provider: &dyn FingerprintScriptProvider,
    fingerprint: &Value,
) -> Vec<String> {
    let mut scripts = Vec::new();

    let base = provider.base_patch();
    if !base.is_empty() {
        scripts.push(base);
    }
    let audio = provider.audio_spoof();
    if !audio.is_empty() {
        scripts.push(audio);
    }
    scripts.push(provider.build_injection(fingerprint));

    scripts
}

/// Viewport from fingerprint screen dimensions, 1920×1080 when absent.
pub fn viewport_from(fingerprint: &Value) -> Viewport {
    let default = Viewport::default();
    Viewport {
        width: fingerprint
            .get("screen_width")
            .and_then(Value::as_u64)
            .map(|w| w as u32)
            .unwrap_or(default.width),
        height: fingerprint
            .get("screen_height")
            .and_then(Value::as_u64)
            .map(|h| h as u32)
            .unwrap_or(default.height),
    }
}

pub fn user_agent_from(fingerprint: &Value) -> Option<String> {
    fingerprint
        .get("user_agent")
        .and_then(Value::as_str)
        .map(String::from)
}
