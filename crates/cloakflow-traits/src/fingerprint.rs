//! Fingerprint script provider and credential decryption capabilities.

use serde_json::Value;

use crate::error::Result;

/// Produces the injectable script text a launched page is seeded with.
///
/// `build_injection` must be deterministic for a given fingerprint value; the
/// two static scripts never vary per profile.
pub trait FingerprintScriptProvider: Send + Sync {
    /// Static stealth patch, installed first.
    fn base_patch(&self) -> String;

    /// Static audio spoof, installed second.
    fn audio_spoof(&self) -> String;

    /// Per-profile injection built from fingerprint attributes, installed
    /// last.
    fn build_injection(&self, fingerprint: &Value) -> String;
}

/// Decrypts stored proxy credentials. The engine holds the plaintext only for
/// the lifetime of the launch configuration.
pub trait CredentialDecryptor: Send + Sync {
    fn decrypt(&self, ciphertext: &str) -> Result<String>;
}
