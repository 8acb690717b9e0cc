use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An upstream proxy endpoint. The password is stored encrypted; the engine
/// decrypts it through an external capability just before launch and never
/// persists the plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proxy {
    pub id: i64,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password_encrypted: Option<String>,
    #[serde(rename = "type")]
    pub proxy_type: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Proxy {
    /// Server URL in the form the browser launcher expects,
    /// e.g. `socks5://10.0.0.1:1080`.
    pub fn server_url(&self) -> String {
        format!("{}://{}:{}", self.proxy_type, self.host, self.port)
    }
}
