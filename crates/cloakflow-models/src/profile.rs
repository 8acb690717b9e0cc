use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A configured browser identity. Read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub user_agent: Option<String>,
    pub fingerprint: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Fingerprint attributes with the profile's user agent overlaid, the
    /// shape the script provider and launch configuration consume.
    pub fn fingerprint_data(&self) -> Value {
        let mut data = match &self.fingerprint {
            Some(Value::Object(map)) => Value::Object(map.clone()),
            _ => Value::Object(Default::default()),
        };
        if let Some(ua) = &self.user_agent
            && let Value::Object(map) = &mut data
        {
            map.insert("user_agent".to_string(), Value::String(ua.clone()));
        }
        data
    }
}
