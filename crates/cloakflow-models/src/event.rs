use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SESSION_UPDATE: &str = "session:update";
pub const JOB_EXECUTION_UPDATE: &str = "jobExecution:update";

/// An entity update emitted to the external realtime channel: the event name,
/// the entity id, and the fields that changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub name: String,
    pub data: Value,
}

impl UpdateEvent {
    pub fn session_update(id: i64, fields: Value) -> Self {
        Self::with_id(SESSION_UPDATE, id, fields)
    }

    pub fn job_execution_update(id: i64, fields: Value) -> Self {
        Self::with_id(JOB_EXECUTION_UPDATE, id, fields)
    }

    fn with_id(name: &str, id: i64, fields: Value) -> Self {
        let mut data = match fields {
            Value::Object(map) => map,
            Value::Null => Default::default(),
            other => {
                let mut map = serde_json::Map::new();
                map.insert("fields".to_string(), other);
                map
            }
        };
        data.insert("id".to_string(), Value::from(id));
        Self {
            name: name.to_string(),
            data: Value::Object(data),
        }
    }
}
