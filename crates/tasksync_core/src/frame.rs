use serde::Serialize;
use serde_json::{Map, Value};
use sync_logging::sync_debug;
use thiserror::Error;

use crate::TaskStatus;

/// One inbound server update. Every field is optional; absent and null keys
/// both decode to `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub status: Option<TaskStatus>,
    pub message: Option<String>,
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.message.is_none()
            && self.result.is_none()
            && self.error.is_none()
    }
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame is not a json object")]
    NotAnObject,
}

/// Parse one text frame.
///
/// Only a non-object payload is an error. Individual keys with an unexpected
/// type or an unknown status name are skipped so the rest of the frame still
/// applies.
pub fn parse_frame(text: &str) -> Result<Frame, FrameError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(map) = value else {
        return Err(FrameError::NotAnObject);
    };
    Ok(frame_from_map(map))
}

fn frame_from_map(mut map: Map<String, Value>) -> Frame {
    let status = match map.remove("status") {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => {
            let parsed = TaskStatus::from_wire(&raw);
            if parsed.is_none() {
                sync_debug!("Ignoring unknown task status {raw:?}");
            }
            parsed
        }
        Some(other) => {
            sync_debug!("Ignoring non-string status {other}");
            None
        }
    };

    Frame {
        status,
        message: take_string(&mut map, "message"),
        result: map.remove("result").filter(|value| !value.is_null()),
        error: take_string(&mut map, "error"),
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => {
            sync_debug!("Ignoring non-string {key} {other}");
            None
        }
    }
}

/// Frames sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    Auth { token: String },
}

impl ClientFrame {
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
