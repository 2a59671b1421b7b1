use serde_json::Value;

use crate::{ConnectionPhase, Frame, TaskId, TaskStatus};

/// Accumulated view of one task, enriched frame by frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskView {
    pub status: TaskStatus,
    pub message: String,
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl TaskView {
    /// Overwrite every field the frame carries and leave the rest alone.
    /// Returns whether anything changed.
    pub fn merge(&mut self, frame: Frame) -> bool {
        let mut changed = false;
        if let Some(status) = frame.status {
            changed |= self.status != status;
            self.status = status;
        }
        if let Some(message) = frame.message {
            changed |= self.message != message;
            self.message = message;
        }
        if let Some(result) = frame.result {
            changed |= self.result.as_ref() != Some(&result);
            self.result = Some(result);
        }
        if let Some(error) = frame.error {
            changed |= self.error.as_deref() != Some(error.as_str());
            self.error = Some(error);
        }
        changed
    }
}

/// Snapshot published to consumers after every state change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncViewModel {
    pub task_id: Option<TaskId>,
    pub phase: ConnectionPhase,
    pub reconnect_attempts: u32,
    pub task: TaskView,
}

impl SyncViewModel {
    pub fn is_terminal(&self) -> bool {
        self.task.status.is_terminal()
    }
}
