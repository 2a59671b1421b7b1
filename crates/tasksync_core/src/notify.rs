use serde_json::Value;

use crate::{TaskStatus, TaskView};

pub const DEFAULT_PROGRESS_MESSAGE: &str = "Processing...";
pub const DEFAULT_FAILURE_MESSAGE: &str = "Processing failed";

/// User-facing alert derived from a status transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Task is running; `message` is the latest progress note.
    Progress { message: String },
    /// Task finished with a result. `extracted` is `result.extracted` when
    /// present, otherwise the whole result.
    Completed { extracted: Value, issue_count: usize },
    /// Task failed.
    Failed { message: String },
}

/// Alerts implied by moving from `before` to `after` within one task.
pub fn notifications_between(before: &TaskView, after: &TaskView) -> Vec<Notification> {
    let mut out = Vec::new();

    if after.status == TaskStatus::Running
        && !after.message.is_empty()
        && (before.status != TaskStatus::Running || before.message != after.message)
    {
        out.push(Notification::Progress {
            message: after.message.clone(),
        });
    }

    if let Some(result) = completed_result(after) {
        if completed_result(before).is_none() {
            out.push(Notification::Completed {
                extracted: result.get("extracted").unwrap_or(result).clone(),
                issue_count: result
                    .get("errors")
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len),
            });
        }
    }

    if after.status == TaskStatus::Failed && before.status != TaskStatus::Failed {
        // The error text names the cause; the message is usually the last progress note.
        let message = after
            .error
            .clone()
            .or_else(|| (!after.message.is_empty()).then(|| after.message.clone()))
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
        out.push(Notification::Failed { message });
    }

    out
}

fn completed_result(view: &TaskView) -> Option<&Value> {
    if view.status == TaskStatus::Finished {
        view.result.as_ref()
    } else {
        None
    }
}

impl Notification {
    /// Progress note shown before the first server frame.
    pub fn initial_progress() -> Self {
        Notification::Progress {
            message: DEFAULT_PROGRESS_MESSAGE.to_string(),
        }
    }
}
