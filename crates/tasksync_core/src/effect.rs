use std::time::Duration;

use crate::{ConnectionId, Notification, TaskId};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Open { conn: ConnectionId, task_id: TaskId },
    Send { conn: ConnectionId, text: String },
    Close { conn: ConnectionId },
    ScheduleReconnect { conn: ConnectionId, delay: Duration },
    CancelReconnect,
    Notify(Notification),
}
