use crate::{ConnectionId, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Consumer selected the task to observe; `None` stops observing.
    /// `token` is the credential provider's answer at the time of the call.
    Watch {
        task_id: Option<TaskId>,
        token: Option<String>,
    },
    /// Transport handshake for `conn` completed.
    Opened { conn: ConnectionId },
    /// One text frame arrived on `conn`.
    FrameReceived { conn: ConnectionId, text: String },
    /// Connection-level failure on `conn`; a `Closed` follows.
    TransportError { conn: ConnectionId, detail: String },
    /// `conn` is gone. `clean` is true only for a completed close handshake.
    Closed { conn: ConnectionId, clean: bool },
    /// The backoff timer scheduled after `conn` closed has elapsed.
    ReconnectDue {
        conn: ConnectionId,
        token: Option<String>,
    },
    /// Consumer stopped observing.
    Dispose,
    /// Fallback for placeholder wiring.
    NoOp,
}
