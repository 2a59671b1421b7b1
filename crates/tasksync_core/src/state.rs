use std::fmt;

use crate::view_model::{SyncViewModel, TaskView};
use crate::{ReconnectPolicy, TaskId};

/// Identifies one transport connection attempt. A fresh id is issued for every
/// connect and every teardown, so callbacks from a replaced connection can be
/// recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    /// No task observed, or the session was torn down.
    #[default]
    Idle,
    /// Transport handshake in flight.
    Connecting,
    /// Transport open and auth frame sent; receiving updates.
    Open,
    /// Closed abnormally; a reconnect is scheduled.
    Backoff,
    /// Closed cleanly or after a terminal status. No further transitions.
    ClosedClean,
    /// Closed abnormally with the retry budget spent.
    ClosedAbnormal,
    /// No bearer token was available at connect time.
    Unauthenticated,
}

impl ConnectionPhase {
    /// True when the session will not connect again on its own.
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            ConnectionPhase::Idle
                | ConnectionPhase::ClosedClean
                | ConnectionPhase::ClosedAbnormal
                | ConnectionPhase::Unauthenticated
        )
    }
}

/// The connection session scoped to a single task id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Session {
    pub(crate) task_id: TaskId,
    pub(crate) conn: ConnectionId,
    pub(crate) phase: ConnectionPhase,
    pub(crate) attempts: u32,
    pub(crate) token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncState {
    task: TaskView,
    session: Option<Session>,
    policy: ReconnectPolicy,
    last_conn: u64,
    dirty: bool,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn view(&self) -> SyncViewModel {
        SyncViewModel {
            task_id: self.session.as_ref().map(|s| s.task_id.clone()),
            phase: self.phase(),
            reconnect_attempts: self.session.as_ref().map_or(0, |s| s.attempts),
            task: self.task.clone(),
        }
    }

    pub fn task(&self) -> &TaskView {
        &self.task
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.session
            .as_ref()
            .map_or(ConnectionPhase::Idle, |s| s.phase)
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    /// Returns whether the view changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn task_mut(&mut self) -> &mut TaskView {
        &mut self.task
    }

    pub(crate) fn reset_task(&mut self) {
        if self.task != TaskView::default() {
            self.task = TaskView::default();
            self.dirty = true;
        }
    }

    pub(crate) fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub(crate) fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Session whose live connection is `conn`, if any.
    pub(crate) fn session_for(&mut self, conn: ConnectionId) -> Option<&mut Session> {
        self.session.as_mut().filter(|s| s.conn == conn)
    }

    pub(crate) fn replace_session(&mut self, session: Option<Session>) {
        self.session = session;
        self.dirty = true;
    }

    pub(crate) fn next_conn(&mut self) -> ConnectionId {
        self.last_conn += 1;
        ConnectionId(self.last_conn)
    }
}
