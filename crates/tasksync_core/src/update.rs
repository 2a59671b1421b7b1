use sync_logging::{sync_debug, sync_info, sync_warn};

use crate::state::Session;
use crate::{
    notifications_between, parse_frame, ClientFrame, ConnectionId, ConnectionPhase, Effect, Msg,
    SyncState, TaskId,
};

pub const AUTH_REQUIRED: &str = "Authentication required";
pub const CONNECTION_LOST: &str = "Connection lost";
pub const TRANSPORT_ERROR: &str = "WebSocket error";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SyncState, msg: Msg) -> (SyncState, Vec<Effect>) {
    let before = state.task().clone();
    let scope = state.session().map(|s| s.task_id.clone());

    let mut effects = match msg {
        Msg::Watch { task_id, token } => watch(&mut state, task_id, token),
        Msg::Opened { conn } => opened(&mut state, conn),
        Msg::FrameReceived { conn, text } => {
            frame_received(&mut state, conn, &text);
            Vec::new()
        }
        Msg::TransportError { conn, detail } => {
            transport_error(&mut state, conn, &detail);
            Vec::new()
        }
        Msg::Closed { conn, clean } => closed(&mut state, conn, clean),
        Msg::ReconnectDue { conn, token } => reconnect_due(&mut state, conn, token),
        Msg::Dispose => teardown(&mut state),
        Msg::NoOp => Vec::new(),
    };

    // Notifications only describe transitions within one task.
    if scope.is_some() && scope.as_ref() == state.session().map(|s| &s.task_id) {
        effects.extend(
            notifications_between(&before, state.task())
                .into_iter()
                .map(Effect::Notify),
        );
    }

    (state, effects)
}

fn watch(state: &mut SyncState, task_id: Option<TaskId>, token: Option<String>) -> Vec<Effect> {
    if state.session().map(|s| &s.task_id) == task_id.as_ref() {
        return Vec::new();
    }

    let mut effects = teardown(state);
    let Some(task_id) = task_id else {
        return effects;
    };

    sync_info!("Observing task {task_id}");
    state.reset_task();
    let conn = state.next_conn();
    state.replace_session(Some(Session {
        task_id,
        conn,
        phase: ConnectionPhase::Idle,
        attempts: 0,
        token: None,
    }));
    effects.extend(connect(state, token));
    effects
}

/// Close whatever the current session holds and forget it. No-op without a session.
fn teardown(state: &mut SyncState) -> Vec<Effect> {
    let Some(session) = state.session() else {
        return Vec::new();
    };

    let effects = match session.phase {
        ConnectionPhase::Connecting | ConnectionPhase::Open => {
            vec![Effect::Close { conn: session.conn }]
        }
        ConnectionPhase::Backoff => vec![Effect::CancelReconnect],
        _ => Vec::new(),
    };
    sync_debug!(
        "Disposing session for task {} ({:?})",
        session.task_id,
        session.phase
    );
    state.replace_session(None);
    effects
}

fn connect(state: &mut SyncState, token: Option<String>) -> Vec<Effect> {
    let Some(session) = state.session_mut() else {
        return Vec::new();
    };

    let Some(token) = token else {
        sync_warn!(
            "No bearer token available; not connecting to task {}",
            session.task_id
        );
        session.phase = ConnectionPhase::Unauthenticated;
        session.token = None;
        state.task_mut().error = Some(AUTH_REQUIRED.to_string());
        state.mark_dirty();
        return Vec::new();
    };

    session.phase = ConnectionPhase::Connecting;
    session.token = Some(token);
    let effect = Effect::Open {
        conn: session.conn,
        task_id: session.task_id.clone(),
    };
    state.mark_dirty();
    vec![effect]
}

fn opened(state: &mut SyncState, conn: ConnectionId) -> Vec<Effect> {
    let Some(session) = state.session_for(conn) else {
        sync_debug!("Ignoring open of stale connection {conn}");
        return Vec::new();
    };
    if session.phase != ConnectionPhase::Connecting {
        return Vec::new();
    }

    session.phase = ConnectionPhase::Open;
    session.attempts = 0;
    let token = session.token.take();
    sync_info!("Connected to task {} on {conn}", session.task_id);
    state.mark_dirty();

    let Some(token) = token else {
        return Vec::new();
    };
    let auth = ClientFrame::Auth { token };
    match auth.to_text() {
        Ok(text) => vec![Effect::Send { conn, text }],
        Err(err) => {
            // The session stays open and keeps listening.
            sync_warn!("Failed to encode auth frame: {err}");
            Vec::new()
        }
    }
}

fn frame_received(state: &mut SyncState, conn: ConnectionId, text: &str) {
    let is_live = state
        .session_for(conn)
        .is_some_and(|s| s.phase == ConnectionPhase::Open);
    if !is_live {
        sync_debug!("Dropping frame from stale connection {conn}");
        return;
    }

    match parse_frame(text) {
        Ok(frame) if frame.is_empty() => sync_debug!("Frame on {conn} carried no known fields"),
        Ok(frame) => {
            if state.task_mut().merge(frame) {
                state.mark_dirty();
            }
        }
        Err(err) => sync_warn!("Discarding malformed frame on {conn}: {err}"),
    }
}

fn transport_error(state: &mut SyncState, conn: ConnectionId, detail: &str) {
    let is_live = state.session_for(conn).is_some_and(|s| {
        matches!(
            s.phase,
            ConnectionPhase::Connecting | ConnectionPhase::Open
        )
    });
    if !is_live {
        return;
    }

    sync_warn!("Transport error on {conn}: {detail}");
    let task = state.task_mut();
    if task.error.as_deref() != Some(TRANSPORT_ERROR) {
        task.error = Some(TRANSPORT_ERROR.to_string());
        state.mark_dirty();
    }
}

fn closed(state: &mut SyncState, conn: ConnectionId, clean: bool) -> Vec<Effect> {
    let policy = state.policy();
    let terminal = state.task().status.is_terminal();
    let Some(session) = state.session_for(conn) else {
        sync_debug!("Ignoring close of stale connection {conn}");
        return Vec::new();
    };
    if !matches!(
        session.phase,
        ConnectionPhase::Connecting | ConnectionPhase::Open
    ) {
        return Vec::new();
    }

    let settled = if clean {
        ConnectionPhase::ClosedClean
    } else {
        ConnectionPhase::ClosedAbnormal
    };

    if terminal {
        sync_debug!("Connection {conn} closed after terminal status (clean: {clean})");
        session.phase = settled;
        state.mark_dirty();
        return Vec::new();
    }

    if !clean && policy.allows_retry(session.attempts) {
        let delay = policy.delay_for(session.attempts);
        session.attempts += 1;
        session.phase = ConnectionPhase::Backoff;
        sync_info!(
            "Connection {conn} dropped; reconnect {}/{} in {delay:?}",
            session.attempts,
            policy.max_attempts
        );
        state.mark_dirty();
        return vec![Effect::ScheduleReconnect { conn, delay }];
    }

    sync_warn!(
        "Connection {conn} lost for task {} (clean: {clean}, attempts: {})",
        session.task_id,
        session.attempts
    );
    session.phase = settled;
    let task = state.task_mut();
    task.status = crate::TaskStatus::Failed;
    task.error = Some(CONNECTION_LOST.to_string());
    state.mark_dirty();
    Vec::new()
}

fn reconnect_due(state: &mut SyncState, conn: ConnectionId, token: Option<String>) -> Vec<Effect> {
    let fresh = state.next_conn();
    let Some(session) = state.session_for(conn) else {
        sync_debug!("Ignoring reconnect timer of stale connection {conn}");
        return Vec::new();
    };
    if session.phase != ConnectionPhase::Backoff {
        return Vec::new();
    }

    session.conn = fresh;
    connect(state, token)
}
