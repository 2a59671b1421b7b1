use std::pin::Pin;
use std::sync::Arc;

use sync_logging::{sync_debug, sync_error};
use tasksync_core::{
    update, ConnectionId, Effect, Msg, Notification, SyncState, SyncViewModel, TaskId,
};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Sleep;
use tokio_util::sync::CancellationToken;

use crate::link::LinkHandle;
use crate::{Connector, CredentialProvider, SyncSettings};

const NOTIFICATION_CAPACITY: usize = 64;

enum Command {
    Watch(Option<TaskId>),
}

/// Live, subscribable view of one observed task.
///
/// Owns a background task that runs the session state machine. Changing the
/// task id disposes the previous session before the next one connects.
/// Disposal happens on [`TaskWatcher::dispose`] or on drop, whichever comes
/// first; repeating it is harmless.
pub struct TaskWatcher {
    commands: mpsc::UnboundedSender<Command>,
    views: watch::Receiver<SyncViewModel>,
    notifications: broadcast::Sender<Notification>,
    cancel: CancellationToken,
}

impl TaskWatcher {
    /// Starts the runner on the current tokio runtime.
    pub fn spawn(
        settings: SyncSettings,
        connector: Arc<dyn Connector>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        let state = SyncState::with_policy(settings.reconnect);
        let (view_tx, views) = watch::channel(state.view());
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let runner = Runner {
            state,
            settings,
            connector,
            credentials,
            events_tx,
            link: None,
            pending: None,
            views: view_tx,
            notifications: notifications.clone(),
        };
        tokio::spawn(runner.run(command_rx, events_rx, cancel.clone()));

        Self {
            commands,
            views,
            notifications,
            cancel,
        }
    }

    /// Observe `task_id`, or stop observing with `None`.
    pub fn watch(&self, task_id: Option<TaskId>) {
        let _ = self.commands.send(Command::Watch(task_id));
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncViewModel> {
        self.views.clone()
    }

    pub fn current(&self) -> SyncViewModel {
        self.views.borrow().clone()
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    /// Closes any live connection and cancels a pending reconnect.
    pub fn dispose(&self) {
        self.cancel.cancel();
    }

    pub fn is_disposed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for TaskWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct PendingReconnect {
    conn: ConnectionId,
    sleep: Pin<Box<Sleep>>,
}

struct Runner {
    state: SyncState,
    settings: SyncSettings,
    connector: Arc<dyn Connector>,
    credentials: Arc<dyn CredentialProvider>,
    events_tx: mpsc::UnboundedSender<Msg>,
    link: Option<LinkHandle>,
    pending: Option<PendingReconnect>,
    views: watch::Sender<SyncViewModel>,
    notifications: broadcast::Sender<Notification>,
}

impl Runner {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut events: mpsc::UnboundedReceiver<Msg>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                command = commands.recv() => match command {
                    Some(Command::Watch(task_id)) => {
                        let token = self.credentials.current_token();
                        self.dispatch(Msg::Watch { task_id, token });
                    }
                    None => break,
                },
                Some(msg) = events.recv() => self.dispatch(msg),
                conn = reconnect_due(&mut self.pending) => {
                    self.pending = None;
                    let token = self.credentials.current_token();
                    self.dispatch(Msg::ReconnectDue { conn, token });
                }
            }
        }

        self.dispatch(Msg::Dispose);
        self.pending = None;
        if let Some(link) = self.link.take() {
            link.close();
        }
        sync_debug!("Task watcher stopped");
    }

    fn dispatch(&mut self, msg: Msg) {
        if let Msg::Closed { conn, .. } = &msg {
            if self.link.as_ref().is_some_and(|link| link.conn() == *conn) {
                self.link = None;
            }
        }

        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let publish = state.consume_dirty();
        self.state = state;

        // Notifications are broadcast before the view is published.
        for effect in effects {
            self.run_effect(effect);
        }
        if publish {
            self.views.send_replace(self.state.view());
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Open { conn, task_id } => {
                if let Some(previous) = self.link.take() {
                    previous.close();
                }
                match self.settings.task_url(&task_id) {
                    Ok(url) => {
                        self.link = Some(LinkHandle::spawn(
                            conn,
                            url,
                            self.connector.clone(),
                            self.settings.connect_timeout,
                            self.events_tx.clone(),
                        ));
                    }
                    Err(err) => {
                        sync_error!("Cannot build endpoint for task {task_id}: {err}");
                        let _ = self.events_tx.send(Msg::TransportError {
                            conn,
                            detail: err.to_string(),
                        });
                        let _ = self.events_tx.send(Msg::Closed { conn, clean: false });
                    }
                }
            }
            Effect::Send { conn, text } => match &self.link {
                Some(link) if link.conn() == conn => link.send(text),
                _ => sync_debug!("Dropping outgoing frame for stale connection {conn}"),
            },
            Effect::Close { conn } => {
                if self.link.as_ref().is_some_and(|link| link.conn() == conn) {
                    if let Some(link) = self.link.take() {
                        link.close();
                    }
                }
            }
            Effect::ScheduleReconnect { conn, delay } => {
                self.pending = Some(PendingReconnect {
                    conn,
                    sleep: Box::pin(tokio::time::sleep(delay)),
                });
            }
            Effect::CancelReconnect => self.pending = None,
            Effect::Notify(notification) => {
                // No receivers is fine.
                let _ = self.notifications.send(notification);
            }
        }
    }
}

async fn reconnect_due(pending: &mut Option<PendingReconnect>) -> ConnectionId {
    match pending {
        Some(pending) => {
            pending.sleep.as_mut().await;
            pending.conn
        }
        None => std::future::pending().await,
    }
}
