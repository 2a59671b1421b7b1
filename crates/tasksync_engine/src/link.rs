use std::sync::Arc;
use std::time::Duration;

use sync_logging::{sync_debug, sync_warn};
use tasksync_core::{ConnectionId, Msg};
use tokio::sync::mpsc;
use url::Url;

use crate::{Connector, Inbound, TransportError};

enum LinkCommand {
    Send(String),
    Close,
}

/// Owner side of one connection task. Dropping the handle closes the link.
pub(crate) struct LinkHandle {
    conn: ConnectionId,
    commands: mpsc::UnboundedSender<LinkCommand>,
}

impl LinkHandle {
    pub(crate) fn spawn(
        conn: ConnectionId,
        url: Url,
        connector: Arc<dyn Connector>,
        connect_timeout: Duration,
        events: mpsc::UnboundedSender<Msg>,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        tokio::spawn(drive(
            conn,
            url,
            connector,
            connect_timeout,
            command_rx,
            events,
        ));
        Self { conn, commands }
    }

    pub(crate) fn conn(&self) -> ConnectionId {
        self.conn
    }

    pub(crate) fn send(&self, text: String) {
        let _ = self.commands.send(LinkCommand::Send(text));
    }

    pub(crate) fn close(self) {
        let _ = self.commands.send(LinkCommand::Close);
    }
}

/// Runs one connection: connect, report, then pump frames until either side
/// closes. Every report is tagged with `conn` so the session can drop
/// anything that outlives it.
async fn drive(
    conn: ConnectionId,
    url: Url,
    connector: Arc<dyn Connector>,
    connect_timeout: Duration,
    mut commands: mpsc::UnboundedReceiver<LinkCommand>,
    events: mpsc::UnboundedSender<Msg>,
) {
    sync_debug!("Connecting {conn} to {url}");
    let connecting = tokio::time::timeout(connect_timeout, connector.connect(&url));
    let outcome = tokio::select! {
        outcome = connecting => outcome,
        _ = commands.recv() => {
            sync_debug!("Connect for {conn} abandoned");
            return;
        }
    };

    let mut link = match outcome {
        Ok(Ok(link)) => link,
        Ok(Err(err)) => return report_failure(&events, conn, err),
        Err(_) => return report_failure(&events, conn, TransportError::Timeout(connect_timeout)),
    };

    if events.send(Msg::Opened { conn }).is_err() {
        link.close().await;
        return;
    }

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(LinkCommand::Send(text)) => {
                    if let Err(err) = link.send_text(text).await {
                        sync_warn!("Failed to send frame on {conn}: {err}");
                    }
                }
                Some(LinkCommand::Close) | None => {
                    link.close().await;
                    sync_debug!("Closed {conn}");
                    return;
                }
            },
            inbound = link.recv() => {
                let finished = matches!(inbound, Inbound::Closed { .. });
                let msg = match inbound {
                    Inbound::Text(text) => Msg::FrameReceived { conn, text },
                    Inbound::Error(detail) => Msg::TransportError { conn, detail },
                    Inbound::Closed { clean } => Msg::Closed { conn, clean },
                };
                if events.send(msg).is_err() || finished {
                    return;
                }
            }
        }
    }
}

fn report_failure(events: &mpsc::UnboundedSender<Msg>, conn: ConnectionId, err: TransportError) {
    sync_warn!("Connection {conn} failed: {err}");
    let _ = events.send(Msg::TransportError {
        conn,
        detail: err.to_string(),
    });
    let _ = events.send(Msg::Closed { conn, clean: false });
}
