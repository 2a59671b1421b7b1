use futures_util::{SinkExt, StreamExt};
use sync_logging::{sync_debug, sync_trace};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::{Connector, Inbound, Link, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport over `tokio-tungstenite`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

#[async_trait::async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &Url) -> Result<Box<dyn Link>, TransportError> {
        let (stream, response) = connect_async(url.as_str())
            .await
            .map_err(|err| TransportError::Handshake(err.to_string()))?;
        sync_debug!("WebSocket handshake with {url} answered {}", response.status());
        Ok(Box::new(WsLink {
            stream,
            close_seen: false,
            errored: false,
        }))
    }
}

struct WsLink {
    stream: WsStream,
    close_seen: bool,
    errored: bool,
}

#[async_trait::async_trait]
impl Link for WsLink {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.stream
            .send(Message::text(text))
            .await
            .map_err(|err| TransportError::Send(err.to_string()))
    }

    async fn recv(&mut self) -> Inbound {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Inbound::Text(text.as_str().to_owned()),
                Some(Ok(Message::Close(frame))) => {
                    // The reply is queued by tungstenite; the stream ends once it is flushed.
                    sync_debug!("Close frame received: {frame:?}");
                    self.close_seen = true;
                }
                Some(Ok(Message::Binary(bytes))) => {
                    sync_debug!("Ignoring {} byte binary frame", bytes.len());
                }
                Some(Ok(other)) => sync_trace!("Ignoring control frame {other:?}"),
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => {
                    return Inbound::Closed {
                        clean: self.close_seen,
                    };
                }
                Some(Err(err)) => {
                    if self.errored || self.close_seen {
                        return Inbound::Closed {
                            clean: self.close_seen,
                        };
                    }
                    self.errored = true;
                    return Inbound::Error(err.to_string());
                }
            }
        }
    }

    async fn close(&mut self) {
        if let Err(err) = self.stream.close(None).await {
            sync_debug!("WebSocket close: {err}");
        }
    }
}
