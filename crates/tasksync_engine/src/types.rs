use std::time::Duration;

use thiserror::Error;

/// One event read from a live link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text(String),
    /// Connection-level failure; the link reports `Closed` afterwards.
    Error(String),
    /// The link is finished. `clean` means a close frame was exchanged.
    Closed { clean: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connect timed out after {0:?}")]
    Timeout(Duration),
    #[error("handshake failed: {0}")]
    Handshake(String),
    #[error("send failed: {0}")]
    Send(String),
}
