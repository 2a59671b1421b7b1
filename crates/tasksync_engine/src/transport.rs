use url::Url;

use crate::{Inbound, TransportError};

/// A live, bidirectional text connection.
#[async_trait::async_trait]
pub trait Link: Send {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    /// Waits for the next inbound event. Must be cancel safe; it is raced
    /// against outgoing commands. Not called again after `Inbound::Closed`.
    async fn recv(&mut self) -> Inbound;

    /// Starts a clean close. Errors are swallowed.
    async fn close(&mut self);
}

#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &Url) -> Result<Box<dyn Link>, TransportError>;
}
