//! Tasksync engine: transports, the session runner and collaborator clients.
mod credentials;
mod link;
mod persist;
mod settings;
mod transport;
mod types;
mod upload;
mod watcher;
mod ws;

pub use credentials::{CredentialChain, CredentialProvider, EnvToken, StaticToken, TOKEN_VAR};
pub use persist::{PersistError, StateFile};
pub use settings::{SettingsError, SyncSettings, API_URL_VAR, WS_URL_VAR};
pub use transport::{Connector, Link};
pub use types::{Inbound, TransportError};
pub use upload::{IssuedTask, ReqwestTaskIssuer, TaskIssuer, UploadError};
pub use watcher::TaskWatcher;
pub use ws::WsConnector;
