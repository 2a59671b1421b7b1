//! Tasksync core: pure connection-session state machine and task view reducer.
mod effect;
mod frame;
mod msg;
mod notify;
mod policy;
mod state;
mod status;
mod update;
mod view_model;

pub use effect::Effect;
pub use frame::{parse_frame, ClientFrame, Frame, FrameError};
pub use msg::Msg;
pub use notify::{notifications_between, Notification};
pub use policy::{ReconnectPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_RECONNECT_ATTEMPTS};
pub use state::{ConnectionId, ConnectionPhase, SyncState};
pub use status::{TaskId, TaskStatus};
pub use update::{update, AUTH_REQUIRED, CONNECTION_LOST, TRANSPORT_ERROR};
pub use view_model::{SyncViewModel, TaskView};
