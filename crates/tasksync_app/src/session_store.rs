use std::path::Path;

use serde::{Deserialize, Serialize};
use sync_logging::{sync_info, sync_warn};
use tasksync_core::TaskId;
use tasksync_engine::{CredentialProvider, PersistError, StateFile};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("session file is corrupt: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("cannot encode session: {0}")]
    Encode(#[from] ron::Error),
}

/// Everything the client remembers between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub active_task: Option<TaskId>,
}

/// Session persisted as a ron file and rewritten atomically.
#[derive(Debug, Clone)]
pub struct SessionStore {
    file: StateFile,
}

impl SessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            file: StateFile::new(path.as_ref()),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// A missing file is an empty session.
    pub fn load(&self) -> Result<Session, SessionStoreError> {
        match self.file.read()? {
            Some(text) => Ok(ron::from_str(&text)?),
            None => Ok(Session::default()),
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        if *session == Session::default() {
            self.file.remove()?;
            return Ok(());
        }
        let content = ron::ser::to_string_pretty(session, ron::ser::PrettyConfig::new())?;
        self.file.write(&content)?;
        Ok(())
    }

    pub fn set_token(&self, token: Option<String>) -> Result<(), SessionStoreError> {
        self.modify(|session| session.token = token)
    }

    pub fn set_active_task(&self, task_id: Option<TaskId>) -> Result<(), SessionStoreError> {
        self.modify(|session| session.active_task = task_id)
    }

    /// Forget the active task, but only if it is still `task_id`.
    pub fn finish_task(&self, task_id: &TaskId) -> Result<bool, SessionStoreError> {
        let mut session = self.load()?;
        if session.active_task.as_ref() != Some(task_id) {
            return Ok(false);
        }
        session.active_task = None;
        self.save(&session)?;
        sync_info!("Cleared active task {task_id}");
        Ok(true)
    }

    fn modify(&self, change: impl FnOnce(&mut Session)) -> Result<(), SessionStoreError> {
        let mut session = self.load()?;
        change(&mut session);
        self.save(&session)
    }
}

impl CredentialProvider for SessionStore {
    fn current_token(&self) -> Option<String> {
        match self.load() {
            Ok(session) => session.token.filter(|token| !token.trim().is_empty()),
            Err(err) => {
                sync_warn!("Failed to read session from {:?}: {}", self.path(), err);
                None
            }
        }
    }
}
