pub mod session;
pub mod upload;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use tasksync_engine::{
    CredentialChain, CredentialProvider, EnvToken, StaticToken, SyncSettings, API_URL_VAR,
    WS_URL_VAR,
};

use crate::cli::Cli;
use crate::session_store::SessionStore;

/// What every command needs, resolved once from the command line.
pub struct Context {
    pub settings: SyncSettings,
    pub store: SessionStore,
    pub credentials: Arc<dyn CredentialProvider>,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let settings = SyncSettings::from_lookup(|key| match key {
            WS_URL_VAR => cli.ws_url.clone(),
            API_URL_VAR => cli.api_url.clone(),
            _ => None,
        })
        .context("invalid backend url")?;

        let store = SessionStore::new(&cli.state_file);
        let mut chain = CredentialChain::new();
        if let Some(token) = &cli.token {
            chain = chain.with(Arc::new(StaticToken::new(token.clone())));
        }
        let chain = chain
            .with(Arc::new(EnvToken::default()))
            .with(Arc::new(store.clone()));

        Ok(Self {
            settings,
            store,
            credentials: Arc::new(chain),
        })
    }
}
