use std::sync::Arc;

pub const TOKEN_VAR: &str = "TASKSYNC_TOKEN";

/// Read-only source of the caller's bearer token. Consulted on every connect
/// attempt, including reconnects.
pub trait CredentialProvider: Send + Sync {
    fn current_token(&self) -> Option<String>;
}

/// A fixed token, or a fixed absence of one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl CredentialProvider for StaticToken {
    fn current_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Token read from an environment variable at lookup time. Blank values
/// count as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvToken {
    fn default() -> Self {
        Self::new(TOKEN_VAR)
    }
}

impl CredentialProvider for EnvToken {
    fn current_token(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

/// First provider with a token wins. Providers are asked in order on every
/// lookup.
#[derive(Default, Clone)]
pub struct CredentialChain {
    providers: Vec<Arc<dyn CredentialProvider>>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: Arc<dyn CredentialProvider>) -> Self {
        self.providers.push(provider);
        self
    }
}

impl CredentialProvider for CredentialChain {
    fn current_token(&self) -> Option<String> {
        self.providers
            .iter()
            .find_map(|provider| provider.current_token())
    }
}
