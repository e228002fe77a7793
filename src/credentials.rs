//! Broker credentials and the round-robin pool they are handed out from.
//!
//! Each [`Credential`] backs exactly one gateway session. Workers are
//! assigned sessions by instrument row index, `index % len`; the pool does
//! not look at load.

use std::fmt;
use std::sync::Arc;

use crate::error::{DhanError, Result};
use crate::gateway::OptionChainGateway;

/// One broker login: client ID plus access token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    client_id: String,
    access_token: String,
}

impl Credential {
    pub fn new(client_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            access_token: access_token.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("client_id", &self.client_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// A non-empty, ordered set of credentials.
#[derive(Debug, Clone)]
pub struct CredentialPool {
    credentials: Vec<Credential>,
}

impl CredentialPool {
    /// Build a pool. An empty pool is a configuration error.
    pub fn new(credentials: Vec<Credential>) -> Result<Self> {
        if credentials.is_empty() {
            return Err(DhanError::Config("no broker credentials configured".into()));
        }
        Ok(Self { credentials })
    }

    /// The credential for instrument row `index`.
    pub fn assign(&self, index: usize) -> &Credential {
        &self.credentials[index % self.credentials.len()]
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Credential> {
        self.credentials.iter()
    }

    /// Open one gateway session per credential, in pool order.
    pub fn open_sessions<F>(&self, mut open: F) -> Result<SessionPool>
    where
        F: FnMut(&Credential) -> Result<Arc<dyn OptionChainGateway>>,
    {
        let sessions = self
            .credentials
            .iter()
            .map(|c| open(c))
            .collect::<Result<Vec<_>>>()?;
        SessionPool::new(sessions)
    }
}

/// Open gateway sessions, one per credential, assigned round-robin.
#[derive(Clone)]
pub struct SessionPool {
    sessions: Vec<Arc<dyn OptionChainGateway>>,
}

impl SessionPool {
    pub fn new(sessions: Vec<Arc<dyn OptionChainGateway>>) -> Result<Self> {
        if sessions.is_empty() {
            return Err(DhanError::Config("no broker sessions available".into()));
        }
        Ok(Self { sessions })
    }

    /// The session for instrument row `index`.
    pub fn assign(&self, index: usize) -> Arc<dyn OptionChainGateway> {
        Arc::clone(&self.sessions[index % self.sessions.len()])
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl fmt::Debug for SessionPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionPool")
            .field("sessions", &self.sessions.len())
            .finish()
    }
}
