//! Mail source contract consumed by the sync orchestrator.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::error::Result;
use super::message::RawMessage;

/// A bearer credential for a mailbox. Token exchange and refresh happen
/// upstream; the pipeline only consumes a valid token.
#[derive(Debug, Clone)]
pub struct MailCredential {
    access_token: SecretString,
}

impl MailCredential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
        }
    }

    /// Exposes the raw token for the Authorization header.
    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.expose_secret().trim().is_empty()
    }
}

/// Capability that returns raw messages matching a mailbox search query.
/// Injected into the orchestrator; a failure here is fatal to the run.
#[async_trait]
pub trait MailSource: Send + Sync {
    async fn search(
        &self,
        credential: &MailCredential,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<RawMessage>>;
}
