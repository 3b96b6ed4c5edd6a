//! Gmail REST API mail source.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::error::{MailError, Result};
use super::message::RawMessage;
use super::source::{MailCredential, MailSource};

/// Base URL of the Gmail REST API.
const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

/// Default connect timeout for HTTP requests (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default request timeout for HTTP requests (30 seconds).
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum length for error bodies carried into errors and logs.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Truncates an API error body to a reasonable length so token data or
/// full message content never floods logs.
fn sanitize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() > MAX_ERROR_BODY_LENGTH {
        format!("{}... (truncated)", &trimmed[..MAX_ERROR_BODY_LENGTH])
    } else {
        trimmed.to_string()
    }
}

/// Response of `users/me/messages` (list). Only ids are returned; full
/// messages are fetched individually.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageListResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

/// Mail source over the Gmail REST API.
pub struct GmailClient {
    client: Client,
    base_url: String,
}

impl GmailClient {
    /// Creates a client against the production Gmail endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(GMAIL_API_BASE)
    }

    /// Creates a client against a custom base URL (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MailError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        credential: &MailCredential,
        url: &str,
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(credential.access_token())
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(MailError::CredentialRejected(sanitize_error_body(&body)));
        }
        if !status.is_success() {
            return Err(MailError::Api {
                status: status.as_u16(),
                body: sanitize_error_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| MailError::Decode(e.to_string()))
    }

    async fn list_message_ids(
        &self,
        credential: &MailCredential,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<String>> {
        let url = format!(
            "{}/users/me/messages?q={}&maxResults={}",
            self.base_url,
            urlencode(query),
            max_results
        );
        let list: MessageListResponse = self.get_json(credential, &url).await?;
        Ok(list.messages.into_iter().map(|m| m.id).collect())
    }

    async fn get_message(
        &self,
        credential: &MailCredential,
        message_id: &str,
    ) -> Result<RawMessage> {
        let url = format!(
            "{}/users/me/messages/{}?format=full",
            self.base_url, message_id
        );
        self.get_json(credential, &url).await
    }
}

#[async_trait]
impl MailSource for GmailClient {
    async fn search(
        &self,
        credential: &MailCredential,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<RawMessage>> {
        if credential.is_empty() {
            return Err(MailError::CredentialRejected(
                "access token is empty".to_string(),
            ));
        }

        let ids = self.list_message_ids(credential, query, max_results).await?;
        info!("Mailbox search matched {} messages", ids.len());

        let mut messages = Vec::with_capacity(ids.len());
        for id in ids {
            debug!("Fetching message {}", id);
            messages.push(self.get_message(credential, &id).await?);
        }

        Ok(messages)
    }
}

/// Percent-encodes a query string for use in a URL parameter.
fn urlencode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
