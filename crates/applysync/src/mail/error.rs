//! Mail source error types.

use thiserror::Error;

/// Errors that can occur while fetching or reading mailbox messages.
#[derive(Error, Debug)]
pub enum MailError {
    /// The credential is missing, empty, or was rejected by the mail API.
    #[error("Credential rejected: {0}")]
    CredentialRejected(String),

    /// Network-level failure talking to the mail API.
    #[error("Mail transport error: {0}")]
    Transport(String),

    /// The mail API returned a non-success status.
    #[error("Mail API request failed: status={status} body={body}")]
    Api { status: u16, body: String },

    /// Failed to decode an API response.
    #[error("Failed to decode mail API response: {0}")]
    Decode(String),

    /// A required header is absent from the message.
    #[error("Message is missing the '{0}' header")]
    MissingHeader(&'static str),

    /// The Date header could not be parsed as an RFC 2822 date.
    #[error("Unparsable Date header: '{0}'")]
    InvalidDate(String),
}

/// Result type for mail operations.
pub type Result<T> = std::result::Result<T, MailError>;
