//! Mailbox access module.
//!
//! Provides the mail source contract the sync orchestrator depends on, a
//! Gmail REST implementation, and text extraction from raw message payloads.

pub mod error;
pub mod extract;
pub mod gmail;
pub mod message;
pub mod source;

pub use error::MailError;
pub use extract::{extract_body, ExtractedText};
pub use gmail::GmailClient;
pub use message::{Header, MessagePart, PartBody, RawMessage};
pub use source::{MailCredential, MailSource};
