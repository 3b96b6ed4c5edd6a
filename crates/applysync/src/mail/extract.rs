//! Plain-text extraction from raw message payloads.

use std::collections::VecDeque;

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, FixedOffset};
use log::debug;

use super::error::{MailError, Result};
use super::message::{MessagePart, RawMessage};

/// The text of a message, ready for classification. Derived per message,
/// never persisted.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub subject: String,
    pub sender: String,
    pub body: String,
    pub received_at: DateTime<FixedOffset>,
}

impl ExtractedText {
    /// Builds the classification view of a message. The body is truncated
    /// to `body_limit` characters. A missing or unparsable Date header is
    /// an error; a missing body is not.
    pub fn from_message(message: &RawMessage, body_limit: usize) -> Result<Self> {
        let subject = message.header("Subject").unwrap_or_default().to_string();
        let sender = message.header("From").unwrap_or_default().to_string();

        let date_raw = message
            .header("Date")
            .ok_or(MailError::MissingHeader("Date"))?;
        let received_at = parse_date_header(date_raw)?;

        let mut body = extract_body(&message.payload);
        if body.chars().count() > body_limit {
            body = body.chars().take(body_limit).collect();
            debug!(
                "Truncated body of message '{}' to {} chars",
                message.id, body_limit
            );
        }

        Ok(Self {
            subject,
            sender,
            body,
            received_at,
        })
    }
}

/// Extracts the plain-text body from a payload tree. Never fails: absence
/// of a body, malformed parts, and decode errors all yield an empty string.
///
/// Preference order: inline data on the root part, then the first decodable
/// `text/plain` part in breadth-first order, then the first decodable
/// `text/html` part.
pub fn extract_body(payload: &MessagePart) -> String {
    if let Some(text) = decode_part_data(payload) {
        return text;
    }

    let mut html_fallbacks: Vec<&MessagePart> = Vec::new();
    let mut queue: VecDeque<&MessagePart> = payload.parts.iter().collect();

    while let Some(part) = queue.pop_front() {
        if part.is_mime_type("text/plain") {
            if let Some(text) = decode_part_data(part) {
                return text;
            }
        } else if part.is_mime_type("text/html") {
            html_fallbacks.push(part);
        }
        queue.extend(part.parts.iter());
    }

    for part in html_fallbacks {
        if let Some(text) = decode_part_data(part) {
            return text;
        }
    }

    String::new()
}

/// Decodes a part's inline data as base64url text. Returns `None` for
/// absent data, invalid base64, or invalid UTF-8.
fn decode_part_data(part: &MessagePart) -> Option<String> {
    let data = part.body.as_ref()?.data.as_deref()?;
    if data.is_empty() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(data)
        .or_else(|_| URL_SAFE.decode(data))
        .ok()?;

    String::from_utf8(bytes).ok()
}

/// Parses an RFC 2822 Date header, tolerating a trailing comment such as
/// `(UTC)` which chrono rejects.
fn parse_date_header(raw: &str) -> Result<DateTime<FixedOffset>> {
    let trimmed = match raw.find('(') {
        Some(idx) => raw[..idx].trim(),
        None => raw.trim(),
    };

    DateTime::parse_from_rfc2822(trimmed).map_err(|_| MailError::InvalidDate(raw.to_string()))
}
