//! Raw message model mirroring the Gmail REST `users.messages.get` shape.

use serde::Deserialize;

/// A raw message as returned by `users/me/messages/{id}?format=full`.
/// Immutable once fetched.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub snippet: Option<String>,
    /// Milliseconds since epoch, as a string.
    #[serde(default)]
    pub internal_date: Option<String>,
    pub payload: MessagePart,
}

impl RawMessage {
    /// Looks up a top-level header value, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload.header(name)
    }
}

/// A node in the MIME-like content tree: a media type, optional inline
/// data, and optional child parts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: Option<PartBody>,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

impl MessagePart {
    /// Looks up a header value on this part, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Whether this part's media type matches, case-insensitively.
    pub fn is_mime_type(&self, mime_type: &str) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case(mime_type))
    }
}

/// A single (name, value) header pair.
#[derive(Debug, Clone, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Inline body data of a message part, base64url-encoded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartBody {
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub data: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let message: RawMessage = serde_json::from_value(serde_json::json!({
            "id": "msg-1",
            "threadId": "t-1",
            "payload": {
                "mimeType": "text/plain",
                "headers": [
                    { "name": "Subject", "value": "Hello" },
                    { "name": "FROM", "value": "jobs@acme.com" }
                ]
            }
        }))
        .unwrap();

        assert_eq!(message.header("subject"), Some("Hello"));
        assert_eq!(message.header("From"), Some("jobs@acme.com"));
        assert_eq!(message.header("Date"), None);
    }

    #[test]
    fn test_deserialize_multipart_tree() {
        let message: RawMessage = serde_json::from_value(serde_json::json!({
            "id": "msg-2",
            "threadId": "t-2",
            "payload": {
                "mimeType": "multipart/alternative",
                "headers": [],
                "parts": [
                    { "mimeType": "text/plain", "body": { "size": 4, "data": "dGVzdA" } },
                    { "mimeType": "text/html", "body": { "size": 10, "data": "PGI-dGVzdDwvYj4" } }
                ]
            }
        }))
        .unwrap();

        assert_eq!(message.payload.parts.len(), 2);
        assert!(message.payload.parts[0].is_mime_type("TEXT/PLAIN"));
    }
}
