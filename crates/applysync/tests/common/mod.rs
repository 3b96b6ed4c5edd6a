//! Shared builders for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use applysync::mail::error::{MailError, Result as MailResult};
use applysync::mail::message::{Header, MessagePart, PartBody, RawMessage};
use applysync::{
    ClassificationResult, Classifier, ClassifyError, ExtractedText, MailCredential, MailSource,
};

pub const TEST_DATE: &str = "Thu, 1 Feb 2024 10:00:00 +0000";

/// Builder for raw messages in the Gmail REST shape.
pub struct MessageBuilder {
    id: String,
    subject: Option<String>,
    from: Option<String>,
    date: Option<String>,
    body_data: Option<String>,
}

impl MessageBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            subject: None,
            from: None,
            date: Some(TEST_DATE.to_string()),
            body_data: None,
        }
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    pub fn from(mut self, from: &str) -> Self {
        self.from = Some(from.to_string());
        self
    }

    pub fn date(mut self, date: &str) -> Self {
        self.date = Some(date.to_string());
        self
    }

    pub fn no_date(mut self) -> Self {
        self.date = None;
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body_data = Some(URL_SAFE_NO_PAD.encode(body.as_bytes()));
        self
    }

    /// Installs raw (pre-encoded) body data, e.g. invalid base64.
    pub fn raw_body_data(mut self, data: &str) -> Self {
        self.body_data = Some(data.to_string());
        self
    }

    pub fn build(self) -> RawMessage {
        let mut headers = Vec::new();
        if let Some(subject) = self.subject {
            headers.push(Header {
                name: "Subject".to_string(),
                value: subject,
            });
        }
        if let Some(from) = self.from {
            headers.push(Header {
                name: "From".to_string(),
                value: from,
            });
        }
        if let Some(date) = self.date {
            headers.push(Header {
                name: "Date".to_string(),
                value: date,
            });
        }

        RawMessage {
            id: self.id.clone(),
            thread_id: format!("thread-{}", self.id),
            snippet: None,
            internal_date: None,
            payload: MessagePart {
                mime_type: Some("text/plain".to_string()),
                headers,
                body: self.body_data.map(|data| PartBody {
                    size: Some(data.len() as u64),
                    data: Some(data),
                }),
                parts: Vec::new(),
            },
        }
    }
}

/// Mail source backed by a fixed message list.
pub struct StaticMailSource {
    messages: Vec<RawMessage>,
    fail_with: Option<fn() -> MailError>,
}

impl StaticMailSource {
    pub fn new(messages: Vec<RawMessage>) -> Self {
        Self {
            messages,
            fail_with: None,
        }
    }

    pub fn failing(fail_with: fn() -> MailError) -> Self {
        Self {
            messages: Vec::new(),
            fail_with: Some(fail_with),
        }
    }
}

#[async_trait]
impl MailSource for StaticMailSource {
    async fn search(
        &self,
        _credential: &MailCredential,
        _query: &str,
        max_results: u32,
    ) -> MailResult<Vec<RawMessage>> {
        if let Some(fail) = self.fail_with {
            return Err(fail());
        }
        Ok(self
            .messages
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }
}

/// Wraps a classifier and counts invocations.
pub struct CountingClassifier<C> {
    inner: C,
    pub calls: Arc<AtomicUsize>,
}

impl<C> CountingClassifier<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl<C: Classifier> Classifier for CountingClassifier<C> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn classify(&self, text: &ExtractedText) -> Result<ClassificationResult, ClassifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.classify(text).await
    }
}

/// Classifier that always returns the same result.
pub struct FixedClassifier(pub ClassificationResult);

#[async_trait]
impl Classifier for FixedClassifier {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn classify(&self, _text: &ExtractedText) -> Result<ClassificationResult, ClassifyError> {
        Ok(self.0.clone())
    }
}

/// Classifier that never finishes within a sane timeout.
pub struct StalledClassifier;

#[async_trait]
impl Classifier for StalledClassifier {
    fn name(&self) -> &'static str {
        "stalled"
    }

    async fn classify(&self, _text: &ExtractedText) -> Result<ClassificationResult, ClassifyError> {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        unreachable!("the orchestrator times out first")
    }
}
