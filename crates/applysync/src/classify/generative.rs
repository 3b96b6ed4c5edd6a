//! Model-backed classification strategy.
//!
//! Delegates the application/alert judgment to an external text-generation
//! capability behind the [`CompletionClient`] trait. Response parse
//! problems never escape this module; transport faults do, and the
//! orchestrator skips the affected message.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::GenerativeConfig;
use crate::mail::ExtractedText;

use super::{ApplicationStatus, ClassificationResult, Classifier, ClassifyError};

/// Characters of body text included in the prompt.
const PROMPT_BODY_LIMIT: usize = 1500;

/// Default connect timeout for completion requests (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default request timeout for completion requests (30 seconds).
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A text-generation capability: prompt in, raw text out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ClassifyError>;
}

/// Chat-completions request body (OpenAI-compatible endpoints).
#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct CompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionChoiceMessage,
}

#[derive(Deserialize)]
struct CompletionChoiceMessage {
    content: String,
}

/// HTTP completion client for an OpenAI-compatible chat endpoint.
pub struct HttpCompletionClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: SecretString,
}

impl HttpCompletionClient {
    /// Builds the client, resolving the API key from the configured
    /// environment variable.
    pub fn from_config(config: &GenerativeConfig) -> Result<Self, ClassifyError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| ClassifyError::CredentialsNotFound(config.api_key_env.clone()))?;
        if api_key.trim().is_empty() {
            return Err(ClassifyError::CredentialsNotFound(config.api_key_env.clone()));
        }

        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClassifyError::Completion(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: SecretString::from(api_key),
        })
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, ClassifyError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: vec![CompletionMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ClassifyError::Completion(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClassifyError::Completion(e.to_string()))?;
        if !status.is_success() {
            return Err(ClassifyError::Completion(format!(
                "completion endpoint returned status {}",
                status
            )));
        }

        let parsed: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| ClassifyError::Completion(format!("malformed completion envelope: {}", e)))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ClassifyError::Completion("completion returned no choices".to_string()))
    }
}

/// Verdict shape the model is instructed to return.
#[derive(Debug, Deserialize)]
struct ModelVerdict {
    #[serde(default)]
    is_job_application: bool,
    #[serde(default)]
    is_automated_alert: bool,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Classifier that asks a generative model for the verdict.
pub struct GenerativeClassifier {
    client: Arc<dyn CompletionClient>,
}

impl GenerativeClassifier {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Builds a bounded prompt: subject, sender, and the first
    /// `PROMPT_BODY_LIMIT` characters of the body.
    fn build_prompt(text: &ExtractedText) -> String {
        let body: String = text.body.chars().take(PROMPT_BODY_LIMIT).collect();

        format!(
            r#"You are analyzing an email to decide whether it confirms a job application the recipient actually submitted.
Strictly distinguish genuine application confirmations from financial emails, automated job alerts, and newsletters.
A job-board alert or digest is NOT an application: set "is_automated_alert" true for those.

Respond ONLY with valid JSON in exactly this shape, no other text:
{{"is_job_application": true|false, "is_automated_alert": true|false, "company": "string or null", "position": "string or null", "status": "Applied|Interview|Offer|Rejected", "confidence": 0-100}}

Subject: {subject}
From: {sender}
Body:
{body}"#,
            subject = text.subject,
            sender = text.sender,
            body = body,
        )
    }

    /// Parses the model response. Tries the full text, then the first
    /// brace-delimited object inside it; anything else degrades to the
    /// safe default.
    fn parse_verdict(response: &str) -> ClassificationResult {
        let verdict = serde_json::from_str::<ModelVerdict>(response)
            .or_else(|_| serde_json::from_str::<ModelVerdict>(&extract_json(response)));

        match verdict {
            Ok(verdict) => {
                let confidence = verdict
                    .confidence
                    .map(|c| c.clamp(0.0, 100.0) as u8)
                    .unwrap_or(0);
                ClassificationResult {
                    is_job_application: verdict.is_job_application,
                    is_automated_alert: verdict.is_automated_alert,
                    company: verdict.company.filter(|c| !c.trim().is_empty()),
                    position: verdict.position.filter(|p| !p.trim().is_empty()),
                    status: verdict
                        .status
                        .as_deref()
                        .map(ApplicationStatus::from_label)
                        .unwrap_or_default(),
                    confidence,
                }
            }
            Err(e) => {
                warn!("Unparsable model verdict, discarding message: {}", e);
                ClassificationResult::discarded()
            }
        }
    }
}

#[async_trait]
impl Classifier for GenerativeClassifier {
    fn name(&self) -> &'static str {
        "generative"
    }

    async fn classify(&self, text: &ExtractedText) -> Result<ClassificationResult, ClassifyError> {
        let prompt = Self::build_prompt(text);
        let response = self.client.complete(&prompt).await?;
        debug!("Model response: {}", response);

        Ok(Self::parse_verdict(&response))
    }
}

/// Extracts the first brace-delimited JSON object from a response that may
/// carry extra text. Tracks string boundaries and escape sequences.
fn extract_json(response: &str) -> String {
    let start = match response.find('{') {
        Some(idx) => idx,
        None => return response.to_string(),
    };

    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;
    let mut end = response.len();

    for (i, c) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => {
                escape_next = true;
            }
            '"' => {
                in_string = !in_string;
            }
            '{' if !in_string => {
                depth += 1;
            }
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    end = start + i + 1;
                    break;
                }
            }
            _ => {}
        }
    }

    response[start..end].to_string()
}
