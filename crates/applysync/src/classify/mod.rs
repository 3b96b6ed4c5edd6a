//! Message classification: the shared contract and its two strategies.
//!
//! The orchestrator holds whichever [`Classifier`] is configured and never
//! branches on strategy type.

pub mod filter;
pub mod generative;
pub mod pattern;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mail::ExtractedText;

pub use filter::CandidateFilter;
pub use generative::{CompletionClient, GenerativeClassifier, HttpCompletionClient};
pub use pattern::PatternClassifier;

/// Confidence above which a candidate counts as a genuine application.
/// Applied by the caller, not inside a strategy.
pub const ACCEPT_THRESHOLD: u8 = 70;

/// Lifecycle status of a job application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Interview,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Badge color shown for this status. Unrecognized labels parse to
    /// `Applied`, which maps to `primary`.
    pub fn display_color(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "primary",
            ApplicationStatus::Rejected => "danger",
            ApplicationStatus::Interview => "success",
            ApplicationStatus::Offer => "warning",
        }
    }

    /// Lenient label parsing for model-reported statuses.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "interview" => ApplicationStatus::Interview,
            "offer" => ApplicationStatus::Offer,
            "rejected" => ApplicationStatus::Rejected,
            _ => ApplicationStatus::Applied,
        }
    }
}

/// Output of a classification strategy.
///
/// When `is_job_application` is false, `company` and `position` carry no
/// meaning and must not be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub is_job_application: bool,
    /// True for job-board alerts and digests: job-related, but not an
    /// actual application event. Excludes the message even when
    /// `is_job_application` is set.
    pub is_automated_alert: bool,
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: ApplicationStatus,
    /// 0-100.
    pub confidence: u8,
}

impl ClassificationResult {
    /// Safe default used when a strategy cannot produce a verdict.
    pub fn discarded() -> Self {
        Self {
            is_job_application: false,
            is_automated_alert: true,
            company: None,
            position: None,
            status: ApplicationStatus::Applied,
            confidence: 0,
        }
    }

    /// Whether the caller should treat this as a genuine application.
    pub fn accepts(&self) -> bool {
        self.is_job_application && !self.is_automated_alert && self.confidence > ACCEPT_THRESHOLD
    }
}

/// Errors a classification strategy can raise. Parse problems inside the
/// generative strategy degrade to [`ClassificationResult::discarded`]
/// instead of surfacing here; these are transport and configuration faults.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// The completion endpoint failed or returned a non-success status.
    #[error("Completion request failed: {0}")]
    Completion(String),

    /// The configured API key environment variable is not set.
    #[error("Credentials not found: environment variable '{0}' is not set")]
    CredentialsNotFound(String),

    /// Invalid strategy configuration.
    #[error("Invalid classifier configuration: {0}")]
    Config(String),
}

/// The classification contract both strategies implement.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Tag recorded as the source of accepted applications.
    fn name(&self) -> &'static str;

    async fn classify(&self, text: &ExtractedText) -> Result<ClassificationResult, ClassifyError>;
}
