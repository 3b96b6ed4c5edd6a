//! Cheap pre-filter that narrows a broad mailbox search down to plausible
//! job-related messages before the expensive classification step.

use log::debug;

/// Subjects containing any of these are obvious non-candidates
/// (finance and bulk mail), matched case-insensitively.
const EXCLUDED_SUBJECT_KEYWORDS: &[&str] = &[
    "credit card",
    "banking",
    "financial",
    "insurance",
    "newsletter",
    "digest",
    "weekly",
];

/// Sender addresses containing these are list mail, never applications.
const EXCLUDED_SENDER_KEYWORDS: &[&str] = &["newsletter", "digest"];

/// Coarse candidate filter. May pass false positives (the classifier
/// rejects those later) but must not drop true application mail.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateFilter;

impl CandidateFilter {
    pub fn new() -> Self {
        Self
    }

    /// Whether a message is worth classifying at all.
    pub fn is_candidate(&self, subject: &str, sender: &str) -> bool {
        let subject_lower = subject.to_lowercase();
        if let Some(keyword) = EXCLUDED_SUBJECT_KEYWORDS
            .iter()
            .find(|k| subject_lower.contains(*k))
        {
            debug!("Subject excluded by keyword '{}'", keyword);
            return false;
        }

        let sender_lower = sender.to_lowercase();
        if let Some(keyword) = EXCLUDED_SENDER_KEYWORDS
            .iter()
            .find(|k| sender_lower.contains(*k))
        {
            debug!("Sender excluded by keyword '{}'", keyword);
            return false;
        }

        true
    }
}
