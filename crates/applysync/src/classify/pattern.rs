//! Deterministic pattern-matching classification strategy.

use async_trait::async_trait;
use log::debug;
use regex::Regex;

use crate::mail::ExtractedText;

use super::{ApplicationStatus, ClassificationResult, Classifier, ClassifyError};

/// Confidence reported when the company came from the sender domain.
const DOMAIN_CONFIDENCE: u8 = 100;

/// Confidence reported when the company came from a regex template.
const PATTERN_CONFIDENCE: u8 = 85;

/// Consumer webmail domains that never identify an employer.
const CONSUMER_DOMAINS: &[&str] = &["gmail", "yahoo", "hotmail", "outlook", "aol", "icloud"];

/// Generic words that a company capture must not equal.
const COMPANY_STOPLIST: &[&str] = &[
    "team",
    "teams",
    "career",
    "careers",
    "job",
    "jobs",
    "application",
    "applications",
    "portal",
    "hr",
    "recruiting",
    "recruitment",
    "talent",
    "hiring",
    "noreply",
    "no-reply",
];

/// Generic words that a position capture must not equal.
const POSITION_STOPLIST: &[&str] = &[
    "job",
    "jobs",
    "position",
    "role",
    "opportunity",
    "opening",
    "new",
    "this",
    "our",
    "the",
];

/// Body phrases that mark a rejection, checked case-insensitively.
const REJECTION_PHRASES: &[&str] = &[
    "regret to inform",
    "not moving forward",
    "not be moving forward",
    "not selected",
    "unfortunately",
    "pursue other candidates",
    "position has been filled",
];

/// Ordered company extraction templates; the first validated capture wins.
const COMPANY_TEMPLATES: &[&str] = &[
    r"(?i)thank you for applying (?:to|at) ([A-Za-z0-9][A-Za-z0-9&'\- ]*)",
    r"(?i)applied to ([A-Za-z0-9][A-Za-z0-9&'\- ]*)",
    r"(?i)your application (?:to|at|with) ([A-Za-z0-9][A-Za-z0-9&'\- ]*)",
    r"(?i)application (?:received|confirmed|confirmation)\s*[-:]\s*([A-Za-z0-9][A-Za-z0-9&'\- ]*)",
    r"(?i)welcome to ([A-Za-z0-9][A-Za-z0-9&'\- ]*)",
    r"(?i)from (?:the )?([A-Za-z0-9][A-Za-z0-9&'\- ]*?) (?:recruiting|talent|hiring) team",
    r"(?i)from (?:the )?([A-Za-z0-9][A-Za-z0-9&'\- ]*?) team",
    r"(?i)([A-Za-z0-9][A-Za-z0-9&'\- ]*?) careers",
];

/// Ordered position extraction templates; the first validated capture wins.
const POSITION_TEMPLATES: &[&str] = &[
    r"(?i)(?:position|role|job)\s*:\s*([A-Za-z0-9][A-Za-z0-9&'/\- ]*)",
    r"(?i)applying for (?:the |our )?([A-Za-z0-9][A-Za-z0-9&'/\- ]*?)\s*(?:position|role|opening)",
    r"(?i)application for (?:the )?([A-Za-z0-9][A-Za-z0-9&'/\- ]*?)\s*(?:position|role|opening)",
    r"(?i)interested in (?:the )?([A-Za-z0-9][A-Za-z0-9&'/\- ]*?)\s*(?:position|role|opening)",
    r"(?i)regarding the ([A-Za-z0-9][A-Za-z0-9&'/\- ]*?)\s*(?:position|role|opening)",
];

/// Deterministic classifier: sender-domain and regex-template extraction,
/// no external calls.
pub struct PatternClassifier {
    company_patterns: Vec<Regex>,
    position_patterns: Vec<Regex>,
}

impl PatternClassifier {
    pub fn new() -> Self {
        // Pre-compile all templates; an invalid one is dropped.
        Self {
            company_patterns: compile_all(COMPANY_TEMPLATES),
            position_patterns: compile_all(POSITION_TEMPLATES),
        }
    }

    /// Extracts a company name: sender-domain first, then templates over
    /// the subject, then over the body. Returns the name and confidence.
    fn extract_company(&self, subject: &str, body: &str, sender: &str) -> Option<(String, u8)> {
        if let Some(company) = company_from_sender(sender) {
            debug!("Company '{}' derived from sender domain", company);
            return Some((company, DOMAIN_CONFIDENCE));
        }

        for text in [subject, body] {
            for pattern in &self.company_patterns {
                if let Some(candidate) = capture(pattern, text) {
                    if let Some(company) = validate_company(&candidate) {
                        return Some((company, PATTERN_CONFIDENCE));
                    }
                }
            }
        }

        None
    }

    /// Extracts a position title from subject then body templates.
    fn extract_position(&self, subject: &str, body: &str) -> Option<String> {
        for text in [subject, body] {
            for pattern in &self.position_patterns {
                if let Some(candidate) = capture(pattern, text) {
                    if let Some(position) = validate_position(&candidate) {
                        return Some(position);
                    }
                }
            }
        }

        None
    }
}

impl Default for PatternClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Classifier for PatternClassifier {
    fn name(&self) -> &'static str {
        "pattern"
    }

    async fn classify(&self, text: &ExtractedText) -> Result<ClassificationResult, ClassifyError> {
        let Some((company, confidence)) =
            self.extract_company(&text.subject, &text.body, &text.sender)
        else {
            return Ok(ClassificationResult {
                is_job_application: false,
                is_automated_alert: false,
                company: None,
                position: None,
                status: ApplicationStatus::Applied,
                confidence: 0,
            });
        };

        let position = self.extract_position(&text.subject, &text.body);
        let status = detect_status(&text.body);

        Ok(ClassificationResult {
            is_job_application: true,
            is_automated_alert: false,
            company: Some(company),
            position,
            status,
            confidence,
        })
    }
}

fn compile_all(templates: &[&str]) -> Vec<Regex> {
    templates
        .iter()
        .filter_map(|t| Regex::new(t).ok())
        .collect()
}

/// Runs a template and returns its trimmed first capture group.
fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Derives a company from the sender's domain: the registrable label,
/// title-cased, unless it is consumer webmail or too short.
fn company_from_sender(sender: &str) -> Option<String> {
    let address = sender_address(sender)?;
    let domain = address.rsplit('@').next()?;

    let labels: Vec<&str> = domain.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() < 2 {
        return None;
    }
    let label = labels[labels.len() - 2].to_ascii_lowercase();

    if CONSUMER_DOMAINS.contains(&label.as_str()) {
        return None;
    }

    let company = title_case(&label);
    (company.len() > 2).then_some(company)
}

/// Pulls the bare address out of a From header
/// (`"Name <addr@host>"` or `addr@host`).
fn sender_address(sender: &str) -> Option<&str> {
    let sender = sender.trim();
    if let (Some(start), Some(end)) = (sender.rfind('<'), sender.rfind('>')) {
        if start < end {
            let inner = sender[start + 1..end].trim();
            return inner.contains('@').then_some(inner);
        }
    }
    sender.contains('@').then_some(sender)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// A company capture is kept when it is 2-40 chars, contains a letter,
/// and is not a generic stoplist word.
fn validate_company(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    let length = candidate.chars().count();
    if !(2..=40).contains(&length) {
        return None;
    }
    if !candidate.chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    if COMPANY_STOPLIST.contains(&candidate.to_lowercase().as_str()) {
        return None;
    }
    Some(candidate.to_string())
}

/// A position capture is kept when it is 3-50 chars, contains a letter,
/// and is not a generic stoplist word.
fn validate_position(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    let length = candidate.chars().count();
    if !(3..=50).contains(&length) {
        return None;
    }
    if !candidate.chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    if POSITION_STOPLIST.contains(&candidate.to_lowercase().as_str()) {
        return None;
    }
    Some(candidate.to_string())
}

/// Rejection phrases in the body resolve the status to `Rejected`;
/// everything else is `Applied`. Interview/Offer are not derivable here.
fn detect_status(body: &str) -> ApplicationStatus {
    let body_lower = body.to_lowercase();
    if REJECTION_PHRASES.iter().any(|p| body_lower.contains(p)) {
        ApplicationStatus::Rejected
    } else {
        ApplicationStatus::Applied
    }
}
