//! Sync orchestrator: drives the end-to-end batch from mailbox search to
//! persisted application records.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, info_span, warn};

use crate::classify::{CandidateFilter, Classifier};
use crate::config::SyncConfig;
use crate::db::application_repo::{self, ApplicationRow};
use crate::db::Database;
use crate::mail::{ExtractedText, MailCredential, MailSource, RawMessage};

use super::error::{SkipReason, SyncError};
use super::gate::{ApplicationCandidate, ApplicationGate, GateOutcome};

/// A message that was fetched but produced no application record.
#[derive(Debug, Clone)]
pub struct SkippedMessage {
    pub message_id: String,
    pub reason: SkipReason,
}

/// Result of a sync run. Always returned for a completed run; only the
/// initial mailbox search can fail the whole batch.
#[derive(Debug, Default)]
pub struct SyncSummary {
    /// Applications persisted by this run.
    pub new_added: usize,
    /// Messages fetched and examined, including every skipped one.
    pub total_processed: usize,
    /// Accepted records in original fetch order.
    pub applications: Vec<ApplicationRow>,
    /// Skipped messages with their reasons, in original fetch order.
    pub skipped: Vec<SkippedMessage>,
}

/// What processing a single message resolved to.
enum MessageOutcome {
    Accepted(ApplicationRow),
    Skipped(SkipReason),
}

/// The engine owns one mail source and one classification strategy; both
/// arrive by injection and are never looked up ambiently.
pub struct SyncEngine {
    source: Arc<dyn MailSource>,
    classifier: Arc<dyn Classifier>,
    filter: CandidateFilter,
    gate: ApplicationGate,
    db: Database,
    config: SyncConfig,
}

impl SyncEngine {
    pub fn new(
        source: Arc<dyn MailSource>,
        classifier: Arc<dyn Classifier>,
        db: Database,
        config: SyncConfig,
    ) -> Self {
        Self {
            source,
            classifier,
            filter: CandidateFilter::new(),
            gate: ApplicationGate::new(db.clone()),
            db,
            config,
        }
    }

    /// Runs one sync batch for a user. A mailbox search failure is fatal;
    /// every per-message fault is isolated, counted, and reported in the
    /// summary.
    pub async fn sync(
        &self,
        user_id: &str,
        credential: &MailCredential,
    ) -> Result<SyncSummary, SyncError> {
        let _span = info_span!("sync", user_id = %user_id, strategy = self.classifier.name())
            .entered();
        info!("Starting application sync");

        let messages = self
            .source
            .search(credential, &self.config.search_query, self.config.max_results)
            .await?;
        info!("Fetched {} candidate messages", messages.len());

        let mut summary = SyncSummary::default();
        for message in &messages {
            summary.total_processed += 1;
            match self.process_message(user_id, message).await {
                MessageOutcome::Accepted(row) => {
                    debug!(
                        "Accepted application: {} / {}",
                        row.company, row.position
                    );
                    summary.applications.push(row);
                }
                MessageOutcome::Skipped(reason) => {
                    debug!("Skipped message '{}': {}", message.id, reason);
                    summary.skipped.push(SkippedMessage {
                        message_id: message.id.clone(),
                        reason,
                    });
                }
            }
        }

        summary.new_added = summary.applications.len();
        info!(
            "Sync complete: {} new, {} processed, {} skipped",
            summary.new_added,
            summary.total_processed,
            summary.skipped.len()
        );

        Ok(summary)
    }

    /// Runs one message through extract → filter → classify → gate.
    async fn process_message(&self, user_id: &str, message: &RawMessage) -> MessageOutcome {
        let _span = info_span!("message", id = %message.id).entered();

        let text = match ExtractedText::from_message(message, self.config.body_limit) {
            Ok(text) => text,
            Err(e) => {
                warn!("Malformed message '{}': {}", message.id, e);
                return MessageOutcome::Skipped(SkipReason::Malformed(e.to_string()));
            }
        };

        if !self.filter.is_candidate(&text.subject, &text.sender) {
            return MessageOutcome::Skipped(SkipReason::PrefilterExcluded);
        }

        let timeout = Duration::from_secs(self.config.classify_timeout_secs);
        let result = match tokio::time::timeout(timeout, self.classifier.classify(&text)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!("Classifier failed on message '{}': {}", message.id, e);
                return MessageOutcome::Skipped(SkipReason::ClassifierFailed(e.to_string()));
            }
            Err(_) => {
                warn!(
                    "Classification of message '{}' timed out after {:?}",
                    message.id, timeout
                );
                return MessageOutcome::Skipped(SkipReason::ClassifierFailed(
                    "timed out".to_string(),
                ));
            }
        };

        if !result.is_job_application {
            return MessageOutcome::Skipped(SkipReason::NotApplication);
        }
        if result.is_automated_alert {
            return MessageOutcome::Skipped(SkipReason::AutomatedAlert);
        }
        if !result.accepts() {
            return MessageOutcome::Skipped(SkipReason::BelowThreshold {
                confidence: result.confidence,
            });
        }
        let Some(company) = result.company else {
            // The contract makes company mandatory for a persisted record;
            // a positive verdict without one cannot be stored.
            warn!(
                "Classifier accepted message '{}' without a company; skipping",
                message.id
            );
            return MessageOutcome::Skipped(SkipReason::NotApplication);
        };

        let candidate = ApplicationCandidate {
            company,
            position: result.position,
            status: result.status,
            applied_at: text.received_at,
            source: self.classifier.name(),
            message_id: message.id.clone(),
            confidence: result.confidence,
        };

        match self.gate.accept(user_id, &candidate) {
            Ok(GateOutcome::Accepted(row)) => MessageOutcome::Accepted(row),
            Ok(GateOutcome::Duplicate) => MessageOutcome::Skipped(SkipReason::Duplicate),
            Err(e) => {
                warn!("Failed to persist application from '{}': {}", message.id, e);
                MessageOutcome::Skipped(SkipReason::StorageFailed(e.to_string()))
            }
        }
    }

    /// Lists a user's stored applications, oldest first.
    pub fn list(&self, user_id: &str) -> Result<Vec<ApplicationRow>, SyncError> {
        Ok(application_repo::list_by_user(&self.db, user_id)?)
    }

    /// Deletes every stored application for a user. Returns the count.
    pub fn clear(&self, user_id: &str) -> Result<u64, SyncError> {
        let deleted = application_repo::delete_by_user(&self.db, user_id)?;
        info!("Cleared {} applications for user '{}'", deleted, user_id);
        Ok(deleted)
    }
}
