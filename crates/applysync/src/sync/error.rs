//! Sync error taxonomy.
//!
//! Only the initial mailbox search and administrative operations can fail
//! the run; every per-message fault degrades to an observable
//! [`SkipReason`] instead of aborting the batch.

use std::fmt;

use thiserror::Error;

use crate::db::DatabaseError;
use crate::mail::MailError;

/// Fatal errors that abort a sync run, distinguishable from an empty
/// summary.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The mailbox search failed: invalid credential or adapter unreachable.
    #[error("Mailbox search failed: {0}")]
    Source(#[from] MailError),

    /// Storage failure in an administrative operation (clear, list).
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Why a fetched message did not become an application record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Malformed payload, undecodable content, or a bad Date header.
    Malformed(String),
    /// Excluded by the cheap candidate pre-filter; never classified.
    PrefilterExcluded,
    /// The classifier decided this is not a job application.
    NotApplication,
    /// Job-related but an automated alert or digest, not an application.
    AutomatedAlert,
    /// Classified as an application but below the acceptance threshold.
    BelowThreshold { confidence: u8 },
    /// An identical application already exists for this user.
    Duplicate,
    /// The classifier faulted or timed out.
    ClassifierFailed(String),
    /// Persisting the accepted record failed.
    StorageFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Malformed(detail) => write!(f, "malformed message: {}", detail),
            SkipReason::PrefilterExcluded => write!(f, "excluded by candidate filter"),
            SkipReason::NotApplication => write!(f, "not a job application"),
            SkipReason::AutomatedAlert => write!(f, "automated job alert"),
            SkipReason::BelowThreshold { confidence } => {
                write!(f, "confidence {} below threshold", confidence)
            }
            SkipReason::Duplicate => write!(f, "duplicate application"),
            SkipReason::ClassifierFailed(detail) => write!(f, "classifier failed: {}", detail),
            SkipReason::StorageFailed(detail) => write!(f, "storage failed: {}", detail),
        }
    }
}
