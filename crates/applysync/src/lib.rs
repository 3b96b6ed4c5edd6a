pub mod classify;
pub mod config;
pub mod db;
pub mod logging;
pub mod mail;
pub mod sync;

pub use classify::{
    ApplicationStatus, CandidateFilter, ClassificationResult, Classifier, ClassifyError,
    GenerativeClassifier, HttpCompletionClient, PatternClassifier,
};
pub use config::{load_config, ConfigError, GenerativeConfig, SyncConfig};
pub use db::{Database, DatabaseError};
pub use mail::{ExtractedText, GmailClient, MailCredential, MailError, MailSource, RawMessage};
pub use sync::{SkipReason, SyncEngine, SyncError, SyncSummary};
