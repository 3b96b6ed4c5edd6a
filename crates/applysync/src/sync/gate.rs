//! Deduplication and persistence gate.
//!
//! The gate is the only writer of application records. Re-running a sync
//! never double-inserts: candidates are checked against the dedup key
//! (user, company, position, message id), and a unique-constraint
//! violation from a racing run is treated as a benign duplicate.

use chrono::{DateTime, FixedOffset, Utc};
use log::debug;
use uuid::Uuid;

use crate::classify::ApplicationStatus;
use crate::db::application_repo::{self, ApplicationRow};
use crate::db::{Database, DatabaseError};

/// Sentinel stored when position extraction found nothing.
pub const POSITION_NOT_FOUND: &str = "Position Not Found";

/// A classified message proposed for persistence.
#[derive(Debug, Clone)]
pub struct ApplicationCandidate {
    pub company: String,
    pub position: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<FixedOffset>,
    /// Strategy tag recorded as the record's source.
    pub source: &'static str,
    /// Originating mail message id, part of the dedup key.
    pub message_id: String,
    pub confidence: u8,
}

/// Outcome of offering a candidate to the gate.
#[derive(Debug, Clone)]
pub enum GateOutcome {
    Accepted(ApplicationRow),
    Duplicate,
}

/// Gate in front of the persistence collaborator.
#[derive(Clone)]
pub struct ApplicationGate {
    db: Database,
}

impl ApplicationGate {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Persists a candidate unless an identical application already exists
    /// for this user.
    pub fn accept(
        &self,
        user_id: &str,
        candidate: &ApplicationCandidate,
    ) -> Result<GateOutcome, DatabaseError> {
        let position = candidate
            .position
            .clone()
            .unwrap_or_else(|| POSITION_NOT_FOUND.to_string());

        if application_repo::find_existing(
            &self.db,
            user_id,
            &candidate.company,
            &position,
            &candidate.message_id,
        )?
        .is_some()
        {
            debug!(
                "Skipping duplicate application for user '{}': {} / {}",
                user_id, candidate.company, position
            );
            return Ok(GateOutcome::Duplicate);
        }

        let now = Utc::now().to_rfc3339();
        let row = ApplicationRow {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            company: candidate.company.clone(),
            position,
            status: candidate.status.as_str().to_string(),
            status_color: candidate.status.display_color().to_string(),
            applied_at: candidate.applied_at.to_rfc3339(),
            source: candidate.source.to_string(),
            message_id: candidate.message_id.clone(),
            confidence: candidate.confidence,
            created_at: now.clone(),
            updated_at: now,
        };

        match application_repo::insert(&self.db, &row) {
            Ok(()) => Ok(GateOutcome::Accepted(row)),
            // A racing sync inserted the same key between the lookup and
            // the insert. The unique index makes this benign.
            Err(e) if e.is_unique_violation() => Ok(GateOutcome::Duplicate),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> ApplicationGate {
        ApplicationGate::new(Database::open_in_memory().unwrap())
    }

    fn candidate(company: &str, message_id: &str) -> ApplicationCandidate {
        ApplicationCandidate {
            company: company.to_string(),
            position: Some("Engineer".to_string()),
            status: ApplicationStatus::Applied,
            applied_at: DateTime::parse_from_rfc2822("Thu, 1 Feb 2024 10:00:00 +0000").unwrap(),
            source: "pattern",
            message_id: message_id.to_string(),
            confidence: 100,
        }
    }

    #[test]
    fn test_accept_persists_row() {
        let gate = gate();
        let outcome = gate.accept("u1", &candidate("Acme", "m1")).unwrap();
        let GateOutcome::Accepted(row) = outcome else {
            panic!("expected acceptance");
        };
        assert_eq!(row.company, "Acme");
        assert_eq!(row.status, "Applied");
        assert_eq!(row.status_color, "primary");
        assert_eq!(row.source, "pattern");
        assert!(!row.id.is_empty());
    }

    #[test]
    fn test_second_accept_is_duplicate() {
        let gate = gate();
        assert!(matches!(
            gate.accept("u1", &candidate("Acme", "m1")).unwrap(),
            GateOutcome::Accepted(_)
        ));
        assert!(matches!(
            gate.accept("u1", &candidate("Acme", "m1")).unwrap(),
            GateOutcome::Duplicate
        ));
    }

    #[test]
    fn test_same_candidate_different_user_is_accepted() {
        let gate = gate();
        assert!(matches!(
            gate.accept("u1", &candidate("Acme", "m1")).unwrap(),
            GateOutcome::Accepted(_)
        ));
        assert!(matches!(
            gate.accept("u2", &candidate("Acme", "m1")).unwrap(),
            GateOutcome::Accepted(_)
        ));
    }

    #[test]
    fn test_missing_position_uses_sentinel() {
        let gate = gate();
        let mut no_position = candidate("Acme", "m1");
        no_position.position = None;

        let GateOutcome::Accepted(row) = gate.accept("u1", &no_position).unwrap() else {
            panic!("expected acceptance");
        };
        assert_eq!(row.position, POSITION_NOT_FOUND);
    }

    #[test]
    fn test_rejected_status_maps_to_danger() {
        let gate = gate();
        let mut rejected = candidate("Acme", "m1");
        rejected.status = ApplicationStatus::Rejected;

        let GateOutcome::Accepted(row) = gate.accept("u1", &rejected).unwrap() else {
            panic!("expected acceptance");
        };
        assert_eq!(row.status_color, "danger");
    }
}
