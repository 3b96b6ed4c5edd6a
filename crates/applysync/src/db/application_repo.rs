//! Application repository — CRUD operations for the `applications` table.

use rusqlite::{params, Row};

use super::{Database, DatabaseError};

/// A raw application row from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationRow {
    pub id: String,
    pub user_id: String,
    pub company: String,
    pub position: String,
    pub status: String,
    pub status_color: String,
    pub applied_at: String,
    pub source: String,
    pub message_id: String,
    pub confidence: u8,
    pub created_at: String,
    pub updated_at: String,
}

impl ApplicationRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            company: row.get("company")?,
            position: row.get("position")?,
            status: row.get("status")?,
            status_color: row.get("status_color")?,
            applied_at: row.get("applied_at")?,
            source: row.get("source")?,
            message_id: row.get("message_id")?,
            confidence: row.get("confidence")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Inserts a new application row. The unique index on
/// (user_id, company, position, message_id) rejects duplicates.
pub fn insert(db: &Database, row: &ApplicationRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO applications (id, user_id, company, position, status, status_color,
             applied_at, source, message_id, confidence, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                row.id,
                row.user_id,
                row.company,
                row.position,
                row.status,
                row.status_color,
                row.applied_at,
                row.source,
                row.message_id,
                row.confidence,
                row.created_at,
                row.updated_at,
            ],
        )?;
        Ok(())
    })
}

/// Finds an existing application by its dedup key.
pub fn find_existing(
    db: &Database,
    user_id: &str,
    company: &str,
    position: &str,
    message_id: &str,
) -> Result<Option<ApplicationRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM applications
             WHERE user_id = ?1 AND company = ?2 AND position = ?3 AND message_id = ?4",
        )?;
        let mut rows = stmt.query_map(params![user_id, company, position, message_id], |row| {
            ApplicationRow::from_row(row)
        })?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Lists all applications for a user, oldest first.
pub fn list_by_user(db: &Database, user_id: &str) -> Result<Vec<ApplicationRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM applications WHERE user_id = ?1 ORDER BY created_at, id",
        )?;
        let rows: Vec<ApplicationRow> = stmt
            .query_map(params![user_id], |row| ApplicationRow::from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Counts applications for a user.
pub fn count_by_user(db: &Database, user_id: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM applications WHERE user_id = ?1",
            params![user_id],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}

/// Deletes all applications for a user. Returns the number of rows deleted.
pub fn delete_by_user(db: &Database, user_id: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count = conn.execute(
            "DELETE FROM applications WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(count as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().expect("Failed to create test database")
    }

    fn sample_row(user: &str, company: &str, message_id: &str) -> ApplicationRow {
        ApplicationRow {
            id: format!("{}:{}:{}", user, company, message_id),
            user_id: user.to_string(),
            company: company.to_string(),
            position: "Software Engineer".to_string(),
            status: "Applied".to_string(),
            status_color: "primary".to_string(),
            applied_at: "2026-01-01T00:00:00+00:00".to_string(),
            source: "pattern".to_string(),
            message_id: message_id.to_string(),
            confidence: 100,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_insert_and_count() {
        let db = test_db();
        insert(&db, &sample_row("u1", "Acme", "m1")).unwrap();
        insert(&db, &sample_row("u1", "Globex", "m2")).unwrap();
        insert(&db, &sample_row("u2", "Acme", "m1")).unwrap();

        assert_eq!(count_by_user(&db, "u1").unwrap(), 2);
        assert_eq!(count_by_user(&db, "u2").unwrap(), 1);
        assert_eq!(count_by_user(&db, "missing").unwrap(), 0);
    }

    #[test]
    fn test_insert_duplicate_key_fails() {
        let db = test_db();
        insert(&db, &sample_row("u1", "Acme", "m1")).unwrap();

        let mut dup = sample_row("u1", "Acme", "m1");
        dup.id = "different-row-id".to_string();
        let err = insert(&db, &dup).unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[test]
    fn test_find_existing() {
        let db = test_db();
        assert!(
            find_existing(&db, "u1", "Acme", "Software Engineer", "m1")
                .unwrap()
                .is_none()
        );

        insert(&db, &sample_row("u1", "Acme", "m1")).unwrap();

        let found = find_existing(&db, "u1", "Acme", "Software Engineer", "m1")
            .unwrap()
            .unwrap();
        assert_eq!(found.company, "Acme");
        assert_eq!(found.confidence, 100);

        // Another user's identical application is not a hit.
        assert!(
            find_existing(&db, "u2", "Acme", "Software Engineer", "m1")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_list_by_user() {
        let db = test_db();
        let mut first = sample_row("u1", "Acme", "m1");
        first.created_at = "2026-01-01T00:00:00Z".to_string();
        let mut second = sample_row("u1", "Globex", "m2");
        second.created_at = "2026-01-02T00:00:00Z".to_string();
        insert(&db, &second).unwrap();
        insert(&db, &first).unwrap();

        let rows = list_by_user(&db, "u1").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].company, "Acme");
        assert_eq!(rows[1].company, "Globex");
    }

    #[test]
    fn test_delete_by_user_is_scoped() {
        let db = test_db();
        insert(&db, &sample_row("u1", "Acme", "m1")).unwrap();
        insert(&db, &sample_row("u1", "Globex", "m2")).unwrap();
        insert(&db, &sample_row("u2", "Acme", "m1")).unwrap();

        let deleted = delete_by_user(&db, "u1").unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(count_by_user(&db, "u1").unwrap(), 0);
        assert_eq!(count_by_user(&db, "u2").unwrap(), 1);
    }
}
