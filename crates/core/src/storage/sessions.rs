//! Session storage operations

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{parse_datetime, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::models::Session;

pub struct SessionStore<'a> {
    conn: &'a Connection,
}

impl<'a> SessionStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a session
    #[instrument(skip(self, session), fields(account_id = %session.account_id))]
    pub fn create(&self, session: &Session) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sessions (id, account_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                session.id.to_string(),
                session.account_id.to_string(),
                session.created_at.to_rfc3339(),
                session.expires_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find valid session
    #[instrument(skip(self))]
    pub fn find_valid(&self, session_id: Uuid) -> Result<Option<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, account_id, created_at, expires_at FROM sessions WHERE id = ?1 AND expires_at > ?2",
        )?;

        let now = Utc::now().to_rfc3339();
        let session = stmt
            .query_row(params![session_id.to_string(), now], |row| {
                Ok(Session {
                    id: parse_uuid(&row.get::<_, String>(0)?)?,
                    account_id: parse_uuid(&row.get::<_, String>(1)?)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?)?,
                    expires_at: parse_datetime(&row.get::<_, String>(3)?)?,
                })
            })
            .optional()?;

        Ok(session)
    }

    /// Delete session
    pub fn delete(&self, session_id: Uuid) -> Result<()> {
        self.conn.execute(
            "DELETE FROM sessions WHERE id = ?1",
            params![session_id.to_string()],
        )?;
        Ok(())
    }

    /// Clean up expired sessions
    pub fn cleanup_expired(&self) -> Result<u64> {
        let count = self.conn.execute(
            "DELETE FROM sessions WHERE expires_at < ?1",
            params![Utc::now().to_rfc3339()],
        )?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{Account, PersonName, Session, User};
    use crate::storage::Database;

    fn setup_test_db() -> (Database, Account) {
        let db = Database::open_in_memory().unwrap();
        let mut user = User::new(PersonName::new("Ada", "Lovelace"));
        let account = user.add_account("ada", "hash").clone();
        db.users().create(&user).unwrap();
        (db, account)
    }

    #[test]
    fn test_valid_session_roundtrip() {
        let (db, account) = setup_test_db();
        let session = Session::new(account.id, 8).unwrap();
        db.sessions().create(&session).unwrap();

        let found = db.sessions().find_valid(session.id).unwrap().unwrap();
        assert_eq!(found.account_id, account.id);

        db.sessions().delete(session.id).unwrap();
        assert!(db.sessions().find_valid(session.id).unwrap().is_none());
    }

    #[test]
    fn test_expired_session_ignored_and_cleaned_up() {
        let (db, account) = setup_test_db();
        let session = Session::new(account.id, -1).unwrap();
        db.sessions().create(&session).unwrap();

        assert!(db.sessions().find_valid(session.id).unwrap().is_none());
        assert_eq!(db.sessions().cleanup_expired().unwrap(), 1);
    }
}
