//! User storage operations

use rusqlite::{params, Connection, Row};
use tracing::instrument;
use uuid::Uuid;

use super::accounts::{insert_account, AccountStore};
use super::parse::{parse_datetime, parse_uuid, OptionalExt};
use crate::error::Result;
use crate::invariants::assert_user_invariants;
use crate::models::{PersonName, User};

pub struct UserStore<'a> {
    conn: &'a Connection,
}

impl<'a> UserStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a user and all accounts it owns
    #[instrument(skip(self, user), fields(user = %user.label()))]
    pub fn create(&self, user: &User) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO users (id, first_name, last_name, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id.to_string(),
                user.name.first_name,
                user.name.last_name,
                user.created_at.to_rfc3339(),
            ],
        )?;

        for account in &user.accounts {
            insert_account(&tx, account)?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Find user by ID, with accounts
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, first_name, last_name, created_at FROM users WHERE id = ?1",
                params![id.to_string()],
                user_from_row,
            )
            .optional()?;

        user.map(|u| self.with_accounts(u)).transpose()
    }

    /// Every user in the system, with accounts
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, first_name, last_name, created_at FROM users ORDER BY created_at, id",
        )?;

        let users = stmt
            .query_map([], user_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        users.into_iter().map(|u| self.with_accounts(u)).collect()
    }

    fn with_accounts(&self, mut user: User) -> Result<User> {
        user.accounts = AccountStore::new(self.conn).list_for_user(user.id)?;
        assert_user_invariants(&user);
        Ok(user)
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_uuid(&row.get::<_, String>(0)?)?,
        name: PersonName::new(row.get::<_, String>(1)?, row.get::<_, String>(2)?),
        created_at: parse_datetime(&row.get::<_, String>(3)?)?,
        accounts: Vec::new(),
    })
}
