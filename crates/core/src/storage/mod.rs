//! SQLite storage layer for Keyward

mod accounts;
mod migrations;
mod parse;
mod roles;
mod sessions;
mod traits;
mod users;

use rusqlite::Connection;
use std::path::Path;
use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Account, Role, Session, User};

pub use accounts::AccountStore;
pub use roles::RoleStore;
pub use sessions::SessionStore;
pub use traits::{AccountRepository, RoleRepository, SessionRepository, Storage, UserRepository};
pub use users::UserStore;

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Get user store
    pub fn users(&self) -> UserStore<'_> {
        UserStore::new(&self.conn)
    }

    /// Get account store
    pub fn accounts(&self) -> AccountStore<'_> {
        AccountStore::new(&self.conn)
    }

    /// Get role store
    pub fn roles(&self) -> RoleStore<'_> {
        RoleStore::new(&self.conn)
    }

    /// Get session store
    pub fn sessions(&self) -> SessionStore<'_> {
        SessionStore::new(&self.conn)
    }
}

// Implement repository traits for Database
// This enables using Database through the trait interface

impl UserRepository for Database {
    fn create_user(&self, user: &User) -> Result<()> {
        self.users().create(user)
    }

    fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.users().find_by_id(id)
    }

    fn find_all_users(&self) -> Result<Vec<User>> {
        self.users().list()
    }
}

impl AccountRepository for Database {
    fn create_account(&self, account: &Account) -> Result<()> {
        self.accounts().create(account)
    }

    fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        self.accounts().find_by_id(id)
    }

    fn find_account_by_identifier(&self, account_identifier: &str) -> Result<Option<Account>> {
        self.accounts().find_by_identifier(account_identifier)
    }

    fn update_account(&self, account: &Account) -> Result<()> {
        self.accounts().update(account)
    }
}

impl RoleRepository for Database {
    fn create_role(&self, role: &Role) -> Result<()> {
        self.roles().create(role)
    }

    fn find_role(&self, identifier: &str) -> Result<Option<Role>> {
        self.roles().find(identifier)
    }

    fn find_all_roles(&self) -> Result<Vec<Role>> {
        self.roles().list()
    }
}

impl SessionRepository for Database {
    fn create_session(&self, session: &Session) -> Result<()> {
        self.sessions().create(session)
    }

    fn find_valid_session(&self, session_id: Uuid) -> Result<Option<Session>> {
        self.sessions().find_valid(session_id)
    }

    fn delete_session(&self, session_id: Uuid) -> Result<()> {
        self.sessions().delete(session_id)
    }

    fn cleanup_expired_sessions(&self) -> Result<u64> {
        self.sessions().cleanup_expired()
    }
}
