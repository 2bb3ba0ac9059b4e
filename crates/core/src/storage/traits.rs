//! Storage repository traits
//!
//! These traits define the storage interface, allowing for different
//! implementations (SQLite, in-memory test doubles).

use uuid::Uuid;

use crate::error::Result;
use crate::models::{Account, Role, Session, User};

/// User repository operations
pub trait UserRepository {
    /// Create a new user together with its accounts
    fn create_user(&self, user: &User) -> Result<()>;

    /// Find user by ID
    fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Load every user with its accounts and their roles
    fn find_all_users(&self) -> Result<Vec<User>>;
}

/// Account repository operations
pub trait AccountRepository {
    /// Create a new account
    fn create_account(&self, account: &Account) -> Result<()>;

    /// Find account by ID
    fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>>;

    /// Find account by login name
    fn find_account_by_identifier(&self, account_identifier: &str) -> Result<Option<Account>>;

    /// Persist changes to an existing account
    fn update_account(&self, account: &Account) -> Result<()>;
}

/// Role repository operations
pub trait RoleRepository {
    /// Register a role
    fn create_role(&self, role: &Role) -> Result<()>;

    /// Find role by identifier
    fn find_role(&self, identifier: &str) -> Result<Option<Role>>;

    /// List all roles
    fn find_all_roles(&self) -> Result<Vec<Role>>;
}

/// Session repository operations
pub trait SessionRepository {
    /// Create a session
    fn create_session(&self, session: &Session) -> Result<()>;

    /// Find a valid (non-expired) session
    fn find_valid_session(&self, session_id: Uuid) -> Result<Option<Session>>;

    /// Delete a session
    fn delete_session(&self, session_id: Uuid) -> Result<()>;

    /// Clean up expired sessions
    fn cleanup_expired_sessions(&self) -> Result<u64>;
}

/// Combined storage interface
///
/// Provides access to all repository operations.
/// Implementations may be backed by SQLite or test doubles.
pub trait Storage: UserRepository + AccountRepository + RoleRepository + SessionRepository {}

// Blanket implementation: any type implementing all traits implements Storage
impl<T> Storage for T where
    T: UserRepository + AccountRepository + RoleRepository + SessionRepository
{
}
