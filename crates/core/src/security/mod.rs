//! Security context
//!
//! Answers "who is driving this request". The activation service uses it to
//! make sure an operator never locks out the account they are logged in with.

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Account, Session};
use crate::storage::{AccountRepository, SessionRepository};

/// Source of the currently authenticated account
pub trait SecurityContext {
    /// Whether a security session is active for this request
    fn is_initialized(&self) -> bool;

    /// The account authenticated in the active session
    fn account(&self) -> Option<&Account>;
}

/// Context for tools running without any session
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousContext;

impl SecurityContext for AnonymousContext {
    fn is_initialized(&self) -> bool {
        false
    }

    fn account(&self) -> Option<&Account> {
        None
    }
}

/// Context backed by a stored session
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    session: Option<Session>,
    account: Option<Account>,
}

impl SessionContext {
    /// Resolve a session id to its account.
    ///
    /// An unknown or expired session yields an uninitialized context rather
    /// than an error.
    #[instrument(skip(storage))]
    pub fn resolve<S>(storage: &S, session_id: Uuid) -> Result<Self>
    where
        S: SessionRepository + AccountRepository + ?Sized,
    {
        let Some(session) = storage.find_valid_session(session_id)? else {
            debug!("No valid session");
            return Ok(Self::default());
        };

        let account = storage.find_account_by_id(session.account_id)?;
        if account.is_none() {
            debug!(account_id = %session.account_id, "Session account no longer exists");
            return Ok(Self::default());
        }

        Ok(Self {
            session: Some(session),
            account,
        })
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
}

impl SecurityContext for SessionContext {
    fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PersonName, User};
    use crate::storage::{Database, SessionRepository, UserRepository};

    fn setup_test_db() -> (Database, Account) {
        let db = Database::open_in_memory().unwrap();
        let mut user = User::new(PersonName::new("Ada", "Lovelace"));
        let account = user.add_account("ada", "hash").clone();
        db.create_user(&user).unwrap();
        (db, account)
    }

    #[test]
    fn test_anonymous_context() {
        assert!(!AnonymousContext.is_initialized());
        assert!(AnonymousContext.account().is_none());
    }

    #[test]
    fn test_resolve_valid_session() {
        let (db, account) = setup_test_db();
        let session = Session::new(account.id, 1).unwrap();
        db.create_session(&session).unwrap();

        let context = SessionContext::resolve(&db, session.id).unwrap();
        assert!(context.is_initialized());
        assert_eq!(context.account(), Some(&account));
        assert_eq!(context.session().map(|s| s.id), Some(session.id));
    }

    #[test]
    fn test_resolve_expired_session_is_uninitialized() {
        let (db, account) = setup_test_db();
        let session = Session::new(account.id, -1).unwrap();
        db.create_session(&session).unwrap();

        let context = SessionContext::resolve(&db, session.id).unwrap();
        assert!(!context.is_initialized());
        assert!(context.account().is_none());
    }

    #[test]
    fn test_resolve_unknown_session() {
        let (db, _) = setup_test_db();
        let context = SessionContext::resolve(&db, Uuid::new_v4()).unwrap();
        assert!(!context.is_initialized());
    }
}
