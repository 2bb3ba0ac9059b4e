//! User management facade
//!
//! What the management front end talks to: listings for the overview and
//! the four activation actions, each answered with a flash message.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use super::activation::ActivationService;
use crate::error::{Error, Result};
use crate::models::{Role, User};
use crate::security::SecurityContext;
use crate::storage::Storage;

/// Severity of a flash message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Error,
}

/// User-facing confirmation of an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    pub severity: Severity,
    pub text: String,
}

impl FlashMessage {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Ok,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }
}

impl std::fmt::Display for FlashMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Data for the management overview
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    /// Owner of the session account, if logged in
    pub current_user: Option<User>,
    /// Active users first, then by last and first name
    pub users: Vec<User>,
    /// Sorted by role name
    pub roles: Vec<Role>,
}

pub struct UserManagement<'a, S: ?Sized, C: ?Sized> {
    storage: &'a S,
    security: &'a C,
}

impl<'a, S, C> UserManagement<'a, S, C>
where
    S: Storage + ?Sized,
    C: SecurityContext + ?Sized,
{
    pub fn new(storage: &'a S, security: &'a C) -> Self {
        Self { storage, security }
    }

    fn activation(&self) -> ActivationService<'a, S, S, C> {
        ActivationService::new(self.storage, self.storage, self.security)
    }

    #[instrument(skip(self))]
    pub fn overview(&self) -> Result<Overview> {
        let current_user = match self.security.account() {
            Some(account) if self.security.is_initialized() => {
                self.storage.find_user_by_id(account.user_id)?
            }
            _ => None,
        };

        let mut users = self.storage.find_all_users()?;
        users.sort_by(compare_users);

        let mut roles = self.storage.find_all_roles()?;
        roles.sort_by(|a, b| a.name().cmp(b.name()));

        Ok(Overview {
            current_user,
            users,
            roles,
        })
    }

    pub fn activate_user(&self, user_id: Uuid) -> Result<FlashMessage> {
        let mut user = self.load_user(user_id)?;
        self.activation().activate_user(&mut user)?;
        Ok(FlashMessage::ok(format!(
            "User \"{}\" was activated!",
            user.label()
        )))
    }

    pub fn deactivate_user(&self, user_id: Uuid) -> Result<FlashMessage> {
        let mut user = self.load_user(user_id)?;
        self.activation().deactivate_user(&mut user)?;
        Ok(FlashMessage::ok(format!(
            "User \"{}\" was deactivated!",
            user.label()
        )))
    }

    pub fn activate_users_by_role(&self, role_identifier: &str) -> Result<FlashMessage> {
        self.activation().activate_users_by_role(role_identifier)?;
        Ok(FlashMessage::ok(format!(
            "Users with Role \"{role_identifier}\" were activated!"
        )))
    }

    pub fn deactivate_users_by_role(&self, role_identifier: &str) -> Result<FlashMessage> {
        self.activation().deactivate_users_by_role(role_identifier)?;
        Ok(FlashMessage::ok(format!(
            "Users with Role \"{role_identifier}\" were deactivated!"
        )))
    }

    fn load_user(&self, user_id: Uuid) -> Result<User> {
        self.storage
            .find_user_by_id(user_id)?
            .ok_or_else(|| Error::NotFound(format!("user {user_id}")))
    }
}

fn compare_users(a: &User, b: &User) -> Ordering {
    b.is_active()
        .cmp(&a.is_active())
        .then_with(|| a.name.last_name.cmp(&b.name.last_name))
        .then_with(|| a.name.first_name.cmp(&b.name.first_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PersonName, Session};
    use crate::security::{AnonymousContext, SessionContext};
    use crate::service::inactive_timestamp;
    use crate::storage::{Database, RoleRepository, SessionRepository, UserRepository};

    const EDITOR: &str = "Keyward.Backend:Editor";
    const ADMIN: &str = "Keyward.Backend:Administrator";

    fn add_user(db: &Database, first: &str, last: &str, role: Option<&str>) -> User {
        let mut user = User::new(PersonName::new(first, last));
        let login = format!("{}.{}", first, last).to_lowercase();
        let account = user.add_account(login, "hash");
        if let Some(role) = role {
            account.add_role(Role::new(role));
        }
        db.create_user(&user).unwrap();
        user
    }

    fn setup_test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_role(&Role::new(EDITOR)).unwrap();
        db.create_role(&Role::new(ADMIN)).unwrap();
        db
    }

    fn login(db: &Database, user: &User) -> SessionContext {
        let session = Session::new(user.accounts[0].id, 1).unwrap();
        db.create_session(&session).unwrap();
        SessionContext::resolve(db, session.id).unwrap()
    }

    #[test]
    fn test_overview_sorts_users_and_roles() {
        let db = setup_test_db();
        let turing = add_user(&db, "Alan", "Turing", None);
        add_user(&db, "Grace", "Hopper", None);
        add_user(&db, "Ada", "Byron", None);
        add_user(&db, "Ada", "Lovelace", None);
        add_user(&db, "Augusta", "Lovelace", None);

        let management = UserManagement::new(&db, &AnonymousContext);
        management.deactivate_user(turing.id).unwrap();

        let overview = management.overview().unwrap();
        let labels: Vec<String> = overview.users.iter().map(|u| u.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Ada Byron",
                "Grace Hopper",
                "Ada Lovelace",
                "Augusta Lovelace",
                "Alan Turing",
            ]
        );

        let roles: Vec<&str> = overview.roles.iter().map(|r| r.name()).collect();
        assert_eq!(roles, vec!["Administrator", "Editor"]);
        assert!(overview.current_user.is_none());
    }

    #[test]
    fn test_overview_reports_current_user() {
        let db = setup_test_db();
        let ada = add_user(&db, "Ada", "Lovelace", Some(ADMIN));
        let context = login(&db, &ada);

        let overview = UserManagement::new(&db, &context).overview().unwrap();
        assert_eq!(overview.current_user.map(|u| u.id), Some(ada.id));
    }

    #[test]
    fn test_user_actions_persist_and_confirm() {
        let db = setup_test_db();
        let ada = add_user(&db, "Ada", "Lovelace", None);
        let management = UserManagement::new(&db, &AnonymousContext);

        let message = management.deactivate_user(ada.id).unwrap();
        assert_eq!(message, FlashMessage::ok("User \"Ada Lovelace\" was deactivated!"));
        let stored = db.find_user_by_id(ada.id).unwrap().unwrap();
        assert_eq!(
            stored.accounts[0].expiration_date,
            Some(inactive_timestamp())
        );

        let message = management.activate_user(ada.id).unwrap();
        assert_eq!(message.text, "User \"Ada Lovelace\" was activated!");
        let stored = db.find_user_by_id(ada.id).unwrap().unwrap();
        assert!(stored.is_active());
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let db = setup_test_db();
        let management = UserManagement::new(&db, &AnonymousContext);
        assert!(matches!(
            management.activate_user(Uuid::new_v4()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_role_actions_spare_the_operator() {
        let db = setup_test_db();
        let ada = add_user(&db, "Ada", "Lovelace", Some(EDITOR));
        let grace = add_user(&db, "Grace", "Hopper", Some(EDITOR));
        let alan = add_user(&db, "Alan", "Turing", Some(ADMIN));
        let context = login(&db, &ada);
        let management = UserManagement::new(&db, &context);

        let message = management.deactivate_users_by_role(EDITOR).unwrap();
        assert_eq!(
            message.text,
            "Users with Role \"Keyward.Backend:Editor\" were deactivated!"
        );

        let is_active = |id: Uuid| db.find_user_by_id(id).unwrap().unwrap().is_active();
        assert!(is_active(ada.id));
        assert!(!is_active(grace.id));
        assert!(is_active(alan.id));

        let message = management.activate_users_by_role(EDITOR).unwrap();
        assert_eq!(
            message.text,
            "Users with Role \"Keyward.Backend:Editor\" were activated!"
        );
        assert!(is_active(grace.id));
    }
}
