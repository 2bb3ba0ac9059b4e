//! Account activation service
//!
//! Activates or deactivates every account of a user, or of every user that
//! holds a given role. The account driving the current session is never
//! touched, so an operator cannot lock themselves out.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::models::{Account, User};
use crate::security::SecurityContext;
use crate::storage::{AccountRepository, UserRepository};

/// Expiration written to deactivated accounts, in UTC
pub const INACTIVE_TIMESTAMP: &str = "2000-01-01T00:00:00";

/// Seconds from the Unix epoch to [`INACTIVE_TIMESTAMP`]
const INACTIVE_EPOCH_SECONDS: i64 = 946_684_800;

/// [`INACTIVE_TIMESTAMP`] as a point in time.
///
/// A fixed past date instead of "now" keeps deactivation idempotent.
pub fn inactive_timestamp() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(INACTIVE_EPOCH_SECONDS)
}

pub struct ActivationService<'a, U: ?Sized, A: ?Sized, C: ?Sized> {
    users: &'a U,
    accounts: &'a A,
    security: &'a C,
}

impl<'a, U, A, C> ActivationService<'a, U, A, C>
where
    U: UserRepository + ?Sized,
    A: AccountRepository + ?Sized,
    C: SecurityContext + ?Sized,
{
    pub fn new(users: &'a U, accounts: &'a A, security: &'a C) -> Self {
        Self {
            users,
            accounts,
            security,
        }
    }

    pub fn activate_user(&self, user: &mut User) -> Result<()> {
        self.set_user_active(user, true)
    }

    pub fn deactivate_user(&self, user: &mut User) -> Result<()> {
        self.set_user_active(user, false)
    }

    pub fn activate_users_by_role(&self, role_identifier: &str) -> Result<()> {
        self.set_user_active_by_role(role_identifier, true)
    }

    pub fn deactivate_users_by_role(&self, role_identifier: &str) -> Result<()> {
        self.set_user_active_by_role(role_identifier, false)
    }

    /// Apply [`Self::set_user_active`] to every user with at least one
    /// account holding the role. All of such a user's accounts change, not
    /// only the matching ones.
    #[instrument(skip(self))]
    fn set_user_active_by_role(&self, role_identifier: &str, active: bool) -> Result<()> {
        let mut matched = 0usize;

        for mut user in self.users.find_all_users()? {
            let has_role = user
                .accounts
                .iter()
                .any(|account| account.has_role(role_identifier));

            if has_role {
                self.set_user_active(&mut user, active)?;
                matched += 1;
            }
        }

        info!(matched, "Users updated by role");
        Ok(())
    }

    /// Persists each account as it goes. An error leaves earlier accounts
    /// written.
    #[instrument(skip(self, user), fields(user = %user.id))]
    fn set_user_active(&self, user: &mut User, active: bool) -> Result<()> {
        let expiration = if active {
            None
        } else {
            Some(inactive_timestamp())
        };

        for account in user.accounts.iter_mut() {
            if self.is_session_account(account) {
                debug!(account = %account.account_identifier, "Skipping session account");
                continue;
            }

            account.expiration_date = expiration;
            self.accounts.update_account(account)?;
        }

        Ok(())
    }

    fn is_session_account(&self, account: &Account) -> bool {
        self.security.is_initialized()
            && self
                .security
                .account()
                .is_some_and(|current| current == account)
    }
}
