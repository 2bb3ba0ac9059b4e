//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Account;

/// First and last name of a person
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub first_name: String,
    pub last_name: String,
}

impl PersonName {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// "First Last", without stray whitespace when one part is empty
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A platform user. Owns its accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: PersonName,
    pub created_at: DateTime<Utc>,
    pub accounts: Vec<Account>,
}

impl User {
    pub fn new(name: PersonName) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
            accounts: Vec::new(),
        }
    }

    /// Attach a new account owned by this user and return it
    pub fn add_account(
        &mut self,
        account_identifier: impl Into<String>,
        credentials_source: impl Into<String>,
    ) -> &mut Account {
        let account = Account::new(self.id, account_identifier, credentials_source);
        self.accounts.push(account);
        let last = self.accounts.len() - 1;
        &mut self.accounts[last]
    }

    /// Display label
    pub fn label(&self) -> String {
        self.name.full_name()
    }

    /// A user is active while at least one of its accounts is
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.accounts.iter().any(|account| account.is_active_at(now))
    }
}
