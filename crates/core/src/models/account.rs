//! Account model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

/// Provider name given to accounts created without an explicit one
pub const DEFAULT_AUTHENTICATION_PROVIDER: &str = "Keyward:Backend";

/// A login credential bound to a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_identifier: String,
    pub authentication_provider_name: String,
    /// Password hash in PHC string format
    #[serde(skip_serializing)]
    pub credentials_source: String,
    pub roles: Vec<Role>,
    /// `None` means the account never expires
    pub expiration_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        user_id: Uuid,
        account_identifier: impl Into<String>,
        credentials_source: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            account_identifier: account_identifier.into(),
            authentication_provider_name: DEFAULT_AUTHENTICATION_PROVIDER.to_string(),
            credentials_source: credentials_source.into(),
            roles: Vec::new(),
            expiration_date: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.add_role(role);
        self
    }

    /// Add a role unless the account already has it
    pub fn add_role(&mut self, role: Role) {
        if !self.has_role(&role.identifier) {
            self.roles.push(role);
        }
    }

    /// Exact identifier match against the account's roles
    pub fn has_role(&self, role_identifier: &str) -> bool {
        self.roles.iter().any(|role| role.identifier == role_identifier)
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    /// Active iff unexpired at `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date.map_or(true, |expires| expires > now)
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Account {}
