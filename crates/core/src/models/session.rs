//! Authenticated session model

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Active session for a logged-in account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub account_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Fails when the expiry would fall outside the representable range.
    pub fn new(account_id: Uuid, duration_hours: i64) -> Result<Self> {
        let now = Utc::now();
        let expires_at = TimeDelta::try_hours(duration_hours)
            .and_then(|duration| now.checked_add_signed(duration))
            .ok_or_else(|| {
                Error::InvalidOperation(format!(
                    "session duration of {duration_hours} hours is out of range"
                ))
            })?;

        Ok(Self {
            id: Uuid::new_v4(),
            account_id,
            created_at: now,
            expires_at,
        })
    }
}
