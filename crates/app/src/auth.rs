//! Password credentials and login sessions

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use keyward_core::{AccountRepository, Error, Session, SessionRepository};
use tracing::{info, instrument};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Hash a password into a PHC string for an account's credentials source
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::PasswordHash(e.to_string()))
}

/// Check a password against a stored PHC string
pub fn verify_password(password: &str, credentials_source: &str) -> bool {
    match PasswordHash::new(credentials_source) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Verify credentials and open a session for the account
#[instrument(skip(state, password))]
pub fn login(state: &AppState, account_identifier: &str, password: &str) -> Result<Session> {
    let account = state
        .db
        .find_account_by_identifier(account_identifier)?
        .ok_or_else(|| Error::Authentication("Unknown account".into()))?;

    if !verify_password(password, &account.credentials_source) {
        return Err(Error::Authentication("Invalid password".into()).into());
    }

    if !account.is_active() {
        return Err(Error::Authentication("Account is deactivated".into()).into());
    }

    let session = Session::new(account.id, state.config.session_hours)?;
    state.db.create_session(&session)?;
    state.set_current_session(Some(session.id))?;

    info!(session_id = %session.id, "Logged in");
    Ok(session)
}

/// Close the stored session, if any
pub fn logout(state: &AppState) -> Result<()> {
    if let Some(session_id) = state.current_session_id() {
        state.db.delete_session(session_id)?;
    }
    state.db.cleanup_expired_sessions()?;
    state.set_current_session(None)
}
